use std::time::Instant;

use anyhow::anyhow;
use comfy_table::Table;
use uuid::Uuid;

use crate::{
    client::{
        history::{format_amount, format_date, EMPTY_HISTORY},
        ApiClient, ConverterForm, TransferHistory,
    },
    transfers::domain::currency::Currency,
};

pub async fn show_rates(api: &ApiClient) -> anyhow::Result<()> {
    let rates = api.get_rates().await?;

    let mut table = Table::new();
    table.set_header(vec!["Currency", "Name", "Rate (per USD)"]);
    for (currency, rate) in &rates {
        table.add_row(vec![
            currency.code().to_owned(),
            currency.name().to_owned(),
            format!("{:.4}", rate),
        ]);
    }

    println!("{table}");

    Ok(())
}

pub async fn convert(
    api: &ApiClient,
    from: Currency,
    to: Currency,
    amount: String,
    submit: bool,
) -> anyhow::Result<()> {
    let mut form = ConverterForm::new();
    form.from_currency = from;
    form.to_currency = to;
    form.amount = amount;

    form.load_rates(api).await;
    if let Some(error) = form.error() {
        return Err(anyhow!("{}", error));
    }

    match form.preview() {
        Some(converted) => println!(
            "{} {} = {:.2} {}",
            form.amount.trim(),
            form.from_currency,
            converted,
            form.to_currency
        ),
        None => println!("Enter a valid amount to see the converted value."),
    }

    if let Some(rate) = form.unit_rate() {
        println!("1 {} = {:.4} {}", form.from_currency, rate, form.to_currency);
    }

    if !submit {
        return Ok(());
    }

    let mut history = TransferHistory::new();
    history.observe_completed(form.completed_transfers());

    let transfer = form.submit(api, Instant::now()).await.ok_or_else(|| {
        anyhow!("{}", form.error().unwrap_or("Failed to create transfer"))
    })?;
    println!(
        "Transfer successful! Sent {} and received {}.",
        format_amount(transfer.from_currency, transfer.amount),
        format_amount(transfer.to_currency, transfer.converted_amount)
    );

    history.refresh_after(api, form.completed_transfers()).await;
    print_history(&history)
}

pub async fn show_history(api: &ApiClient) -> anyhow::Result<()> {
    let mut history = TransferHistory::new();
    history.refresh(api).await;

    print_history(&history)
}

fn print_history(history: &TransferHistory) -> anyhow::Result<()> {
    if let Some(error) = history.error() {
        return Err(anyhow!("{}", error));
    }

    if history.transfers().is_empty() {
        println!("{}", EMPTY_HISTORY);

        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Route", "Sent", "Received", "Rate"]);
    for transfer in history.transfers() {
        let date = transfer.date.with_timezone(&chrono::Local);

        table.add_row(vec![
            transfer.id.to_string(),
            format_date(&date),
            format!("{} → {}", transfer.from_country, transfer.to_country),
            format_amount(transfer.from_currency, transfer.amount),
            format_amount(transfer.to_currency, transfer.converted_amount),
            format!("{:.4}", transfer.exchange_rate),
        ]);
    }

    println!("{table}");

    Ok(())
}

pub async fn revoke(api: &ApiClient, id: Uuid) -> anyhow::Result<()> {
    let mut history = TransferHistory::new();
    history.revoke(api, id).await;

    match history.error() {
        Some(error) => Err(anyhow!("{}", error)),
        None => {
            println!("Transfer {} revoked.", id);

            Ok(())
        }
    }
}
