use std::{collections::HashSet, fmt::Display};

use chrono::{DateTime, TimeZone};
use tracing::error;
use uuid::Uuid;

use crate::transfers::{domain::currency::Currency, http::reps};

use super::api::{ApiClient, ClientError};

const LOAD_FAILED: &str = "Failed to load transfer history";
const REVOKE_FAILED: &str = "Failed to revoke transfer";

pub const EMPTY_HISTORY: &str = "No transfers found. Make a transfer to see it here.";

/// Format an amount with its currency symbol, e.g. `Rs.600.00`.
pub fn format_amount(currency: Currency, amount: f64) -> String {
    format!("{}{:.2}", currency.symbol(), amount)
}

/// Format a timestamp like `Oct 19, 2026, 10:42 AM`.
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// The list of past transfers, along with any revocations in progress.
#[derive(Debug, Default)]
pub struct TransferHistory {
    transfers: Vec<reps::Transfer>,
    error: Option<String>,
    loading: bool,
    revoking: HashSet<Uuid>,
    seen_completed: Option<u64>,
}

impl TransferHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[reps::Transfer] {
        &self.transfers
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_revoking(&self, id: Uuid) -> bool {
        self.revoking.contains(&id)
    }

    pub async fn refresh(&mut self, api: &ApiClient) {
        self.loading = true;
        let result = api.get_transfers().await;
        self.loading = false;

        self.finish_refresh(result);
    }

    fn finish_refresh(&mut self, result: Result<Vec<reps::Transfer>, ClientError>) {
        match result {
            Ok(transfers) => {
                self.transfers = transfers;
                self.error = None;
            }
            Err(error) => {
                error!(%error, "Failed to load transfers.");
                self.error = Some(LOAD_FAILED.to_owned());
            }
        }
    }

    /// Record the number of transfers the form has completed. Returns `true`
    /// if it changed since the last call, meaning the list is stale.
    pub fn observe_completed(&mut self, completed: u64) -> bool {
        self.seen_completed.replace(completed) != Some(completed)
    }

    /// Refresh the list if a transfer has been sent since it was last seen.
    pub async fn refresh_after(&mut self, api: &ApiClient, completed: u64) {
        if self.observe_completed(completed) {
            self.refresh(api).await;
        }
    }

    /// Mark a transfer as being revoked. Returns `false` if a revocation for
    /// it is already in flight.
    pub fn begin_revoke(&mut self, id: Uuid) -> bool {
        self.revoking.insert(id)
    }

    pub fn finish_revoke(&mut self, id: Uuid, result: Result<(), ClientError>) {
        self.revoking.remove(&id);

        match result {
            Ok(()) => {
                self.transfers.retain(|transfer| transfer.id != id);
            }
            Err(error) => {
                error!(%error, %id, "Failed to revoke transfer.");
                self.error = Some(REVOKE_FAILED.to_owned());
            }
        }
    }

    /// Revoke a transfer, removing it from the list once the server confirms.
    pub async fn revoke(&mut self, api: &ApiClient, id: Uuid) {
        if !self.begin_revoke(id) {
            return;
        }

        let result = api.delete_transfer(id).await;
        self.finish_revoke(id, result);
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::transfers::domain::currency::Country;

    use super::*;

    fn transfer(to: Currency) -> reps::Transfer {
        reps::Transfer {
            id: Uuid::new_v4(),
            from_country: Country::Usa,
            to_country: to.country(),
            from_currency: Currency::Usd,
            to_currency: to,
            amount: 2.0,
            converted_amount: 600.0,
            exchange_rate: 300.0,
            date: Utc::now(),
        }
    }

    #[test]
    fn amounts_use_symbols() {
        assert_eq!("Rs.600.00", format_amount(Currency::Lkr, 600.0));
        assert_eq!("$2.50", format_amount(Currency::Usd, 2.5));
        assert_eq!("A$0.10", format_amount(Currency::Aud, 0.1));
        assert_eq!("₹83.00", format_amount(Currency::Inr, 83.0));
    }

    #[test]
    fn date_format() {
        let date = Utc.with_ymd_and_hms(2026, 10, 19, 10, 42, 0).unwrap();
        assert_eq!("Oct 19, 2026, 10:42 AM", format_date(&date));

        let date = Utc.with_ymd_and_hms(2026, 3, 5, 21, 5, 0).unwrap();
        assert_eq!("Mar 5, 2026, 09:05 PM", format_date(&date));
    }

    #[test]
    fn refresh_failure_keeps_rows() {
        let mut history = TransferHistory::new();
        let kept = transfer(Currency::Lkr);
        history.finish_refresh(Ok(vec![kept.clone()]));

        history.finish_refresh(Err(ClientError::Failed("down".to_owned())));

        assert_eq!(Some(LOAD_FAILED), history.error());
        assert_eq!(&[kept], history.transfers());
    }

    #[test]
    fn revoke_removes_row() {
        let mut history = TransferHistory::new();
        let first = transfer(Currency::Lkr);
        let second = transfer(Currency::Inr);
        history.finish_refresh(Ok(vec![first.clone(), second.clone()]));

        assert!(history.begin_revoke(first.id));
        assert!(!history.begin_revoke(first.id));
        assert!(history.begin_revoke(second.id));

        history.finish_revoke(first.id, Ok(()));

        assert!(!history.is_revoking(first.id));
        assert!(history.is_revoking(second.id));
        assert_eq!(&[second], history.transfers());
    }

    #[test]
    fn revoke_failure_keeps_row() {
        let mut history = TransferHistory::new();
        let kept = transfer(Currency::Aud);
        history.finish_refresh(Ok(vec![kept.clone()]));

        history.begin_revoke(kept.id);
        history.finish_revoke(kept.id, Err(ClientError::Failed("Transfer not found".to_owned())));

        assert_eq!(Some(REVOKE_FAILED), history.error());
        assert!(!history.is_revoking(kept.id));
        assert_eq!(&[kept], history.transfers());
    }

    #[test]
    fn completed_transfers_mark_list_stale() {
        let mut history = TransferHistory::new();

        assert!(history.observe_completed(0));
        assert!(!history.observe_completed(0));
        assert!(history.observe_completed(1));
        assert!(!history.observe_completed(1));
    }

    #[test_log::test(tokio::test)]
    async fn refresh_after_submitted_transfer() {
        let server = MockServer::start().await;
        let sent = transfer(Currency::Lkr);
        Mock::given(method("GET"))
            .and(path("/api/transfers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![sent.clone()]))
            .expect(1)
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let mut history = TransferHistory::new();
        history.observe_completed(0);
        history.refresh_after(&api, 0).await;
        assert!(history.transfers().is_empty());

        history.refresh_after(&api, 1).await;
        assert_eq!(&[sent], history.transfers());
    }
}
