#[tokio::main]
async fn main() -> anyhow::Result<()> {
    currency_transfers::cli::run_with_sys_args().await
}
