use std::{borrow::Cow, net::SocketAddr};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{
    client::ApiClient, database::DatabaseOptions, rates, server,
    transfers::domain::currency::Currency,
};

mod client;
mod migrate;

#[derive(Parser)]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// DSN to tell Sentry where to send events.
    ///
    /// If provided, errors will be sent to Sentry.
    #[clap(long = "sentry-dsn", env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations.
    Migrate(MigrateOpts),

    /// Run the API server.
    Serve(ServeOpts),

    /// Show the current exchange rates.
    Rates(ClientOpts),

    /// Preview a conversion, and optionally send it as a transfer.
    Convert(ConvertOpts),

    /// List past transfers, newest first.
    History(ClientOpts),

    /// Revoke a transfer.
    Revoke(RevokeOpts),
}

#[derive(Args)]
struct MigrateOpts {
    /// Connection string for the database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,
}

impl From<MigrateOpts> for migrate::MigrationOpts {
    fn from(opts: MigrateOpts) -> Self {
        Self {
            database_url: opts.database_url,
        }
    }
}

#[derive(Args)]
struct ServeOpts {
    /// Address to listen for requests on.
    #[clap(long = "listen-address", default_value = "0.0.0.0:5000")]
    listen_address: SocketAddr,

    /// The number of connections to use for the database pool.
    #[clap(long = "database-pool-size", default_value = "16")]
    database_pool_size: u32,

    /// The number of seconds before a database connection times out.
    #[clap(long = "database-timeout", default_value = "5")]
    database_timeout: u8,

    /// Connection string for the application database.
    #[clap(
        long = "database-url",
        env = "DATABASE_URL",
        required_unless_present = "in-memory"
    )]
    database_url: Option<String>,

    /// Keep transfers in memory instead of a database.
    ///
    /// Transfers are lost when the server stops.
    #[clap(long = "in-memory")]
    in_memory: bool,

    /// API key for the exchange rate provider.
    #[clap(long = "exchange-rate-api-key", env = "EXCHANGE_RATE_API_KEY")]
    exchange_rate_api_key: String,

    /// Base URL of the exchange rate provider.
    #[clap(
        long = "exchange-rate-api-url",
        env = "EXCHANGE_RATE_API_URL",
        default_value = rates::DEFAULT_BASE_URL
    )]
    exchange_rate_api_url: String,

    /// The number of seconds to wait for the exchange rate provider.
    #[clap(long = "exchange-rate-timeout", default_value = "10")]
    exchange_rate_timeout: u64,
}

impl ServeOpts {
    fn database_opts(&self) -> Option<DatabaseOptions> {
        if self.in_memory {
            return None;
        }

        self.database_url.as_ref().map(|url| DatabaseOptions {
            pool_size: self.database_pool_size,
            timeout_seconds: self.database_timeout,
            url: url.clone(),
        })
    }
}

impl From<ServeOpts> for server::Options {
    fn from(opts: ServeOpts) -> Self {
        Self {
            database: opts.database_opts(),
            listen_address: opts.listen_address,
            exchange_rate_api_key: opts.exchange_rate_api_key,
            exchange_rate_api_url: opts.exchange_rate_api_url,
            exchange_rate_timeout_seconds: opts.exchange_rate_timeout,
        }
    }
}

#[derive(Args)]
struct ClientOpts {
    /// Base URL of the transfer API.
    #[clap(
        long = "api-url",
        env = "API_URL",
        default_value = "http://localhost:5000"
    )]
    api_url: String,
}

impl ClientOpts {
    fn api(&self) -> anyhow::Result<ApiClient> {
        ApiClient::new(&self.api_url)
    }
}

#[derive(Args)]
struct ConvertOpts {
    #[clap(flatten)]
    client: ClientOpts,

    /// Amount to send, in the source currency.
    #[clap(long, default_value = "1.00")]
    amount: String,

    /// Currency to send.
    #[clap(long, default_value = "USD")]
    from: Currency,

    /// Currency to receive.
    #[clap(long, default_value = "LKR")]
    to: Currency,

    /// Send the transfer instead of only previewing it.
    #[clap(long)]
    submit: bool,
}

#[derive(Args)]
struct RevokeOpts {
    #[clap(flatten)]
    client: ClientOpts,

    /// ID of the transfer to revoke.
    id: Uuid,
}

pub async fn run_with_sys_args() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let cli = Cli::parse();

    let sentry_config = cli.sentry_dsn.map(|dsn| {
        debug!("Enabled sentry.");

        let release_name = option_env!("VERGEN_GIT_SHA")
            .map(Cow::from)
            .or_else(|| sentry::release_name!());

        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: release_name,
                ..Default::default()
            },
        ))
    });

    let sentry_tracing_layer = if sentry_config.is_some() {
        Some(sentry_tracing::layer())
    } else {
        None
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(sentry_tracing_layer)
        .init();

    match cli.command {
        Commands::Migrate(opts) => Ok(migrate::run_migrations(opts.into()).await?),
        Commands::Serve(opts) => {
            if let Some(database_url) = opts.database_opts().map(|database| database.url) {
                migrate::run_migrations(MigrateOpts { database_url }.into()).await?;
            }

            server::serve(opts.into()).await
        }
        Commands::Rates(opts) => client::show_rates(&opts.api()?).await,
        Commands::Convert(opts) => {
            client::convert(
                &opts.client.api()?,
                opts.from,
                opts.to,
                opts.amount,
                opts.submit,
            )
            .await
        }
        Commands::History(opts) => client::show_history(&opts.api()?).await,
        Commands::Revoke(opts) => client::revoke(&opts.client.api()?, opts.id).await,
    }
}
