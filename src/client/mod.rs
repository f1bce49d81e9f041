//! Client side of the transfer API: a thin HTTP client, plus the state
//! behind the transfer form and the transfer history.

pub mod api;
pub mod converter;
pub mod history;

pub use self::api::{ApiClient, ClientError};
pub use self::converter::ConverterForm;
pub use self::history::TransferHistory;
