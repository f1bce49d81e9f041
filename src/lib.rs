pub mod cli;
pub mod client;
mod cors;
pub mod database;
mod http_err;
pub mod rates;
pub mod repos;
pub mod server;
pub mod transfers;
