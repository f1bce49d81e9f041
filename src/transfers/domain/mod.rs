pub mod currency;
pub mod transfers;
