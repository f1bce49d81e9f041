//! Currency transfers: recording the conversion of an amount from one
//! country's currency into another's.

pub mod domain;
pub mod http;
pub mod models;
pub mod services;
