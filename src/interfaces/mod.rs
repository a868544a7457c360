//! Inbound adapters: the HTTP endpoint and the offline CSV field source.

pub mod csv;
pub mod http;
