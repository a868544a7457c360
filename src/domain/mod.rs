//! Domain types of an expense request and the ports its notifications go through.

pub mod attachment;
pub mod form;
pub mod money;
pub mod ports;
pub mod request;
