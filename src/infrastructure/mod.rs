//! Adapters implementing the domain ports.

pub mod in_memory;
pub mod smtp;
pub mod webhook;
