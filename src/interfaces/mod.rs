//! Delivery mechanisms: the HTTP API.

pub mod http;
