//! Shared helpers for HTTP access and debug logging

pub mod debug;
pub mod http;
