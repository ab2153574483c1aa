//! Outer adapters: the HTTP API

pub mod http;
