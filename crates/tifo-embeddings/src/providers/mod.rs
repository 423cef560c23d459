//! Embedding providers.

pub mod http;

pub use http::HttpProvider;
