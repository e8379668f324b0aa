//! HTTP plumbing for talking to the identity provider

mod client;
mod error;
mod retry;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::HttpError;
pub use retry::{with_backoff, RetryError, RetryPolicy};
