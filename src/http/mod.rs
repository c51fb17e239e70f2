//! HTTP access to the remote API

mod client;
mod response;

pub use client::{ApiClient, ApiRequest, HttpTransport, Transport, DEMO_FLAG};
pub use response::{ApiResponse, Body};
