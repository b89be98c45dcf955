use axum::body::{self, Body};
use serde::de::DeserializeOwned;

/// Reads an entire response body and parses it as JSON into [T]. Panics, failing the test, when
/// the body can't be read or doesn't match [T], printing the raw body to help with debugging.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Response body did not match the expected shape ({err}). Received body: {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}
