//! User-profile HTTP collaborator.
//!
//! A single unconditional `GET` returning an opaque profile record. This
//! is deliberately outside the streaming core: the hub has no dependency
//! on it, and the demo binary treats the response shape as opaque.

use crate::error::IngestError;

/// Fetches the user profile from `url` as opaque JSON.
///
/// # Errors
///
/// Returns [`IngestError::Transport`] on request failure or a non-2xx
/// status, and [`IngestError::MalformedPayload`] if the body is not
/// valid JSON.
pub async fn fetch_profile(
    client: &reqwest::Client,
    url: &str,
) -> Result<serde_json::Value, IngestError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_opaque_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"name":"guest"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let profile = fetch_profile(&client, &format!("{}/api/dashboard", server.uri())).await;
        let Ok(profile) = profile else {
            panic!("expected profile");
        };
        assert_eq!(
            profile.get("name").and_then(serde_json::Value::as_str),
            Some("guest")
        );
    }

    #[tokio::test]
    async fn non_2xx_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_profile(&client, &server.uri()).await;
        assert!(matches!(result, Err(IngestError::Transport(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_profile(&client, &server.uri()).await;
        assert!(matches!(result, Err(IngestError::MalformedPayload(_))));
    }
}
