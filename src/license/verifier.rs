use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected,
    NetworkError(String),
}

/// Activation endpoint dialects. They differ only in the success key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointFlavor {
    /// `POST /register`, success is `{"verified": "yes"}`.
    Register,
    /// `POST /validate_token`, success is `{"valid": "success"}`.
    ValidateToken,
}

impl Default for EndpointFlavor {
    fn default() -> Self {
        EndpointFlavor::Register
    }
}

impl EndpointFlavor {
    pub fn success_pair(self) -> (&'static str, &'static str) {
        match self {
            EndpointFlavor::Register => ("verified", "yes"),
            EndpointFlavor::ValidateToken => ("valid", "success"),
        }
    }
}

pub trait Verifier: Send + Sync {
    fn activate(&self, token: &str) -> Verification;
}

#[derive(Serialize)]
struct ActivationRequest<'a> {
    token: &'a str,
}

/// Interpret an activation response. Non-2xx is a transport failure; a 2xx
/// body without the success key is a rejection.
pub fn interpret_response(status: u16, body: &str, flavor: EndpointFlavor) -> Verification {
    if !(200..300).contains(&status) {
        return Verification::NetworkError(format!("server returned status {status}"));
    }
    let (key, expected) = flavor.success_pair();
    let verified = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get(key).and_then(|s| s.as_str()).map(|s| s == expected))
        .unwrap_or(false);
    if verified {
        Verification::Verified
    } else {
        Verification::Rejected
    }
}

/// Single-attempt HTTPS verifier. No retry and no backoff.
pub struct HttpVerifier {
    client: Client,
    endpoint: String,
    flavor: EndpointFlavor,
}

impl HttpVerifier {
    pub fn new(endpoint: impl Into<String>, flavor: EndpointFlavor, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("float-launcher activation")
            .build()?;
        Ok(Self::with_client(client, endpoint, flavor))
    }

    /// Use an already configured client, e.g. one with custom proxy rules.
    pub fn with_client(client: Client, endpoint: impl Into<String>, flavor: EndpointFlavor) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            flavor,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Verifier for HttpVerifier {
    fn activate(&self, token: &str) -> Verification {
        tracing::debug!(endpoint = %self.endpoint, "sending activation request");
        let resp = match self
            .client
            .post(&self.endpoint)
            .json(&ActivationRequest { token })
            .send()
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("activation request failed: {e}");
                return Verification::NetworkError(e.to_string());
            }
        };
        let status = resp.status().as_u16();
        let body = match resp.text() {
            Ok(b) => b,
            Err(e) => return Verification::NetworkError(e.to_string()),
        };
        let outcome = interpret_response(status, &body, self.flavor);
        tracing::info!(status, outcome = ?outcome, "activation response");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_keys_depend_on_flavor() {
        assert_eq!(
            interpret_response(200, r#"{"verified":"yes"}"#, EndpointFlavor::Register),
            Verification::Verified
        );
        assert_eq!(
            interpret_response(200, r#"{"valid":"success"}"#, EndpointFlavor::ValidateToken),
            Verification::Verified
        );
        assert_eq!(
            interpret_response(200, r#"{"valid":"success"}"#, EndpointFlavor::Register),
            Verification::Rejected
        );
    }

    #[test]
    fn missing_key_or_bad_body_is_rejected() {
        for body in [r#"{"verified":"no"}"#, "{}", "not json", r#"{"verified":true}"#] {
            assert_eq!(
                interpret_response(200, body, EndpointFlavor::Register),
                Verification::Rejected,
                "{body}"
            );
        }
    }

    #[test]
    fn non_success_status_is_network_error() {
        for status in [400, 404, 500, 302] {
            assert!(matches!(
                interpret_response(status, r#"{"verified":"yes"}"#, EndpointFlavor::Register),
                Verification::NetworkError(_)
            ));
        }
    }
}
