use super::error::TransportError;
use super::models::{GenerationRequest, GenerationResult};
use crate::constants::GENERATE_PATH;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Issues one generation request and interprets the reply.
///
/// Structured error bodies come back as `Ok(GenerationResult::Failure)`; only
/// failures to obtain a usable reply are `Err`.
pub trait GenerationTransport: Send + Sync {
    fn fetch(&self, request: &GenerationRequest) -> Result<GenerationResult, TransportError>;
}

/// `GET <endpoint>/generate?...` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: Url,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(
        endpoint: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let url = generate_url(endpoint)?;
        let agent = ureq::builder()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .build();
        Ok(Self { url, agent })
    }

    pub fn request_url(&self, request: &GenerationRequest) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url
    }
}

impl GenerationTransport for HttpTransport {
    fn fetch(&self, request: &GenerationRequest) -> Result<GenerationResult, TransportError> {
        let url = self.request_url(request);
        debug!("GET {}", url);

        match self.agent.get(url.as_str()).call() {
            Ok(resp) => {
                let body: serde_json::Value = resp
                    .into_json()
                    .map_err(|e| TransportError::Malformed(format!("Failed to parse response: {}", e)))?;
                GenerationResult::from_json(body)
            }
            Err(ureq::Error::Status(code, resp)) => {
                // The server answers rejected requests with a JSON error body.
                let structured = resp
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|body| GenerationResult::from_json(body).ok())
                    .filter(|result| !result.is_success());
                match structured {
                    Some(result) => {
                        warn!("Generation rejected with HTTP {}", code);
                        Ok(result)
                    }
                    None => Err(TransportError::HttpStatus(code)),
                }
            }
            Err(ureq::Error::Transport(t)) => {
                let msg = t.to_string();
                if msg.contains("timed out") || msg.contains("timeout") {
                    Err(TransportError::Timeout)
                } else {
                    Err(TransportError::Unreachable(msg))
                }
            }
        }
    }
}

fn generate_url(endpoint: &str) -> Result<Url, TransportError> {
    let trimmed = endpoint.trim();
    let mut base = Url::parse(trimmed)
        .map_err(|e| TransportError::InvalidEndpoint(format!("{} ({})", trimmed, e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(TransportError::InvalidEndpoint(format!(
            "{} (only http and https are supported)",
            trimmed
        )));
    }
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(GENERATE_PATH)
        .map_err(|e| TransportError::InvalidEndpoint(format!("{} ({})", trimmed, e)))
}
