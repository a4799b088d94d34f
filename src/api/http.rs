/// Blocking HTTP client for the health-program backend.
///
/// One [`HttpBackend`] is built per dashboard session from the `[backend]`
/// config section and reused for every call of that session. Calls are made
/// one at a time, in the order the dashboard issues them.
///
/// No retries are made. A timeout applies only when `backend.timeout_ms` is
/// non-zero; otherwise a hung request blocks its caller.
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{Backend, FetchError};
use crate::config::schema::BackendConfig;
use crate::model::{GenerationResult, HealthMetrics, MemberProfile, StatsPatch, TimelineEvent};

/// `ureq`-backed implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            base_url: normalize_base_url(base_url),
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Self::new(&config.base_url, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the backend answers HTTP at all (any status counts).
    pub fn is_reachable(&self) -> bool {
        match self.agent.get(&self.url("/api/stats")).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(ureq::Error::Transport(_)) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self
            .agent
            .get(&self.url(path))
            .set("Accept", "application/json")
            .call()?;
        decode(response)
    }
}

impl Backend for HttpBackend {
    fn member(&self, id: u32) -> Result<MemberProfile, FetchError> {
        self.get_json(&format!("/api/member/{id}"))
    }

    fn stats(&self) -> Result<StatsPatch, FetchError> {
        self.get_json("/api/stats")
    }

    fn health_metrics(&self) -> Result<HealthMetrics, FetchError> {
        self.get_json("/api/health-metrics")
    }

    fn timeline(&self) -> Result<Vec<TimelineEvent>, FetchError> {
        self.get_json("/api/timeline")
    }

    fn generate_conversations(&self) -> Result<GenerationResult, FetchError> {
        let result = self
            .agent
            .post(&self.url("/api/generate-conversations"))
            .set("Content-Type", "application/json")
            .call();

        match result {
            Ok(response) => decode(response),
            // The generation endpoint reports its own failures as an error
            // status with an `{error}` body (`success` may be absent).
            Err(ureq::Error::Status(code, response)) => {
                response.into_json().map_err(|_| FetchError::Status(code))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, FetchError> {
    response
        .into_json()
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Strip trailing slashes and pin `localhost` to IPv4.
///
/// On Windows, "localhost" may try IPv6 (::1) first, which stalls when the
/// backend only binds IPv4.
fn normalize_base_url(base_url: &str) -> String {
    base_url
        .trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let backend = HttpBackend::new("http://localhost:5000/", None);
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(backend.url("/api/stats"), "http://127.0.0.1:5000/api/stats");
    }

    #[test]
    fn from_default_config() {
        let backend = HttpBackend::from_config(&BackendConfig::default());
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
    }
}
