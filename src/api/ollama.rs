/// Reachability probe for the Ollama service behind conversation generation.
///
/// The dashboard never talks to Ollama directly; the backend does. This probe
/// only backs `vitalboard health` and the endpoint hint shown when a
/// generation request fails.
use std::time::Duration;

use serde::Deserialize;

/// Response body from `GET /api/tags`: lists available models.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// What the probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OllamaStatus {
    /// Reachable, with the names of the installed models.
    Ready(Vec<String>),
    /// Reachable but no model is installed.
    NoModels,
    Unreachable,
}

#[derive(Debug)]
pub struct OllamaProbe {
    base_url: String,
}

impl OllamaProbe {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check whether Ollama is reachable and has at least one model pulled.
    ///
    /// Uses a short timeout (5 s) so `vitalboard health` doesn't stall if
    /// Ollama is down. Resolves `localhost` to `127.0.0.1` to avoid IPv6 DNS
    /// delays on Windows.
    pub fn check(&self) -> OllamaStatus {
        let url = format!("{}/api/tags", self.base_url).replace("://localhost", "://127.0.0.1");
        let response = match ureq::get(&url).timeout(Duration::from_secs(5)).call() {
            Ok(response) => response,
            Err(_) => return OllamaStatus::Unreachable,
        };

        match response.into_json::<TagsResponse>() {
            Ok(tags) if !tags.models.is_empty() => {
                OllamaStatus::Ready(tags.models.into_iter().map(|m| m.name).collect())
            }
            Ok(_) => OllamaStatus::NoModels,
            Err(_) => OllamaStatus::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let probe = OllamaProbe::new("http://localhost:11434/");
        assert_eq!(probe.base_url, "http://localhost:11434");
    }

    #[test]
    fn closed_port_is_unreachable() {
        let probe = OllamaProbe::new("http://127.0.0.1:9");
        assert_eq!(probe.check(), OllamaStatus::Unreachable);
    }
}
