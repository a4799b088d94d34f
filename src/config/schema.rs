/// Configuration schema and defaults for vitalboard.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[generation]`, `[web]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values they
/// want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level vitalboard configuration.
///
/// Maps directly to the `~/.vitalboard/config.toml` and `.vitalboard.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalboardConfig {
    pub backend: BackendConfig,
    pub generation: GenerationConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the health-program API lives and which member to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Member whose profile fills the profile card.
    pub member_id: u32,
    /// Per-request timeout in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            member_id: 1,
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [generation]
// ---------------------------------------------------------------------------

/// Conversation generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Ollama endpoint the backend's generator uses. Shown in the hint when
    /// a generation request cannot reach the backend, and probed by
    /// `vitalboard health`.
    pub ollama_url: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `vitalboard serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append load outcomes to `~/.vitalboard/load-log.jsonl`.
    pub enabled: bool,
    /// Echo failures to stderr.
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
        }
    }
}

impl VitalboardConfig {
    /// Annotated default config written by `vitalboard config init`.
    pub fn default_toml() -> String {
        r#"# vitalboard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (VITALBOARD_*)
#   2. Project config (.vitalboard.toml in current directory)
#   3. User global config (~/.vitalboard/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://localhost:5000"
member_id = 1
timeout_ms = 0                         # 0 = no timeout

[generation]
ollama_url = "http://localhost:11434"  # Where the backend's generator finds Ollama

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true                         # ~/.vitalboard/load-log.jsonl
verbose = false                        # Echo fetch failures to stderr
"#
        .to_string()
    }
}
