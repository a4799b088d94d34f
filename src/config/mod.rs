/// Configuration system for vitalboard.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::VitalboardConfig::default()`]
/// 2. **User global config**: `~/.vitalboard/config.toml`
/// 3. **Project local config**: `.vitalboard.toml` in the current working directory
/// 4. **Environment variables**: `VITALBOARD_*` overrides (highest precedence)
///
/// File layers are merged key by key: a project file that only sets
/// `backend.member_id` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use vitalboard::config;
///
/// let cfg = config::load();
/// let backend = HttpBackend::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::VitalboardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Malformed files
/// are skipped so a bad config never keeps the dashboard from loading.
pub fn load() -> VitalboardConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_layer(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: VitalboardConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Read a TOML file as a raw value tree, if it exists and is a valid config.
fn load_toml_layer(path: Option<PathBuf>) -> Option<toml::Value> {
    let content = fs::read_to_string(path?).ok()?;
    parse_layer(&content)
}

fn parse_layer(content: &str) -> Option<toml::Value> {
    let value: toml::Value = toml::from_str(content).ok()?;
    // Reject layers whose values have the wrong types.
    value.clone().try_into::<VitalboardConfig>().ok()?;
    Some(value)
}

/// Deep-merge `overlay` into `base`: tables merge recursively, every other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.vitalboard/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vitalboard").join("config.toml"))
}

/// Path to the project local config: `.vitalboard.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".vitalboard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `VITALBOARD_BACKEND_URL`: backend base URL
/// - `VITALBOARD_MEMBER_ID`: member shown in the profile card
/// - `VITALBOARD_TIMEOUT_MS`: backend request timeout (`0` = none)
/// - `VITALBOARD_OLLAMA_URL`: Ollama endpoint for hints and health checks
/// - `VITALBOARD_WEB_ADDR`: `serve` listen address
/// - `VITALBOARD_LOG`: load log on/off (`1`/`true`/`yes`/`on`)
/// - `VITALBOARD_VERBOSE`: echo failures to stderr
fn apply_env_overrides(config: &mut VitalboardConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("VITALBOARD_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Some(val) = lookup("VITALBOARD_MEMBER_ID")
        && let Ok(id) = val.parse::<u32>()
    {
        config.backend.member_id = id;
    }
    if let Some(val) = lookup("VITALBOARD_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Some(val) = lookup("VITALBOARD_OLLAMA_URL")
        && !val.is_empty()
    {
        config.generation.ollama_url = val;
    }
    if let Some(val) = lookup("VITALBOARD_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = lookup("VITALBOARD_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = lookup("VITALBOARD_VERBOSE") {
        config.logging.verbose = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.vitalboard/config.toml`.
///
/// Creates the `~/.vitalboard/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.vitalboard/ directory")?;
    }

    fs::write(&path, VitalboardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Starts from the existing file, or from the defaults when there is none,
/// updates the dotted key (e.g. `backend.member_id`) and writes the result
/// back. The new value must keep the config valid.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let current = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&VitalboardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&current).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;
    root.clone()
        .try_into::<VitalboardConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The key must already exist; the new value is parsed to the existing
/// value's type.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (section_path, leaf) = match key.rsplit_once('.') {
        Some((sections, leaf)) => (Some(sections), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for part in section_path.into_iter().flat_map(|s| s.split('.')) {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{}'", section_path.unwrap_or("")))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = VitalboardConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("VITALBOARD_BACKEND_URL", "http://backend:8000"),
                ("VITALBOARD_MEMBER_ID", "3"),
                ("VITALBOARD_TIMEOUT_MS", "2500"),
                ("VITALBOARD_OLLAMA_URL", "http://gpu-box:11434"),
                ("VITALBOARD_LOG", "off"),
                ("VITALBOARD_VERBOSE", "1"),
            ]),
        );
        assert_eq!(config.backend.base_url, "http://backend:8000");
        assert_eq!(config.backend.member_id, 3);
        assert_eq!(config.backend.timeout_ms, 2500);
        assert_eq!(config.generation.ollama_url, "http://gpu-box:11434");
        assert!(!config.logging.enabled);
        assert!(config.logging.verbose);
    }

    #[test]
    fn env_overrides_ignore_invalid_values() {
        let mut config = VitalboardConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("VITALBOARD_MEMBER_ID", "abc"), ("VITALBOARD_BACKEND_URL", "")]),
        );
        assert_eq!(config.backend, schema::BackendConfig::default());
    }

    #[test]
    fn layers_merge_key_by_key() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        merge_values(
            &mut merged,
            parse_layer("[backend]\nbase_url = \"http://global:5000\"\nmember_id = 2\n").unwrap(),
        );
        merge_values(&mut merged, parse_layer("[backend]\nmember_id = 9\n").unwrap());

        let config: VitalboardConfig = merged.try_into().unwrap();
        assert_eq!(config.backend.base_url, "http://global:5000");
        assert_eq!(config.backend.member_id, 9);
    }

    #[test]
    fn malformed_layer_is_rejected() {
        assert!(parse_layer("[backend\n").is_none());
        assert!(parse_layer("[backend]\nmember_id = \"seven\"\n").is_none());
    }

    #[test]
    fn set_toml_value_updates_typed_values() {
        let mut root: toml::Value = toml::from_str(
            r#"
[backend]
base_url = "http://localhost:5000"
member_id = 1

[logging]
verbose = false
"#,
        )
        .unwrap();

        set_toml_value(&mut root, "backend.member_id", "4").unwrap();
        set_toml_value(&mut root, "backend.base_url", "http://10.0.0.2:5000").unwrap();
        set_toml_value(&mut root, "logging.verbose", "yes").unwrap();

        let config: VitalboardConfig = root.try_into().unwrap();
        assert_eq!(config.backend.member_id, 4);
        assert_eq!(config.backend.base_url, "http://10.0.0.2:5000");
        assert!(config.logging.verbose);
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[backend]\nmember_id = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "backend.member_id", "one").is_err());
        assert!(set_toml_value(&mut root, "backend.unknown", "x").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.", "x").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: VitalboardConfig = toml::from_str(&toml_str).unwrap();
    }
}
