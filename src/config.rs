//! Optional config file loading. Search order: ./goldenmangas.toml, then
//! $XDG_CONFIG_HOME/goldenmangas/config.toml (or ~/.config/goldenmangas/config.toml).

use serde::Deserialize;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Site root, e.g. a mirror of https://goldenmanga.top.
    pub base_url: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Minimum seconds between two requests.
    pub request_interval_secs: Option<u64>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

/// Search order: (1) ./goldenmangas.toml, (2) $XDG_CONFIG_HOME/goldenmangas/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("goldenmangas.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("goldenmangas").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}
