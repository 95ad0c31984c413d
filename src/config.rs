//! Optional config file loading. Search order: ./aozorascrape.toml, then
//! $XDG_CONFIG_HOME/aozorascrape/config.toml (or ~/.config/aozorascrape/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Output JSON path when -o is not set. Relative to CWD.
    pub output: Option<PathBuf>,
    /// Minimum seconds between book-detail fetches.
    pub waiting_time_secs: Option<f64>,
    /// Column keys to crawl, in order (e.g. ["a", "ka"]).
    pub columns: Option<Vec<String>>,
    /// Site root, for mirrors of the archive.
    pub base_url: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds. Unset keeps the HTTP library default.
    pub timeout_secs: Option<u64>,
    /// Encoding label pages are decoded with (default Shift_JIS).
    pub encoding: Option<String>,
}

/// Search order: (1) ./aozorascrape.toml, (2) $XDG_CONFIG_HOME/aozorascrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("aozorascrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("aozorascrape").join("config.toml"));
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
