use serde::Deserialize;

/// Configuration from config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Glob pattern for list directories, e.g. `~/.local/share/todos/*`
    pub path: String,
    /// strftime format used to display and parse due dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Override for the index cache file location
    #[serde(default)]
    pub cache_path: Option<String>,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}
