use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_LOG_DIR: &str = "log";

fn default_interval() -> u64 {
    60
}

fn default_write_interval() -> u64 {
    60
}

fn default_file_interval() -> u64 {
    600
}

/// One security to watch, with its simulated buy/sell thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockEntry {
    pub code: String,
    pub buy_price: f64,
    pub sell_price: f64,
}

/// Runtime settings, loaded once at startup from a JSON document.
///
/// All intervals are in seconds; missing intervals fall back to the
/// defaults (poll 60s, flush 60s, rotate 600s).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Poll period: one driver pass over all trackers per interval.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Flush period: how often each tracker writes its buffer out.
    #[serde(default = "default_write_interval")]
    pub write_interval: u64,
    /// Rotation period: how often each tracker starts a new log file.
    #[serde(default = "default_file_interval")]
    pub file_interval: u64,
    pub stocks: Vec<StockEntry>,
}

impl Settings {
    /// Load settings from a JSON file. Startup errors are fatal: a
    /// missing or malformed file propagates to the caller.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;

        if settings.stocks.is_empty() {
            return Err("config contains no stocks to watch".into());
        }

        Ok(settings)
    }
}

/// Create the log directory if it does not exist yet.
pub fn ensure_log_dir(dir: impl AsRef<Path>) -> crate::Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create log dir {}: {}", dir.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"{
                "interval": 30,
                "write_interval": 120,
                "file_interval": 1800,
                "stocks": [
                    {"code": "sh600000", "buy_price": 7.5, "sell_price": 8.2},
                    {"code": "sz000001", "buy_price": 10.0, "sell_price": 11.5}
                ]
            }"#,
        );

        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.interval, 30);
        assert_eq!(settings.write_interval, 120);
        assert_eq!(settings.file_interval, 1800);
        assert_eq!(settings.stocks.len(), 2);
        assert_eq!(settings.stocks[0].code, "sh600000");
        assert_eq!(settings.stocks[1].sell_price, 11.5);
    }

    #[test]
    fn test_interval_defaults() {
        let file = write_config(
            r#"{"stocks": [{"code": "sh600000", "buy_price": 7.5, "sell_price": 8.2}]}"#,
        );

        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.interval, 60);
        assert_eq!(settings.write_interval, 60);
        assert_eq!(settings.file_interval, 600);
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let result = Settings::load("/definitely/not/here/config.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let file = write_config("{not json");
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_watch_list_is_fatal() {
        let file = write_config(r#"{"stocks": []}"#);
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn test_ensure_log_dir_creates_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        ensure_log_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Idempotent on an existing directory
        ensure_log_dir(&nested).unwrap();
    }
}
