// src/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_KEYWORDS_PATH: &str = "KEYWORDS_CONFIG_PATH";
const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// true = implicit TLS (SMTPS), false = STARTTLS.
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub smtp: SmtpConfig,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("{key} missing"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(v) => v.parse().map_err(|_| anyhow!("invalid {key}: {v}")),
        Err(_) => Ok(default),
    }
}

impl MonitorConfig {
    /// Read the full configuration from the process environment.
    /// Missing required SMTP settings are startup-fatal.
    pub fn from_env() -> Result<Self> {
        let user = require_env("SMTP_USER")?;
        let smtp = SmtpConfig {
            host: require_env("SMTP_HOST")?,
            port: env_or("SMTP_PORT", 465u16)?,
            secure: env_or("SMTP_SECURE", true)?,
            pass: require_env("SMTP_PASS")?,
            from: std::env::var("NOTIFY_EMAIL_FROM")
                .unwrap_or_else(|_| format!("Monitor <{user}>")),
            to: require_env("NOTIFY_EMAIL_TO")?,
            user,
        };

        Ok(Self {
            smtp,
            data_dir: std::env::var("MONITOR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            poll_interval: Duration::from_secs(env_or("MONITOR_INTERVAL_SECS", 3600u64)?),
            http_timeout: Duration::from_secs(env_or("HTTP_TIMEOUT_SECS", 30u64)?),
        })
    }
}

/// Per-source keyword overrides, keyed by source name (lowercased).
/// Sources not present keep their built-in defaults.
pub type KeywordOverrides = HashMap<String, Vec<String>>;

/// Load keyword overrides from an explicit TOML path.
pub fn load_keywords_from(path: &Path) -> Result<KeywordOverrides> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading keywords from {}", path.display()))?;
    parse_keywords(&content)
}

/// Load keyword overrides using env var + fallback:
/// 1) $KEYWORDS_CONFIG_PATH
/// 2) config/keywords.toml
/// Absent files mean "no overrides".
pub fn load_keywords_default() -> Result<KeywordOverrides> {
    if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_keywords_from(&pb);
        }
        return Err(anyhow!("KEYWORDS_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_KEYWORDS_PATH);
    if default.exists() {
        return load_keywords_from(&default);
    }
    Ok(HashMap::new())
}

fn parse_keywords(s: &str) -> Result<KeywordOverrides> {
    #[derive(serde::Deserialize)]
    struct KeywordsFile {
        #[serde(default)]
        keywords: HashMap<String, Vec<String>>,
    }
    let parsed: KeywordsFile = toml::from_str(s).context("parsing keywords toml")?;
    Ok(parsed
        .keywords
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), clean_list(v)))
        .collect())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keywords_trims_and_dedups() {
        let toml = r#"
[keywords]
Eleduck = [" 前端 ", "", "全栈", "全栈"]
v2ex = ["前端"]
"#;
        let out = parse_keywords(toml).unwrap();
        assert_eq!(out["eleduck"], vec!["前端", "全栈"]);
        assert_eq!(out["v2ex"], vec!["前端"]);
    }

    #[serial_test::serial]
    #[test]
    fn from_env_requires_smtp_credentials() {
        for k in ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "NOTIFY_EMAIL_TO"] {
            std::env::remove_var(k);
        }
        assert!(MonitorConfig::from_env().is_err());

        std::env::set_var("SMTP_HOST", "smtp.example.com");
        std::env::set_var("SMTP_USER", "bot@example.com");
        std::env::set_var("SMTP_PASS", "secret");
        std::env::set_var("NOTIFY_EMAIL_TO", "inbox@example.com");
        let cfg = MonitorConfig::from_env().unwrap();
        assert_eq!(cfg.smtp.port, 465);
        assert!(cfg.smtp.secure);
        assert_eq!(cfg.smtp.from, "Monitor <bot@example.com>");
        for k in ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "NOTIFY_EMAIL_TO"] {
            std::env::remove_var(k);
        }
    }
}
