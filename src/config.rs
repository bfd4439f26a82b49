// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const ENV_SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const ENV_RECEIVER_EMAIL: &str = "RECEIVER_EMAIL";
pub const ENV_STATE_DIR: &str = "TENDER_STATE_DIR";
pub const ENV_KEYWORDS_PATH: &str = "TENDER_KEYWORDS_PATH";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "amc",
    "laptop",
    "dell",
    "lenovo",
    "hp",
    "server",
    "switch",
    "networking",
];

/// Everything one source pipeline needs besides its fetch/extract strategies.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Short label used in logs and in the email subject, e.g. "GeM".
    pub label: String,
    pub url: String,
    /// Lowercase substrings; a notification matching any of them is relevant.
    pub keywords: Vec<String>,
    pub state_path: PathBuf,
    /// Adds a link column to the digest table.
    pub show_links: bool,
}

impl SourceConfig {
    pub fn new(label: &str, url: &str, state_file: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            keywords: clean_keywords(DEFAULT_KEYWORDS.iter().map(|s| s.to_string())),
            state_path: PathBuf::from(state_file),
            show_links: false,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = clean_keywords(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    pub fn with_links(mut self, show: bool) -> Self {
        self.show_links = show;
        self
    }

    /// Apply the optional environment overrides:
    /// - `$TENDER_STATE_DIR` moves the state file into that directory
    /// - `$TENDER_KEYWORDS_PATH` replaces the keyword list (TOML or JSON)
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(dir) = non_blank_env(ENV_STATE_DIR) {
            let file = self
                .state_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| self.state_path.clone());
            self.state_path = PathBuf::from(dir).join(file);
        }
        if let Some(p) = non_blank_env(ENV_KEYWORDS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_KEYWORDS_PATH} points to non-existent path"));
            }
            self.keywords = load_keywords_from(&pb)?;
        }
        Ok(self)
    }
}

/// Sender/recipient settings for the digest email.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            sender: None,
            password: None,
            recipient: None,
        }
    }
}

impl MailConfig {
    /// Reads the three credentials from the environment. Missing or blank
    /// values stay `None`; that only disables sending.
    pub fn from_env() -> Self {
        Self {
            sender: non_blank_env(ENV_SENDER_EMAIL),
            password: non_blank_env(ENV_SENDER_PASSWORD),
            recipient: non_blank_env(ENV_RECEIVER_EMAIL),
            ..Self::default()
        }
    }

    pub fn with_credentials(sender: &str, password: &str, recipient: &str) -> Self {
        Self {
            sender: Some(sender.to_string()),
            password: Some(password.to_string()),
            recipient: Some(recipient.to_string()),
            ..Self::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }

    /// `(sender, password, recipient)` when all three are present.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.sender, &self.password, &self.recipient) {
            (Some(s), Some(p), Some(r)) => Some((s.as_str(), p.as_str(), r.as_str())),
            _ => None,
        }
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load a keyword list from an explicit path. Supports TOML
/// (`keywords = [...]`) or a JSON array.
pub fn load_keywords_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading keywords from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_keywords(&content, ext.as_str())
}

#[derive(serde::Deserialize)]
struct KeywordFile {
    keywords: Vec<String>,
}

/// `ext` picks the format: `toml` wants a `keywords = [...]` table, `json` a
/// bare array.
fn parse_keywords(s: &str, ext: &str) -> Result<Vec<String>> {
    let raw = match ext {
        "toml" => toml::from_str::<KeywordFile>(s)?.keywords,
        "json" => serde_json::from_str::<Vec<String>>(s)?,
        other => bail!("unsupported keywords format {other:?}"),
    };
    Ok(clean_keywords(raw))
}

/// Lowercase + trim, drop blanks and repeats. Keeps first-seen order.
fn clean_keywords<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
