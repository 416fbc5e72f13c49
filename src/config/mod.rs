//! User configuration.
//!
//! The config file holds both the user-facing settings (`api_key`, `model`,
//! ...) and the install state written by the installer (`installed_path`).
//! Access always goes through a [`ConfigStore`] so tests can swap in an
//! in-memory store.
//!
//! Example TOML:
//! ```toml
//! api_base = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! installed_path = "/usr/local/bin/sortpath"
//! ```

mod resolve;
mod store;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub use resolve::{Overrides, Resolved, resolve};
#[cfg(test)]
pub use store::MemoryStore;
pub use store::{ConfigStore, FileStore, write_atomic};

use crate::paths::paths;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tree_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_level: String,
    /// Where `sortpath install` last placed the binary. Empty when the
    /// running binary was never installed by us.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installed_path: String,
}

impl Config {
    pub fn installed_path(&self) -> Option<PathBuf> {
        if self.installed_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.installed_path))
        }
    }
}

/// User-settable keys, spelled the way the CLI accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ApiKey,
    ApiBase,
    Model,
    TreePath,
    LogLevel,
}

impl Key {
    pub const ALL: [Key; 5] = [
        Key::ApiKey,
        Key::ApiBase,
        Key::Model,
        Key::TreePath,
        Key::LogLevel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Key::ApiKey => "api-key",
            Key::ApiBase => "api-base",
            Key::Model => "model",
            Key::TreePath => "tree-path",
            Key::LogLevel => "log-level",
        }
    }

    fn slot(self, cfg: &mut Config) -> &mut String {
        match self {
            Key::ApiKey => &mut cfg.api_key,
            Key::ApiBase => &mut cfg.api_base,
            Key::Model => &mut cfg.model,
            Key::TreePath => &mut cfg.tree_path,
            Key::LogLevel => &mut cfg.log_level,
        }
    }
}

impl FromStr for Key {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Key::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Key::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!("unknown config key: {} (valid: {})", s, valid.join(", "))
            })
    }
}

/// What `sortpath config ...` should do.
#[derive(Debug, Clone)]
pub enum ConfigAction {
    Set(String, String),
    Get(String),
    Remove(String),
    List,
}

pub fn default_store() -> Result<FileStore> {
    Ok(FileStore::new(paths()?.config))
}

/// CLI command: read or modify persisted settings.
pub fn cmd_config(action: ConfigAction) -> Result<()> {
    let store = default_store()?;
    for line in run_config(&store, action)? {
        println!("{}", line);
    }
    Ok(())
}

fn run_config(store: &dyn ConfigStore, action: ConfigAction) -> Result<Vec<String>> {
    let mut cfg = store.load()?;
    match action {
        ConfigAction::Set(key, value) => {
            let key: Key = key.parse()?;
            let value = sanitize(key, &value)?;
            *key.slot(&mut cfg) = value;
            store.save(&cfg)?;
            log::info!("set {}", key.as_str());
            Ok(Vec::new())
        }
        ConfigAction::Get(key) => {
            let key: Key = key.parse()?;
            Ok(vec![key.slot(&mut cfg).clone()])
        }
        ConfigAction::Remove(key) => {
            let key: Key = key.parse()?;
            key.slot(&mut cfg).clear();
            store.save(&cfg)?;
            Ok(Vec::new())
        }
        ConfigAction::List => Ok(Key::ALL
            .into_iter()
            .map(|k| {
                let v = k.slot(&mut cfg).clone();
                let shown = if k == Key::ApiKey { redact(&v) } else { v };
                format!("{}: {}", k.as_str(), shown)
            })
            .collect()),
    }
}

fn sanitize(key: Key, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() && matches!(key, Key::ApiKey | Key::Model | Key::TreePath) {
        bail!(
            "{} cannot be empty; use 'sortpath config remove {}'",
            key.as_str(),
            key.as_str()
        );
    }
    match key {
        Key::ApiKey => {
            if value.chars().any(char::is_control) {
                bail!(
                    "API key contains invalid characters. Set it with: sortpath config set api-key YOUR_KEY"
                );
            }
            Ok(value.to_string())
        }
        Key::ApiBase => {
            resolve::validate_api_base(value)?;
            Ok(value.trim_end_matches('/').to_string())
        }
        Key::Model => {
            if !value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
            {
                bail!(
                    "model name contains invalid characters. Use alphanumeric characters, hyphens, dots and underscores only"
                );
            }
            Ok(value.to_string())
        }
        Key::TreePath => {
            if Path::new(value)
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                bail!(
                    "tree path '{}' contains directory traversal sequences. Use an absolute path such as /path/to/folder",
                    value
                );
            }
            Ok(value.to_string())
        }
        Key::LogLevel => {
            resolve::validate_log_level(value)?;
            Ok(value.to_ascii_lowercase())
        }
    }
}

fn redact(v: &str) -> String {
    let n = v.chars().count();
    if n == 0 {
        String::new()
    } else if n <= 8 {
        "*".repeat(n)
    } else {
        let head: String = v.chars().take(4).collect();
        format!("{}…{}", head, "*".repeat(4))
    }
}
