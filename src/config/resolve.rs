use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;

use super::Config;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 3] = ["debug", "info", "error"];

/// Values coming from flags or their environment variables. Both sources
/// are already merged by clap, flags first.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub tree_path: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved settings for the recommendation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub tree_path: PathBuf,
    pub log_level: String,
}

fn pick(over: Option<&str>, file: &str, default: &str) -> String {
    over.filter(|s| !s.is_empty())
        .or(Some(file).filter(|s| !s.is_empty()))
        .unwrap_or(default)
        .to_string()
}

/// Resolve with priority: overrides > file > defaults, then validate.
pub fn resolve(over: &Overrides, file: &Config) -> Result<Resolved> {
    let tree = pick(over.tree_path.as_deref(), &file.tree_path, ".");
    let tree_path = if tree == "." {
        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        PathBuf::from(tree)
    };

    let resolved = Resolved {
        api_key: pick(over.api_key.as_deref(), &file.api_key, ""),
        api_base: pick(over.api_base.as_deref(), &file.api_base, DEFAULT_API_BASE),
        model: pick(over.model.as_deref(), &file.model, DEFAULT_MODEL),
        tree_path,
        log_level: pick(over.log_level.as_deref(), &file.log_level, DEFAULT_LOG_LEVEL),
    };
    validate(&resolved)?;
    Ok(resolved)
}

fn validate(r: &Resolved) -> Result<()> {
    if r.api_key.is_empty() {
        bail!("API key is required. Set it with: sortpath config set api-key YOUR_KEY");
    }
    validate_api_base(&r.api_base)?;
    if r.model.is_empty() {
        bail!("model is required. Set it with: sortpath config set model gpt-3.5-turbo");
    }
    validate_log_level(&r.log_level)?;
    if !r.tree_path.is_dir() {
        bail!(
            "tree path '{}' is not a readable directory. Set it with: sortpath config set tree-path /path/to/folder",
            r.tree_path.display()
        );
    }
    Ok(())
}

pub(crate) fn validate_api_base(base: &str) -> Result<()> {
    match reqwest::Url::parse(base) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
        Ok(u) => bail!(
            "API base URL must use http or https, got '{}'. Use format: https://api.openai.com/v1",
            u.scheme()
        ),
        Err(e) => bail!(
            "invalid API base URL '{}': {}. Use format: https://api.openai.com/v1",
            base,
            e
        ),
    }
}

pub(crate) fn validate_log_level(level: &str) -> Result<()> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        bail!(
            "invalid log level '{}'. Valid options: {}",
            level,
            LOG_LEVELS.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn overrides_beat_file_which_beats_defaults() {
        let td = tempdir().unwrap();
        let file = Config {
            api_key: "from-file".into(),
            model: "file-model".into(),
            tree_path: td.path().display().to_string(),
            ..Config::default()
        };
        let over = Overrides {
            model: Some("flag-model".into()),
            ..Overrides::default()
        };

        let r = resolve(&over, &file).unwrap();
        assert_eq!(r.api_key, "from-file");
        assert_eq!(r.model, "flag-model");
        assert_eq!(r.api_base, DEFAULT_API_BASE);
        assert_eq!(r.log_level, "info");
        assert_eq!(r.tree_path, td.path());
    }

    #[test]
    fn missing_api_key_mentions_config_command() {
        let err = resolve(&Overrides::default(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("sortpath config set api-key"));
    }

    #[test]
    fn missing_tree_dir_is_rejected() {
        let over = Overrides {
            api_key: Some("k".into()),
            tree_path: Some("/definitely/not/here".into()),
            ..Overrides::default()
        };
        assert!(resolve(&over, &Config::default()).is_err());
    }
}
