use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Config;

/// Persistence seam for [`Config`].
///
/// Records are read and written whole; there is no field-level merging
/// between concurrent processes, so the last writer wins.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn save(&self, cfg: &Config) -> Result<()>;
}

/// TOML file on disk, usually `$XDG_CONFIG_HOME/sortpath/config.toml`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileStore {
    /// A missing file yields the empty config.
    fn load(&self) -> Result<Config> {
        let txt = match fs::read_to_string(&self.path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        let txt = toml::to_string_pretty(cfg).context("failed to serialize config")?;
        write_atomic(&self.path, txt.as_bytes())
            .with_context(|| format!("failed to save {}", self.path.display()))
    }
}

/// Write `data` to a sibling temp file, then rename it over `path`.
///
/// Readers observe either the previous contents or the new ones.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-sortpath-")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
pub use memory::MemoryStore;
