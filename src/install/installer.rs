use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use super::copy::{copy_binary, same_file};
use super::shell_path::{PathEnsurer, PathOutcome, manual_instruction};
use crate::config::ConfigStore;
use crate::error::Error;
use crate::paths::BIN_NAME;

type Copier<'a> = Box<dyn Fn(&Path, &Path) -> io::Result<()> + 'a>;

/// User-writable directories tried, in order, when the primary target
/// rejects the write. Only the first is used; it is created on demand.
pub fn fallback_dirs(home: &Path) -> [PathBuf; 2] {
    [home.join("bin"), home.join(".local").join("bin")]
}

/// How the fallback directory ended up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStatus {
    Configured(PathOutcome),
    /// The profile could not be edited; the user has to add the line.
    Manual { reason: String, instruction: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub path: PathBuf,
    pub used_fallback: bool,
    /// Only set for fallback installs.
    pub path_status: Option<PathStatus>,
}

/// Copies the running executable into a bin directory and records where.
pub struct Installer<'a> {
    store: &'a dyn ConfigStore,
    path: &'a dyn PathEnsurer,
    home: Option<PathBuf>,
    source: Option<PathBuf>,
    copy: Copier<'a>,
}

impl<'a> Installer<'a> {
    pub fn new(
        store: &'a dyn ConfigStore,
        path: &'a dyn PathEnsurer,
        home: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            path,
            home,
            source: None,
            copy: Box::new(copy_binary),
        }
    }

    /// Install this file instead of the current executable.
    pub fn with_source(mut self, src: impl Into<PathBuf>) -> Self {
        self.source = Some(src.into());
        self
    }

    pub fn with_copier(mut self, copy: impl Fn(&Path, &Path) -> io::Result<()> + 'a) -> Self {
        self.copy = Box::new(copy);
        self
    }

    /// Resolved on every call: the process image may have moved since
    /// startup.
    fn source(&self) -> Result<PathBuf> {
        match &self.source {
            Some(p) => Ok(p.clone()),
            None => std::env::current_exe().context("cannot determine current executable path"),
        }
    }

    /// Install into `dest_dir`, falling back to `~/bin` on permission errors.
    ///
    /// Process:
    /// 1. Refuse to overwrite an existing binary unless `force`.
    /// 2. Copy into `dest_dir`; on success record the path and stop.
    /// 3. On permission denied, copy into the first fallback directory,
    ///    record that path and make sure the directory is on `PATH`.
    ///
    /// # Errors
    /// - [`Error::AlreadyInstalled`] if the destination exists and `force` is false.
    /// - [`Error::InstallFailed`] if both the primary and the fallback copy fail.
    /// - [`Error::CopyFailed`] for non-permission copy failures.
    pub fn install(&self, dest_dir: &Path, force: bool) -> Result<InstallReport> {
        let src = self.source()?;
        let dest_dir = std::path::absolute(dest_dir)
            .with_context(|| format!("invalid install directory {}", dest_dir.display()))?;
        let primary = dest_dir.join(BIN_NAME);

        if !force && primary.exists() {
            return Err(Error::AlreadyInstalled(primary).into());
        }

        let err = match self.place(&src, &primary) {
            Ok(()) => {
                self.record(&primary)?;
                return Ok(InstallReport {
                    path: primary,
                    used_fallback: false,
                    path_status: None,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => e,
            Err(e) => {
                return Err(Error::CopyFailed {
                    src,
                    dest: primary,
                    err: e,
                }
                .into());
            }
        };

        let Some(home) = &self.home else {
            return Err(Error::Permission(primary).into());
        };
        let [fallback_dir, _] = fallback_dirs(home);
        let fallback = fallback_dir.join(BIN_NAME);
        log::warn!(
            "no permission to write {}; trying {}",
            primary.display(),
            fallback.display()
        );

        if !force && fallback.exists() {
            return Err(Error::AlreadyInstalled(fallback).into());
        }
        if let Err(e2) = self.place(&src, &fallback) {
            return Err(Error::InstallFailed {
                source_path: src,
                primary_path: primary,
                primary: err,
                fallback_path: fallback,
                fallback: e2,
            }
            .into());
        }
        self.record(&fallback)?;

        let path_status = match self.path.ensure_on_path(&fallback_dir) {
            Ok(outcome) => PathStatus::Configured(outcome),
            Err(e) => {
                log::warn!("could not update shell profile: {}", e);
                PathStatus::Manual {
                    reason: e.to_string(),
                    instruction: manual_instruction(&fallback_dir),
                }
            }
        };
        Ok(InstallReport {
            path: fallback,
            used_fallback: true,
            path_status: Some(path_status),
        })
    }

    fn place(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if same_file(src, dst) {
            log::info!("{} is already the running binary; skipping copy", dst.display());
            return Ok(());
        }
        (self.copy)(src, dst)
    }

    fn record(&self, installed: &Path) -> Result<()> {
        let mut cfg = self.store.load()?;
        cfg.installed_path = installed.display().to_string();
        self.store.save(&cfg).context("failed to record install location")
    }
}
