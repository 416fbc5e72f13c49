use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::{is_dev_version, notification};
use crate::config::write_atomic;
use crate::error::Result;
use crate::release::{ReleaseInfo, ReleaseSource};

/// Minimum time between two automatic checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Where the time of the last automatic check is kept.
pub trait StampStore: Send + Sync {
    /// `None` when no check was ever recorded or the record is unreadable.
    fn last_check(&self) -> Option<DateTime<Utc>>;
    fn record(&self, at: DateTime<Utc>) -> AnyResult<()>;
}

/// Cache file holding a single RFC 3339 timestamp.
pub struct FileStamp {
    path: PathBuf,
}

impl FileStamp {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StampStore for FileStamp {
    fn last_check(&self) -> Option<DateTime<Utc>> {
        let txt = fs::read_to_string(&self.path).ok()?;
        DateTime::parse_from_rfc3339(txt.trim())
            .map(|t| t.with_timezone(&Utc))
            .ok()
    }

    fn record(&self, at: DateTime<Utc>) -> AnyResult<()> {
        write_atomic(&self.path, at.to_rfc3339().as_bytes())
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DevBuild,
    Throttled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Skipped(SkipReason),
    UpToDate(ReleaseInfo),
    Available(ReleaseInfo),
}

impl CheckOutcome {
    /// Whether the caller should tell the user about a new release.
    pub fn notify(&self) -> bool {
        matches!(self, CheckOutcome::Available(_))
    }
}

/// Throttled release checks.
pub struct Scheduler {
    source: Box<dyn ReleaseSource>,
    stamps: Box<dyn StampStore>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(source: Box<dyn ReleaseSource>, stamps: Box<dyn StampStore>) -> Self {
        Self {
            source,
            stamps,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Consult the release source unless this is a development build or the
    /// last check is more recent than the interval.
    ///
    /// The stamp is rewritten before the source's result is inspected, so a
    /// failing endpoint is retried only once per interval.
    pub fn maybe_check(&self, current_version: &str) -> Result<CheckOutcome> {
        if is_dev_version(current_version) {
            return Ok(CheckOutcome::Skipped(SkipReason::DevBuild));
        }

        let now = Utc::now();
        if let Some(last) = self.stamps.last_check() {
            // A stamp in the future (clock moved back) does not throttle.
            if let Ok(elapsed) = (now - last).to_std()
                && elapsed < self.interval
            {
                log::debug!("update check throttled (last check {})", last.to_rfc3339());
                return Ok(CheckOutcome::Skipped(SkipReason::Throttled));
            }
        }

        let result = self.source.latest_release();
        if let Err(e) = self.stamps.record(now) {
            log::debug!("could not record update check: {:#}", e);
        }
        let rel = result?;

        if rel.version == current_version.trim_start_matches('v') {
            Ok(CheckOutcome::UpToDate(rel))
        } else {
            Ok(CheckOutcome::Available(rel))
        }
    }
}

/// Run [`Scheduler::maybe_check`] on a detached thread.
///
/// The thread is never joined: if the process exits first, the notification
/// is simply not shown. Errors are logged at debug level and dropped.
pub fn spawn_background_check(scheduler: Scheduler, current_version: String) {
    thread::spawn(move || match scheduler.maybe_check(&current_version) {
        Ok(CheckOutcome::Available(rel)) => {
            let (header, instruction) = notification(&rel.version, &current_version, true);
            eprintln!("\n{}\n{}\n", header.yellow().bold(), instruction);
        }
        Ok(outcome) => log::debug!("background update check: {:?}", outcome),
        Err(e) => log::debug!("background update check failed: {}", e),
    });
}
