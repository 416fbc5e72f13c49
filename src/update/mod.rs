mod apply;
mod scheduler;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{ConfigStore, default_store};
use crate::error::Error;
use crate::paths::paths;
use crate::progress::{finish_err, finish_ok, spinner};
use crate::release::{GithubReleases, ReleaseInfo, ReleaseSource};

pub use apply::{ReplaceOutcome, apply_update, sha256_file};
pub use scheduler::{
    CheckOutcome, DEFAULT_INTERVAL, FileStamp, Scheduler, SkipReason, StampStore,
    spawn_background_check,
};

/// Builds without a release version (`dev`, empty, `*-dev`) never check
/// for updates.
pub fn is_dev_version(v: &str) -> bool {
    let v = v.trim();
    v.is_empty() || v == "dev" || v.ends_with("-dev")
}

/// Header and follow-up instruction for a "new version" message.
///
/// The background variant is terser since it interrupts another command.
pub fn notification(latest: &str, current: &str, background: bool) -> (String, String) {
    if background {
        (
            format!("A new version of sortpath is available: {} (current {})", latest, current),
            "Run 'sortpath update' to upgrade.".to_string(),
        )
    } else {
        (
            format!("Update available: {} → {}", current, latest),
            "Run 'sortpath update' to download and install it.".to_string(),
        )
    }
}

/// Scheduler wired to the real endpoint and cache file.
pub fn default_scheduler() -> Result<Scheduler> {
    let source = GithubReleases::new()?;
    let stamp = FileStamp::new(paths()?.last_update_check);
    Ok(Scheduler::new(Box::new(source), Box::new(stamp)))
}

/// What `sortpath update` decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    UpToDate(ReleaseInfo),
    CheckOnly(ReleaseInfo),
    Apply(ReleaseInfo),
}

/// Compare the latest release with `current` and decide whether to apply it.
///
/// # Errors
/// - Whatever the release source fails with.
/// - [`Error::NotInstalled`] when an update is wanted but the install state
///   is empty, or points at a file that has since been removed.
pub fn plan_update(
    source: &dyn ReleaseSource,
    store: &dyn ConfigStore,
    current: &str,
    check_only: bool,
) -> Result<UpdatePlan> {
    let rel = source.latest_release()?;
    if rel.version == current.trim_start_matches('v') {
        return Ok(UpdatePlan::UpToDate(rel));
    }
    if check_only {
        return Ok(UpdatePlan::CheckOnly(rel));
    }

    let cfg = store.load()?;
    match cfg.installed_path() {
        None => Err(Error::NotInstalled.into()),
        Some(p) if !p.exists() => {
            log::warn!("recorded install {} no longer exists", p.display());
            Err(Error::NotInstalled.into())
        }
        Some(_) => Ok(UpdatePlan::Apply(rel)),
    }
}

fn update_target(store: &dyn ConfigStore) -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine current executable path")?;
    if let Some(installed) = store.load()?.installed_path()
        && installed != exe
    {
        log::warn!(
            "running {} but the recorded install is {}; updating the running binary",
            exe.display(),
            installed.display()
        );
    }
    Ok(exe)
}

/// CLI command: check for and apply a newer release.
pub fn cmd_update(current: &str, check_only: bool) -> Result<()> {
    let source = GithubReleases::new()?;
    let store = default_store()?;

    let pb = spinner("checking for updates…");
    let plan = match plan_update(&source, &store, current, check_only) {
        Ok(plan) => plan,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let rel = match plan {
        UpdatePlan::UpToDate(_) => {
            finish_ok(&pb, format!("already running the latest version: {}", current));
            return Ok(());
        }
        UpdatePlan::CheckOnly(rel) => {
            pb.finish_and_clear();
            let (header, instruction) = notification(&rel.version, current, false);
            println!("{}", header.yellow().bold());
            println!("{}", instruction);
            return Ok(());
        }
        UpdatePlan::Apply(rel) => rel,
    };

    let (header, _) = notification(&rel.version, current, false);
    pb.println(header);
    pb.set_message(format!("downloading and installing {}…", rel.version));

    let target = update_target(&store)?;
    match apply_update(source.client(), &rel, &target) {
        Ok(ReplaceOutcome::Replaced) => {
            finish_ok(&pb, format!("updated to version {}", rel.version));
            Ok(())
        }
        Ok(ReplaceOutcome::Unchanged) => {
            finish_ok(&pb, format!("binary already matches {}", rel.version));
            Ok(())
        }
        Err(e) => {
            finish_err(&pb, format!("update to {} failed", rel.version));
            Err(e.into())
        }
    }
}
