mod copy;
mod installer;
mod shell_path;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::default_store;
use crate::error::Error;
use crate::paths::home_dir;

pub use copy::{copy_binary, make_executable, same_file};
pub use installer::{InstallReport, Installer, PathStatus, fallback_dirs};
pub use shell_path::{
    PathEnsurer, PathOutcome, Shell, ShellProfile, manual_instruction, path_contains,
};

/// CLI command: copy the running binary into `dest_dir`.
///
/// An existing install without `--force` is reported as a warning, not a
/// failure.
pub fn cmd_install(dest_dir: &Path, force: bool) -> Result<()> {
    let store = default_store()?;
    let profile = ShellProfile::from_env();
    let installer = Installer::new(&store, &profile, home_dir().ok());

    let report = match installer.install(dest_dir, force) {
        Ok(r) => r,
        Err(e) => {
            if let Some(err @ Error::AlreadyInstalled(_)) = e.downcast_ref::<Error>() {
                eprintln!("{} {}", "warning:".yellow().bold(), err);
                eprintln!("  {}", err.suggestion());
                return Ok(());
            }
            return Err(e);
        }
    };

    println!(
        "{} installed sortpath to {}",
        "✓".green().bold(),
        report.path.display()
    );
    if !report.used_fallback {
        return Ok(());
    }

    println!(
        "{} no write access to {}; used {} instead",
        "note:".yellow().bold(),
        dest_dir.display(),
        report.path.display()
    );
    match report.path_status {
        Some(PathStatus::Configured(PathOutcome::Added(profile))) => {
            println!("added its directory to PATH in {}", profile.display());
            println!("restart your shell or run: source {}", profile.display());
        }
        Some(PathStatus::Configured(PathOutcome::AlreadyConfigured(profile))) => {
            println!("{} already adds it to PATH", profile.display());
        }
        Some(PathStatus::Configured(PathOutcome::AlreadyOnPath)) | None => {}
        Some(PathStatus::Manual { reason, instruction }) => {
            println!("could not update your shell profile ({})", reason);
            println!("add this line to it manually:\n  {}", instruction);
        }
    }
    Ok(())
}
