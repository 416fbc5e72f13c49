use chrono::Utc;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::paths::home_dir;

/// Result of [`PathEnsurer::ensure_on_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// `PATH` already has the directory; nothing written.
    AlreadyOnPath,
    /// The profile already mentions the directory; nothing written.
    AlreadyConfigured(PathBuf),
    /// An export line was appended to this profile.
    Added(PathBuf),
}

/// Makes a directory reachable through `PATH`.
pub trait PathEnsurer {
    fn is_on_path(&self, dir: &Path) -> bool;
    fn ensure_on_path(&self, dir: &Path) -> io::Result<PathOutcome>;
}

/// Exact segment match of `dir` against a `PATH`-style value.
pub fn path_contains(path_var: Option<&OsStr>, dir: &Path) -> bool {
    match path_var {
        Some(v) => env::split_paths(v).any(|p| p == dir),
        None => false,
    }
}

/// The line users can paste by hand when we could not edit their profile.
pub fn manual_instruction(dir: &Path) -> String {
    format!("export PATH=\"{}:$PATH\"", dir.display())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    Zsh,
    Bash,
    Other,
}

impl Shell {
    /// Classify a `$SHELL` value by its basename.
    pub fn from_shell_var(value: Option<&str>) -> Self {
        let name = value
            .and_then(|v| Path::new(v).file_name())
            .map(|n| n.to_string_lossy().into_owned());
        match name.as_deref() {
            Some("zsh") => Shell::Zsh,
            Some("bash") => Shell::Bash,
            _ => Shell::Other,
        }
    }

    /// Startup file this shell reads. Bash prefers an existing
    /// `.bash_profile` (the macOS login-shell convention).
    pub fn profile(&self, home: &Path) -> PathBuf {
        match self {
            Shell::Zsh => home.join(".zshrc"),
            Shell::Bash => {
                let bash_profile = home.join(".bash_profile");
                if bash_profile.exists() {
                    bash_profile
                } else {
                    home.join(".bashrc")
                }
            }
            Shell::Other => home.join(".profile"),
        }
    }
}

/// Appends `export PATH=...` to the user's shell profile.
///
/// Without a home directory there is no profile to edit; `PATH` checks
/// still work and [`PathEnsurer::ensure_on_path`] reports an error instead.
pub struct ShellProfile {
    home: Option<PathBuf>,
    shell: Shell,
    path_var: Option<OsString>,
}

impl ShellProfile {
    pub fn new(home: Option<PathBuf>, shell: Shell, path_var: Option<OsString>) -> Self {
        Self {
            home,
            shell,
            path_var,
        }
    }

    /// Snapshot of `HOME`, `SHELL` and `PATH` for this process.
    pub fn from_env() -> Self {
        let shell = env::var("SHELL").ok();
        Self::new(
            home_dir().ok(),
            Shell::from_shell_var(shell.as_deref()),
            env::var_os("PATH"),
        )
    }

    pub fn profile_path(&self) -> Option<PathBuf> {
        self.home.as_deref().map(|h| self.shell.profile(h))
    }
}

impl PathEnsurer for ShellProfile {
    fn is_on_path(&self, dir: &Path) -> bool {
        path_contains(self.path_var.as_deref(), dir)
    }

    fn ensure_on_path(&self, dir: &Path) -> io::Result<PathOutcome> {
        if self.is_on_path(dir) {
            return Ok(PathOutcome::AlreadyOnPath);
        }

        let profile = self.profile_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "HOME is not set; cannot locate a shell profile",
            )
        })?;
        let dir_text = dir.display().to_string();
        match fs::read_to_string(&profile) {
            Ok(existing) if existing.contains(&dir_text) => {
                log::debug!("{} already mentions {}", profile.display(), dir_text);
                return Ok(PathOutcome::AlreadyConfigured(profile));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let snippet = format!(
            "\n# Added by sortpath on {}\n{}\n",
            Utc::now().to_rfc3339(),
            manual_instruction(dir)
        );
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&profile)?;
        f.write_all(snippet.as_bytes())?;
        log::info!("added {} to PATH in {}", dir_text, profile.display());
        Ok(PathOutcome::Added(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn profile_selection_follows_shell() {
        let td = tempdir().unwrap();
        let home = td.path();

        assert_eq!(
            Shell::from_shell_var(Some("/bin/zsh")).profile(home),
            home.join(".zshrc")
        );
        assert_eq!(
            Shell::from_shell_var(Some("/usr/local/bin/bash")).profile(home),
            home.join(".bashrc")
        );
        fs::write(home.join(".bash_profile"), "").unwrap();
        assert_eq!(
            Shell::from_shell_var(Some("/bin/bash")).profile(home),
            home.join(".bash_profile")
        );
        assert_eq!(
            Shell::from_shell_var(Some("/usr/bin/fish")).profile(home),
            home.join(".profile")
        );
        assert_eq!(Shell::from_shell_var(None), Shell::Other);
    }

    #[test]
    fn path_membership_is_exact_segment_match() {
        let var = env::join_paths(["/usr/bin", "/home/u/bin2", "/home/u/.local/bin/"]).unwrap();
        assert!(path_contains(Some(var.as_os_str()), Path::new("/usr/bin")));
        assert!(!path_contains(Some(var.as_os_str()), Path::new("/home/u/bin")));
        assert!(!path_contains(Some(var.as_os_str()), Path::new("/usr")));
        assert!(!path_contains(None, Path::new("/usr/bin")));
    }

    #[test]
    fn dir_already_on_path_writes_nothing() {
        let td = tempdir().unwrap();
        let dir = td.path().join("bin");
        let p = ShellProfile::new(
            Some(td.path().to_path_buf()),
            Shell::Zsh,
            Some(env::join_paths([&dir]).unwrap()),
        );
        assert_eq!(p.ensure_on_path(&dir).unwrap(), PathOutcome::AlreadyOnPath);
        assert!(!td.path().join(".zshrc").exists());
    }

    #[test]
    fn ensure_twice_modifies_profile_once() {
        let td = tempdir().unwrap();
        let dir = td.path().join("bin");
        let p = ShellProfile::new(
            Some(td.path().to_path_buf()),
            Shell::Zsh,
            Some(OsString::from("/usr/bin")),
        );
        let rc = td.path().join(".zshrc");
        fs::write(&rc, "alias ll='ls -l'\n").unwrap();

        assert_eq!(p.ensure_on_path(&dir).unwrap(), PathOutcome::Added(rc.clone()));
        let after_first = fs::read_to_string(&rc).unwrap();
        assert_eq!(
            p.ensure_on_path(&dir).unwrap(),
            PathOutcome::AlreadyConfigured(rc.clone())
        );
        let after_second = fs::read_to_string(&rc).unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.matches("export PATH=").count(), 1);
        assert!(after_second.starts_with("alias ll='ls -l'\n"));
        assert!(after_second.contains("# Added by sortpath on "));
        assert!(after_second.contains(&format!("export PATH=\"{}:$PATH\"", dir.display())));
    }

    #[test]
    fn missing_profile_is_created() {
        let td = tempdir().unwrap();
        let dir = td.path().join(".local").join("bin");
        let p = ShellProfile::new(Some(td.path().to_path_buf()), Shell::Other, None);
        assert_eq!(
            p.ensure_on_path(&dir).unwrap(),
            PathOutcome::Added(td.path().join(".profile"))
        );
        assert!(td.path().join(".profile").is_file());
    }

    #[test]
    fn without_home_only_path_membership_works() {
        let var = env::join_paths(["/opt/bin"]).unwrap();
        let p = ShellProfile::new(None, Shell::Zsh, Some(var));
        assert_eq!(p.profile_path(), None);
        assert_eq!(
            p.ensure_on_path(Path::new("/opt/bin")).unwrap(),
            PathOutcome::AlreadyOnPath
        );
        let err = p.ensure_on_path(Path::new("/home/u/bin")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
