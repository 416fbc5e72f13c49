//! First-run install prompt shown before the primary command.
//!
//! The prompt only appears when the running binary's directory is missing
//! from `PATH` and a human is plausibly on the other end of stdin. Whatever
//! happens here never fails the primary command.

use anyhow::Result;
use colored::Colorize;
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::config::default_store;
use crate::install::{InstallReport, Installer, ShellProfile, path_contains};
use crate::paths::{DEFAULT_INSTALL_DIR, home_dir};

const CI_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_URL",
    "BUILDKITE",
    "CIRCLECI",
    "TRAVIS",
    "DRONE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
    "CODEBUILD_BUILD_ID",
];

const CONTAINER_VARS: &[&str] = &["DOCKER_CONTAINER", "KUBERNETES_SERVICE_HOST", "container"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Uncommitted,
    PromptPending,
    UserAccepted,
    UserDeclined,
    Installed(PathBuf),
    InstallFailed(String),
}

/// Facts about the process context that decide whether prompting is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Environment {
    pub stdin_tty: bool,
    pub ci: bool,
    pub container: bool,
    pub dumb_term: bool,
}

impl Environment {
    pub fn detect() -> Self {
        Self::from_lookup(
            io::stdin().is_terminal(),
            Path::new("/.dockerenv").exists(),
            |k| env::var(k).ok(),
        )
    }

    pub fn from_lookup(
        stdin_tty: bool,
        dockerenv: bool,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let set = |k: &&str| {
            var(k)
                .map(|v| !v.is_empty() && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(false)
        };
        let term = var("TERM").unwrap_or_default();
        Self {
            stdin_tty,
            ci: CI_VARS.iter().any(set),
            container: dockerenv || CONTAINER_VARS.iter().any(set),
            dumb_term: term.is_empty() || term == "dumb",
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.stdin_tty && !self.ci && !self.container && !self.dumb_term
    }
}

/// Empty input counts as yes, matching the `[Y/n]` hint.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

/// Drive the prompt state machine to a terminal state.
///
/// `install` runs synchronously on acceptance; its error only moves the
/// machine to [`PromptState::InstallFailed`].
pub fn run_prompt<R, W, F>(
    env: &Environment,
    exe_dir_on_path: bool,
    input: &mut R,
    out: &mut W,
    install: F,
) -> PromptState
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Result<InstallReport>,
{
    let mut state = PromptState::Uncommitted;
    loop {
        state = match state {
            PromptState::Uncommitted => {
                if exe_dir_on_path || !env.is_interactive() {
                    return PromptState::Uncommitted;
                }
                PromptState::PromptPending
            }
            PromptState::PromptPending => {
                let _ = write!(
                    out,
                    "Install sortpath to {} so you can run it from anywhere? [Y/n]: ",
                    DEFAULT_INSTALL_DIR
                );
                let _ = out.flush();
                let mut answer = String::new();
                if input.read_line(&mut answer).is_err() {
                    PromptState::UserDeclined
                } else if is_affirmative(&answer) {
                    PromptState::UserAccepted
                } else {
                    PromptState::UserDeclined
                }
            }
            PromptState::UserAccepted => {
                return match install() {
                    Ok(report) => PromptState::Installed(report.path),
                    Err(e) => PromptState::InstallFailed(e.to_string()),
                };
            }
            terminal => return terminal,
        };
    }
}

fn install_default() -> Result<InstallReport> {
    let store = default_store()?;
    let profile = ShellProfile::from_env();
    Installer::new(&store, &profile, home_dir().ok())
        .install(Path::new(DEFAULT_INSTALL_DIR), false)
}

/// Offer to install the running binary before the primary command runs.
pub fn maybe_prompt_install() -> PromptState {
    let on_path = match env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => path_contains(env::var_os("PATH").as_deref(), dir),
            None => true,
        },
        Err(e) => {
            log::debug!("skipping install prompt: {}", e);
            return PromptState::Uncommitted;
        }
    };

    let env = Environment::detect();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stderr();
    let state = run_prompt(&env, on_path, &mut input, &mut out, install_default);

    match &state {
        PromptState::Installed(p) => {
            eprintln!("{} installed sortpath to {}", "✓".green().bold(), p.display());
        }
        PromptState::InstallFailed(msg) => {
            eprintln!("{} install skipped: {}", "warning:".yellow().bold(), msg);
            eprintln!("  you can retry later with: sortpath install");
        }
        other => log::debug!("install prompt finished in {:?}", other),
    }
    state
}
