use std::path::PathBuf;

use colored::Colorize;
use thiserror::Error;

/// Failures raised by the install and update machinery.
///
/// Each variant knows one concrete remediation (see [`Error::suggestion`]),
/// which the CLI prints under the error message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("failed to reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("release endpoint returned HTTP {status}")]
    Remote { status: u16 },

    #[error("failed to decode release metadata: {0}")]
    Decode(String),

    #[error("no release asset matches {pattern}")]
    NoAsset { pattern: String },

    #[error("sortpath is already installed at {}", .0.display())]
    AlreadyInstalled(PathBuf),

    #[error("permission denied writing {}", .0.display())]
    Permission(PathBuf),

    #[error(
        "install to {} failed ({primary}); fallback {} also failed ({fallback})",
        .primary_path.display(),
        .fallback_path.display()
    )]
    InstallFailed {
        source_path: PathBuf,
        primary_path: PathBuf,
        primary: std::io::Error,
        fallback_path: PathBuf,
        fallback: std::io::Error,
    },

    #[error("failed to install to {}: {err}", .dest.display())]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        err: std::io::Error,
    },

    #[error("download failed: {0}")]
    Download(String),

    #[error("downloaded binary rejected: {0}")]
    Verification(String),

    #[error("sortpath was not installed via the install command")]
    NotInstalled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

const RELEASES_PAGE: &str = "https://github.com/kacperkwapisz/sortpath/releases";

impl Error {
    /// One actionable next step for the user.
    pub fn suggestion(&self) -> String {
        match self {
            Error::UnsupportedPlatform { .. } => format!(
                "download a build for your platform from {}",
                RELEASES_PAGE
            ),
            Error::Network { .. } | Error::Remote { .. } => {
                "check your network connection and retry: sortpath update --check-only".into()
            }
            Error::Decode(_) | Error::NoAsset { .. } => {
                format!("download the release manually from {}", RELEASES_PAGE)
            }
            Error::AlreadyInstalled(_) => {
                "re-run with --force to overwrite: sortpath install --force".into()
            }
            Error::Permission(path) => format!(
                "grant write access or run: sudo sortpath install --path {}",
                parent_of(path)
            ),
            Error::InstallFailed {
                source_path,
                primary_path,
                ..
            } => format!(
                "try: sudo cp \"{}\" \"{}\"",
                source_path.display(),
                primary_path.display()
            ),
            Error::CopyFailed { src, dest, .. } => {
                format!("try: sudo cp \"{}\" \"{}\"", src.display(), dest.display())
            }
            Error::Download(_) | Error::Verification(_) => {
                "retry later with: sortpath update".into()
            }
            Error::NotInstalled => {
                "run 'sortpath install' first, then retry 'sortpath update'".into()
            }
            Error::Io(_) => "check file permissions and free disk space, then retry".into(),
        }
    }
}

/// Render `err` with its context chain, plus the remediation line when a
/// crate [`Error`] sits anywhere in the chain.
pub fn format_error(err: &anyhow::Error) -> String {
    let mut out = format!("{} {:#}", "error:".red().bold(), err);
    if let Some(e) = err.chain().find_map(|c| c.downcast_ref::<Error>()) {
        out.push_str(&format!("\n{} {}", "suggestion:".yellow().bold(), e.suggestion()));
    }
    out
}

fn parent_of(path: &std::path::Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".into())
}
