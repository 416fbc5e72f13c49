use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

/// Normalized `{os}-{arch}` token used to name release assets,
/// e.g. `linux-amd64` or `darwin-arm64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTag {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTag {
    /// Tag for the platform this binary was compiled for.
    pub fn current() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map raw OS/arch names (Rust, Go or `uname` spellings) to a tag.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let os_lc = os.to_ascii_lowercase();
        let os_kind = match os_lc.as_str() {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Darwin,
            "windows" => Os::Windows,
            s if s.starts_with("mingw") || s.starts_with("msys") || s.starts_with("cygwin") => {
                Os::Windows
            }
            _ => return Err(unsupported()),
        };
        let arch_kind = match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            _ => return Err(unsupported()),
        };
        Ok(Self {
            os: os_kind,
            arch: arch_kind,
        })
    }

    /// Substring a matching release asset name must contain.
    /// Windows assets carry the `.exe` suffix.
    pub fn asset_pattern(&self) -> String {
        match self.os {
            Os::Windows => format!("{}.exe", self),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let os = match self.os {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        };
        let arch = match self.arch {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        };
        write!(f, "{}-{}", os, arch)
    }
}
