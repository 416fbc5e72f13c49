use anyhow::{Result, anyhow};
use std::{env, path::PathBuf};

/// File name of the installed binary.
pub const BIN_NAME: &str = if cfg!(windows) {
    "sortpath.exe"
} else {
    "sortpath"
};

/// Directory `install` targets when `--path` is not given.
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

#[derive(Clone, Debug)]
pub struct Paths {
    pub config: PathBuf,
    pub last_update_check: PathBuf,
}

pub fn home_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME is not set"))
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    match env::var_os(var).filter(|v| !v.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(home_dir()?.join(fallback)),
    }
}

pub fn paths() -> Result<Paths> {
    let config_home = xdg_dir("XDG_CONFIG_HOME", ".config")?;
    let cache_home = xdg_dir("XDG_CACHE_HOME", ".cache")?;
    Ok(Paths {
        config: config_home.join("sortpath").join("config.toml"),
        last_update_check: cache_home.join("sortpath").join("last_update_check"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn paths_follow_xdg_variables() {
        let old_cfg = env::var_os("XDG_CONFIG_HOME");
        let old_cache = env::var_os("XDG_CACHE_HOME");
        unsafe {
            env::set_var("XDG_CONFIG_HOME", "/x/config");
            env::set_var("XDG_CACHE_HOME", "/x/cache");
        }

        let p = paths().unwrap();
        assert_eq!(p.config, PathBuf::from("/x/config/sortpath/config.toml"));
        assert_eq!(
            p.last_update_check,
            PathBuf::from("/x/cache/sortpath/last_update_check")
        );

        unsafe {
            match old_cfg {
                Some(v) => env::set_var("XDG_CONFIG_HOME", v),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
            match old_cache {
                Some(v) => env::set_var("XDG_CACHE_HOME", v),
                None => env::remove_var("XDG_CACHE_HOME"),
            }
        }
    }
}
