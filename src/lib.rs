//! Crate entry point for **sortpath**.
//!
//! `sortpath` asks a chat model where a described file belongs in a folder
//! tree. Beyond the recommendation itself the crate carries its own
//! distribution story: it can copy itself onto `PATH`, check for new
//! releases in the background and replace itself with the latest build.
//!
//! Each submodule owns one piece of that; the `pub use` re-exports expose
//! the CLI commands from the crate root.

pub mod config;
pub mod error;
pub mod install;
pub mod logging;
pub mod orchestrator;
pub mod paths;
pub mod platform;
mod progress;
pub mod recommend;
pub mod release;
pub mod update;

pub use config::{ConfigAction, Overrides, cmd_config};
pub use error::{Error, format_error};
pub use install::cmd_install;
pub use orchestrator::maybe_prompt_install;
pub use recommend::cmd_recommend;
pub use update::{cmd_update, default_scheduler, is_dev_version, spawn_background_check};

/// Version stamped in by the release build, `dev` otherwise.
pub const VERSION: &str = match option_env!("SORTPATH_RELEASE_VERSION") {
    Some(v) => v,
    None => "dev",
};
