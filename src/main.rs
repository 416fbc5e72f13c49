//! # sortpath
//!
//! **sortpath** suggests where a file belongs in your folder structure.
//!
//! Usage:
//! - `sortpath "Berlin trip photos, 2025"` asks the configured model
//! - `sortpath install` copies the binary onto `PATH`
//! - `sortpath update` replaces the binary with the latest release
//! - `sortpath config set|get|remove|list` manages settings
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use sortpath::config::{ConfigStore, default_store};
use sortpath::logging::setup_logger;
use sortpath::{
    ConfigAction, Overrides, VERSION, cmd_config, cmd_install, cmd_recommend, cmd_update,
    default_scheduler, format_error, is_dev_version, maybe_prompt_install,
    spawn_background_check,
};
use std::path::PathBuf;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "sortpath",
    version = VERSION,
    about = "Find the right folder for a file using an LLM",
    subcommand_negates_reqs = true
)]
struct Cli {
    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE", global = true)]
    api_base: Option<String>,

    /// Model name
    #[arg(long, env = "OPENAI_MODEL", global = true)]
    model: Option<String>,

    /// Root of the folder tree to sort into
    #[arg(long = "tree", env = "SORTPATH_FOLDER_TREE", global = true)]
    tree_path: Option<String>,

    /// Log level (debug, info, error)
    #[arg(long, env = "SORTPATH_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Description of the file to place
    description: Vec<String>,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Copy sortpath into a directory on PATH
    Install {
        /// Target directory
        #[arg(long, default_value = sortpath::paths::DEFAULT_INSTALL_DIR)]
        path: PathBuf,
        /// Overwrite an existing install
        #[arg(long)]
        force: bool,
    },
    /// Download and install the latest release
    Update {
        /// Only report whether an update is available
        #[arg(long)]
        check_only: bool,
    },
    /// Read or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// Set a key (api-key, api-base, model, tree-path, log-level)
    Set { key: String, value: String },
    /// Print one key
    Get { key: String },
    /// Clear one key
    Remove { key: String },
    /// Print all keys, with the API key redacted
    List,
}

impl From<ConfigCmd> for ConfigAction {
    fn from(c: ConfigCmd) -> Self {
        match c {
            ConfigCmd::Set { key, value } => ConfigAction::Set(key, value),
            ConfigCmd::Get { key } => ConfigAction::Get(key),
            ConfigCmd::Remove { key } => ConfigAction::Remove(key),
            ConfigCmd::List => ConfigAction::List,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            tree_path: self.tree_path.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

/// Log level from the flag/env, falling back to the config file.
fn configured_log_level(cli: &Cli) -> Option<String> {
    cli.log_level.clone().or_else(|| {
        default_store()
            .and_then(|s| s.load())
            .ok()
            .map(|c| c.log_level)
            .filter(|l| !l.is_empty())
    })
}

fn run(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    match cli.cmd {
        Some(Cmd::Install { path, force }) => cmd_install(&path, force),
        Some(Cmd::Update { check_only }) => cmd_update(VERSION, check_only),
        Some(Cmd::Config { action }) => cmd_config(action.into()),
        None => {
            let description = cli.description.join(" ");
            if description.trim().is_empty() {
                eprintln!("Missing file description.\n");
                let _ = Cli::command().print_help();
                std::process::exit(1);
            }

            maybe_prompt_install();
            if !is_dev_version(VERSION) {
                match default_scheduler() {
                    Ok(s) => spawn_background_check(s, VERSION.to_string()),
                    Err(e) => log::debug!("update check disabled: {:#}", e),
                }
            }
            cmd_recommend(&description, &overrides)
        }
    }
}

/// CLI entry point.
///
/// Every fatal error is printed with its remediation and exits with 1.
fn main() {
    let cli = Cli::parse();
    setup_logger(cli.verbose, configured_log_level(&cli).as_deref());

    if let Err(e) = run(cli) {
        eprintln!("{}", format_error(&e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommands_route_after_global_flags() {
        let cli = parse(&["sortpath", "-v", "install"]);
        assert_eq!(cli.verbose, 1);
        assert!(cli.description.is_empty());
        assert!(matches!(cli.cmd, Some(Cmd::Install { force: false, .. })));

        let cli = parse(&["sortpath", "-vv", "config", "list"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.cmd,
            Some(Cmd::Config {
                action: ConfigCmd::List
            })
        ));

        let cli = parse(&["sortpath", "--model", "m", "update", "--check-only"]);
        assert_eq!(cli.model.as_deref(), Some("m"));
        assert!(matches!(cli.cmd, Some(Cmd::Update { check_only: true })));
    }

    #[test]
    fn install_takes_path_and_force() {
        match parse(&["sortpath", "install", "--path", "/opt/bin", "--force"]).cmd {
            Some(Cmd::Install { path, force }) => {
                assert_eq!(path, PathBuf::from("/opt/bin"));
                assert!(force);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match parse(&["sortpath", "install"]).cmd {
            Some(Cmd::Install { path, .. }) => {
                assert_eq!(path, PathBuf::from(sortpath::paths::DEFAULT_INSTALL_DIR));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn free_words_are_the_description() {
        let cli = parse(&["sortpath", "-v", "Berlin trip photos, 2025"]);
        assert!(cli.cmd.is_none());
        assert_eq!(cli.description, vec!["Berlin trip photos, 2025".to_string()]);

        let cli = parse(&["sortpath", "clothing", "mockup", "psd"]);
        assert!(cli.cmd.is_none());
        assert_eq!(cli.description.join(" "), "clothing mockup psd");
    }
}
