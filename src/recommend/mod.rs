//! The primary command: ask a chat model where a described file belongs.
//!
//! Flow: render the folder tree at `tree_path`, embed it in the archival
//! prompt, send that to `<api_base>/chat/completions`, then print the
//! `<path>` and `<reason>` from the reply.

mod llm;
mod prompt;
mod tree;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::{ConfigStore, Overrides, Resolved, default_store, resolve};

pub use llm::{ChatClient, Recommendation, parse_recommendation};
pub use prompt::build_prompt;
pub use tree::render_tree;

/// Run one recommendation against already-resolved settings.
pub fn recommend(cfg: &Resolved, description: &str) -> Result<Recommendation> {
    let tree = render_tree(&cfg.tree_path)
        .with_context(|| format!("failed to read folder tree at {}", cfg.tree_path.display()))?;
    log::debug!("folder tree has {} entries", tree.lines().count());
    let prompt = build_prompt(&tree, description, Local::now());
    ChatClient::new(cfg)?.recommend(&prompt)
}

/// CLI command: resolve settings, query the model and print the answer.
pub fn cmd_recommend(description: &str, overrides: &Overrides) -> Result<()> {
    let file = default_store()?.load()?;
    let cfg = resolve(overrides, &file)?;
    let rec = recommend(&cfg, description)?;
    println!("{}", rec.path);
    println!("Reason: {}", rec.reason);
    Ok(())
}
