//! Terminal feedback for `sortpath update`.
//!
//! - [`spinner`] ticks while the release is fetched and swapped in
//! - [`finish_ok`] / [`finish_err`] freeze it with a check mark or a cross

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style("{spinner:.yellow} {wide_msg}").tick_strings(TICKS));
    pb.enable_steady_tick(Duration::from_millis(200));
    pb.set_message(msg.into());
    pb
}

pub fn finish_ok(pb: &ProgressBar, msg: impl Into<String>) {
    finish(pb, "✔", "green", msg.into());
}

pub fn finish_err(pb: &ProgressBar, msg: impl Into<String>) {
    finish(pb, "✘", "red", msg.into());
}

fn finish(pb: &ProgressBar, glyph: &'static str, color: &str, msg: String) {
    pb.set_style(style(&format!("{{prefix:.{color}}} {{wide_msg}}")));
    pb.set_prefix(glyph);
    pb.finish_with_message(msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishing_keeps_the_final_message() {
        let pb = ProgressBar::hidden();
        finish_ok(&pb, "updated to version 1.2.0");
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "updated to version 1.2.0");
        assert_eq!(pb.prefix(), "✔");

        let pb = ProgressBar::hidden();
        finish_err(&pb, "update to 1.2.0 failed");
        assert_eq!(pb.prefix(), "✘");
    }
}
