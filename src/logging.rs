/// Initialize the logger.
///
/// `verbose` wins when non-zero (1=info, 2=debug, 3+=trace); otherwise the
/// configured `log-level` value is used. `RUST_LOG` still overrides both.
pub fn setup_logger(verbose: u8, configured: Option<&str>) {
    let filter = filter_for(verbose, configured);
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();
}

fn filter_for(verbose: u8, configured: Option<&str>) -> &'static str {
    match verbose {
        0 => match configured.map(str::to_ascii_lowercase).as_deref() {
            Some("debug") => "sortpath=debug",
            Some("info") => "sortpath=info",
            Some("error") => "sortpath=error",
            _ => "sortpath=warn",
        },
        1 => "sortpath=info",
        2 => "sortpath=debug",
        _ => "sortpath=trace",
    }
}
