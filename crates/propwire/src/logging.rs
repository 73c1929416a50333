use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Crates whose events follow `--log-level`. Everything else stays at `warn`
/// or quieter.
const PROPWIRE_TARGETS: [&str; 4] = [
    "propwire",
    "propwire_transport",
    "propwire_frame",
    "propwire_peer",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Directives applied when no explicit filter is given.
fn default_directives(level: LogLevel) -> String {
    let others = match level {
        LogLevel::Error => "error",
        _ => "warn",
    };
    let mut directives = vec![others.to_string()];
    directives.extend(
        PROPWIRE_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.directive())),
    );
    directives.join(",")
}

/// Build the event filter. An explicit directive string (`--log-filter` or
/// `PROPWIRE_LOG`) replaces the level-based default; if it does not parse, the
/// default is used and the parse error is returned alongside.
fn build_filter(level: LogLevel, directives: Option<&str>) -> (EnvFilter, Option<String>) {
    let fallback = || EnvFilter::new(default_directives(level));
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(err) => (fallback(), Some(format!("ignoring log filter {directives:?}: {err}"))),
        },
        None => (fallback(), None),
    }
}

/// Install the stderr subscriber. Frames and notifications log at `debug`.
pub fn init_logging(format: LogFormat, level: LogLevel, directives: Option<&str>) {
    let (filter, rejected) = build_filter(level, directives);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }

    if let Some(message) = rejected {
        tracing::warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn default_directives_scope_level_to_propwire_crates() {
        assert_eq!(
            default_directives(LogLevel::Debug),
            "warn,propwire=debug,propwire_transport=debug,propwire_frame=debug,propwire_peer=debug"
        );
    }

    #[test]
    fn quiet_levels_also_quiet_other_crates() {
        assert!(default_directives(LogLevel::Error).starts_with("error,"));
    }

    #[test]
    fn explicit_filter_is_used() {
        let (filter, rejected) = build_filter(LogLevel::Info, Some("propwire_peer=trace"));
        assert!(rejected.is_none());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_filter_falls_back_silently() {
        let (_, rejected) = build_filter(LogLevel::Info, Some("  "));
        assert!(rejected.is_none());
    }

    #[test]
    fn invalid_filter_is_reported() {
        let (_, rejected) = build_filter(LogLevel::Info, Some("propwire=loudest"));
        assert!(rejected.is_some_and(|message| message.contains("propwire=loudest")));
    }
}
