use anyhow::Result;
use tracing_subscriber::{
    filter::LevelFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: tracing::Level,
}

/// Directives from `rust_log` replace the level given on the command line, unless they
/// don't parse. Chatty http crates stay capped at warn either way.
fn env_filter(settings: &LogSettings, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::default().add_directive(LevelFilter::from_level(settings.level).into())
        })
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("rustls=warn".parse()?);

    Ok(filter)
}

pub fn setup_logging(settings: &LogSettings) -> Result<()> {
    let fmt_layer = fmt::layer();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = env_filter(settings, rust_log.as_deref())?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: tracing::Level) -> LogSettings {
        LogSettings { level }
    }

    #[test]
    fn command_line_level_without_rust_log() {
        let filter = env_filter(&settings(tracing::Level::INFO), None).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn rust_log_replaces_command_line_level() {
        let filter = env_filter(&settings(tracing::Level::INFO), Some("trace")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = env_filter(
            &settings(tracing::Level::DEBUG),
            Some("alertmanager_servicenow=info"),
        )
        .unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn unusable_rust_log_falls_back_to_command_line_level() {
        for rust_log in ["", "   ", "hyper=loudest"] {
            let filter = env_filter(&settings(tracing::Level::DEBUG), Some(rust_log)).unwrap();

            assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        }
    }

    #[test]
    fn http_crates_stay_capped() {
        let filter = env_filter(&settings(tracing::Level::TRACE), None).unwrap();
        let directives = filter.to_string();

        assert!(directives.contains("hyper=warn"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.contains("rustls=warn"));
    }
}
