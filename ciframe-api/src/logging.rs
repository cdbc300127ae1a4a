//! Tracing subscriber setup
//!
//! The subscriber is installed before configuration is read, using
//! `RUST_LOG` or the command-line level, so warnings raised while loading
//! config are emitted. Once the config file has been resolved its log level
//! is applied through a reload handle. An explicit `RUST_LOG` always wins.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Handle for replacing the active filter after startup
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter enabling `level` for this service and its HTTP layer
pub fn filter_for_level(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "ciframe_api={level},ciframe_common={level},tower_http={level}"
    ))
}

/// `RUST_LOG` if set and valid, otherwise `filter_for_level(level)`
pub fn startup_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for_level(level))
}

/// Install the global subscriber
pub fn init(level: &str) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(startup_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
    handle
}

/// Switch to the configured level unless `RUST_LOG` is in charge
pub fn apply_configured_level(handle: &FilterHandle, level: &str) -> Result<(), reload::Error> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(());
    }
    handle.reload(filter_for_level(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciframe_common::config::{Config, ConfigOverrides, TomlConfig};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn zero_permits() -> TomlConfig {
        TomlConfig {
            max_concurrent_similarity: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_warnings_reach_startup_subscriber() {
        let captured = Captured::default();
        let (filter, handle) = reload::Layer::new(filter_for_level("info"));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(captured.clone()).with_ansi(false));

        tracing::subscriber::with_default(subscriber, || {
            let config = Config::resolve(zero_permits(), ConfigOverrides::default());
            assert!(config.max_concurrent_similarity > 0);
            assert_eq!(captured.contents().matches("max_concurrent_similarity = 0").count(), 1);

            // Configured level applied afterwards silences warnings
            handle.reload(filter_for_level("error")).unwrap();
            Config::resolve(zero_permits(), ConfigOverrides::default());
            assert_eq!(captured.contents().matches("max_concurrent_similarity = 0").count(), 1);
        });
    }

    #[test]
    fn test_filter_for_level_covers_service_targets() {
        let rendered = filter_for_level("debug").to_string();
        for target in ["ciframe_api=debug", "ciframe_common=debug", "tower_http=debug"] {
            assert!(rendered.contains(target), "{} missing from {}", target, rendered);
        }
    }
}
