use std::sync::Once;

/// Modules capped at `warn` unless a filter is given explicitly.
const NOISY_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// Filter resolution order: `env_filter`, then `RUST_LOG`, then
/// `default_level` with the wgpu stack capped at `warn`. Filters use
/// `env_logger` syntax (e.g. "strata_engine::queue=trace").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    fn resolve_filter(&self, from_env: Option<String>) -> String {
        if let Some(filter) = self.env_filter.clone().or(from_env) {
            return filter;
        }

        let mut filter = self.default_level.to_string().to_lowercase();
        for module in NOISY_MODULES {
            filter.push_str(&format!(",{module}=warn"));
        }
        filter
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_timestamp_millis()
            .init();

        log::debug!("logging initialized with filter {filter:?}");
    });
}
