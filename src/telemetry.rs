use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// crate with sqlx kept at warn. Production logs are emitted as JSON. Calling
/// this more than once is harmless.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("cause_pots_identity={},sqlx=warn", config.log_level).into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
