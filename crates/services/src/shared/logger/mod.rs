use crate::shared::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Установка глобального подписчика tracing.
///
/// RUST_LOG имеет приоритет над фильтром из конфигурации.
/// Повторный вызов ничего не делает и возвращает `false`.
///
/// # Примеры
/// ```
/// let config = services::shared::config::LoggingConfig::default();
/// services::shared::logger::init(&config);
/// tracing::info!("Справочники загружены");
/// ```
pub fn init(config: &LoggingConfig) -> bool {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.filter.clone());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
