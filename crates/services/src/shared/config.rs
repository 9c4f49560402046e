use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Отступы в выпадающих списках справочников
#[derive(Debug, Deserialize, Clone)]
pub struct TreeConfig {
    #[serde(default = "default_indent_filler")]
    pub indent_filler: char,
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            indent_filler: default_indent_filler(),
            indent_width: default_indent_width(),
        }
    }
}

/// Шаблоны чек-листов и именование системных пунктов
#[derive(Debug, Deserialize, Clone)]
pub struct ChecklistConfig {
    #[serde(default)]
    pub onboarding_template: Vec<String>,
    #[serde(default)]
    pub offboarding_template: Vec<String>,
    #[serde(default = "default_asset_return_prefix")]
    pub asset_return_prefix: String,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            onboarding_template: Vec::new(),
            offboarding_template: Vec::new(),
            asset_return_prefix: default_asset_return_prefix(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_indent_filler() -> char {
    '·'
}

fn default_indent_width() -> usize {
    4
}

fn default_asset_return_prefix() -> String {
    "Вернуть".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[tree]
indent_filler = "·"
indent_width = 4

[checklist]
asset_return_prefix = "Вернуть"
onboarding_template = [
    "Подписать трудовой договор",
    "Выдать пропуск",
    "Создать учётную запись",
    "Провести вводный инструктаж",
]
offboarding_template = [
    "Отозвать доступы",
    "Подписать обходной лист",
]

[logging]
filter = "info"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                return load_config_from(&config_path);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn default_config() -> anyhow::Result<Config> {
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}
