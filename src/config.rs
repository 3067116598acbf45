use serde::{Deserialize, Serialize};
use std::env;

/// 收据号列宽 64，去掉日期与随机段后留给前缀的长度
const MAX_RECEIPT_PREFIX_CHARS: usize = 48;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub donation: DonationConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationConfig {
    /// 收据号前缀
    #[serde(default = "default_receipt_prefix")]
    pub receipt_prefix: String,
    /// 创建项目时未指定币种的默认值
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// 自动结束过期项目的检查间隔（秒）
    #[serde(default = "default_close_expired_interval_secs")]
    pub close_expired_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 为空表示允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_receipt_prefix() -> String {
    "PSN".to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

fn default_close_expired_interval_secs() -> u64 {
    3600
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            receipt_prefix: default_receipt_prefix(),
            default_currency: default_currency(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            close_expired_interval_secs: default_close_expired_interval_secs(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    donation: DonationConfig::default(),
                    cors: CorsConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }

        // Donation
        if let Ok(v) = env::var("DONATION_RECEIPT_PREFIX") {
            self.donation.receipt_prefix = v;
        }
        if let Ok(v) = env::var("DONATION_DEFAULT_CURRENCY") {
            self.donation.default_currency = v.to_ascii_uppercase();
        }
        if let Ok(v) = env::var("DONATION_DEFAULT_PAGE_SIZE")
            && let Ok(n) = v.parse()
        {
            self.donation.default_page_size = n;
        }
        if let Ok(v) = env::var("DONATION_MAX_PAGE_SIZE")
            && let Ok(n) = v.parse()
        {
            self.donation.max_page_size = n;
        }
        if let Ok(v) = env::var("CAMPAIGN_CLOSE_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.donation.close_expired_interval_secs = n;
        }

        // CORS
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let currency = &self.donation.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!("Invalid default currency: {currency}").into());
        }
        let prefix_len = self.donation.receipt_prefix.trim().chars().count();
        if prefix_len == 0 {
            return Err("Receipt prefix must not be empty".into());
        }
        if prefix_len > MAX_RECEIPT_PREFIX_CHARS {
            return Err(format!(
                "Receipt prefix must be at most {MAX_RECEIPT_PREFIX_CHARS} characters"
            )
            .into());
        }
        let (default_size, max_size) = (
            self.donation.default_page_size,
            self.donation.max_page_size,
        );
        if default_size == 0 || default_size > max_size {
            return Err(format!(
                "default_page_size ({default_size}) must be between 1 and max_page_size ({max_size})"
            )
            .into());
        }
        if self.donation.close_expired_interval_secs == 0 {
            return Err("close_expired_interval_secs must be positive".into());
        }
        Ok(())
    }
}
