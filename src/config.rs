//! 应用配置
//!
//! TOML文件 + `TODOX_` 环境变量覆盖，缺省时使用内置默认值。

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub reminder: ReminderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite数据库地址，例如 `sqlite://todox.db`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// tick间隔（秒），1秒保证提醒接近即时
    pub tick_interval_seconds: u64,
    /// 单轮评估的超时上限（秒）
    pub tick_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://todox.db".to_string(),
                max_connections: 5,
            },
            reminder: ReminderConfig {
                tick_interval_seconds: 1,
                tick_timeout_seconds: 5,
            },
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {path}"));
            }
        } else {
            let default_paths = ["config/todox.toml", "todox.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // 未给出的键落回内置默认值
        let defaults = AppConfig::default();
        builder = builder
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default(
                "reminder.tick_interval_seconds",
                defaults.reminder.tick_interval_seconds,
            )?
            .set_default(
                "reminder.tick_timeout_seconds",
                defaults.reminder.tick_timeout_seconds,
            )?;

        builder = builder.add_source(
            Environment::with_prefix("TODOX")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(anyhow::anyhow!("数据库地址不能为空"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("数据库连接数必须大于0"));
        }
        if self.reminder.tick_interval_seconds == 0 {
            return Err(anyhow::anyhow!("tick间隔必须大于0秒"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.url, "sqlite://todox.db");
        assert_eq!(config.reminder.tick_interval_seconds, 1);
        assert_eq!(config.reminder.tick_timeout_seconds, 5);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("todox.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[database]\nurl = \"sqlite:///tmp/custom.db\"\nmax_connections = 2\n\n\
             [reminder]\ntick_interval_seconds = 3\ntick_timeout_seconds = 9"
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.database.url, "sqlite:///tmp/custom.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.reminder.tick_interval_seconds, 3);
        assert_eq!(config.reminder.tick_timeout_seconds, 9);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load(Some("/nonexistent/todox.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("todox.toml");
        std::fs::write(&path, "[database]\nurl = \"sqlite://only.db\"\n").unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.database.url, "sqlite://only.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.reminder.tick_interval_seconds, 1);
    }
}
