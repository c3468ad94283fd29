//! 全局配置管理,存储所有可配置项

use std::path::{Path, PathBuf};

/// 缓存目录名（位于 base_dir 之下）
pub const CACHE_DIR_NAME: &str = "CrawlerDetectCache";
/// 默认缓存刷新周期（天）
pub const DEFAULT_REFRESH_DAYS: i64 = 31;
/// 环境变量：缓存根目录
pub const ENV_BASE_DIR: &str = "CRAWLER_DETECT_BASE_DIR";
/// 环境变量：缓存刷新周期（天）
pub const ENV_REFRESH_DAYS: &str = "CRAWLER_DETECT_REFRESH_DAYS";

/// 检测器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectConfig {
    // 缓存根目录，缓存文件位于 <base_dir>/CrawlerDetectCache/<identity>.txt
    pub base_dir: PathBuf,
    // 缓存刷新周期（天），<= 0 表示永不过期
    pub refresh_days: i64,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir(),
            refresh_days: DEFAULT_REFRESH_DAYS,
            http_timeout: 30,
        }
    }
}

impl DetectConfig {
    /// 默认配置基础上读取环境变量覆盖项（仅显式调用时生效）
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(ENV_BASE_DIR) {
            config.base_dir = PathBuf::from(dir);
        }
        if let Ok(days) = std::env::var(ENV_REFRESH_DAYS) {
            match days.trim().parse::<i64>() {
                Ok(days) => config.refresh_days = days,
                Err(e) => tracing::warn!("忽略无效的 {}={}：{}", ENV_REFRESH_DAYS, days, e),
            }
        }
        config
    }

    /// 缓存目录：<base_dir>/CrawlerDetectCache
    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join(CACHE_DIR_NAME)
    }

    /// 缓存文件路径：<base_dir>/CrawlerDetectCache/<identity>.txt
    pub fn cache_file_path(&self, identity: &str) -> PathBuf {
        self.cache_dir().join(format!("{}.txt", identity))
    }

    /// 是否启用过期刷新
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_days > 0
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> DetectConfig {
        DetectConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }

    /// 以环境变量覆盖后的配置为起点继续自定义
    pub fn from_env() -> CustomConfigBuilder {
        CustomConfigBuilder::from_config(DetectConfig::from_env())
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: DetectConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DetectConfig::default(),
        }
    }

    pub fn from_config(config: DetectConfig) -> Self {
        Self { config }
    }

    pub fn base_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.base_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn refresh_days(mut self, days: i64) -> Self {
        self.config.refresh_days = days;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn build(self) -> DetectConfig {
        self.config
    }
}
