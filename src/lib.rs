//! crawler-detect - 基于 Crawler-Detect 规则库的爬虫/机器人识别工具
//!
//! ```no_run
//! use crawler_detect::Detector;
//!
//! let detector = Detector::new_instance();
//! let is_bot = detector.is_crawler("Mozilla/5.0 (compatible; Googlebot/2.1)")?;
//! # Ok::<(), crawler_detect::CrawlerDetectError>(())
//! ```

// 导出全局错误类型
pub use self::error::{CrawlerDetectError, CdResult};

// 导出配置模块
pub use self::config::{DetectConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    PatternKind, PatternOrigin, PatternSource, PatternSnapshot, PatternLoader, PatternCacheManager,
    HeaderNameNormalizer,
};

// 导出编译模块核心接口
pub use self::compiler::{CompiledPattern, CompiledPatternSet, PatternCompiler};

// 导出工具模块核心接口
pub use self::utils::{HeaderConverter, HeaderLookup};

// 导出检测模块核心接口（含全局检测器的简化接口）
pub use self::detector::{
    Detector,
    IdentityResolver,
    init_crawler_detect,
    init_crawler_detect_with,
    crawler_detect,
    is_crawler,
    get_matching_crawler,
    is_crawler_headers,
    get_matching_crawler_headers,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod utils;
pub mod compiler;
pub mod detector;
