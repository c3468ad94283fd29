//! 规则模块：负责规则源读取、本地缓存、数据源快照与数据模型定义
pub mod model;
pub mod origin;
pub mod cache;
pub mod loader;
pub mod source;

// 导出核心接口
pub use self::model::{
    PatternKind, HeaderNameNormalizer, DEFAULT_CRAWLERS_URL, DEFAULT_EXCLUSIONS_URL, DEFAULT_HEADERS_URL,
};
pub use self::origin::PatternOrigin;
pub use self::cache::PatternCacheManager;
pub use self::loader::PatternLoader;
pub use self::source::{PatternSource, PatternSnapshot};
