//! 检测模块：爬虫检测核心逻辑
pub mod resolver;
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::resolver::IdentityResolver;
pub use self::detector::Detector;
pub use self::global::{
    init_crawler_detect,
    init_crawler_detect_with,
    crawler_detect,
    is_crawler,
    get_matching_crawler,
    is_crawler_headers,
    get_matching_crawler_headers,
};
