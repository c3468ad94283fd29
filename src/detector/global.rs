//! 默认检测器构建与全局检测器单例管理
use once_cell::sync::OnceCell;
use tracing::{debug, error, info};

use super::detector::Detector;
use crate::config::{ConfigManager, DetectConfig};
use crate::error::{CdResult, CrawlerDetectError};
use crate::rule::{PatternKind, PatternOrigin, PatternSource};
use crate::utils::HeaderLookup;

/// 全局检测器实例
static GLOBAL_DETECTOR: OnceCell<Detector> = OnceCell::new();

impl Detector {
    /// 使用默认配置创建指向 Crawler-Detect 官方规则的检测器
    /// 加载失败仅记录日志，返回的实例可能未完整配置
    pub fn new_instance() -> Self {
        Self::new_instance_with_config(&ConfigManager::get_default())
    }

    /// 带自定义配置创建默认检测器（加载失败仅记录日志）
    pub fn new_instance_with_config(config: &DetectConfig) -> Self {
        let mut detector = Self::new();
        if let Err(e) = detector.load_default_sources(config) {
            error!("无法加载爬虫检测配置数据：{}", e);
        }
        detector
    }

    /// 带自定义配置创建默认检测器，加载失败直接返回错误
    pub fn try_new_instance(config: &DetectConfig) -> CdResult<Self> {
        let mut detector = Self::new();
        detector.load_default_sources(config)?;
        Ok(detector)
    }

    /// 依次加载爬虫特征、排除规则、Header 名称，任一失败即停止
    fn load_default_sources(&mut self, config: &DetectConfig) -> CdResult<()> {
        self.set_crawler_patterns(default_source(PatternKind::Crawlers, config)?);
        self.set_ua_exclusions(default_source(PatternKind::Exclusions, config)?);
        self.set_headers_to_check(default_source(PatternKind::Headers, config)?);
        Ok(())
    }
}

fn default_source(kind: PatternKind, config: &DetectConfig) -> CdResult<PatternSource> {
    let url = kind
        .default_url()
        .ok_or_else(|| CrawlerDetectError::InvalidOrigin(format!("{} 没有默认规则源", kind)))?;
    PatternSource::from_origin(kind, PatternOrigin::parse(url)?, config)
}

/// 带自定义配置初始化全局检测器，加载失败返回错误
pub fn init_crawler_detect(config: &DetectConfig) -> CdResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        debug!("全局检测器已初始化，跳过");
        return Ok(());
    }

    let detector = Detector::try_new_instance(config)?;
    init_crawler_detect_with(detector)
}

/// 注入已配置好的检测器作为全局检测器
pub fn init_crawler_detect_with(detector: Detector) -> CdResult<()> {
    GLOBAL_DETECTOR.set(detector).map_err(|_| {
        CrawlerDetectError::IllegalState("全局检测器已被初始化".to_string())
    })?;
    info!("全局爬虫检测器初始化完成");
    Ok(())
}

/// 获取全局检测器，未初始化时使用默认配置懒加载
pub fn crawler_detect() -> &'static Detector {
    GLOBAL_DETECTOR.get_or_init(|| {
        debug!("使用默认配置懒加载全局检测器");
        Detector::new_instance()
    })
}

pub fn is_crawler(user_agent: &str) -> CdResult<bool> {
    crawler_detect().is_crawler(user_agent)
}

pub fn get_matching_crawler(user_agent: &str) -> CdResult<Option<String>> {
    crawler_detect().get_matching_crawler(user_agent)
}

pub fn is_crawler_headers<H: HeaderLookup + ?Sized>(headers: &H) -> CdResult<bool> {
    crawler_detect().is_crawler_headers(headers)
}

pub fn get_matching_crawler_headers<H: HeaderLookup + ?Sized>(headers: &H) -> CdResult<Option<String>> {
    crawler_detect().get_matching_crawler_headers(headers)
}
