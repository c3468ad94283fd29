//! 检测器核心：先应用排除规则，再按顺序匹配爬虫特征
use std::borrow::Cow;

use tracing::debug;

use super::resolver::IdentityResolver;
use crate::compiler::{CompiledPatternSet, PatternCompiler};
use crate::error::{CdResult, CrawlerDetectError};
use crate::rule::PatternSource;
use crate::utils::HeaderLookup;

/// 数据源及其编译结果
#[derive(Debug, Clone)]
struct CompiledSource {
    source: PatternSource,
    compiled: CompiledPatternSet,
}

impl CompiledSource {
    fn new(source: PatternSource) -> Self {
        let compiled = PatternCompiler::compile_source(&source);
        Self { source, compiled }
    }

    /// 数据源快照变化后重新编译
    fn refresh(&mut self) {
        if !self.compiled.is_compiled_from(&self.source.snapshot()) {
            self.compiled = PatternCompiler::compile_source(&self.source);
        }
    }
}

/// 爬虫检测器
///
/// 查询方法只读，可在多线程间共享；配置方法需要 `&mut self`，
/// 应在发布给并发调用方之前完成。
#[derive(Debug, Clone, Default)]
pub struct Detector {
    crawler_patterns: Option<CompiledSource>,
    ua_exclusions: Option<CompiledSource>,
    headers_to_check: Option<PatternSource>,
}

impl Detector {
    /// 创建未配置的检测器
    pub fn new() -> Self {
        Self::default()
    }

    /// 爬虫特征正则数据源
    pub fn crawler_patterns(&self) -> Option<&PatternSource> {
        self.crawler_patterns.as_ref().map(|c| &c.source)
    }

    /// 设置爬虫特征正则
    pub fn set_crawler_patterns(&mut self, crawler_patterns: PatternSource) {
        let compiled = CompiledSource::new(crawler_patterns);
        debug!("爬虫特征正则已设置，共 {} 条", compiled.compiled.len());
        self.crawler_patterns = Some(compiled);
    }

    /// User-Agent 排除正则数据源
    pub fn ua_exclusions(&self) -> Option<&PatternSource> {
        self.ua_exclusions.as_ref().map(|c| &c.source)
    }

    /// 设置 User-Agent 排除正则
    pub fn set_ua_exclusions(&mut self, ua_exclusions: PatternSource) {
        let compiled = CompiledSource::new(ua_exclusions);
        debug!("排除正则已设置，共 {} 条", compiled.compiled.len());
        self.ua_exclusions = Some(compiled);
    }

    /// 移除排除正则（检测时跳过排除步骤）
    pub fn clear_ua_exclusions(&mut self) {
        self.ua_exclusions = None;
    }

    /// 需要检查的 Header 名称数据源
    pub fn headers_to_check(&self) -> Option<&PatternSource> {
        self.headers_to_check.as_ref()
    }

    /// 设置需要检查的 Header 名称
    pub fn set_headers_to_check(&mut self, headers_to_check: PatternSource) {
        self.headers_to_check = Some(headers_to_check);
    }

    /// 重新加载全部数据源，快照变化的规则集重新编译
    pub fn reload(&mut self) -> CdResult<()> {
        for slot in [&mut self.crawler_patterns, &mut self.ua_exclusions]
            .into_iter()
            .flatten()
        {
            slot.source.reload()?;
            slot.refresh();
        }
        if let Some(headers) = &mut self.headers_to_check {
            headers.reload()?;
        }
        Ok(())
    }

    /// 判断 User-Agent 是否来自爬虫
    pub fn is_crawler(&self, user_agent: &str) -> CdResult<bool> {
        let (crawlers, final_ua) = self.prepare_ua_string(user_agent)?;
        Ok(crawlers.is_match(&final_ua))
    }

    /// 返回第一条命中的爬虫正则所匹配的文本
    pub fn get_matching_crawler(&self, user_agent: &str) -> CdResult<Option<String>> {
        let (crawlers, final_ua) = self.prepare_ua_string(user_agent)?;
        Ok(crawlers.find_first(&final_ua).map(str::to_string))
    }

    /// 根据请求 Header 判断是否来自爬虫
    pub fn is_crawler_headers<H: HeaderLookup + ?Sized>(&self, headers: &H) -> CdResult<bool> {
        let user_agent = self.headers_to_ua_string(headers)?;
        self.is_crawler(&user_agent)
    }

    /// 根据请求 Header 返回命中的爬虫文本
    pub fn get_matching_crawler_headers<H: HeaderLookup + ?Sized>(&self, headers: &H) -> CdResult<Option<String>> {
        let user_agent = self.headers_to_ua_string(headers)?;
        self.get_matching_crawler(&user_agent)
    }

    fn headers_to_ua_string<H: HeaderLookup + ?Sized>(&self, headers: &H) -> CdResult<String> {
        let headers_to_check = self.headers_to_check.as_ref().ok_or_else(|| {
            CrawlerDetectError::IllegalState("缺少Header名称列表，无法基于Header检测爬虫".to_string())
        })?;
        Ok(IdentityResolver::resolve(headers, headers_to_check.get_all_values()))
    }

    /// 校验配置并应用排除规则
    fn prepare_ua_string<'a>(&self, user_agent: &'a str) -> CdResult<(&CompiledPatternSet, Cow<'a, str>)> {
        let crawlers = self.crawler_patterns.as_ref().ok_or_else(|| {
            CrawlerDetectError::IllegalState("缺少爬虫特征数据，无法检测爬虫".to_string())
        })?;

        let final_ua = match &self.ua_exclusions {
            Some(exclusions) => exclusions.compiled.strip_all(user_agent),
            None => Cow::Borrowed(user_agent),
        };
        Ok((&crawlers.compiled, final_ua))
    }
}
