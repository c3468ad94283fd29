//! 规则编译器核心
//! 仅负责将规则行编译为忽略大小写的正则，保持原有顺序

use std::sync::Arc;
use std::time::Instant;
use regex::{Regex, RegexBuilder, Error as RegexError};
use tracing::{debug, warn};

use super::pattern::{CompiledPattern, CompiledPatternSet};
use crate::rule::{PatternSnapshot, PatternSource};

/// 规则编译器
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译数据源的当前快照
    pub fn compile_source(source: &PatternSource) -> CompiledPatternSet {
        Self::compile(source.snapshot())
    }

    /// 编译快照：空行跳过，非法正则记录告警后跳过
    pub fn compile(snapshot: Arc<PatternSnapshot>) -> CompiledPatternSet {
        let start = Instant::now();
        let mut patterns = Vec::with_capacity(snapshot.len());
        let mut skipped = 0usize;

        for (line, raw_pattern) in snapshot.iter().enumerate() {
            if raw_pattern.trim().is_empty() {
                continue;
            }
            match Self::compile_single_pattern(raw_pattern) {
                Ok(regex) => patterns.push(CompiledPattern { regex, line }),
                Err(e) => {
                    skipped += 1;
                    warn!("第 {} 行正则编译失败，已跳过：{}，错误：{}", line + 1, raw_pattern, e);
                }
            }
        }

        debug!(
            "规则编译完成，耗时{:?}，成功{}条，跳过{}条",
            start.elapsed(),
            patterns.len(),
            skipped
        );

        CompiledPatternSet { snapshot, patterns }
    }

    /// 编译单个正则（忽略大小写）
    pub fn compile_single_pattern(raw_pattern: &str) -> Result<Regex, RegexError> {
        RegexBuilder::new(raw_pattern).case_insensitive(true).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::PatternKind;

    #[test]
    fn test_compile_keeps_order_and_skips_invalid() {
        let source = PatternSource::from_values(PatternKind::Crawlers, ["bot", "", "(unclosed", "spider"]);
        let compiled = PatternCompiler::compile_source(&source);

        let described: Vec<&str> = compiled.patterns().iter().map(|p| p.describe()).collect();
        assert_eq!(described, vec!["bot", "spider"]);
        assert_eq!(compiled.patterns()[1].line, 3);
        assert!(compiled.is_compiled_from(&source.snapshot()));
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let source = PatternSource::from_values(PatternKind::Crawlers, ["googleweblight"]);
        let compiled = PatternCompiler::compile_source(&source);

        let ua = "Mozilla/5.0 (KHTML, like Gecko; GoogleWebLight) Chrome/38.0";
        assert!(compiled.is_match(ua));
        assert_eq!(compiled.find_first(ua), Some("GoogleWebLight"));
    }

    #[test]
    fn test_first_pattern_wins() {
        let source = PatternSource::from_values(PatternKind::Crawlers, ["Chrome", "Gecko"]);
        let compiled = PatternCompiler::compile_source(&source);

        // 匹配顺序由规则顺序决定，而非在字符串中出现的位置
        assert_eq!(compiled.find_first("like Gecko) Chrome/38"), Some("Chrome"));
    }

    #[test]
    fn test_strip_all_is_sequential() {
        // 第一条删除 "ab" 后，剩余内容拼接出 "cd" 供第二条删除
        let source = PatternSource::from_values(PatternKind::Exclusions, ["ab", "cd"]);
        let compiled = PatternCompiler::compile_source(&source);
        assert_eq!(compiled.strip_all("cabd x"), " x");

        // 顺序反过来结果不同
        let reversed = PatternSource::from_values(PatternKind::Exclusions, ["cd", "ab"]);
        let compiled = PatternCompiler::compile_source(&reversed);
        assert_eq!(compiled.strip_all("cabd x"), "cd x");
    }

    #[test]
    fn test_unicode_case_folding_and_digits() {
        // 忽略大小写与 \d 均按 Unicode 规则生效，不限于 ASCII
        let source = PatternSource::from_values(PatternKind::Crawlers, ["bücherbot", r"Agent/\d+"]);
        let compiled = PatternCompiler::compile_source(&source);

        assert_eq!(compiled.find_first("Mozilla/5.0 BÜCHERBOT/1.0"), Some("BÜCHERBOT"));
        assert_eq!(compiled.find_first("Agent/٣"), Some("Agent/٣"));
    }
}
