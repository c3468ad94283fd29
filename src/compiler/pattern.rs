//! 编译后模式模型
//! 正则编译后的结构，保持规则行原有顺序

use std::borrow::Cow;
use std::sync::Arc;
use regex::Regex;

use crate::rule::PatternSnapshot;

/// 编译后的正则模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    // 在规则源中的行号（从 0 开始）
    pub line: usize,
}

impl CompiledPattern {
    /// 规则描述
    pub fn describe(&self) -> &str {
        self.regex.as_str()
    }
}

/// 编译后的规则集
#[derive(Debug, Clone)]
pub struct CompiledPatternSet {
    pub(crate) snapshot: Arc<PatternSnapshot>,
    pub(crate) patterns: Vec<CompiledPattern>,
}

impl CompiledPatternSet {
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 是否由该快照编译而来
    pub fn is_compiled_from(&self, snapshot: &Arc<PatternSnapshot>) -> bool {
        Arc::ptr_eq(&self.snapshot, snapshot)
    }

    /// 依次用每条正则删除匹配内容，上一条的结果作为下一条的输入
    pub fn strip_all<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(input);
        for pattern in &self.patterns {
            // 无匹配时 replace_all 返回 Borrowed，无需重新分配
            let replaced = match pattern.regex.replace_all(&current, "") {
                Cow::Borrowed(_) => None,
                Cow::Owned(s) => Some(s),
            };
            if let Some(s) = replaced {
                current = Cow::Owned(s);
            }
        }
        current
    }

    /// 按顺序查找第一条命中的正则，返回其第一处匹配文本
    pub fn find_first<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.patterns
            .iter()
            .find_map(|pattern| pattern.regex.find(input))
            .map(|m| m.as_str())
    }

    /// 是否存在任意命中的正则
    pub fn is_match(&self, input: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.regex.is_match(input))
    }
}
