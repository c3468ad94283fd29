//! 规则数据模型：规则集类别、默认远程规则源、Header 名称规范化

use std::fmt;

/// Crawler-Detect 官方规则仓库（raw 文件）
pub const DEFAULT_CRAWLERS_URL: &str =
    "https://raw.githubusercontent.com/JayBizzle/Crawler-Detect/master/raw/Crawlers.txt";
pub const DEFAULT_EXCLUSIONS_URL: &str =
    "https://raw.githubusercontent.com/JayBizzle/Crawler-Detect/master/raw/Exclusions.txt";
pub const DEFAULT_HEADERS_URL: &str =
    "https://raw.githubusercontent.com/JayBizzle/Crawler-Detect/master/raw/Headers.txt";

/// 规则集类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// 爬虫特征正则
    Crawlers,
    /// 排除正则（匹配内容在检测前被移除）
    Exclusions,
    /// 需要检查的 Header 名称
    Headers,
    /// 其他纯文本行数据
    Plain,
}

impl PatternKind {
    /// 默认缓存标识
    pub fn identity(&self) -> &'static str {
        match self {
            Self::Crawlers => "crawlers",
            Self::Exclusions => "exclusions",
            Self::Headers => "headers",
            Self::Plain => "plain",
        }
    }

    /// 默认远程规则源
    pub fn default_url(&self) -> Option<&'static str> {
        match self {
            Self::Crawlers => Some(DEFAULT_CRAWLERS_URL),
            Self::Exclusions => Some(DEFAULT_EXCLUSIONS_URL),
            Self::Headers => Some(DEFAULT_HEADERS_URL),
            Self::Plain => None,
        }
    }

    /// 加载后的行处理（仅 Headers 需要规范化）
    pub fn transform(&self, lines: Vec<String>) -> Vec<String> {
        match self {
            Self::Headers => lines
                .iter()
                .map(|line| HeaderNameNormalizer::normalize(line))
                .collect(),
            _ => lines,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

/// Header 名称规范化工具
/// 环境变量风格（HTTP_USER_AGENT）转为通用 Header 名称（user-agent）
pub struct HeaderNameNormalizer;

impl HeaderNameNormalizer {
    pub const ENV_PREFIX: &'static str = "HTTP_";

    pub fn normalize(name: &str) -> String {
        name.strip_prefix(Self::ENV_PREFIX)
            .unwrap_or(name)
            .to_lowercase()
            .replace('_', "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_names() {
        assert_eq!(HeaderNameNormalizer::normalize("HTTP_USER_AGENT"), "user-agent");
        assert_eq!(HeaderNameNormalizer::normalize("HTTP_X_OPERAMINI_PHONE_UA"), "x-operamini-phone-ua");
        assert_eq!(HeaderNameNormalizer::normalize("HTTP_FROM"), "from");
        // 已规范化的名称保持不变
        assert_eq!(HeaderNameNormalizer::normalize("user-agent"), "user-agent");
        // 前缀大小写敏感，仅 HTTP_ 被剥离
        assert_eq!(HeaderNameNormalizer::normalize("http_user_agent"), "http-user-agent");
    }

    #[test]
    fn test_transform_only_touches_headers() {
        let lines = vec!["HTTP_USER_AGENT".to_string()];
        assert_eq!(PatternKind::Headers.transform(lines.clone()), vec!["user-agent"]);
        assert_eq!(PatternKind::Crawlers.transform(lines.clone()), lines);
    }
}
