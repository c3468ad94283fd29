//! Header格式转换工具
//! 统一不同 Header 容器的按名称查找，以及 "Name: value" 文本行到 HeaderMap 的转换

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{CdResult, CrawlerDetectError};

/// 按 Header 名称查找值
/// 名称大小写是否敏感取决于容器自身的键规范化方式
pub trait HeaderLookup {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<T: HeaderLookup + ?Sized> HeaderLookup for &T {
    fn lookup(&self, name: &str) -> Option<&str> {
        (**self).lookup(name)
    }
}

impl<K, V, S> HeaderLookup for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> HeaderLookup for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

// HeaderMap 名称本身忽略大小写；非可见 ASCII 的值视为不存在
impl HeaderLookup for HeaderMap {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将 "Name: value" 文本行解析为 HeaderMap
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> CdResult<HeaderMap> {
        let mut header_map = HeaderMap::new();
        for line in lines {
            let line = line.as_ref();
            let Some((name, value)) = line.split_once(':') else {
                return Err(CrawlerDetectError::InvalidOrigin(format!("无效Header行：{}", line)));
            };
            let header_name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| CrawlerDetectError::InvalidOrigin(format!("无效Header名称：{}，错误：{}", name, e)))?;
            let header_value = HeaderValue::from_str(value.trim())
                .map_err(|e| CrawlerDetectError::InvalidOrigin(format!("无效Header值：{}，错误：{}", value, e)))?;
            header_map.append(header_name, header_value);
        }
        Ok(header_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_lookup_is_case_sensitive() {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "Zermelo".to_string());

        assert_eq!(headers.lookup("user-agent"), Some("Zermelo"));
        assert_eq!(headers.lookup("User-Agent"), None);

        let borrowed: HashMap<&str, &str> = [("from", "bot@example.com")].into_iter().collect();
        assert_eq!(borrowed.lookup("from"), Some("bot@example.com"));
    }

    #[test]
    fn test_header_map_lookup_ignores_case() {
        let header_map = HeaderConverter::from_lines(&["User-Agent: Zermelo", "X-Empty:"]).unwrap();
        assert_eq!(header_map.lookup("user-agent"), Some("Zermelo"));
        assert_eq!(header_map.lookup("USER-AGENT"), Some("Zermelo"));
        assert_eq!(header_map.lookup("x-empty"), Some(""));
        assert_eq!(header_map.lookup("not a header"), None);
    }

    #[test]
    fn test_from_lines_rejects_garbage() {
        assert!(HeaderConverter::from_lines(&["no separator"]).is_err());
        assert!(HeaderConverter::from_lines(&["bad name: x"]).is_err());
    }

    #[test]
    fn test_repeated_header_uses_first_value() {
        // 同名 Header 重复出现时只取第一个值参与检测
        let header_map = HeaderConverter::from_lines(&["Via: 1.1 proxy", "Via: 1.1 other"]).unwrap();
        assert_eq!(header_map.get_all("via").iter().count(), 2);
        assert_eq!(header_map.lookup("via"), Some("1.1 proxy"));
    }
}
