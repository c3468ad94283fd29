//! 候选字符串解析：按 Header 名称列表顺序拼接 Header 值

use crate::utils::HeaderLookup;

/// 候选字符串解析器
pub struct IdentityResolver;

impl IdentityResolver {
    /// 按名称列表顺序查找 Header，存在则追加 " " + 值
    /// 拼接顺序会影响排除规则的删除结果，必须保持名称列表顺序
    pub fn resolve<H, S>(headers: &H, header_names: &[S]) -> String
    where
        H: HeaderLookup + ?Sized,
        S: AsRef<str>,
    {
        let mut candidate = String::new();
        for name in header_names {
            if let Some(value) = headers.lookup(name.as_ref()) {
                candidate.push(' ');
                candidate.push_str(value);
            }
        }
        candidate
    }
}
