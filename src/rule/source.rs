//! 规则数据源
//! 固定列表构造的数据源永不变化；带规则源的数据源通过 reload 整体替换快照

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::cache::PatternCacheManager;
use super::loader::PatternLoader;
use super::model::PatternKind;
use super::origin::PatternOrigin;
use crate::config::DetectConfig;
use crate::error::CdResult;

/// 规则行快照（不可变）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSnapshot {
    lines: Vec<String>,
}

impl PatternSnapshot {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Deref for PatternSnapshot {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.lines
    }
}

/// 规则数据源
#[derive(Debug, Clone)]
pub struct PatternSource {
    kind: PatternKind,
    identity: String,
    origin: Option<PatternOrigin>,
    config: DetectConfig,
    snapshot: Arc<PatternSnapshot>,
}

impl PatternSource {
    /// 由固定列表构造（Headers 类别同样做名称规范化）
    pub fn from_values<I, S>(kind: PatternKind, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = values.into_iter().map(Into::into).collect();
        Self {
            kind,
            identity: kind.identity().to_string(),
            origin: None,
            config: DetectConfig::default(),
            snapshot: Arc::new(PatternSnapshot::new(kind.transform(lines))),
        }
    }

    /// 由规则源构造，立即执行一次 reload；缓存文件名取自类别默认标识
    pub fn from_origin(kind: PatternKind, origin: PatternOrigin, config: &DetectConfig) -> CdResult<Self> {
        Self::from_origin_with_identity(kind, kind.identity(), origin, config)
    }

    /// 由规则源构造，显式指定缓存标识（决定缓存文件名，避免不同数据源冲突）
    pub fn from_origin_with_identity(
        kind: PatternKind,
        identity: impl AsRef<str>,
        origin: PatternOrigin,
        config: &DetectConfig,
    ) -> CdResult<Self> {
        let mut source = Self {
            kind,
            identity: sanitize_identity(identity.as_ref()),
            origin: Some(origin),
            config: config.clone(),
            snapshot: Arc::new(PatternSnapshot::default()),
        };
        source.reload()?;
        Ok(source)
    }

    /// 重新加载数据；固定列表数据源为空操作
    /// 读取失败时保留原快照
    pub fn reload(&mut self) -> CdResult<()> {
        let Some(origin) = &self.origin else {
            return Ok(());
        };

        let lines = PatternLoader::load(origin, &self.identity, &self.config)?;
        let lines = self.kind.transform(lines);
        debug!("[{}] 重新加载完成，共 {} 行", self.identity, lines.len());

        self.snapshot = Arc::new(PatternSnapshot::new(lines));
        Ok(())
    }

    /// 当前全部数据（只读视图）
    pub fn get_all_values(&self) -> &[String] {
        self.snapshot.lines()
    }

    /// 当前快照（共享引用）
    pub fn snapshot(&self) -> Arc<PatternSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn origin(&self) -> Option<&PatternOrigin> {
        self.origin.as_ref()
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// 缓存文件路径（固定列表数据源没有缓存）
    pub fn cache_file_path(&self) -> Option<PathBuf> {
        self.origin
            .as_ref()
            .map(|_| self.config.cache_file_path(&self.identity))
    }

    /// 清除本数据源的缓存文件，下次 reload 将重新拉取规则源
    pub fn clear_cache(&self) -> CdResult<()> {
        match self.cache_file_path() {
            Some(path) => PatternCacheManager::clear_cache(&path),
            None => Ok(()),
        }
    }
}

/// 缓存标识只保留文件名安全字符
fn sanitize_identity(identity: &str) -> String {
    let cleaned: String = identity
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "patterns".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::fs;

    #[test]
    fn test_fixed_values_never_reload() {
        let mut source = PatternSource::from_values(PatternKind::Crawlers, ["Googlebot", "bingbot"]);
        let before = source.snapshot();

        source.reload().unwrap();
        assert!(Arc::ptr_eq(&before, &source.snapshot()));
        assert_eq!(source.get_all_values(), ["Googlebot", "bingbot"]);
        assert_eq!(source.cache_file_path(), None);
    }

    #[test]
    fn test_header_values_are_normalized() {
        let source = PatternSource::from_values(PatternKind::Headers, ["HTTP_USER_AGENT", "HTTP_FROM"]);
        assert_eq!(source.get_all_values(), ["user-agent", "from"]);
    }

    #[test]
    fn test_header_source_normalizes_after_cache_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let origin_path = dir.path().join("Headers.txt");
        fs::write(&origin_path, "HTTP_USER_AGENT\nHTTP_X_DEVICE_USER_AGENT\n").unwrap();

        let source = PatternSource::from_origin(PatternKind::Headers, PatternOrigin::file(&origin_path), &config)
            .unwrap();
        assert_eq!(source.get_all_values(), ["user-agent", "x-device-user-agent"]);

        // 缓存保存原始行，再次加载（命中缓存）仍然规范化
        let cache_path = source.cache_file_path().unwrap();
        assert_eq!(
            fs::read_to_string(&cache_path).unwrap(),
            "HTTP_USER_AGENT\nHTTP_X_DEVICE_USER_AGENT\n"
        );
        let mut source = source;
        source.reload().unwrap();
        assert_eq!(source.get_all_values(), ["user-agent", "x-device-user-agent"]);
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let origin_path = dir.path().join("Crawlers.txt");
        fs::write(&origin_path, "Googlebot\n").unwrap();

        let mut source =
            PatternSource::from_origin(PatternKind::Crawlers, PatternOrigin::file(&origin_path), &config).unwrap();
        source.clear_cache().unwrap();
        fs::remove_file(&origin_path).unwrap();

        assert!(source.reload().is_err());
        assert_eq!(source.get_all_values(), ["Googlebot"]);
    }

    #[test]
    fn test_explicit_identities_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let bots = dir.path().join("bots.txt");
        let devices = dir.path().join("devices.txt");
        fs::write(&bots, "Googlebot/2.1\n").unwrap();
        fs::write(&devices, "Mozilla/5.0 (iPhone)\n").unwrap();

        let a = PatternSource::from_origin_with_identity(PatternKind::Plain, "test/bots", PatternOrigin::file(&bots), &config)
            .unwrap();
        let b =
            PatternSource::from_origin_with_identity(PatternKind::Plain, "test/devices", PatternOrigin::file(&devices), &config)
                .unwrap();

        assert_eq!(a.identity(), "test_bots");
        assert_ne!(a.cache_file_path(), b.cache_file_path());
        assert_eq!(a.get_all_values(), ["Googlebot/2.1"]);
        assert_eq!(b.get_all_values(), ["Mozilla/5.0 (iPhone)"]);
    }

    #[test]
    fn test_sanitize_identity() {
        assert_eq!(sanitize_identity("crawlers"), "crawlers");
        assert_eq!(sanitize_identity("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_identity(""), "patterns");
        assert_eq!(sanitize_identity(".."), "patterns");
    }
}
