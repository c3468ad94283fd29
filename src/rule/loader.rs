//! 规则加载管理器
//! 负责从本地缓存或规则源拉取规则行

use tracing::{debug, info};

use super::cache::PatternCacheManager;
use super::origin::PatternOrigin;
use crate::config::DetectConfig;
use crate::error::CdResult;

/// 规则加载管理器
pub struct PatternLoader;

impl PatternLoader {
    /// 加载规则行（缓存新鲜则直接使用缓存，否则拉取规则源并写入缓存）
    pub fn load(origin: &PatternOrigin, identity: &str, config: &DetectConfig) -> CdResult<Vec<String>> {
        // 1. 准备缓存目录与缓存文件路径
        PatternCacheManager::ensure_cache_dir(config)?;
        let cache_path = config.cache_file_path(identity);

        // 2. 判断缓存是否可用：过期则删除，未过期则作为本次的实际规则源
        let mut effective = None;
        if cache_path.is_file() {
            if PatternCacheManager::is_stale(&cache_path, config)? {
                info!("缓存 {} 已过期，删除后重新拉取 {}", cache_path.display(), origin);
                PatternCacheManager::remove_stale(&cache_path)?;
            } else {
                debug!("使用本地缓存 {}", cache_path.display());
                effective = Some(PatternOrigin::File(cache_path.clone()));
            }
        }

        // 3. 读取全部规则行
        let lines = effective.as_ref().unwrap_or(origin).read_lines(config)?;

        // 4. 本次加载前没有缓存则写入缓存
        if !cache_path.exists() {
            PatternCacheManager::save_to_cache(&cache_path, &lines)?;
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::fs;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_fresh_cache_skips_origin() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let origin_path = dir.path().join("origin.txt");
        fs::write(&origin_path, "Googlebot\nbingbot\n").unwrap();
        let origin = PatternOrigin::file(&origin_path);

        let first = PatternLoader::load(&origin, "crawlers", &config).unwrap();
        assert_eq!(first, vec!["Googlebot", "bingbot"]);
        assert!(config.cache_file_path("crawlers").is_file());

        // 删除规则源后，新鲜缓存仍可加载
        fs::remove_file(&origin_path).unwrap();
        let second = PatternLoader::load(&origin, "crawlers", &config).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_stale_cache_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).refresh_days(1).build();
        let origin_path = dir.path().join("origin.txt");
        fs::write(&origin_path, "old\n").unwrap();
        let origin = PatternOrigin::file(&origin_path);

        PatternLoader::load(&origin, "exclusions", &config).unwrap();
        fs::write(&origin_path, "new\n").unwrap();

        let cache_path = config.cache_file_path("exclusions");
        let file = fs::File::options().write(true).open(&cache_path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60))
            .unwrap();
        drop(file);

        let lines = PatternLoader::load(&origin, "exclusions", &config).unwrap();
        assert_eq!(lines, vec!["new"]);
        assert_eq!(fs::read_to_string(&cache_path).unwrap(), "new\n");
    }

    #[test]
    fn test_interrupted_write_is_not_trusted() {
        // 测试场景：上次写缓存中途退出，只留下半截临时文件，没有正式缓存
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let origin_path = dir.path().join("origin.txt");
        fs::write(&origin_path, "Googlebot\nbingbot\nZermelo\n").unwrap();
        let origin = PatternOrigin::file(&origin_path);

        PatternCacheManager::ensure_cache_dir(&config).unwrap();
        let cache_path = config.cache_file_path("crawlers");
        let tmp_path = PatternCacheManager::tmp_path(&cache_path);
        fs::write(&tmp_path, "Googlebot\nbin").unwrap();

        let lines = PatternLoader::load(&origin, "crawlers", &config).unwrap();
        assert_eq!(lines, vec!["Googlebot", "bingbot", "Zermelo"]);
        assert_eq!(fs::read_to_string(&cache_path).unwrap(), "Googlebot\nbingbot\nZermelo\n");
        assert!(!tmp_path.exists());
    }

    #[test]
    fn test_missing_origin_without_cache_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::custom().base_dir(dir.path()).build();
        let origin = PatternOrigin::file(dir.path().join("missing.txt"));

        let err = PatternLoader::load(&origin, "headers", &config).unwrap_err();
        assert!(err.is_io_error());
        assert!(!config.cache_file_path("headers").exists());
    }
}
