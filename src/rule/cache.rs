//! 规则缓存管理
//! 缓存文件为纯文本，每行一条数据，无文件头、无校验
//! 新鲜度以文件最后修改时间判断

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::config::DetectConfig;
use crate::error::{CdResult, CrawlerDetectError};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// 规则缓存管理器
pub struct PatternCacheManager;

impl PatternCacheManager {
    /// 确保缓存目录存在，返回目录路径
    pub fn ensure_cache_dir(config: &DetectConfig) -> CdResult<PathBuf> {
        let cache_dir = config.cache_dir();
        if !cache_dir.is_dir() {
            fs::create_dir_all(&cache_dir)?;
            debug!("创建缓存目录：{}", cache_dir.display());
        }
        Ok(cache_dir)
    }

    /// 缓存文件年龄（最后修改时间在未来时视为 0）
    pub fn file_age(path: &Path) -> CdResult<Duration> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }

    /// 缓存是否过期（刷新周期 <= 0 时永不过期）
    pub fn is_stale(path: &Path, config: &DetectConfig) -> CdResult<bool> {
        if !config.refresh_enabled() {
            return Ok(false);
        }
        let max_age = Duration::from_secs((config.refresh_days as u64).saturating_mul(SECONDS_PER_DAY));
        Ok(Self::file_age(path)? > max_age)
    }

    /// 删除过期缓存，删除失败属于致命的状态错误
    pub fn remove_stale(path: &Path) -> CdResult<()> {
        fs::remove_file(path).map_err(|e| {
            CrawlerDetectError::IllegalState(format!(
                "无法删除缓存文件 {}：{}",
                path.display(),
                e
            ))
        })
    }

    /// 将规则行写入缓存文件
    /// 先写入同目录临时文件再 rename，中断的写入不会留下半截缓存
    pub fn save_to_cache(path: &Path, lines: &[String]) -> CdResult<()> {
        let tmp_path = Self::tmp_path(path);
        if let Err(e) = Self::write_lines(&tmp_path, lines) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!("规则已缓存到 {}，共 {} 行", path.display(), lines.len());
        Ok(())
    }

    /// 临时文件路径：<identity>.txt.tmp
    pub fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn write_lines(path: &Path, lines: &[String]) -> CdResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    /// 清除缓存文件（不存在时忽略）
    pub fn clear_cache(path: &Path) -> CdResult<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
