//! 规则源（Origin）定义
//! 规则源只是一个可寻址的字节流：本地文件、file:// URL 或 http(s):// URL
//! 内容按 UTF-8 解码，每行一条数据

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::config::DetectConfig;
use crate::error::{CdResult, CrawlerDetectError};

const FETCH_USER_AGENT: &str = concat!("crawler-detect/", env!("CARGO_PKG_VERSION"));

/// 规则源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOrigin {
    /// 本地文件
    File(PathBuf),
    /// 远程 http(s) 资源
    Remote(Url),
}

impl PatternOrigin {
    /// 解析规则源字符串：带 scheme 的按 URL 处理，否则视为本地路径
    pub fn parse(raw: &str) -> CdResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CrawlerDetectError::InvalidOrigin("规则源为空".to_string()));
        }
        if !raw.contains("://") {
            return Ok(Self::File(PathBuf::from(raw)));
        }

        let url = Url::parse(raw)?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|_| CrawlerDetectError::InvalidOrigin(format!("无法转换为本地路径：{}", raw))),
            other => Err(CrawlerDetectError::InvalidOrigin(format!(
                "不支持的协议 {}：{}",
                other, raw
            ))),
        }
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// 读取规则源的全部行
    pub fn read_lines(&self, config: &DetectConfig) -> CdResult<Vec<String>> {
        match self {
            Self::File(path) => Self::read_file_lines(path),
            Self::Remote(url) => Self::fetch_remote_lines(url, config),
        }
    }

    fn read_file_lines(path: &Path) -> CdResult<Vec<String>> {
        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        debug!("从本地文件 {} 读取 {} 行", path.display(), lines.len());
        Ok(lines)
    }

    fn fetch_remote_lines(url: &Url, config: &DetectConfig) -> CdResult<Vec<String>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        let response = client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, FETCH_USER_AGENT)
            .send()?;

        if !response.status().is_success() {
            return Err(CrawlerDetectError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // 严格按 UTF-8 解码，非法字节视为读取错误而不是替换为 U+FFFD
        let bytes = response.bytes()?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{} 不是合法的 UTF-8：{}", url, e)))?;
        let lines: Vec<String> = body.lines().map(str::to_string).collect();
        debug!("从远程 {} 拉取 {} 行", url, lines.len());
        Ok(lines)
    }
}

impl FromStr for PatternOrigin {
    type Err = CrawlerDetectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatternOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}
