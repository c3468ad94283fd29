//! 全局错误类型定义

use thiserror::Error;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum CrawlerDetectError {
    // IO 类错误：规则源或缓存文件无法打开、读取、写入
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL {url} 返回状态码 {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("无效规则源：{0}")]
    InvalidOrigin(String),

    // 状态类错误：缺少必要配置，或过期缓存无法删除
    #[error("非法状态：{0}")]
    IllegalState(String),
}

impl CrawlerDetectError {
    /// 是否属于 IO 类错误（含网络拉取失败）
    pub fn is_io_error(&self) -> bool {
        !matches!(self, Self::IllegalState(_))
    }

    /// 是否属于状态类错误
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }
}

impl From<UrlParseError> for CrawlerDetectError {
    fn from(e: UrlParseError) -> Self {
        Self::InvalidOrigin(e.to_string())
    }
}

// 全局Result类型
pub type CdResult<T> = Result<T, CrawlerDetectError>;
