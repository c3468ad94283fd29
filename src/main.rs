//! crawler-detect 命令行工具
//! 检测参数或标准输入中的 User-Agent 是否来自爬虫

use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crawler_detect::{
    ConfigManager, DetectConfig, Detector, HeaderConverter, PatternKind, PatternOrigin, PatternSource,
};

#[derive(Debug, Parser)]
#[command(name = "crawler-detect", version, about = "检测 User-Agent 是否来自爬虫/机器人")]
struct Cli {
    /// 待检测的 User-Agent；为空时从标准输入逐行读取
    user_agents: Vec<String>,

    /// 以请求 Header 方式检测（可重复，格式 "Name: value"）
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// 缓存根目录（默认读取 CRAWLER_DETECT_BASE_DIR，否则为系统临时目录）
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// 缓存刷新周期（天），<= 0 表示永不过期（默认读取 CRAWLER_DETECT_REFRESH_DAYS，否则 31）
    #[arg(long, allow_negative_numbers = true)]
    refresh_days: Option<i64>,

    /// HTTP 超时（秒，默认 30）
    #[arg(long)]
    timeout: Option<u64>,

    /// 自定义爬虫特征规则源（本地路径或 URL）
    #[arg(long)]
    crawlers: Option<String>,

    /// 自定义排除规则源（本地路径或 URL）
    #[arg(long)]
    exclusions: Option<String>,

    /// 自定义 Header 名称规则源（本地路径或 URL）
    #[arg(long = "headers-list")]
    headers_list: Option<String>,

    /// 以 JSON 行输出
    #[arg(long)]
    json: bool,

    /// 输出详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct DetectReport<'a> {
    input: &'a str,
    is_crawler: bool,
    matched: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli);

    let detector = build_detector(&cli, &config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.headers.is_empty() {
        let header_map = HeaderConverter::from_lines(cli.headers.as_slice()).context("解析 Header 失败")?;
        let matched = detector.get_matching_crawler_headers(&header_map)?;
        let input = cli.headers.join("; ");
        print_report(&mut out, &input, matched, cli.json)?;
    }

    if !cli.user_agents.is_empty() {
        for ua in &cli.user_agents {
            let matched = detector.get_matching_crawler(ua)?;
            print_report(&mut out, ua, matched, cli.json)?;
        }
    } else if cli.headers.is_empty() {
        for line in io::stdin().lock().lines() {
            let ua = line.context("读取标准输入失败")?;
            if ua.trim().is_empty() {
                continue;
            }
            let matched = detector.get_matching_crawler(&ua)?;
            print_report(&mut out, &ua, matched, cli.json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "crawler_detect=debug" } else { "crawler_detect=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// 环境变量覆盖默认值，命令行参数覆盖环境变量
fn build_config(cli: &Cli) -> DetectConfig {
    let mut builder = ConfigManager::from_env();
    if let Some(dir) = &cli.cache_dir {
        builder = builder.base_dir(dir);
    }
    if let Some(days) = cli.refresh_days {
        builder = builder.refresh_days(days);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.http_timeout(timeout);
    }
    builder.build()
}

/// 未指定的规则源使用 Crawler-Detect 官方规则
fn build_detector(cli: &Cli, config: &DetectConfig) -> Result<Detector> {
    let mut detector = Detector::new();
    detector.set_crawler_patterns(load_source(PatternKind::Crawlers, cli.crawlers.as_deref(), config)?);
    detector.set_ua_exclusions(load_source(PatternKind::Exclusions, cli.exclusions.as_deref(), config)?);
    detector.set_headers_to_check(load_source(PatternKind::Headers, cli.headers_list.as_deref(), config)?);
    Ok(detector)
}

fn load_source(kind: PatternKind, custom: Option<&str>, config: &DetectConfig) -> Result<PatternSource> {
    let (identity, raw_origin) = match custom {
        // 自定义规则源：相同规则源 → 相同哈希 → 相同缓存文件，且不覆盖官方规则缓存
        Some(raw) => {
            let mut hasher = DefaultHasher::new();
            raw.hash(&mut hasher);
            (format!("custom-{}-{:x}", kind, hasher.finish()), raw)
        }
        None => (
            kind.identity().to_string(),
            kind.default_url().context("缺少默认规则源")?,
        ),
    };
    let origin = PatternOrigin::parse(raw_origin)?;
    PatternSource::from_origin_with_identity(kind, &identity, origin.clone(), config)
        .with_context(|| format!("加载 {} 规则失败：{}", kind, origin))
}

fn print_report(out: &mut impl Write, input: &str, matched: Option<String>, json: bool) -> Result<()> {
    let report = DetectReport {
        input,
        is_crawler: matched.is_some(),
        matched,
    };
    if json {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        match &report.matched {
            Some(m) => writeln!(out, "crawler\t{}\t{}", m, report.input)?,
            None => writeln!(out, "human\t-\t{}", report.input)?,
        }
    }
    Ok(())
}
