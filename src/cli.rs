//! Command-line interface
//!
//! Parses a curl-compatible flag set with clap, then validates it into an
//! `Invocation`: a request descriptor plus cache policy and output options.
//! All configuration errors are caught here, before the cache or the
//! network is ever touched.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;
use url::Url;

use crate::cache::{CachePolicy, Expiry};
use crate::duration::parse_duration;
use crate::request::RequestDescriptor;

/// HTTP methods accepted by `--request`.
const KNOWN_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS", "PATCH", "TRACE",
];

/// Configuration errors, detected before any cache or network interaction.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid --expires value: '{0}'")]
    InvalidDuration(String),

    #[error("invalid --header value: '{0}' (expected 'Name: value')")]
    InvalidHeader(String),

    #[error("invalid --request method: '{0}'")]
    InvalidMethod(String),

    #[error("invalid --proxy value: '{0}' (expected host or host:port)")]
    InvalidProxy(String),

    #[error("invalid url: '{0}'")]
    InvalidUrl(String),

    #[error("expected exactly one URL argument, got {0}")]
    UrlCount(usize),
}

/// An HTTP client, similar to curl, that caches every response to disk.
#[derive(Parser, Debug)]
#[command(name = "recurl")]
#[command(about = "An HTTP client, similar to curl, that caches every response to disk")]
#[command(version)]
pub struct Cli {
    /// Request body; implies POST unless --request is given
    #[arg(short = 'd', long, value_name = "DATA")]
    pub data: Option<String>,

    /// Custom request header, 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Include the status line and headers in the output
    #[arg(short = 'i', long)]
    pub include: bool,

    /// Maximum time allowed for the network request, in seconds
    #[arg(short = 'm', long, value_name = "SECONDS")]
    pub max_time: Option<u64>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Upstream proxy, host or host:port
    #[arg(short = 'x', long, value_name = "HOST[:PORT]")]
    pub proxy: Option<String>,

    /// User-Agent header to send
    #[arg(short = 'A', long, value_name = "NAME")]
    pub user_agent: Option<String>,

    /// HTTP method to use
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    pub request: Option<String>,

    /// Cache directory (default: platform cache dir)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Cache expiration, e.g. 60, 30m, 12h, 1d, 2w, 1y (default: never)
    #[arg(long, value_name = "DURATION")]
    pub expires: Option<String>,

    /// Re-fetch even when a fresh cache entry exists
    #[arg(long)]
    pub force: bool,

    /// Print cache status for the request instead of the response
    #[arg(long)]
    pub status: bool,

    /// Target URL
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,
}

/// A fully validated invocation: what to request, how to cache it, and how
/// to present the result.
#[derive(Debug)]
pub struct Invocation {
    pub request: RequestDescriptor,
    pub policy: CachePolicy,
    /// Cache root override; `None` means the platform default
    pub dir: Option<PathBuf>,
    pub include: bool,
    pub output: Option<PathBuf>,
    pub max_time: Option<Duration>,
    /// Report cache status instead of printing the response
    pub status_mode: bool,
}

impl Invocation {
    /// Validates parsed flags into an invocation.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.urls.len() != 1 {
            return Err(CliError::UrlCount(cli.urls.len()));
        }
        let url = parse_url(&cli.urls[0])?;

        let method = match &cli.request {
            Some(method) => parse_method(method)?,
            None if cli.data.is_some() => "POST".to_string(),
            None => "GET".to_string(),
        };

        let mut headers = Vec::new();
        if let Some(user_agent) = &cli.user_agent {
            headers.push(("User-Agent".to_string(), user_agent.clone()));
        }
        for header in &cli.headers {
            headers.push(parse_header(header)?);
        }

        let mut request = RequestDescriptor::new(&method, url).with_headers(headers);
        if let Some(data) = &cli.data {
            request = request.with_body(data.as_bytes().to_vec());
        }
        if let Some(proxy) = &cli.proxy {
            let proxy = parse_proxy(proxy).ok_or_else(|| CliError::InvalidProxy(proxy.clone()))?;
            request = request.with_proxy(proxy);
        }

        let expires_in = match &cli.expires {
            Some(value) => Expiry::After(
                parse_duration(value).ok_or_else(|| CliError::InvalidDuration(value.clone()))?,
            ),
            None => Expiry::Never,
        };

        Ok(Invocation {
            request,
            policy: CachePolicy {
                expires_in,
                force: cli.force,
            },
            dir: cli.dir.clone(),
            include: cli.include,
            output: cli.output.clone(),
            max_time: cli.max_time.map(Duration::from_secs),
            status_mode: cli.status,
        })
    }
}

/// The platform cache directory for recurl, e.g. `~/.cache/recurl` on
/// Linux. `None` when no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "recurl")?;
    Some(project_dirs.cache_dir().to_path_buf())
}

/// Parses a target URL, defaulting the scheme to `http://` when absent.
pub fn parse_url(s: &str) -> Result<Url, CliError> {
    let candidate = if s.contains("://") {
        s.to_string()
    } else {
        format!("http://{s}")
    };
    Url::parse(&candidate).map_err(|_| CliError::InvalidUrl(s.to_string()))
}

/// Validates an HTTP method, upper-casing it.
pub fn parse_method(s: &str) -> Result<String, CliError> {
    let method = s.to_ascii_uppercase();
    if KNOWN_METHODS.contains(&method.as_str()) {
        Ok(method)
    } else {
        Err(CliError::InvalidMethod(s.to_string()))
    }
}

/// Parses a `Name: value` header argument.
pub fn parse_header(s: &str) -> Result<(String, String), CliError> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| CliError::InvalidHeader(s.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidHeader(s.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parses a proxy target of the form `host` or `host:port`.
///
/// Returns `None` for anything else, including targets that already carry
/// a scheme.
pub fn parse_proxy(s: &str) -> Option<String> {
    if s.is_empty() || s.contains("://") {
        return None;
    }
    match s.split_once(':') {
        None => Some(s.to_string()),
        Some((host, port)) => {
            if host.is_empty() || port.is_empty() {
                return None;
            }
            let _: u16 = port.parse().ok()?;
            Some(format!("{host}:{port}"))
        }
    }
}
