//! Where the default style comes from when nothing is stored yet.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Request for {url} failed: {message}")]
    Http { url: String, message: String },
}

/// Fetches style markup by URL
pub trait StyleSource {
    fn fetch(&self, url: &str) -> Result<String, SourceError>;
}

/// Reads `file://` URLs and plain paths, relative to `base`
#[derive(Debug, Clone)]
pub struct FileSource {
    base: PathBuf,
}

impl FileSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl StyleSource for FileSource {
    fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let raw = url.strip_prefix("file://").unwrap_or(url);
        if raw.contains("://") {
            return Err(SourceError::UnsupportedUrl(url.to_string()));
        }

        let path = self.base.join(raw);
        std::fs::read_to_string(&path).map_err(|source| SourceError::Io { path, source })
    }
}

/// Downloads styles over HTTP(S)
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("csledit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Http {
                url: String::new(),
                message: format!("client build error: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl StyleSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let http = |e: reqwest::Error| SourceError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(http)
    }
}

/// Remove `<!-- ... -->` comments, including ones spanning lines.
///
/// An unterminated comment swallows the rest of the input, as an XML parser
/// would refuse it anyway.
pub fn strip_comments(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}
