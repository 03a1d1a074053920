use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::time::Duration;

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::SourceLocator;
use crate::error::GmtError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolves a locator into decoded, line-readable bytes.
pub trait SourceClient: Send + Sync {
    fn open(&self, source: &SourceLocator) -> Result<Box<dyn BufRead>, GmtError>;
}

/// Reads local files and fetches `http(s)` URLs, decompressing gzip content.
#[derive(Clone)]
pub struct HttpSourceClient {
    client: Client,
}

impl HttpSourceClient {
    pub fn new() -> Result<Self, GmtError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, GmtError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gmt-import/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GmtError::unavailable("http client", err))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GmtError::unavailable("http client", err))?;
        Ok(Self { client })
    }

    fn open_file(
        &self,
        source: &SourceLocator,
        path: &Utf8Path,
    ) -> Result<Box<dyn Read>, GmtError> {
        let file = File::open(path.as_std_path())
            .map_err(|err| GmtError::unavailable(source.to_string(), err))?;
        Ok(Box::new(file))
    }

    fn open_url(&self, url: &str) -> Result<Box<dyn Read>, GmtError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GmtError::unavailable(url, err))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "GMT request failed".to_string());
            return Err(GmtError::SourceUnavailable {
                source_name: url.to_string(),
                status: Some(status),
                reason: format!("status {status}: {message}"),
            });
        }
        Ok(Box::new(response))
    }
}

impl SourceClient for HttpSourceClient {
    fn open(&self, source: &SourceLocator) -> Result<Box<dyn BufRead>, GmtError> {
        let raw = match source {
            SourceLocator::Path(path) => self.open_file(source, path)?,
            SourceLocator::Url(url) => self.open_url(url)?,
        };
        decode(raw, source)
    }
}

/// Wraps `raw` in a gzip decoder when its first bytes carry the gzip magic.
///
/// The magic is collected across as many reads as needed, so streams that
/// hand out one byte at a time are still sniffed correctly.
pub fn decode<R: Read + 'static>(
    raw: R,
    source: &SourceLocator,
) -> Result<Box<dyn BufRead>, GmtError> {
    let mut reader = BufReader::new(raw);
    let mut head = Vec::with_capacity(GZIP_MAGIC.len());
    while head.len() < GZIP_MAGIC.len() {
        let buf = reader
            .fill_buf()
            .map_err(|err| GmtError::unavailable(source.to_string(), err))?;
        if buf.is_empty() {
            break;
        }
        let take = buf.len().min(GZIP_MAGIC.len() - head.len());
        head.extend_from_slice(&buf[..take]);
        reader.consume(take);
    }
    let compressed = is_gzip(&head);

    if compressed != source.has_gzip_suffix() {
        debug!(
            source = %source,
            compressed,
            "filename suffix disagrees with content; using content"
        );
    }

    let stream = Cursor::new(head).chain(reader);
    if compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(stream))))
    } else {
        Ok(Box::new(stream))
    }
}

pub fn is_gzip(head: &[u8]) -> bool {
    head.starts_with(&GZIP_MAGIC)
}
