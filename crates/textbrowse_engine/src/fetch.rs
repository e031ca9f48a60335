use std::fs;
use std::path::Path;
use std::time::Duration;

use engine_logging::engine_debug;

use crate::decode::{percent_decode, utf8_text};
use crate::http::HttpClient;
use crate::types::FetchError;
use crate::url::Url;

pub const DEFAULT_USER_AGENT: &str = "SimpleBrowser/1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Zero waits for the operating system's own connect timeout.
    pub connect_timeout: Duration,
    /// `None` or zero blocks until the peer closes.
    pub read_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Some(Duration::from_secs(30)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Retrieves the body behind a parsed URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Dispatches on the URL's scheme: local file, inline data, view-source
/// pass-through, or an HTTP exchange.
#[derive(Debug, Clone, Default)]
pub struct SchemeFetcher {
    http: HttpClient,
}

impl SchemeFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            http: HttpClient::new(settings),
        }
    }
}

impl Fetcher for SchemeFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        engine_debug!("fetching {url} via {}", url.scheme());
        match url {
            Url::Network(network) => self.http.get(network),
            Url::File { path } => read_file(Path::new(path)),
            Url::Data { payload } => decode_data(payload),
            Url::ViewSource(inner) => self.fetch(inner),
        }
    }
}

fn read_file(path: &Path) -> Result<String, FetchError> {
    fs::read_to_string(path).map_err(|source| FetchError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// `payload` is `<mediatype>,<data>`; the media type is ignored.
fn decode_data(payload: &str) -> Result<String, FetchError> {
    let (_media_type, data) = payload
        .split_once(',')
        .ok_or_else(|| FetchError::DataUrl(format!("no ',' in {payload:?}")))?;
    let bytes = percent_decode(data).map_err(|err| FetchError::DataUrl(err.to_string()))?;
    utf8_text(&bytes)
        .ok_or_else(|| FetchError::DataUrl("payload is not valid utf-8 once decoded".into()))
}
