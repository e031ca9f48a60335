//! Textbrowse engine: URL parsing, scheme fetchers, the HTTP/1.1 exchange and
//! the markup-stripping text renderer.
mod decode;
mod engine;
mod fetch;
mod http;
mod render;
mod types;
mod url;

pub use decode::{decode_body, percent_decode, MalformedEscape, GZIP_ENCODING};
pub use engine::{load, Browser};
pub use fetch::{FetchSettings, Fetcher, SchemeFetcher, DEFAULT_USER_AGENT};
pub use http::{read_response, Headers, HttpClient, HttpResponse, ProtocolError, Request};
pub use render::{Renderer, TagStripRenderer, TextScanner};
pub use types::{ErrorKind, FetchError, LoadError};
pub use url::{
    NetworkUrl, Scheme, Url, UrlError, DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, SCHEME_SEPARATOR,
};
