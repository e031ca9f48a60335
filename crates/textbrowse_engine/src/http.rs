//! One-shot HTTP/1.1 exchange over a plain or TLS socket.
//!
//! Every call opens a fresh connection, sends a single `GET` with
//! `Connection: close`, reads the response until the peer closes, and drops
//! the socket. Status codes are logged but never acted on.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};

use engine_logging::{engine_debug, engine_info, engine_trace, engine_warn};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use thiserror::Error;

use crate::decode::decode_body;
use crate::fetch::FetchSettings;
use crate::types::FetchError;
use crate::url::NetworkUrl;

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &str = "\r\n";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed status line {0:?}")]
    MalformedStatusLine(String),
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("connection closed before the end of the response head")]
    UnexpectedEof,
    #[error("response head is not valid utf-8")]
    InvalidHeadEncoding,
    #[error("gzip decompression failed: {0}")]
    Gzip(#[source] io::Error),
    #[error("response body is not valid utf-8")]
    InvalidBodyEncoding,
    #[error("i/o error during exchange: {0}")]
    Io(#[from] io::Error),
}

/// A `GET` request rendered exactly as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    host: &'a str,
    target: &'a str,
    user_agent: &'a str,
}

impl<'a> Request<'a> {
    pub fn get(url: &'a NetworkUrl, user_agent: &'a str) -> Self {
        Self {
            host: url.host(),
            target: url.path(),
            user_agent,
        }
    }

    /// Header fields in the order they are sent.
    pub fn headers(&self) -> [(&'static str, &'a str); 4] {
        [
            ("Host", self.host),
            ("Connection", "close"),
            ("User-Agent", self.user_agent),
            ("Accept-Encoding", "gzip"),
        ]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("GET {} {HTTP_VERSION}{CRLF}", self.target);
        for (name, value) in self.headers() {
            head.push_str(&format!("{name}: {value}{CRLF}"));
        }
        head.push_str(CRLF);
        head.into_bytes()
    }
}

/// Response header fields keyed by lowercase name. A repeated field keeps the
/// last value seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn insert(&mut self, name: &str, value: &str) {
        self.0
            .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    version: String,
    status: u16,
    reason: String,
    headers: Headers,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body bytes as received, before any content decoding.
    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Result<String, ProtocolError> {
        decode_body(&self.body, self.header("content-encoding"))
    }
}

/// Parse a complete response from `reader`, consuming it to EOF.
pub fn read_response<R: BufRead>(mut reader: R) -> Result<HttpResponse, ProtocolError> {
    let status_line = read_line(&mut reader)?.ok_or(ProtocolError::UnexpectedEof)?;
    let (version, status, reason) = parse_status_line(&status_line)?;
    engine_debug!("status line: {version} {status} {reason}");

    let mut headers = Headers::default();
    loop {
        let line = read_line(&mut reader)?.ok_or(ProtocolError::UnexpectedEof)?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedHeader(line.clone()))?;
        engine_trace!("header {name}: {}", value.trim());
        headers.insert(name, value);
    }

    let mut body = Vec::new();
    match reader.read_to_end(&mut body) {
        Ok(_) => {}
        // TLS peers often close without close_notify; what arrived is the body.
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            engine_debug!("peer closed uncleanly after {} body bytes", body.len());
        }
        Err(err) => return Err(err.into()),
    }

    Ok(HttpResponse {
        version,
        status,
        reason,
        headers,
        body,
    })
}

/// Read one line without its line terminator. `None` at EOF.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ProtocolError> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ProtocolError::InvalidHeadEncoding)
}

fn parse_status_line(line: &str) -> Result<(String, u16, String), ProtocolError> {
    let malformed = || ProtocolError::MalformedStatusLine(line.to_string());
    let mut parts = line.splitn(3, ' ');
    let version = parts
        .next()
        .filter(|v| v.starts_with("HTTP/"))
        .ok_or_else(malformed)?;
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or_default();
    Ok((version.to_string(), status, reason.to_string()))
}

/// Blocking HTTP client; holds only immutable settings, so one instance can
/// serve any number of sequential or concurrent loads.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    settings: FetchSettings,
}

impl HttpClient {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    /// Fetch `url` and return its decoded body text.
    pub fn get(&self, url: &NetworkUrl) -> Result<String, FetchError> {
        let response = self.send(url)?;
        if !(200..300).contains(&response.status()) {
            engine_warn!(
                "{url} answered {} {}; using body anyway",
                response.status(),
                response.reason()
            );
        }
        Ok(response.body_text()?)
    }

    /// Perform the exchange and return the parsed response.
    pub fn send(&self, url: &NetworkUrl) -> Result<HttpResponse, FetchError> {
        let request = Request::get(url, &self.settings.user_agent);
        let tcp = self.connect(url)?;
        let response = if url.is_tls() {
            let tls = self.handshake(url, tcp)?;
            exchange(tls, &request)?
        } else {
            exchange(tcp, &request)?
        };
        engine_debug!("connection to {}:{} closed", url.host(), url.port());
        Ok(response)
    }

    fn connect(&self, url: &NetworkUrl) -> Result<TcpStream, FetchError> {
        let (host, port) = (url.host(), url.port());
        engine_info!("connecting to {host}:{port}");

        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|err| FetchError::connect(host, port, err))?;

        // A zero duration is rejected by the socket calls; treat it as "no limit".
        let connect_timeout = Some(self.settings.connect_timeout).filter(|t| !t.is_zero());
        let read_timeout = self.settings.read_timeout.filter(|t| !t.is_zero());

        let mut last_err = None;
        for addr in addrs {
            let attempt = match connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream
                        .set_read_timeout(read_timeout)
                        .and_then(|()| stream.set_write_timeout(read_timeout))
                        .map_err(|err| FetchError::connect(host, port, err))?;
                    return Ok(stream);
                }
                Err(err) => {
                    engine_debug!("connect to {addr} failed: {err}");
                    last_err = Some(err);
                }
            }
        }

        Err(match last_err {
            Some(err) => FetchError::connect(host, port, err),
            None => FetchError::connect(host, port, "name resolved to no addresses"),
        })
    }

    fn handshake(
        &self,
        url: &NetworkUrl,
        mut tcp: TcpStream,
    ) -> Result<StreamOwned<ClientConnection, TcpStream>, FetchError> {
        let (host, port) = (url.host(), url.port());
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|err| FetchError::connect(host, port, err))?;
        let config = tls_config().map_err(|err| FetchError::connect(host, port, err))?;
        let mut conn = ClientConnection::new(config, server_name)
            .map_err(|err| FetchError::connect(host, port, err))?;

        while conn.is_handshaking() {
            conn.complete_io(&mut tcp)
                .map_err(|err| FetchError::connect(host, port, err))?;
        }
        engine_debug!(
            "tls established with {host}: {:?}",
            conn.protocol_version()
        );
        Ok(StreamOwned::new(conn, tcp))
    }
}

static TLS_CONFIG: OnceLock<Result<Arc<ClientConfig>, rustls::Error>> = OnceLock::new();

/// Client config shared by every https fetch; the root store is built once.
fn tls_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    TLS_CONFIG.get_or_init(build_tls_config).clone()
}

fn build_tls_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Write the request and read the response. `stream` is owned, so the
/// connection is closed when this returns, on success or failure.
fn exchange<S: Read + Write>(mut stream: S, request: &Request<'_>) -> Result<HttpResponse, ProtocolError> {
    stream.write_all(&request.to_bytes())?;
    stream.flush()?;
    read_response(BufReader::new(stream))
}
