//! URL model for the schemes the browser understands.
//!
//! Parsing is purely syntactic: no name resolution or file access happens here.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const SCHEME_SEPARATOR: &str = "://";
pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
    ViewSource,
}

impl Scheme {
    pub const ALL: [Scheme; 5] = [
        Scheme::Http,
        Scheme::Https,
        Scheme::File,
        Scheme::Data,
        Scheme::ViewSource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
            Scheme::ViewSource => "view-source",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scheme| scheme.as_str() == name)
    }

    /// Schemes whose payload is not a hierarchical location and may therefore
    /// be written with a bare `:` (`data:text/plain,hi`).
    fn is_opaque(self) -> bool {
        matches!(self, Scheme::Data | Scheme::ViewSource)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("malformed url {0:?}: missing \"://\" scheme separator")]
    MissingSchemeSeparator(String),
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("malformed url {0:?}: empty host")]
    EmptyHost(String),
    #[error("malformed url: invalid port {0:?}")]
    InvalidPort(String),
}

/// Location of an `http` or `https` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUrl {
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
}

impl NetworkUrl {
    fn parse(scheme: Scheme, rest: &str, raw: &str) -> Result<Self, UrlError> {
        let (host_part, path) = match rest.split_once('/') {
            Some((host_part, path)) => (host_part, format!("/{path}")),
            None => (rest, "/".to_string()),
        };

        let (host, port) = match host_part.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| UrlError::InvalidPort(port.to_string()))?;
                (host, port)
            }
            None => (host_part, default_port(scheme)),
        };

        if host.is_empty() {
            return Err(UrlError::EmptyHost(raw.to_string()));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            path,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request target, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }
}

impl fmt::Display for NetworkUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SCHEME_SEPARATOR}{}", self.scheme, self.host)?;
        if self.port != default_port(self.scheme) {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.path)
    }
}

fn default_port(scheme: Scheme) -> u16 {
    match scheme {
        Scheme::Https => DEFAULT_HTTPS_PORT,
        _ => DEFAULT_HTTP_PORT,
    }
}

/// A parsed URL. `ViewSource` owns the wrapped target, so nesting depth is
/// bounded only by the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Url {
    Network(NetworkUrl),
    File { path: String },
    Data { payload: String },
    ViewSource(Box<Url>),
}

impl Url {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let (scheme, rest) = split_scheme(raw)?;
        match scheme {
            Scheme::File => Ok(Url::File {
                path: rest.to_string(),
            }),
            Scheme::Data => Ok(Url::Data {
                payload: rest.to_string(),
            }),
            Scheme::ViewSource => Ok(Url::ViewSource(Box::new(Url::parse(rest)?))),
            Scheme::Http | Scheme::Https => NetworkUrl::parse(scheme, rest, raw).map(Url::Network),
        }
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Url::Network(network) => network.scheme(),
            Url::File { .. } => Scheme::File,
            Url::Data { .. } => Scheme::Data,
            Url::ViewSource(_) => Scheme::ViewSource,
        }
    }

    pub fn is_view_source(&self) -> bool {
        matches!(self, Url::ViewSource(_))
    }
}

fn split_scheme(raw: &str) -> Result<(Scheme, &str), UrlError> {
    if let Some((name, rest)) = raw.split_once(':') {
        if let Some(scheme) = Scheme::from_name(name).filter(|s| s.is_opaque()) {
            return Ok((scheme, rest.strip_prefix("//").unwrap_or(rest)));
        }
    }

    let (name, rest) = raw
        .split_once(SCHEME_SEPARATOR)
        .ok_or_else(|| UrlError::MissingSchemeSeparator(raw.to_string()))?;
    let scheme =
        Scheme::from_name(name).ok_or_else(|| UrlError::UnsupportedScheme(name.to_string()))?;
    Ok((scheme, rest))
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Url::Network(network) => fmt::Display::fmt(network, f),
            Url::File { path } => write!(f, "file{SCHEME_SEPARATOR}{path}"),
            Url::Data { payload } => write!(f, "data:{payload}"),
            Url::ViewSource(inner) => write!(f, "view-source:{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(raw: &str) -> NetworkUrl {
        match Url::parse(raw).unwrap() {
            Url::Network(network) => network,
            other => panic!("expected network url, got {other:?}"),
        }
    }

    #[test]
    fn http_defaults_port_and_path() {
        let url = network("http://example.com/");
        assert_eq!(url.scheme(), Scheme::Http);
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), 80);
        assert_eq!(url.path(), "/");
        assert!(!url.is_tls());
    }

    #[test]
    fn https_explicit_port() {
        let url = network("https://example.com:8443/a/b");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), 8443);
        assert_eq!(url.path(), "/a/b");
        assert!(url.is_tls());
    }

    #[test]
    fn https_default_port() {
        assert_eq!(network("https://example.com/x").port(), 443);
    }

    #[test]
    fn missing_path_normalizes_to_root() {
        assert_eq!(network("http://example.com").path(), "/");
        assert_eq!(network("http://example.com:81").path(), "/");
    }

    #[test]
    fn query_stays_in_path() {
        assert_eq!(network("http://example.com/a?b=c").path(), "/a?b=c");
    }

    #[test]
    fn bad_port_is_malformed() {
        assert_eq!(
            Url::parse("http://example.com:http/"),
            Err(UrlError::InvalidPort("http".into()))
        );
        assert_eq!(
            Url::parse("http://example.com:70000/"),
            Err(UrlError::InvalidPort("70000".into()))
        );
    }

    #[test]
    fn empty_host_is_malformed() {
        assert!(matches!(
            Url::parse("http:///index.html"),
            Err(UrlError::EmptyHost(_))
        ));
    }

    #[test]
    fn missing_separator_is_malformed() {
        assert_eq!(
            Url::parse("example.com/index.html"),
            Err(UrlError::MissingSchemeSeparator(
                "example.com/index.html".into()
            ))
        );
        assert!(matches!(
            Url::parse("http:example.com"),
            Err(UrlError::MissingSchemeSeparator(_))
        ));
    }

    #[test]
    fn only_known_schemes_are_accepted() {
        for scheme in Scheme::ALL {
            let raw = match scheme {
                Scheme::ViewSource => "view-source:http://example.com/".to_string(),
                Scheme::Data => "data:text/plain,x".to_string(),
                other => format!("{other}://example.com/"),
            };
            assert_eq!(Url::parse(&raw).unwrap().scheme(), scheme, "{raw}");
        }
        for raw in ["ftp://example.com/", "gopher://x/", "HTTP://example.com/", "://x"] {
            assert!(
                matches!(Url::parse(raw), Err(UrlError::UnsupportedScheme(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn file_keeps_whole_remainder() {
        assert_eq!(
            Url::parse("file:///tmp/page.html").unwrap(),
            Url::File {
                path: "/tmp/page.html".into()
            }
        );
    }

    #[test]
    fn data_accepts_both_separators() {
        let expected = Url::Data {
            payload: "text/plain,hello%20world".into(),
        };
        assert_eq!(Url::parse("data:text/plain,hello%20world").unwrap(), expected);
        assert_eq!(Url::parse("data://text/plain,hello%20world").unwrap(), expected);
    }

    #[test]
    fn view_source_wraps_parsed_inner() {
        let url = Url::parse("view-source:http://example.com/").unwrap();
        assert_eq!(
            url,
            Url::ViewSource(Box::new(Url::parse("http://example.com/").unwrap()))
        );
        assert_eq!(
            Url::parse("view-source://http://example.com/").unwrap(),
            url
        );
    }

    #[test]
    fn view_source_nests_arbitrarily() {
        let url = Url::parse("view-source:view-source:data:,x").unwrap();
        let Url::ViewSource(inner) = url else {
            panic!("outer must be view-source");
        };
        let Url::ViewSource(innermost) = *inner else {
            panic!("inner must be view-source");
        };
        assert_eq!(innermost.scheme(), Scheme::Data);
    }

    #[test]
    fn view_source_propagates_inner_error() {
        assert_eq!(
            Url::parse("view-source:ftp://example.com/"),
            Err(UrlError::UnsupportedScheme("ftp".into()))
        );
    }

    #[test]
    fn display_is_canonical() {
        for raw in [
            "http://example.com/",
            "https://example.com:8443/a/b",
            "file:///tmp/x.html",
            "data:text/plain,hi",
            "view-source:http://example.com/",
        ] {
            assert_eq!(Url::parse(raw).unwrap().to_string(), raw);
        }
        assert_eq!(
            Url::parse("http://example.com:80").unwrap().to_string(),
            "http://example.com/"
        );
    }
}
