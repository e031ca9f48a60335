use std::io;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::fetch::{FetchSettings, Fetcher, SchemeFetcher};
use crate::render::{Renderer, TagStripRenderer};
use crate::types::LoadError;
use crate::url::Url;

/// Load driver: parse, fetch, and render (unless the URL is `view-source:`).
///
/// Holds no per-load state, so a single `Browser` can be shared between
/// threads and each load owns its own connection.
pub struct Browser {
    fetcher: Box<dyn Fetcher>,
    renderer: Box<dyn Renderer>,
}

impl Browser {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_parts(SchemeFetcher::new(settings), TagStripRenderer)
    }

    pub fn with_parts(
        fetcher: impl Fetcher + 'static,
        renderer: impl Renderer + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            renderer: Box::new(renderer),
        }
    }

    /// Text that `load` would write for `raw_url`.
    pub fn page(&self, raw_url: &str) -> Result<String, LoadError> {
        let url = Url::parse(raw_url)?;
        engine_info!("loading {url}");

        let body = self.fetcher.fetch(&url).map_err(|err| {
            engine_warn!("fetching {url} failed ({}): {err}", err.kind());
            err
        })?;
        engine_debug!("fetched {} bytes of body text", body.len());

        if url.is_view_source() {
            return Ok(body);
        }
        Ok(self.renderer.render_to_string(&body))
    }

    pub fn load<W: io::Write + ?Sized>(&self, raw_url: &str, out: &mut W) -> Result<(), LoadError> {
        let text = self.page(raw_url)?;
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(LoadError::Output)
    }
}

impl Default for Browser {
    fn default() -> Self {
        Self::new(FetchSettings::default())
    }
}

/// Load `raw_url` with default settings and write the result to `out`.
pub fn load<W: io::Write + ?Sized>(raw_url: &str, out: &mut W) -> Result<(), LoadError> {
    Browser::default().load(raw_url, out)
}
