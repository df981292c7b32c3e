//! Outbound request construction: URLs, query parameters, and the headers the site expects.

use crate::source::error::SourceError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Url;

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";
pub const ACCEPT_IMAGE: &str = "image/webp,image/apng,image/*,*/*;q=0.8";
pub const ACCEPT_LANGUAGE_VALUE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7,es;q=0.6,gl;q=0.5";
pub const DEFAULT_REFERER: &str = "https://google.com/";

const SEARCH_PATH: &str = "/mangas";
const LATEST_PATH: &str = "/index.php";

/// A GET request ready to hand to [PoliteClient](crate::source::PoliteClient).
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    fn get(url: Url) -> Self {
        Self {
            url,
            headers: default_headers(),
        }
    }

    fn with_header(
        mut self,
        name: reqwest::header::HeaderName,
        value: &str,
    ) -> Result<Self, SourceError> {
        let value = HeaderValue::from_str(value).map_err(|e| SourceError::InvalidUrl {
            input: value.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Header value as text, if present and visible ASCII.
    pub fn header(&self, name: reqwest::header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );
    headers.insert(REFERER, HeaderValue::from_static(DEFAULT_REFERER));
    headers
}

/// Builds every request the source issues, relative to one base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
}

impl RequestBuilder {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a site path (or pass through an absolute URL) against the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, SourceError> {
        let url = url.trim();
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }
        self.base_url
            .join(url)
            .map_err(|e| SourceError::InvalidUrl {
                input: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// The site has a single "most read" block on its home page.
    pub fn popular_request(&self) -> Request {
        Request::get(self.base_url.clone())
    }

    /// Latest updates; page numbering starts at 1 and page 1 is the home page itself.
    pub fn latest_request(&self, page: u32) -> Request {
        let mut url = self.base_url.clone();
        if page > 1 {
            url.set_path(LATEST_PATH);
            url.query_pairs_mut()
                .clear()
                .append_pair("pagina", &page.to_string());
        }
        Request::get(url)
    }

    pub fn search_request(&self, query: &str) -> Result<Request, SourceError> {
        let mut referer = self.base_url.clone();
        referer.set_path(SEARCH_PATH);
        referer.set_query(None);
        let mut url = referer.clone();
        url.query_pairs_mut().append_pair("busca", query);
        Request::get(url).with_header(REFERER, referer.as_str())
    }

    pub fn details_request(&self, url: &str) -> Result<Request, SourceError> {
        Ok(Request::get(self.resolve(url)?))
    }

    pub fn chapter_list_request(&self, url: &str) -> Result<Request, SourceError> {
        Ok(Request::get(self.resolve(url)?))
    }

    /// Chapter document; the Referer is the chapter URL without its last path segment.
    pub fn chapter_page_request(&self, chapter_url: &str) -> Result<Request, SourceError> {
        let parent = match chapter_url.trim().rsplit_once('/') {
            Some((parent, _)) => parent,
            None => chapter_url.trim(),
        };
        let referer = self.resolve(parent)?;
        Request::get(self.resolve(chapter_url)?).with_header(REFERER, referer.as_str())
    }

    pub fn image_request(&self, page_url: &str, image_url: &str) -> Result<Request, SourceError> {
        Request::get(self.resolve(image_url)?)
            .with_header(ACCEPT, ACCEPT_IMAGE)?
            .with_header(REFERER, page_url)
    }
}
