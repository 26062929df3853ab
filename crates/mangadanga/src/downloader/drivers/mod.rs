//! Site drivers
//!
//! A driver knows the markup of one manga site: where the series title is,
//! which links are chapters, how a chapter number is spelled in a link, and
//! how to get from a chapter page to its page images. Drivers are stateless
//! unit structs; all network access goes through the [`PageFetcher`] they
//! are handed, so the orchestrator stays in control of concurrency.
//!
//! Built-in drivers:
//! - [`Manganato`]: manganato.com, chapmanganato.com
//! - [`Mangatown`]: www.mangatown.com
//! - [`Mangadoom`]: www.mngdoom.com
//! - [`Asurascans`]: www.asurascans.com, asura.gg

pub mod asurascans;
pub mod mangadoom;
pub mod manganato;
pub mod mangatown;

pub use asurascans::Asurascans;
pub use mangadoom::Mangadoom;
pub use manganato::Manganato;
pub use mangatown::Mangatown;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};

use crate::downloader::batch::BoundedExecutor;
use crate::downloader::core::files::sanitize;
use crate::downloader::core::http::HttpClient;
use crate::downloader::core::{
    ChapterIndex, ChapterMap, DownloadError, HtmlDocument, Result, ScrapeStep,
};

/// Scraping interface for one source site
#[async_trait]
pub trait SiteDriver: Send + Sync {
    /// Human readable site name
    fn name(&self) -> &str;

    fn base_url(&self) -> &str;

    /// Network authorities (`host` or `host:port`) this driver serves
    fn domains(&self) -> Vec<&str>;

    /// Headers sent with every request issued for this site
    fn request_headers(&self) -> Vec<(&'static str, String)> {
        vec![("Referer", self.base_url().to_string())]
    }

    fn supports_authority(&self, authority: &str) -> bool {
        self.domains().iter().any(|domain| domain.eq_ignore_ascii_case(authority))
    }

    /// Series title as printed on the series page
    fn title(&self, series: &Page<'_>) -> Result<String>;

    /// Raw chapter identifier encoded in a chapter link
    ///
    /// Works on the last non-empty path segment of `href` and never touches
    /// the network.
    fn raw_index_from(&self, href: &str) -> Result<String>;

    /// All chapters of the series in reading order, oldest first
    fn chapter_map(&self, series: &Page<'_>) -> Result<ChapterMap>;

    /// Archive file name for a chapter: `{index}_{sanitized chapter title}.zip`
    fn chapter_filename(&self, index: &ChapterIndex, chapter: &Page<'_>) -> Result<String>;

    /// Absolute page image URLs in reading order
    async fn page_image_urls(&self, chapter: &HtmlDocument, fetcher: &PageFetcher) -> Result<Vec<String>>;
}

/// A fetched page parsed for scraping
///
/// Wraps [`scraper::Html`], which is not `Send`: build one inside a
/// synchronous scope and drop it before the next await.
pub struct Page<'a> {
    document: &'a HtmlDocument,
    html: Html,
}

impl<'a> Page<'a> {
    pub fn parse(document: &'a HtmlDocument) -> Self {
        Self {
            document,
            html: document.html(),
        }
    }

    pub fn url(&self) -> &str {
        self.document.url.as_str()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn resolve(&self, href: &str) -> Result<String> {
        self.document.resolve(href)
    }

    /// First element matching `css`, if any
    pub fn select_first(&self, css: &str, step: ScrapeStep) -> Result<Option<ElementRef<'_>>> {
        let selector = self.selector(css, step)?;
        Ok(self.html.select(&selector).next())
    }

    /// Every element matching `css`, in document order
    pub fn select_all(&self, css: &str, step: ScrapeStep) -> Result<Vec<ElementRef<'_>>> {
        let selector = self.selector(css, step)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Elements matching `css` inside the first element matching `container_css`
    pub fn select_in_first(&self, container_css: &str, css: &str, step: ScrapeStep) -> Result<Vec<ElementRef<'_>>> {
        let container = self
            .select_first(container_css, step)?
            .ok_or_else(|| self.missing(container_css, step))?;
        let selector = self.selector(css, step)?;
        Ok(container.select(&selector).collect())
    }

    /// Every element matching `css`; an empty match is a scrape error
    pub fn require_all(&self, css: &str, step: ScrapeStep) -> Result<Vec<ElementRef<'_>>> {
        let elements = self.select_all(css, step)?;
        if elements.is_empty() {
            return Err(self.missing(css, step));
        }
        Ok(elements)
    }

    /// Trimmed text of the first element matching `css`
    pub fn text_of(&self, css: &str, step: ScrapeStep) -> Result<String> {
        self.select_first(css, step)?
            .map(element_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| self.missing(css, step))
    }

    /// `attr` of every element matching `css`, resolved to absolute URLs
    pub fn attr_urls(&self, css: &str, attr: &str, step: ScrapeStep) -> Result<Vec<String>> {
        self.require_all(css, step)?
            .into_iter()
            .map(|element| {
                let value = element.value().attr(attr).ok_or_else(|| {
                    DownloadError::scrape(step, self.url(), format!("'{}' element without '{}'", css, attr))
                })?;
                self.resolve(value)
            })
            .collect()
    }

    pub fn missing(&self, css: &str, step: ScrapeStep) -> DownloadError {
        DownloadError::scrape(step, self.url(), format!("nothing matched '{}'", css))
    }

    fn selector(&self, css: &str, step: ScrapeStep) -> Result<Selector> {
        Selector::parse(css)
            .map_err(|e| DownloadError::scrape(step, self.url(), format!("bad selector '{}': {}", css, e)))
    }
}

/// Concatenated, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Last non-empty path segment of a link, ignoring query and fragment
pub fn last_path_segment(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or_default()
}

/// Raw chapter identifier taken from the last path segment of `href`
///
/// With no separators the whole segment is the identifier. With one, it is
/// the text between the first and second occurrence of that separator. With
/// two, the first separator is applied and then the second on what remains,
/// so `chapter-12` with `["chapter", "-"]` yields `12`.
pub fn raw_index_by_separators(href: &str, separators: &[&str]) -> Result<String> {
    let segment = last_path_segment(href);
    let not_found = |separator: &str| {
        DownloadError::scrape(
            ScrapeStep::ChapterIndex,
            href,
            format!("separator '{}' not found in '{}'", separator, segment),
        )
    };

    let mut raw = segment;
    for separator in separators {
        raw = raw.split(separator).nth(1).ok_or_else(|| not_found(separator))?;
    }

    if raw.is_empty() {
        return Err(DownloadError::scrape(
            ScrapeStep::ChapterIndex,
            href,
            "empty chapter identifier",
        ));
    }
    Ok(raw.to_string())
}

/// Build a chapter map from the links inside the first `container_css`
///
/// Later matches (related series, sidebars) are ignored. Sites list newest
/// chapters first; the result is reversed into reading order.
pub fn collect_chapter_map<D>(driver: &D, series: &Page<'_>, container_css: &str) -> Result<ChapterMap>
where
    D: SiteDriver + ?Sized,
{
    let mut links = series.select_in_first(container_css, "a", ScrapeStep::ChapterList)?;
    links.reverse();

    let mut chapters = ChapterMap::new();
    for link in links {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let index = ChapterIndex::parse(driver.raw_index_from(href)?)?;
        chapters.insert(index, series.resolve(href)?);
    }
    Ok(chapters)
}

/// `{index}_{sanitized chapter title}.zip`
pub fn archive_filename(index: &ChapterIndex, chapter_title: &str) -> String {
    format!("{}_{}.zip", index.raw(), sanitize(chapter_title))
}

/// Network access handed to drivers and used for page images
///
/// Carries the site's headers so every request looks the same to the
/// server, and bounds how many requests one chapter issues at once.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: HttpClient,
    headers: HeaderMap,
    executor: BoundedExecutor,
}

impl PageFetcher {
    pub fn new(client: HttpClient, headers: HeaderMap, executor: BoundedExecutor) -> Self {
        Self {
            client,
            headers,
            executor,
        }
    }

    pub async fn fetch_document(&self, url: &str) -> Result<HtmlDocument> {
        self.client.get_document(url, &self.headers).await
    }

    /// Fetch several pages, keeping their order; fails on the first error
    pub async fn fetch_documents(&self, urls: &[String]) -> Result<Vec<HtmlDocument>> {
        self.executor
            .try_run_ordered(urls.iter().cloned().map(|url| async move { self.fetch_document(&url).await }))
            .await
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.client.get_bytes(url, &self.headers).await
    }

    pub fn executor(&self) -> BoundedExecutor {
        self.executor
    }
}
