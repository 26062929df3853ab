//! Driver for www.mangatown.com
//!
//! Mangatown shows one page per reader URL. The chapter page carries a page
//! drop-down whose options point at every reader URL of the chapter, so the
//! image list takes one extra fetch per page.

use async_trait::async_trait;

use super::{
    Page, PageFetcher, SiteDriver, archive_filename, collect_chapter_map, element_text, raw_index_by_separators,
};
use crate::downloader::core::{ChapterIndex, ChapterMap, DownloadError, HtmlDocument, Result, ScrapeStep};

const BASE_URL: &str = "https://www.mangatown.com/";
const DOMAINS: &[&str] = &["www.mangatown.com"];
const SEPARATORS: &[&str] = &["c"];
const TITLE: &str = ".title-top";
/// Advert entry in the page drop-down
const FEATURED_OPTION: &str = "Featured";

#[derive(Debug, Clone, Copy, Default)]
pub struct Mangatown;

impl Mangatown {
    fn reader_page_urls(chapter: &Page<'_>) -> Result<Vec<String>> {
        let options = chapter.select_in_first(".page_select", "option", ScrapeStep::PageSelector)?;
        options
            .into_iter()
            .filter(|option| element_text(*option) != FEATURED_OPTION)
            .map(|option| {
                let value = option.value().attr("value").ok_or_else(|| {
                    DownloadError::scrape(ScrapeStep::PageSelector, chapter.url(), "page option without a value")
                })?;
                chapter.resolve(value)
            })
            .collect()
    }

    fn image_url(reader: &Page<'_>) -> Result<String> {
        let src = reader
            .select_first(".read_img img", ScrapeStep::PageImages)?
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| reader.missing(".read_img img", ScrapeStep::PageImages))?;
        // Image sources are protocol-relative (`//zjcdn.mangahere.org/...`)
        reader.resolve(src)
    }
}

#[async_trait]
impl SiteDriver for Mangatown {
    fn name(&self) -> &str {
        "Mangatown"
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn domains(&self) -> Vec<&str> {
        DOMAINS.to_vec()
    }

    fn title(&self, series: &Page<'_>) -> Result<String> {
        series
            .text_of(TITLE, ScrapeStep::ChapterTitle)
            .map_err(|_| DownloadError::MissingTitle {
                url: series.url().to_string(),
                selector: TITLE.to_string(),
            })
    }

    fn raw_index_from(&self, href: &str) -> Result<String> {
        raw_index_by_separators(href, SEPARATORS)
    }

    fn chapter_map(&self, series: &Page<'_>) -> Result<ChapterMap> {
        collect_chapter_map(self, series, ".chapter_list")
    }

    fn chapter_filename(&self, index: &ChapterIndex, chapter: &Page<'_>) -> Result<String> {
        let title = chapter.text_of(".title h1", ScrapeStep::ChapterTitle)?;
        Ok(archive_filename(index, &title))
    }

    async fn page_image_urls(&self, chapter: &HtmlDocument, fetcher: &PageFetcher) -> Result<Vec<String>> {
        let reader_urls = Self::reader_page_urls(&Page::parse(chapter))?;
        let readers = fetcher.fetch_documents(&reader_urls).await?;
        readers
            .iter()
            .map(|reader| Self::image_url(&Page::parse(reader)))
            .collect()
    }
}
