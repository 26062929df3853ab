//! Driver for manganato.com

use async_trait::async_trait;

use super::{Page, PageFetcher, SiteDriver, archive_filename, collect_chapter_map, raw_index_by_separators};
use crate::downloader::core::{ChapterIndex, ChapterMap, DownloadError, HtmlDocument, Result, ScrapeStep};

const BASE_URL: &str = "https://manganato.com/";
const DOMAINS: &[&str] = &["manganato.com", "chapmanganato.com"];
const SEPARATORS: &[&str] = &["chapter", "-"];
const TITLE: &str = ".story-info-right h1";

/// Chapter links look like `https://chapmanganato.com/manga-aa951409/chapter-1081`
#[derive(Debug, Clone, Copy, Default)]
pub struct Manganato;

#[async_trait]
impl SiteDriver for Manganato {
    fn name(&self) -> &str {
        "Manganato"
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
        collect_chapter_map(self, series, ".panel-story-chapter-list")
    }

    fn chapter_filename(&self, index: &ChapterIndex, chapter: &Page<'_>) -> Result<String> {
        let title = chapter.text_of(".panel-chapter-info-top h1", ScrapeStep::ChapterTitle)?;
        Ok(archive_filename(index, &title))
    }

    async fn page_image_urls(&self, chapter: &HtmlDocument, _fetcher: &PageFetcher) -> Result<Vec<String>> {
        Page::parse(chapter).attr_urls(".container-chapter-reader img", "src", ScrapeStep::PageImages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_index_from_chapter_link() {
        let driver = Manganato;
        assert_eq!(
            driver.raw_index_from("https://chapmanganato.com/manga-aa951409/chapter-1081").unwrap(),
            "1081"
        );
        assert_eq!(
            driver.raw_index_from("https://chapmanganato.com/manga-aa951409/chapter-10.5").unwrap(),
            "10.5"
        );
        assert!(driver.raw_index_from("https://chapmanganato.com/manga-aa951409/").is_err());
    }

    #[test]
    fn test_chapter_map_is_in_reading_order() {
        let document = HtmlDocument::parse(
            "https://chapmanganato.com/manga-aa951409",
            r#"<div class="story-info-right"><h1>Solo Leveling</h1></div>
               <ul class="panel-story-chapter-list">
                 <li><a href="https://chapmanganato.com/manga-aa951409/chapter-2">Chapter 2</a></li>
                 <li><a href="https://chapmanganato.com/manga-aa951409/chapter-1.5">Chapter 1.5</a></li>
                 <li><a href="https://chapmanganato.com/manga-aa951409/chapter-1">Chapter 1</a></li>
               </ul>"#,
        )
        .unwrap();
        let page = Page::parse(&document);

        assert_eq!(Manganato.title(&page).unwrap(), "Solo Leveling");
        let chapters = Manganato.chapter_map(&page).unwrap();
        let raws: Vec<&str> = chapters.iter().map(|(index, _)| index.raw()).collect();
        assert_eq!(raws, vec!["1", "1.5", "2"]);
    }

    #[test]
    fn test_missing_title() {
        let document = HtmlDocument::parse("https://manganato.com/manga-x", "<html></html>").unwrap();
        let error = Manganato.title(&Page::parse(&document)).unwrap_err();
        assert!(matches!(error, DownloadError::MissingTitle { .. }));
    }
}
