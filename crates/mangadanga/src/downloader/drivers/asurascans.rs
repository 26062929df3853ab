//! Driver for Asura Scans

use async_trait::async_trait;

use super::{Page, PageFetcher, SiteDriver, archive_filename, collect_chapter_map, raw_index_by_separators};
use crate::downloader::core::{ChapterIndex, ChapterMap, DownloadError, HtmlDocument, Result, ScrapeStep};

const BASE_URL: &str = "https://asura.gg/";
const DOMAINS: &[&str] = &["www.asurascans.com", "asura.gg"];
const SEPARATORS: &[&str] = &["chapter", "-"];
const TITLE: &str = ".entry-title";

#[derive(Debug, Clone, Copy, Default)]
pub struct Asurascans;

#[async_trait]
impl SiteDriver for Asurascans {
    fn name(&self) -> &str {
        "Asura Scans"
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
        collect_chapter_map(self, series, ".eplister")
    }

    // Chapter pages reuse the series heading class for the chapter name
    fn chapter_filename(&self, index: &ChapterIndex, chapter: &Page<'_>) -> Result<String> {
        let title = chapter.text_of(TITLE, ScrapeStep::ChapterTitle)?;
        Ok(archive_filename(index, &title))
    }

    async fn page_image_urls(&self, chapter: &HtmlDocument, _fetcher: &PageFetcher) -> Result<Vec<String>> {
        Page::parse(chapter).attr_urls(".rdminimal img", "src", ScrapeStep::PageImages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_index_from_slug_link() {
        assert_eq!(
            Asurascans.raw_index_from("https://asura.gg/solo-leveling-chapter-10/").unwrap(),
            "10"
        );
    }

    #[test]
    fn test_chapter_filename_uses_entry_title() {
        let document = HtmlDocument::parse(
            "https://asura.gg/solo-leveling-chapter-10/",
            r#"<h1 class="entry-title">Solo Leveling Chapter 10</h1>"#,
        )
        .unwrap();
        let index = ChapterIndex::parse("10").unwrap();
        let filename = Asurascans.chapter_filename(&index, &Page::parse(&document)).unwrap();
        assert!(filename.starts_with("10_Solo_Leveling_Chapter_10"));
        assert!(filename.ends_with(".zip"));
    }
}
