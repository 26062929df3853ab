//! Driver for www.mngdoom.com

use async_trait::async_trait;

use super::{Page, PageFetcher, SiteDriver, archive_filename, collect_chapter_map, last_path_segment};
use crate::downloader::core::{ChapterIndex, ChapterMap, DownloadError, HtmlDocument, Result, ScrapeStep};

const BASE_URL: &str = "https://www.mngdoom.com/";
const DOMAINS: &[&str] = &["www.mngdoom.com"];
const TITLE: &str = ".widget-heading";

/// Chapter links end in the bare chapter number (`/one-piece/1000`); pages
/// are listed as absolute URLs in a drop-down on the chapter page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mangadoom;

#[async_trait]
impl SiteDriver for Mangadoom {
    fn name(&self) -> &str {
        "Mangadoom"
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
        let segment = last_path_segment(href);
        if segment.is_empty() {
            return Err(DownloadError::scrape(ScrapeStep::ChapterIndex, href, "link has no path"));
        }
        Ok(segment.to_string())
    }

    fn chapter_map(&self, series: &Page<'_>) -> Result<ChapterMap> {
        collect_chapter_map(self, series, ".chapter-list")
    }

    fn chapter_filename(&self, index: &ChapterIndex, chapter: &Page<'_>) -> Result<String> {
        let title = chapter.text_of(".col-md-8.col-xs-12", ScrapeStep::ChapterTitle)?;
        Ok(archive_filename(index, &title))
    }

    async fn page_image_urls(&self, chapter: &HtmlDocument, fetcher: &PageFetcher) -> Result<Vec<String>> {
        let reader_urls = {
            let page = Page::parse(chapter);
            page.select_in_first(".selectPage.pull-right.chapter-page1", "option", ScrapeStep::PageSelector)?
                .into_iter()
                .map(|option| {
                    let value = option.value().attr("value").ok_or_else(|| {
                        DownloadError::scrape(ScrapeStep::PageSelector, page.url(), "page option without a value")
                    })?;
                    page.resolve(value)
                })
                .collect::<Result<Vec<_>>>()?
        };

        let readers = fetcher.fetch_documents(&reader_urls).await?;
        readers
            .iter()
            .map(|reader| {
                let page = Page::parse(reader);
                let src = page
                    .select_first(".img-responsive", ScrapeStep::PageImages)?
                    .and_then(|img| img.value().attr("src"))
                    .ok_or_else(|| page.missing(".img-responsive", ScrapeStep::PageImages))?;
                page.resolve(src)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_index_is_whole_segment() {
        assert_eq!(Mangadoom.raw_index_from("https://www.mngdoom.com/one-piece/1000").unwrap(), "1000");
        assert_eq!(Mangadoom.raw_index_from("https://www.mngdoom.com/one-piece/1000/").unwrap(), "1000");
    }

    #[test]
    fn test_chapter_filename_trims_title() {
        let document = HtmlDocument::parse(
            "https://www.mngdoom.com/one-piece/1000",
            r#"<div class="col-md-8 col-xs-12">
                 One Piece 1000
               </div>"#,
        )
        .unwrap();
        let index = ChapterIndex::parse("1000").unwrap();
        let filename = Mangadoom.chapter_filename(&index, &Page::parse(&document)).unwrap();
        assert_eq!(filename, "1000_One_Piece_1000.zip");
    }
}
