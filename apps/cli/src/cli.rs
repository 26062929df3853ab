use std::path::PathBuf;

use clap::Parser;
use mangadanga::SelectionConfig;

/// Download manga chapters into zip archives
#[derive(Debug, Parser)]
#[command(name = "mangadanga", author, version, about)]
pub struct Cli {
    /// Series page URL (must be http/https).
    pub url: String,

    /// Base directory; a directory named after the series is created inside it.
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Maximum chapters downloaded at the same time.
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Maximum page requests in flight within one chapter.
    #[arg(long, default_value_t = 4)]
    pub page_concurrency: usize,

    /// Download only these chapters.
    #[arg(short = 'c', long = "chapters", num_args = 1.., value_name = "CHAPTER")]
    pub chapters: Option<Vec<String>>,

    /// Download chapters between LOWER and UPPER, both included.
    #[arg(
        short = 'r',
        long = "chapter-range",
        num_args = 2,
        value_names = ["LOWER", "UPPER"],
        conflicts_with = "chapters"
    )]
    pub chapter_range: Option<Vec<String>>,

    /// Extra attempts for failed requests (server errors and timeouts).
    #[arg(long, default_value_t = 0)]
    pub retries: usize,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print state changes and debug logs.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn selection(&self) -> SelectionConfig {
        match (&self.chapters, &self.chapter_range) {
            (Some(chapters), _) => SelectionConfig::list(chapters.iter().cloned()),
            (None, Some(range)) => SelectionConfig {
                strategy: "range".to_string(),
                params: range.clone(),
            },
            (None, None) => SelectionConfig::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mangadanga", "https://manganato.com/manga-x"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.threads, 1);
        assert_eq!(cli.page_concurrency, 4);
        assert_eq!(cli.selection(), SelectionConfig::all());
    }

    #[test]
    fn test_chapter_list() {
        let cli = Cli::try_parse_from(["mangadanga", "https://manganato.com/manga-x", "-c", "1", "2", "5"]).unwrap();
        assert_eq!(cli.selection(), SelectionConfig::list(["1", "2", "5"]));
    }

    #[test]
    fn test_chapter_range() {
        let cli = Cli::try_parse_from(["mangadanga", "https://manganato.com/manga-x", "-r", "3", "7", "-t", "4"]).unwrap();
        assert_eq!(cli.selection(), SelectionConfig::range("3", "7"));
        assert_eq!(cli.threads, 4);
    }

    #[test]
    fn test_list_and_range_conflict() {
        let result = Cli::try_parse_from([
            "mangadanga",
            "https://manganato.com/manga-x",
            "-c",
            "1",
            "-r",
            "1",
            "2",
        ]);
        assert!(result.is_err());
    }
}
