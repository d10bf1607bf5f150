pub mod http_scraper;

pub use http_scraper::HttpScraper;
