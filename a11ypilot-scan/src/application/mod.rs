//! Scan use cases

pub mod aggregate;
pub mod crawl;
pub mod scan_page;

pub use aggregate::aggregate;
pub use crawl::{CrawlUseCase, parse_target_url};
pub use scan_page::{ScanPageUseCase, ScanSettings};
