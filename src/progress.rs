//! Progress-callback trait for per-page and per-region extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events while the pipeline scans pages and reads regions. The pipeline is
//! sequential, so events arrive in order, but the trait is `Send + Sync` so
//! one callback can be shared by runs on different threads.
//!
//! # Example
//!
//! ```rust
//! use pdf_highlights::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     regions: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_region_extracted(&self, index: usize, total: usize, paragraphs: usize) {
//!         self.regions.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Region {}/{}: {} paragraphs", index, total, paragraphs);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { regions: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as it progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page and region numbers are 1-indexed here, since
/// they are meant for display.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before detection starts.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be scanned
    fn on_detection_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page has been scanned without error.
    ///
    /// When the annotation pass finds nothing and the color fallback runs,
    /// each page is reported once per pass.
    ///
    /// # Arguments
    /// * `page_num` — 1-indexed page number
    /// * `regions`  — regions found on the page by the active strategy
    fn on_page_scanned(&self, page_num: usize, regions: usize) {
        let _ = (page_num, regions);
    }

    /// Called when a page is skipped because it failed.
    fn on_page_error(&self, page_num: usize, error: &str) {
        let _ = (page_num, error);
    }

    /// Called once the region set is final and sorted.
    fn on_regions_detected(&self, total_regions: usize) {
        let _ = total_regions;
    }

    /// Called after each region's text has been extracted and assembled.
    ///
    /// # Arguments
    /// * `index`      — 1-indexed position in reading order
    /// * `total`      — number of regions
    /// * `paragraphs` — paragraphs the region contributed (0 on failure)
    fn on_region_extracted(&self, index: usize, total: usize, paragraphs: usize) {
        let _ = (index, total, paragraphs);
    }

    /// Called once after rendering.
    ///
    /// # Arguments
    /// * `regions`    — regions processed
    /// * `paragraphs` — paragraphs rendered
    fn on_extraction_complete(&self, regions: usize, paragraphs: usize) {
        let _ = (regions, paragraphs);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
