//! Variant downloads from the archive.
//!
//! This module provides:
//! - Single-file streaming downloads (`http`)
//! - Plain and progress-reporting transports (`strategy`)
//! - Progress reporting hooks for UIs (`progress`)
//! - The `VariantFetcher` seam used when obtaining a variant (`fetcher`)
//!
//! # Architecture
//!
//! ```text
//! RemoteFetcher (implements VariantFetcher)
//!         │
//!         ├── DownloadStrategy (trait)
//!         │       ├── SimpleStrategy
//!         │       └── ProgressStrategy ──► ProgressSink
//!         │
//!         └── HttpDownloader (authenticated single-file GET)
//! ```

mod error;
mod fetcher;
mod http;
mod progress;
mod strategy;

pub use error::{DownloadError, DownloadResult};
pub use fetcher::{RemoteFetcher, Transport, VariantFetcher};
pub use http::HttpDownloader;
pub use progress::{NoProgress, ProgressCallback, ProgressHandle, ProgressSink};
pub use strategy::{DownloadStrategy, ProgressStrategy, SimpleStrategy};
