//! Photo folder catalog and image retrieval for a NAS share.
//!
//! - [`catalog`]: depth-bounded crawl of the folders below a base folder,
//!   counting the images in each, cached as snapshots.
//! - [`retrieve`]: stage the images of one folder locally, annotated with
//!   their capture time.

pub mod catalog;
pub mod filter;
pub mod metadata;
pub mod retrieve;

pub use crate::catalog::{Catalog, CrawlOptions, FolderListing, ListingSource};
pub use crate::retrieve::{ImageRecord, RetrieveOptions, Retrieval, Retriever, Staging};
pub use gallery_cache::FolderDescriptor;
