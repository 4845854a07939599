//! Data source for the ridership pipeline.
//!
//! Turns a file on disk into a validated [`ktx_core::Table`]:
//!
//! 1. read the bytes (`FileNotFound` if absent)
//! 2. gunzip if the bytes carry the gzip magic number
//! 3. decode through an ordered chain of legacy encodings
//! 4. parse the delimited text into a [`ktx_core::RawTable`]
//! 5. validate into typed records
//!
//! # Usage
//!
//! ```no_run
//! use ktx_core::NegativeCountPolicy;
//! use ktx_source::{DatasetCache, FileSource};
//!
//! let source = FileSource::new("ktx.csv");
//! let mut cache = DatasetCache::new();
//! let table = cache.get_or_load(&source, NegativeCountPolicy::Warn)?;
//! // Same file, same modification time: no second read.
//! let again = cache.get_or_load(&source, NegativeCountPolicy::Warn)?;
//! assert_eq!(cache.load_count(), 1);
//! # Ok::<(), ktx_core::KtxError>(())
//! ```

pub mod cache;
pub mod compression;
pub mod encoding;
mod loader;

pub use cache::DatasetCache;
pub use loader::{load_table, parse_csv, DataSource, FileSource};
