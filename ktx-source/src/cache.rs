//! Load-once cache for the ridership table.
//!
//! The caller owns the cache and passes it into each run. An entry is keyed by
//! the file path, its modification time, the candidate encodings and the
//! negative-count policy; a change in any of them forces a reload. Single-threaded by design, so the
//! table is shared through `Rc`.

use crate::loader::{load_table, FileSource};
use ktx_core::{KtxError, NegativeCountPolicy, Result, Table};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    encodings: Vec<String>,
    policy: NegativeCountPolicy,
}

impl CacheKey {
    fn for_source(source: &FileSource, policy: NegativeCountPolicy) -> Result<Self> {
        let path = source.path();
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => KtxError::FileNotFound(path.to_path_buf()),
            _ => KtxError::Io(e),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            encodings: source.encodings().to_vec(),
            policy,
        })
    }
}

/// Caller-owned cache holding at most one loaded table.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(CacheKey, Rc<Table>)>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `source`, reading the file only when the
    /// path, modification time, encodings or policy differ from the cached
    /// entry.
    pub fn get_or_load(
        &mut self,
        source: &FileSource,
        policy: NegativeCountPolicy,
    ) -> Result<Rc<Table>> {
        let key = CacheKey::for_source(source, policy)?;

        if let Some((cached_key, table)) = &self.entry {
            if *cached_key == key {
                log::debug!("[KTX] cache: hit for {}", key.path.display());
                return Ok(Rc::clone(table));
            }
            log::info!("[KTX] cache: {} changed, reloading", key.path.display());
        }

        let table = Rc::new(load_table(source, policy)?);
        self.loads += 1;
        self.entry = Some((key, Rc::clone(&table)));
        Ok(table)
    }

    /// Drop the cached table; the next call reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of times the file has actually been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    const CSV: &str = "\
period,station,boarding_down,alighting_down,boarding_up,alighting_up
2023-01,A,1,2,3,4
";

    fn write_fixture(name: &str, contents: &str, modified: SystemTime) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ktx-cache-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let path = write_fixture("hit.csv", CSV, t0);
        let source = FileSource::new(&path);
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap();
        let second = cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn modification_time_change_reloads() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let path = write_fixture("mtime.csv", CSV, t0);
        let source = FileSource::new(&path);
        let mut cache = DatasetCache::new();
        cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap();

        let appended = format!("{CSV}2023-02,B,5,6,7,8\n");
        write_fixture("mtime.csv", &appended, t0 + Duration::from_secs(60));
        let table = cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(cache.load_count(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn policy_change_and_invalidate_reload() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let path = write_fixture("policy.csv", CSV, t0);
        let source = FileSource::new(&path);
        let mut cache = DatasetCache::new();

        cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap();
        cache.get_or_load(&source, NegativeCountPolicy::Accept).unwrap();
        assert_eq!(cache.load_count(), 2);

        cache.invalidate();
        assert!(!cache.is_loaded());
        cache.get_or_load(&source, NegativeCountPolicy::Accept).unwrap();
        assert_eq!(cache.load_count(), 3);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn encoding_change_reloads() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let path = write_fixture("encodings.csv", CSV, t0);
        let mut cache = DatasetCache::new();

        let default_chain = FileSource::new(&path);
        cache.get_or_load(&default_chain, NegativeCountPolicy::Warn).unwrap();
        cache.get_or_load(&default_chain, NegativeCountPolicy::Warn).unwrap();
        assert_eq!(cache.load_count(), 1);

        let utf8_only = FileSource::new(&path).with_encodings(vec!["utf-8".to_string()]);
        cache.get_or_load(&utf8_only, NegativeCountPolicy::Warn).unwrap();
        assert_eq!(cache.load_count(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_not_cached() {
        let mut cache = DatasetCache::new();
        let source = FileSource::new(std::env::temp_dir().join("ktx-cache-missing.csv"));
        let err = cache.get_or_load(&source, NegativeCountPolicy::Warn).unwrap_err();
        assert!(matches!(err, KtxError::FileNotFound(_)));
        assert!(!cache.is_loaded());
    }
}
