//! Explicit table cache.
//!
//! Owned by the caller and passed into the pipeline, never a process-wide
//! global. The cache fingerprints the known table files (size + mtime) and
//! reloads only when the fingerprint changes, so repeated narrative runs over
//! an unchanged data directory skip the CSV parse.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::AppError;
use crate::io::tables::{
    self, DAILY_USAGE_FILE, KPI_FILE, LoadedTables, NEW_USERS_FILE, OBSERVATION_FILE,
    PEAK_48H_FILE, PEAK_7D_FILE, RELEASE_FILE,
};

const TABLE_FILES: [&str; 7] = [
    KPI_FILE,
    PEAK_7D_FILE,
    PEAK_48H_FILE,
    DAILY_USAGE_FILE,
    NEW_USERS_FILE,
    OBSERVATION_FILE,
    RELEASE_FILE,
];

/// One file's identity for invalidation: absent, or (size, mtime).
type FileStamp = Option<(u64, SystemTime)>;

#[derive(Debug)]
struct CacheState {
    dir: PathBuf,
    fingerprint: Vec<FileStamp>,
    loaded: LoadedTables,
}

/// Caches the loaded tables of one data directory.
#[derive(Debug, Default)]
pub struct TableCache {
    state: Option<CacheState>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `dir`, reusing the cached tables when no source file changed.
    pub fn load(&mut self, dir: &Path) -> Result<&LoadedTables, AppError> {
        let fingerprint = fingerprint(dir);
        let fresh = matches!(
            &self.state,
            Some(s) if s.dir.as_path() == dir && s.fingerprint == fingerprint
        );

        if !fresh {
            let loaded = tables::load_dir(dir)?;
            self.state = Some(CacheState {
                dir: dir.to_path_buf(),
                fingerprint,
                loaded,
            });
        }

        match &self.state {
            Some(state) => Ok(&state.loaded),
            None => Err(AppError::internal("Table cache in an impossible state.")),
        }
    }
}

/// Stamp every known table file. Unreadable metadata counts as absent; the
/// actual load will surface a proper error if the file truly is unreadable.
fn fingerprint(dir: &Path) -> Vec<FileStamp> {
    TABLE_FILES
        .iter()
        .map(|name| {
            let meta = std::fs::metadata(dir.join(name)).ok()?;
            let mtime = meta.modified().ok()?;
            Some((meta.len(), mtime))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock::{generate_mock_tables, write_mock_csvs};
    use std::fs::OpenOptions;
    use std::io::Write;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "insight-cache-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn reload_happens_when_a_source_file_changes() {
        let dir = scratch_dir("reload");
        let tables = generate_mock_tables(42).unwrap();
        write_mock_csvs(&dir, &tables).unwrap();

        let mut cache = TableCache::new();
        let before = cache.load(&dir).unwrap().tables.kpi.len();
        assert_eq!(before, 2);

        // Append a KPI row; the size change invalidates the fingerprint.
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.join(KPI_FILE))
            .unwrap();
        writeln!(file, "tennis,total_users,5").unwrap();
        drop(file);

        let after = cache.load(&dir).unwrap().tables.kpi.len();
        assert_eq!(after, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unchanged_directory_is_served_from_cache() {
        let dir = scratch_dir("fresh");
        let tables = generate_mock_tables(42).unwrap();
        write_mock_csvs(&dir, &tables).unwrap();

        let fp_a = fingerprint(&dir);
        let fp_b = fingerprint(&dir);
        assert_eq!(fp_a, fp_b);

        let mut cache = TableCache::new();
        let a = cache.load(&dir).unwrap().rows_read;
        let b = cache.load(&dir).unwrap().rows_read;
        assert_eq!(a, b);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
