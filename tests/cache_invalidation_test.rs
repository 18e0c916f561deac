//! Cache invalidation integration tests
//!
//! These tests verify that modification-time tracking on a real corpus file drives reloads,
//! and that the configuration layer wires a file-backed cache correctly.

mod common;

use common::{full_corpus, init_logging, section, write_corpus};
use filetime::{set_file_mtime, FileTime};
use oracle_core::{
    cache::CorpusCache,
    config::OracleConfig,
    source::{CorpusSource, FileSource, SourceVersion},
};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Rewrite the corpus and move its mtime forward so the change is visible even on filesystems
/// with coarse timestamps.
fn rewrite(path: &std::path::Path, content: &str, offset_secs: u64) {
    std::fs::write(path, content).unwrap();
    let mtime = SystemTime::now() + Duration::from_secs(offset_secs);
    set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}

#[test]
fn test_mtime_tracking() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = write_corpus(&temp_dir, &full_corpus("initial"));
    let source = FileSource::new(&path);

    let version = source.version().unwrap();
    let expected = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert_eq!(version, SourceVersion::Modified(expected));

    let cache = CorpusCache::from_source(source);
    assert!(cache.prime());
    assert_eq!(cache.stats().source_version, Some(version));
}

#[test]
fn test_reload_on_mtime_change() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = write_corpus(&temp_dir, &full_corpus("initial"));
    let cache = CorpusCache::from_source(FileSource::new(&path));

    assert_eq!(
        cache.get_hexagram(12).unwrap().description,
        "initial description of 12."
    );
    cache.get_hexagram(12);
    assert_eq!(cache.stats().parse_count, 1);

    rewrite(&path, &full_corpus("edited"), 10);
    assert_eq!(
        cache.get_hexagram(12).unwrap().description,
        "edited description of 12."
    );
    cache.get_all_hexagrams();
    assert_eq!(cache.stats().parse_count, 2);
}

#[test]
fn test_touch_without_edit_reparses() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_corpus(&temp_dir, &full_corpus("initial"));
    let cache = CorpusCache::from_source(FileSource::new(&path));
    cache.get_hexagram(1);

    let later = SystemTime::now() + Duration::from_secs(60);
    set_file_mtime(&path, FileTime::from_system_time(later)).unwrap();
    cache.get_hexagram(1);

    assert_eq!(cache.stats().parse_count, 2);
    assert_eq!(cache.get_all_hexagrams().len(), 64);
}

#[test]
fn test_deleted_file_serves_previous_snapshot() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = write_corpus(&temp_dir, &full_corpus("initial"));
    let cache = CorpusCache::from_source(FileSource::new(&path));
    assert!(cache.prime());

    std::fs::remove_file(&path).unwrap();
    assert_eq!(
        cache.get_hexagram(33).unwrap().description,
        "initial description of 33."
    );
    assert!(cache.stats().failed_reloads >= 1);

    rewrite(&path, &section(33, "Tun / Retreat", "returned"), 10);
    assert_eq!(
        cache.get_hexagram(33).unwrap().description,
        "returned description of 33."
    );
    assert_eq!(cache.get_all_hexagrams().len(), 1);
}

#[test]
fn test_missing_file_yields_no_data() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CorpusCache::from_source(FileSource::new(temp_dir.path().join("absent.md")));
    assert!(!cache.prime());
    assert!(cache.get_hexagram(1).is_none());
    assert!(cache.get_symbol_map().is_empty());
    assert_eq!(cache.stats().parse_count, 0);
}

#[test]
fn test_config_builds_file_backed_cache() {
    let temp_dir = TempDir::new().unwrap();
    write_corpus(&temp_dir, &section(8, "Pi / Holding Together [Union]", "config"));
    let config_path = temp_dir.path().join("oracle.toml");
    std::fs::write(
        &config_path,
        "[corpus]\npath = \"I-Ching-texts.md\"\n\n[log]\nfilter = \"oracle_core=debug\"\n",
    )
    .unwrap();

    let config = OracleConfig::from_path(&config_path).unwrap();
    assert_eq!(config.log.filter, "oracle_core=debug");
    assert_eq!(config.corpus_path(), temp_dir.path().join("I-Ching-texts.md"));

    let cache = config.build_cache();
    let record = cache.get_hexagram(8).unwrap();
    assert_eq!(record.url_name(), "holding_together");
    assert_eq!(record.symbol_glyph, '䷇');
}
