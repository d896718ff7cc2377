//! Walk cache behavior through the table fetcher.

mod common;

use std::sync::Arc;

use common::{CountingBackend, IF_TABLE, router1, text};
use snmp_table::{
    CacheMode, Column, FileWalkCache, HostConfig, IndexKind, TableDescriptor, TableFetcher,
    WalkCache, oid,
};
use tempfile::TempDir;

/// ifIndex uncached, ifDescr cached.
fn descriptor() -> TableDescriptor {
    TableDescriptor::new(
        IF_TABLE,
        [
            Column::oid("1"),
            Column::oid("2").cached(),
            Column::index(IndexKind::End),
        ],
    )
}

#[tokio::test]
async fn refresh_writes_but_never_reads() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileWalkCache::new(dir.path()));
    let backend = CountingBackend::new(router1(HostConfig::new("router1")).await);
    let fetcher = TableFetcher::builder(backend.clone())
        .walk_cache(cache.clone())
        .build();

    fetcher.fetch_table(None, &descriptor()).await.unwrap();
    fetcher.fetch_table(None, &descriptor()).await.unwrap();

    assert_eq!(backend.walks(), 4);
    let if_descr = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2);
    assert!(cache.entry_path("router1", &if_descr).is_file());
    // uncached columns leave no entry
    assert!(!cache.entry_path("router1", &oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1)).exists());
}

#[tokio::test]
async fn reuse_serves_cached_column() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileWalkCache::new(dir.path()));
    let if_descr = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2);
    cache
        .write(
            "router1",
            &if_descr,
            &[snmp_table::Row::new(if_descr.child(1), "cached-lo")],
        )
        .unwrap();

    let backend = CountingBackend::new(router1(HostConfig::new("router1")).await);
    let fetcher = TableFetcher::builder(backend.clone())
        .walk_cache(cache)
        .cache_mode(CacheMode::Reuse)
        .build();
    let table = fetcher.fetch_table(None, &descriptor()).await.unwrap();

    assert_eq!(backend.walks(), 1);
    assert_eq!(
        text(&table),
        vec![vec!["1", "cached-lo", "1"], vec!["2", "", "2"]]
    );
}

#[tokio::test]
async fn reuse_misses_then_fills() {
    let dir = TempDir::new().unwrap();
    let backend = CountingBackend::new(router1(HostConfig::new("router1")).await);
    let fetcher = TableFetcher::builder(backend.clone())
        .walk_cache(Arc::new(FileWalkCache::new(dir.path())))
        .cache_mode(CacheMode::Reuse)
        .build();

    let first = fetcher.fetch_table(None, &descriptor()).await.unwrap();
    let second = fetcher.fetch_table(None, &descriptor()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.walks(), 3);
}

#[tokio::test]
async fn corrupt_entry_falls_back_to_walk() {
    let dir = TempDir::new().unwrap();
    let cache = FileWalkCache::new(dir.path());
    let path = cache.entry_path("router1", &oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"garbage").unwrap();

    let backend = CountingBackend::new(router1(HostConfig::new("router1")).await);
    let fetcher = TableFetcher::builder(backend.clone())
        .walk_cache(Arc::new(cache))
        .cache_mode(CacheMode::Reuse)
        .build();
    let table = fetcher.fetch_table(None, &descriptor()).await.unwrap();

    assert_eq!(backend.walks(), 2);
    assert_eq!(text(&table)[1], ["2", "eth0", "2"]);
    // rewritten with the fresh walk
    assert!(std::fs::read_to_string(&path).unwrap().starts_with('{'));
}

#[tokio::test]
async fn unwritable_cache_does_not_fail_fetch() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("not-a-directory");
    std::fs::write(&root, b"").unwrap();

    let fetcher = TableFetcher::builder(router1(HostConfig::new("router1")).await)
        .walk_cache(Arc::new(FileWalkCache::new(root)))
        .build();
    let table = fetcher.fetch_table(None, &descriptor()).await.unwrap();

    assert_eq!(table.len(), 2);
}
