mod common;

use gallery_cache::{JsonFileStore, MemoryStore, SnapshotKey, SnapshotStore};
use gallery_catalog::catalog::error::ErrorKind;
use gallery_catalog::{Catalog, CrawlOptions, FolderDescriptor, ListingSource};
use gallery_share::{Fault, MockShare, MountedShare};
use rstest::rstest;
use std::path::PathBuf;
use std::sync::Arc;

fn options(concurrency: usize) -> CrawlOptions {
    CrawlOptions { base_folder: PathBuf::from("PHOTO"), concurrency, ..CrawlOptions::default() }
}

fn folders(expected: &[(&str, u64)]) -> Vec<FolderDescriptor> {
    expected.iter().map(|(path, count)| FolderDescriptor::new(*path, *count)).collect()
}

#[tokio::test]
async fn test_photo_scenario() {
    let catalog = Catalog::new(common::scenario(), Arc::new(MemoryStore::new()), options(4));
    let listing = catalog.list_folders("", 0).await.unwrap();
    assert_eq!(listing.folders, folders(&[("2023", 2)]));
}

#[rstest]
#[case(0, &[("2024", 0), ("2023", 1)])]
#[case(1, &[("2024", 0), ("2024/spring", 1), ("2023", 1), ("2023/winter", 1)])]
#[case(2, &[("2024", 0), ("2024/spring", 1), ("2024/spring/day1", 1), ("2023", 1), ("2023/winter", 1)])]
#[case(3, &[
    ("2024", 0),
    ("2024/spring", 1),
    ("2024/spring/day1", 1),
    ("2024/spring/day1/raw", 1),
    ("2023", 1),
    ("2023/winter", 1),
])]
#[tokio::test]
async fn test_depth_bound_and_pre_order(#[case] max_depth: u32, #[case] expected: &[(&str, u64)]) {
    let share = Arc::new(common::deep_tree());
    let catalog = Catalog::new(share.clone(), Arc::new(MemoryStore::new()), options(4));
    let listing = catalog.list_folders("", max_depth).await.unwrap();
    assert_eq!(listing.folders, folders(expected));
    // Immediate subfolders sit at depth zero.
    let max_levels = max_depth as usize + 1;
    assert!(listing.folders.iter().all(|folder| folder.path.split('/').count() <= max_levels));
}

#[tokio::test]
async fn test_hidden_folders_and_descendants_are_excluded() {
    let share = Arc::new(common::deep_tree());
    let catalog = Catalog::new(share.clone(), Arc::new(MemoryStore::new()), options(4));
    let listing = catalog.list_folders("", 10).await.unwrap();
    assert!(listing.folders.iter().all(|folder| !folder.path.split('/').any(|segment| segment.starts_with('.'))));
    // Hidden folders are never even listed.
    assert!(share.listed().iter().all(|path| !path.to_string_lossy().contains("/.")));
}

#[tokio::test]
async fn test_image_count() {
    let share = Arc::new(MockShare::with_files([
        ("PHOTO/x/a.jpg", b"a".to_vec()),
        ("PHOTO/x/b.JPEG", b"b".to_vec()),
        ("PHOTO/x/c.txt", b"c".to_vec()),
        ("PHOTO/x/._d.png", b"d".to_vec()),
    ]));
    let catalog = Catalog::new(share, Arc::new(MemoryStore::new()), options(1));
    assert_eq!(catalog.list_folders("", 0).await.unwrap().folders, folders(&[("x", 2)]));
}

#[tokio::test]
async fn test_cache_idempotence() {
    let temp_dir = tempfile::tempdir().unwrap();
    let share = Arc::new(common::deep_tree());
    let store = Arc::new(JsonFileStore::new(temp_dir.path()));
    let catalog = Catalog::new(share.clone(), store.clone(), options(4));

    let first = catalog.list_folders("", 2).await.unwrap();
    assert_eq!(first.source, ListingSource::Crawled);
    let stored = store.get(&SnapshotKey::new("", 2)).await.unwrap().unwrap();
    let lists = share.stats().lists;

    let second = catalog.list_folders("", 2).await.unwrap();
    assert_eq!(second.source, ListingSource::Cached);
    assert_eq!(serde_json::to_vec(&second.folders).unwrap(), serde_json::to_vec(&first.folders).unwrap());
    assert_eq!(second.folders, stored.folders);
    assert_eq!(share.stats().lists, lists);
    assert_eq!(share.stats().connects, 1);
}

#[tokio::test]
async fn test_every_folder_is_listed_once() {
    let share = Arc::new(common::deep_tree());
    let catalog = Catalog::new(share.clone(), Arc::new(MemoryStore::new()), options(4));
    let listing = catalog.list_folders("", 3).await.unwrap();
    let listed = share.listed();
    // The base folder, then every catalogued folder exactly once.
    assert_eq!(listed.len(), 1 + listing.folders.len());
    let mut unique = listed.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), listed.len());
}

#[rstest]
#[case::success(None)]
#[case::listing_error(Some(Fault::Io))]
#[case::disconnect(Some(Fault::Disconnect))]
#[tokio::test]
async fn test_session_is_always_closed(#[case] fault: Option<Fault>) {
    let mut share = common::deep_tree();
    if let Some(fault) = fault {
        share = share.fail_list("PHOTO", fault);
    }
    let share = Arc::new(share);
    let catalog = Catalog::new(share.clone(), Arc::new(MemoryStore::new()), options(4));
    let _ = catalog.list_folders("", 1).await;
    let stats = share.stats();
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.closes, 1);
}

#[tokio::test]
async fn test_degraded_crawl_is_returned_but_not_cached() {
    let share = Arc::new(common::deep_tree().fail_list("PHOTO/2024/spring", Fault::Io));
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::new(share, store.clone(), options(4));
    let listing = catalog.list_folders("", 3).await.unwrap();
    assert_eq!(listing.source, ListingSource::Degraded);
    assert_eq!(listing.folders, folders(&[("2024", 0), ("2023", 1), ("2023/winter", 1)]));
    assert!(store.is_empty());
    assert_eq!(store.puts(), 0);
}

#[tokio::test]
async fn test_base_listing_failure_is_fatal() {
    let share = Arc::new(common::deep_tree().fail_list("PHOTO", Fault::Io));
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::new(share, store.clone(), options(4));
    let err = catalog.list_folders("", 0).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Listing(path) if path == &PathBuf::from("PHOTO")));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_timeout_is_a_connectivity_failure() {
    let share = Arc::new(common::deep_tree().fail_list("PHOTO/2023", Fault::Stall(std::time::Duration::from_secs(60))));
    let timeout = Arc::new(gallery_share::TimeoutShare::new(share.clone(), std::time::Duration::from_secs(1)));
    let catalog = Catalog::new(timeout, Arc::new(MemoryStore::new()), options(4));
    tokio::time::pause();
    let err = catalog.list_folders("", 0).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Connectivity));
    assert_eq!(share.stats().closes, 1);
}

#[tokio::test]
async fn test_unreachable_share_is_a_connectivity_failure() {
    let share = Arc::new(MockShare::default().fail_connect());
    let catalog = Catalog::new(share, Arc::new(MemoryStore::new()), options(4));
    let err = catalog.list_folders("", 0).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Connectivity));
}

#[tokio::test]
async fn test_concurrency_does_not_change_the_result() {
    let sequential = Catalog::new(Arc::new(common::deep_tree()), Arc::new(MemoryStore::new()), options(1));
    let concurrent = Catalog::new(Arc::new(common::deep_tree()), Arc::new(MemoryStore::new()), options(8));
    for depth in 0..4 {
        assert_eq!(
            sequential.list_folders("", depth).await.unwrap().folders,
            concurrent.list_folders("", depth).await.unwrap().folders,
        );
    }
}

#[tokio::test]
async fn test_cache_is_keyed_by_query() {
    let share = Arc::new(common::deep_tree());
    let catalog = Catalog::new(share.clone(), Arc::new(MemoryStore::new()), options(4));
    let shallow = catalog.list_folders("", 0).await.unwrap();
    let deep = catalog.list_folders("", 1).await.unwrap();
    assert_eq!(deep.source, ListingSource::Crawled);
    assert_ne!(shallow.folders, deep.folders);
    let nested = catalog.list_folders("2024", 0).await.unwrap();
    assert_eq!(nested.source, ListingSource::Crawled);
    assert_eq!(nested.folders, folders(&[("2024/spring", 1)]));
    assert_eq!(catalog.list_folders("/2024/", 0).await.unwrap().source, ListingSource::Cached);
    assert_eq!(share.stats().connects, 3);
}

#[tokio::test]
async fn test_mounted_share_end_to_end() {
    let share_dir = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    let root = share_dir.path();
    std::fs::create_dir_all(root.join("PHOTO/2023/.trash")).unwrap();
    std::fs::create_dir_all(root.join("PHOTO/2024/summer")).unwrap();
    std::fs::write(root.join("PHOTO/2023/a.jpg"), b"a").unwrap();
    std::fs::write(root.join("PHOTO/2023/b.png"), b"b").unwrap();
    std::fs::write(root.join("PHOTO/2023/.trash/x.jpg"), b"x").unwrap();
    std::fs::write(root.join("PHOTO/2024/summer/c.jpg"), b"c").unwrap();
    std::fs::write(root.join("PHOTO/notes.txt"), b"n").unwrap();

    let share = Arc::new(MountedShare::new("nas", root).unwrap());
    let store = Arc::new(JsonFileStore::new(cache_dir.path()));
    let catalog = Catalog::new(share, store, options(4));
    let listing = catalog.list_folders("", 1).await.unwrap();
    // Mounted shares list in name order.
    assert_eq!(listing.folders, folders(&[("2023", 2), ("2024", 0), ("2024/summer", 1)]));

    // Changes on the share are invisible until the snapshot is refreshed.
    std::fs::write(root.join("PHOTO/2024/d.jpg"), b"d").unwrap();
    assert_eq!(catalog.list_folders("", 1).await.unwrap().folders, listing.folders);
    let refreshed = catalog.refresh_folders("", 1).await.unwrap();
    assert_eq!(refreshed.folders, folders(&[("2023", 2), ("2024", 1), ("2024/summer", 1)]));
}
