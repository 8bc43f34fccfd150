use roa_replays::progress::{ProgressConfig, ProgressMode};
use roa_replays::util::list_replays;
use roa_replays::{ManagerConfig, ReplayError, ReplayManager};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_replay(dir: &Path, name: &str, header: &str) {
    fs::create_dir_all(dir).expect("create replay dir");
    fs::write(dir.join(name), format!("{header}\nframes follow")).expect("write replay");
}

fn manager_for(root: &Path, skip_backups: bool) -> ReplayManager {
    ReplayManager::new(ManagerConfig {
        replays_path: root.to_path_buf(),
        destination_root: None,
        game_version: "1.4.0".to_string(),
        skip_folder_creation: false,
        skip_backups,
    })
    .expect("manager")
}

fn quiet() -> ProgressConfig {
    ProgressConfig::new(ProgressMode::Quiet)
}

fn finish_capture(root: &Path, id: &str) {
    fs::write(root.join("frames").join(id).join("0.np"), b"frame").unwrap();
    fs::write(root.join("labels").join(id).join("roa_0.np"), b"label").unwrap();
}

#[test]
fn sort_then_capture_whole_collection() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_replay(root, "match01.roa", "R010400");
    write_replay(root, "match02.roa", "R010500");
    write_replay(root, "match03.roa", "R010400");

    let sorter = manager_for(root, true);
    let summary = sorter.make_collections(quiet()).expect("sort");
    assert_eq!(summary.moved, 3);
    assert_eq!(summary.per_version["01_04_00"], 2);
    assert!(root.join("01_04_00/match01.roa").is_file());
    assert!(root.join("01_05_00/match02.roa").is_file());
    assert!(list_replays(root).unwrap().is_empty());
    assert_eq!(sorter.make_collections(quiet()).unwrap().moved, 0);

    let mut manager = manager_for(root, false);
    assert_eq!(manager.load_collection(None).unwrap(), "01_04_00");

    let mut seen = Vec::new();
    loop {
        match manager.load_next_replay(false) {
            Ok(record) => {
                assert_eq!(list_replays(root).unwrap().len(), 1);
                finish_capture(root, record.id());
                seen.push(record.id().to_string());
            }
            Err(err) if err.is_exhausted() => break,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(seen, vec!["match01.roa", "match03.roa"]);

    // restart: everything is collected, nothing to offer
    manager.load_collection(None).unwrap();
    let collection = manager.collection().unwrap();
    assert_eq!(collection.count(), 2);
    assert_eq!(collection.count_unvisited(), 0);
}

#[test]
fn flush_before_rotate_leaves_a_single_live_file() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_replay(&root.join("01_04_00"), "next.roa", "R010400");
    for i in 0..4 {
        write_replay(root, &format!("old{i}.roa"), "R010300");
    }

    let mut manager = manager_for(root, true);
    manager.load_collection(None).unwrap();
    manager.load_next_replay(false).unwrap();

    let live = list_replays(root).unwrap();
    assert_eq!(live, vec![root.join("next.roa")]);
}

#[test]
fn offered_replays_stay_out_until_reset() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_replay(&root.join("01_04_00"), "a.roa", "R010400");
    write_replay(&root.join("01_04_00"), "b.roa", "R010400");

    let mut manager = manager_for(root, true);
    manager.load_collection(None).unwrap();
    let a = manager.load_next_replay(false).unwrap();
    assert!(manager.collection().unwrap().is_offered("a.roa"));
    let b = manager.load_next_replay(false).unwrap();
    assert_ne!(a, b);
    assert!(matches!(
        manager.load_next_replay(false),
        Err(ReplayError::NoUnvisitedReplays { .. })
    ));

    // only b finished; a's capture was abandoned
    finish_capture(root, b.id());
    assert_eq!(manager.reset_collection().unwrap(), 1);
    assert!(!manager.collection().unwrap().is_offered("a.roa"));
    assert_eq!(manager.load_next_replay(false).unwrap(), a);
}

#[test]
fn grouping_reads_headers_without_moving() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_replay(root, "x.roa", "R011000");
    write_replay(root, "y.roa", "R010400");
    write_replay(root, "z.roa", "R011000");

    let manager = manager_for(root, true);
    let grouped = manager.collections_by_version().unwrap();
    let ids: Vec<&str> = grouped["01_10_00"].iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["x.roa", "z.roa"]);
    assert_eq!(grouped["01_04_00"].len(), 1);
    assert_eq!(list_replays(root).unwrap().len(), 3);
}
