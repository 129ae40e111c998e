use filetime::{FileTime, set_file_mtime};
use foldersync_compare::TreeComparator;
use foldersync_core::{Classification, Entry, EntryKind, NullObserver};
use foldersync_sync::{
    ErrorPolicy, Reconciler, Scheduler, SchedulerState, SyncConfig, SyncError, SyncEvent, SyncObserver,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Observer that keeps everything it is told.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<SyncEvent>>,
    errors: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }

    fn mutations(&self) -> usize {
        self.events().iter().filter(|e| e.is_mutation()).count()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl SyncObserver for Recorder {
    fn on_event(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_error(&self, error: &SyncError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

fn reconciler(recorder: &Arc<Recorder>) -> Reconciler {
    Reconciler::new(TreeComparator::new(), recorder.clone())
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

fn mtime(path: impl AsRef<Path>) -> std::time::SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

#[test]
fn test_scenario_update_remove_and_copy() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    fs::write(src.path().join("f1.txt"), "hello").unwrap();
    fs::create_dir(src.path().join("sub")).unwrap();
    fs::write(src.path().join("sub/f2.txt"), "x").unwrap();
    fs::write(rep.path().join("f1.txt"), "goodbye").unwrap();
    fs::write(rep.path().join("stale.txt"), "y").unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .sync_dir(src.path(), rep.path())
        .unwrap();

    assert_eq!(read(rep.path().join("f1.txt")), "hello");
    assert_eq!(read(rep.path().join("sub/f2.txt")), "x");
    assert!(!rep.path().join("stale.txt").exists());

    assert_eq!(report.dirs_copied, 1);
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.files_updated, 1);
    assert_eq!(report.mutations(), 3);

    // Source-only first, then replica-only, then differing files
    let events = recorder.events();
    assert_eq!(
        events,
        vec![
            SyncEvent::CopiedDirectory {
                source: src.path().join("sub"),
                replica: rep.path().join("sub"),
            },
            SyncEvent::RemovedFile {
                replica: rep.path().join("stale.txt"),
            },
            SyncEvent::UpdatedFile {
                source: src.path().join("f1.txt"),
                replica: rep.path().join("f1.txt"),
            },
        ]
    );
    assert!(recorder.errors().is_empty());
}

#[test]
fn test_second_pass_is_idempotent() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    fs::create_dir_all(src.path().join("docs/img")).unwrap();
    fs::write(src.path().join("docs/readme.md"), "# hi").unwrap();
    fs::write(src.path().join("docs/img/logo.svg"), "<svg/>").unwrap();
    fs::write(src.path().join("top.txt"), "top").unwrap();
    fs::create_dir(rep.path().join("docs")).unwrap();
    fs::write(rep.path().join("docs/old.md"), "old").unwrap();

    let first = Arc::new(Recorder::default());
    let report = reconciler(&first).sync_dir(src.path(), rep.path()).unwrap();
    assert!(report.mutations() > 0);

    let second = Arc::new(Recorder::default());
    let report = reconciler(&second).sync_dir(src.path(), rep.path()).unwrap();

    assert_eq!(report.mutations(), 0);
    assert_eq!(second.mutations(), 0);
    assert_eq!(report.dirs_visited, 3);
}

#[test]
fn test_deep_source_tree_into_empty_replica() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    fs::create_dir_all(src.path().join("a/b")).unwrap();
    fs::write(src.path().join("a/b/c.txt"), "nested content").unwrap();

    let recorder = Arc::new(Recorder::default());
    reconciler(&recorder).sync_dir(src.path(), rep.path()).unwrap();

    assert_eq!(read(rep.path().join("a/b/c.txt")), "nested content");
    assert_eq!(
        mtime(src.path().join("a/b/c.txt")),
        mtime(rep.path().join("a/b/c.txt"))
    );
    // The whole subtree is one directory copy
    assert_eq!(recorder.mutations(), 1);
}

#[test]
fn test_recursion_reaches_common_subdirectories() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    fs::create_dir_all(src.path().join("a/b")).unwrap();
    fs::create_dir_all(rep.path().join("a/b/junk")).unwrap();
    fs::write(src.path().join("a/b/c.txt"), "new").unwrap();
    fs::write(rep.path().join("a/b/c.txt"), "older").unwrap();
    fs::write(rep.path().join("a/b/junk/x"), "x").unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .sync_dir(src.path(), rep.path())
        .unwrap();

    assert_eq!(read(rep.path().join("a/b/c.txt")), "new");
    assert!(!rep.path().join("a/b/junk").exists());
    assert_eq!(report.files_updated, 1);
    assert_eq!(report.dirs_removed, 1);
    assert_eq!(report.dirs_visited, 3);
}

#[test]
fn test_update_matches_content_and_mtime() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    // Same size, different content and modification time
    fs::write(src.path().join("f.txt"), "aaaa").unwrap();
    fs::write(rep.path().join("f.txt"), "bbbb").unwrap();
    set_file_mtime(
        src.path().join("f.txt"),
        FileTime::from_unix_time(1_700_000_000, 0),
    )
    .unwrap();
    set_file_mtime(
        rep.path().join("f.txt"),
        FileTime::from_unix_time(1_600_000_000, 0),
    )
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .sync_dir(src.path(), rep.path())
        .unwrap();

    assert_eq!(report.files_updated, 1);
    assert_eq!(read(rep.path().join("f.txt")), "aaaa");
    assert_eq!(mtime(src.path().join("f.txt")), mtime(rep.path().join("f.txt")));
}

#[test]
fn test_converges_without_an_observer() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("one/two")).unwrap();
    fs::write(src.path().join("one/two/three.txt"), "3").unwrap();
    fs::write(rep.path().join("one"), "collides with a directory").unwrap();

    let reconciler = Reconciler::new(TreeComparator::new(), Arc::new(NullObserver));
    reconciler.sync_dir(src.path(), rep.path()).unwrap();

    let classification = TreeComparator::new().compare(src.path(), rep.path()).unwrap();
    assert!(classification.is_level_in_sync());
    assert_eq!(read(rep.path().join("one/two/three.txt")), "3");
}

#[test]
fn test_replica_only_entries_are_deleted() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    fs::write(rep.path().join("orphan.txt"), "o").unwrap();
    fs::create_dir_all(rep.path().join("orphan_dir/inner")).unwrap();
    fs::write(rep.path().join("orphan_dir/inner/f"), "f").unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .sync_dir(src.path(), rep.path())
        .unwrap();

    assert_eq!(fs::read_dir(rep.path()).unwrap().count(), 0);
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.dirs_removed, 1);
}

#[test]
fn test_type_collision_is_replaced() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    // Directory in source, file in replica
    fs::create_dir(src.path().join("x")).unwrap();
    fs::write(src.path().join("x/inner.txt"), "inner").unwrap();
    fs::write(rep.path().join("x"), "i am a file").unwrap();

    // File in source, directory in replica
    fs::write(src.path().join("y"), "plain").unwrap();
    fs::create_dir_all(rep.path().join("y/deep")).unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .sync_dir(src.path(), rep.path())
        .unwrap();

    assert_eq!(report.entries_replaced, 2);
    assert_eq!(read(rep.path().join("x/inner.txt")), "inner");
    assert_eq!(read(rep.path().join("y")), "plain");

    let again = Arc::new(Recorder::default());
    let report = reconciler(&again).sync_dir(src.path(), rep.path()).unwrap();
    assert_eq!(report.mutations(), 0);
}

#[test]
fn test_vanished_entry_is_skipped() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();
    fs::write(src.path().join("real.txt"), "real").unwrap();

    // Classified as present, but gone by the time the action runs
    let mut classification = Classification::new();
    classification
        .source_only
        .push(Entry::source_only("ghost.txt", EntryKind::File));
    classification
        .source_only
        .push(Entry::source_only("real.txt", EntryKind::File));

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .reconcile(src.path(), rep.path(), &classification)
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.files_copied, 1);
    assert_eq!(recorder.errors().len(), 1);
    assert!(recorder.errors()[0].contains("ghost.txt"));
}

/// A classification whose first action fails: "bad" is copied as a file onto
/// an existing replica directory.
fn failing_setup() -> (TempDir, TempDir, Classification) {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();
    fs::write(src.path().join("bad"), "file").unwrap();
    fs::create_dir(rep.path().join("bad")).unwrap();
    fs::write(src.path().join("good.txt"), "good").unwrap();

    let mut classification = Classification::new();
    classification
        .source_only
        .push(Entry::source_only("bad", EntryKind::File));
    classification
        .source_only
        .push(Entry::source_only("good.txt", EntryKind::File));
    (src, rep, classification)
}

#[test]
fn test_abort_policy_stops_at_first_failure() {
    let (src, rep, classification) = failing_setup();

    let recorder = Arc::new(Recorder::default());
    let result = reconciler(&recorder).reconcile(src.path(), rep.path(), &classification);

    assert!(result.is_err());
    assert!(!rep.path().join("good.txt").exists());
    // Left for the scheduler to log
    assert!(recorder.errors().is_empty());
}

#[test]
fn test_skip_policy_continues_with_siblings() {
    let (src, rep, classification) = failing_setup();

    let recorder = Arc::new(Recorder::default());
    let report = reconciler(&recorder)
        .with_policy(ErrorPolicy::SkipEntry)
        .reconcile(src.path(), rep.path(), &classification)
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.files_copied, 1);
    assert!(!report.is_success());
    assert_eq!(read(rep.path().join("good.txt")), "good");
    assert_eq!(recorder.errors().len(), 1);
}

#[test]
fn test_missing_source_is_fatal_before_any_pass() {
    let dir = TempDir::new().unwrap();
    let replica = dir.path().join("replica");
    let config = SyncConfig::new(dir.path().join("nope"), &replica, Duration::from_secs(1));

    let recorder = Arc::new(Recorder::default());
    let err = Scheduler::start(config, recorder.clone()).err().unwrap();

    assert!(matches!(err, SyncError::SourceMissing { .. }));
    assert!(err.is_config());
    assert!(!replica.exists());
    assert_eq!(recorder.errors().len(), 1);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_replica_is_created() {
    let src = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let replica = dir.path().join("nested/replica");
    let config = SyncConfig::new(src.path(), &replica, Duration::from_secs(1));

    let recorder = Arc::new(Recorder::default());
    let mut scheduler = Scheduler::start(config, recorder.clone()).unwrap();

    assert!(replica.is_dir());
    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert_eq!(scheduler.passes(), 0);
    assert_eq!(
        recorder.events(),
        vec![SyncEvent::ReplicaCreated { replica }]
    );
}

#[test]
fn test_replica_must_be_a_directory() {
    let src = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let replica = dir.path().join("file");
    fs::write(&replica, "not a dir").unwrap();

    let config = SyncConfig::new(src.path(), &replica, Duration::from_secs(1));
    let err = Scheduler::start(config, Arc::new(Recorder::default()))
        .err()
        .unwrap();
    assert!(matches!(err, SyncError::NotADirectory { .. }));
}

#[test]
fn test_overlapping_trees_are_rejected() {
    let src = TempDir::new().unwrap();
    let config = SyncConfig::new(
        src.path(),
        src.path().join("inside"),
        Duration::from_secs(1),
    );

    let err = Scheduler::start(config, Arc::new(Recorder::default()))
        .err()
        .unwrap();
    assert!(matches!(err, SyncError::InvalidConfig { .. }));
    assert!(!src.path().join("inside").exists());
}

#[test]
fn test_sibling_replica_spelled_through_parent() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    fs::create_dir(&source).unwrap();
    let replica = source.join("..").join("replica");

    let recorder = Arc::new(Recorder::default());
    let scheduler = Scheduler::start(
        SyncConfig::new(&source, &replica, Duration::from_secs(1)),
        recorder.clone(),
    )
    .unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert!(dir.path().join("replica").is_dir());
    assert!(recorder.errors().is_empty());

    // Still inside the source once the parent step is folded
    let nested = source.join("..").join("src").join("inside");
    let err = Scheduler::start(
        SyncConfig::new(&source, &nested, Duration::from_secs(1)),
        Arc::new(Recorder::default()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, SyncError::InvalidConfig { .. }));
    assert!(!source.join("inside").exists());
}

#[tokio::test]
async fn test_run_stops_cleanly_when_cancelled() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();

    let config = SyncConfig::new(src.path(), rep.path(), Duration::from_secs(3600));
    let recorder = Arc::new(Recorder::default());
    let mut scheduler = Scheduler::start(config, recorder.clone()).unwrap();

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let passes = scheduler.run(shutdown.clone()).await.unwrap();

    assert_eq!(passes, 1);
    assert_eq!(read(rep.path().join("a.txt")), "a");
    assert_eq!(recorder.events().last(), Some(&SyncEvent::Stopped));
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    // Stopped is terminal
    assert_eq!(scheduler.run(shutdown).await.unwrap(), 1);
    assert_eq!(scheduler.passes(), 1);
}

#[tokio::test]
async fn test_cancel_during_wait() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    let config = SyncConfig::new(src.path(), rep.path(), Duration::from_secs(3600));
    let recorder = Arc::new(Recorder::default());
    let mut scheduler = Scheduler::start(config, recorder.clone()).unwrap();

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let passes = tokio::time::timeout(Duration::from_secs(10), scheduler.run(shutdown))
        .await
        .expect("scheduler did not observe cancellation")
        .unwrap();

    assert_eq!(passes, 1);
    let events = recorder.events();
    assert!(matches!(events[0], SyncEvent::Waiting { .. }));
    assert_eq!(events.last(), Some(&SyncEvent::Stopped));
}

#[tokio::test]
async fn test_repeated_passes_pick_up_changes() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();

    let config = SyncConfig::new(src.path(), rep.path(), Duration::from_millis(10));
    let recorder = Arc::new(Recorder::default());
    let mut scheduler = Scheduler::start(config, recorder.clone()).unwrap();

    scheduler.run_pass().await.unwrap();
    fs::write(src.path().join("later.txt"), "later").unwrap();
    let report = scheduler.run_pass().await.unwrap();

    assert_eq!(scheduler.passes(), 2);
    assert_eq!(report.files_copied, 1);
    assert_eq!(read(rep.path().join("later.txt")), "later");
}

#[tokio::test]
async fn test_failed_pass_stops_the_scheduler() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    fs::create_dir(&source).unwrap();
    let rep = TempDir::new().unwrap();

    let config = SyncConfig::new(&source, rep.path(), Duration::from_secs(3600));
    let recorder = Arc::new(Recorder::default());
    let mut scheduler = Scheduler::start(config, recorder.clone()).unwrap();

    // The source root disappears after startup
    fs::remove_dir(&source).unwrap();

    let err = scheduler.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, SyncError::NotFound { .. }));
    assert_eq!(recorder.errors().len(), 1);
    assert!(!recorder.events().contains(&SyncEvent::Stopped));
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(scheduler.passes(), 0);
}

#[tokio::test]
async fn test_ignore_patterns_from_config() {
    let src = TempDir::new().unwrap();
    let rep = TempDir::new().unwrap();
    fs::create_dir(src.path().join(".git")).unwrap();
    fs::write(src.path().join("code.rs"), "fn main() {}").unwrap();
    fs::write(rep.path().join("local.swp"), "keep me").unwrap();

    let config = SyncConfig::builder()
        .source(src.path())
        .replica(rep.path())
        .ignore_patterns(vec![".git".to_string(), "*.swp".to_string()])
        .build()
        .unwrap();
    let mut scheduler = Scheduler::start(config, Arc::new(Recorder::default())).unwrap();

    let report = scheduler.run_pass().await.unwrap();

    assert_eq!(report.files_copied, 1);
    assert!(!rep.path().join(".git").exists());
    assert!(rep.path().join("local.swp").exists());
}
