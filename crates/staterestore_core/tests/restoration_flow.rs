use staterestore_core::{
    ActivityCodec, ActivityRecord, EditContext, EditContextView, FileRestorationStorage, Item,
    ItemStore, LaunchSource, MemoryRestorationStorage, RestorationCoordinator, RestorationError,
    RestorationHost, RestorationPhase, RestorationStorage, RestoreOutcome, SuspendOutcome,
    RESTORE_ACTIVITY_KEY,
};

const ACTIVITY_TYPE: &str = "com.example.staterestore.restore";

#[derive(Default)]
struct DetailScreen {
    shown: Option<Item>,
    title_text: String,
    notes_text: String,
    editing: bool,
    presented: usize,
}

impl DetailScreen {
    fn showing(item: &Item) -> Self {
        Self {
            shown: Some(item.clone()),
            title_text: item.title.clone(),
            notes_text: item.notes.clone(),
            ..Self::default()
        }
    }
}

impl EditContextView for DetailScreen {
    fn current_context(&self) -> Option<EditContext> {
        self.shown.as_ref().map(|item| EditContext {
            identifier: item.identifier().to_string(),
            title_text: self.title_text.clone(),
            notes_text: self.notes_text.clone(),
            edit_mode_active: self.editing,
        })
    }

    fn present(&mut self, item: Item, editing: bool) {
        self.title_text = item.title.clone();
        self.notes_text = item.notes.clone();
        self.shown = Some(item);
        self.editing = editing;
        self.presented += 1;
    }
}

#[derive(Default)]
struct HostSignals {
    extended: usize,
    completed: usize,
}

impl RestorationHost for HostSignals {
    fn restoration_extended(&mut self) {
        self.extended += 1;
    }

    fn restoration_completed(&mut self) {
        self.completed += 1;
    }
}

fn seeded_store() -> ItemStore {
    let mut store = ItemStore::at_path("unused/SavedData");
    for number in 1..=3 {
        store
            .append(Item::new(format!("Item {number}"), format!("Item {number} notes")))
            .unwrap();
    }
    store
}

fn coordinator() -> RestorationCoordinator<MemoryRestorationStorage> {
    RestorationCoordinator::new(
        ActivityCodec::new(ACTIVITY_TYPE),
        MemoryRestorationStorage::new(),
    )
}

fn active_coordinator(
    store: &ItemStore,
) -> RestorationCoordinator<MemoryRestorationStorage> {
    let mut coordinator = coordinator();
    coordinator
        .relaunch(LaunchSource::Fresh, store, &mut DetailScreen::default())
        .unwrap();
    coordinator
}

#[test]
fn unsaved_edit_is_restored_in_edit_mode_after_cold_relaunch() {
    let store = seeded_store();
    let target = store.item_at(1).unwrap().clone();
    let mut before = DetailScreen::showing(&target);
    before.title_text = "Item 2 (draft)".to_string();

    let mut coordinator = active_coordinator(&store);
    let suspended = coordinator.suspend(&store, &before).unwrap();
    assert_eq!(suspended, SuspendOutcome::Archived { was_editing: true });
    assert_eq!(coordinator.phase(), RestorationPhase::Cold);
    assert!(coordinator.storage().contains(RESTORE_ACTIVITY_KEY));

    let mut after = DetailScreen::default();
    let outcome = coordinator
        .relaunch(LaunchSource::StoredArchive, &store, &mut after)
        .unwrap();

    assert_eq!(
        outcome,
        RestoreOutcome::Restored {
            identifier: target.identifier().to_string(),
            editing: true,
        }
    );
    assert_eq!(coordinator.phase(), RestorationPhase::Active);
    let shown = after.shown.unwrap();
    assert_eq!(shown.title, "Item 2 (draft)");
    assert_eq!(shown.notes, "Item 2 notes");
    assert_eq!(shown.identifier(), target.identifier());
    assert!(after.editing);
    assert_eq!(store.item_at(1).unwrap().title, "Item 2");
}

#[test]
fn clean_view_is_restored_read_only() {
    let store = seeded_store();
    let target = store.item_at(0).unwrap().clone();
    let mut coordinator = active_coordinator(&store);

    coordinator
        .suspend(&store, &DetailScreen::showing(&target))
        .unwrap();
    let mut after = DetailScreen::default();
    coordinator
        .relaunch(LaunchSource::StoredArchive, &store, &mut after)
        .unwrap();

    assert_eq!(after.shown.unwrap().title, target.title);
    assert!(!after.editing);
}

#[test]
fn unknown_target_is_a_silent_no_op() {
    let store = seeded_store();
    let snapshot: Vec<Item> = store.items().cloned().collect();
    let coordinator = coordinator();
    let record = ActivityRecord {
        target_identifier: Some("deleted-item".to_string()),
        pending_title: Some("ghost".to_string()),
        pending_notes: None,
        was_editing: true,
    };

    let mut screen = DetailScreen::default();
    let outcome = coordinator.apply_restored(&record, &store, &mut screen);

    assert_eq!(outcome, RestoreOutcome::NothingToRestore);
    assert_eq!(screen.presented, 0);
    assert!(screen.shown.is_none());
    assert_eq!(store.items().cloned().collect::<Vec<_>>(), snapshot);
}

#[test]
fn corrupt_stored_archive_fails_open() {
    let store = seeded_store();
    let mut storage = MemoryRestorationStorage::new();
    storage.write(RESTORE_ACTIVITY_KEY, b"\xffgarbage").unwrap();
    let mut coordinator =
        RestorationCoordinator::new(ActivityCodec::new(ACTIVITY_TYPE), storage);

    let mut screen = DetailScreen::default();
    let outcome = coordinator
        .relaunch(LaunchSource::StoredArchive, &store, &mut screen)
        .unwrap();

    assert_eq!(outcome, RestoreOutcome::NothingToRestore);
    assert_eq!(coordinator.phase(), RestorationPhase::Active);
    assert_eq!(screen.presented, 0);
}

#[test]
fn live_continuation_takes_precedence_over_stored_archive() {
    let store = seeded_store();
    let stored_target = store.item_at(0).unwrap().clone();
    let live_target = store.item_at(2).unwrap().clone();

    let mut coordinator = active_coordinator(&store);
    coordinator
        .suspend(&store, &DetailScreen::showing(&stored_target))
        .unwrap();

    let continuation = ActivityRecord {
        target_identifier: Some(live_target.identifier().to_string()),
        pending_title: Some(live_target.title.clone()),
        pending_notes: Some("typed before handoff".to_string()),
        was_editing: true,
    };
    let mut screen = DetailScreen::default();
    coordinator
        .relaunch(LaunchSource::resolve(Some(continuation)), &store, &mut screen)
        .unwrap();

    let shown = screen.shown.unwrap();
    assert_eq!(shown.identifier(), live_target.identifier());
    assert_eq!(shown.notes, "typed before handoff");
    assert_eq!(LaunchSource::resolve(None), LaunchSource::StoredArchive);
}

#[test]
fn host_supplied_archive_bytes_are_decoded() {
    let store = seeded_store();
    let target = store.item_at(2).unwrap().clone();
    let codec = ActivityCodec::new(ACTIVITY_TYPE);
    let bytes = codec
        .encode(&ActivityRecord {
            target_identifier: Some(target.identifier().to_string()),
            pending_title: None,
            pending_notes: None,
            was_editing: false,
        })
        .unwrap();

    let mut coordinator = coordinator();
    let mut screen = DetailScreen::default();
    coordinator
        .relaunch(LaunchSource::Archive(bytes), &store, &mut screen)
        .unwrap();

    let shown = screen.shown.unwrap();
    assert_eq!(shown.title, target.title);
    assert_eq!(shown.notes, target.notes);
}

#[test]
fn suspending_without_detail_screen_clears_stale_archive() {
    let store = seeded_store();
    let target = store.item_at(0).unwrap().clone();
    let mut coordinator = active_coordinator(&store);
    coordinator
        .suspend(&store, &DetailScreen::showing(&target))
        .unwrap();
    coordinator
        .relaunch(LaunchSource::Fresh, &store, &mut DetailScreen::default())
        .unwrap();

    let outcome = coordinator
        .suspend(&store, &DetailScreen::default())
        .unwrap();

    assert_eq!(outcome, SuspendOutcome::NothingCaptured);
    assert!(!coordinator.storage().contains(RESTORE_ACTIVITY_KEY));
}

#[test]
fn lifecycle_hooks_reject_out_of_order_calls() {
    let store = seeded_store();
    let mut coordinator = coordinator();

    let err = coordinator
        .suspend(&store, &DetailScreen::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RestorationError::InvalidTransition {
            from: RestorationPhase::Cold,
            ..
        }
    ));

    coordinator
        .relaunch(LaunchSource::Fresh, &store, &mut DetailScreen::default())
        .unwrap();
    let err = coordinator
        .relaunch(LaunchSource::Fresh, &store, &mut DetailScreen::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RestorationError::InvalidTransition {
            from: RestorationPhase::Active,
            ..
        }
    ));
}

#[test]
fn background_work_completes_exactly_once() {
    let store = seeded_store();
    let mut coordinator = active_coordinator(&store);
    let mut host = HostSignals::default();

    let pending = coordinator
        .extend_restoration(&mut host, || 40 + 2)
        .unwrap();
    assert_eq!(host.extended, 1);
    assert_eq!(host.completed, 0);

    let value = coordinator.complete_restoration(pending, &mut host).unwrap();
    assert_eq!(value, Some(42));
    assert_eq!(host.completed, 1);

    assert!(matches!(
        coordinator.mark_restoration_completed(&mut host),
        Err(RestorationError::AlreadyCompleted)
    ));
    assert!(matches!(
        coordinator.extend_restoration(&mut host, || ()),
        Err(RestorationError::AlreadyCompleted)
    ));
    assert_eq!(host.completed, 1);
    assert_eq!(host.extended, 1);
}

#[test]
fn completion_without_start_is_rejected() {
    let mut coordinator = coordinator();
    let mut host = HostSignals::default();

    assert!(matches!(
        coordinator.mark_restoration_completed(&mut host),
        Err(RestorationError::NotExtended)
    ));
    assert_eq!(host.completed, 0);
}

#[test]
fn panicking_worker_still_completes_restoration() {
    let store = seeded_store();
    let mut coordinator = active_coordinator(&store);
    let mut host = HostSignals::default();

    let pending = coordinator
        .extend_restoration(&mut host, || -> u8 { panic!("warm-up failed") })
        .unwrap();
    let value = coordinator.complete_restoration(pending, &mut host).unwrap();

    assert_eq!(value, None);
    assert_eq!(host.completed, 1);
    assert_eq!(coordinator.phase(), RestorationPhase::Active);
}

#[test]
fn extended_restoration_blocks_suspend_and_relaunch_until_completed() {
    let store = seeded_store();
    let target = store.item_at(0).unwrap().clone();
    let mut coordinator = active_coordinator(&store);
    let mut host = HostSignals::default();

    let pending = coordinator.extend_restoration(&mut host, || 7).unwrap();
    assert_eq!(coordinator.phase(), RestorationPhase::Resuming);

    let err = coordinator
        .suspend(&store, &DetailScreen::showing(&target))
        .unwrap_err();
    assert!(matches!(
        err,
        RestorationError::InvalidTransition {
            from: RestorationPhase::Resuming,
            ..
        }
    ));
    let err = coordinator
        .relaunch(LaunchSource::Fresh, &store, &mut DetailScreen::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RestorationError::InvalidTransition {
            from: RestorationPhase::Resuming,
            ..
        }
    ));
    assert!(!coordinator.storage().contains(RESTORE_ACTIVITY_KEY));

    while !pending.is_finished() {
        std::thread::yield_now();
    }
    let value = coordinator.complete_restoration(pending, &mut host).unwrap();
    assert_eq!(value, Some(7));
    assert_eq!(host.completed, 1);
    assert_eq!(coordinator.phase(), RestorationPhase::Active);

    let outcome = coordinator
        .suspend(&store, &DetailScreen::showing(&target))
        .unwrap();
    assert_eq!(outcome, SuspendOutcome::Archived { was_editing: false });
    assert_eq!(coordinator.phase(), RestorationPhase::Cold);
}

#[test]
fn restoration_cannot_be_extended_before_launch() {
    let mut coordinator = coordinator();
    let mut host = HostSignals::default();

    let err = coordinator
        .extend_restoration(&mut host, || ())
        .unwrap_err();
    assert!(matches!(
        err,
        RestorationError::InvalidTransition {
            from: RestorationPhase::Cold,
            ..
        }
    ));
    assert_eq!(host.extended, 0);
    assert_eq!(coordinator.phase(), RestorationPhase::Cold);
}

#[test]
fn file_storage_carries_context_across_coordinators() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ItemStore::open(dir.path());
    store.seed_if_empty(9);
    let target = store.item_at(4).unwrap().clone();
    let restoration_dir = dir.path().join("Restoration");

    {
        let mut first = RestorationCoordinator::new(
            ActivityCodec::new(ACTIVITY_TYPE),
            FileRestorationStorage::new(&restoration_dir),
        );
        first
            .relaunch(LaunchSource::StoredArchive, &store, &mut DetailScreen::default())
            .unwrap();
        let mut screen = DetailScreen::showing(&target);
        screen.editing = true;
        first.suspend(&store, &screen).unwrap();
    }

    let reopened = ItemStore::open(dir.path());
    let mut second = RestorationCoordinator::new(
        ActivityCodec::new(ACTIVITY_TYPE),
        FileRestorationStorage::new(&restoration_dir),
    );
    let mut screen = DetailScreen::default();
    let outcome = second
        .relaunch(LaunchSource::StoredArchive, &reopened, &mut screen)
        .unwrap();

    assert_eq!(
        outcome,
        RestoreOutcome::Restored {
            identifier: target.identifier().to_string(),
            editing: true,
        }
    );
    assert_eq!(screen.shown.unwrap().title, "Item 5");
}
