//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, store and coordinator the way an app shell does.
//! - Simulate one launch/suspend cycle so restoration can be checked by hand.
//!
//! Usage: `staterestore <config.json | documents_dir> [draft title]`
//!
//! Running twice against the same directory shows the second launch picking
//! up the context archived by the first.

use staterestore_core::{
    core_version, init_logging, AppConfig, EditContext, EditContextView, FileRestorationStorage,
    Item, ItemStore, LaunchSource, RestorationCoordinator, RestorationHost, RestoreOutcome,
};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

const SEED_ITEM_COUNT: usize = 9;
const DEFAULT_ACTIVITY_TYPE: &str = "com.example.staterestore.restore";

/// Detail screen stand-in that prints what it is asked to show.
#[derive(Default)]
struct ConsoleDetail {
    item: Option<Item>,
    editing: bool,
}

impl EditContextView for ConsoleDetail {
    fn current_context(&self) -> Option<EditContext> {
        self.item.as_ref().map(|item| EditContext {
            identifier: item.identifier().to_string(),
            title_text: item.title.clone(),
            notes_text: item.notes.clone(),
            edit_mode_active: self.editing,
        })
    }

    fn present(&mut self, item: Item, editing: bool) {
        println!("restored title={:?} editing={}", item.title, editing);
        self.item = Some(item);
        self.editing = editing;
    }
}

struct ConsoleHost;

impl RestorationHost for ConsoleHost {
    fn restoration_extended(&mut self) {
        println!("host restoration=extended");
    }

    fn restoration_completed(&mut self) {
        println!("host restoration=completed");
    }
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(target) = args.next() else {
        eprintln!("usage: staterestore <config.json | documents_dir> [draft title]");
        return ExitCode::FAILURE;
    };
    let draft_title = args.next();

    let config = match load_config(Path::new(&target)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.log_level, config.log_dir()) {
        eprintln!("logging disabled: {err}");
    }
    println!("staterestore_core version={}", core_version());

    let mut store = ItemStore::open(&config.documents_dir);
    if store.seed_if_empty(SEED_ITEM_COUNT) {
        println!("seeded items={}", store.count());
    }

    let mut coordinator = RestorationCoordinator::new(
        config.codec(),
        FileRestorationStorage::new(config.restoration_dir()),
    );
    let mut detail = ConsoleDetail::default();
    let mut host = ConsoleHost;

    let outcome = match coordinator.relaunch(LaunchSource::resolve(None), &store, &mut detail) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("relaunch failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    if outcome == RestoreOutcome::NothingToRestore {
        println!("restored nothing items={}", store.count());
    }

    match coordinator.extend_restoration(&mut host, move || SEED_ITEM_COUNT) {
        Ok(pending) => {
            // Stand-in for the host's run loop ticking until the worker is done.
            while !pending.is_finished() {
                std::thread::sleep(Duration::from_millis(1));
            }
            if let Err(err) = coordinator.complete_restoration(pending, &mut host) {
                eprintln!("restoration handshake failed: {err}");
            }
        }
        Err(err) => eprintln!("restoration handshake failed: {err}"),
    }

    if let Some(title) = draft_title {
        open_draft(&store, &mut detail, title);
    }

    match coordinator.suspend(&store, &detail) {
        Ok(outcome) => println!("suspended outcome={outcome:?}"),
        Err(err) => {
            eprintln!("suspend failed: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn load_config(target: &Path) -> Result<AppConfig, String> {
    let mut config = if target.is_file() {
        let raw = std::fs::read_to_string(target)
            .map_err(|err| format!("cannot read `{}`: {err}", target.display()))?;
        AppConfig::from_json_str(&raw).map_err(|err| err.to_string())?
    } else {
        let dir = std::path::absolute(target)
            .map_err(|err| format!("cannot resolve `{}`: {err}", target.display()))?;
        AppConfig::new(dir)
    };
    if config.activity_types.is_empty() {
        config.activity_types.push(DEFAULT_ACTIVITY_TYPE.to_string());
    }
    Ok(config)
}

// Shows the first item with an unsaved title, as if the user were typing.
fn open_draft(store: &ItemStore, detail: &mut ConsoleDetail, title: String) {
    let Some(baseline) = store.item_at(0).cloned() else {
        return;
    };
    detail.item = Some(Item::with_identifier(
        title,
        baseline.notes.clone(),
        baseline.identifier(),
    ));
    detail.editing = false;
}
