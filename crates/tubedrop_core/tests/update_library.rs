use std::time::Duration;

use pretty_assertions::assert_eq;
use tubedrop_core::{
    update, AppState, Effect, EntryAction, LibraryEntry, LibraryView, Msg, RequestError,
    Severity,
};

fn entry(filename: &str) -> LibraryEntry {
    LibraryEntry {
        filename: filename.to_string(),
        name: filename.trim_end_matches(".mp3").to_string(),
        size_bytes: 3_145_728,
        size: "3.0 MB".to_string(),
        modified: "2026-10-01 12:00".to_string(),
        duration: Some("03:33".to_string()),
    }
}

fn with_library(files: &[&str]) -> AppState {
    let entries = files.iter().map(|f| entry(f)).collect();
    let (state, _) = update(AppState::new(), Msg::LibraryLoaded(Ok(entries)));
    state
}

fn playing(state: AppState, filename: &str) -> AppState {
    let (state, effects) = update(state, Msg::PlayClicked(filename.to_string()));
    assert_eq!(
        effects,
        vec![Effect::PlayAudio {
            filename: filename.to_string()
        }]
    );
    state
}

fn delete(state: AppState, filename: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::DeleteClicked(filename.to_string()));
    let (state, effects) = update(state, Msg::DeleteConfirmed);
    assert_eq!(
        effects,
        vec![Effect::DeleteFile {
            filename: filename.to_string()
        }]
    );
    update(
        state,
        Msg::Deleted {
            filename: filename.to_string(),
            result: Ok(()),
        },
    )
}

#[test]
fn startup_loads_library_and_cookie_status() {
    let (state, effects) = update(AppState::new(), Msg::Started);
    assert_eq!(effects, vec![Effect::ListLibrary, Effect::CheckCookies]);
    assert_eq!(state.view().library, LibraryView::Loading);
}

#[test]
fn empty_listing_renders_placeholder() {
    let state = with_library(&[]);
    assert_eq!(state.view().library, LibraryView::Empty);
}

#[test]
fn listing_renders_one_row_per_entry_with_all_actions() {
    let state = with_library(&["a.mp3", "b.mp3", "c.mp3"]);
    let LibraryView::Entries(rows) = state.view().library else {
        panic!("expected entries");
    };

    assert_eq!(rows.len(), 3);
    let names: Vec<_> = rows.iter().map(|row| row.filename.as_str()).collect();
    assert_eq!(names, vec!["a.mp3", "b.mp3", "c.mp3"]);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.index, i + 1);
        assert_eq!(
            row.actions,
            vec![EntryAction::Play, EntryAction::Download, EntryAction::Delete]
        );
    }
}

#[test]
fn listing_is_replaced_wholesale() {
    let state = with_library(&["a.mp3", "b.mp3"]);
    let (state, _) = update(state, Msg::LibraryLoaded(Ok(vec![entry("c.mp3")])));

    let LibraryView::Entries(rows) = state.view().library else {
        panic!("expected entries");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].filename, "c.mp3");
}

#[test]
fn failed_listing_keeps_previous_rows() {
    let state = with_library(&["a.mp3"]);
    let (state, effects) = update(
        state,
        Msg::LibraryLoaded(Err(RequestError::transport("connection refused"))),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(matches!(view.library, LibraryView::Entries(ref rows) if rows.len() == 1));
    assert!(view.library_error.is_some());
}

#[test]
fn library_refreshes_every_thirty_seconds() {
    let (state, _) = update(AppState::new(), Msg::Started);

    let (state, effects) = update(state, Msg::Tick(Duration::from_millis(29_999)));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::Tick(Duration::from_secs(30)));
    assert_eq!(effects, vec![Effect::ListLibrary]);
    let (state, effects) = update(state, Msg::Tick(Duration::from_millis(59_999)));
    assert!(effects.is_empty());
    let (_state, effects) = update(state, Msg::Tick(Duration::from_secs(60)));
    assert_eq!(effects, vec![Effect::ListLibrary]);
}

#[test]
fn deleting_playing_file_stops_and_hides_player() {
    let state = playing(with_library(&["a.mp3", "b.mp3"]), "a.mp3");
    assert!(state.view().player.is_some());

    let (state, effects) = delete(state, "a.mp3");

    assert_eq!(effects, vec![Effect::StopAudio, Effect::ListLibrary]);
    assert_eq!(state.now_playing(), None);
    assert!(state.view().player.is_none());
}

#[test]
fn deleting_other_file_leaves_playback_untouched() {
    let state = playing(with_library(&["a.mp3", "b.mp3"]), "a.mp3");

    let (state, effects) = delete(state, "b.mp3");

    assert_eq!(effects, vec![Effect::ListLibrary]);
    assert_eq!(state.now_playing(), Some("a.mp3"));
    assert_eq!(
        state.view().player.map(|p| p.filename),
        Some("a.mp3".to_string())
    );
}

#[test]
fn cancelled_delete_sends_nothing() {
    let state = with_library(&["a.mp3"]);
    let (state, _) = update(state, Msg::DeleteClicked("a.mp3".to_string()));
    assert_eq!(state.view().pending_delete.as_deref(), Some("a.mp3"));

    let (state, effects) = update(state, Msg::DeleteCancelled);
    assert!(effects.is_empty());
    assert_eq!(state.view().pending_delete, None);

    let (_state, effects) = update(state, Msg::DeleteConfirmed);
    assert!(effects.is_empty());
}

#[test]
fn failed_delete_reports_error_and_keeps_player() {
    let state = playing(with_library(&["a.mp3"]), "a.mp3");
    let (state, _) = update(state, Msg::DeleteClicked("a.mp3".to_string()));
    let (state, _) = update(state, Msg::DeleteConfirmed);
    let (state, effects) = update(
        state,
        Msg::Deleted {
            filename: "a.mp3".to_string(),
            result: Err(RequestError::server("File not found")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.now_playing(), Some("a.mp3"));
    assert!(state
        .notifications()
        .iter()
        .any(|n| n.severity == Severity::Error && n.text == "Could not delete a.mp3: File not found"));
}

#[test]
fn playing_row_is_flagged_and_stop_clears_it() {
    let state = playing(with_library(&["a.mp3", "b.mp3"]), "b.mp3");
    let LibraryView::Entries(rows) = state.view().library else {
        panic!("expected entries");
    };
    assert_eq!(
        rows.iter().map(|row| row.playing).collect::<Vec<_>>(),
        vec![false, true]
    );

    let (state, effects) = update(state, Msg::StopClicked);
    assert_eq!(effects, vec![Effect::StopAudio]);
    assert!(state.view().player.is_none());

    let (_state, effects) = update(state, Msg::StopClicked);
    assert!(effects.is_empty());
}

#[test]
fn playback_ending_hides_player_only_for_current_file() {
    let state = playing(with_library(&["a.mp3", "b.mp3"]), "a.mp3");
    let (state, _) = update(state, Msg::PlaybackEnded("b.mp3".to_string()));
    assert_eq!(state.now_playing(), Some("a.mp3"));

    let (state, _) = update(state, Msg::PlaybackEnded("a.mp3".to_string()));
    assert_eq!(state.now_playing(), None);
}

#[test]
fn save_requests_file_and_reports_result() {
    let state = with_library(&["a.mp3"]);
    let (state, effects) = update(state, Msg::SaveClicked("a.mp3".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SaveFile {
            filename: "a.mp3".to_string()
        }]
    );

    let (state, _) = update(
        state,
        Msg::FileSaved {
            filename: "a.mp3".to_string(),
            result: Ok("downloads/a.mp3".to_string()),
        },
    );
    assert!(state
        .notifications()
        .iter()
        .any(|n| n.severity == Severity::Success && n.text == "Saved a.mp3 to downloads/a.mp3"));
}
