use std::time::Duration;

use tubedrop_core::{
    update, AppState, Effect, EntryAction, ErrorCategory, Msg, NotificationAction, RequestError,
    Severity, VideoMetadata, ALREADY_DOWNLOADED_CODE, CONNECTIVITY_MESSAGE,
    INVALID_INPUT_MESSAGE,
};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn metadata(url: &str) -> VideoMetadata {
    VideoMetadata {
        url: url.to_string(),
        title: "Never Gonna Give You Up".to_string(),
        uploader: "Rick Astley".to_string(),
        duration: "03:33".to_string(),
        view_count: 1_500,
        thumbnail: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg".to_string(),
        already_downloaded: true,
    }
}

fn last_text(state: &AppState) -> Option<&str> {
    state.notifications().last().map(|n| n.text.as_str())
}

fn rejected(error: RequestError, existing_file: Option<&str>) -> AppState {
    let (state, _) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
    let (state, _) = update(state, Msg::DownloadClicked);
    let (state, _) = update(
        state,
        Msg::DownloadRejected {
            url: URL.to_string(),
            error,
            existing_file: existing_file.map(str::to_string),
        },
    );
    state
}

#[test]
fn invalid_input_never_reaches_network() {
    let (state, effects) = update(AppState::new(), Msg::InputChanged("not a link".to_string()));
    assert!(effects.is_empty());
    assert!(!state.view().url_valid);

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());
    assert_eq!(last_text(&state), Some(INVALID_INPUT_MESSAGE));

    let (state, effects) = update(state, Msg::PreviewRequested);
    assert!(effects.is_empty());
    assert_eq!(state.notifications().len(), 2);
}

#[test]
fn valid_input_fetches_preview_once() {
    let (state, effects) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchInfo {
            url: URL.to_string()
        }]
    );
    assert!(state.view().info_loading);

    let (state, effects) = update(state, Msg::InputChanged(format!("  {URL} ")));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::InfoLoaded {
            url: URL.to_string(),
            result: Ok(metadata(URL)),
        },
    );
    let view = state.view();
    assert!(!view.info_loading);
    let preview = view.preview.expect("preview");
    assert_eq!(preview.views, "1.5K");
    assert_eq!(preview.duration, "03:33");
    assert!(preview.already_downloaded);

    let (_state, effects) = update(state, Msg::InputChanged(URL.to_string()));
    assert!(effects.is_empty());
}

#[test]
fn explicit_preview_refetches() {
    let (state, _) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
    let (state, _) = update(
        state,
        Msg::InfoLoaded {
            url: URL.to_string(),
            result: Ok(metadata(URL)),
        },
    );
    let (_state, effects) = update(state, Msg::PreviewRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchInfo {
            url: URL.to_string()
        }]
    );
}

#[test]
fn stale_preview_is_discarded() {
    let other = "https://youtu.be/aaaaaaaaaaa";
    let (state, _) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
    let (state, _) = update(state, Msg::InputChanged(other.to_string()));
    let (state, _) = update(
        state,
        Msg::InfoLoaded {
            url: URL.to_string(),
            result: Ok(metadata(URL)),
        },
    );

    assert!(state.view().preview.is_none());
    assert!(state.view().info_loading);
}

#[test]
fn reentering_a_previewed_url_after_an_invalid_edit_fetches_again() {
    let (state, _) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
    let (state, _) = update(
        state,
        Msg::InfoLoaded {
            url: URL.to_string(),
            result: Ok(metadata(URL)),
        },
    );
    assert!(state.view().preview.is_some());

    let (state, effects) = update(
        state,
        Msg::InputChanged("https://www.youtube.com/watch?v=dQw4w9WgXc".to_string()),
    );
    assert!(effects.is_empty());
    assert!(state.view().preview.is_none());

    let (state, effects) = update(state, Msg::InputChanged(URL.to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchInfo {
            url: URL.to_string()
        }]
    );
    let (state, _) = update(
        state,
        Msg::InfoLoaded {
            url: URL.to_string(),
            result: Ok(metadata(URL)),
        },
    );
    assert_eq!(
        state.view().preview.map(|p| p.title),
        Some("Never Gonna Give You Up".to_string())
    );
}

#[test]
fn preview_errors_get_tailored_messages() {
    let cases = [
        (
            RequestError::server("ERROR: Private video. Sign in if you've been granted access"),
            "This video is private or unavailable.",
        ),
        (
            RequestError::server("Sign in to confirm you're not a bot. Use --cookies"),
            "This video requires sign-in. The server needs a valid cookies file to fetch it.",
        ),
        (
            RequestError::server("Unsupported URL: https://youtu.be/x"),
            "The server rejected this link as an invalid YouTube URL.",
        ),
        (
            RequestError::server("ffmpeg exploded"),
            "ffmpeg exploded",
        ),
        (
            RequestError::transport("error sending request"),
            CONNECTIVITY_MESSAGE,
        ),
    ];

    for (error, expected) in cases {
        let (state, _) = update(AppState::new(), Msg::InputChanged(URL.to_string()));
        let (state, _) = update(
            state,
            Msg::InfoLoaded {
                url: URL.to_string(),
                result: Err(error),
            },
        );
        assert!(state.view().preview.is_none());
        assert_eq!(last_text(&state), Some(expected));
        assert_eq!(state.notifications().last().unwrap().severity, Severity::Error);
    }
}

#[test]
fn structured_code_wins_over_message_text() {
    let error = RequestError::server_with_code("Sign in required", ALREADY_DOWNLOADED_CODE);
    assert_eq!(error.category(), ErrorCategory::AlreadyDownloaded);
    assert_eq!(
        RequestError::server("This video has already been downloaded").category(),
        ErrorCategory::AlreadyDownloaded
    );
    assert_eq!(
        RequestError::server_with_code("whatever", "unknown_code").category(),
        ErrorCategory::Other
    );
}

#[test]
fn already_downloaded_raises_action_notification() {
    let state = rejected(
        RequestError::server_with_code("duplicate", ALREADY_DOWNLOADED_CODE),
        Some("Song.mp3"),
    );

    assert!(state.view().download_enabled);
    let view = state.view();
    let note = view.notifications.last().expect("notification");
    assert_eq!(note.text, "Already downloaded: Song.mp3");
    assert_eq!(note.actions, vec![EntryAction::Play, EntryAction::Download]);

    let id = note.id;
    let (state, effects) = update(
        state,
        Msg::NotificationActionClicked {
            id,
            action: NotificationAction::Play,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::PlayAudio {
            filename: "Song.mp3".to_string()
        }]
    );
    assert!(state.notifications().iter().all(|n| n.id != id));
}

#[test]
fn already_downloaded_by_message_text_still_offers_actions() {
    let state = rejected(
        RequestError::server("This video has already been downloaded"),
        Some("Song.mp3"),
    );
    let id = state.notifications().last().unwrap().id;

    let (_state, effects) = update(
        state,
        Msg::NotificationActionClicked {
            id,
            action: NotificationAction::Download,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SaveFile {
            filename: "Song.mp3".to_string()
        }]
    );
}

#[test]
fn existing_file_alone_marks_a_duplicate() {
    let state = rejected(RequestError::server("Conflict"), Some("Song.mp3"));

    let view = state.view();
    let note = view.notifications.last().expect("notification");
    assert_eq!(note.text, "Already downloaded: Song.mp3");
    assert_eq!(note.actions, vec![EntryAction::Play, EntryAction::Download]);
}

#[test]
fn other_rejections_reenable_trigger_with_error() {
    let state = rejected(RequestError::transport("timed out"), None);
    assert!(state.view().download_enabled);
    assert_eq!(last_text(&state), Some(CONNECTIVITY_MESSAGE));
    assert!(state.view().notifications.last().unwrap().actions.is_empty());
}

#[test]
fn notifications_expire_after_their_lifetime() {
    let (mut state, _) = update(AppState::new(), Msg::DownloadClicked);
    assert!(state.consume_dirty());
    let (state, _) = update(state, Msg::Tick(Duration::from_millis(4_999)));
    assert_eq!(state.notifications().len(), 1);
    let (mut state, _) = update(state, Msg::Tick(Duration::from_secs(5)));
    assert!(state.notifications().is_empty());
    assert!(state.consume_dirty());

    let state = rejected(
        RequestError::server_with_code("duplicate", ALREADY_DOWNLOADED_CODE),
        Some("Song.mp3"),
    );
    let (state, _) = update(state, Msg::Tick(Duration::from_millis(7_999)));
    assert!(state
        .notifications()
        .iter()
        .any(|n| n.existing_file.is_some()));
    let (state, _) = update(state, Msg::Tick(Duration::from_secs(8)));
    assert!(state
        .notifications()
        .iter()
        .all(|n| n.existing_file.is_none()));
}

#[test]
fn notifications_stack_and_can_be_dismissed() {
    let (state, _) = update(AppState::new(), Msg::DownloadClicked);
    let (state, _) = update(state, Msg::DownloadClicked);
    assert_eq!(state.notifications().len(), 2);

    let first = state.notifications()[0].id;
    let (state, _) = update(state, Msg::NotificationDismissed(first));
    assert_eq!(state.notifications().len(), 1);
    assert_ne!(state.notifications()[0].id, first);
}

#[test]
fn cookie_status_is_shown_and_failures_ignored() {
    let (state, effects) = update(AppState::new(), Msg::CookieStatusLoaded(Ok(true)));
    assert!(effects.is_empty());
    assert_eq!(state.view().cookies_available, Some(true));

    let (state, _) = update(
        state,
        Msg::CookieStatusLoaded(Err(RequestError::transport("refused"))),
    );
    assert_eq!(state.view().cookies_available, Some(true));
    assert!(state.notifications().is_empty());
}
