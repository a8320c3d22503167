//! Terminal input: one line, one command.

use tubedrop_core::{AppViewModel, LibraryView, Msg, NotificationAction, NotificationId};

pub const HELP: &str = "\
Commands:
  <link> | url <link>   set the video link (a preview is fetched automatically)
  preview               fetch the preview again
  download              convert the current link to mp3 on the server
  refresh               reload the downloads list
  play <n>              stream download #n
  save <n>              save download #n into the download directory
  delete <n>            delete download #n from the server (asks first)
  yes | no              answer a pending question
  stop                  stop playback
  play-existing         play the file named by the latest already-downloaded notice
  save-existing         save the file named by the latest already-downloaded notice
  dismiss <id>          dismiss a notification
  help                  show this help
  quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetUrl(String),
    Preview,
    Download,
    Refresh,
    Play(usize),
    Save(usize),
    Delete(usize),
    Confirm,
    Cancel,
    Stop,
    PlayExisting,
    SaveExisting,
    Dismiss(NotificationId),
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "url" => Command::SetUrl(rest.to_string()),
        "preview" | "info" => Command::Preview,
        "download" | "d" => Command::Download,
        "refresh" | "r" => Command::Refresh,
        "play" => Command::Play(index(rest)?),
        "save" => Command::Save(index(rest)?),
        "delete" | "rm" => Command::Delete(index(rest)?),
        "yes" | "y" => Command::Confirm,
        "no" | "n" => Command::Cancel,
        "stop" => Command::Stop,
        "play-existing" => Command::PlayExisting,
        "save-existing" => Command::SaveExisting,
        "dismiss" => Command::Dismiss(
            rest.parse()
                .map_err(|_| format!("expected a notification id, got {rest:?}"))?,
        ),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        // Anything else is treated as pasted input.
        _ => Command::SetUrl(line.to_string()),
    };
    Ok(Some(command))
}

fn index(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a download number, got {raw:?}")),
    }
}

/// Resolve a command against what is currently on screen.
///
/// `Help` and `Quit` are handled by the caller and never reach here.
pub fn to_msg(command: Command, view: &AppViewModel) -> Result<Msg, String> {
    let msg = match command {
        Command::SetUrl(url) => Msg::InputChanged(url),
        Command::Preview => Msg::PreviewRequested,
        Command::Download => Msg::DownloadClicked,
        Command::Refresh => Msg::RefreshLibraryClicked,
        Command::Play(n) => Msg::PlayClicked(filename_at(view, n)?),
        Command::Save(n) => Msg::SaveClicked(filename_at(view, n)?),
        Command::Delete(n) => Msg::DeleteClicked(filename_at(view, n)?),
        Command::Confirm if view.pending_delete.is_some() => Msg::DeleteConfirmed,
        Command::Cancel if view.pending_delete.is_some() => Msg::DeleteCancelled,
        Command::Confirm | Command::Cancel => return Err("nothing to confirm".to_string()),
        Command::Stop => Msg::StopClicked,
        Command::PlayExisting => existing_action(view, NotificationAction::Play)?,
        Command::SaveExisting => existing_action(view, NotificationAction::Download)?,
        Command::Dismiss(id) => Msg::NotificationDismissed(id),
        Command::Help | Command::Quit => Msg::NoOp,
    };
    Ok(msg)
}

fn filename_at(view: &AppViewModel, n: usize) -> Result<String, String> {
    match &view.library {
        LibraryView::Entries(rows) => rows
            .iter()
            .find(|row| row.index == n)
            .map(|row| row.filename.clone())
            .ok_or_else(|| format!("there is no download #{n}")),
        LibraryView::Empty => Err("there are no downloads yet".to_string()),
        LibraryView::Loading => Err("the downloads list is still loading".to_string()),
    }
}

fn existing_action(view: &AppViewModel, action: NotificationAction) -> Result<Msg, String> {
    view.notifications
        .iter()
        .rev()
        .find(|n| !n.actions.is_empty())
        .map(|n| Msg::NotificationActionClicked { id: n.id, action })
        .ok_or_else(|| "no already-downloaded notice is showing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tubedrop_core::{EntryAction, LibraryRowView, NotificationView, Severity};

    fn row(index: usize, filename: &str) -> LibraryRowView {
        LibraryRowView {
            index,
            filename: filename.to_string(),
            name: filename.to_string(),
            size: "1.0 MB".to_string(),
            modified: "2026-10-01 12:00".to_string(),
            duration: None,
            playing: false,
            actions: vec![EntryAction::Play, EntryAction::Download, EntryAction::Delete],
        }
    }

    #[test]
    fn bare_text_is_pasted_input() {
        assert_eq!(
            parse("  https://youtu.be/dQw4w9WgXcQ ").unwrap(),
            Some(Command::SetUrl("https://youtu.be/dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn keywords_parse_with_arguments() {
        assert_eq!(parse("play 2").unwrap(), Some(Command::Play(2)));
        assert_eq!(parse("DELETE 1").unwrap(), Some(Command::Delete(1)));
        assert_eq!(parse("dismiss 7").unwrap(), Some(Command::Dismiss(7)));
        assert_eq!(parse("y").unwrap(), Some(Command::Confirm));
        assert!(parse("play").is_err());
        assert!(parse("save 0").is_err());
    }

    #[test]
    fn row_numbers_resolve_to_filenames() {
        let view = AppViewModel {
            library: LibraryView::Entries(vec![row(1, "a.mp3"), row(2, "b.mp3")]),
            ..AppViewModel::default()
        };
        assert_eq!(
            to_msg(Command::Play(2), &view).unwrap(),
            Msg::PlayClicked("b.mp3".to_string())
        );
        assert!(to_msg(Command::Save(3), &view).is_err());
        assert!(to_msg(Command::Delete(1), &AppViewModel::default()).is_err());
    }

    #[test]
    fn confirmation_requires_pending_question() {
        let view = AppViewModel {
            pending_delete: Some("a.mp3".to_string()),
            ..AppViewModel::default()
        };
        assert_eq!(to_msg(Command::Confirm, &view).unwrap(), Msg::DeleteConfirmed);
        assert_eq!(to_msg(Command::Cancel, &view).unwrap(), Msg::DeleteCancelled);
        assert!(to_msg(Command::Confirm, &AppViewModel::default()).is_err());
    }

    #[test]
    fn existing_actions_use_latest_action_notice() {
        let notice = |id, actions: Vec<EntryAction>| NotificationView {
            id,
            severity: Severity::Info,
            text: String::new(),
            actions,
        };
        let view = AppViewModel {
            notifications: vec![
                notice(1, vec![EntryAction::Play, EntryAction::Download]),
                notice(2, vec![EntryAction::Play, EntryAction::Download]),
                notice(3, Vec::new()),
            ],
            ..AppViewModel::default()
        };
        assert_eq!(
            to_msg(Command::SaveExisting, &view).unwrap(),
            Msg::NotificationActionClicked {
                id: 2,
                action: NotificationAction::Download
            }
        );
        assert!(to_msg(Command::PlayExisting, &AppViewModel::default()).is_err());
    }
}
