use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use tubedrop_core::{
    AppViewModel, LibraryRowView, LibraryView, NotificationId, ProgressPhase, ProgressView,
    Severity, INVALID_INPUT_MESSAGE,
};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% {msg}";

/// Prints the parts of the view that changed since the previous render.
#[derive(Default)]
pub struct TerminalRenderer {
    last: AppViewModel,
    shown_notifications: HashSet<NotificationId>,
    /// Bar for the job currently shown, keyed by job id.
    bar: Option<(String, ProgressBar)>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) {
        let lines = changed_lines(&self.last, view, &self.shown_notifications);
        self.shown_notifications = view.notifications.iter().map(|n| n.id).collect();
        self.print(&lines);
        self.update_bar(view.progress.as_ref());
        self.last = view.clone();
    }

    /// Print text outside the diff, such as help or command errors.
    pub fn say(&self, text: &str) {
        self.print(&[text.to_string()]);
    }

    fn print(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let write = || {
            for line in lines {
                println!("{line}");
            }
        };
        match &self.bar {
            Some((_, bar)) => bar.suspend(write),
            None => write(),
        }
    }

    fn update_bar(&mut self, progress: Option<&ProgressView>) {
        let same_job = matches!(
            (&self.bar, progress),
            (Some((job_id, _)), Some(p)) if *job_id == p.job_id
        );
        if !same_job {
            if let Some((_, bar)) = self.bar.take() {
                bar.finish_and_clear();
            }
        }
        let Some(progress) = progress else {
            return;
        };

        let (_, bar) = self
            .bar
            .get_or_insert_with(|| (progress.job_id.clone(), new_bar()));
        bar.set_position(progress.percent.clamp(0.0, 100.0) as u64);
        bar.set_message(progress.label.clone());
        match progress.phase {
            ProgressPhase::Running => {}
            ProgressPhase::Completed if !bar.is_finished() => {
                bar.finish_with_message(progress.label.clone());
            }
            ProgressPhase::Failed if !bar.is_finished() => {
                bar.abandon_with_message(progress.label.clone());
            }
            _ => {}
        }
    }
}

fn new_bar() -> ProgressBar {
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let bar = ProgressBar::new(100);
    bar.set_style(style);
    bar
}

/// Lines describing how `view` differs from `prev`.
pub fn changed_lines(
    prev: &AppViewModel,
    view: &AppViewModel,
    shown_notifications: &HashSet<NotificationId>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if view.cookies_available != prev.cookies_available {
        match view.cookies_available {
            Some(true) => lines.push("Server cookies: available".to_string()),
            Some(false) => lines.push(
                "Server cookies: missing (sign-in restricted videos will fail)".to_string(),
            ),
            None => {}
        }
    }

    if view.input != prev.input && !view.input.trim().is_empty() && !view.url_valid {
        lines.push(INVALID_INPUT_MESSAGE.to_string());
    }

    if view.info_loading && !prev.info_loading {
        lines.push("Fetching video info...".to_string());
    }

    if view.preview != prev.preview {
        if let Some(preview) = &view.preview {
            lines.push(format!("  {}", preview.title));
            lines.push(format!(
                "  by {} | {} | {} views",
                preview.uploader, preview.duration, preview.views
            ));
            if preview.already_downloaded {
                lines.push("  (already in your downloads)".to_string());
            }
            if view.download_enabled {
                lines.push("  Type `download` to convert it to mp3.".to_string());
            }
        }
    }

    if view.library != prev.library || view.player != prev.player {
        lines.extend(library_lines(&view.library));
    }

    if view.library_error != prev.library_error {
        if let Some(error) = &view.library_error {
            lines.push(format!("Could not load downloads: {error}"));
        }
    }

    if view.player != prev.player {
        match &view.player {
            Some(player) => lines.push(format!("Now playing: {} (`stop` to end)", player.filename)),
            None if prev.player.is_some() => lines.push("Playback stopped.".to_string()),
            None => {}
        }
    }

    if view.pending_delete != prev.pending_delete {
        if let Some(filename) = &view.pending_delete {
            lines.push(format!("Delete \"{filename}\" from the server? [yes/no]"));
        }
    }

    for notification in &view.notifications {
        if shown_notifications.contains(&notification.id) {
            continue;
        }
        let marker = match notification.severity {
            Severity::Info => "i",
            Severity::Success => "+",
            Severity::Error => "!",
        };
        let mut line = format!("[{marker}] #{} {}", notification.id, notification.text);
        if !notification.actions.is_empty() {
            line.push_str("  (`play-existing` / `save-existing`)");
        }
        lines.push(line);
    }

    lines
}

fn library_lines(library: &LibraryView) -> Vec<String> {
    match library {
        LibraryView::Loading => vec!["Loading downloads...".to_string()],
        LibraryView::Empty => vec!["No downloads yet.".to_string()],
        LibraryView::Entries(rows) => {
            let mut lines = vec![format!("Downloads ({}):", rows.len())];
            lines.extend(rows.iter().map(row_line));
            lines
        }
    }
}

fn row_line(row: &LibraryRowView) -> String {
    let marker = if row.playing { '>' } else { ' ' };
    let duration = row.duration.as_deref().unwrap_or("--:--");
    format!(
        "{marker}{:>3}. {}  [{} | {} | {}]",
        row.index, row.name, duration, row.size, row.modified
    )
}
