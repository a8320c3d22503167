use std::borrow::Cow;

use url::Url;

const WATCH_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];
const SHORT_HOST: &str = "youtu.be";
const VIDEO_ID_LEN: usize = 11;

/// Best-effort check that `input` looks like a YouTube video link.
///
/// Accepts `watch?v=` links on the main, mobile and music hosts, `youtu.be`
/// short links and `/embed/` links. A missing scheme is tolerated.
pub fn is_supported_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return false;
    }

    let candidate: Cow<'_, str> = if trimmed.contains("://") {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("https://{trimmed}"))
    };
    let Ok(url) = Url::parse(&candidate) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };

    let mut segments = url.path_segments().into_iter().flatten();
    if host == SHORT_HOST {
        return segments.next().is_some_and(is_video_id);
    }
    if !WATCH_HOSTS.contains(&host) {
        return false;
    }

    match (segments.next(), segments.next()) {
        (Some("watch"), _) => url
            .query_pairs()
            .any(|(key, value)| key == "v" && is_video_id(&value)),
        (Some("embed"), Some(id)) => is_video_id(id),
        _ => false,
    }
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
