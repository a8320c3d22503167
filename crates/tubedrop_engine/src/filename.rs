const MAX_LEN: usize = 100;
const FALLBACK: &str = "download.mp3";

/// Safe local filename for a server-provided artifact name.
///
/// Strips path separators and characters Windows refuses, keeps the extension
/// and caps the length at 100 characters.
pub fn local_filename(server_name: &str) -> String {
    // Only the last path component is ever used locally.
    let base = server_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(server_name);

    let mut cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        return FALLBACK.to_string();
    }

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let (stem, ext) = match compacted.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= 5 => {
            (stem.to_string(), format!(".{ext}"))
        }
        _ => (compacted.clone(), String::new()),
    };
    let budget = MAX_LEN.saturating_sub(ext.chars().count());
    let mut stem: String = stem.chars().take(budget).collect();
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    format!("{stem}{ext}")
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
