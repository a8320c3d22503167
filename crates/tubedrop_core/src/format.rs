//! Display formatting for counts, durations and sizes.

/// Compact view count: `999`, `1.5K`, `2.3M`, `4.0B`.
///
/// A value that rounds up to 1000 of one unit is shown in the next unit.
pub fn format_view_count(count: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e3, "K"), (1e6, "M"), (1e9, "B")];
    if count < 1_000 {
        return count.to_string();
    }
    let mut label = String::new();
    for (scale, suffix) in UNITS {
        let rounded = (count as f64 / scale * 10.0).round() / 10.0;
        label = format!("{rounded:.1}{suffix}");
        if rounded < 1000.0 {
            break;
        }
    }
    label
}

/// `MM:SS`, or `HH:MM:SS` once the duration reaches an hour.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < KB * KB {
        format!("{:.1} KB", value / KB)
    } else if value < KB * KB * KB {
        format!("{:.1} MB", value / (KB * KB))
    } else {
        format!("{:.1} GB", value / (KB * KB * KB))
    }
}
