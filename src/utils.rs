/// Extracts a playlist ID from user input.
///
/// Accepts bare IDs, `spotify:playlist:<id>` URIs and
/// `https://open.spotify.com/playlist/<id>` links (query strings are ignored).
pub fn parse_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some(input.to_string());
    }

    input.match_indices("playlist").find_map(|(i, m)| {
        let rest = &input[i + m.len()..];
        let rest = rest.strip_prefix('/').or_else(|| rest.strip_prefix(':'))?;
        let id: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        (!id.is_empty()).then_some(id)
    })
}

/// Formats a track duration as `m:ss`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = (duration_ms as f64 / 1000.0).round() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Formats a total play time as `1h 05m`, or `5m` below one hour.
pub fn format_total_duration(duration_ms: u64) -> String {
    let total_mins = duration_ms / 60_000;
    let (hours, mins) = (total_mins / 60, total_mins % 60);
    if hours > 0 {
        format!("{}h {:02}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
