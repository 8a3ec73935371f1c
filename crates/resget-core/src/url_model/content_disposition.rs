//! Content-Disposition filename extraction.

const MARKER: &str = "filename=";

/// Extracts the filename from a raw Content-Disposition header value.
///
/// Takes the text after the first `filename=` marker (matched
/// case-insensitively), up to the next `;` that is not inside quotes, and
/// removes one pair of surrounding double quotes. `filename*=` parameters do
/// not match the marker. Returns `None` when the marker is missing or the
/// value is empty.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    let start = header_value.to_ascii_lowercase().find(MARKER)? + MARKER.len();
    let rest = &header_value[start..];

    let mut in_quotes = false;
    let mut end = rest.len();
    for (i, c) in rest.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                end = i;
                break;
            }
            _ => {}
        }
    }

    let value = rest[..end].trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
