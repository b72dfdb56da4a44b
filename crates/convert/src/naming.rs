//! Output file naming.
//!
//! One file per `(document id, section)`: `{sanitize(doc_id)}_{sanitize(section)}.json`.

/// File label used when sections are not split out.
pub const COMBINED: &str = "combined";

/// Extension of persisted documents.
pub const OUTPUT_EXTENSION: &str = "json";

/// Lowercase, collapse runs outside `[a-z0-9_-]` to `_`, trim `_`.
///
/// An empty result becomes `"unknown"`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_gap = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            if pending_gap {
                out.push('_');
                pending_gap = false;
            }
            out.push(c);
        } else {
            pending_gap = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File stem for one output document.
pub fn output_stem(doc_id: &str, section: &str) -> String {
    format!("{}_{}", sanitize_name(doc_id), sanitize_name(section))
}

/// File name for one output document.
pub fn output_file_name(doc_id: &str, section: &str) -> String {
    format!("{}.{}", output_stem(doc_id, section), OUTPUT_EXTENSION)
}
