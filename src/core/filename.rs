use regex::Regex;
use std::sync::LazyLock;

pub const MAX_COMPONENT_CHARS: usize = 255;
/// Filesystems count the 255-name limit in bytes.
pub const MAX_COMPONENT_BYTES: usize = 255;

static FORBIDDEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap());

/// Makes `name` usable as a single path component on common filesystems.
///
/// Forbidden characters become `_`, the result is cut to 255 chars (and 255
/// UTF-8 bytes) and any trailing dots or spaces are stripped. Stripping runs
/// after the cut so a truncated name can never end in one.
pub fn sanitize_path_component(name: &str) -> String {
    sanitize_within(name, MAX_COMPONENT_BYTES)
}

fn sanitize_within(name: &str, max_bytes: usize) -> String {
    let replaced = FORBIDDEN_RE.replace_all(name, "_");
    let truncated: String = replaced.chars().take(MAX_COMPONENT_CHARS).collect();
    truncate_to_bytes(&truncated, max_bytes)
        .trim_end_matches(['.', ' '])
        .to_string()
}

fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// `stem.ext` as one component, shortening the stem so the whole name fits.
pub fn file_name(stem: &str, ext: &str) -> String {
    let budget = MAX_COMPONENT_BYTES.saturating_sub(ext.len() + 1);
    format!("{}.{}", sanitize_within(stem, budget), ext)
}

pub fn output_folder_name(author: &str, title: &str, year: i32) -> String {
    sanitize_path_component(&format!("{} - {} [{}] [ogg]", author, title, year))
}

pub fn audio_file_stem(author: &str, title: &str) -> String {
    sanitize_path_component(&format!("{} - {}", author, title))
}
