//! Display labels derived from file and directory names.
//!
//! Every label a reader sees comes from the filesystem. A document's title is
//! its file name with the extension removed; a directory group's label is its
//! key relative to the input root. Both get their first character upper-cased
//! once, for display only. Keys used for grouping, lookups and links keep their
//! original spelling.
//!
//! - `getting-started.md` → "Getting-started"
//! - `sub` → "Sub"
//! - `api/v2` → "Api/v2"
//! - `Ünïcode.md` → "Ünïcode"

/// Upper-case the first character, leaving the rest untouched.
///
/// Multi-codepoint upper-case mappings (`ß` → `SS`) are kept whole.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// File name without its last extension.
///
/// Names with no extension, or whose only dot is the leading one, are
/// returned unchanged.
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Title shown for a document: stem with the first character capitalized.
pub fn display_name(file_name: &str) -> String {
    capitalize_first(file_stem(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_lowercase_word() {
        assert_eq!(capitalize_first("sub"), "Sub");
    }

    #[test]
    fn already_capitalized_is_unchanged() {
        assert_eq!(capitalize_first("Guides"), "Guides");
    }

    #[test]
    fn only_first_character_changes() {
        assert_eq!(capitalize_first("api/v2"), "Api/v2");
        assert_eq!(capitalize_first("hELLO"), "HELLO");
    }

    #[test]
    fn empty_string() {
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn non_ascii_first_character() {
        assert_eq!(capitalize_first("über"), "Über");
        assert_eq!(capitalize_first("ßtraße"), "SStraße");
    }

    #[test]
    fn digits_are_left_alone() {
        assert_eq!(capitalize_first("010-intro"), "010-intro");
    }

    #[test]
    fn stem_strips_last_extension_only() {
        assert_eq!(file_stem("notes.md"), "notes");
        assert_eq!(file_stem("archive.tar.md"), "archive.tar");
    }

    #[test]
    fn stem_without_extension() {
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn stem_of_dotfile_is_whole_name() {
        assert_eq!(file_stem(".md"), ".md");
    }

    #[test]
    fn display_name_from_file_name() {
        assert_eq!(display_name("getting-started.md"), "Getting-started");
        assert_eq!(display_name("b.md"), "B");
    }
}
