//! Exported field names for JSON argument binding.

/// Words recognized at the start of a name, with their exported spelling.
/// The image formats are recognized but keep ordinary capitalization.
const WORD_TABLE: [(&str, &str); 11] = [
    ("id", "ID"),
    ("api", "API"),
    ("html", "HTML"),
    ("http", "HTTP"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("uuid", "UUID"),
    ("csv", "CSV"),
    ("png", "Png"),
    ("jpeg", "Jpeg"),
    ("tiff", "Tiff"),
];

/// Exported (capitalized) field name for an argument name.
///
/// A table word matches case-insensitively only as a whole-word prefix: the
/// whole name, or followed by an upper-case letter, a digit or `_`.
/// Otherwise only the first character is upper-cased.
///
/// `apiKey` → `APIKey`, `documentId` → `DocumentId`, `id` → `ID`, `idle` → `Idle`.
pub fn exported_field_name(name: &str) -> String {
    for (word, exported) in WORD_TABLE {
        let Some(prefix) = name.get(..word.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(word) {
            continue;
        }
        let rest = &name[word.len()..];
        let whole_word = rest
            .chars()
            .next()
            .map_or(true, |c| c.is_uppercase() || c.is_ascii_digit() || c == '_');
        if whole_word {
            return format!("{exported}{rest}");
        }
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
