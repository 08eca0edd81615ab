/// Substitutions applied, in order, to every header before it becomes a
/// storage column name.
const REPLACEMENTS: [(&str, &str); 9] = [
    (" ", "_"),
    ("-", "_"),
    (".", ""),
    ("/", "_"),
    ("\\", "_"),
    ("(", ""),
    (")", ""),
    ("[", ""),
    ("]", ""),
];

/// Maps a raw header to a column name that can be used as a table column.
///
/// Case is preserved and no trimming happens here; callers trim the raw
/// header first.
pub fn sanitize_column_name(raw: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(raw.to_string(), |name, (from, to)| name.replace(from, to))
}
