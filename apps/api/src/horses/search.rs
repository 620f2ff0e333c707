use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases and strips accents so "Élégance" and "elegance" compare equal.
pub fn fold_for_search(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Substring match on the folded forms. A blank query matches everything.
pub fn matches_query(display_name: &str, query: &str) -> bool {
    let query = fold_for_search(query.trim());
    query.is_empty() || fold_for_search(display_name).contains(&query)
}
