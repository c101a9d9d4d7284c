//! Helpers for the free-text search boxes on list pages.
//!
//! A search query is split on whitespace and every term must match one of
//! the searched columns. Matching uses SQLite's `LIKE`, which ignores case
//! for ASCII letters only.

/// Split a search query into terms.
pub fn search_terms(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Build a `LIKE` pattern that matches `term` anywhere in a column.
///
/// `%`, `_` and `\` in `term` are escaped, so the pattern must be used with
/// `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');

    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

/// A `WHERE` clause fragment requiring `term` to match at least one of
/// `columns`, using the numbered parameter `?{param_index}` for the pattern.
pub fn any_column_like(columns: &[&str], param_index: usize) -> String {
    let predicates = columns
        .iter()
        .map(|column| format!("{column} LIKE ?{param_index} ESCAPE '\\'"))
        .collect::<Vec<_>>();

    format!("({})", predicates.join(" OR "))
}
