//! Identifier translation between exported field names and form keys.

/// Converts an exported-style identifier (`UserId`, `HTTPServer`) to its
/// wire-key form (`user_id`, `http_server`).
///
/// An underscore goes before an uppercase letter that follows a lowercase
/// letter or digit, and before the last capital of an acronym when a
/// lowercase letter comes next.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym = prev != '_' && next_is_lower;
            if after_word || ends_acronym {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
