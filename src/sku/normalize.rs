//! Name matching that tolerates casing and separator drift.
//!
//! The catalog spells the same capability or location differently across
//! regions and API versions (`EastUS`, `east_us`, `East US`). Every lookup in
//! the accessor compares through [`names_match`].

// Characters dropped before comparing.
const SEPARATORS: &[char] = &['_', '-', ' ', '.'];

/// Lower-case `value` and strip separator characters.
pub fn normalize(value: &str) -> String {
    normalized_chars(value).collect()
}

/// Returns true when both strings are equal after [`normalize`].
pub fn names_match(left: &str, right: &str) -> bool {
    normalized_chars(left).eq(normalized_chars(right))
}

fn normalized_chars(value: &str) -> impl Iterator<Item = char> + '_ {
    value
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .flat_map(char::to_lowercase)
}
