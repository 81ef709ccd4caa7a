//! Reserved value namespace for internal markers.
//!
//! Any value starting with [`SENTINEL_PREFIX`] skips type validation in both
//! directions, so markers such as [`ABSENT`] can travel through typed columns.

pub const SENTINEL_PREFIX: &str = "$$";

/// Marks a value as logically absent; stored as SQL NULL.
pub const ABSENT: &str = "$$absent";

pub fn is_sentinel(value: &str) -> bool {
    value.starts_with(SENTINEL_PREFIX)
}

pub fn sentinel(name: &str) -> String {
    format!("{SENTINEL_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_prefix() {
        assert!(is_sentinel(ABSENT));
        assert!(is_sentinel(&sentinel("suppressed")));
        assert!(!is_sentinel("$5"));
        assert!(!is_sentinel("absent"));
    }
}
