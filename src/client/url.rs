//! Base URL normalization and joining.

/// Strip every trailing `/` from a base URL.
pub fn normalize_base_url(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// Join `base` and `path` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", normalize_base_url(base), path.trim_start_matches('/'))
}
