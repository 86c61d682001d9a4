//! Page targeting
//!
//! Decides whether a tab address belongs to the target site. Works directly on
//! string slices; no URL parsing.

/// Target origins, secure first. Each ends with `/` so lookalike hosts such as
/// `www.youtube.com.example` do not match.
pub const TARGET_ORIGINS: [&str; 2] = ["https://www.youtube.com/", "http://www.youtube.com/"];

/// Does `url` start with one of `origins`? The comparison ignores ASCII case.
#[inline]
pub fn matches_origin(url: &str, origins: &[&str]) -> bool {
    let bytes = url.as_bytes();
    origins.iter().any(|origin| {
        let prefix = origin.as_bytes();
        bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
    })
}

/// Is `url` a page on the target site?
#[inline]
pub fn is_target_page(url: &str) -> bool {
    matches_origin(url, &TARGET_ORIGINS)
}
