//! File-name sanitising for anything a client names.

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Non-ASCII characters are dropped, path separators and runs of whitespace
/// become a single `_`, anything outside `[A-Za-z0-9_.-]` is removed, and
/// leading/trailing `.` and `_` are trimmed. The result never contains a
/// path separator and may be empty.
///
/// ```
/// use edgequake_fileconv::storage::secure_filename;
///
/// assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
/// assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
