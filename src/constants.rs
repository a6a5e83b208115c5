use once_cell::sync::Lazy;
use regex::Regex;

/// Message field names shared between the host schema and the parsers
pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_URL: &str = "url";
pub const FIELD_FULL_PATH: &str = "fullPath";
pub const FIELD_RESOURCE: &str = "resource";
pub const FIELD_FLAGS: &str = "flags";
pub const FIELD_AUTHOR_NAME: &str = "authorName";
pub const FIELD_AUTHOR_EMAIL: &str = "authorEmail";
pub const FIELD_MESSAGE: &str = "message";

/// Command subjects the dispatcher accepts
pub const SUBJECT_CLONE: &str = "clone";
pub const SUBJECT_COMMIT: &str = "commit";
pub const SUBJECT_CURRENT_BRANCH: &str = "current-branch";
pub const SUBJECT_GET_BRANCHES: &str = "get-branches";

pub const SUBJECTS: &[&str] = &[
    SUBJECT_CLONE,
    SUBJECT_COMMIT,
    SUBJECT_CURRENT_BRANCH,
    SUBJECT_GET_BRANCHES,
];

/// Branch category bitmask for `get-branches`.
/// Absent `flags` defaults to BRANCH_ALL; zero or unknown bits are rejected.
pub const BRANCH_LOCAL: u32 = 0x1;
pub const BRANCH_REMOTE: u32 = 0x2;
pub const BRANCH_ALL: u32 = BRANCH_LOCAL | BRANCH_REMOTE;

/// Pre-compiled regular expressions for argument validation
/// These are compiled once at first use and cached for performance

/// Matches clone URLs: https://, http://, git://, ssh://, file://,
/// absolute local paths, and scp-like remotes (git@host:path)
pub static RE_CLONE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://|git://|ssh://|file://|/|[A-Za-z0-9._-]+@[A-Za-z0-9._-]+:).+")
        .expect("Invalid regex pattern for clone URL")
});

/// Matches filesystem resource names: flat identifiers, no path separators
/// Examples: fsA, repo-cache, sandbox_1
pub static RE_RESOURCE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$")
        .expect("Invalid regex pattern for resource name")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_accepts_common_schemes() {
        assert!(RE_CLONE_URL.is_match("https://example.com/repo.git"));
        assert!(RE_CLONE_URL.is_match("git://example.com/repo.git"));
        assert!(RE_CLONE_URL.is_match("ssh://git@example.com/repo.git"));
        assert!(RE_CLONE_URL.is_match("git@github.com:user/repo.git"));
        assert!(RE_CLONE_URL.is_match("file:///tmp/repo"));
        assert!(RE_CLONE_URL.is_match("/tmp/source-repo"));
    }

    #[test]
    fn test_clone_url_rejects_garbage() {
        assert!(!RE_CLONE_URL.is_match("not a url"));
        assert!(!RE_CLONE_URL.is_match("relative/path"));
        assert!(!RE_CLONE_URL.is_match(""));
    }

    #[test]
    fn test_resource_name_is_flat() {
        assert!(RE_RESOURCE_NAME.is_match("fsA"));
        assert!(RE_RESOURCE_NAME.is_match("repo-cache_1"));
        assert!(!RE_RESOURCE_NAME.is_match("a/b"));
        assert!(!RE_RESOURCE_NAME.is_match("../escape"));
        assert!(!RE_RESOURCE_NAME.is_match(".hidden"));
        assert!(!RE_RESOURCE_NAME.is_match(""));
    }

    #[test]
    fn test_branch_flag_bits_are_disjoint() {
        assert_eq!(BRANCH_LOCAL & BRANCH_REMOTE, 0);
        assert_eq!(BRANCH_LOCAL | BRANCH_REMOTE, BRANCH_ALL);
    }
}
