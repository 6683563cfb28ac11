//! Shared helpers for adapter-layer validation.

/// Returns `true` if `name` is a plain file name: non-empty, no path
/// separators, no parent-directory component, no control characters.
///
/// Used by the export adapter before joining a name onto its directory.
pub(super) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}
