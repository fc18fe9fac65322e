/// First non-empty line of a version query, trimmed.
pub fn first_line(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// The line carrying `label`, or the first non-empty line when none does.
pub fn labelled_line(raw: &str, label: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| line.contains(label))
        .map(str::to_string)
        .unwrap_or_else(|| first_line(raw))
}

/// Drops a parenthesized build annotation: `1.2.3 (compiled: yes)` -> `1.2.3`.
pub fn strip_build_metadata(version: &str) -> String {
    version
        .split(" (")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Replaces a vendor label such as `Client version:` with the tool name.
pub fn replace_label(version: &str, label: &str, tool: &str) -> String {
    version.replace(label, tool).trim().to_string()
}

/// Prefixes a bare version number with the tool name.
pub fn with_tool_prefix(version: &str, tool: &str) -> String {
    format!("{} {}", tool, version.trim())
}

#[cfg(test)]
mod tests {
    use super::{first_line, labelled_line, replace_label, strip_build_metadata, with_tool_prefix};

    #[test]
    fn strips_parenthesized_suffix() {
        assert_eq!(strip_build_metadata("1.2.3 (compiled)"), "1.2.3");
        assert_eq!(strip_build_metadata("mypy 1.8.0 (compiled: yes)"), "mypy 1.8.0");
        assert_eq!(strip_build_metadata("mypy 1.8.0"), "mypy 1.8.0");
    }

    #[test]
    fn replaces_client_version_label() {
        assert_eq!(replace_label("Client version: 0.9", "Client version:", "pyre"), "pyre 0.9");
    }

    #[test]
    fn picks_the_labelled_line() {
        let raw = "Binary version: 0.9.23\nClient version: 0.9.23\n";
        assert_eq!(labelled_line(raw, "Client version:"), "Client version: 0.9.23");
        assert_eq!(labelled_line("0.9.23\n", "Client version:"), "0.9.23");
    }

    #[test]
    fn prefixes_bare_versions() {
        assert_eq!(with_tool_prefix("2024.10.11\n", "pytype"), "pytype 2024.10.11");
    }

    #[test]
    fn keeps_first_non_empty_line() {
        assert_eq!(first_line("\n  pyright 1.1.390 \nnode v20\n"), "pyright 1.1.390");
        assert_eq!(first_line(""), "");
    }
}
