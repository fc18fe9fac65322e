use crate::models::DiagnosticReport;

/// Groups `file:...` style output by its leading segment.
///
/// Every line is kept, including ones that do not start with a file name:
/// those key under whatever precedes the first colon, or the whole trimmed
/// line when there is none. The trailing empty segment after the final
/// newline is kept as well and lands under `""`.
pub fn collect(stdout: &str) -> DiagnosticReport {
    let mut report = DiagnosticReport::new();
    for line in stdout.split('\n') {
        report.append(file_key(line), &format!("{}\n", line));
    }
    report
}

fn file_key(line: &str) -> &str {
    line.split(':').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::collect;

    #[test]
    fn accumulates_lines_per_file_in_order() {
        let report = collect(
            "bad.py:3: error: Incompatible types  [assignment]\n\
             other.py:1: error: Name \"x\" is not defined  [name-defined]\n\
             bad.py:9: note: Revealed type is \"int\"\n",
        );

        assert_eq!(
            report.get("bad.py"),
            Some("bad.py:3: error: Incompatible types  [assignment]\nbad.py:9: note: Revealed type is \"int\"\n")
        );
        assert_eq!(
            report.get("other.py"),
            Some("other.py:1: error: Name \"x\" is not defined  [name-defined]\n")
        );
    }

    #[test]
    fn keeps_lines_without_a_file_prefix() {
        let report = collect("bad.py:3:1 Something [9]\nFound 1 error in 1 file (checked 2 source files)\n");

        assert_eq!(
            report.get("Found 1 error in 1 file (checked 2 source files)"),
            Some("Found 1 error in 1 file (checked 2 source files)\n")
        );
        assert_eq!(report.get(""), Some("\n"));
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn empty_output_still_yields_the_empty_key() {
        let report = collect("");
        assert_eq!(report.get(""), Some("\n"));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn trims_the_file_segment() {
        let report = collect("  spaced.py :1: error\n");
        assert_eq!(report.get("spaced.py"), Some("  spaced.py :1: error\n"));
    }
}
