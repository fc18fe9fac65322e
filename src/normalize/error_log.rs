//! Deterministic rendering of pytype error logs.
//!
//! pytype orders its errors by line number but the order of several errors on
//! the same line changes from run to run, and the free-text details attached
//! to some errors do too. The analysis session deduplicates each log with
//! pytype's own `unique_sorted_errors`, blanks the details and sends pytype's
//! rendering of every error. [`enforce_consistent_order`] then turns that log
//! into text that is identical for identical input.

use serde::Deserialize;
use std::cmp::Ordering;

/// One entry of a pytype error log, already rendered by pytype.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PytypeError {
    #[serde(default)]
    pub lineno: u32,
    pub message: String,
    /// pytype's own `str(error)` with the details cleared. Multi-line
    /// messages and "Called from (traceback)" blocks are kept verbatim.
    pub text: String,
}

/// A deduplicated pytype error log in pytype's file-then-line order.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    errors: Vec<PytypeError>,
}

impl ErrorLog {
    pub fn new(errors: Vec<PytypeError>) -> Self {
        Self { errors }
    }
}

/// Line ascending, then message descending.
fn consistent_order(left: &PytypeError, right: &PytypeError) -> Ordering {
    left.lineno
        .cmp(&right.lineno)
        .then_with(|| right.message.cmp(&left.message))
}

pub fn enforce_consistent_order(log: &ErrorLog) -> String {
    let mut errors: Vec<&PytypeError> = log.errors.iter().collect();
    errors.sort_by(|left, right| consistent_order(left, right));

    let rendered: Vec<&str> = errors.iter().map(|error| error.text.as_str()).collect();
    format!("{}\n", rendered.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::{enforce_consistent_order, ErrorLog, PytypeError};

    fn error(lineno: u32, message: &str) -> PytypeError {
        PytypeError {
            lineno,
            message: message.to_string(),
            text: format!(
                "File \"case.py\", line {}, in <module>: {} [annotation-type-mismatch]",
                lineno, message
            ),
        }
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn same_line_ties_break_on_descending_message() {
        let log = ErrorLog::new(vec![error(4, "A: foo"), error(4, "B: bar")]);
        let text = enforce_consistent_order(&log);
        let ordered = lines(&text);
        assert!(ordered[0].contains("B: bar"));
        assert!(ordered[1].contains("A: foo"));
    }

    #[test]
    fn lower_line_always_sorts_first() {
        let log = ErrorLog::new(vec![error(10, "A: early alphabet"), error(5, "Z: late alphabet")]);
        let text = enforce_consistent_order(&log);
        let ordered = lines(&text);
        assert!(ordered[0].contains("line 5"));
        assert!(ordered[1].contains("line 10"));
    }

    #[test]
    fn output_is_independent_of_log_order() {
        let first = vec![error(7, "m1"), error(7, "m3"), error(2, "m2"), error(7, "m2")];
        let second: Vec<PytypeError> = first.iter().rev().cloned().collect();

        let left = enforce_consistent_order(&ErrorLog::new(first));
        let right = enforce_consistent_order(&ErrorLog::new(second));
        assert_eq!(left, right);
        let ordered = lines(&left);
        assert!(ordered[0].contains("line 2, in <module>: m2"));
        assert!(ordered[1].contains("m3"));
        assert!(ordered[2].contains("line 7, in <module>: m2"));
        assert!(left.ends_with("m1 [annotation-type-mismatch]\n"));
    }

    #[test]
    fn rendered_text_is_kept_verbatim() {
        let multi_line = PytypeError {
            lineno: 3,
            message: "first\nsecond".to_string(),
            text: "Line 3, in f: first\n  second [bad-return-type]".to_string(),
        };
        let with_traceback = PytypeError {
            lineno: 1,
            message: "unsupported operand".to_string(),
            text: "File \"case.py\", line 1, in f: unsupported operand [unsupported-operands]\nCalled from (traceback):\n  line 9, in current file".to_string(),
        };

        assert_eq!(
            enforce_consistent_order(&ErrorLog::new(vec![multi_line, with_traceback])),
            "File \"case.py\", line 1, in f: unsupported operand [unsupported-operands]\n\
             Called from (traceback):\n  line 9, in current file\n\
             Line 3, in f: first\n  second [bad-return-type]\n"
        );
    }

    #[test]
    fn empty_log_renders_single_newline() {
        assert_eq!(enforce_consistent_order(&ErrorLog::default()), "\n");
    }
}
