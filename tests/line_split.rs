// tests/line_split.rs

use proptest::prelude::*;

use bgrun::capture::split_lines;

#[test]
fn empty_lines_survive_splitting() {
    assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
    assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
    assert_eq!(split_lines("\n\na"), vec!["", "", "a"]);
    assert_eq!(split_lines("a"), vec!["a"]);
    assert_eq!(split_lines("\n"), vec![""]);
    assert!(split_lines("").is_empty());
}

#[test]
fn carriage_returns_are_kept() {
    assert_eq!(split_lines("a\r\nb\r\n"), vec!["a\r", "b\r"]);
}

// Lines without newlines, possibly empty.
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-z \t]{0,8}"
}

proptest! {
    /// Writing lines newline-terminated and splitting them again gives back
    /// exactly the same lines, empty ones included.
    #[test]
    fn terminated_lines_split_back_exactly(
        lines in proptest::collection::vec(line_strategy(), 1..20)
    ) {
        let mut raw = String::new();
        for line in &lines {
            raw.push_str(line);
            raw.push('\n');
        }
        prop_assert_eq!(split_lines(&raw), lines);
    }

    /// An unterminated final line is still a line.
    #[test]
    fn unterminated_tail_is_kept(
        lines in proptest::collection::vec(line_strategy(), 1..20)
    ) {
        let raw = lines.join("\n");
        let split = split_lines(&raw);
        if raw.is_empty() {
            prop_assert!(split.is_empty());
        } else if raw.ends_with('\n') {
            // The last generated line was empty, so its terminator is the
            // final newline.
            prop_assert_eq!(split.len(), lines.len() - 1);
        } else {
            prop_assert_eq!(split, lines);
        }
    }
}
