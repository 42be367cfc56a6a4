/// Drop every line whose trimmed form is empty.
pub fn strip_blank_lines(text: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let text = "\na\n\n  \nb\n";
        assert_eq!(strip_blank_lines(text, false), text);
    }

    #[test]
    fn test_alternating_lines() {
        let result = strip_blank_lines("a\n\nb\n   \nc\n\t\nd", true);
        assert_eq!(result, "a\nb\nc\nd");
    }

    #[test]
    fn test_leading_and_trailing() {
        assert_eq!(strip_blank_lines("\n\n  x = 1\n\n", true), "  x = 1");
    }

    #[test]
    fn test_crlf_blank_lines() {
        assert_eq!(strip_blank_lines("a\r\n\r\nb", true), "a\r\nb");
    }

    #[test]
    fn test_all_blank() {
        assert_eq!(strip_blank_lines("\n \n", true), "");
    }
}
