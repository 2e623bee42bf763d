/// Visible column count of `text`, ignoring ANSI escape sequences.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Pad `line` with spaces up to `width` columns.
pub(crate) fn pad_to(line: &mut String, width: usize) {
    let mut display = display_width(line);
    while display < width {
        line.push(' ');
        display += 1;
    }
}

/// Drop trailing characters until `line` fits in `width` columns.
pub(crate) fn truncate_to(line: &mut String, width: usize) {
    while display_width(line) > width {
        if line.pop().is_none() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_escape_sequences() {
        assert_eq!(display_width("\u{1b}[1mbold\u{1b}[0m"), 4);
        assert_eq!(display_width("時間"), 4);
    }

    #[test]
    fn pad_and_truncate() {
        let mut line = "ab".to_string();
        pad_to(&mut line, 4);
        assert_eq!(line, "ab  ");
        truncate_to(&mut line, 1);
        assert_eq!(line, "a");
    }
}
