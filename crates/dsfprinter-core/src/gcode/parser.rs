//! Line parser for the serial G-code protocol

use super::command::{CodeLetter, ParsedCommand};

const COMMENT_MARKER: char = ';';
const CHECKSUM_MARKER: char = '*';

/// Parse one protocol line.
///
/// Everything from the first `;` on is the comment. The rest is split at the
/// first `*`; the trimmed suffix is the checksum. The remaining words are
/// classified by their first character: a word starting with `M`, `G`, `F`
/// or `T` becomes the command (a later one replaces an earlier one), any
/// other word becomes a parameter keyed by its first character.
///
/// Never fails. A checksum that is not a non-negative integer reads as 0.
pub fn parse_line(line: &str) -> ParsedCommand {
    tracing::trace!("parse_line line={:?}", line);
    let mut parsed = ParsedCommand::default();

    let body = match line.split_once(COMMENT_MARKER) {
        Some((body, comment)) => {
            parsed.comment = Some(format!("{}{}", COMMENT_MARKER, comment));
            body
        }
        None => line,
    };

    let words = match body.split_once(CHECKSUM_MARKER) {
        Some((words, checksum)) => {
            let checksum = checksum.trim();
            parsed.checksum = checksum.parse().unwrap_or_else(|_| {
                tracing::debug!("parse_line ignoring malformed checksum {:?}", checksum);
                0
            });
            words
        }
        None => body,
    };

    for word in words.split_whitespace() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };

        match CodeLetter::from_char(first) {
            Some(code) => {
                parsed.code = Some(code);
                parsed.command = Some(word.to_string());
            }
            None => {
                parsed.args.insert(first, chars.as_str().to_string());
            }
        }
    }

    tracing::trace!("parse_line -> {}", parsed);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_checksum_and_comment() {
        let parsed =
            parse_line("N-1 M115 X10*13 ; Comments should be allowed to include * and other stuff");
        assert_eq!(parsed.code(), Some(CodeLetter::M));
        assert_eq!(parsed.command(), Some("M115"));
        assert_eq!(parsed.checksum(), 13);
        assert_eq!(
            parsed.comment(),
            Some("; Comments should be allowed to include * and other stuff")
        );
        assert_eq!(parsed.arg('N'), Some("-1"));
        assert_eq!(parsed.arg('X'), Some("10"));
    }

    #[test]
    fn test_bare_command() {
        let parsed = parse_line("M114");
        assert_eq!(parsed.code(), Some(CodeLetter::M));
        assert_eq!(parsed.command(), Some("M114"));
        assert_eq!(parsed.checksum(), 0);
        assert!(parsed.comment().is_none());
        assert!(parsed.args().is_empty());
    }

    #[test]
    fn test_line_number_is_an_argument() {
        let parsed = parse_line("N-1 M110 N0*125\n");
        assert_eq!(parsed.code(), Some(CodeLetter::M));
        assert_eq!(parsed.command(), Some("M110"));
        assert_eq!(parsed.checksum(), 125);
        assert!(parsed.comment().is_none());
        // the second N word overwrites the first
        assert_eq!(parsed.arg('N'), Some("0"));
    }

    #[test]
    fn test_last_command_word_wins() {
        let parsed = parse_line("G28 M104 S200");
        assert_eq!(parsed.code(), Some(CodeLetter::M));
        assert_eq!(parsed.command(), Some("M104"));
        assert_eq!(parsed.arg('S'), Some("200"));
    }

    #[test]
    fn test_feed_and_tool_words_are_commands() {
        assert_eq!(parse_line("T1").code(), Some(CodeLetter::T));
        assert_eq!(parse_line("F3000").command(), Some("F3000"));
    }

    #[test]
    fn test_lowercase_letters_are_arguments() {
        let parsed = parse_line("m105");
        assert!(parsed.code().is_none());
        assert_eq!(parsed.arg('m'), Some("105"));
    }

    #[test]
    fn test_malformed_checksum_defaults_to_zero() {
        let parsed = parse_line("M105*abc");
        assert_eq!(parsed.command(), Some("M105"));
        assert_eq!(parsed.checksum(), 0);
    }

    #[test]
    fn test_empty_and_comment_only_lines() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("   \r\n").is_empty());

        let parsed = parse_line("; just a comment");
        assert!(parsed.command().is_none());
        assert_eq!(parsed.comment(), Some("; just a comment"));
    }

    #[test]
    fn test_checksum_marker_inside_comment_is_ignored() {
        let parsed = parse_line("G1 X5 ; move*42");
        assert_eq!(parsed.checksum(), 0);
        assert_eq!(parsed.comment(), Some("; move*42"));
    }

    #[test]
    fn test_display() {
        let parsed = parse_line("M104 S200 T0*7 ;heat");
        assert_eq!(
            parsed.to_string(),
            "ParsedCommand(code=T, command=T0, args={S: \"200\"}, comment=;heat, checksum=7)"
        );
    }
}
