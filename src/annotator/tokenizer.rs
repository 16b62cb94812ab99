use crate::error::AnnotateError;
use crate::Token;
use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref WORD_RUN: Regex = Regex::new(r"\w+").unwrap();
}

/// Split on whitespace, keeping punctuation attached to its token.
pub fn whitespace_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (pos, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(Token {
                    end: start + current.chars().count(),
                    text: std::mem::take(&mut current),
                    start,
                });
            }
        } else {
            if current.is_empty() {
                start = pos;
            }
            current.push(ch);
        }
    }

    if !current.is_empty() {
        tokens.push(Token {
            end: start + current.chars().count(),
            text: current,
            start,
        });
    }

    tokens
}

/// Unicode word segments that contain at least one alphanumeric character.
/// Punctuation and whitespace segments are dropped.
pub fn word_tokens(text: &str) -> Vec<Token> {
    let mut cursor = CharCursor::new(text);

    text.split_word_bound_indices()
        .filter(|(_, segment)| segment.chars().any(char::is_alphanumeric))
        .map(|(byte_start, segment)| {
            let start = cursor.advance_to(byte_start);
            Token {
                text: segment.to_string(),
                start,
                end: start + segment.chars().count(),
            }
        })
        .collect()
}

/// Find the `\w+` run containing `offset`, or the nearest one before it.
pub fn word_at(text: &str, offset: usize) -> Result<Token, AnnotateError> {
    let cursor = byte_offset(text, offset).ok_or(AnnotateError::NoWordAtPosition(offset))?;

    let found = WORD_RUN
        .find_iter(text)
        .take_while(|m| m.start() <= cursor)
        .last()
        .ok_or(AnnotateError::NoWordAtPosition(offset))?;

    let start = text[..found.start()].chars().count();
    let word = found.as_str().trim();

    Ok(Token {
        text: word.to_string(),
        start,
        end: start + word.chars().count(),
    })
}

/// The first `\w+` run lying wholly inside the char range `[start, end)`.
/// Leading punctuation in a flagged token is skipped this way.
pub fn word_within(text: &str, start: usize, end: usize) -> Result<Token, AnnotateError> {
    let range = byte_range(text, start, end).ok_or(AnnotateError::InvalidRange {
        start,
        end,
        len: text.chars().count(),
    })?;

    let found = WORD_RUN
        .find_iter(&text[..range.end])
        .find(|m| m.start() >= range.start)
        .ok_or(AnnotateError::NoWordAtPosition(start))?;

    // A run cut by the range end continues past it, so it is a different word.
    if text[found.end()..].chars().next().is_some_and(is_word_char) {
        return Err(AnnotateError::NoWordAtPosition(start));
    }

    let word_start = text[..found.start()].chars().count();
    Ok(Token {
        text: found.as_str().to_string(),
        start: word_start,
        end: word_start + found.as_str().chars().count(),
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte position of the `char_offset`-th character; `text.len()` for the end.
pub fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}

/// Convert a char range into a byte range over `text`.
pub fn byte_range(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    if start > end {
        return None;
    }
    let byte_start = byte_offset(text, start)?;
    let byte_end = byte_start + byte_offset(&text[byte_start..], end - start)?;
    Some(byte_start..byte_end)
}

/// Translates ascending byte offsets into char offsets without rescanning
/// the prefix each time.
pub struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    pub fn advance_to(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokens_keep_punctuation() {
        let tokens = whitespace_tokens("  Hello, world!\tbye ");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello,", "world!", "bye"]);
        assert_eq!((tokens[0].start, tokens[0].end), (2, 8));
        assert_eq!((tokens[2].start, tokens[2].end), (16, 19));
    }

    #[test]
    fn test_word_tokens_strip_punctuation() {
        let tokens = word_tokens("Hello, wörld! don't");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "wörld", "don't"]);
        assert_eq!((tokens[1].start, tokens[1].end), (7, 12));
        assert_eq!(tokens[2].start, 14);
    }

    #[test]
    fn test_word_at_inside_and_after_word() {
        let token = word_at("I has a cat", 3).unwrap();
        assert_eq!(token.text, "has");
        assert_eq!((token.start, token.end), (2, 5));

        // Cursor on the space after "has" resolves to "has".
        let token = word_at("I has a cat", 5).unwrap();
        assert_eq!(token.text, "has");

        // Cursor at the very start of a word selects that word.
        let token = word_at("I has a cat", 8).unwrap();
        assert_eq!(token.text, "cat");
    }

    #[test]
    fn test_word_at_no_word() {
        assert_eq!(word_at("", 0), Err(AnnotateError::NoWordAtPosition(0)));
        assert_eq!(word_at("   ", 2), Err(AnnotateError::NoWordAtPosition(2)));
        assert_eq!(word_at("abc", 9), Err(AnnotateError::NoWordAtPosition(9)));
    }

    #[test]
    fn test_word_within_span() {
        let text = "hello (teh) qqq (zzz";
        let token = word_within(text, 6, 11).unwrap();
        assert_eq!((token.text.as_str(), token.start, token.end), ("teh", 7, 10));

        let token = word_within(text, 16, 20).unwrap();
        assert_eq!((token.text.as_str(), token.start, token.end), ("zzz", 17, 20));

        let token = word_within("ä (öö)", 2, 6).unwrap();
        assert_eq!((token.start, token.end), (3, 5));
    }

    #[test]
    fn test_word_within_rejects_cut_or_missing_words() {
        // "cat" inside "concatenate" is not a word of its own.
        assert_eq!(
            word_within("concatenate", 3, 6),
            Err(AnnotateError::NoWordAtPosition(3))
        );
        assert_eq!(
            word_within("tehran", 0, 3),
            Err(AnnotateError::NoWordAtPosition(0))
        );
        assert_eq!(word_within("a -- b", 2, 4), Err(AnnotateError::NoWordAtPosition(2)));
        assert!(matches!(
            word_within("abc", 2, 8),
            Err(AnnotateError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_byte_range_multibyte() {
        let text = "über cat";
        assert_eq!(byte_range(text, 5, 8), Some(6..9));
        assert_eq!(byte_range(text, 0, 4), Some(0..5));
        assert_eq!(byte_range(text, 3, 2), None);
        assert_eq!(byte_range(text, 0, 9), None);
    }

    #[test]
    fn test_char_cursor() {
        let text = "éé ab";
        let mut cursor = CharCursor::new(text);
        assert_eq!(cursor.advance_to(2), 1);
        assert_eq!(cursor.advance_to(5), 3);
        assert_eq!(cursor.advance_to(0), 0);
    }
}
