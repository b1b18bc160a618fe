//! Streaming lexer for compact path data.
//!
//! Numbers may be packed with no separators at all: a sign always starts a
//! new number unless it follows an exponent marker, and a decimal point
//! starts a new number once the current one already holds one. So
//! `10-5` lexes as `10, -5` and `-3.41.81` as `-3.41, .81`.

use crate::error::MalformedPathError;

/// Command letters understood by the parser.
pub const COMMANDS: &[u8] = b"MmLlHhVvCcSsQqTtAaZz";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Command(char),
    Number(f64),
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// True once only separators remain.
    pub fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.src.len()
    }

    /// True when the next token starts a number.
    pub fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(b'0'..=b'9' | b'+' | b'-' | b'.'))
    }

    /// True when a command letter is next, without consuming it.
    pub fn command_ahead(&mut self) -> bool {
        self.skip_separators();
        self.peek().map_or(false, |b| COMMANDS.contains(&b))
    }

    /// Consume a command letter if one is next.
    pub fn command(&mut self) -> Option<char> {
        self.skip_separators();
        let b = self.peek()?;
        if COMMANDS.contains(&b) {
            self.pos += 1;
            Some(b as char)
        } else {
            None
        }
    }

    /// The character at the cursor, for error reporting.
    pub fn unexpected(&mut self) -> MalformedPathError {
        self.skip_separators();
        let offset = self.pos;
        let ch = std::str::from_utf8(&self.src[offset..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or('\u{fffd}');
        MalformedPathError::UnexpectedCharacter { ch, offset }
    }

    /// Lex one number.
    pub fn number(&mut self) -> Result<f64, MalformedPathError> {
        self.skip_separators();
        let start = self.pos;

        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int_digits = self.digits();
        let mut frac_digits = 0;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            frac_digits = self.digits();
        }
        if int_digits + frac_digits == 0 {
            return Err(if self.pos == start {
                self.unexpected()
            } else {
                MalformedPathError::InvalidNumber {
                    text: self.text(start),
                    offset: start,
                }
            });
        }

        // Only take the exponent when digits follow, so a stray 'e' is
        // reported as an unexpected character rather than swallowed.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                self.pos = mark;
            }
        }

        let text = self.text(start);
        text.parse::<f64>()
            .map_err(|_| MalformedPathError::InvalidNumber {
                text: text.clone(),
                offset: start,
            })
    }

    /// Lex an elliptical-arc flag: a single `0` or `1`, which may be
    /// immediately followed by the next operand.
    pub fn flag(&mut self) -> Result<bool, MalformedPathError> {
        self.skip_separators();
        let offset = self.pos;
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(MalformedPathError::InvalidFlag { offset }),
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }
}

/// Split path data into command and number tokens.
///
/// Arc flags are lexed as ordinary numbers here; the parser lexes them
/// separately because packed flags (`0110`) only make sense in context.
pub fn tokenize(src: &str) -> Result<Vec<Token>, MalformedPathError> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    while !lexer.at_end() {
        if let Some(cmd) = lexer.command() {
            tokens.push(Token::Command(cmd));
        } else if lexer.at_number() {
            tokens.push(Token::Number(lexer.number()?));
        } else {
            return Err(lexer.unexpected());
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(src: &str) -> Vec<f64> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Number(n) => Some(n),
                Token::Command(_) => None,
            })
            .collect()
    }

    #[test]
    fn second_decimal_point_starts_new_number() {
        assert_eq!(numbers("-3.41.81"), vec![-3.41, 0.81]);
        assert_eq!(numbers("1.5.5.5"), vec![1.5, 0.5, 0.5]);
    }

    #[test]
    fn sign_starts_new_number() {
        assert_eq!(numbers("10-5+3"), vec![10.0, -5.0, 3.0]);
    }

    #[test]
    fn exponent_keeps_its_sign() {
        assert_eq!(numbers("1e-2-4E+1"), vec![0.01, -40.0]);
    }

    #[test]
    fn commands_and_separators() {
        let tokens = tokenize("M1,2L 3\t4z").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Command('M'),
                Token::Number(1.0),
                Token::Number(2.0),
                Token::Command('L'),
                Token::Number(3.0),
                Token::Number(4.0),
                Token::Command('z'),
            ]
        );
    }

    #[test]
    fn lone_sign_is_invalid_number() {
        let err = tokenize("M-").unwrap_err();
        assert_eq!(
            err,
            MalformedPathError::InvalidNumber {
                text: "-".into(),
                offset: 1
            }
        );
    }

    #[test]
    fn unknown_letter_is_reported_with_offset() {
        let err = tokenize("M 1 2 X").unwrap_err();
        assert_eq!(err, MalformedPathError::UnexpectedCharacter { ch: 'X', offset: 6 });
    }

    #[test]
    fn flags_lex_one_digit_at_a_time() {
        let mut lexer = Lexer::new("0110.5");
        assert!(!lexer.flag().unwrap());
        assert!(lexer.flag().unwrap());
        assert_eq!(lexer.number().unwrap(), 10.5);
        assert!(lexer.at_end());
    }
}
