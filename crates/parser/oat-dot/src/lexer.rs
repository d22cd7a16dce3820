//! Tokenizer for the DOT subset the upstream parser emits

use crate::DotError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Bare identifier or numeral
    Ident(String),
    /// Double-quoted string, quotes removed
    Quoted(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semi,
    Comma,
    /// `--` or `->`
    Edge,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(text) => write!(f, "`{text}`"),
            Self::Quoted(text) => write!(f, "\"{text}\""),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::LBracket => f.write_str("`[`"),
            Self::RBracket => f.write_str("`]`"),
            Self::Equals => f.write_str("`=`"),
            Self::Semi => f.write_str("`;`"),
            Self::Comma => f.write_str("`,`"),
            Self::Edge => f.write_str("edge operator"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, DotError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1_u32;

    while let Some(ch) = chars.next() {
        let start_line = line;
        let token = match ch {
            '\n' => {
                line += 1;
                continue;
            }
            ch if ch.is_whitespace() => continue,
            '#' => {
                // preprocessor-style line
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        break;
                    }
                }
                continue;
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        break;
                    }
                }
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut closed = false;
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                    }
                    if prev == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    prev = next;
                }
                if !closed {
                    return Err(DotError::Unterminated {
                        line: start_line,
                        what: "comment",
                    });
                }
                continue;
            }
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '=' => Token::Equals,
            ';' => Token::Semi,
            ',' => Token::Comma,
            '-' if matches!(chars.peek(), Some('-' | '>')) => {
                chars.next();
                Token::Edge
            }
            '"' => {
                let mut text = String::new();
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.peek() {
                            Some(&escaped @ ('"' | '\\')) => {
                                chars.next();
                                text.push(escaped);
                            }
                            Some('\n') => {
                                // line continuation
                                chars.next();
                                line += 1;
                            }
                            _ => text.push('\\'),
                        },
                        '\n' => {
                            line += 1;
                            text.push('\n');
                        }
                        other => text.push(other),
                    }
                }
                if !closed {
                    return Err(DotError::Unterminated {
                        line: start_line,
                        what: "string",
                    });
                }
                Token::Quoted(text)
            }
            ch if is_ident_char(ch) || ch == '-' || ch == '.' => {
                let mut text = String::from(ch);
                while let Some(&next) = chars.peek() {
                    if is_ident_char(next) || next == '.' {
                        text.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident(text)
            }
            found => return Err(DotError::UnexpectedChar { line, found }),
        };
        tokens.push(Spanned {
            token,
            line: start_line,
        });
    }

    Ok(tokens)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
