
pub mod token;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CompileResult, CompilerError, ErrorKind};
pub use token::{Delimiter, Keyword, Operator, Token, TokenKind};

/// What to do when a `/* ...` comment is still open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCommentPolicy {
    /// Swallow the rest of the input silently.
    #[default]
    Permissive,
    /// Report an unterminated comment at the opening `/*`.
    Error,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexerOptions {
    pub block_comments: BlockCommentPolicy,
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    read_position: usize,
    ch: Option<char>,
    pub line: usize,
    pub column: usize,
    options: LexerOptions,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, LexerOptions::default())
    }

    pub fn with_options(input: &'a str, options: LexerOptions) -> Self {
        let mut l = Lexer {
            input,
            position: 0,
            read_position: 0,
            ch: None,
            line: 1,
            column: 0,
            options,
        };
        l.read_char();
        l
    }

    fn read_char(&mut self) {
        match self.ch {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None if self.read_position == 0 => self.column = 1,
            None => return, // already past the end
        }
        if self.read_position >= self.input.len() {
            self.ch = None;
        } else {
            self.ch = self.input[self.read_position..].chars().next();
        }
        self.position = self.read_position;
        if let Some(ch) = self.ch {
            self.read_position += ch.len_utf8();
        } else {
            self.read_position += 1;
        }
    }

    fn peek_char(&self) -> Option<char> {
        if self.read_position >= self.input.len() {
            None
        } else {
            self.input[self.read_position..].chars().next()
        }
    }

    /// Scan the whole input. The last token is always `EndOfInput`.
    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_trivia()?;

        let (line, column) = (self.line, self.column);
        let ch = match self.ch {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::EndOfInput, line, column)),
        };

        if is_identifier_start(ch) {
            return Ok(self.read_identifier(line, column));
        }
        if ch.is_ascii_digit() {
            return self.read_number(line, column);
        }
        if ch == '"' || ch == '\'' {
            return self.read_string(ch, line, column);
        }

        let kind = match ch {
            '=' => self.one_or_two('=', Operator::Assign, Operator::EqualEqual),
            '<' => self.one_or_two('=', Operator::Less, Operator::LessEqual),
            '>' => self.one_or_two('=', Operator::Greater, Operator::GreaterEqual),
            '!' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    TokenKind::Operator(Operator::NotEqual)
                } else {
                    return Err(CompilerError::at(ErrorKind::InvalidCharacter(ch), line, column));
                }
            }
            '+' => TokenKind::Operator(Operator::Plus),
            '-' => TokenKind::Operator(Operator::Minus),
            '*' => TokenKind::Operator(Operator::Star),
            '/' => TokenKind::Operator(Operator::Slash),
            '%' => TokenKind::Operator(Operator::Percent),
            _ => match Delimiter::from_char(ch) {
                Some(delim) => TokenKind::Delimiter(delim),
                None => {
                    return Err(CompilerError::at(ErrorKind::InvalidCharacter(ch), line, column));
                }
            },
        };

        self.read_char();
        Ok(Token::new(kind, line, column))
    }

    // `==`, `<=` and `>=` are matched before their one-character forms.
    fn one_or_two(&mut self, second: char, single: Operator, double: Operator) -> TokenKind {
        if self.peek_char() == Some(second) {
            self.read_char();
            TokenKind::Operator(double)
        } else {
            TokenKind::Operator(single)
        }
    }

    fn skip_trivia(&mut self) -> CompileResult<()> {
        loop {
            match (self.ch, self.peek_char()) {
                (Some(ch), _) if ch.is_whitespace() => self.read_char(),
                (Some('#'), _) | (Some('/'), Some('/')) => self.skip_line_comment(),
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.ch {
            if ch == '\n' {
                break;
            }
            self.read_char();
        }
    }

    fn skip_block_comment(&mut self) -> CompileResult<()> {
        let (line, column) = (self.line, self.column);
        self.read_char(); // /
        self.read_char(); // *
        loop {
            match self.ch {
                Some('*') if self.peek_char() == Some('/') => {
                    self.read_char();
                    self.read_char();
                    return Ok(());
                }
                Some(_) => self.read_char(),
                None => {
                    return match self.options.block_comments {
                        BlockCommentPolicy::Permissive => Ok(()),
                        BlockCommentPolicy::Error => Err(CompilerError::at(
                            ErrorKind::UnterminatedComment,
                            line,
                            column,
                        )),
                    };
                }
            }
        }
    }

    fn read_identifier(&mut self, line: usize, column: usize) -> Token {
        let position = self.position;
        while let Some(ch) = self.ch {
            if is_identifier_char(ch) {
                self.read_char();
            } else {
                break;
            }
        }
        let word = &self.input[position..self.position];
        let kind = if let Some(keyword) = Keyword::from_word(word) {
            TokenKind::Keyword(keyword)
        } else if let Some(op) = Operator::from_word(word) {
            TokenKind::Operator(op)
        } else {
            TokenKind::Identifier(word.to_string())
        };
        Token::new(kind, line, column)
    }

    fn read_number(&mut self, line: usize, column: usize) -> CompileResult<Token> {
        let position = self.position;
        let mut is_float = false;
        while let Some(ch) = self.ch {
            if ch.is_ascii_digit() {
                self.read_char();
            } else if ch == '.' {
                if is_float {
                    let literal = &self.input[position..self.read_position];
                    return Err(CompilerError::at(
                        ErrorKind::InvalidNumber(literal.to_string()),
                        self.line,
                        self.column,
                    ));
                }
                is_float = true;
                self.read_char();
            } else {
                break;
            }
        }

        let num_str = &self.input[position..self.position];
        let invalid = || CompilerError::at(ErrorKind::InvalidNumber(num_str.to_string()), line, column);
        let kind = if is_float {
            let value: f64 = num_str.parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            TokenKind::Float(value)
        } else {
            // Digits only, so the sole parse failure is overflow.
            match num_str.parse() {
                Ok(value) => TokenKind::Integer(value),
                Err(_) => TokenKind::BigInteger(num_str.to_string()),
            }
        };
        Ok(Token::new(kind, line, column))
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> CompileResult<Token> {
        self.read_char(); // opening quote
        let mut value = String::new();

        loop {
            match self.ch {
                None => {
                    return Err(CompilerError::at(ErrorKind::UnterminatedString, line, column));
                }
                Some(ch) if ch == quote => {
                    self.read_char();
                    break;
                }
                Some('\\') => {
                    let (esc_line, esc_column) = (self.line, self.column);
                    self.read_char();
                    match self.ch {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some(ch) if ch == quote => value.push(ch),
                        Some(ch) => {
                            return Err(CompilerError::at(
                                ErrorKind::InvalidEscape(ch),
                                esc_line,
                                esc_column,
                            ));
                        }
                        None => {
                            return Err(CompilerError::at(ErrorKind::UnterminatedString, line, column));
                        }
                    }
                    self.read_char();
                }
                Some(ch) => {
                    value.push(ch);
                    self.read_char();
                }
            }
        }

        Ok(Token::new(TokenKind::String(value), line, column))
    }
}

/// Scan `source` with the default options.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let input = "var lima: int = 5;
paraan dagdag(x, y) {
  bumalik x + y;
}
";
        let mut l = Lexer::new(input);

        assert_eq!(l.next_token().unwrap().kind, TokenKind::Keyword(Keyword::Var));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Identifier("lima".to_string()));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Delimiter(Delimiter::Colon));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Identifier("int".to_string()));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Operator(Operator::Assign));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Integer(5));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Delimiter(Delimiter::Semicolon));
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Keyword(Keyword::Paraan));
    }

    #[test]
    fn test_keywords() {
        let input = "kung kundi edi idikta habang para sa saklaw bumalik itigil ituloy paraan klase tama mali wala subukan saluhin var";
        let expected: Vec<TokenKind> = Keyword::ALL
            .into_iter()
            .map(TokenKind::Keyword)
            .chain(std::iter::once(TokenKind::EndOfInput))
            .collect();
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_operator_words_beat_identifiers() {
        assert_eq!(
            kinds("a at b o hindi c"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Operator(Operator::And),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Operator(Operator::Or),
                TokenKind::Operator(Operator::Not),
                TokenKind::Identifier("c".to_string()),
                TokenKind::EndOfInput,
            ]
        );
        // Only exact words are operators.
        assert_eq!(kinds("oo")[0], TokenKind::Identifier("oo".to_string()));
    }

    #[test]
    fn test_operators() {
        let input = "== != <= >= < > = + - * / %";
        let ops: Vec<Operator> = kinds(input)
            .into_iter()
            .filter_map(|k| match k {
                TokenKind::Operator(op) => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                Operator::EqualEqual,
                Operator::NotEqual,
                Operator::LessEqual,
                Operator::GreaterEqual,
                Operator::Less,
                Operator::Greater,
                Operator::Assign,
                Operator::Plus,
                Operator::Minus,
                Operator::Star,
                Operator::Slash,
                Operator::Percent,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let input = "var x = 5 // this is a comment\n# so is this\n/* and\nthis */ var y = 10";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Identifier("x".to_string()),
                TokenKind::Operator(Operator::Assign),
                TokenKind::Integer(5),
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Identifier("y".to_string()),
                TokenKind::Operator(Operator::Assign),
                TokenKind::Integer(10),
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_policy() {
        assert_eq!(kinds("1 /* never closed"), vec![TokenKind::Integer(1), TokenKind::EndOfInput]);

        let options = LexerOptions { block_comments: BlockCommentPolicy::Error };
        let err = Lexer::with_options("1\n  /* never closed", options).tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedComment);
        assert_eq!((err.line(), err.column()), (Some(2), Some(3)));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 5."),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.14),
                TokenKind::Float(5.0),
                TokenKind::EndOfInput,
            ]
        );

        let err = tokenize("x = 1.2.3").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNumber("1.2.".to_string()));
        assert_eq!((err.line(), err.column()), (Some(1), Some(8)));

        assert_eq!(kinds("9223372036854775807")[0], TokenKind::Integer(i64::MAX));
        assert_eq!(
            kinds("99999999999999999999")[0],
            TokenKind::BigInteger("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'isa' "dalawa\n" 'it\'s' "a\\b\t""#),
            vec![
                TokenKind::String("isa".to_string()),
                TokenKind::String("dalawa\n".to_string()),
                TokenKind::String("it's".to_string()),
                TokenKind::String("a\\b\t".to_string()),
                TokenKind::EndOfInput,
            ]
        );

        let err = tokenize(r#""bad \q""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEscape('q'));
        assert_eq!(err.column(), Some(6));
    }

    #[test]
    fn test_unterminated_string_reports_opening_quote() {
        let err = tokenize("idikta 1;\nidikta \"hello\n world").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        assert_eq!((err.line(), err.column()), (Some(2), Some(8)));
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("var x = 1;\n  x @ 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCharacter('@'));
        assert_eq!((err.line(), err.column()), (Some(2), Some(5)));

        assert!(tokenize("!x").is_err());
        assert!(tokenize("ñ").is_err());
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("kung x\n  { }").unwrap();
        let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 6), (2, 3), (2, 5), (2, 6)]);
    }
}
