
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Keyword {
    Kung,    // if
    Kundi,   // else if
    Edi,     // else
    Idikta,  // print
    Habang,  // while
    Para,    // for
    Sa,      // in
    Saklaw,  // range
    Bumalik, // return
    Itigil,  // break
    Ituloy,  // continue
    Paraan,  // def
    Klase,   // class
    Tama,    // true
    Mali,    // false
    Wala,    // none
    Subukan, // try
    Saluhin, // except
    Var,
}

impl Keyword {
    pub const ALL: [Keyword; 19] = [
        Keyword::Kung,
        Keyword::Kundi,
        Keyword::Edi,
        Keyword::Idikta,
        Keyword::Habang,
        Keyword::Para,
        Keyword::Sa,
        Keyword::Saklaw,
        Keyword::Bumalik,
        Keyword::Itigil,
        Keyword::Ituloy,
        Keyword::Paraan,
        Keyword::Klase,
        Keyword::Tama,
        Keyword::Mali,
        Keyword::Wala,
        Keyword::Subukan,
        Keyword::Saluhin,
        Keyword::Var,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == word)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Kung => "kung",
            Keyword::Kundi => "kundi",
            Keyword::Edi => "edi",
            Keyword::Idikta => "idikta",
            Keyword::Habang => "habang",
            Keyword::Para => "para",
            Keyword::Sa => "sa",
            Keyword::Saklaw => "saklaw",
            Keyword::Bumalik => "bumalik",
            Keyword::Itigil => "itigil",
            Keyword::Ituloy => "ituloy",
            Keyword::Paraan => "paraan",
            Keyword::Klase => "klase",
            Keyword::Tama => "tama",
            Keyword::Mali => "mali",
            Keyword::Wala => "wala",
            Keyword::Subukan => "subukan",
            Keyword::Saluhin => "saluhin",
            Keyword::Var => "var",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And, // at
    Or,  // o
    Not, // hindi
}

impl Operator {
    /// Operators spelled as words. These win over identifiers.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "at" => Some(Operator::And),
            "o" => Some(Operator::Or),
            "hindi" => Some(Operator::Not),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Assign => "=",
            Operator::EqualEqual => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::And => "at",
            Operator::Or => "o",
            Operator::Not => "hindi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
}

impl Delimiter {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Delimiter::LParen),
            ')' => Some(Delimiter::RParen),
            '{' => Some(Delimiter::LBrace),
            '}' => Some(Delimiter::RBrace),
            '[' => Some(Delimiter::LBracket),
            ']' => Some(Delimiter::RBracket),
            ',' => Some(Delimiter::Comma),
            '.' => Some(Delimiter::Dot),
            ':' => Some(Delimiter::Colon),
            ';' => Some(Delimiter::Semicolon),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::LParen => '(',
            Delimiter::RParen => ')',
            Delimiter::LBrace => '{',
            Delimiter::RBrace => '}',
            Delimiter::LBracket => '[',
            Delimiter::RBracket => ']',
            Delimiter::Comma => ',',
            Delimiter::Dot => '.',
            Delimiter::Colon => ':',
            Delimiter::Semicolon => ';',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    Identifier(String),
    Keyword(Keyword),
    Integer(i64),
    /// Integer literal too wide for `i64`, kept as its digits.
    BigInteger(String),
    Float(f64),
    String(String),
    Operator(Operator),
    Delimiter(Delimiter),
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "'{}'", name),
            TokenKind::Keyword(k) => write!(f, "'{}'", k.as_str()),
            TokenKind::Integer(n) => write!(f, "'{}'", n),
            TokenKind::BigInteger(digits) => write!(f, "'{}'", digits),
            TokenKind::Float(n) => write!(f, "'{:?}'", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Operator(op) => write!(f, "'{}'", op.as_str()),
            TokenKind::Delimiter(d) => write!(f, "'{}'", d.as_char()),
            TokenKind::EndOfInput => f.write_str("katapusan ng input"),
        }
    }
}

/// A token and where it starts in the source. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_operator(&self, operator: Operator) -> bool {
        self.kind == TokenKind::Operator(operator)
    }

    pub fn is_delimiter(&self, delimiter: Delimiter) -> bool {
        self.kind == TokenKind::Delimiter(delimiter)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}
