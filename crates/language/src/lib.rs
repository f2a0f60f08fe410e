//! PHLang front end: tokens, lexer, syntax tree and parser.
//!
//! `lexer::tokenize` turns source text into tokens and `parser::parse`
//! builds an arena-allocated `ast::Program` from them. Both fail with a
//! positioned `error::CompilerError`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{CompileResult, CompilerError, ErrorKind, Location};
