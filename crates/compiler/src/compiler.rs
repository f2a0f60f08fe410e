//! Pipeline driver: lexer, parser, semantic analysis, then code generation.

use bumpalo::Bump;
use log::{debug, warn};
use phlang_language::ast::Program;
use phlang_language::lexer::{Lexer, Token};
use phlang_language::parser::parse;
use phlang_language::{CompileResult, CompilerError};
use serde::Serialize;
use thiserror::Error;

use crate::codegen::CodeGenerator;
use crate::config::CompilerOptions;
use crate::semantic::{Diagnostic, analyze};

/// Generated code plus the advisory findings that came with it.
#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] CompilerError),

    #[error("Hindi itinuloy ang pagkocompile: {} na mali sa semantiko", .diagnostics.len())]
    Rejected { diagnostics: Vec<Diagnostic> },
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn tokenize(&self, source: &str) -> CompileResult<Vec<Token>> {
        Lexer::with_options(source, self.options.lexer_options()).tokenize()
    }

    pub fn parse<'a>(&self, source: &str, arena: &'a Bump) -> CompileResult<Program<'a>> {
        let tokens = self.tokenize(source)?;
        let program = parse(tokens, arena)?;
        debug!("parsed {} top-level statement(s)", program.statements.len());
        Ok(program)
    }

    pub fn analyze(&self, program: &Program<'_>) -> Vec<Diagnostic> {
        let diagnostics = analyze(program);
        for d in &diagnostics {
            warn!("{}", d);
        }
        diagnostics
    }

    pub fn generate(&self, program: &Program<'_>) -> String {
        CodeGenerator::new(self.options.prelude.clone(), self.options.indent_width).generate(program)
    }

    /// Run the whole pipeline. In strict mode any diagnostic stops it
    /// before code generation.
    pub fn compile(&self, source: &str) -> Result<Compilation, CompileError> {
        let arena = Bump::new();
        let program = self.parse(source, &arena)?;
        let diagnostics = self.analyze(&program);
        if self.options.strict && !diagnostics.is_empty() {
            return Err(CompileError::Rejected { diagnostics });
        }
        let code = self.generate(&program);
        Ok(Compilation { code, diagnostics })
    }
}

/// Compile with default settings. Diagnostics are logged, never fatal.
pub fn compile(source: &str) -> Result<String, CompilerError> {
    let compiler = Compiler::default();
    let arena = Bump::new();
    let program = compiler.parse(source, &arena)?;
    compiler.analyze(&program);
    Ok(compiler.generate(&program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Prelude;
    use phlang_language::ErrorKind;

    fn omit_prelude() -> CompilerOptions {
        CompilerOptions {
            prelude: Prelude::Omit,
            ..CompilerOptions::default()
        }
    }

    #[test]
    fn test_compile_keeps_going_past_diagnostics() {
        let out = Compiler::new(omit_prelude()).compile("hello();").unwrap();
        assert_eq!(out.code, "hello()\n");
        assert_eq!(out.diagnostics, vec![Diagnostic::UndeclaredFunction("hello".to_string())]);
        assert!(!out.is_clean());
    }

    #[test]
    fn test_strict_mode_rejects() {
        let options = CompilerOptions {
            strict: true,
            ..omit_prelude()
        };
        let compiler = Compiler::new(options);
        match compiler.compile("idikta x;") {
            Err(CompileError::Rejected { diagnostics }) => {
                assert_eq!(diagnostics, vec![Diagnostic::UndeclaredVariable("x".to_string())]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(compiler.compile("var x = 1; idikta x;").unwrap().is_clean());
    }

    #[test]
    fn test_syntax_errors_pass_through() {
        let err = Compiler::default().compile("var = 1;").unwrap_err();
        match err {
            CompileError::Syntax(e) => {
                assert!(matches!(e.kind, ErrorKind::UnexpectedToken { .. }));
                assert_eq!(e.line(), Some(1));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_block_comment_option_reaches_lexer() {
        let source = "idikta 1; /* open";
        assert!(Compiler::default().compile(source).is_ok());

        let options = CompilerOptions {
            block_comments: phlang_language::lexer::BlockCommentPolicy::Error,
            ..CompilerOptions::default()
        };
        let err = Compiler::new(options).compile(source).unwrap_err();
        assert!(matches!(err, CompileError::Syntax(e) if e.kind == ErrorKind::UnterminatedComment));
    }

    #[test]
    fn test_default_compile_is_self_contained() {
        let code = compile("subukan { idikta 1 / 0; } saluhin e { idikta e; }").unwrap();
        assert!(code.contains("def translate_error(error):"));
        assert!(code.contains("    e = translate_error(e)\n"));
    }
}
