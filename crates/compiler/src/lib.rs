//! PHLang back end: semantic analysis, Python code generation and the
//! runtime error translator, tied together by `compiler::Compiler`.

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod semantic;
pub mod symbol;
pub mod translate;

pub use codegen::{CodeGenerator, Prelude};
pub use compiler::{Compilation, CompileError, Compiler, compile};
pub use config::{CompilerOptions, ConfigError};
pub use semantic::Diagnostic;
pub use translate::{ENTRY_POINT as TRANSLATE_ENTRY_POINT, ErrorCategory, NativeException, translate};

pub use phlang_language::CompilerError;
