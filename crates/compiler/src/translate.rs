//! Maps host runtime exceptions raised by generated programs to localized
//! messages, and renders compiler diagnostics.
//!
//! The category table is an external contract: generated programs embed it
//! (see `python_prelude`) and drivers use `translate` on uncaught failures.

use phlang_language::CompilerError;
use serde::{Deserialize, Serialize};

use crate::semantic::Diagnostic;

pub use phlang_language::error::{Location, format_diagnostic};

/// Builtin subclasses of tabled exceptions, with the base they report as.
const NATIVE_SUBCLASSES: &[(&str, &str)] = &[
    ("ModuleNotFoundError", "ImportError"),
    ("UnboundLocalError", "NameError"),
    ("IndentationError", "SyntaxError"),
    ("TabError", "SyntaxError"),
    ("NotImplementedError", "RuntimeError"),
    ("UnicodeDecodeError", "ValueError"),
    ("UnicodeEncodeError", "ValueError"),
    ("JSONDecodeError", "ValueError"),
];

/// Name under which generated programs call the translator.
pub const ENTRY_POINT: &str = "translate_error";

/// Module the legacy import prelude pulls `ENTRY_POINT` from.
pub const LEGACY_MODULE: &str = "src.error.error_handler";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    DivisionByZero,
    TypeMismatch,
    InvalidValue,
    IndexOutOfRange,
    UnresolvedName,
    MissingAttribute,
    MalformedSyntax,
    RuntimeFailure,
    MissingImport,
    MissingKey,
    MissingFile,
    PermissionDenied,
    NumericOverflow,
    MemoryExhausted,
    RecursionLimit,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 15] = [
        ErrorCategory::DivisionByZero,
        ErrorCategory::TypeMismatch,
        ErrorCategory::InvalidValue,
        ErrorCategory::IndexOutOfRange,
        ErrorCategory::UnresolvedName,
        ErrorCategory::MissingAttribute,
        ErrorCategory::MalformedSyntax,
        ErrorCategory::RuntimeFailure,
        ErrorCategory::MissingImport,
        ErrorCategory::MissingKey,
        ErrorCategory::MissingFile,
        ErrorCategory::PermissionDenied,
        ErrorCategory::NumericOverflow,
        ErrorCategory::MemoryExhausted,
        ErrorCategory::RecursionLimit,
    ];

    /// Category of a host exception class. Common subclasses of a table
    /// entry resolve to their base, as the generated translator does by
    /// walking the class hierarchy.
    pub fn from_native(name: &str) -> Option<Self> {
        let name = NATIVE_SUBCLASSES
            .iter()
            .find(|(subclass, _)| *subclass == name)
            .map_or(name, |(_, base)| *base);
        Self::ALL.into_iter().find(|c| c.native_name() == name)
    }

    /// Exception class name in the host runtime.
    pub fn native_name(self) -> &'static str {
        match self {
            ErrorCategory::DivisionByZero => "ZeroDivisionError",
            ErrorCategory::TypeMismatch => "TypeError",
            ErrorCategory::InvalidValue => "ValueError",
            ErrorCategory::IndexOutOfRange => "IndexError",
            ErrorCategory::UnresolvedName => "NameError",
            ErrorCategory::MissingAttribute => "AttributeError",
            ErrorCategory::MalformedSyntax => "SyntaxError",
            ErrorCategory::RuntimeFailure => "RuntimeError",
            ErrorCategory::MissingImport => "ImportError",
            ErrorCategory::MissingKey => "KeyError",
            ErrorCategory::MissingFile => "FileNotFoundError",
            ErrorCategory::PermissionDenied => "PermissionError",
            ErrorCategory::NumericOverflow => "OverflowError",
            ErrorCategory::MemoryExhausted => "MemoryError",
            ErrorCategory::RecursionLimit => "RecursionError",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::DivisionByZero => "HindiMaaringHatiin",
            ErrorCategory::TypeMismatch => "MaliSaUri",
            ErrorCategory::InvalidValue => "MaliSaHalaga",
            ErrorCategory::IndexOutOfRange => "MaliSaIndex",
            ErrorCategory::UnresolvedName => "HindiNatuklasangPangalan",
            ErrorCategory::MissingAttribute => "MaliSaAttribute",
            ErrorCategory::MalformedSyntax => "MaliSaSyntax",
            ErrorCategory::RuntimeFailure => "MaliSaPagpapatupad",
            ErrorCategory::MissingImport => "MaliSaPag-import",
            ErrorCategory::MissingKey => "MaliSaSusi",
            ErrorCategory::MissingFile => "HindiNatagpuanAngFile",
            ErrorCategory::PermissionDenied => "MaliSaPermiso",
            ErrorCategory::NumericOverflow => "LumagpasAngHalaga",
            ErrorCategory::MemoryExhausted => "KulangsaMemorya",
            ErrorCategory::RecursionLimit => "LabisNaRecursion",
        }
    }
}

/// An exception raised by an executed program: its class name and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeException {
    pub kind: String,
    pub message: String,
}

impl NativeException {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }

    /// Read the exception from the last non-empty line of a host
    /// traceback (`Kind: message`, or a bare `Kind`).
    pub fn from_traceback(stderr: &str) -> Option<Self> {
        let line = stderr.lines().rev().map(str::trim).find(|l| !l.is_empty())?;
        let (kind, message) = match line.split_once(": ") {
            Some((kind, message)) if is_exception_name(kind) => (kind, message),
            _ if is_exception_name(line) => (line, ""),
            _ => return None,
        };
        // `json.decoder.JSONDecodeError` is known by its class name alone.
        let kind = kind.rsplit('.').next().unwrap_or(kind);
        Some(Self::new(kind, message))
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        ErrorCategory::from_native(&self.kind)
    }
}

fn is_exception_name(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// `"<label>: <message>"`, or the message unchanged for unknown categories.
pub fn translate(exception: &NativeException) -> String {
    match exception.category() {
        Some(category) => format!("{}: {}", category.label(), exception.message),
        None => exception.message.clone(),
    }
}

pub fn describe_compiler_error(error: &CompilerError) -> String {
    error.to_string()
}

pub fn describe_diagnostic(diagnostic: &Diagnostic) -> String {
    format_diagnostic("Mali sa semantiko", None, diagnostic)
}

/// Host source defining `ENTRY_POINT` with the category table inlined, so
/// generated programs need nothing from the execution environment.
pub fn python_prelude() -> String {
    let mut out = String::from("_PHLANG_ERROR_LABELS = {\n");
    for category in ErrorCategory::ALL {
        out.push_str(&format!(
            "    \"{}\": \"{}\",\n",
            category.native_name(),
            category.label()
        ));
    }
    out.push_str("}\n\n\n");
    out.push_str(&format!("def {}(error):\n", ENTRY_POINT));
    out.push_str("    for cls in type(error).__mro__:\n");
    out.push_str("        label = _PHLANG_ERROR_LABELS.get(cls.__name__)\n");
    out.push_str("        if label is not None:\n");
    out.push_str("            return label + \": \" + str(error)\n");
    out.push_str("    return str(error)\n");
    out
}
