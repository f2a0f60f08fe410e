//! Semantic analysis: scope resolution, call arity and control-flow
//! placement checks over a parsed program.
//!
//! Findings are advisory. `analyze` never fails; it returns every
//! diagnostic in the order it was discovered.

use log::debug;
use phlang_language::ast::{Block, ElseBranch, Expression, IfStatement, Program, Statement};
use serde::Serialize;
use thiserror::Error;

use crate::symbol::{SymbolKind, SymbolTable};

/// Host-provided functions visible in the global scope: name, min and max
/// argument counts.
pub const BUILTINS: &[(&str, usize, usize)] = &[("saklaw", 1, 3)];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Diagnostic {
    #[error("Ang variable na '{0}' ay naideklara na sa kasalukuyang scope")]
    DuplicateVariable(String),

    #[error("Ang function na '{0}' ay nakatuklang muli")]
    DuplicateFunction(String),

    #[error("Ang variable na '{0}' ay ginamit bago pa naideklara")]
    UndeclaredVariable(String),

    #[error("Ang variable na '{0}' ay hindi pa naideklara bago itinala")]
    UndeclaredAssignment(String),

    #[error("Hindi naideklara ang function na '{0}'")]
    UndeclaredFunction(String),

    #[error("Ang '{0}' ay hindi isang function")]
    NotAFunction(String),

    #[error(
        "Ang function na '{name}' ay tinawag na may maling bilang ng mga argumento. Inaasahan: {expected}, nakuha: {found}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "Ang function na '{name}' ay tinawag na may maling bilang ng mga argumento. Inaasahan: {min} hanggang {max}, nakuha: {found}"
    )]
    ArityOutOfRange {
        name: String,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("Hindi pinapayagan ang return statement sa labas ng function")]
    ReturnOutsideFunction,

    #[error("Hindi pinapayagan ang 'itigil' sa labas ng loop")]
    BreakOutsideLoop,

    #[error("Hindi pinapayagan ang 'ituloy' sa labas ng loop")]
    ContinueOutsideLoop,
}

pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    function_depth: usize,
    loop_depth: usize,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        for &(name, min, max) in BUILTINS {
            symbols.define(name, SymbolKind::Builtin { min, max });
        }
        Self {
            symbols,
            diagnostics: Vec::new(),
            function_depth: 0,
            loop_depth: 0,
        }
    }

    pub fn analyze(mut self, program: &Program<'_>) -> Vec<Diagnostic> {
        for stmt in &program.statements {
            self.analyze_statement(stmt);
        }
        debug!("semantic analysis: {} diagnostic(s)", self.diagnostics.len());
        self.diagnostics
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn analyze_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::VariableDeclaration { name, declared_type, initializer } => {
                if let Some(init) = initializer {
                    self.analyze_expression(init);
                }
                let kind = SymbolKind::Variable {
                    declared_type: declared_type.map(str::to_string),
                };
                if !self.symbols.define(name, kind) {
                    self.report(Diagnostic::DuplicateVariable(name.to_string()));
                }
            }
            Statement::Assignment { name, value } => {
                self.analyze_expression(value);
                if self.symbols.lookup(name).is_none() {
                    self.report(Diagnostic::UndeclaredAssignment(name.to_string()));
                }
            }
            Statement::FunctionDefinition { name, parameters, body } => {
                let kind = SymbolKind::Function {
                    parameters: parameters.iter().map(|p| p.to_string()).collect(),
                };
                if !self.symbols.define(name, kind) {
                    self.report(Diagnostic::DuplicateFunction(name.to_string()));
                }

                // Parameters and the body's own declarations share a scope.
                self.symbols.enter_scope();
                for param in parameters.iter() {
                    if !self.symbols.define(param, SymbolKind::Variable { declared_type: None }) {
                        self.report(Diagnostic::DuplicateVariable(param.to_string()));
                    }
                }
                let enclosing_loops = std::mem::replace(&mut self.loop_depth, 0);
                self.function_depth += 1;
                for s in body.statements {
                    self.analyze_statement(s);
                }
                self.function_depth -= 1;
                self.loop_depth = enclosing_loops;
                self.symbols.exit_scope();
            }
            Statement::Return { value } => {
                if self.function_depth == 0 {
                    self.report(Diagnostic::ReturnOutsideFunction);
                }
                if let Some(v) = value {
                    self.analyze_expression(v);
                }
            }
            Statement::If(if_stmt) => self.analyze_if(if_stmt),
            Statement::While { condition, body } => {
                self.analyze_expression(condition);
                self.loop_depth += 1;
                self.analyze_block(body, None);
                self.loop_depth -= 1;
            }
            Statement::For { variable, iterable, body } => {
                self.analyze_expression(iterable);
                self.loop_depth += 1;
                self.analyze_block(body, Some(*variable));
                self.loop_depth -= 1;
            }
            Statement::Print { expression } | Statement::Expression { expression } => {
                self.analyze_expression(expression);
            }
            Statement::Break => {
                if self.loop_depth == 0 {
                    self.report(Diagnostic::BreakOutsideLoop);
                }
            }
            Statement::Continue => {
                if self.loop_depth == 0 {
                    self.report(Diagnostic::ContinueOutsideLoop);
                }
            }
            Statement::TryExcept { try_block, exception_name, except_block } => {
                self.analyze_block(try_block, None);
                self.analyze_block(except_block, Some(*exception_name));
            }
        }
    }

    fn analyze_if<'a>(&mut self, if_stmt: &'a IfStatement<'a>) {
        let mut clause = if_stmt;
        loop {
            self.analyze_expression(clause.condition);
            self.analyze_block(&clause.then_block, None);
            match clause.else_branch {
                Some(ElseBranch::If(next)) => clause = next,
                Some(ElseBranch::Block(block)) => {
                    self.analyze_block(&block, None);
                    break;
                }
                None => break,
            }
        }
    }

    /// Analyze `block` in a fresh scope, optionally pre-binding one
    /// untyped variable (loop or exception variable).
    fn analyze_block(&mut self, block: &Block<'_>, binding: Option<&str>) {
        self.symbols.enter_scope();
        if let Some(name) = binding {
            self.symbols.define(name, SymbolKind::Variable { declared_type: None });
        }
        for s in block.statements {
            self.analyze_statement(s);
        }
        self.symbols.exit_scope();
    }

    fn analyze_expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Identifier(name) => {
                if self.symbols.lookup(name).is_none() {
                    self.report(Diagnostic::UndeclaredVariable(name.to_string()));
                }
            }
            Expression::Binary { left, right, .. } => {
                self.analyze_expression(left);
                self.analyze_expression(right);
            }
            Expression::Unary { operand, .. } => self.analyze_expression(operand),
            Expression::Call { name, arguments } => {
                self.check_call(name, arguments.len());
                for arg in arguments.iter() {
                    self.analyze_expression(arg);
                }
            }
            Expression::ArrayLiteral(elements) => {
                for e in elements.iter() {
                    self.analyze_expression(e);
                }
            }
            Expression::Index { array, index } => {
                self.analyze_expression(array);
                self.analyze_expression(index);
            }
            Expression::Number(_) | Expression::String(_) | Expression::Boolean(_) | Expression::Null => {}
        }
    }

    fn check_call(&mut self, name: &str, found: usize) {
        let Some(symbol) = self.symbols.lookup(name) else {
            self.report(Diagnostic::UndeclaredFunction(name.to_string()));
            return;
        };
        if !symbol.is_callable() {
            self.report(Diagnostic::NotAFunction(name.to_string()));
            return;
        }
        let diagnostic = match symbol.arity() {
            Some((min, max)) if min == max && found != min => Some(Diagnostic::ArityMismatch {
                name: name.to_string(),
                expected: min,
                found,
            }),
            Some((min, max)) if found < min || found > max => Some(Diagnostic::ArityOutOfRange {
                name: name.to_string(),
                min,
                max,
                found,
            }),
            _ => None,
        };
        if let Some(d) = diagnostic {
            self.report(d);
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a fresh analyzer over `program`.
pub fn analyze(program: &Program<'_>) -> Vec<Diagnostic> {
    SemanticAnalyzer::new().analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use phlang_language::lexer::tokenize;
    use phlang_language::parser::parse;

    fn diagnostics(src: &str) -> Vec<Diagnostic> {
        let arena = Bump::new();
        let tokens = tokenize(src).expect("lexing failed");
        let program = parse(tokens, &arena).expect("parsing failed");
        analyze(&program)
    }

    #[test]
    fn test_clean_program() {
        let src = "var x: int = 5;
paraan dagdag(a, b) { bumalik a + b; }
para i sa saklaw(1, 10, 2) { x = dagdag(x, i); }
idikta x;";
        assert!(diagnostics(src).is_empty());
    }

    #[test]
    fn test_undeclared_function() {
        assert_eq!(
            diagnostics("hello();"),
            vec![Diagnostic::UndeclaredFunction("hello".to_string())]
        );
    }

    #[test]
    fn test_undeclared_variable_and_assignment() {
        assert_eq!(
            diagnostics("idikta y; z = 1;"),
            vec![
                Diagnostic::UndeclaredVariable("y".to_string()),
                Diagnostic::UndeclaredAssignment("z".to_string()),
            ]
        );
    }

    #[test]
    fn test_initializer_sees_outer_binding_only() {
        assert_eq!(
            diagnostics("var x = x;"),
            vec![Diagnostic::UndeclaredVariable("x".to_string())]
        );
    }

    #[test]
    fn test_shadowing_is_allowed() {
        assert!(diagnostics("var x = 1; kung tama { var x = 2; idikta x; }").is_empty());
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        assert_eq!(
            diagnostics("var x = 1; var x = 2;"),
            vec![Diagnostic::DuplicateVariable("x".to_string())]
        );
        assert_eq!(
            diagnostics("paraan f() { } paraan f() { }"),
            vec![Diagnostic::DuplicateFunction("f".to_string())]
        );
        // A parameter and a body declaration share one scope.
        assert_eq!(
            diagnostics("paraan f(a) { var a = 1; }"),
            vec![Diagnostic::DuplicateVariable("a".to_string())]
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let d = diagnostics("paraan f(a, b) { bumalik a; } f(1); f(1, 2, 3); f(1, 2);");
        assert_eq!(
            d,
            vec![
                Diagnostic::ArityMismatch { name: "f".to_string(), expected: 2, found: 1 },
                Diagnostic::ArityMismatch { name: "f".to_string(), expected: 2, found: 3 },
            ]
        );
        assert!(d[0].to_string().contains("Inaasahan: 2, nakuha: 1"));
    }

    #[test]
    fn test_builtin_range_arity() {
        assert!(diagnostics("idikta saklaw(3);").is_empty());
        assert_eq!(
            diagnostics("idikta saklaw();"),
            vec![Diagnostic::ArityOutOfRange { name: "saklaw".to_string(), min: 1, max: 3, found: 0 }]
        );
    }

    #[test]
    fn test_calling_a_variable() {
        assert_eq!(
            diagnostics("var x = 1; x();"),
            vec![Diagnostic::NotAFunction("x".to_string())]
        );
    }

    #[test]
    fn test_recursion_and_definition_order() {
        assert!(diagnostics("paraan f(n) { bumalik f(n - 1); }").is_empty());
        assert_eq!(
            diagnostics("g(); paraan g() { }"),
            vec![Diagnostic::UndeclaredFunction("g".to_string())]
        );
    }

    #[test]
    fn test_control_flow_placement() {
        assert_eq!(
            diagnostics("bumalik 1; itigil; ituloy;"),
            vec![
                Diagnostic::ReturnOutsideFunction,
                Diagnostic::BreakOutsideLoop,
                Diagnostic::ContinueOutsideLoop,
            ]
        );
        assert!(diagnostics("habang tama { kung mali { itigil; } ituloy; }").is_empty());
        // A function body inside a loop is not itself in a loop.
        assert_eq!(
            diagnostics("habang tama { paraan f() { itigil; } }"),
            vec![Diagnostic::BreakOutsideLoop]
        );
    }

    #[test]
    fn test_block_scopes_close() {
        assert_eq!(
            diagnostics("kung tama { var y = 1; } edi { idikta y; } idikta y;"),
            vec![
                Diagnostic::UndeclaredVariable("y".to_string()),
                Diagnostic::UndeclaredVariable("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_loop_and_exception_variables_are_bound() {
        assert!(diagnostics("para i sa [1, 2] { idikta i; }").is_empty());
        assert!(diagnostics("subukan { idikta 1 / 0; } saluhin e { idikta e; }").is_empty());
        assert_eq!(
            diagnostics("subukan { } saluhin e { } idikta e;"),
            vec![Diagnostic::UndeclaredVariable("e".to_string())]
        );
    }
}
