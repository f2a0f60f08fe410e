//! Lowers a parsed program to Python source text.
//!
//! Generation cannot fail: any tree the parser accepts has a lowering.
//! Output is fully determined by the tree and the generator's settings.

use std::borrow::Cow;

use log::debug;
use phlang_language::ast::{
    BinaryOperator, Block, ElseBranch, Expression, IfStatement, Number, Program, Statement,
    UnaryOperator,
};
use serde::{Deserialize, Serialize};

use crate::translate::{self, ENTRY_POINT, LEGACY_MODULE};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Host keywords. In PHLang they are ordinary identifiers.
const HOST_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// What generated programs start with, so that `translate_error` resolves
/// inside lowered `saluhin` handlers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Prelude {
    /// Define the translator in the generated program itself.
    #[default]
    Inline,
    /// Import it from a module the execution environment provides.
    Import {
        #[serde(default = "default_module")]
        module: String,
    },
    /// Emit nothing; the caller injects the name.
    Omit,
}

fn default_module() -> String {
    LEGACY_MODULE.to_string()
}

impl Prelude {
    pub fn legacy_import() -> Self {
        Prelude::Import { module: default_module() }
    }
}

/// Line buffer with an indentation counter.
struct Emitter {
    buffer: String,
    indent_level: usize,
    indent_width: usize,
}

impl Emitter {
    fn new(indent_width: usize) -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
            indent_width,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level * self.indent_width {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    fn raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn finish(self) -> String {
        self.buffer
    }
}

#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prelude: Prelude,
    indent_width: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(Prelude::default(), DEFAULT_INDENT_WIDTH)
    }
}

impl CodeGenerator {
    pub fn new(prelude: Prelude, indent_width: usize) -> Self {
        Self {
            prelude,
            indent_width: indent_width.max(1),
        }
    }

    pub fn generate(&self, program: &Program<'_>) -> String {
        let mut out = Emitter::new(self.indent_width);

        match &self.prelude {
            Prelude::Inline => {
                out.raw(&translate::python_prelude());
                out.blank_line();
                out.blank_line();
            }
            Prelude::Import { module } => {
                out.line(&format!("from {} import {}", module, ENTRY_POINT));
                out.blank_line();
            }
            Prelude::Omit => {}
        }

        for stmt in &program.statements {
            self.emit_statement(stmt, &mut out);
        }

        let code = out.finish();
        debug!("generated {} line(s) of Python", code.lines().count());
        code
    }

    fn emit_statement(&self, stmt: &Statement<'_>, out: &mut Emitter) {
        match stmt {
            Statement::VariableDeclaration { name, initializer, .. } => {
                let value = match initializer {
                    Some(init) => self.expression(init),
                    None => "None".to_string(),
                };
                out.line(&format!("{} = {}", host_name(name), value));
            }
            Statement::Assignment { name, value } => {
                out.line(&format!("{} = {}", host_name(name), self.expression(value)));
            }
            Statement::FunctionDefinition { name, parameters, body } => {
                let parameters: Vec<_> = parameters.iter().map(|p| host_name(p)).collect();
                out.line(&format!("def {}({}):", host_name(name), parameters.join(", ")));
                self.emit_block(body, out);
                out.blank_line();
            }
            Statement::Return { value } => match value {
                Some(v) => out.line(&format!("return {}", self.expression(v))),
                None => out.line("return"),
            },
            Statement::If(if_stmt) => self.emit_if(if_stmt, out),
            Statement::While { condition, body } => {
                out.line(&format!("while {}:", self.expression(condition)));
                self.emit_block(body, out);
            }
            Statement::For { variable, iterable, body } => {
                out.line(&format!("for {} in {}:", host_name(variable), self.expression(iterable)));
                self.emit_block(body, out);
            }
            Statement::Print { expression } => {
                out.line(&format!("print({})", self.expression(expression)));
            }
            Statement::Break => out.line("break"),
            Statement::Continue => out.line("continue"),
            Statement::TryExcept { try_block, exception_name, except_block } => {
                out.line("try:");
                self.emit_block(try_block, out);
                let exception_name = host_name(exception_name);
                out.line(&format!("except Exception as {}:", exception_name));
                out.indent();
                out.line(&format!("{0} = {1}({0})", exception_name, ENTRY_POINT));
                for s in except_block.statements {
                    self.emit_statement(s, out);
                }
                out.dedent();
            }
            Statement::Expression { expression } => {
                out.line(&self.expression(expression));
            }
        }
    }

    // The chain is right-nested, so every `kundi` becomes an `elif` at the
    // same depth as the opening `if`.
    fn emit_if(&self, if_stmt: &IfStatement<'_>, out: &mut Emitter) {
        out.line(&format!("if {}:", self.expression(if_stmt.condition)));
        self.emit_block(&if_stmt.then_block, out);

        let mut branch = if_stmt.else_branch;
        while let Some(b) = branch {
            match b {
                ElseBranch::If(next) => {
                    out.line(&format!("elif {}:", self.expression(next.condition)));
                    self.emit_block(&next.then_block, out);
                    branch = next.else_branch;
                }
                ElseBranch::Block(block) => {
                    out.line("else:");
                    self.emit_block(&block, out);
                    branch = None;
                }
            }
        }
    }

    fn emit_block(&self, block: &Block<'_>, out: &mut Emitter) {
        out.indent();
        if block.is_empty() {
            out.line("pass");
        }
        for s in block.statements {
            self.emit_statement(s, out);
        }
        out.dedent();
    }

    fn expression(&self, expr: &Expression<'_>) -> String {
        match expr {
            Expression::Number(Number::Integer(n)) => n.to_string(),
            Expression::Number(Number::BigInteger(digits)) => digits.to_string(),
            Expression::Number(Number::Float(f)) => format!("{:?}", f),
            Expression::String(s) => quote(s),
            Expression::Boolean(true) => "True".to_string(),
            Expression::Boolean(false) => "False".to_string(),
            Expression::Null => "None".to_string(),
            Expression::Identifier(name) => host_name(name).into_owned(),
            Expression::Binary { left, operator, right } => {
                let (l, r) = (self.expression(left), self.expression(right));
                // Only literal operands are known to be strings.
                let concatenation = *operator == BinaryOperator::Add
                    && (matches!(left, Expression::String(_)) || matches!(right, Expression::String(_)));
                if concatenation {
                    format!("(str({}) + str({}))", l, r)
                } else {
                    format!("({} {} {})", l, host_operator(*operator), r)
                }
            }
            Expression::Unary { operator, operand } => match operator {
                UnaryOperator::Negate => format!("-({})", self.expression(operand)),
                UnaryOperator::Not => format!("not ({})", self.expression(operand)),
            },
            Expression::Call { name, arguments } => {
                let callee = if *name == "saklaw" { Cow::Borrowed("range") } else { host_name(name) };
                format!("{}({})", callee, self.expression_list(arguments))
            }
            Expression::ArrayLiteral(elements) => format!("[{}]", self.expression_list(elements)),
            Expression::Index { array, index } => {
                format!("{}[{}]", self.expression(array), self.expression(index))
            }
        }
    }

    fn expression_list(&self, exprs: &[Expression<'_>]) -> String {
        exprs
            .iter()
            .map(|e| self.expression(e))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn host_operator(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::And => "and",
        BinaryOperator::Or => "or",
        other => other.as_str(),
    }
}

/// Names the host would reject, or that would shadow the translator entry
/// point, get a trailing `_`.
fn host_name(name: &str) -> Cow<'_, str> {
    if HOST_KEYWORDS.contains(&name) || name == ENTRY_POINT {
        Cow::Owned(format!("{}_", name))
    } else {
        Cow::Borrowed(name)
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Lower `program` with the default prelude and indentation.
pub fn generate(program: &Program<'_>) -> String {
    CodeGenerator::default().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use phlang_language::lexer::tokenize;
    use phlang_language::parser::parse;

    fn lower_with(src: &str, prelude: Prelude, indent_width: usize) -> String {
        let arena = Bump::new();
        let tokens = tokenize(src).expect("lexing failed");
        let program = parse(tokens, &arena).expect("parsing failed");
        CodeGenerator::new(prelude, indent_width).generate(&program)
    }

    fn lower(src: &str) -> String {
        lower_with(src, Prelude::Omit, 4)
    }

    #[test]
    fn test_declarations_and_print() {
        assert_eq!(lower("var x: int = 5; idikta x;"), "x = 5\nprint(x)\n");
        assert_eq!(lower("var y; y = 2.5"), "y = None\ny = 2.5\n");
    }

    #[test]
    fn test_wide_integers_keep_their_digits() {
        assert_eq!(lower("idikta 99999999999999999999;"), "print(99999999999999999999)\n");
        assert_eq!(
            lower("var n = 9223372036854775808 * 2;"),
            "n = (9223372036854775808 * 2)\n"
        );
    }

    #[test]
    fn test_else_if_chain_becomes_elif() {
        let src = "kung 1 > 2 { idikta 1; } kundi 2 > 1 { idikta 2; } edi { idikta 3; }";
        let expected = "\
if (1 > 2):
    print(1)
elif (2 > 1):
    print(2)
else:
    print(3)
";
        assert_eq!(lower(src), expected);
    }

    #[test]
    fn test_function_definition() {
        let src = "paraan dagdag(a, b) { bumalik a + b; } paraan wala_lang() { } idikta dagdag(1, 2);";
        let expected = "\
def dagdag(a, b):
    return (a + b)

def wala_lang():
    pass

print(dagdag(1, 2))
";
        assert_eq!(lower(src), expected);
    }

    #[test]
    fn test_loops() {
        let src = "para i sa saklaw(3) { kung i == 1 { ituloy; } idikta i; } habang tama { itigil; }";
        let expected = "\
for i in range(3):
    if (i == 1):
        continue
    print(i)
while True:
    break
";
        assert_eq!(lower(src), expected);
    }

    #[test]
    fn test_try_except_rebinds_through_translator() {
        let src = "subukan { idikta 1 / 0; } saluhin e { idikta e; }";
        let expected = "\
try:
    print((1 / 0))
except Exception as e:
    e = translate_error(e)
    print(e)
";
        assert_eq!(lower(src), expected);
        assert!(lower("subukan { } saluhin e { }").contains("try:\n    pass\n"));
    }

    #[test]
    fn test_host_keywords_are_renamed() {
        let src = "var pass = 1; paraan lambda(def) { bumalik def; }
para None sa saklaw(pass) { idikta lambda(None); }
subukan { } saluhin not { idikta not; }";
        let expected = "\
pass_ = 1
def lambda_(def_):
    return def_

for None_ in range(pass_):
    print(lambda_(None_))
try:
    pass
except Exception as not_:
    not_ = translate_error(not_)
    print(not_)
";
        assert_eq!(lower(src), expected);
        assert_eq!(lower("translate_error = 1;"), "translate_error_ = 1\n");
        assert_eq!(lower("idikta print(klase_x);"), "print(print(klase_x))\n");
    }

    #[test]
    fn test_operators() {
        assert_eq!(lower("a at b o hindi c"), "((a and b) or not (c))\n");
        assert_eq!(lower("-(1 + 2) * 3 % 4"), "((-((1 + 2)) * 3) % 4)\n");
        assert_eq!(lower("1 - 2 - 3"), "((1 - 2) - 3)\n");
        assert_eq!(lower("x != wala"), "(x != None)\n");
    }

    #[test]
    fn test_string_concatenation_heuristic() {
        assert_eq!(lower("idikta 'edad: ' + 5;"), "print((str(\"edad: \") + str(5)))\n");
        // A non-literal string operand is not coerced.
        assert_eq!(lower("idikta a + b;"), "print((a + b))\n");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(lower(r#"idikta "sabi \"oo\"\n";"#), "print(\"sabi \\\"oo\\\"\\n\")\n");
        assert_eq!(lower(r"idikta 'a\\b';"), "print(\"a\\\\b\")\n");
    }

    #[test]
    fn test_arrays_and_indexing() {
        assert_eq!(lower("var xs = [1, 2.0, 'tatlo']; idikta xs[0];"), "xs = [1, 2.0, \"tatlo\"]\nprint(xs[0])\n");
    }

    #[test]
    fn test_indent_width() {
        let out = lower_with("kung tama { kung mali { idikta 1; } }", Prelude::Omit, 2);
        assert_eq!(out, "if True:\n  if False:\n    print(1)\n");
    }

    #[test]
    fn test_preludes() {
        let imported = lower_with("idikta 1;", Prelude::legacy_import(), 4);
        assert_eq!(imported, "from src.error.error_handler import translate_error\n\nprint(1)\n");

        let inline = lower_with("idikta 1;", Prelude::Inline, 4);
        assert!(inline.starts_with(&translate::python_prelude()));
        assert!(inline.ends_with("\n\n\nprint(1)\n"));
    }
}
