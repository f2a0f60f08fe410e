
use serde::Serialize;

// Nodes live in the `Bump` arena handed to the parser; children are
// arena references and names are arena strings.

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Statement<'a> {
    VariableDeclaration {
        name: &'a str,
        declared_type: Option<&'a str>, // not checked
        initializer: Option<&'a Expression<'a>>,
    },
    Assignment {
        name: &'a str,
        value: &'a Expression<'a>,
    },
    FunctionDefinition {
        name: &'a str,
        parameters: &'a [&'a str],
        body: Block<'a>,
    },
    Return {
        value: Option<&'a Expression<'a>>,
    },
    If(IfStatement<'a>),
    While {
        condition: &'a Expression<'a>,
        body: Block<'a>,
    },
    For {
        variable: &'a str,
        iterable: &'a Expression<'a>,
        body: Block<'a>,
    },
    Print {
        expression: &'a Expression<'a>,
    },
    Break,
    Continue,
    TryExcept {
        try_block: Block<'a>,
        exception_name: &'a str,
        except_block: Block<'a>,
    },
    Expression {
        expression: &'a Expression<'a>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Block<'a> {
    pub statements: &'a [Statement<'a>],
}

impl<'a> Block<'a> {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// `kung` with an optional `kundi`/`edi` tail. An else-if chain nests to
/// the right: each `kundi` is the `Else` of the clause before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IfStatement<'a> {
    pub condition: &'a Expression<'a>,
    pub then_block: Block<'a>,
    pub else_branch: Option<ElseBranch<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ElseBranch<'a> {
    If(&'a IfStatement<'a>),
    Block(Block<'a>),
}

impl<'a> IfStatement<'a> {
    /// Number of `kundi` clauses hanging off this statement.
    pub fn else_if_count(&self) -> usize {
        let mut count = 0;
        let mut current = self;
        while let Some(ElseBranch::If(next)) = current.else_branch {
            count += 1;
            current = next;
        }
        count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Number<'a> {
    Integer(i64),
    /// Digits of an integer wider than `i64`.
    BigInteger(&'a str),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "o",
            BinaryOperator::And => "at",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Expression<'a> {
    Number(Number<'a>),
    String(&'a str),
    Boolean(bool),
    Null,
    Identifier(&'a str),
    Binary {
        left: &'a Expression<'a>,
        operator: BinaryOperator,
        right: &'a Expression<'a>,
    },
    Unary {
        operator: UnaryOperator,
        operand: &'a Expression<'a>,
    },
    Call {
        name: &'a str,
        arguments: &'a [Expression<'a>],
    },
    ArrayLiteral(&'a [Expression<'a>]),
    Index {
        array: &'a Expression<'a>,
        index: &'a Expression<'a>,
    },
}

#[derive(Debug, Serialize)]
pub struct Program<'a> {
    pub statements: Vec<Statement<'a>>,
}

impl<'a> Program<'a> {
    pub fn new() -> Self {
        Program { statements: vec![] }
    }
}

impl<'a> Default for Program<'a> {
    fn default() -> Self {
        Self::new()
    }
}
