
use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use log::debug;

use crate::ast::{
    BinaryOperator, Block, ElseBranch, Expression, IfStatement, Number, Program, Statement,
    UnaryOperator,
};
use crate::error::{CompileResult, CompilerError, ErrorKind};
use crate::lexer::{Delimiter, Keyword, Operator, Token, TokenKind};

#[derive(PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Or,          // o
    And,         // at
    Equals,      // ==
    LessGreater, // > or <
    Sum,         // +
    Product,     // *
    Prefix,      // -X or hindi X
}

/// Deepest nesting of blocks and subexpressions a program may use.
pub const MAX_NESTING_DEPTH: usize = 64;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    arena: &'a Bump,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token>, arena: &'a Bump) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::EndOfInput, line, column));
        }
        Parser { tokens, position: 0, depth: 0, arena }
    }

    fn cur_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + 1).min(last)]
    }

    fn next_token(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    pub fn parse_program(&mut self) -> CompileResult<Program<'a>> {
        let mut program = Program::new();

        while !self.cur_token().is_eof() {
            let stmt = self.parse_statement()?;
            program.statements.push(stmt);
        }
        debug!("parsed {} top-level statements", program.statements.len());
        Ok(program)
    }

    fn parse_statement(&mut self) -> CompileResult<Statement<'a>> {
        match &self.cur_token().kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_variable_declaration(),
            TokenKind::Keyword(Keyword::Paraan) => self.parse_function_definition(),
            TokenKind::Keyword(Keyword::Kung) => {
                self.next_token();
                Ok(Statement::If(self.parse_conditional()?))
            }
            TokenKind::Keyword(Keyword::Habang) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::Para) => self.parse_for_statement(),
            TokenKind::Keyword(Keyword::Bumalik) => self.parse_return_statement(),
            TokenKind::Keyword(Keyword::Idikta) => {
                self.next_token();
                let expression = self.parse_expression(Precedence::Lowest)?;
                self.skip_semicolon();
                Ok(Statement::Print { expression })
            }
            TokenKind::Keyword(Keyword::Itigil) => {
                self.next_token();
                self.skip_semicolon();
                Ok(Statement::Break)
            }
            TokenKind::Keyword(Keyword::Ituloy) => {
                self.next_token();
                self.skip_semicolon();
                Ok(Statement::Continue)
            }
            TokenKind::Keyword(Keyword::Subukan) => self.parse_try_statement(),
            TokenKind::Identifier(_) if self.peek_token().is_operator(Operator::Assign) => {
                self.parse_assignment()
            }
            _ => self.parse_expression_statement(),
        }
    }

    // --- Variable Declaration ---
    fn parse_variable_declaration(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // var
        let name = self.expect_identifier()?;

        // Optional type annotation: var x: int = ...
        let mut declared_type = None;
        if self.cur_token().is_delimiter(Delimiter::Colon) {
            self.next_token();
            declared_type = Some(self.expect_identifier()?);
        }

        let mut initializer = None;
        if self.cur_token().is_operator(Operator::Assign) {
            self.next_token();
            initializer = Some(self.parse_expression(Precedence::Lowest)?);
        }
        self.skip_semicolon();

        Ok(Statement::VariableDeclaration { name, declared_type, initializer })
    }

    fn parse_assignment(&mut self) -> CompileResult<Statement<'a>> {
        let name = self.expect_identifier()?;
        self.next_token(); // =
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(Statement::Assignment { name, value })
    }

    // --- Function Declaration ---
    fn parse_function_definition(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // paraan
        let name = self.expect_identifier()?;

        self.expect_delimiter(Delimiter::LParen)?;
        let mut parameters = BumpVec::new_in(self.arena);
        if !self.cur_token().is_delimiter(Delimiter::RParen) {
            parameters.push(self.expect_identifier()?);
            while self.cur_token().is_delimiter(Delimiter::Comma) {
                self.next_token();
                parameters.push(self.expect_identifier()?);
            }
        }
        self.expect_delimiter(Delimiter::RParen)?;

        let body = self.parse_block()?;
        Ok(Statement::FunctionDefinition {
            name,
            parameters: parameters.into_bump_slice(),
            body,
        })
    }

    fn parse_return_statement(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // bumalik

        let ends_here = {
            let cur = self.cur_token();
            cur.is_eof()
                || cur.is_delimiter(Delimiter::Semicolon)
                || cur.is_delimiter(Delimiter::RBrace)
        };
        let value = if ends_here {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.skip_semicolon();

        Ok(Statement::Return { value })
    }

    /// Condition and block of a `kung` clause (keyword already consumed)
    /// plus its `kundi`/`edi` tail.
    fn parse_conditional(&mut self) -> CompileResult<IfStatement<'a>> {
        let condition = self.parse_expression(Precedence::Lowest)?;
        let then_block = self.parse_block()?;

        let mut else_ifs = Vec::new();
        let mut else_block = None;
        loop {
            if self.cur_token().is_keyword(Keyword::Kundi) {
                self.next_token();
            } else if self.cur_token().is_keyword(Keyword::Edi) {
                self.next_token();
                // edi kung ... reads the same as kundi ...
                if self.cur_token().is_keyword(Keyword::Kung) {
                    self.next_token();
                } else {
                    else_block = Some(self.parse_block()?);
                    break;
                }
            } else {
                break;
            }
            let condition = self.parse_expression(Precedence::Lowest)?;
            let then_block = self.parse_block()?;
            else_ifs.push((condition, then_block));
        }

        // Built back to front: each `kundi` is the else of the clause before it.
        let mut else_branch = else_block.map(ElseBranch::Block);
        for (condition, then_block) in else_ifs.into_iter().rev() {
            let clause = self.arena.alloc(IfStatement { condition, then_block, else_branch });
            else_branch = Some(ElseBranch::If(&*clause));
        }

        Ok(IfStatement { condition, then_block, else_branch })
    }

    // --- While ---
    fn parse_while_statement(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // habang
        let condition = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block()?;
        Ok(Statement::While { condition, body })
    }

    // --- For ---
    fn parse_for_statement(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // para
        let variable = self.expect_identifier()?;
        self.expect_keyword(Keyword::Sa)?;
        let iterable = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block()?;
        Ok(Statement::For { variable, iterable, body })
    }

    // --- Try / Except ---
    fn parse_try_statement(&mut self) -> CompileResult<Statement<'a>> {
        self.next_token(); // subukan
        let try_block = self.parse_block()?;
        self.expect_keyword(Keyword::Saluhin)?;
        let exception_name = self.expect_identifier()?;
        let except_block = self.parse_block()?;
        Ok(Statement::TryExcept { try_block, exception_name, except_block })
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Statement<'a>> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(Statement::Expression { expression })
    }

    fn parse_block(&mut self) -> CompileResult<Block<'a>> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> CompileResult<Block<'a>> {
        self.expect_delimiter(Delimiter::LBrace)?;
        let mut statements = BumpVec::new_in(self.arena);

        while !self.cur_token().is_delimiter(Delimiter::RBrace) && !self.cur_token().is_eof() {
            statements.push(self.parse_statement()?);
        }
        self.expect_delimiter(Delimiter::RBrace)?;

        Ok(Block { statements: statements.into_bump_slice() })
    }

    // --- Expression Parsing ---
    fn parse_expression(&mut self, precedence: Precedence) -> CompileResult<&'a Expression<'a>> {
        self.nested(|p| p.parse_operators(precedence))
    }

    fn parse_operators(&mut self, precedence: Precedence) -> CompileResult<&'a Expression<'a>> {
        let mut left = self.parse_prefix()?;

        while precedence < self.cur_precedence() {
            let operator = match binary_operator(&self.cur_token().kind) {
                Some(op) => op,
                None => break,
            };
            let op_precedence = self.cur_precedence();
            // Every fold puts `left` one level further down the tree.
            self.descend()?;
            self.next_token();
            // Same-level operators stop the right operand, so chains group leftwards.
            let right = self.parse_expression(op_precedence)?;
            left = &*self.arena.alloc(Expression::Binary { left, operator, right });
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> CompileResult<&'a Expression<'a>> {
        let operator = match &self.cur_token().kind {
            TokenKind::Operator(Operator::Minus) => UnaryOperator::Negate,
            TokenKind::Operator(Operator::Not) => UnaryOperator::Not,
            _ => return self.parse_primary(),
        };
        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;
        Ok(&*self.arena.alloc(Expression::Unary { operator, operand }))
    }

    fn parse_primary(&mut self) -> CompileResult<&'a Expression<'a>> {
        let is_call = self.peek_token().is_delimiter(Delimiter::LParen);
        let expr = match &self.cur_token().kind {
            TokenKind::Integer(val) => {
                let e = Expression::Number(Number::Integer(*val));
                self.next_token();
                e
            }
            TokenKind::BigInteger(digits) => {
                let e = Expression::Number(Number::BigInteger(self.arena.alloc_str(digits)));
                self.next_token();
                e
            }
            TokenKind::Float(val) => {
                let e = Expression::Number(Number::Float(*val));
                self.next_token();
                e
            }
            TokenKind::String(val) => {
                let e = Expression::String(self.arena.alloc_str(val));
                self.next_token();
                e
            }
            TokenKind::Keyword(Keyword::Tama) => {
                self.next_token();
                Expression::Boolean(true)
            }
            TokenKind::Keyword(Keyword::Mali) => {
                self.next_token();
                Expression::Boolean(false)
            }
            TokenKind::Keyword(Keyword::Wala) => {
                self.next_token();
                Expression::Null
            }
            TokenKind::Keyword(Keyword::Saklaw) if is_call => {
                self.next_token();
                self.parse_call(Keyword::Saklaw.as_str())?
            }
            TokenKind::Identifier(name) => {
                let name: &'a str = self.arena.alloc_str(name);
                self.next_token();
                if is_call {
                    self.parse_call(name)?
                } else {
                    Expression::Identifier(name)
                }
            }
            TokenKind::Delimiter(Delimiter::LParen) => {
                self.next_token();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect_delimiter(Delimiter::RParen)?;
                *inner
            }
            TokenKind::Delimiter(Delimiter::LBracket) => {
                self.next_token();
                Expression::ArrayLiteral(self.parse_expression_list(Delimiter::RBracket)?)
            }
            _ => return Err(self.unexpected("ekspresyon")),
        };

        let mut expr = &*self.arena.alloc(expr);
        while self.cur_token().is_delimiter(Delimiter::LBracket) {
            self.next_token();
            let index = self.parse_expression(Precedence::Lowest)?;
            self.expect_delimiter(Delimiter::RBracket)?;
            expr = &*self.arena.alloc(Expression::Index { array: expr, index });
        }
        Ok(expr)
    }

    /// Name already consumed; the current token is `(`.
    fn parse_call(&mut self, name: &'a str) -> CompileResult<Expression<'a>> {
        self.expect_delimiter(Delimiter::LParen)?;
        let arguments = self.parse_expression_list(Delimiter::RParen)?;
        Ok(Expression::Call { name, arguments })
    }

    /// Comma-separated expressions up to and including `end`.
    fn parse_expression_list(&mut self, end: Delimiter) -> CompileResult<&'a [Expression<'a>]> {
        let mut list = BumpVec::new_in(self.arena);

        if self.cur_token().is_delimiter(end) {
            self.next_token();
            return Ok(list.into_bump_slice());
        }

        list.push(*self.parse_expression(Precedence::Lowest)?);
        while self.cur_token().is_delimiter(Delimiter::Comma) {
            self.next_token();
            list.push(*self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_delimiter(end)?;

        Ok(list.into_bump_slice())
    }

    /// Run `parse` one nesting level down. The depth is restored afterwards,
    /// including the levels a left-leaning operator chain added.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        let depth = self.depth;
        self.descend()?;
        let result = parse(self);
        self.depth = depth;
        result
    }

    fn descend(&mut self) -> CompileResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            let token = self.cur_token();
            return Err(CompilerError::at(
                ErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                token.line,
                token.column,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn cur_precedence(&self) -> Precedence {
        match &self.cur_token().kind {
            TokenKind::Operator(op) => match op {
                Operator::Or => Precedence::Or,
                Operator::And => Precedence::And,
                Operator::EqualEqual | Operator::NotEqual => Precedence::Equals,
                Operator::Less | Operator::Greater | Operator::LessEqual | Operator::GreaterEqual => {
                    Precedence::LessGreater
                }
                Operator::Plus | Operator::Minus => Precedence::Sum,
                Operator::Star | Operator::Slash | Operator::Percent => Precedence::Product,
                Operator::Assign | Operator::Not => Precedence::Lowest,
            },
            _ => Precedence::Lowest,
        }
    }

    fn skip_semicolon(&mut self) {
        if self.cur_token().is_delimiter(Delimiter::Semicolon) {
            self.next_token();
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<&'a str> {
        match &self.cur_token().kind {
            TokenKind::Identifier(name) => {
                let name: &'a str = self.arena.alloc_str(name);
                self.next_token();
                Ok(name)
            }
            _ => Err(self.unexpected("pangalan")),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<()> {
        if self.cur_token().is_keyword(keyword) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", keyword.as_str())))
        }
    }

    fn expect_delimiter(&mut self, delimiter: Delimiter) -> CompileResult<()> {
        if self.cur_token().is_delimiter(delimiter) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", delimiter.as_char())))
        }
    }

    fn unexpected(&self, expected: &str) -> CompilerError {
        let token = self.cur_token();
        if token.is_eof() {
            return CompilerError::unpositioned(ErrorKind::UnexpectedEndOfInput);
        }
        CompilerError::at(
            ErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
            },
            token.line,
            token.column,
        )
    }
}

fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Operator(op) => op,
        _ => return None,
    };
    Some(match op {
        Operator::Or => BinaryOperator::Or,
        Operator::And => BinaryOperator::And,
        Operator::EqualEqual => BinaryOperator::Equal,
        Operator::NotEqual => BinaryOperator::NotEqual,
        Operator::Less => BinaryOperator::Less,
        Operator::Greater => BinaryOperator::Greater,
        Operator::LessEqual => BinaryOperator::LessEqual,
        Operator::GreaterEqual => BinaryOperator::GreaterEqual,
        Operator::Plus => BinaryOperator::Add,
        Operator::Minus => BinaryOperator::Subtract,
        Operator::Star => BinaryOperator::Multiply,
        Operator::Slash => BinaryOperator::Divide,
        Operator::Percent => BinaryOperator::Modulo,
        Operator::Assign | Operator::Not => return None,
    })
}

/// Parse a token sequence into a program whose nodes live in `arena`.
pub fn parse<'a>(tokens: Vec<Token>, arena: &'a Bump) -> CompileResult<Program<'a>> {
    Parser::new(tokens, arena).parse_program()
}
