use std::fmt;

use crate::lexer::{Lexer, Token};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expr },
    Return(Expr),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Str(String),
    Boolean(bool),
    Identifier(String),
    Prefix {
        operator: String,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function {
        parameters: Vec<String>,
        body: BlockStatement,
        // Filled in by `let name = fn(..) {..}` so the body can call itself.
        name: String,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    Macro {
        parameters: Vec<String>,
        body: BlockStatement,
    },
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return(value) => write!(f, "return {};", value),
            Statement::Expression(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(f, "{}", value),
            Expr::Str(value) => write!(f, "{}", value),
            Expr::Boolean(value) => write!(f, "{}", value),
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }
            Expr::Function {
                parameters,
                body,
                name,
            } => {
                write!(f, "fn")?;
                if !name.is_empty() {
                    write!(f, "<{}>", name)?;
                }
                write!(f, "({}) {}", parameters.join(", "), body)
            }
            Expr::Call {
                function,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expr::Array(elements) => {
                let elems: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elems.join(", "))
            }
            Expr::Hash(pairs) => {
                let pairs: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expr::Macro { parameters, body } => {
                write!(f, "macro({}) {}", parameters.join(", "), body)
            }
        }
    }
}

/// Rewrites an AST bottom-up: children are transformed before the node
/// itself is handed to `f`. The macro expander and `unquote` both hang off
/// this walker.
pub fn modify_program(program: Program, f: &mut dyn FnMut(Expr) -> Expr) -> Program {
    Program {
        statements: program
            .statements
            .into_iter()
            .map(|s| modify_statement(s, f))
            .collect(),
    }
}

fn modify_block(block: BlockStatement, f: &mut dyn FnMut(Expr) -> Expr) -> BlockStatement {
    BlockStatement {
        statements: block
            .statements
            .into_iter()
            .map(|s| modify_statement(s, f))
            .collect(),
    }
}

fn modify_statement(stmt: Statement, f: &mut dyn FnMut(Expr) -> Expr) -> Statement {
    match stmt {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expr(value, f),
        },
        Statement::Return(value) => Statement::Return(modify_expr(value, f)),
        Statement::Expression(value) => Statement::Expression(modify_expr(value, f)),
    }
}

pub fn modify_expr(expr: Expr, f: &mut dyn FnMut(Expr) -> Expr) -> Expr {
    let expr = match expr {
        Expr::Prefix { operator, right } => Expr::Prefix {
            operator,
            right: Box::new(modify_expr(*right, f)),
        },
        Expr::Infix {
            left,
            operator,
            right,
        } => Expr::Infix {
            left: Box::new(modify_expr(*left, f)),
            operator,
            right: Box::new(modify_expr(*right, f)),
        },
        Expr::Index { left, index } => Expr::Index {
            left: Box::new(modify_expr(*left, f)),
            index: Box::new(modify_expr(*index, f)),
        },
        Expr::If {
            condition,
            consequence,
            alternative,
        } => Expr::If {
            condition: Box::new(modify_expr(*condition, f)),
            consequence: modify_block(consequence, f),
            alternative: alternative.map(|alt| modify_block(alt, f)),
        },
        Expr::Function {
            parameters,
            body,
            name,
        } => Expr::Function {
            parameters,
            body: modify_block(body, f),
            name,
        },
        Expr::Call {
            function,
            arguments,
        } => Expr::Call {
            function: Box::new(modify_expr(*function, f)),
            arguments: arguments.into_iter().map(|a| modify_expr(a, f)).collect(),
        },
        Expr::Array(elements) => {
            Expr::Array(elements.into_iter().map(|e| modify_expr(e, f)).collect())
        }
        Expr::Hash(pairs) => Expr::Hash(
            pairs
                .into_iter()
                .map(|(k, v)| (modify_expr(k, f), modify_expr(v, f)))
                .collect(),
        ),
        other => other,
    };

    f(expr)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::Eq | Token::NotEq => Precedence::Equals,
        Token::Lt | Token::Gt => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Asterisk | Token::Slash => Precedence::Product,
        Token::Lparen => Precedence::Call,
        Token::Lbracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Pratt parser over the token stream. Errors are collected rather than
/// aborting, so a REPL line can report all of them at once.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::Eof,
            peek_token: Token::Eof,
            errors: Vec::new(),
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn expect_peek(&mut self, expected: Token) -> bool {
        if self.peek_token == expected {
            self.next_token();
            true
        } else {
            self.peek_error(&expected);
            false
        }
    }

    fn peek_ident(&mut self) -> Option<String> {
        if let Token::Ident(name) = &self.peek_token {
            let name = name.clone();
            self.next_token();
            Some(name)
        } else {
            self.errors.push(format!(
                "expected next token to be IDENT, got {} instead",
                self.peek_token.kind()
            ));
            None
        }
    }

    fn peek_error(&mut self, expected: &Token) {
        self.errors.push(format!(
            "expected next token to be {}, got {} instead",
            expected.kind(),
            self.peek_token.kind()
        ));
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while self.cur_token != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let name = self.peek_ident()?;

        if !self.expect_peek(Token::Assign) {
            return None;
        }
        self.next_token();

        let mut value = self.parse_expression(Precedence::Lowest)?;
        if let Expr::Function { name: fn_name, .. } = &mut value {
            fn_name.clone_from(&name);
        }

        if self.peek_token == Token::Semicolon {
            self.next_token();
        }

        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token == Token::Semicolon {
            self.next_token();
        }

        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token == Token::Semicolon {
            self.next_token();
        }

        Some(Statement::Expression(value))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while self.peek_token != Token::Semicolon && precedence < precedence_of(&self.peek_token) {
            left = match self.peek_token {
                Token::Plus
                | Token::Minus
                | Token::Asterisk
                | Token::Slash
                | Token::Eq
                | Token::NotEq
                | Token::Lt
                | Token::Gt => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                Token::Lparen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                Token::Lbracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match &self.cur_token {
            Token::Ident(name) => Some(Expr::Identifier(name.clone())),
            Token::Int(literal) => match literal.parse() {
                Ok(value) => Some(Expr::Integer(value)),
                Err(_) => {
                    self.errors
                        .push(format!("could not parse {} as integer", literal));
                    None
                }
            },
            Token::Str(text) => Some(Expr::Str(text.clone())),
            Token::True => Some(Expr::Boolean(true)),
            Token::False => Some(Expr::Boolean(false)),
            Token::Bang | Token::Minus => self.parse_prefix_expression(),
            Token::Lparen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Function => self.parse_function_literal(),
            Token::Macro => self.parse_macro_literal(),
            Token::Lbracket => {
                let elements = self.parse_expression_list(Token::Rbracket)?;
                Some(Expr::Array(elements))
            }
            Token::Lbrace => self.parse_hash_literal(),
            other => {
                self.errors.push(format!(
                    "no prefix parse function for {} found",
                    other.kind()
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expr> {
        let operator = self.cur_token.kind().to_string();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expr::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.cur_token.kind().to_string();
        let precedence = precedence_of(&self.cur_token);
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expr::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(Token::Rparen) {
            return None;
        }

        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        if !self.expect_peek(Token::Lparen) {
            return None;
        }
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(Token::Rparen) {
            return None;
        }
        if !self.expect_peek(Token::Lbrace) {
            return None;
        }

        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token == Token::Else {
            self.next_token();
            if !self.expect_peek(Token::Lbrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();

        while self.cur_token != Token::Rbrace && self.cur_token != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }

        block
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(Token::Lparen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(Token::Lbrace) {
            return None;
        }

        Some(Expr::Function {
            parameters,
            body: self.parse_block_statement(),
            name: String::new(),
        })
    }

    fn parse_macro_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(Token::Lparen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(Token::Lbrace) {
            return None;
        }

        Some(Expr::Macro {
            parameters,
            body: self.parse_block_statement(),
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();

        if self.peek_token == Token::Rparen {
            self.next_token();
            return Some(parameters);
        }

        parameters.push(self.peek_ident()?);

        while self.peek_token == Token::Comma {
            self.next_token();
            parameters.push(self.peek_ident()?);
        }

        if !self.expect_peek(Token::Rparen) {
            return None;
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expr) -> Option<Expr> {
        let arguments = self.parse_expression_list(Token::Rparen)?;

        Some(Expr::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_expression_list(&mut self, end: Token) -> Option<Vec<Expr>> {
        let mut list = Vec::new();

        if self.peek_token == end {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token == Token::Comma {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expr) -> Option<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(Token::Rbracket) {
            return None;
        }

        Some(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();

        while self.peek_token != Token::Rbrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(Token::Colon) {
                return None;
            }
            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek_token != Token::Rbrace && !self.expect_peek(Token::Comma) {
                return None;
            }
        }

        if !self.expect_peek(Token::Rbrace) {
            return None;
        }

        Some(Expr::Hash(pairs))
    }
}
