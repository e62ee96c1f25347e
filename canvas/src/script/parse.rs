//! Recursive descent parser for drawing programs.
//!
//! Statements are parsed top-down; binary operators use precedence climbing.
//! Semicolons may be omitted where a line break, `}` or end of input follows.
//! Nesting of statements and expressions, including operator chains, is
//! capped at [`MAX_NESTING`] levels so neither parsing nor evaluation can
//! exhaust the stack.

use std::rc::Rc;

use super::CompileError;
use super::ast::{BinaryOp, Expr, FunctionBody, FunctionDef, LogicalOp, Stmt, StmtKind, TemplateSeg, UnaryOp};
use super::lexer::{TemplatePart, Tok, Token, tokenize};
use crate::consts::MAX_NESTING;

const RESERVED: &[&str] = &[
    "let", "const", "var", "if", "else", "for", "of", "while", "function", "return", "break", "continue", "true",
    "false", "null", "undefined", "typeof", "new", "class", "this",
];

/// Parse a whole program body.
///
/// # Errors
///
/// Returns the first [`CompileError`] encountered.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, CompileError> {
    let tokens = tokenize(source, 1, 1)?;
    let mut parser = Parser::new(tokens);
    let mut body = Vec::new();
    while !parser.at_eof() {
        body.push(parser.statement()?);
    }
    Ok(body)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    loop_depth: usize,
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, loop_depth: 0, nesting: 0 }
    }

    fn deepen(&mut self) -> Result<(), CompileError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.error_here("nesting too deep"));
        }
        self.nesting += 1;
        Ok(())
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, CompileError>) -> Result<T, CompileError> {
        self.deepen()?;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    // ── Token access ────────────────────────────────────────────

    fn current(&self) -> &Token {
        // The token list always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_tok(&self, offset: usize) -> &Tok {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].tok
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().tok, Tok::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !matches!(tok.tok, Tok::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(&self.current().tok, Tok::Punct(q) if *q == p)
    }

    fn is_keyword(&self, kw: &str) -> bool {
        matches!(&self.current().tok, Tok::Ident(name) if name == kw)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.is_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> CompileError {
        let tok = self.current();
        CompileError { line: tok.line, column: tok.col, message: message.into() }
    }

    fn unexpected(&self) -> CompileError {
        let found = match &self.current().tok {
            Tok::Num(n) => format!("number {n}"),
            Tok::Str(_) | Tok::Template(_) => "string".to_owned(),
            Tok::Ident(name) => format!("'{name}'"),
            Tok::Punct(p) => format!("'{p}'"),
            Tok::Eof => "end of input".to_owned(),
        };
        self.error_here(format!("unexpected {found}"))
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), CompileError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{p}'")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match &self.current().tok {
            Tok::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here("expected identifier")),
        }
    }

    /// Property names after `.` and object keys may be reserved words.
    fn expect_property_name(&mut self) -> Result<String, CompileError> {
        match &self.current().tok {
            Tok::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here("expected property name")),
        }
    }

    fn consume_semicolon(&mut self) -> Result<(), CompileError> {
        if self.eat_punct(";") || self.is_punct("}") || self.at_eof() || self.current().newline_before {
            Ok(())
        } else {
            Err(self.error_here("expected ';'"))
        }
    }

    // =============================================================
    // Statements
    // =============================================================

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.current().line;
        let kind = self.nested(Self::statement_kind)?;
        Ok(Stmt { kind, line })
    }

    fn statement_kind(&mut self) -> Result<StmtKind, CompileError> {
        if self.eat_punct(";") {
            return Ok(StmtKind::Empty);
        }
        if self.eat_punct("{") {
            return Ok(StmtKind::Block(self.block_rest()?));
        }
        if self.is_keyword("let") || self.is_keyword("const") || self.is_keyword("var") {
            let decl = self.declaration()?;
            self.consume_semicolon()?;
            return Ok(decl);
        }
        if self.eat_keyword("if") {
            return self.if_statement();
        }
        if self.eat_keyword("for") {
            return self.for_statement();
        }
        if self.eat_keyword("while") {
            self.expect_punct("(")?;
            let cond = self.expression()?;
            self.expect_punct(")")?;
            let body = self.loop_body()?;
            return Ok(StmtKind::While { cond, body });
        }
        if self.is_keyword("function") && matches!(self.peek_tok(1), Tok::Ident(_)) {
            self.advance();
            let name = self.expect_ident()?;
            let def = self.function_rest(Some(name))?;
            return Ok(StmtKind::Function(def));
        }
        if self.eat_keyword("return") {
            let value = if self.is_punct(";") || self.is_punct("}") || self.at_eof() || self.current().newline_before {
                None
            } else {
                Some(self.expression()?)
            };
            self.consume_semicolon()?;
            return Ok(StmtKind::Return(value));
        }
        if self.is_keyword("break") || self.is_keyword("continue") {
            let is_break = self.is_keyword("break");
            if self.loop_depth == 0 {
                let word = if is_break { "break" } else { "continue" };
                return Err(self.error_here(format!("illegal {word} statement")));
            }
            self.advance();
            self.consume_semicolon()?;
            return Ok(if is_break { StmtKind::Break } else { StmtKind::Continue });
        }
        if self.is_keyword("class") || self.is_keyword("new") || self.is_keyword("this") {
            return Err(self.unexpected());
        }

        let expr = self.expression()?;
        self.consume_semicolon()?;
        Ok(StmtKind::Expr(expr))
    }

    /// Statements up to the closing `}` (the opening brace is already consumed).
    fn block_rest(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = Vec::new();
        while !self.is_punct("}") {
            if self.at_eof() {
                return Err(self.error_here("expected '}'"));
            }
            stmts.push(self.statement()?);
        }
        self.advance();
        Ok(stmts)
    }

    fn declaration(&mut self) -> Result<StmtKind, CompileError> {
        let constant = self.is_keyword("const");
        self.advance();
        let mut decls = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat_punct("=") {
                Some(self.assignment()?)
            } else {
                if constant {
                    return Err(self.error_here("missing initializer in const declaration"));
                }
                None
            };
            decls.push((name, init));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(StmtKind::Declare { constant, decls })
    }

    fn if_statement(&mut self) -> Result<StmtKind, CompileError> {
        self.expect_punct("(")?;
        let cond = self.expression()?;
        self.expect_punct(")")?;
        let then = Box::new(self.statement()?);
        let otherwise = if self.eat_keyword("else") { Some(Box::new(self.statement()?)) } else { None };
        Ok(StmtKind::If { cond, then, otherwise })
    }

    fn for_statement(&mut self) -> Result<StmtKind, CompileError> {
        self.expect_punct("(")?;

        // `for (const x of xs)`
        let is_decl = self.is_keyword("let") || self.is_keyword("const") || self.is_keyword("var");
        if is_decl && matches!(self.peek_tok(2), Tok::Ident(kw) if kw == "of") {
            self.advance();
            let name = self.expect_ident()?;
            self.advance();
            let iter = self.expression()?;
            self.expect_punct(")")?;
            let body = self.loop_body()?;
            return Ok(StmtKind::ForOf { name, iter, body });
        }

        let init = if self.is_punct(";") {
            None
        } else {
            let line = self.current().line;
            let kind = if is_decl { self.declaration()? } else { StmtKind::Expr(self.expression()?) };
            Some(Box::new(Stmt { kind, line }))
        };
        self.expect_punct(";")?;
        let cond = if self.is_punct(";") { None } else { Some(self.expression()?) };
        self.expect_punct(";")?;
        let step = if self.is_punct(")") { None } else { Some(self.expression()?) };
        self.expect_punct(")")?;
        let body = self.loop_body()?;
        Ok(StmtKind::For { init, cond, step, body })
    }

    fn loop_body(&mut self) -> Result<Box<Stmt>, CompileError> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body.map(Box::new)
    }

    /// Parameter list and body after the function name.
    fn function_rest(&mut self, name: Option<String>) -> Result<Rc<FunctionDef>, CompileError> {
        self.expect_punct("(")?;
        let params = self.param_list()?;
        self.expect_punct("{")?;
        let body = self.function_block()?;
        Ok(Rc::new(FunctionDef { name, params, body: FunctionBody::Block(body) }))
    }

    /// Identifiers up to and including the closing `)`.
    fn param_list(&mut self) -> Result<Vec<String>, CompileError> {
        let mut params = Vec::new();
        while !self.eat_punct(")") {
            params.push(self.expect_ident()?);
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        Ok(params)
    }

    /// Function body; loops outside the function do not admit `break` inside it.
    fn function_block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.block_rest();
        self.loop_depth = saved_loops;
        body
    }

    // =============================================================
    // Expressions
    // =============================================================

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, CompileError> {
        self.nested(Self::assignment_expr)
    }

    fn assignment_expr(&mut self) -> Result<Expr, CompileError> {
        if self.arrow_ahead() {
            return self.arrow();
        }

        let target = self.conditional()?;
        let op = match &self.current().tok {
            Tok::Punct("=") => None,
            Tok::Punct("+=") => Some(BinaryOp::Add),
            Tok::Punct("-=") => Some(BinaryOp::Sub),
            Tok::Punct("*=") => Some(BinaryOp::Mul),
            Tok::Punct("/=") => Some(BinaryOp::Div),
            Tok::Punct("%=") => Some(BinaryOp::Rem),
            Tok::Punct("**=") => Some(BinaryOp::Pow),
            _ => return Ok(target),
        };
        if !target.is_assignable() {
            return Err(self.error_here("invalid assignment target"));
        }
        self.advance();
        let value = self.assignment()?;
        Ok(Expr::Assign { op, target: Box::new(target), value: Box::new(value) })
    }

    /// `x =>` or `( ... ) =>` at the cursor.
    fn arrow_ahead(&self) -> bool {
        match self.peek_tok(0) {
            Tok::Ident(name) if !RESERVED.contains(&name.as_str()) => matches!(self.peek_tok(1), Tok::Punct("=>")),
            Tok::Punct("(") => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.peek_tok(offset) {
                        Tok::Punct("(") => depth += 1,
                        Tok::Punct(")") => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.peek_tok(offset + 1), Tok::Punct("=>"));
                            }
                        }
                        Tok::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn arrow(&mut self) -> Result<Expr, CompileError> {
        let params = if self.eat_punct("(") { self.param_list()? } else { vec![self.expect_ident()?] };
        self.expect_punct("=>")?;
        let body = if self.eat_punct("{") {
            FunctionBody::Block(self.function_block()?)
        } else {
            let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
            let expr = self.assignment();
            self.loop_depth = saved_loops;
            FunctionBody::Expr(Box::new(expr?))
        };
        Ok(Expr::Function(Rc::new(FunctionDef { name: None, params, body })))
    }

    fn conditional(&mut self) -> Result<Expr, CompileError> {
        let cond = self.binary(0)?;
        if !self.eat_punct("?") {
            return Ok(cond);
        }
        let then = self.assignment()?;
        self.expect_punct(":")?;
        let otherwise = self.assignment()?;
        Ok(Expr::Conditional(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    fn binary(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let outer = self.nesting;
        let result = self.binary_chain(min_bp);
        self.nesting = outer;
        result
    }

    /// Every operator folded into the chain adds a level.
    fn binary_chain(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let mut left = self.unary()?;
        loop {
            let Tok::Punct(p) = self.current().tok else { break };
            let Some((lbp, rbp, op)) = binary_op(p) else { break };
            if lbp < min_bp {
                break;
            }
            self.deepen()?;
            self.advance();
            let right = self.binary(rbp)?;
            left = match op {
                Op::Binary(op) => Expr::Binary(op, Box::new(left), Box::new(right)),
                Op::Logical(op) => Expr::Logical(op, Box::new(left), Box::new(right)),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        let op = match &self.current().tok {
            Tok::Punct("-") => Some(UnaryOp::Neg),
            Tok::Punct("+") => Some(UnaryOp::Plus),
            Tok::Punct("!") => Some(UnaryOp::Not),
            Tok::Ident(kw) if kw == "typeof" => Some(UnaryOp::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }

        if self.is_punct("++") || self.is_punct("--") {
            let delta = if self.is_punct("++") { 1.0 } else { -1.0 };
            self.advance();
            let target = self.nested(Self::unary)?;
            if !target.is_assignable() {
                return Err(self.error_here("invalid update target"));
            }
            return Ok(Expr::Update { delta, prefix: true, target: Box::new(target) });
        }

        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, CompileError> {
        let outer = self.nesting;
        let result = self.postfix_chain();
        self.nesting = outer;
        result
    }

    /// Every member access, index, call or update in the chain adds a level.
    fn postfix_chain(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.primary()?;
        loop {
            if ![".", "[", "(", "++", "--"].iter().any(|p| self.is_punct(p)) {
                return Ok(expr);
            }
            self.deepen()?;
            if self.eat_punct(".") {
                let name = self.expect_property_name()?;
                expr = Expr::Member(Box::new(expr), name);
            } else if self.eat_punct("[") {
                let index = self.expression()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat_punct("(") {
                let args = self.arguments()?;
                expr = Expr::Call(Box::new(expr), args);
            } else if (self.is_punct("++") || self.is_punct("--")) && !self.current().newline_before {
                if !expr.is_assignable() {
                    return Err(self.error_here("invalid update target"));
                }
                let delta = if self.is_punct("++") { 1.0 } else { -1.0 };
                self.advance();
                expr = Expr::Update { delta, prefix: false, target: Box::new(expr) };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Call arguments up to and including `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut args = Vec::new();
        while !self.eat_punct(")") {
            args.push(self.assignment()?);
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.current().clone();
        match token.tok {
            Tok::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Str(Rc::from(s)))
            }
            Tok::Template(parts) => {
                self.advance();
                self.nested(|parser| template(parts, parser.nesting))
            }
            Tok::Punct("(") => {
                self.advance();
                let expr = self.expression()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            Tok::Punct("[") => {
                self.advance();
                let mut items = Vec::new();
                while !self.eat_punct("]") {
                    items.push(self.assignment()?);
                    if !self.is_punct("]") {
                        self.expect_punct(",")?;
                    }
                }
                Ok(Expr::Array(items))
            }
            Tok::Punct("{") => {
                self.advance();
                self.object_literal()
            }
            Tok::Ident(name) => match name.as_str() {
                "true" => {
                    self.advance();
                    Ok(Expr::Bool(true))
                }
                "false" => {
                    self.advance();
                    Ok(Expr::Bool(false))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Null)
                }
                "undefined" => {
                    self.advance();
                    Ok(Expr::Undefined)
                }
                "function" => {
                    self.advance();
                    let fn_name = if matches!(self.current().tok, Tok::Ident(_)) { Some(self.expect_ident()?) } else { None };
                    Ok(Expr::Function(self.function_rest(fn_name)?))
                }
                _ if RESERVED.contains(&name.as_str()) => Err(self.unexpected()),
                _ => {
                    self.advance();
                    Ok(Expr::Ident(name))
                }
            },
            Tok::Punct(_) | Tok::Eof => Err(self.unexpected()),
        }
    }

    fn object_literal(&mut self) -> Result<Expr, CompileError> {
        let mut props = Vec::new();
        while !self.eat_punct("}") {
            let key = match self.current().tok.clone() {
                Tok::Str(s) => {
                    self.advance();
                    s
                }
                Tok::Num(n) => {
                    self.advance();
                    super::value::format_number(n)
                }
                Tok::Ident(_) => self.expect_property_name()?,
                _ => return Err(self.error_here("expected property name")),
            };
            let value = if self.eat_punct(":") {
                self.assignment()?
            } else if RESERVED.contains(&key.as_str()) {
                return Err(self.error_here("expected ':'"));
            } else {
                Expr::Ident(key.clone())
            };
            props.push((key, value));
            if !self.is_punct("}") {
                self.expect_punct(",")?;
            }
        }
        Ok(Expr::Object(props))
    }
}

/// Parse the embedded expressions of a template literal found `nesting`
/// levels deep.
fn template(parts: Vec<TemplatePart>, nesting: usize) -> Result<Expr, CompileError> {
    let mut segs = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            TemplatePart::Text(text) => segs.push(TemplateSeg::Text(Rc::from(text))),
            TemplatePart::Expr { source, line, col } => {
                let tokens = tokenize(&source, line, col)?;
                let mut sub = Parser::new(tokens);
                sub.nesting = nesting;
                let expr = sub.expression()?;
                if !sub.at_eof() {
                    return Err(sub.unexpected());
                }
                segs.push(TemplateSeg::Expr(expr));
            }
        }
    }
    Ok(Expr::Template(segs))
}

enum Op {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Left and right binding power for a binary operator.
fn binary_op(p: &str) -> Option<(u8, u8, Op)> {
    let entry = match p {
        "??" => (1, 2, Op::Logical(LogicalOp::Nullish)),
        "||" => (3, 4, Op::Logical(LogicalOp::Or)),
        "&&" => (5, 6, Op::Logical(LogicalOp::And)),
        "==" => (7, 8, Op::Binary(BinaryOp::LooseEq)),
        "!=" => (7, 8, Op::Binary(BinaryOp::LooseNe)),
        "===" => (7, 8, Op::Binary(BinaryOp::StrictEq)),
        "!==" => (7, 8, Op::Binary(BinaryOp::StrictNe)),
        "<" => (9, 10, Op::Binary(BinaryOp::Lt)),
        "<=" => (9, 10, Op::Binary(BinaryOp::Le)),
        ">" => (9, 10, Op::Binary(BinaryOp::Gt)),
        ">=" => (9, 10, Op::Binary(BinaryOp::Ge)),
        "+" => (11, 12, Op::Binary(BinaryOp::Add)),
        "-" => (11, 12, Op::Binary(BinaryOp::Sub)),
        "*" => (13, 14, Op::Binary(BinaryOp::Mul)),
        "/" => (13, 14, Op::Binary(BinaryOp::Div)),
        "%" => (13, 14, Op::Binary(BinaryOp::Rem)),
        // Right-associative.
        "**" => (16, 15, Op::Binary(BinaryOp::Pow)),
        _ => return None,
    };
    Some(entry)
}
