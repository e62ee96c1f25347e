//! Tokenizer for drawing programs.

use super::CompileError;
use crate::consts::MAX_NESTING;

/// Token payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Num(f64),
    Str(String),
    /// Backtick template, split into literal text and `${...}` sources.
    Template(Vec<TemplatePart>),
    /// Identifier or keyword.
    Ident(String),
    Punct(&'static str),
    Eof,
}

/// One piece of a template literal before it is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    /// Source of an embedded expression and its position.
    Expr { source: String, line: u32, col: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub line: u32,
    pub col: u32,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

// Longest first so that greedy matching picks `===` over `==`.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "**=", "==", "!=", "<=", ">=", "&&", "||", "??", "=>", "++", "--", "+=", "-=", "*=", "/=", "%=",
    "**", "+", "-", "*", "/", "%", "<", ">", "=", "!", "(", ")", "{", "}", "[", "]", ",", ";", ":", ".", "?",
];

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    /// Template literals currently open inside `${...}` expressions.
    templates: usize,
}

/// Split `src` into tokens, ending with [`Tok::Eof`].
///
/// `line` / `col` give the position of the first character, so embedded
/// template expressions report positions in the enclosing program.
///
/// # Errors
///
/// Returns a [`CompileError`] for unterminated strings, templates and
/// comments, malformed numbers, unknown characters and templates nested
/// deeper than [`MAX_NESTING`].
pub fn tokenize(src: &str, line: u32, col: u32) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer { src, chars: src.chars().collect(), pos: 0, line, col, templates: 0 };
    lexer.run()
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn error(&self, line: u32, col: u32, message: impl Into<String>) -> CompileError {
        CompileError { line, column: col, message: message.into() }
    }

    fn run(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        let mut newline_before = false;
        loop {
            newline_before |= self.skip_trivia()?;
            let (line, col) = (self.line, self.col);
            let Some(ch) = self.peek() else {
                tokens.push(Token { tok: Tok::Eof, line, col, newline_before: true });
                return Ok(tokens);
            };

            let tok = if ch.is_ascii_digit() || (ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())) {
                self.number(line, col)?
            } else if ch == '"' || ch == '\'' {
                self.string(ch, line, col)?
            } else if ch == '`' {
                self.template(line, col)?
            } else if is_ident_start(ch) {
                self.ident()
            } else {
                self.punct(line, col)?
            };

            tokens.push(Token { tok, line, col, newline_before });
            newline_before = false;
        }
    }

    /// Skip whitespace and comments. Returns whether a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, CompileError> {
        let mut saw_newline = false;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                saw_newline = true;
                self.bump();
            } else if ch.is_whitespace() {
                self.bump();
            } else if ch == '/' && self.peek_at(1) == Some('/') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if ch == '/' && self.peek_at(1) == Some('*') {
                let (line, col) = (self.line, self.col);
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some('\n') => saw_newline = true,
                        Some(_) => {}
                        None => return Err(self.error(line, col, "unterminated comment")),
                    }
                }
            } else {
                break;
            }
        }
        Ok(saw_newline)
    }

    fn number(&mut self, line: u32, col: u32) -> Result<Tok, CompileError> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' || ch == '_' {
                if ch != '_' {
                    text.push(ch);
                }
                self.bump();
            } else if (ch == 'e' || ch == 'E')
                && (self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.peek_at(1), Some('+' | '-')) && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())))
            {
                text.push(ch);
                self.bump();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.bump();
                }
            } else {
                break;
            }
        }
        text.parse::<f64>()
            .map(Tok::Num)
            .map_err(|_| self.error(line, col, format!("invalid number '{text}'")))
    }

    fn escape(&mut self, line: u32, col: u32) -> Result<char, CompileError> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('u') => {
                let mut hex = String::new();
                for _ in 0..4 {
                    match self.bump() {
                        Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                        _ => return Err(self.error(line, col, "invalid unicode escape")),
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .map_err(|_| self.error(line, col, "invalid unicode escape"))
                    .and_then(|code| char::from_u32(code).ok_or_else(|| self.error(line, col, "invalid unicode escape")))
            }
            Some(other) => Ok(other),
            None => Err(self.error(line, col, "unterminated string")),
        }
    }

    fn string(&mut self, quote: char, line: u32, col: u32) -> Result<Tok, CompileError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Tok::Str(out)),
                Some('\\') => out.push(self.escape(line, col)?),
                Some('\n') | None => return Err(self.error(line, col, "unterminated string")),
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self, line: u32, col: u32) -> Result<Tok, CompileError> {
        self.bump();
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(line, col, "unterminated template literal")),
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    text.push(self.escape(line, col)?);
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    self.bump();
                    self.bump();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                    }
                    let (expr_line, expr_col) = (self.line, self.col);
                    let start = self.byte_offset();
                    self.skip_balanced(line, col)?;
                    let source = self.src[start..self.byte_offset()].to_owned();
                    // Closing brace.
                    self.bump();
                    parts.push(TemplatePart::Expr { source, line: expr_line, col: expr_col });
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        Ok(Tok::Template(parts))
    }

    fn byte_offset(&self) -> usize {
        self.chars[..self.pos].iter().map(|c| c.len_utf8()).sum()
    }

    /// Advance to the `}` closing a `${` expression, skipping nested braces
    /// and string literals. Leaves the cursor on the closing brace.
    fn skip_balanced(&mut self, line: u32, col: u32) -> Result<(), CompileError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.error(line, col, "unterminated template expression")),
                Some('}') if depth == 0 => return Ok(()),
                Some('}') => depth -= 1,
                Some('{') => depth += 1,
                Some(q @ ('"' | '\'')) => {
                    let (l, c) = (self.line, self.col);
                    self.string(q, l, c)?;
                    continue;
                }
                Some('`') => {
                    let (l, c) = (self.line, self.col);
                    if self.templates >= MAX_NESTING {
                        return Err(self.error(l, c, "nesting too deep"));
                    }
                    self.templates += 1;
                    let nested = self.template(l, c);
                    self.templates -= 1;
                    nested?;
                    continue;
                }
                Some(_) => {}
            }
            self.bump();
        }
    }

    fn ident(&mut self) -> Tok {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                name.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Tok::Ident(name)
    }

    fn punct(&mut self, line: u32, col: u32) -> Result<Tok, CompileError> {
        for p in PUNCTUATORS {
            let matches = p
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_at(i) == Some(c));
            if matches {
                for _ in 0..p.len() {
                    self.bump();
                }
                return Ok(Tok::Punct(p));
            }
        }
        let ch = self.peek().unwrap_or('?');
        Err(self.error(line, col, format!("unexpected character '{ch}'")))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
