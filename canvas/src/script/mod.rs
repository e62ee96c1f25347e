//! GeoScript: the drawing-program language.
//!
//! Drawing programs are small JavaScript-shaped scripts. They are compiled
//! once into an immutable [`Program`] and run once per frame by a tree-walking
//! evaluator. A program can reach only the documented frame parameters
//! (`ctx width height frame theme showGrid primaryColor registerShape
//! drawRotated`), `Math` and a handful of conversion functions; there is no
//! I/O and no access to the host environment.
//!
//! ```text
//! const cx = width / 2, cy = height / 2;
//! drawRotated(cx, cy, frame * 0.02, () => {
//!     ctx.strokeStyle = primaryColor;
//!     ctx.beginPath();
//!     ctx.arc(cx, cy, 80, 0, Math.PI * 2);
//!     ctx.stroke();
//! });
//! registerShape('O', { type: 'point', x: cx, y: cy }, 'Центар O');
//! ```

pub mod ast;
mod builtins;
mod interp;
pub mod lexer;
pub mod parse;
pub mod value;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::fmt;
use std::rc::Rc;

use crate::hit::InteractiveShape;
use crate::surface::Surface;
use crate::theme::Theme;

use self::ast::Stmt;
use self::interp::Interp;
use self::value::{Builtin, Scope, Value};

/// Syntax error with its source position (1-based).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}:{column}: {message}")]
pub struct CompileError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Error raised while a program runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub line: Option<u32>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Per-frame inputs to a drawing program.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub width: f64,
    pub height: f64,
    pub frame: u64,
    pub theme: Theme,
    pub show_grid: bool,
    pub primary_color: String,
}

/// A compiled drawing program. Cheap to clone; the syntax tree is shared.
#[derive(Debug, Clone)]
pub struct Program {
    body: Rc<[Stmt]>,
}

/// Compile program text.
///
/// # Errors
///
/// Returns a [`CompileError`] locating the first syntax error.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let body = parse::parse_program(source)?;
    Ok(Program { body: body.into() })
}

impl Program {
    /// Run one frame against `surface`.
    ///
    /// `register` receives every shape the program passes to `registerShape`.
    /// Each run starts from a fresh global scope; nothing carries over between
    /// frames.
    ///
    /// # Errors
    ///
    /// Returns a [`RuntimeError`] if the program fails, references an
    /// unknown name, exceeds the step, call-depth, nesting or allocation
    /// budget, or builds an array or string past its length cap.
    pub fn run(
        &self,
        surface: &mut dyn Surface,
        params: &FrameParams,
        register: &mut dyn FnMut(InteractiveShape),
    ) -> Result<(), RuntimeError> {
        let globals = Scope::root();
        install_globals(&globals, params);
        let body_env = Scope::child(&globals);

        let mut interp = Interp::new(surface, register, (params.width, params.height), Rc::clone(&globals));
        let result = interp.exec_block(&self.body, &body_env).map(|_| ());
        interp.release();
        Scope::clear(&body_env);
        Scope::clear(&globals);
        result
    }
}

#[allow(clippy::cast_precision_loss)]
fn install_globals(globals: &value::Env, params: &FrameParams) {
    let bindings = [
        ("ctx", Value::Ctx),
        ("width", Value::Number(params.width)),
        ("height", Value::Number(params.height)),
        ("frame", Value::Number(params.frame as f64)),
        ("theme", Value::str(params.theme.key())),
        ("showGrid", Value::Bool(params.show_grid)),
        ("primaryColor", Value::str(&params.primary_color)),
        ("registerShape", Value::Builtin(Builtin::RegisterShape)),
        ("drawRotated", Value::Builtin(Builtin::DrawRotated)),
        ("Math", Value::Math),
        ("String", Value::Builtin(Builtin::String)),
        ("Number", Value::Builtin(Builtin::Number)),
        ("parseFloat", Value::Builtin(Builtin::ParseFloat)),
        ("isNaN", Value::Builtin(Builtin::IsNaN)),
        ("NaN", Value::Number(f64::NAN)),
        ("Infinity", Value::Number(f64::INFINITY)),
    ];
    for (name, value) in bindings {
        Scope::declare(globals, name, value, true);
    }
}

/// Strip the packaging language models wrap programs in.
///
/// Removes Markdown code fences and a leading `javascript` tag. When the
/// remaining text is a single `function name(...) { ... }` wrapper, only its
/// body is kept.
#[must_use]
pub fn clean_source(raw: &str) -> String {
    let mut code = raw
        .replace("```javascript", "")
        .replace("```js", "")
        .replace("```", "")
        .trim()
        .to_owned();
    if let Some(rest) = code.strip_prefix("javascript") {
        code = rest.trim_start().to_owned();
    }

    if code.starts_with("function") {
        if let Some(open) = code.find('{') {
            if closing_brace(&code, open) == Some(code.len() - 1) {
                code = code[open + 1..code.len() - 1].to_owned();
            }
        }
    }
    code.trim().to_owned()
}

/// Byte offset of the `}` matching the `{` at `open`, skipping string literals.
fn closing_brace(code: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in code[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}
