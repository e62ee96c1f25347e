//! Runtime values and lexical scopes.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::ast::FunctionDef;
use crate::consts::{MAX_NESTING, MAX_STRING_LEN};

/// Host-provided callables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    RegisterShape,
    DrawRotated,
    String,
    Number,
    ParseFloat,
    IsNaN,
    /// `Math.<name>`.
    Math(&'static str),
}

/// A user function together with the scope it closes over.
#[derive(Debug)]
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub env: Env,
}

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<BTreeMap<String, Value>>>),
    Function(Rc<Closure>),
    Builtin(Builtin),
    /// The drawing-surface handle.
    Ctx,
    Math,
}

impl Value {
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::Str(Rc::from(s))
    }

    #[must_use]
    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn object(props: BTreeMap<String, Value>) -> Self {
        Self::Object(Rc::new(RefCell::new(props)))
    }

    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    #[must_use]
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Function(_) | Self::Builtin(_) => "function",
            Self::Null | Self::Array(_) | Self::Object(_) | Self::Ctx | Self::Math => "object",
        }
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Str(s) => string_to_number(s),
            Self::Array(_) => self.to_js_string().map_or(f64::NAN, |text| string_to_number(&text)),
            Self::Undefined | Self::Object(_) | Self::Function(_) | Self::Builtin(_) | Self::Ctx | Self::Math => f64::NAN,
        }
    }

    /// String conversion as used by `+`, templates and `String(x)`.
    ///
    /// An array that contains itself converts to an empty string at the point
    /// of repetition, the way browsers print it.
    ///
    /// # Errors
    ///
    /// Fails when the result would exceed [`MAX_STRING_LEN`] or arrays nest
    /// deeper than [`MAX_NESTING`].
    pub fn to_js_string(&self) -> Result<String, TextError> {
        let mut writer = TextWriter::default();
        writer.value(self, 0)?;
        Ok(writer.out)
    }

    /// Name of a nullish value for error messages.
    #[must_use]
    pub fn nullish_name(&self) -> &'static str {
        if matches!(self, Self::Null) { "null" } else { "undefined" }
    }

    /// `===`
    #[allow(clippy::float_cmp)]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) | (Self::Ctx, Self::Ctx) | (Self::Math, Self::Math) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// `==` with the primitive coercions drawing code relies on.
    #[allow(clippy::float_cmp)]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Self::Number(_), Self::Str(_) | Self::Bool(_))
            | (Self::Str(_) | Self::Bool(_), Self::Number(_))
            | (Self::Bool(_), Self::Str(_))
            | (Self::Str(_), Self::Bool(_)) => self.to_number() == other.to_number(),
            _ => self.strict_eq(other),
        }
    }
}

/// `Array.prototype.join`: nullish items print as empty strings.
///
/// # Errors
///
/// Same limits as [`Value::to_js_string`].
pub fn join(items: &Rc<RefCell<Vec<Value>>>, sep: &str) -> Result<String, TextError> {
    let mut writer = TextWriter::default();
    writer.array(items, sep, 0)?;
    Ok(writer.out)
}

/// Why a value has no string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    TooLong,
    TooDeep,
}

impl TextError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::TooLong => "Invalid string length",
            Self::TooDeep => "maximum nesting depth exceeded",
        }
    }
}

#[derive(Default)]
struct TextWriter {
    out: String,
    /// Arrays currently being written, outermost first.
    open: Vec<Rc<RefCell<Vec<Value>>>>,
    visited: usize,
}

impl TextWriter {
    fn push(&mut self, text: &str) -> Result<(), TextError> {
        if self.out.len() + text.len() > MAX_STRING_LEN {
            return Err(TextError::TooLong);
        }
        self.out.push_str(text);
        Ok(())
    }

    fn value(&mut self, value: &Value, depth: usize) -> Result<(), TextError> {
        // Empty nested arrays write nothing, so count visits as well as bytes.
        self.visited += 1;
        if self.visited > MAX_STRING_LEN {
            return Err(TextError::TooLong);
        }
        match value {
            Value::Undefined => self.push("undefined"),
            Value::Null => self.push("null"),
            Value::Bool(b) => self.push(if *b { "true" } else { "false" }),
            Value::Number(n) => self.push(&format_number(*n)),
            Value::Str(s) => self.push(s),
            Value::Array(items) => self.array(items, ",", depth),
            Value::Object(_) | Value::Ctx | Value::Math => self.push("[object Object]"),
            Value::Function(closure) => {
                self.push(&format!("function {}() {{ [code] }}", closure.def.name.as_deref().unwrap_or("")))
            }
            Value::Builtin(_) => self.push("function () { [native code] }"),
        }
    }

    fn array(&mut self, items: &Rc<RefCell<Vec<Value>>>, sep: &str, depth: usize) -> Result<(), TextError> {
        if self.open.iter().any(|open| Rc::ptr_eq(open, items)) {
            return Ok(());
        }
        if depth >= MAX_NESTING {
            return Err(TextError::TooDeep);
        }
        self.open.push(Rc::clone(items));
        let result = self.items(&items.borrow(), sep, depth + 1);
        self.open.pop();
        result
    }

    fn items(&mut self, items: &[Value], sep: &str, depth: usize) -> Result<(), TextError> {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.push(sep)?;
            }
            if !item.is_nullish() {
                self.value(item, depth)?;
            }
        }
        Ok(())
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) => {
            trimmed.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// `parseFloat`: the longest numeric prefix after leading whitespace.
pub fn parse_float_prefix(s: &str) -> f64 {
    let trimmed = s.trim_start();
    if trimmed.starts_with("Infinity") || trimmed.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if trimmed.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    let mut best = f64::NAN;
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        if !(ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-')) {
            break;
        }
        end = idx + ch.len_utf8();
        if let Ok(n) = trimmed[..end].parse::<f64>() {
            best = n;
        }
    }
    if end == 0 { f64::NAN } else { best }
}

/// Number to string the way script output expects: integers without a
/// fraction, `NaN`, `Infinity`, and exponent form for very large or small
/// magnitudes.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    let abs = n.abs();
    if (1e-7..1e21).contains(&abs) {
        return format!("{n}");
    }
    // Rust prints `1e21` as `1e21`; scripts expect an explicit sign.
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// `Number.prototype.toFixed`.
pub fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() {
        return format_number(n);
    }
    if n.abs() >= 1e21 {
        return format_number(n);
    }
    format!("{n:.digits$}")
}

// =============================================================
// Scopes
// =============================================================

#[derive(Debug)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Binding>,
    parent: Option<Env>,
}

pub type Env = Rc<RefCell<Scope>>;

/// Why an assignment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Undeclared,
    Constant,
}

impl Scope {
    pub fn root() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn child(parent: &Env) -> Env {
        Rc::new(RefCell::new(Self { vars: HashMap::new(), parent: Some(Rc::clone(parent)) }))
    }

    /// Declare in this scope, shadowing outer bindings.
    pub fn declare(env: &Env, name: &str, value: Value, mutable: bool) {
        env.borrow_mut().vars.insert(name.to_owned(), Binding { value, mutable });
    }

    pub fn lookup(env: &Env, name: &str) -> Option<Value> {
        let mut current = Rc::clone(env);
        loop {
            let next = {
                let scope = current.borrow();
                if let Some(binding) = scope.vars.get(name) {
                    return Some(binding.value.clone());
                }
                scope.parent.clone()?
            };
            current = next;
        }
    }

    /// Update an existing binding in the nearest scope that declares it.
    pub fn assign(env: &Env, name: &str, value: Value) -> Result<(), AssignError> {
        let mut current = Rc::clone(env);
        loop {
            let next = {
                let mut scope = current.borrow_mut();
                if let Some(binding) = scope.vars.get_mut(name) {
                    if !binding.mutable {
                        return Err(AssignError::Constant);
                    }
                    binding.value = value;
                    return Ok(());
                }
                scope.parent.clone().ok_or(AssignError::Undeclared)?
            };
            current = next;
        }
    }

    /// A new scope under `parent` holding copies of the `names` bindings of `env`.
    pub fn copy_bindings(env: &Env, parent: &Env, names: &[String]) -> Env {
        let next = Self::child(parent);
        {
            let from = env.borrow();
            let mut to = next.borrow_mut();
            for name in names {
                if let Some(binding) = from.vars.get(name) {
                    to.vars.insert(name.clone(), Binding { value: binding.value.clone(), mutable: binding.mutable });
                }
            }
        }
        next
    }

    /// Drop every binding, breaking reference cycles through closures.
    pub fn clear(env: &Env) {
        let drained: Vec<Binding> = env.borrow_mut().vars.drain().map(|(_, b)| b).collect();
        drop(drained);
    }
}
