//! Tree-walking evaluator.
//!
//! One [`Interp`] lives for a single program invocation. Every statement and
//! expression evaluation costs one step; the step budget and call depth bound
//! the work a frame may do. Array slots and string bytes created during the
//! invocation are charged against an allocation budget, and single arrays and
//! strings are capped in length.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::RuntimeError;
use super::ast::{BinaryOp, Expr, FunctionBody, FunctionDef, LogicalOp, Stmt, StmtKind, TemplateSeg, UnaryOp};
use super::value::{AssignError, Closure, Env, Scope, Value};
use crate::consts::{
    MAX_ALLOC_PER_FRAME, MAX_ARRAY_LEN, MAX_CALL_DEPTH, MAX_EVAL_DEPTH, MAX_STEPS_PER_FRAME, MAX_STRING_LEN,
};
use crate::hit::InteractiveShape;
use crate::surface::Surface;

/// Statement completion.
pub(super) enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Evaluated assignment target.
enum Place {
    Name(String),
    Member(Value, String),
    Index(Value, Value),
}

pub(super) struct Interp<'a> {
    pub(super) surface: &'a mut dyn Surface,
    pub(super) register: &'a mut dyn FnMut(InteractiveShape),
    /// Logical size, exposed as `ctx.canvas`.
    pub(super) size: (f64, f64),
    globals: Env,
    steps: u64,
    depth: usize,
    /// Live `exec` / `eval` frames.
    nesting: usize,
    allocated: usize,
    line: u32,
    captured: Vec<Weak<RefCell<Scope>>>,
}

impl<'a> Interp<'a> {
    pub(super) fn new(
        surface: &'a mut dyn Surface,
        register: &'a mut dyn FnMut(InteractiveShape),
        size: (f64, f64),
        globals: Env,
    ) -> Self {
        Self {
            surface,
            register,
            size,
            globals,
            steps: 0,
            depth: 0,
            nesting: 0,
            allocated: 0,
            line: 1,
            captured: Vec::new(),
        }
    }

    pub(super) fn error(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError { message: message.into(), line: Some(self.line) }
    }

    fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > MAX_STEPS_PER_FRAME {
            return Err(self.error(format!("execution budget of {MAX_STEPS_PER_FRAME} steps exceeded")));
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), RuntimeError> {
        if self.nesting >= MAX_EVAL_DEPTH {
            return Err(self.error("maximum nesting depth exceeded"));
        }
        self.nesting += 1;
        Ok(())
    }

    /// Charge `units` of new storage (array slots or string bytes).
    pub(super) fn charge(&mut self, units: usize) -> Result<(), RuntimeError> {
        self.allocated = self.allocated.saturating_add(units);
        if self.allocated > MAX_ALLOC_PER_FRAME {
            return Err(self.error(format!("allocation budget of {MAX_ALLOC_PER_FRAME} units exceeded")));
        }
        Ok(())
    }

    /// Check and charge an array growing from `from` to `to` slots.
    pub(super) fn grow(&mut self, from: usize, to: usize) -> Result<(), RuntimeError> {
        if to > MAX_ARRAY_LEN {
            return Err(self.error("Invalid array length"));
        }
        self.charge(to.saturating_sub(from))
    }

    /// Wrap a newly built string.
    pub(super) fn string(&mut self, text: String) -> Result<Value, RuntimeError> {
        if text.len() > MAX_STRING_LEN {
            return Err(self.error("Invalid string length"));
        }
        self.charge(text.len())?;
        Ok(Value::Str(Rc::from(text)))
    }

    pub(super) fn text(&self, value: &Value) -> Result<String, RuntimeError> {
        value.to_js_string().map_err(|err| self.error(err.message()))
    }

    /// Clear every scope a closure captured so closure/scope cycles are freed.
    pub(super) fn release(&mut self) {
        for weak in self.captured.drain(..) {
            if let Some(env) = weak.upgrade() {
                Scope::clear(&env);
            }
        }
    }

    fn make_closure(&mut self, def: &Rc<FunctionDef>, env: &Env) -> Value {
        self.captured.push(Rc::downgrade(env));
        Value::Function(Rc::new(Closure { def: Rc::clone(def), env: Rc::clone(env) }))
    }

    // =============================================================
    // Statements
    // =============================================================

    pub(super) fn exec_block(&mut self, stmts: &[Stmt], env: &Env) -> Result<Flow, RuntimeError> {
        // Function declarations are visible throughout their block.
        for stmt in stmts {
            if let StmtKind::Function(def) = &stmt.kind {
                self.declare_function(def, env);
            }
        }
        for stmt in stmts {
            match self.exec(stmt, env)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn declare_function(&mut self, def: &Rc<FunctionDef>, env: &Env) {
        if let Some(name) = &def.name {
            let closure = self.make_closure(def, env);
            Scope::declare(env, name, closure, true);
        }
    }

    fn exec(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow, RuntimeError> {
        self.enter()?;
        let flow = self.exec_stmt(stmt, env);
        self.nesting -= 1;
        flow
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow, RuntimeError> {
        self.line = stmt.line;
        self.tick()?;
        match &stmt.kind {
            StmtKind::Declare { constant, decls } => {
                for (name, init) in decls {
                    let value = match init {
                        Some(expr) => self.eval(expr, env)?,
                        None => Value::Undefined,
                    };
                    Scope::declare(env, name, value, !constant);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Expr(expr) => {
                self.eval(expr, env)?;
                Ok(Flow::Normal)
            }
            StmtKind::If { cond, then, otherwise } => {
                if self.eval(cond, env)?.truthy() {
                    self.exec(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.exec(otherwise, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::For { init, cond, step, body } => {
                let mut loop_env = Scope::child(env);
                if let Some(init) = init {
                    self.exec(init, &loop_env)?;
                }
                // Each iteration gets its own copy of the loop variables, so
                // closures made in the body keep that iteration's values.
                let bindings: Vec<String> = match init.as_deref().map(|init| &init.kind) {
                    Some(StmtKind::Declare { decls, .. }) => decls.iter().map(|(name, _)| name.clone()).collect(),
                    _ => Vec::new(),
                };
                loop {
                    if let Some(cond) = cond {
                        if !self.eval(cond, &loop_env)?.truthy() {
                            break;
                        }
                    }
                    match self.exec(body, &loop_env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if !bindings.is_empty() {
                        loop_env = Scope::copy_bindings(&loop_env, env, &bindings);
                    }
                    if let Some(step) = step {
                        self.eval(step, &loop_env)?;
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::ForOf { name, iter, body } => {
                let items = match self.eval(iter, env)? {
                    Value::Array(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::str(c.encode_utf8(&mut [0; 4]))).collect(),
                    other => return Err(self.error(format!("{} is not iterable", other.type_of()))),
                };
                for item in items {
                    let iter_env = Scope::child(env);
                    Scope::declare(&iter_env, name, item, true);
                    match self.exec(body, &iter_env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond, env)?.truthy() {
                    match self.exec(body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Block(stmts) => {
                let block_env = Scope::child(env);
                self.exec_block(stmts, &block_env)
            }
            StmtKind::Function(def) => {
                // Already hoisted when this is a direct block member.
                if def.name.as_ref().is_some_and(|n| Scope::lookup(env, n).is_none()) {
                    self.declare_function(def, env);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Empty => Ok(Flow::Normal),
        }
    }

    // =============================================================
    // Expressions
    // =============================================================

    pub(super) fn eval(&mut self, expr: &Expr, env: &Env) -> Result<Value, RuntimeError> {
        self.enter()?;
        let value = self.eval_expr(expr, env);
        self.nesting -= 1;
        value
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Result<Value, RuntimeError> {
        self.tick()?;
        match expr {
            Expr::Num(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(Rc::clone(s))),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Template(segs) => {
                let mut out = String::new();
                for seg in segs {
                    match seg {
                        TemplateSeg::Text(text) => out.push_str(text),
                        TemplateSeg::Expr(expr) => {
                            let value = self.eval(expr, env)?;
                            out.push_str(&self.text(&value)?);
                        }
                    }
                    if out.len() > MAX_STRING_LEN {
                        return Err(self.error("Invalid string length"));
                    }
                }
                self.string(out)
            }
            Expr::Ident(name) => Scope::lookup(env, name).ok_or_else(|| self.error(format!("{name} is not defined"))),
            Expr::Array(items) => {
                self.grow(0, items.len())?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, env)?);
                }
                Ok(Value::array(values))
            }
            Expr::Object(props) => {
                self.charge(props.len())?;
                let mut map = BTreeMap::new();
                for (key, value) in props {
                    let value = self.eval(value, env)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::object(map))
            }
            Expr::Function(def) => Ok(self.make_closure(def, env)),
            Expr::Unary(op, operand) => self.unary(*op, operand, env),
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                self.binary(*op, &left, &right)
            }
            Expr::Logical(op, left, right) => {
                let left = self.eval(left, env)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.truthy(),
                    LogicalOp::Or => left.truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit { Ok(left) } else { self.eval(right, env) }
            }
            Expr::Conditional(cond, then, otherwise) => {
                if self.eval(cond, env)?.truthy() {
                    self.eval(then, env)
                } else {
                    self.eval(otherwise, env)
                }
            }
            Expr::Assign { op, target, value } => {
                let place = self.place(target, env)?;
                let new = match op {
                    Some(op) => {
                        let current = self.read_place(&place, env)?;
                        let rhs = self.eval(value, env)?;
                        self.binary(*op, &current, &rhs)?
                    }
                    None => self.eval(value, env)?,
                };
                self.write_place(place, new.clone(), env)?;
                Ok(new)
            }
            Expr::Update { delta, prefix, target } => {
                let place = self.place(target, env)?;
                let old = self.read_place(&place, env)?.to_number();
                let new = old + delta;
                self.write_place(place, Value::Number(new), env)?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            Expr::Member(object, name) => {
                let object = self.eval(object, env)?;
                self.get_member(&object, name)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                self.get_index(&object, &index)
            }
            Expr::Call(callee, args) => {
                if let Expr::Member(object, name) = callee.as_ref() {
                    let object = self.eval(object, env)?;
                    let args = self.eval_args(args, env)?;
                    return self.call_method(&object, name, args);
                }
                let func = self.eval(callee, env)?;
                let args = self.eval_args(args, env)?;
                let what = match callee.as_ref() {
                    Expr::Ident(name) => name.as_str(),
                    _ => "expression",
                };
                self.call_value(&func, args, what)
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr], env: &Env) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, env)?);
        }
        Ok(values)
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, env: &Env) -> Result<Value, RuntimeError> {
        if op == UnaryOp::Typeof {
            if let Expr::Ident(name) = operand {
                if Scope::lookup(env, name).is_none() {
                    return Ok(Value::str("undefined"));
                }
            }
            return Ok(Value::str(self.eval(operand, env)?.type_of()));
        }
        let value = self.eval(operand, env)?;
        Ok(match op {
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::Not | UnaryOp::Typeof => Value::Bool(!value.truthy()),
        })
    }

    // ── Places ──────────────────────────────────────────────────

    fn place(&mut self, target: &Expr, env: &Env) -> Result<Place, RuntimeError> {
        match target {
            Expr::Ident(name) => Ok(Place::Name(name.clone())),
            Expr::Member(object, name) => Ok(Place::Member(self.eval(object, env)?, name.clone())),
            Expr::Index(object, index) => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                Ok(Place::Index(object, index))
            }
            _ => Err(self.error("invalid assignment target")),
        }
    }

    fn read_place(&mut self, place: &Place, env: &Env) -> Result<Value, RuntimeError> {
        match place {
            Place::Name(name) => Scope::lookup(env, name).ok_or_else(|| self.error(format!("{name} is not defined"))),
            Place::Member(object, name) => self.get_member(object, name),
            Place::Index(object, index) => self.get_index(object, index),
        }
    }

    fn write_place(&mut self, place: Place, value: Value, env: &Env) -> Result<(), RuntimeError> {
        match place {
            Place::Name(name) => match Scope::assign(env, &name, value.clone()) {
                Ok(()) => Ok(()),
                Err(AssignError::Constant) => Err(self.error(format!("assignment to constant variable '{name}'"))),
                Err(AssignError::Undeclared) => {
                    // Undeclared assignment creates a program-wide variable.
                    Scope::declare(&self.globals, &name, value, true);
                    Ok(())
                }
            },
            Place::Member(object, name) => self.set_member(&object, &name, value),
            Place::Index(object, index) => self.set_index(&object, &index, value),
        }
    }

    // ── Properties ──────────────────────────────────────────────

    pub(super) fn get_member(&mut self, object: &Value, name: &str) -> Result<Value, RuntimeError> {
        match object {
            Value::Undefined | Value::Null => Err(self.error(format!(
                "cannot read properties of {} (reading '{name}')",
                object.nullish_name()
            ))),
            Value::Array(items) if name == "length" => Ok(Value::Number(len_f64(items.borrow().len()))),
            Value::Str(s) if name == "length" => Ok(Value::Number(len_f64(s.chars().count()))),
            Value::Object(map) => Ok(map.borrow().get(name).cloned().unwrap_or(Value::Undefined)),
            Value::Ctx => Ok(self.ctx_property(name)),
            Value::Math => Ok(super::builtins::math_member(name)),
            _ => Ok(Value::Undefined),
        }
    }

    fn set_member(&mut self, object: &Value, name: &str, value: Value) -> Result<(), RuntimeError> {
        match object {
            Value::Undefined | Value::Null => Err(self.error(format!(
                "cannot set properties of {} (setting '{name}')",
                object.nullish_name()
            ))),
            Value::Object(map) => {
                if !map.borrow().contains_key(name) {
                    self.charge(1 + name.len())?;
                }
                map.borrow_mut().insert(name.to_owned(), value);
                Ok(())
            }
            Value::Array(items) if name == "length" => {
                let len = value.to_number();
                if !(len.is_finite() && len >= 0.0 && len.fract() == 0.0) {
                    return Err(self.error("Invalid array length"));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let len = len.min(len_f64(MAX_ARRAY_LEN + 1)) as usize;
                let current = items.borrow().len();
                self.grow(current, len)?;
                items.borrow_mut().resize(len, Value::Undefined);
                Ok(())
            }
            Value::Ctx => self.set_ctx_property(name, &value),
            // Writes to primitives and other host values are ignored.
            _ => Ok(()),
        }
    }

    fn get_index(&mut self, object: &Value, index: &Value) -> Result<Value, RuntimeError> {
        if let Some(i) = array_index(index) {
            match object {
                Value::Array(items) => return Ok(items.borrow().get(i).cloned().unwrap_or(Value::Undefined)),
                Value::Str(s) => {
                    return Ok(s
                        .chars()
                        .nth(i)
                        .map_or(Value::Undefined, |c| Value::str(c.encode_utf8(&mut [0; 4]))));
                }
                _ => {}
            }
        }
        let key = self.text(index)?;
        self.get_member(object, &key)
    }

    fn set_index(&mut self, object: &Value, index: &Value, value: Value) -> Result<(), RuntimeError> {
        if let (Value::Array(items), Some(i)) = (object, array_index(index)) {
            let len = items.borrow().len();
            if i >= len {
                self.grow(len, i.saturating_add(1))?;
            }
            let mut items = items.borrow_mut();
            if i >= items.len() {
                items.resize(i + 1, Value::Undefined);
            }
            items[i] = value;
            return Ok(());
        }
        let key = self.text(index)?;
        self.set_member(object, &key, value)
    }

    // ── Calls ───────────────────────────────────────────────────

    pub(super) fn call_value(&mut self, func: &Value, args: Vec<Value>, what: &str) -> Result<Value, RuntimeError> {
        match func {
            Value::Function(closure) => self.call_closure(closure, args),
            Value::Builtin(builtin) => self.call_builtin(*builtin, args),
            _ => Err(self.error(format!("{what} is not a function"))),
        }
    }

    fn binary(&mut self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
        if op == BinaryOp::Add && (is_string_like(left) || is_string_like(right)) {
            let mut out = self.text(left)?;
            out.push_str(&self.text(right)?);
            return self.string(out);
        }
        Ok(arithmetic(op, left, right))
    }

    fn call_closure(&mut self, closure: &Rc<Closure>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(self.error("maximum call depth exceeded"));
        }
        let call_line = self.line;
        self.depth += 1;

        let env = Scope::child(&closure.env);
        let mut args = args.into_iter();
        for param in &closure.def.params {
            Scope::declare(&env, param, args.next().unwrap_or(Value::Undefined), true);
        }
        let result = match &closure.def.body {
            FunctionBody::Block(stmts) => self.exec_block(stmts, &env).map(|flow| match flow {
                Flow::Return(value) => value,
                Flow::Normal | Flow::Break | Flow::Continue => Value::Undefined,
            }),
            FunctionBody::Expr(expr) => self.eval(expr, &env),
        };

        self.depth -= 1;
        if result.is_ok() {
            self.line = call_line;
        }
        result
    }
}

/// Binary operators on already-evaluated operands, other than string `+`.
#[allow(clippy::float_cmp)]
fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(left.to_number().powf(right.to_number())),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => Value::Bool(compare(op, left, right)),
        BinaryOp::LooseEq => Value::Bool(left.loose_eq(right)),
        BinaryOp::LooseNe => Value::Bool(!left.loose_eq(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_eq(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_eq(right)),
    }
}

fn is_string_like(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Array(_) | Value::Object(_))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    }
}

/// Non-negative integral index, if `value` is one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn array_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn len_f64(len: usize) -> f64 {
    len as f64
}
