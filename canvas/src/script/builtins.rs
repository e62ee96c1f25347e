//! Host capabilities: `ctx`, `Math`, value methods and global functions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::RuntimeError;
use super::interp::{Interp, len_f64};
use super::value::{self, Builtin, Value, format_number, parse_float_prefix, to_fixed};
use crate::hit::{InteractiveShape, ShapeKind};
use crate::surface::TextAlign;

const MATH_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "sqrt", "cbrt", "abs", "min", "max", "floor", "ceil", "round",
    "pow", "hypot", "sign", "trunc", "log", "log2", "log10", "exp",
];

/// `Math.<name>`: a constant, a function, or `undefined`.
pub(super) fn math_member(name: &str) -> Value {
    let constant = match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        "SQRT2" => Some(std::f64::consts::SQRT_2),
        "SQRT1_2" => Some(std::f64::consts::FRAC_1_SQRT_2),
        "LN2" => Some(std::f64::consts::LN_2),
        "LN10" => Some(std::f64::consts::LN_10),
        _ => None,
    };
    if let Some(c) = constant {
        return Value::Number(c);
    }
    MATH_FUNCTIONS
        .iter()
        .find(|f| **f == name)
        .copied()
        .map_or(Value::Undefined, |f| Value::Builtin(Builtin::Math(f)))
}

fn num(args: &[Value], i: usize) -> f64 {
    args.get(i).map_or(f64::NAN, Value::to_number)
}

/// JavaScript `Math.round`: halves round towards positive infinity.
fn js_round(x: f64) -> f64 {
    if x.is_finite() { (x + 0.5).floor() } else { x }
}

fn math_call(name: &str, args: &[Value]) -> Option<f64> {
    let x = num(args, 0);
    let result = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "atan2" => x.atan2(num(args, 1)),
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => js_round(x),
        "pow" => x.powf(num(args, 1)),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "trunc" => x.trunc(),
        "log" => x.ln(),
        "log2" => x.log2(),
        "log10" => x.log10(),
        "exp" => x.exp(),
        "min" => fold_numbers(args, f64::INFINITY, f64::min),
        "max" => fold_numbers(args, f64::NEG_INFINITY, f64::max),
        "hypot" => args.iter().map(Value::to_number).fold(0.0, f64::hypot),
        _ => return None,
    };
    Some(result)
}

/// `min` / `max` fold where any `NaN` argument yields `NaN`.
fn fold_numbers(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

impl Interp<'_> {
    pub(super) fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::RegisterShape => {
                self.register_shape(&args)?;
                Ok(Value::Undefined)
            }
            Builtin::DrawRotated => self.draw_rotated(args),
            Builtin::String => {
                let text = self.text_arg(args.first())?;
                self.string(text)
            }
            Builtin::Number => Ok(Value::Number(args.first().map_or(0.0, Value::to_number))),
            Builtin::ParseFloat => Ok(Value::Number(parse_float_prefix(&self.text_arg(args.first())?))),
            Builtin::IsNaN => Ok(Value::Bool(num(&args, 0).is_nan())),
            Builtin::Math(name) => math_call(name, &args)
                .map(Value::Number)
                .ok_or_else(|| self.error(format!("Math.{name} is not a function"))),
        }
    }

    /// Text of an optional argument; a missing one is the empty string.
    fn text_arg(&self, arg: Option<&Value>) -> Result<String, RuntimeError> {
        arg.map_or_else(|| Ok(String::new()), |value| self.text(value))
    }

    /// `object.name(args)`.
    pub(super) fn call_method(&mut self, object: &Value, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match object {
            Value::Ctx => self.ctx_call(name, &args),
            Value::Array(items) => self.array_method(items, name, args),
            Value::Number(n) => match name {
                "toFixed" => {
                    let digits = args.first().map_or(0.0, Value::to_number);
                    if !(0.0..=100.0).contains(&digits) {
                        return Err(self.error("toFixed() digits argument must be between 0 and 100"));
                    }
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let digits = digits as usize;
                    self.string(to_fixed(*n, digits))
                }
                "toString" => self.string(format_number(*n)),
                _ => Err(self.error(format!("{name} is not a function"))),
            },
            Value::Str(s) => match name {
                "toString" => Ok(Value::Str(Rc::clone(s))),
                "toUpperCase" => self.string(s.to_uppercase()),
                "toLowerCase" => self.string(s.to_lowercase()),
                _ => Err(self.error(format!("{name} is not a function"))),
            },
            Value::Undefined | Value::Null => Err(self.error(format!(
                "cannot read properties of {} (reading '{name}')",
                object.nullish_name()
            ))),
            _ => {
                let func = self.get_member(object, name)?;
                self.call_value(&func, args, name)
            }
        }
    }

    // =============================================================
    // Arrays
    // =============================================================

    fn array_method(
        &mut self,
        items: &Rc<RefCell<Vec<Value>>>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match name {
            "push" => {
                let len = items.borrow().len();
                self.grow(len, len.saturating_add(args.len()))?;
                let mut items = items.borrow_mut();
                items.extend(args);
                Ok(Value::Number(len_f64(items.len())))
            }
            "pop" => Ok(items.borrow_mut().pop().unwrap_or(Value::Undefined)),
            "forEach" | "map" | "filter" => {
                let callback = args.into_iter().next().unwrap_or(Value::Undefined);
                // Iterate a snapshot so the callback may mutate the array.
                let snapshot = items.borrow().clone();
                let mut out = Vec::new();
                for (i, item) in snapshot.into_iter().enumerate() {
                    let call_args = vec![item.clone(), Value::Number(len_f64(i)), Value::Array(Rc::clone(items))];
                    let result = self.call_value(&callback, call_args, name)?;
                    match name {
                        "map" => out.push(result),
                        "filter" if result.truthy() => out.push(item),
                        _ => continue,
                    }
                    self.charge(1)?;
                }
                Ok(if name == "forEach" { Value::Undefined } else { Value::array(out) })
            }
            "indexOf" => {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                let pos = items.borrow().iter().position(|v| v.strict_eq(&needle));
                Ok(Value::Number(pos.map_or(-1.0, len_f64)))
            }
            "includes" => {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                Ok(Value::Bool(items.borrow().iter().any(|v| v.strict_eq(&needle))))
            }
            "slice" => {
                let items = items.borrow();
                let len = items.len();
                let start = slice_bound(args.first(), 0, len);
                let end = slice_bound(args.get(1), len, len);
                let out = if start < end { items[start..end].to_vec() } else { Vec::new() };
                drop(items);
                self.charge(out.len())?;
                Ok(Value::array(out))
            }
            "join" => {
                let sep = match args.first() {
                    None | Some(Value::Undefined) => ",".to_owned(),
                    Some(v) => self.text(v)?,
                };
                let joined = value::join(items, &sep).map_err(|err| self.error(err.message()))?;
                self.string(joined)
            }
            _ => Err(self.error(format!("{name} is not a function"))),
        }
    }

    // =============================================================
    // Drawing surface
    // =============================================================

    fn ctx_call(&mut self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let n = |i: usize| num(args, i);
        let text = match (name, args.first()) {
            ("fillText", Some(value)) => self.text(value)?,
            ("fillText", None) => "undefined".to_owned(),
            _ => String::new(),
        };
        let s = &mut *self.surface;
        match name {
            "beginPath" => s.begin_path(),
            "moveTo" => s.move_to(n(0), n(1)),
            "lineTo" => s.line_to(n(0), n(1)),
            "arc" => s.arc(n(0), n(1), n(2), n(3), n(4), args.get(5).is_some_and(Value::truthy)),
            "rect" => s.rect(n(0), n(1), n(2), n(3)),
            "closePath" => s.close_path(),
            "stroke" => s.stroke(),
            "fill" => s.fill(),
            "fillText" => s.fill_text(&text, n(1), n(2)),
            "fillRect" => s.fill_rect(n(0), n(1), n(2), n(3)),
            "strokeRect" => s.stroke_rect(n(0), n(1), n(2), n(3)),
            "clearRect" => s.clear_rect(n(0), n(1), n(2), n(3)),
            "clip" => s.clip(),
            "save" => s.save(),
            "restore" => s.restore(),
            "translate" => s.translate(n(0), n(1)),
            "rotate" => s.rotate(n(0)),
            "scale" => s.scale(n(0), n(1)),
            "setLineDash" => {
                if let Some(Value::Array(items)) = args.first() {
                    let segments: Vec<f64> = items.borrow().iter().map(Value::to_number).collect();
                    s.set_line_dash(&segments);
                }
            }
            "getLineDash" => {
                let dash = s.state().line_dash.iter().copied().map(Value::Number).collect();
                return Ok(Value::array(dash));
            }
            _ => return Err(self.error(format!("ctx.{name} is not a function"))),
        }
        Ok(Value::Undefined)
    }

    pub(super) fn ctx_property(&self, name: &str) -> Value {
        let state = self.surface.state();
        match name {
            "strokeStyle" => Value::str(&state.stroke_style),
            "fillStyle" => Value::str(&state.fill_style),
            "lineWidth" => Value::Number(state.line_width),
            "font" => Value::str(&state.font),
            "textAlign" => Value::str(state.text_align.as_str()),
            "canvas" => {
                let (width, height) = self.size;
                let mut props = BTreeMap::new();
                props.insert("width".to_owned(), Value::Number(width));
                props.insert("height".to_owned(), Value::Number(height));
                Value::object(props)
            }
            _ => Value::Undefined,
        }
    }

    /// Style writes; unsupported properties such as `lineCap` are ignored.
    pub(super) fn set_ctx_property(&mut self, name: &str, value: &Value) -> Result<(), RuntimeError> {
        match name {
            "strokeStyle" => {
                let style = self.text(value)?;
                self.surface.set_stroke_style(&style);
            }
            "fillStyle" => {
                let style = self.text(value)?;
                self.surface.set_fill_style(&style);
            }
            "lineWidth" => self.surface.set_line_width(value.to_number()),
            "font" => {
                let font = self.text(value)?;
                self.surface.set_font(&font);
            }
            "textAlign" => {
                if let Some(align) = TextAlign::parse(&self.text(value)?) {
                    self.surface.set_text_align(align);
                }
            }
            _ => {}
        }
        Ok(())
    }

    // =============================================================
    // Program helpers
    // =============================================================

    /// `registerShape(id, {type, x, y, r?, w?, h?}, info)`. Descriptors that
    /// are not objects, have an unknown type or non-finite position are skipped.
    fn register_shape(&mut self, args: &[Value]) -> Result<(), RuntimeError> {
        let Some(Value::Object(data)) = args.get(1) else {
            return Ok(());
        };
        let (kind, x, y) = {
            let data = data.borrow();
            let field = |key: &str| data.get(key).map_or(0.0, Value::to_number);
            let kind = match data.get("type") {
                Some(Value::Str(kind)) => match kind.as_ref() {
                    "point" => ShapeKind::Point { r: field("r") },
                    "circle" => ShapeKind::Circle { r: field("r") },
                    "rect" => ShapeKind::Rect { w: field("w"), h: field("h") },
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            };
            (kind, field("x"), field("y"))
        };
        if !(x.is_finite() && y.is_finite()) {
            return Ok(());
        }
        let id = self.text_arg(args.first())?;
        let info = match args.get(2) {
            None | Some(Value::Undefined) => String::new(),
            Some(v) => self.text(v)?,
        };
        self.charge(1 + id.len() + info.len())?;
        (self.register)(InteractiveShape { id, kind, x, y, info });
        Ok(())
    }

    /// `drawRotated(cx, cy, angle, fn)`: run `fn` rotated about `(cx, cy)`.
    /// The surface state is restored even when `fn` fails.
    fn draw_rotated(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let (cx, cy, angle) = (num(&args, 0), num(&args, 1), num(&args, 2));
        let callback = args.into_iter().nth(3).unwrap_or(Value::Undefined);
        self.surface.save();
        self.surface.translate(cx, cy);
        self.surface.rotate(angle);
        self.surface.translate(-cx, -cy);
        let result = self.call_value(&callback, Vec::new(), "drawRotated callback");
        self.surface.restore();
        result.map(|_| Value::Undefined)
    }
}

/// Resolve a `slice` bound, counting negative values from the end.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn slice_bound(arg: Option<&Value>, default: usize, len: usize) -> usize {
    let Some(value) = arg.filter(|v| !matches!(v, Value::Undefined)) else {
        return default;
    };
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 { (len as f64 + n).max(0.0) as usize } else { (n as usize).min(len) }
}
