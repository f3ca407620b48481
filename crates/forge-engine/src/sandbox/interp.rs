//! Tree-walking evaluator for compiled definitions.
//!
//! Every evaluation step spends one unit of fuel, and building text, arrays
//! or element trees spends more in proportion to their size. Calls count
//! against the depth limit and nested expressions against the nesting
//! limit, so a description can neither loop forever nor exhaust the host
//! stack. Every value an expression yields is checked against the element
//! and byte limits before it can be used again. JSX is drawn eagerly:
//! evaluating an element calls its component and yields a finished
//! [`Node`].

use std::{
  rc::{Rc, Weak},
  sync::Arc,
};

use forge_markup::ast::{
  Arg, BinaryOp, Body, Declaration, Definition, Expr, Function, Item, JsxAttrValue,
  JsxAttribute, JsxChild, JsxElement, JsxTag, Literal, LogicalOp, Pattern, Property,
  Stmt, TemplatePart, UnaryOp,
};

use super::{
  Limits,
  binding::SandboxBinding,
  value::{Callable, Native, Object, Scope, Value, format_number},
};
use crate::{
  error::RenderError,
  html::{Element, Extent, Node, is_valid_attr_name},
  primitive::Props,
};

type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Bytes of text produced per unit of fuel.
const BYTES_PER_FUEL: usize = 64;

/// Props never forwarded to host elements.
const DROPPED_ATTRIBUTES: &[&str] =
  &["children", "style", "key", "ref", "dangerouslySetInnerHTML"];

enum Flow {
  Normal,
  Return(Value),
}

pub(crate) struct Interpreter {
  limits:  Limits,
  fuel:    u64,
  depth:   usize,
  nesting: usize,
  /// Every scope created, so cycles between closures and their scopes can
  /// be broken when the interpreter is dropped.
  scopes:  Vec<Weak<Scope>>,
}

impl Drop for Interpreter {
  fn drop(&mut self) {
    for scope in self.scopes.drain(..) {
      if let Some(scope) = scope.upgrade() {
        scope.clear();
      }
    }
  }
}

impl Interpreter {
  pub(crate) fn new(limits: Limits) -> Self {
    Self {
      limits,
      fuel: limits.fuel,
      depth: 0,
      nesting: 0,
      scopes: Vec::new(),
    }
  }

  pub(crate) fn limits(&self) -> Limits { self.limits }

  fn tick(&mut self) -> Result<()> { self.spend(1) }

  pub(crate) fn spend(&mut self, units: u64) -> Result<()> {
    match self.fuel.checked_sub(units) {
      Some(left) => {
        self.fuel = left;
        Ok(())
      }
      None => {
        self.fuel = 0;
        Err(RenderError::FuelExhausted {
          limit: self.limits.fuel,
        })
      }
    }
  }

  /// Pay for producing `bytes` of text.
  pub(crate) fn spend_bytes(&mut self, bytes: usize) -> Result<()> {
    self.spend((bytes / BYTES_PER_FUEL) as u64)
  }

  fn enter(&mut self) -> Result<()> {
    if self.nesting >= self.limits.max_nesting {
      return Err(RenderError::NestingTooDeep {
        limit: self.limits.max_nesting,
      });
    }
    self.nesting += 1;
    Ok(())
  }

  fn leave(&mut self) { self.nesting -= 1; }

  /// Fail unless a string of `bytes` is within the output limit.
  pub(crate) fn fits(&self, bytes: usize) -> Result<()> {
    if bytes > self.limits.max_output_bytes {
      return Err(RenderError::OutputTooLarge {
        limit: self.limits.max_output_bytes,
      });
    }
    Ok(())
  }

  fn check(&self, extent: Extent) -> Result<()> {
    if extent.depth > self.limits.max_nesting {
      return Err(RenderError::NestingTooDeep {
        limit: self.limits.max_nesting,
      });
    }
    if extent.elements > self.limits.max_elements {
      return Err(RenderError::TooManyElements {
        limit: self.limits.max_elements,
      });
    }
    self.fits(extent.bytes)
  }

  /// Pass `value` on only if it is within the limits.
  pub(crate) fn admit(&self, value: Value) -> Result<Value> {
    match &value {
      Value::Str(s) => self.fits(s.len())?,
      Value::Array(_) | Value::Object(_) | Value::Node(_) => self.check(value.extent())?,
      _ => {}
    }
    Ok(value)
  }

  /// The nodes `value` draws as a child. Parts still shared with other
  /// values are copied, and the copy is paid for.
  pub(crate) fn materialize(&mut self, value: Value) -> Result<Vec<Node>> {
    self.check(value.extent())?;
    let copied = copy_extent(&value);
    self.spend(copied.elements as u64)?;
    self.spend_bytes(copied.bytes)?;
    value.into_nodes()
  }

  fn track(&mut self, scope: Scope) -> Rc<Scope> {
    let scope = Rc::new(scope);
    self.scopes.push(Rc::downgrade(&scope));
    scope
  }

  fn child_scope(&mut self, parent: &Rc<Scope>) -> Rc<Scope> {
    self.track(Scope::child(parent))
  }

  // ── Module ────────────────────────────────────────────────────────────

  /// Evaluate the module items in a scope rooted at `binding` and return
  /// that scope. Function declarations are bound before anything runs.
  pub(crate) fn load_module(
    &mut self,
    definition: &Definition,
    binding: SandboxBinding,
  ) -> Result<Rc<Scope>> {
    let root = self.track(Scope::root(binding.into_vars()));
    let module = self.child_scope(&root);

    for item in &definition.items {
      if let Item::Function { name, function } = item {
        module.define(name, closure(function, &module));
      }
    }
    for item in &definition.items {
      if let Item::Declare(decl) = item {
        self.tick()?;
        self.declare(decl, &module)?;
      }
    }
    Ok(module)
  }

  // ── Statements ────────────────────────────────────────────────────────

  fn exec_block(&mut self, stmts: &[Stmt], scope: &Rc<Scope>) -> Result<Flow> {
    for stmt in stmts {
      if let Stmt::Function { name, function } = stmt {
        scope.define(name, closure(function, scope));
      }
    }

    for stmt in stmts {
      self.tick()?;
      match stmt {
        Stmt::Declare(decl) => self.declare(decl, scope)?,
        Stmt::Function { .. } => {}
        Stmt::Return(value) => {
          let value = match value {
            Some(expr) => self.eval(expr, scope)?,
            None => Value::Undefined,
          };
          return Ok(Flow::Return(value));
        }
        Stmt::If {
          test,
          then,
          otherwise,
        } => {
          let branch = if self.eval(test, scope)?.truthy() {
            Some(then)
          } else {
            otherwise.as_ref()
          };
          if let Some(branch) = branch {
            let inner = self.child_scope(scope);
            if let Flow::Return(value) = self.exec_block(branch, &inner)? {
              return Ok(Flow::Return(value));
            }
          }
        }
        Stmt::Expr(expr) => {
          self.eval(expr, scope)?;
        }
      }
    }
    Ok(Flow::Normal)
  }

  fn declare(&mut self, decl: &Declaration, scope: &Rc<Scope>) -> Result<()> {
    let value = match &decl.init {
      Some(init) => self.eval(init, scope)?,
      None => Value::Undefined,
    };
    self.bind(&decl.pattern, value, scope)
  }

  fn bind(&mut self, pattern: &Pattern, value: Value, scope: &Rc<Scope>) -> Result<()> {
    self.enter()?;
    let bound = self.bind_pattern(pattern, value, scope);
    self.leave();
    bound
  }

  fn bind_pattern(&mut self, pattern: &Pattern, value: Value, scope: &Rc<Scope>) -> Result<()> {
    match pattern {
      Pattern::Ident(name) => {
        scope.define(name, value);
        Ok(())
      }
      Pattern::Default(inner, fallback) => {
        let value = match value {
          Value::Undefined => self.eval(fallback, scope)?,
          other => other,
        };
        self.bind(inner, value, scope)
      }
      Pattern::Array(items) => {
        let Value::Array(values) = &value else {
          return Err(RenderError::Type(format!(
            "{} is not iterable",
            value.type_of()
          )));
        };
        for (i, item) in items.iter().enumerate() {
          if let Some(item) = item {
            let element = values.get(i).cloned().unwrap_or(Value::Undefined);
            self.bind(item, element, scope)?;
          }
        }
        Ok(())
      }
      Pattern::Object(props) => {
        if value.is_nullish() {
          return Err(RenderError::Type(format!(
            "cannot destructure properties of {}",
            value.to_display()
          )));
        }
        for prop in props {
          let field = self.member(&value, &prop.key)?;
          self.bind(&prop.value, field, scope)?;
        }
        Ok(())
      }
    }
  }

  // ── Calls ─────────────────────────────────────────────────────────────

  /// Call `callee` with positional `args`.
  pub(crate) fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value> {
    let Value::Function(callable) = callee else {
      return Err(RenderError::Type(format!(
        "{} is not a function",
        callee.type_of()
      )));
    };
    if self.depth >= self.limits.max_call_depth {
      return Err(RenderError::CallDepthExceeded {
        limit: self.limits.max_call_depth,
      });
    }
    self.depth += 1;
    let result = match callable.as_ref() {
      Callable::Closure { function, scope } => self.call_closure(function, scope, args),
      Callable::Native(native) => self.call_native(*native, args),
    };
    self.depth -= 1;
    result
  }

  fn call_closure(
    &mut self,
    function: &Function,
    captured: &Rc<Scope>,
    args: Vec<Value>,
  ) -> Result<Value> {
    let local = self.child_scope(captured);
    let mut args = args.into_iter();
    for param in &function.params {
      let arg = args.next().unwrap_or(Value::Undefined);
      self.bind(param, arg, &local)?;
    }
    match &function.body {
      Body::Expr(expr) => self.eval(expr, &local),
      Body::Block(stmts) => match self.exec_block(stmts, &local)? {
        Flow::Return(value) => Ok(value),
        Flow::Normal => Ok(Value::Undefined),
      },
    }
  }

  fn call_native(&mut self, native: Native, args: Vec<Value>) -> Result<Value> {
    let mut args = args.into_iter();
    let first = args.next().unwrap_or(Value::Undefined);
    match native {
      Native::Noop | Native::UseEffect => Ok(Value::Undefined),
      Native::UseState => {
        let initial = match first {
          Value::Function(_) => self.call(&first, Vec::new())?,
          other => other,
        };
        Ok(Value::array(vec![initial, Value::native(Native::Noop)]))
      }
      Native::UseMemo => self.call(&first, Vec::new()),
      Native::UseCallback => Ok(first),
      Native::Fragment => {
        let children = self.member(&first, "children")?;
        Ok(Value::node(Node::fragment(self.materialize(children)?)))
      }
      Native::Primitive(primitive) => {
        let empty = Object::new();
        let props: &Object = match &first {
          Value::Object(props) => props,
          _ => &empty,
        };
        let node = primitive.render(&Props(props), self)?;
        Ok(Value::node(node))
      }
    }
  }

  // ── Expressions ───────────────────────────────────────────────────────

  pub(crate) fn eval(&mut self, expr: &Expr, scope: &Rc<Scope>) -> Result<Value> {
    self.tick()?;
    self.enter()?;
    let value = self.eval_expr(expr, scope);
    self.leave();
    self.admit(value?)
  }

  fn eval_expr(&mut self, expr: &Expr, scope: &Rc<Scope>) -> Result<Value> {
    match expr {
      Expr::Literal(literal) => Ok(match literal {
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::str(s),
      }),
      Expr::Ident(name) => scope
        .lookup(name)
        .ok_or_else(|| RenderError::NotDefined(name.clone())),
      Expr::Template(parts) => {
        let mut out = String::new();
        for part in parts {
          match part {
            TemplatePart::Text(text) => out.push_str(text),
            TemplatePart::Expr(expr) => out.push_str(&self.eval(expr, scope)?.to_display()),
          }
          self.fits(out.len())?;
        }
        self.spend_bytes(out.len())?;
        Ok(Value::str(&out))
      }
      Expr::Array(items) => Ok(Value::array(self.eval_args(items, scope)?)),
      Expr::Object(props) => {
        let mut object = Object::new();
        for prop in props {
          match prop {
            Property::KeyValue(key, value) => {
              let value = self.eval(value, scope)?;
              object.insert(key.clone(), value);
            }
            Property::Spread(source) => {
              let source = self.eval(source, scope)?;
              self.spread_into(&mut object, &source)?;
            }
          }
        }
        Ok(Value::object(object))
      }
      Expr::Member {
        object,
        property,
        optional,
      } => {
        let object = self.eval(object, scope)?;
        if *optional && object.is_nullish() {
          return Ok(Value::Undefined);
        }
        self.member(&object, property)
      }
      Expr::Index {
        object,
        index,
        optional,
      } => {
        let object = self.eval(object, scope)?;
        if *optional && object.is_nullish() {
          return Ok(Value::Undefined);
        }
        let key = self.eval(index, scope)?.to_property_key();
        self.member(&object, &key)
      }
      Expr::Call {
        callee,
        args,
        optional,
      } => self.eval_call(callee, args, *optional, scope),
      Expr::Unary { op, operand } => {
        let value = self.eval(operand, scope)?;
        Ok(match op {
          UnaryOp::Not => Value::Bool(!value.truthy()),
          UnaryOp::Neg => Value::Number(-value.to_number()),
          UnaryOp::Plus => Value::Number(value.to_number()),
          UnaryOp::TypeOf => Value::str(value.type_of()),
        })
      }
      Expr::Binary { op, lhs, rhs } => {
        let lhs = self.eval(lhs, scope)?;
        let rhs = self.eval(rhs, scope)?;
        if matches!(op, BinaryOp::Add) && (is_textual(&lhs) || is_textual(&rhs)) {
          return self.concat(&lhs, &rhs);
        }
        Ok(binary(*op, &lhs, &rhs))
      }
      Expr::Logical { op, lhs, rhs } => {
        let lhs = self.eval(lhs, scope)?;
        let take_lhs = match op {
          LogicalOp::And => !lhs.truthy(),
          LogicalOp::Or => lhs.truthy(),
          LogicalOp::Nullish => !lhs.is_nullish(),
        };
        if take_lhs { Ok(lhs) } else { self.eval(rhs, scope) }
      }
      Expr::Conditional {
        test,
        consequent,
        alternate,
      } => {
        if self.eval(test, scope)?.truthy() {
          self.eval(consequent, scope)
        } else {
          self.eval(alternate, scope)
        }
      }
      Expr::Function(function) => Ok(closure(function, scope)),
      Expr::Jsx(element) => self.eval_jsx(element, scope),
    }
  }

  /// `+` where either side is not a number.
  fn concat(&mut self, lhs: &Value, rhs: &Value) -> Result<Value> {
    let (lhs, rhs) = (lhs.to_display(), rhs.to_display());
    let len = lhs.len() + rhs.len();
    self.fits(len)?;
    self.spend_bytes(len)?;
    Ok(Value::str(&(lhs + &rhs)))
  }

  fn spread_into(&mut self, target: &mut Object, source: &Value) -> Result<()> {
    match source {
      Value::Object(fields) => {
        self.spend(fields.len() as u64)?;
        for (key, value) in fields.iter() {
          target.insert(key.clone(), value.clone());
        }
      }
      Value::Array(items) => {
        self.spend(items.len() as u64)?;
        for (i, value) in items.iter().enumerate() {
          target.insert(i.to_string(), value.clone());
        }
      }
      _ => {}
    }
    Ok(())
  }

  fn eval_args(&mut self, args: &[Arg], scope: &Rc<Scope>) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
      match arg {
        Arg::Expr(expr) => out.push(self.eval(expr, scope)?),
        Arg::Spread(expr) => match self.eval(expr, scope)? {
          Value::Array(items) => {
            self.spend(items.len() as u64)?;
            out.extend(items.iter().cloned());
          }
          Value::Str(s) => {
            self.spend(s.len() as u64)?;
            out.extend(s.chars().map(|c| Value::str(c.encode_utf8(&mut [0; 4]))));
          }
          other => {
            return Err(RenderError::Type(format!(
              "{} is not iterable",
              other.type_of()
            )));
          }
        },
      }
    }
    Ok(out)
  }

  fn eval_call(
    &mut self,
    callee: &Expr,
    args: &[Arg],
    optional: bool,
    scope: &Rc<Scope>,
  ) -> Result<Value> {
    // Method calls on arrays, strings and numbers go to the builtins.
    if let Expr::Member {
      object,
      property,
      optional: optional_member,
    } = callee
    {
      let receiver = self.eval(object, scope)?;
      if *optional_member && receiver.is_nullish() {
        return Ok(Value::Undefined);
      }
      if matches!(receiver, Value::Array(_) | Value::Str(_) | Value::Number(_)) {
        let args = self.eval_args(args, scope)?;
        return self.call_builtin(&receiver, property, args);
      }
      let function = self.member(&receiver, property)?;
      if optional && function.is_nullish() {
        return Ok(Value::Undefined);
      }
      let args = self.eval_args(args, scope)?;
      return self.call_named(&function, args, || describe_callee(callee));
    }

    let function = self.eval(callee, scope)?;
    if optional && function.is_nullish() {
      return Ok(Value::Undefined);
    }
    let args = self.eval_args(args, scope)?;
    self.call_named(&function, args, || describe_callee(callee))
  }

  /// Like [`Self::call`], but a non-function error names the callee.
  fn call_named(
    &mut self,
    function: &Value,
    args: Vec<Value>,
    name: impl FnOnce() -> String,
  ) -> Result<Value> {
    if !matches!(function, Value::Function(_)) {
      return Err(RenderError::Type(format!("{} is not a function", name())));
    }
    self.call(function, args)
  }

  /// Property read. Reading from `null` or `undefined` is a type error.
  pub(crate) fn member(&self, object: &Value, key: &str) -> Result<Value> {
    Ok(match object {
      Value::Undefined | Value::Null => {
        return Err(RenderError::Type(format!(
          "cannot read properties of {} (reading '{key}')",
          object.to_display()
        )));
      }
      Value::Object(fields) => fields.get(key).cloned().unwrap_or(Value::Undefined),
      Value::Array(items) => match key {
        "length" => Value::Number(items.len() as f64),
        _ => key
          .parse::<usize>()
          .ok()
          .and_then(|i| items.get(i).cloned())
          .unwrap_or(Value::Undefined),
      },
      Value::Str(s) => match key {
        "length" => Value::Number(s.chars().count() as f64),
        _ => key
          .parse::<usize>()
          .ok()
          .and_then(|i| s.chars().nth(i))
          .map(|c| Value::str(c.encode_utf8(&mut [0; 4])))
          .unwrap_or(Value::Undefined),
      },
      Value::Bool(_) | Value::Number(_) | Value::Function(_) | Value::Node(_) => {
        Value::Undefined
      }
    })
  }

  // ── JSX ───────────────────────────────────────────────────────────────

  fn eval_jsx(&mut self, element: &JsxElement, scope: &Rc<Scope>) -> Result<Value> {
    self.enter()?;
    let drawn = self.draw(element, scope);
    self.leave();
    drawn
  }

  fn draw(&mut self, element: &JsxElement, scope: &Rc<Scope>) -> Result<Value> {
    let mut props = Object::new();
    for attribute in &element.attributes {
      match attribute {
        JsxAttribute::Named { name, value } => {
          let value = match value {
            JsxAttrValue::Implicit => Value::Bool(true),
            JsxAttrValue::Text(text) => Value::str(text),
            JsxAttrValue::Expr(expr) => self.eval(expr, scope)?,
          };
          props.insert(name.clone(), value);
        }
        JsxAttribute::Spread(expr) => {
          let source = self.eval(expr, scope)?;
          self.spread_into(&mut props, &source)?;
        }
      }
    }

    let mut children = Vec::with_capacity(element.children.len());
    for child in &element.children {
      children.push(match child {
        JsxChild::Text(text) => Value::str(text),
        JsxChild::Expr(expr) => self.eval(expr, scope)?,
        JsxChild::Element(child) => self.eval_jsx(child, scope)?,
      });
    }

    match &element.tag {
      JsxTag::Fragment => {
        let nodes = self.materialize(Value::array(children))?;
        Ok(Value::node(Node::fragment(nodes)))
      }
      JsxTag::Host(tag) => self.host_element(tag, &props, children),
      JsxTag::Component(path) => {
        let name = element.tag.display_name();
        let (root, rest) = path
          .split_first()
          .ok_or_else(|| RenderError::NotAComponent(name.clone()))?;
        let mut component = scope
          .lookup(root)
          .ok_or_else(|| RenderError::NotDefined(root.clone()))?;
        for segment in rest {
          component = self.member(&component, segment)?;
        }
        if !matches!(component, Value::Function(_)) {
          return Err(RenderError::NotAComponent(name));
        }

        match children.len() {
          0 => {}
          1 => {
            props.insert("children".to_string(), children.remove(0));
          }
          _ => {
            props.insert("children".to_string(), Value::array(children));
          }
        }
        let drawn = self.call(&component, vec![Value::object(props)])?;
        Ok(Value::node(Node::fragment(self.materialize(drawn)?)))
      }
    }
  }

  /// Draw a host element. Only scalar, non-handler attributes survive.
  fn host_element(&mut self, tag: &str, props: &Object, children: Vec<Value>) -> Result<Value> {
    let mut element = Element::new(tag);
    for (name, value) in props {
      if let Some((name, value)) = host_attribute(name, value) {
        self.spend_bytes(value.len())?;
        element.push_attr(name, value);
        self.check(element.extent())?;
      }
    }
    for node in self.materialize(Value::array(children))? {
      element.push(node);
    }
    Ok(Value::node(element.into()))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn closure(function: &Arc<Function>, scope: &Rc<Scope>) -> Value {
  Value::Function(Rc::new(Callable::Closure {
    function: Arc::clone(function),
    scope:    Rc::clone(scope),
  }))
}

/// What [`Interpreter::materialize`] has to copy to draw `value`: anything
/// reachable through a shared reference.
fn copy_extent(value: &Value) -> Extent {
  match value {
    Value::Array(items) if Rc::strong_count(items) == 1 => items
      .iter()
      .fold(Extent::default(), |acc, item| acc.beside(copy_extent(item))),
    Value::Node(node) if Rc::strong_count(node) == 1 => Extent::default(),
    Value::Array(_) | Value::Node(_) => value.extent(),
    Value::Str(s) => Extent {
      bytes: s.len(),
      ..Extent::default()
    },
    _ => Extent::default(),
  }
}

/// Whether `+` with this operand concatenates.
fn is_textual(value: &Value) -> bool {
  !matches!(
    value,
    Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_)
  )
}

/// Operators over already-evaluated operands. String `+` goes through
/// [`Interpreter::concat`] instead.
fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
  let num = |f: fn(f64, f64) -> f64| Value::Number(f(lhs.to_number(), rhs.to_number()));
  match op {
    BinaryOp::Add => num(|a, b| a + b),
    BinaryOp::Sub => num(|a, b| a - b),
    BinaryOp::Mul => num(|a, b| a * b),
    BinaryOp::Div => num(|a, b| a / b),
    BinaryOp::Rem => num(|a, b| a % b),
    BinaryOp::Eq => Value::Bool(lhs.loose_eq(rhs)),
    BinaryOp::NotEq => Value::Bool(!lhs.loose_eq(rhs)),
    BinaryOp::StrictEq => Value::Bool(lhs.strict_eq(rhs)),
    BinaryOp::StrictNotEq => Value::Bool(!lhs.strict_eq(rhs)),
    BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
      let ordering = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
      };
      Value::Bool(ordering.is_some_and(|ordering| match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::LtEq => ordering.is_le(),
        _ => ordering.is_ge(),
      }))
    }
  }
}

fn host_attribute(name: &str, value: &Value) -> Option<(String, String)> {
  let is_handler = name.len() > 2
    && name.starts_with("on")
    && name[2..].starts_with(|c: char| c.is_ascii_uppercase());
  if is_handler || DROPPED_ATTRIBUTES.contains(&name) || !is_valid_attr_name(name) {
    return None;
  }
  let name = match name {
    "className" => "class",
    "htmlFor" => "for",
    other => other,
  };
  let value = match value {
    Value::Str(s) => s.to_string(),
    Value::Number(n) => format_number(*n),
    Value::Bool(true) => String::new(),
    _ => return None,
  };
  Some((name.to_string(), value))
}

/// Source-ish name of a callee for error messages.
fn describe_callee(callee: &Expr) -> String {
  match callee {
    Expr::Ident(name) => name.clone(),
    Expr::Member {
      object, property, ..
    } => format!("{}.{property}", describe_callee(object)),
    _ => "expression".to_string(),
  }
}
