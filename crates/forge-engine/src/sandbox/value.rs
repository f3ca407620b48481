//! Runtime values and scopes for the sandbox interpreter.
//!
//! Values are single-threaded (`Rc`). A component and everything it creates
//! lives and dies inside one pipeline run.

use std::{cell::RefCell, collections::HashMap, fmt, ops::Deref, rc::Rc, sync::Arc};

use forge_markup::ast;
use indexmap::IndexMap;

use crate::{
  error::RenderError,
  html::{Extent, Node},
  primitive::Primitive,
};

pub type Object = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  Str(Rc<str>),
  Array(Rc<Measured<Vec<Value>>>),
  Object(Rc<Measured<Object>>),
  Function(Rc<Callable>),
  Node(Rc<Node>),
}

/// A container with the [`Extent`] of everything reachable from it, worked
/// out once when it is built. Arrays can share items, so walking them again
/// could cost far more than their memory.
#[derive(Debug, Clone)]
pub struct Measured<T> {
  inner:  T,
  extent: Extent,
}

impl<T> Measured<T> {
  pub fn extent(&self) -> Extent { self.extent }

  pub fn into_inner(self) -> T { self.inner }
}

impl<T> Deref for Measured<T> {
  type Target = T;

  fn deref(&self) -> &T { &self.inner }
}

/// Extent of `values` held in one container: one level deeper, and one
/// separator byte between neighbours as `join` would print them.
fn enclosing<'a>(values: impl Iterator<Item = &'a Value>) -> Extent {
  let mut extent = Extent::default();
  let mut count = 0usize;
  for value in values {
    extent = extent.beside(value.extent());
    count += 1;
  }
  Extent {
    depth: extent.depth + 1,
    bytes: extent.bytes.saturating_add(count.saturating_sub(1)),
    ..extent
  }
}

pub enum Callable {
  Closure {
    function: Arc<ast::Function>,
    scope:    Rc<Scope>,
  },
  Native(Native),
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Closures can reach themselves through their scope; never print it.
    match self {
      Self::Closure { function, .. } => {
        write!(f, "Closure({})", function.name.as_deref().unwrap_or("anonymous"))
      }
      Self::Native(native) => write!(f, "Native({native:?})"),
    }
  }
}

/// Host-implemented functions exposed through the sandbox binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Native {
  /// The setter returned by `useState`; drawing is a static snapshot.
  Noop,
  UseState,
  UseEffect,
  UseMemo,
  UseCallback,
  Fragment,
  Primitive(Primitive),
}

impl Value {
  pub fn str(s: &str) -> Self { Value::Str(Rc::from(s)) }

  pub fn native(native: Native) -> Self {
    Value::Function(Rc::new(Callable::Native(native)))
  }

  pub fn array(items: Vec<Value>) -> Self {
    let extent = enclosing(items.iter());
    Value::Array(Rc::new(Measured {
      inner: items,
      extent,
    }))
  }

  pub fn object(entries: Object) -> Self {
    let extent = enclosing(entries.values());
    Value::Object(Rc::new(Measured {
      inner: entries,
      extent,
    }))
  }

  pub fn node(node: Node) -> Self { Value::Node(Rc::new(node)) }

  /// How deep, how many elements and how many bytes this value would draw
  /// or print as, counting shared items once per reference.
  pub fn extent(&self) -> Extent {
    match self {
      Value::Undefined | Value::Null | Value::Function(_) => Extent::default(),
      Value::Bool(b) => Extent {
        bytes: if *b { 4 } else { 5 },
        ..Extent::default()
      },
      Value::Number(n) => Extent {
        bytes: format_number(*n).len(),
        ..Extent::default()
      },
      Value::Str(s) => Extent {
        bytes: s.len(),
        ..Extent::default()
      },
      Value::Array(items) => items.extent(),
      Value::Object(fields) => fields.extent(),
      Value::Node(node) => node.extent(),
    }
  }

  pub fn is_nullish(&self) -> bool { matches!(self, Value::Undefined | Value::Null) }

  pub fn truthy(&self) -> bool {
    match self {
      Value::Undefined | Value::Null => false,
      Value::Bool(b) => *b,
      Value::Number(n) => *n != 0.0 && !n.is_nan(),
      Value::Str(s) => !s.is_empty(),
      _ => true,
    }
  }

  /// The result of `typeof`.
  pub fn type_of(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::Str(_) => "string",
      Value::Function(_) => "function",
      Value::Null | Value::Array(_) | Value::Object(_) | Value::Node(_) => "object",
    }
  }

  pub fn to_number(&self) -> f64 {
    match self {
      Value::Undefined => f64::NAN,
      Value::Null => 0.0,
      Value::Bool(b) => f64::from(u8::from(*b)),
      Value::Number(n) => *n,
      Value::Str(s) => {
        let s = s.trim();
        if s.is_empty() {
          0.0
        } else {
          s.parse().unwrap_or(f64::NAN)
        }
      }
      Value::Array(items) if items.is_empty() => 0.0,
      Value::Array(items) if items.len() == 1 => items[0].to_number(),
      _ => f64::NAN,
    }
  }

  /// String conversion as used by `+`, templates and `join`.
  pub fn to_display(&self) -> String {
    match self {
      Value::Undefined => "undefined".to_string(),
      Value::Null => "null".to_string(),
      Value::Bool(b) => b.to_string(),
      Value::Number(n) => format_number(*n),
      Value::Str(s) => s.to_string(),
      Value::Array(items) => join(items, ","),
      Value::Object(_) | Value::Node(_) => "[object Object]".to_string(),
      Value::Function(_) => "function".to_string(),
    }
  }

  fn is_primitive(&self) -> bool {
    !matches!(
      self,
      Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Node(_)
    )
  }

  /// `===`
  pub fn strict_eq(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
      (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
      (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
      (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }

  /// `==`
  pub fn loose_eq(&self, other: &Value) -> bool {
    match (self, other) {
      (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
      (Value::Str(a), Value::Str(b)) => a == b,
      (a, b) if a.is_primitive() && b.is_primitive() => a.to_number() == b.to_number(),
      (a, b) if a.is_primitive() || b.is_primitive() => {
        a.to_display() == b.to_display()
      }
      (a, b) => a.strict_eq(b),
    }
  }

  /// Key used when this value indexes an object or array.
  pub fn to_property_key(&self) -> String {
    match self {
      Value::Number(n) => format_number(*n),
      other => other.to_display(),
    }
  }

  /// Append the nodes this value draws as a child, taking them over
  /// without a copy when nothing else holds them.
  ///
  /// `null`, `undefined`, booleans and empty strings draw nothing, as do
  /// functions. The interpreter checks [`Value::extent`] against its limits
  /// before calling this; the copy made here is never larger than that.
  pub fn append_nodes(self, out: &mut Vec<Node>) -> Result<(), RenderError> {
    match self {
      Value::Undefined | Value::Null | Value::Bool(_) | Value::Function(_) => {}
      Value::Number(n) => out.push(Node::text(format_number(n))),
      Value::Str(s) if s.is_empty() => {}
      Value::Str(s) => out.push(Node::text(s.to_string())),
      Value::Array(items) => {
        for item in Rc::unwrap_or_clone(items).into_inner() {
          item.append_nodes(out)?;
        }
      }
      Value::Node(node) => match Rc::unwrap_or_clone(node) {
        Node::Fragment(children) => out.extend(children),
        node => out.push(node),
      },
      Value::Object(_) => return Err(RenderError::InvalidChild("object")),
    }
    Ok(())
  }

  pub fn into_nodes(self) -> Result<Vec<Node>, RenderError> {
    let mut out = Vec::new();
    self.append_nodes(&mut out)?;
    Ok(out)
  }
}

pub fn join(items: &[Value], separator: &str) -> String {
  items
    .iter()
    .map(|item| match item {
      Value::Undefined | Value::Null => String::new(),
      other => other.to_display(),
    })
    .collect::<Vec<_>>()
    .join(separator)
}

/// Number to string the way a browser prints it: integral values have no
/// decimal point, and very large or very small magnitudes use an exponent.
pub fn format_number(n: f64) -> String {
  if n.is_nan() {
    "NaN".to_string()
  } else if n.is_infinite() {
    let sign = if n > 0.0 { "" } else { "-" };
    format!("{sign}Infinity")
  } else if n == 0.0 {
    "0".to_string()
  } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
      Some((mantissa, exponent)) if !exponent.starts_with('-') => {
        format!("{mantissa}e+{exponent}")
      }
      _ => formatted,
    }
  } else if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
    format!("{}", n as i64)
  } else {
    format!("{n}")
  }
}

// ─── Scopes ──────────────────────────────────────────────────────────────────

/// One level of the lexical scope chain. The root level is the sandbox
/// binding; there is nothing above it.
#[derive(Default)]
pub struct Scope {
  vars:   RefCell<HashMap<String, Value>>,
  parent: Option<Rc<Scope>>,
}

impl Scope {
  pub fn root(vars: HashMap<String, Value>) -> Self {
    Self {
      vars:   RefCell::new(vars),
      parent: None,
    }
  }

  pub fn child(parent: &Rc<Scope>) -> Self {
    Self {
      vars:   RefCell::default(),
      parent: Some(Rc::clone(parent)),
    }
  }

  pub fn define(&self, name: &str, value: Value) {
    self.vars.borrow_mut().insert(name.to_string(), value);
  }

  pub fn lookup(&self, name: &str) -> Option<Value> {
    if let Some(value) = self.vars.borrow().get(name) {
      return Some(value.clone());
    }
    self.parent.as_ref()?.lookup(name)
  }

  /// Drop every binding, breaking closure reference cycles.
  pub fn clear(&self) { self.vars.borrow_mut().clear(); }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::html::Element;

  #[test]
  fn number_formatting() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    assert_eq!(format_number(1e21), "1e+21");
    assert_eq!(format_number(-2.5e300), "-2.5e+300");
    assert_eq!(format_number(1.5e-7), "1.5e-7");
    assert_eq!(format_number(1e20), "100000000000000000000");
  }

  #[test]
  fn truthiness() {
    assert!(!Value::str("").truthy());
    assert!(Value::str("0").truthy());
    assert!(!Value::Number(0.0).truthy());
    assert!(!Value::Number(f64::NAN).truthy());
    assert!(Value::array(vec![]).truthy());
    assert!(!Value::Null.truthy());
  }

  #[test]
  fn equality() {
    assert!(Value::Null.loose_eq(&Value::Undefined));
    assert!(!Value::Null.strict_eq(&Value::Undefined));
    assert!(Value::Number(1.0).loose_eq(&Value::str("1")));
    assert!(!Value::Number(1.0).strict_eq(&Value::str("1")));
    assert!(!Value::Number(0.0).loose_eq(&Value::Null));
    let a = Value::array(vec![]);
    assert!(a.strict_eq(&a.clone()));
    assert!(!a.strict_eq(&Value::array(vec![])));
  }

  #[test]
  fn display_of_arrays_skips_nullish() {
    let v = Value::array(vec![Value::Number(1.0), Value::Null, Value::str("x")]);
    assert_eq!(v.to_display(), "1,,x");
  }

  #[test]
  fn objects_cannot_be_drawn() {
    let err = Value::object(Object::new()).into_nodes().unwrap_err();
    assert_eq!(err, RenderError::InvalidChild("object"));
    assert!(Value::Bool(true).into_nodes().unwrap().is_empty());
    assert!(Value::str("").into_nodes().unwrap().is_empty());
  }

  #[test]
  fn shared_items_count_once_per_reference() {
    let leaf = Value::node(Element::new("b").child(Node::text("x")).into());
    let mut value = leaf;
    for _ in 0..10 {
      value = Value::array(vec![value.clone(), value]);
    }
    let extent = value.extent();
    assert_eq!(extent.elements, 1024);
    assert_eq!(extent.depth, 11);
    // 1024 `<b>x</b>` plus a separator between every pair of neighbours.
    assert_eq!(extent.bytes, 1024 * 8 + 1023);
  }

  #[test]
  fn drawn_fragments_are_spliced_into_their_parent() {
    let fragment = Value::node(Node::fragment(vec![Node::text("a"), Node::text("b")]));
    let value = Value::array(vec![fragment, Value::Number(1.0)]);
    assert_eq!(value.into_nodes().unwrap(), vec![
      Node::text("a"),
      Node::text("b"),
      Node::text("1"),
    ]);
  }

  #[test]
  fn scope_lookup_walks_parents_only() {
    let root = Rc::new(Scope::root(HashMap::from([(
      "a".to_string(),
      Value::Number(1.0),
    )])));
    let child = Scope::child(&root);
    child.define("b", Value::Number(2.0));
    assert!(child.lookup("a").is_some());
    assert!(root.lookup("b").is_none());
    assert!(child.lookup("window").is_none());
  }
}
