//! The executable definition produced by [`crate::transform`].
//!
//! The tree is immutable once built. Function bodies are behind [`Arc`] so an
//! evaluator can capture them in closures without copying the tree.

use std::sync::Arc;

use crate::error::Position;

// ─── Definition ──────────────────────────────────────────────────────────────

/// The authoring shape the source arrived in. All shapes normalise to the
/// same [`Definition`]; the shape is kept for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
  /// `function GeneratedUI() { … }`
  Function,
  /// `export default function …` or `export default Name;`
  DefaultExport,
  /// `const GeneratedUI = () => …`
  Arrow,
}

/// A compiled UI description: module-level items plus the name of the
/// component to call.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
  /// The module-scope binding holding the component function.
  pub entry:   String,
  pub items:   Vec<Item>,
  pub imports: Vec<Import>,
  pub shape:   SourceShape,
}

/// An `import` declaration. Imports are recorded, never executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
  pub module: String,
  /// Local names introduced by the import.
  pub names:  Vec<String>,
}

/// A module-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
  /// A function declaration. Bound under its name (or `default`) before any
  /// declaration is evaluated.
  Function { name: String, function: Arc<Function> },
  Declare(Declaration),
}

// ─── Functions and statements ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
  pub name:   Option<String>,
  pub params: Vec<Pattern>,
  pub body:   Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Block(Vec<Stmt>),
  /// Concise arrow body: `x => x + 1`.
  Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
  Const,
  Let,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
  pub kind:    DeclKind,
  pub pattern: Pattern,
  pub init:    Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  Declare(Declaration),
  Function { name: String, function: Arc<Function> },
  Return(Option<Expr>),
  If {
    test:      Expr,
    then:      Vec<Stmt>,
    otherwise: Option<Vec<Stmt>>,
  },
  Expr(Expr),
}

/// A binding target.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
  Ident(String),
  /// `[a, , b]`: `None` is a hole.
  Array(Vec<Option<Pattern>>),
  /// `{ a, b: c }`
  Object(Vec<PropPattern>),
  /// `pattern = fallback`
  Default(Box<Pattern>, Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropPattern {
  pub key:   String,
  pub value: Pattern,
}

impl Pattern {
  /// Every name this pattern binds, in source order.
  pub fn bound_names(&self) -> Vec<&str> {
    let mut names = Vec::new();
    self.collect_names(&mut names);
    names
  }

  fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
    match self {
      Self::Ident(name) => out.push(name),
      Self::Array(items) => {
        for item in items.iter().flatten() {
          item.collect_names(out);
        }
      }
      Self::Object(props) => {
        for prop in props {
          prop.value.collect_names(out);
        }
      }
      Self::Default(inner, _) => inner.collect_names(out),
    }
  }
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  Null,
  Undefined,
  Bool(bool),
  Number(f64),
  String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
  Text(String),
  Expr(Expr),
}

/// An array element or call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
  Expr(Expr),
  Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
  KeyValue(String, Expr),
  Spread(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Not,
  Neg,
  Plus,
  TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Eq,
  NotEq,
  StrictEq,
  StrictNotEq,
  Lt,
  Gt,
  LtEq,
  GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
  And,
  Or,
  Nullish,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Literal(Literal),
  Ident(String),
  Template(Vec<TemplatePart>),
  Array(Vec<Arg>),
  Object(Vec<Property>),
  Member {
    object:   Box<Expr>,
    property: String,
    optional: bool,
  },
  Index {
    object:   Box<Expr>,
    index:    Box<Expr>,
    optional: bool,
  },
  Call {
    callee:   Box<Expr>,
    args:     Vec<Arg>,
    optional: bool,
  },
  Unary {
    op:      UnaryOp,
    operand: Box<Expr>,
  },
  Binary {
    op:  BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
  Logical {
    op:  LogicalOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
  Conditional {
    test:       Box<Expr>,
    consequent: Box<Expr>,
    alternate:  Box<Expr>,
  },
  Function(Arc<Function>),
  Jsx(Box<JsxElement>),
}

// ─── JSX ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxTag {
  /// `<>…</>`
  Fragment,
  /// A lowercase tag such as `div`.
  Host(String),
  /// A capitalised or dotted tag such as `Card` or `React.Fragment`.
  Component(Vec<String>),
}

impl JsxTag {
  pub fn display_name(&self) -> String {
    match self {
      Self::Fragment => String::new(),
      Self::Host(name) => name.clone(),
      Self::Component(path) => path.join("."),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
  pub tag:        JsxTag,
  pub attributes: Vec<JsxAttribute>,
  pub children:   Vec<JsxChild>,
  pub at:         Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
  Named { name: String, value: JsxAttrValue },
  Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrValue {
  /// `<Button disabled />`
  Implicit,
  Text(String),
  Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
  Text(String),
  Expr(Expr),
  Element(JsxElement),
}
