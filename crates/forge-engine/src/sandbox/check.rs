//! Static free-name check run before any evaluation.
//!
//! Walks the definition with a stack of lexical scopes. Any identifier that
//! is not declared by the description and not present in the binding is
//! rejected, as is any element tag outside the binding and the structural
//! tag list.

use std::collections::HashSet;

use forge_markup::ast::{
  Arg, Body, Definition, Expr, Function, Item, JsxAttrValue, JsxAttribute,
  JsxChild, JsxElement, JsxTag, Pattern, Property, Stmt, TemplatePart,
};

use super::binding::SandboxBinding;
use crate::{error::InstantiationError, policy::STRUCTURAL_TAGS};

type Result<T = ()> = std::result::Result<T, InstantiationError>;

pub(crate) fn check_definition(def: &Definition, binding: &SandboxBinding) -> Result {
  let mut module = HashSet::new();
  for item in &def.items {
    match item {
      Item::Function { name, .. } => {
        module.insert(name.clone());
      }
      Item::Declare(decl) => {
        module.extend(decl.pattern.bound_names().into_iter().map(str::to_string));
      }
    }
  }

  let mut checker = Checker {
    binding,
    scopes: vec![module],
  };
  for item in &def.items {
    match item {
      Item::Function { function, .. } => checker.function(function)?,
      Item::Declare(decl) => {
        checker.pattern(&decl.pattern)?;
        if let Some(init) = &decl.init {
          checker.expr(init)?;
        }
      }
    }
  }
  Ok(())
}

struct Checker<'a> {
  binding: &'a SandboxBinding,
  scopes:  Vec<HashSet<String>>,
}

impl Checker<'_> {
  fn resolves(&self, name: &str) -> bool {
    self.scopes.iter().rev().any(|scope| scope.contains(name))
      || self.binding.contains(name)
  }

  fn ident(&self, name: &str) -> Result {
    if self.resolves(name) {
      Ok(())
    } else {
      Err(InstantiationError::Unbound {
        name: name.to_string(),
      })
    }
  }

  fn with_scope(
    &mut self,
    names: HashSet<String>,
    f: impl FnOnce(&mut Self) -> Result,
  ) -> Result {
    self.scopes.push(names);
    let result = f(self);
    self.scopes.pop();
    result
  }

  fn function(&mut self, function: &Function) -> Result {
    let mut names: HashSet<String> = function
      .params
      .iter()
      .flat_map(Pattern::bound_names)
      .map(str::to_string)
      .collect();
    if let Body::Block(stmts) = &function.body {
      names.extend(declared_names(stmts));
    }
    self.with_scope(names, |this| {
      for param in &function.params {
        this.pattern(param)?;
      }
      match &function.body {
        Body::Block(stmts) => this.stmts(stmts),
        Body::Expr(expr) => this.expr(expr),
      }
    })
  }

  /// Only default values inside a pattern can reference names.
  fn pattern(&mut self, pattern: &Pattern) -> Result {
    match pattern {
      Pattern::Ident(_) => Ok(()),
      Pattern::Array(items) => {
        for item in items.iter().flatten() {
          self.pattern(item)?;
        }
        Ok(())
      }
      Pattern::Object(props) => {
        for prop in props {
          self.pattern(&prop.value)?;
        }
        Ok(())
      }
      Pattern::Default(inner, fallback) => {
        self.pattern(inner)?;
        self.expr(fallback)
      }
    }
  }

  fn stmts(&mut self, stmts: &[Stmt]) -> Result {
    for stmt in stmts {
      match stmt {
        Stmt::Declare(decl) => {
          self.pattern(&decl.pattern)?;
          if let Some(init) = &decl.init {
            self.expr(init)?;
          }
        }
        Stmt::Function { function, .. } => self.function(function)?,
        Stmt::Return(value) => {
          if let Some(value) = value {
            self.expr(value)?;
          }
        }
        Stmt::If {
          test,
          then,
          otherwise,
        } => {
          self.expr(test)?;
          self.block(then)?;
          if let Some(otherwise) = otherwise {
            self.block(otherwise)?;
          }
        }
        Stmt::Expr(expr) => self.expr(expr)?,
      }
    }
    Ok(())
  }

  fn block(&mut self, stmts: &[Stmt]) -> Result {
    self.with_scope(declared_names(stmts), |this| this.stmts(stmts))
  }

  fn args(&mut self, args: &[Arg]) -> Result {
    for arg in args {
      match arg {
        Arg::Expr(expr) | Arg::Spread(expr) => self.expr(expr)?,
      }
    }
    Ok(())
  }

  fn expr(&mut self, expr: &Expr) -> Result {
    match expr {
      Expr::Literal(_) => Ok(()),
      Expr::Ident(name) => self.ident(name),
      Expr::Template(parts) => {
        for part in parts {
          if let TemplatePart::Expr(expr) = part {
            self.expr(expr)?;
          }
        }
        Ok(())
      }
      Expr::Array(items) => self.args(items),
      Expr::Object(props) => {
        for prop in props {
          match prop {
            Property::KeyValue(_, value) | Property::Spread(value) => self.expr(value)?,
          }
        }
        Ok(())
      }
      Expr::Member { object, .. } => self.expr(object),
      Expr::Index { object, index, .. } => {
        self.expr(object)?;
        self.expr(index)
      }
      Expr::Call { callee, args, .. } => {
        self.expr(callee)?;
        self.args(args)
      }
      Expr::Unary { operand, .. } => self.expr(operand),
      Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
        self.expr(lhs)?;
        self.expr(rhs)
      }
      Expr::Conditional {
        test,
        consequent,
        alternate,
      } => {
        self.expr(test)?;
        self.expr(consequent)?;
        self.expr(alternate)
      }
      Expr::Function(function) => self.function(function),
      Expr::Jsx(element) => self.jsx(element),
    }
  }

  fn jsx(&mut self, element: &JsxElement) -> Result {
    match &element.tag {
      JsxTag::Fragment => {}
      JsxTag::Host(tag) => {
        if !STRUCTURAL_TAGS.contains(&tag.as_str()) {
          return Err(InstantiationError::UnknownTag {
            tag: tag.clone(),
            at:  element.at,
          });
        }
      }
      JsxTag::Component(path) => {
        if !path.first().is_some_and(|root| self.resolves(root)) {
          return Err(InstantiationError::UnknownTag {
            tag: element.tag.display_name(),
            at:  element.at,
          });
        }
      }
    }

    for attribute in &element.attributes {
      match attribute {
        JsxAttribute::Named {
          value: JsxAttrValue::Expr(expr),
          ..
        }
        | JsxAttribute::Spread(expr) => self.expr(expr)?,
        JsxAttribute::Named { .. } => {}
      }
    }
    for child in &element.children {
      match child {
        JsxChild::Text(_) => {}
        JsxChild::Expr(expr) => self.expr(expr)?,
        JsxChild::Element(child) => self.jsx(child)?,
      }
    }
    Ok(())
  }
}

/// Names declared directly in a block (not in nested blocks).
fn declared_names(stmts: &[Stmt]) -> HashSet<String> {
  let mut names = HashSet::new();
  for stmt in stmts {
    match stmt {
      Stmt::Declare(decl) => {
        names.extend(decl.pattern.bound_names().into_iter().map(str::to_string));
      }
      Stmt::Function { name, .. } => {
        names.insert(name.clone());
      }
      _ => {}
    }
  }
  names
}
