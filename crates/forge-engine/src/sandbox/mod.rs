//! Sandboxed instantiation and rendering of compiled definitions.
//!
//! A definition is evaluated in a scope chain whose root is an explicit
//! [`SandboxBinding`]. There is no ambient environment: a name that is not
//! declared by the description or present in the binding is rejected before
//! any code runs.

pub mod binding;
mod builtins;
pub(crate) mod check;
pub(crate) mod interp;
pub mod value;

use forge_markup::Definition;
use serde::{Deserialize, Serialize};

pub use self::binding::SandboxBinding;
use self::{interp::Interpreter, value::Value};
use crate::error::{InstantiationError, RenderError};

/// Evaluation budgets for one instantiation and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
  /// Nested calls (components and functions) before rendering fails.
  pub max_call_depth:   usize,
  /// Nested expressions being evaluated at once, across calls, and levels
  /// of nesting inside any one value.
  pub max_nesting:      usize,
  /// Evaluation steps shared by module evaluation and rendering. Building
  /// strings, arrays and element trees costs in proportion to their size.
  pub fuel:             u64,
  /// Elements any one value may draw.
  pub max_elements:     usize,
  /// Bytes any one string, or the serialised output, may hold.
  pub max_output_bytes: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      max_call_depth:   64,
      max_nesting:      192,
      fuel:             100_000,
      max_elements:     10_000,
      max_output_bytes: 1 << 20,
    }
  }
}

/// A callable component produced by [`instantiate`].
pub struct Component {
  interp: Interpreter,
  entry:  Value,
  name:   String,
}

impl Component {
  /// The module-scope name the component was bound under.
  pub fn name(&self) -> &str { &self.name }
}

/// The result of rendering a component: escaped HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedOutput {
  pub html:          String,
  pub element_count: usize,
}

/// Check `definition` against `binding`, evaluate its module scope and
/// resolve the entry point.
pub fn instantiate(
  definition: &Definition,
  binding: SandboxBinding,
  limits: Limits,
) -> Result<Component, InstantiationError> {
  check::check_definition(definition, &binding)?;

  let mut interp = Interpreter::new(limits);
  let module = interp.load_module(definition, binding)?;
  let entry = module
    .lookup(&definition.entry)
    .unwrap_or(Value::Undefined);
  if !matches!(entry, Value::Function(_)) {
    return Err(InstantiationError::NotCallable {
      entry: definition.entry.clone(),
    });
  }

  Ok(Component {
    interp,
    entry,
    name: definition.entry.clone(),
  })
}

/// Call the component with empty props and serialise what it draws.
pub fn render(component: Component) -> Result<RenderedOutput, RenderError> {
  let Component {
    mut interp, entry, ..
  } = component;
  let drawn = interp.call(&entry, vec![Value::object(value::Object::new())])?;
  let nodes = interp.materialize(drawn)?;
  let limits = interp.limits();
  // Closure scopes go first so the drawn tree is the only owner left.
  drop(interp);

  let mut html = String::new();
  let mut element_count = 0;
  for node in &nodes {
    node.write_html(&mut html);
    element_count += node.element_count();
  }
  // Escaping can grow text past the size checked while drawing.
  if html.len() > limits.max_output_bytes {
    return Err(RenderError::OutputTooLarge {
      limit: limits.max_output_bytes,
    });
  }
  Ok(RenderedOutput {
    html,
    element_count,
  })
}

#[cfg(test)]
mod tests;
