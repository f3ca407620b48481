//! The sandbox binding: the only names a description can reach.

use std::collections::HashMap;

use indexmap::IndexMap;
use strum::IntoEnumIterator;

use super::value::{Native, Value};
use crate::primitive::Primitive;

/// Runtime names that are bound both at top level and on `React`.
const RUNTIME: &[(&str, Native)] = &[
  ("useState", Native::UseState),
  ("useEffect", Native::UseEffect),
  ("useMemo", Native::UseMemo),
  ("useCallback", Native::UseCallback),
  ("Fragment", Native::Fragment),
];

/// An explicit name → value mapping handed to one instantiation.
///
/// A binding is built fresh for every instantiation and consumed by it, so
/// nothing a description does can leak into the next one.
#[derive(Debug)]
pub struct SandboxBinding {
  values: IndexMap<String, Value>,
}

impl SandboxBinding {
  /// The runtime plus every whitelisted primitive.
  pub fn new() -> Self {
    let mut values = IndexMap::new();

    let react = RUNTIME
      .iter()
      .map(|(name, native)| (name.to_string(), Value::native(*native)))
      .collect();
    values.insert("React".to_string(), Value::object(react));

    for (name, native) in RUNTIME {
      values.insert(name.to_string(), Value::native(*native));
    }
    for primitive in Primitive::iter() {
      values.insert(
        primitive.as_ref().to_string(),
        Value::native(Native::Primitive(primitive)),
      );
    }
    Self { values }
  }

  pub fn contains(&self, name: &str) -> bool { self.values.contains_key(name) }

  pub fn names(&self) -> impl Iterator<Item = &str> { self.values.keys().map(String::as_str) }

  pub(crate) fn into_vars(self) -> HashMap<String, Value> {
    self.values.into_iter().collect()
  }
}

impl Default for SandboxBinding {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn binding_holds_runtime_and_primitives_only() {
    let binding = SandboxBinding::new();
    for name in ["React", "useState", "Fragment", "Card", "Chart"] {
      assert!(binding.contains(name), "{name}");
    }
    for name in ["window", "document", "fetch", "eval", "Function", "globalThis"] {
      assert!(!binding.contains(name), "{name}");
    }
    assert_eq!(binding.names().count(), 1 + RUNTIME.len() + 8);
  }

  #[test]
  fn react_namespace_exposes_hooks() {
    let binding = SandboxBinding::new();
    let vars = binding.into_vars();
    let Some(Value::Object(react)) = vars.get("React") else {
      panic!("React is an object")
    };
    assert!(react.contains_key("useState"));
    assert!(react.contains_key("Fragment"));
  }
}
