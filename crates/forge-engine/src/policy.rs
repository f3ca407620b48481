//! The validation policy: a textual pre-check run before any parsing.
//!
//! The policy is a data rule list evaluated in order; the first violation
//! wins. It is a conservative scan of the raw text, not a semantic analysis.
//! Anything it misses still has to get past the sandbox, which can only see
//! the names in its binding.

use std::collections::HashSet;

use regex::Regex;
use strum::IntoEnumIterator;

use crate::{error::ValidationError, primitive::Primitive};

/// Lowercase element names a description may use directly.
pub const STRUCTURAL_TAGS: &[&str] = &[
  "div", "span", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li",
  "table", "thead", "tbody", "tr", "td", "th",
];

const IMPORT_PATTERN: &str = r#"import\s+.*\s+from\s+['"][^'"]+['"]"#;
const INLINE_STYLE_PATTERN: &str = r"style=\s*\{\s*\{\s*[^}]+\}\s*\}";

const INLINE_STYLE_MESSAGE: &str = "Inline styles prohibited - use Tailwind classes";
const FACTORY_MESSAGE: &str = "Creating new components is prohibited";
const FACTORY_SIGNATURES: &[&str] =
  &["const Styled", "styled(", "styled.", "createComponent"];

/// Every capability name the policy accepts: the primitives plus the
/// structural tags.
pub fn allowed_names() -> impl Iterator<Item = &'static str> {
  Primitive::iter()
    .map(<&'static str>::from)
    .chain(STRUCTURAL_TAGS.iter().copied())
}

enum Rule {
  /// Imports from anywhere but the runtime or a relative path may only
  /// bring in allowed names.
  ImportWhitelist(Regex),
  /// Any match is a violation.
  Forbidden { pattern: Regex, message: &'static str },
  /// Any occurrence of any needle is a violation.
  ForbiddenText {
    needles: &'static [&'static str],
    message: &'static str,
  },
}

pub struct Policy {
  rules:   Vec<Rule>,
  allowed: HashSet<&'static str>,
}

impl Policy {
  pub fn new() -> Result<Self, regex::Error> {
    Ok(Self {
      rules:   vec![
        Rule::ImportWhitelist(Regex::new(IMPORT_PATTERN)?),
        Rule::Forbidden {
          pattern: Regex::new(INLINE_STYLE_PATTERN)?,
          message: INLINE_STYLE_MESSAGE,
        },
        Rule::ForbiddenText {
          needles: FACTORY_SIGNATURES,
          message: FACTORY_MESSAGE,
        },
      ],
      allowed: allowed_names().collect(),
    })
  }

  pub fn is_allowed(&self, name: &str) -> bool { self.allowed.contains(name) }

  /// Check `source` against every rule in order.
  pub fn validate(&self, source: &str) -> Result<(), ValidationError> {
    for rule in &self.rules {
      match rule {
        Rule::ImportWhitelist(pattern) => {
          for found in pattern.find_iter(source) {
            self.check_import(found.as_str())?;
          }
        }
        Rule::Forbidden { pattern, message } => {
          if pattern.is_match(source) {
            return Err(ValidationError::new(*message));
          }
        }
        Rule::ForbiddenText { needles, message } => {
          if needles.iter().any(|needle| source.contains(needle)) {
            return Err(ValidationError::new(*message));
          }
        }
      }
    }
    Ok(())
  }

  fn check_import(&self, text: &str) -> Result<(), ValidationError> {
    let module = import_module(text);
    let trusted = module == "react"
      || module.starts_with("react/")
      || module.starts_with("./")
      || module.starts_with("../");
    if trusted {
      return Ok(());
    }

    let names = imported_names(text);
    if names.is_empty() || names.iter().any(|name| !self.is_allowed(name)) {
      return Err(ValidationError::new(format!("Prohibited import: {text}")));
    }
    Ok(())
  }
}

/// The quoted module specifier at the end of a matched import.
fn import_module(text: &str) -> &str {
  let trimmed = text.trim_end_matches(['\'', '"']);
  match trimmed.rfind(['\'', '"']) {
    Some(quote) => &trimmed[quote + 1..],
    None => trimmed,
  }
}

/// The exported names an import clause asks for. Aliases are ignored
/// (`{ Card as Box }` asks for `Card`); a namespace import asks for its
/// local name, which is never a primitive.
fn imported_names(text: &str) -> Vec<&str> {
  let clause = text
    .strip_prefix("import")
    .and_then(|rest| rest.rfind("from").map(|i| &rest[..i]))
    .unwrap_or_default();

  let (outside, inside) = match (clause.find('{'), clause.rfind('}')) {
    (Some(open), Some(close)) if open < close => (
      vec![&clause[..open], &clause[close + 1..]],
      Some(&clause[open + 1..close]),
    ),
    _ => (vec![clause], None),
  };

  let mut names: Vec<&str> = inside
    .into_iter()
    .flat_map(|specs| specs.split(','))
    .filter_map(|spec| spec.split_whitespace().next())
    .collect();
  for part in outside.iter().flat_map(|part| part.split(',')) {
    if let Some(local) = part.split_whitespace().last() {
      names.push(local);
    }
  }
  names
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn policy() -> Policy { Policy::new().unwrap() }

  fn message(source: &str) -> String {
    policy().validate(source).unwrap_err().message
  }

  #[test]
  fn prohibited_import_reports_exact_text() {
    let src = "import { Foo } from 'some-lib';\nfunction GeneratedUI() { return <Foo />; }";
    assert_eq!(message(src), "Prohibited import: import { Foo } from 'some-lib'");
  }

  #[test]
  fn whitelisted_names_from_packages_are_allowed() {
    assert!(
      policy()
        .validate("import { Card, Button as Btn } from '@/components/ui';")
        .is_ok()
    );
    assert!(policy().validate("import Chart from \"charts\";").is_ok());
  }

  #[test]
  fn a_single_unknown_name_rejects_the_import() {
    let src = "import { Card, Popover } from '@/components/ui';";
    assert!(message(src).starts_with("Prohibited import: "));
  }

  #[test]
  fn runtime_and_relative_imports_are_always_allowed() {
    for src in [
      "import React, { useState } from 'react';",
      "import { jsx } from 'react/jsx-runtime';",
      "import { Anything } from './local';",
      "import Thing from '../shared/thing';",
    ] {
      assert!(policy().validate(src).is_ok(), "{src}");
    }
  }

  #[test]
  fn namespace_imports_from_packages_are_rejected() {
    let src = "import * as UI from 'ui-kit';";
    assert_eq!(message(src), "Prohibited import: import * as UI from 'ui-kit'");
  }

  #[test]
  fn inline_style_is_rejected_regardless_of_other_content() {
    let src = "import React from 'react';\n\
               function GeneratedUI() { return <div style={{ color: 'red' }}>hi</div>; }";
    assert_eq!(message(src), INLINE_STYLE_MESSAGE);
    assert_eq!(message("<p style= { {margin: 0} }/>"), INLINE_STYLE_MESSAGE);
  }

  #[test]
  fn component_factories_are_rejected() {
    for src in [
      "const StyledBox = styled.div``;",
      "const Box = styled(Card)``;",
      "const X = createComponent();",
    ] {
      assert_eq!(message(src), FACTORY_MESSAGE, "{src}");
    }
  }

  #[test]
  fn rules_run_in_order() {
    let src = "import { Foo } from 'x';\nconst Styled = 1; <div style={{a: 1}} />";
    assert!(message(src).starts_with("Prohibited import"));
    let src = "const Styled = 1; <div style={{a: 1}} />";
    assert_eq!(message(src), INLINE_STYLE_MESSAGE);
  }

  #[test]
  fn clean_source_validates() {
    let src = r#"
      import React, { useState } from 'react';
      function GeneratedUI() {
        const [open] = useState(false);
        return <Card title="Hi"><Button variant="primary">Go</Button></Card>;
      }
    "#;
    assert!(policy().validate(src).is_ok());
  }

  #[test]
  fn allowed_names_cover_primitives_and_structure() {
    let p = policy();
    assert!(p.is_allowed("Navbar"));
    assert!(p.is_allowed("h6"));
    assert!(!p.is_allowed("script"));
    assert_eq!(allowed_names().count(), 8 + STRUCTURAL_TAGS.len());
  }

  #[test]
  fn import_clause_parsing() {
    assert_eq!(imported_names("import A, { B as C, D } from 'x'"), vec!["B", "D", "A"]);
    assert_eq!(imported_names("import * as NS from 'x'"), vec!["NS"]);
    assert_eq!(import_module("import A from \"pkg/sub\""), "pkg/sub");
  }
}
