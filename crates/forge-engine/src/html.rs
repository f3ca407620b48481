//! The drawn element tree and its HTML serialisation.
//!
//! Every string that reaches the output goes through [`escape_text`] or
//! [`escape_attr`]; there is no raw-HTML node.

use std::fmt::Write as _;

/// Elements serialised without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
  "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  Element(Element),
  Text(String),
  /// Never directly contains another fragment; see [`Node::fragment`].
  Fragment(Vec<Node>),
}

/// The size of a drawn tree, kept up to date as it is built so limits can
/// be checked without walking it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
  /// Longest chain of nested elements.
  pub depth:    usize,
  pub elements: usize,
  /// Serialised length before escaping, counting a closing tag for void
  /// elements too.
  pub bytes:    usize,
}

impl Extent {
  /// Extent of `children` laid side by side.
  pub fn beside(self, other: Extent) -> Extent {
    Extent {
      depth:    self.depth.max(other.depth),
      elements: self.elements.saturating_add(other.elements),
      bytes:    self.bytes.saturating_add(other.bytes),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
  tag:      String,
  attrs:    Vec<(String, String)>,
  children: Vec<Node>,
  extent:   Extent,
}

impl Element {
  pub fn new(tag: impl Into<String>) -> Self {
    let tag = tag.into();
    // `<tag></tag>`
    let bytes = 2 * tag.len() + 5;
    Self {
      tag,
      attrs: Vec::new(),
      children: Vec::new(),
      extent: Extent {
        depth: 1,
        elements: 1,
        bytes,
      },
    }
  }

  pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.push_attr(name.into(), value.into());
    self
  }

  /// Set `class`, collapsing runs of whitespace left by optional parts.
  pub fn class(self, class: &str) -> Self {
    let class = class.split_whitespace().collect::<Vec<_>>().join(" ");
    self.attr("class", class)
  }

  pub fn child(mut self, child: impl Into<Node>) -> Self {
    self.push(child.into());
    self
  }

  pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
    for child in children {
      self.push(child);
    }
    self
  }

  pub fn extent(&self) -> Extent { self.extent }

  pub fn push_attr(&mut self, name: String, value: String) {
    // ` name="value"`
    self.extent.bytes = self
      .extent
      .bytes
      .saturating_add(name.len() + value.len() + 4);
    self.attrs.push((name, value));
  }

  pub fn push(&mut self, child: Node) {
    let inner = child.extent();
    self.extent = Extent {
      depth:    self.extent.depth.max(inner.depth + 1),
      elements: self.extent.elements.saturating_add(inner.elements),
      bytes:    self.extent.bytes.saturating_add(inner.bytes),
    };
    self.children.push(child);
  }
}

impl From<Element> for Node {
  fn from(element: Element) -> Self { Node::Element(element) }
}

impl Node {
  pub fn text(text: impl Into<String>) -> Self { Node::Text(text.into()) }

  pub fn empty() -> Self { Node::Fragment(Vec::new()) }

  /// A fragment of `children`, with nested fragments spliced in place.
  pub fn fragment(children: Vec<Node>) -> Self {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
      match child {
        Node::Fragment(inner) => flat.extend(inner),
        other => flat.push(other),
      }
    }
    Node::Fragment(flat)
  }

  pub fn extent(&self) -> Extent {
    match self {
      Node::Element(el) => el.extent(),
      Node::Text(text) => Extent {
        bytes: text.len(),
        ..Extent::default()
      },
      Node::Fragment(children) => children
        .iter()
        .fold(Extent::default(), |acc, child| acc.beside(child.extent())),
    }
  }

  pub fn to_html(&self) -> String {
    let mut out = String::with_capacity(self.extent().bytes);
    self.write_html(&mut out);
    out
  }

  pub fn write_html(&self, out: &mut String) {
    match self {
      Node::Text(text) => out.push_str(&escape_text(text)),
      Node::Fragment(children) => {
        for child in children {
          child.write_html(out);
        }
      }
      Node::Element(el) => {
        let _ = write!(out, "<{}", el.tag);
        for (name, value) in &el.attrs {
          let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&el.tag.as_str()) {
          return;
        }
        for child in &el.children {
          child.write_html(out);
        }
        let _ = write!(out, "</{}>", el.tag);
      }
    }
  }

  /// Number of elements in the tree, fragments excluded.
  pub fn element_count(&self) -> usize { self.extent().elements }
}

pub fn escape_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      c => out.push(c),
    }
  }
  out
}

pub fn escape_attr(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// Whether `name` can be emitted as an attribute name verbatim.
pub fn is_valid_attr_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}
