//! The fixed library of whitelisted UI primitives.
//!
//! [`Primitive`] is the single source of truth for capability names: the
//! validation policy allows exactly these names (plus structural tags) and
//! the sandbox binding exposes exactly these implementations.
//!
//! Each primitive draws a static snapshot of its component: interactive
//! state sits at its initial value and event handlers are never emitted.

use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::{
  error::RenderError,
  html::{Element, Node},
  sandbox::{
    interp::Interpreter,
    value::{Object, Value, format_number},
  },
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
pub enum Primitive {
  Button,
  Card,
  Input,
  Table,
  Modal,
  Sidebar,
  Navbar,
  Chart,
}

/// Read-only view over a props object.
pub(crate) struct Props<'a>(pub(crate) &'a Object);

impl Props<'_> {
  fn get(&self, key: &str) -> &Value {
    self.0.get(key).unwrap_or(&Value::Undefined)
  }

  /// A string-ish prop; numbers are formatted, anything else is absent.
  fn text(&self, key: &str) -> Option<String> {
    match self.get(key) {
      Value::Str(s) => Some(s.to_string()),
      Value::Number(n) => Some(format_number(*n)),
      _ => None,
    }
  }

  fn text_or(&self, key: &str, default: &str) -> String {
    self.text(key).unwrap_or_else(|| default.to_string())
  }

  fn flag(&self, key: &str) -> bool { self.get(key).truthy() }

  fn flag_or(&self, key: &str, default: bool) -> bool {
    match self.get(key) {
      Value::Undefined => default,
      other => other.truthy(),
    }
  }

  fn children(&self, interp: &mut Interpreter) -> Result<Vec<Node>, RenderError> {
    interp.materialize(self.get("children").clone())
  }

  fn list(&self, key: &str) -> &[Value] {
    match self.get(key) {
      Value::Array(items) => items.as_slice(),
      _ => &[],
    }
  }
}

impl Primitive {
  pub(crate) fn render(
    self,
    props: &Props<'_>,
    interp: &mut Interpreter,
  ) -> Result<Node, RenderError> {
    let node = match self {
      Self::Button => button(props, interp)?,
      Self::Card => card(props, interp)?,
      Self::Input => input(props),
      Self::Table => table(props, interp)?,
      Self::Modal => modal(props, interp)?,
      Self::Sidebar => sidebar(props, interp)?,
      Self::Navbar => navbar(props),
      Self::Chart => chart(props),
    };
    interp.spend(node.element_count() as u64)?;
    Ok(node)
  }
}

// ─── Button ──────────────────────────────────────────────────────────────────

fn button(props: &Props<'_>, interp: &mut Interpreter) -> Result<Node, RenderError> {
  let variant = match props.text("variant").as_deref() {
    Some("secondary") => "bg-gray-600 text-white hover:bg-gray-700",
    Some("outline") => "border border-gray-300 bg-transparent hover:bg-gray-50",
    Some("ghost") => "bg-transparent hover:bg-gray-100",
    _ => "bg-blue-600 text-white hover:bg-blue-700",
  };
  let size = match props.text("size").as_deref() {
    Some("sm") => "px-3 py-1.5 text-sm",
    Some("lg") => "px-6 py-3 text-lg",
    _ => "px-4 py-2 text-base",
  };
  let kind = match props.text("type").as_deref() {
    Some(kind @ ("submit" | "reset")) => kind.to_string(),
    _ => "button".to_string(),
  };
  let class = format!(
    "{variant} {size} rounded-lg font-medium transition-colors \
     disabled:opacity-50 disabled:cursor-not-allowed {}",
    props.text_or("className", "")
  );

  let mut el = Element::new("button").attr("type", kind).class(&class);
  if props.flag("disabled") {
    el = el.attr("disabled", "");
  }
  Ok(el.children(props.children(interp)?).into())
}

// ─── Card ────────────────────────────────────────────────────────────────────

fn card(props: &Props<'_>, interp: &mut Interpreter) -> Result<Node, RenderError> {
  let variant = match props.text("variant").as_deref() {
    Some("minimal") => "bg-gray-50 border-none",
    Some("bordered") => "bg-white border-2 border-gray-300",
    _ => "bg-white border border-gray-200",
  };
  let class = format!(
    "{variant} rounded-lg p-4 shadow-sm {}",
    props.text_or("className", "")
  );

  let mut el = Element::new("div").class(&class);
  if let Some(title) = props.text("title").filter(|t| !t.is_empty()) {
    el = el.child(
      Element::new("h3")
        .class("text-lg font-semibold mb-2 text-gray-900")
        .child(Node::text(title)),
    );
  }
  let body = Element::new("div")
    .class("text-gray-700")
    .children(props.children(interp)?);
  Ok(el.child(body).into())
}

// ─── Input ───────────────────────────────────────────────────────────────────

fn input(props: &Props<'_>) -> Node {
  let kind = match props.text("type").as_deref() {
    Some(
      kind @ ("text" | "email" | "password" | "number" | "search" | "tel" | "url"
      | "date"),
    ) => kind.to_string(),
    _ => "text".to_string(),
  };
  let class = format!(
    "w-full px-3 py-2 border border-gray-300 rounded-lg \
     focus:outline-none focus:ring-2 focus:ring-blue-500 {}",
    props.text_or("className", "")
  );

  let mut field = Element::new("input").attr("type", kind).class(&class);
  for key in ["name", "placeholder", "value"] {
    if let Some(value) = props.text(key) {
      field = field.attr(key, value);
    }
  }
  if props.flag("disabled") {
    field = field.attr("disabled", "");
  }

  let mut wrapper = Element::new("div").class("space-y-1");
  if let Some(label) = props.text("label") {
    wrapper = wrapper.child(
      Element::new("label")
        .class("block text-sm font-medium text-gray-700")
        .child(Node::text(label)),
    );
  }
  wrapper.child(field).into()
}

// ─── Table ───────────────────────────────────────────────────────────────────

fn table(props: &Props<'_>, interp: &mut Interpreter) -> Result<Node, RenderError> {
  let headers = match props.list("headers") {
    [] => props.list("columns"),
    headers => headers,
  };
  let head_row = Element::new("tr").class("bg-gray-50").children(
    headers.iter().map(|header| {
      Node::from(
        Element::new("th")
          .class("p-3 text-left text-sm font-medium text-gray-700")
          .child(Node::text(header.to_display())),
      )
    }),
  );

  let render_row = props.get("renderRow");
  let mut rows: Vec<Node> = Vec::new();
  for (i, item) in props.list("data").iter().enumerate() {
    let cells = match render_row {
      Value::Function(_) => {
        let drawn = interp.call(render_row, vec![item.clone(), Value::Number(i as f64)])?;
        interp.materialize(drawn)?
      }
      _ => default_cells(item, interp)?,
    };
    rows.push(
      Element::new("tr")
        .class("border-t border-gray-200 hover:bg-gray-50")
        .children(cells)
        .into(),
    );
  }

  Ok(
    Element::new("div")
      .class("overflow-x-auto")
      .child(
        Element::new("table")
          .class("w-full border-collapse")
          .child(Element::new("thead").child(head_row))
          .child(Element::new("tbody").children(rows)),
      )
      .into(),
  )
}

/// One cell per field when no `renderRow` is given.
fn default_cells(item: &Value, interp: &mut Interpreter) -> Result<Vec<Node>, RenderError> {
  let values: Vec<Value> = match item {
    Value::Object(fields) => fields.values().cloned().collect(),
    Value::Array(items) => items.to_vec(),
    other => vec![other.clone()],
  };
  values
    .into_iter()
    .map(|value| {
      Ok(Node::from(
        Element::new("td")
          .class("p-3 text-sm text-gray-700")
          .children(interp.materialize(value)?),
      ))
    })
    .collect()
}

// ─── Modal ───────────────────────────────────────────────────────────────────

fn modal(props: &Props<'_>, interp: &mut Interpreter) -> Result<Node, RenderError> {
  if !props.flag("isOpen") {
    return Ok(Node::empty());
  }
  let mut header = Element::new("div").class("flex justify-between items-center mb-4");
  if let Some(title) = props.text("title") {
    header = header.child(
      Element::new("h2")
        .class("text-lg font-semibold text-gray-900")
        .child(Node::text(title)),
    );
  }
  header = header.child(
    Element::new("button")
      .attr("type", "button")
      .attr("aria-label", "Close")
      .class("text-gray-400 hover:text-gray-600")
      .child(Node::text("\u{d7}")),
  );

  let panel = Element::new("div")
    .class("bg-white rounded-lg shadow-xl max-w-md w-full p-6")
    .child(header)
    .child(Element::new("div").children(props.children(interp)?));
  Ok(
    Element::new("div")
      .class("fixed inset-0 bg-black/50 flex items-center justify-center z-50")
      .child(panel)
      .into(),
  )
}

// ─── Sidebar ─────────────────────────────────────────────────────────────────

fn sidebar(props: &Props<'_>, interp: &mut Interpreter) -> Result<Node, RenderError> {
  let mut inner = Element::new("div").class("p-4");
  if props.flag_or("collapsible", true) {
    inner = inner.child(
      Element::new("button")
        .attr("type", "button")
        .class("mb-4 p-2 hover:bg-gray-100 rounded-lg")
        .child(Node::text("\u{2190}")),
    );
  }
  inner = inner.child(
    Element::new("div")
      .class("block")
      .children(props.children(interp)?),
  );
  Ok(
    Element::new("div")
      .class("bg-white border-r border-gray-200 h-full transition-all duration-300 w-64")
      .child(inner)
      .into(),
  )
}

// ─── Navbar ──────────────────────────────────────────────────────────────────

fn navbar(props: &Props<'_>) -> Node {
  let brand = Element::new("div")
    .class("flex items-center space-x-4")
    .child(
      Element::new("h1")
        .class("text-xl font-semibold text-gray-900")
        .child(Node::text(props.text_or("title", ""))),
    )
    .child(
      Element::new("span")
        .class("px-2 py-1 bg-blue-100 text-blue-800 text-xs rounded-full")
        .child(Node::text("Fixed Components")),
    );

  let mut bar = Element::new("div")
    .class("flex items-center justify-between")
    .child(brand);
  let history = props.list("history");
  if !history.is_empty() {
    bar = bar.child(
      Element::new("div").class("relative").child(
        Element::new("button")
          .attr("type", "button")
          .class("px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50")
          .child(Node::text(format!("History ({})", history.len()))),
      ),
    );
  }

  Element::new("nav")
    .class("bg-white border-b border-gray-200 px-6 py-3")
    .child(bar)
    .into()
}

// ─── Chart ───────────────────────────────────────────────────────────────────

fn chart(props: &Props<'_>) -> Node {
  let kind = match props.text("type").as_deref() {
    Some("bar") => "bar",
    Some("pie") => "pie",
    _ => "line",
  };
  let data: Vec<f64> = match props.list("data") {
    [] => match kind {
      "bar" => vec![60.0, 45.0, 75.0, 50.0, 85.0, 40.0, 70.0],
      "pie" => vec![30.0, 25.0, 20.0, 15.0, 10.0],
      _ => vec![40.0, 65.0, 45.0, 70.0, 55.0, 80.0, 62.0],
    },
    items => items.iter().map(Value::to_number).collect(),
  };
  let (color, caption) = match kind {
    "bar" => ("bg-green-500", "Bar chart comparing values"),
    "pie" => ("bg-purple-500", "Pie chart showing distribution"),
    _ => ("bg-blue-500", "Line chart showing trend over time"),
  };
  let title = props
    .text("title")
    .filter(|t| !t.is_empty())
    .unwrap_or_else(|| format!("{}{} Chart", kind[..1].to_uppercase(), &kind[1..]));

  let bars = data.iter().enumerate().map(|(i, value)| {
    let label = if kind == "pie" {
      format!("Cat {}", i + 1)
    } else {
      format!("Wk {}", i + 1)
    };
    // Heights are percentages; a class per decile keeps styling in Tailwind.
    let decile = (value.clamp(0.0, 100.0) / 10.0).round() as u32 * 10;
    Node::from(
      Element::new("div")
        .class("flex flex-col items-center w-full max-w-[40px]")
        .attr("data-value", format_number(*value))
        .child(Element::new("div").class(&format!(
          "w-8 {color} h-[{decile}%] rounded-t transition-all duration-300 hover:opacity-80"
        )))
        .child(
          Element::new("span")
            .class("text-xs mt-1 text-gray-600")
            .child(Node::text(label)),
        ),
    )
  });

  Element::new("div")
    .class("w-full h-64 bg-gray-50 rounded-lg p-4")
    .child(
      Element::new("div")
        .class("flex justify-between items-center mb-2")
        .child(
          Element::new("h4")
            .class("text-sm font-medium text-gray-700")
            .child(Node::text(title)),
        )
        .child(
          Element::new("span")
            .class("text-xs px-2 py-1 bg-gray-200 rounded-full text-gray-600")
            .child(Node::text(kind)),
        ),
    )
    .child(
      Element::new("div").class("relative h-48 w-full").child(
        Element::new("div")
          .class("absolute inset-0 flex items-end justify-around")
          .children(bars),
      ),
    )
    .child(
      Element::new("div")
        .class("mt-2 text-xs text-gray-500 text-center")
        .child(Node::text(format!("\u{2022} {caption}"))),
    )
    .into()
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;
  use crate::sandbox::Limits;

  fn draw(primitive: Primitive, props: Object) -> String {
    let mut interp = Interpreter::new(Limits::default());
    primitive
      .render(&Props(&props), &mut interp)
      .unwrap()
      .to_html()
  }

  fn props(entries: &[(&str, Value)]) -> Object {
    entries
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .collect()
  }

  #[test]
  fn names_round_trip_through_strum() {
    let names: Vec<&'static str> = Primitive::iter().map(Into::into).collect();
    assert_eq!(names, [
      "Button", "Card", "Input", "Table", "Modal", "Sidebar", "Navbar", "Chart"
    ]);
    assert_eq!(Primitive::from_str("Chart").ok(), Some(Primitive::Chart));
    assert!(Primitive::from_str("Styled").is_err());
  }

  #[test]
  fn button_uses_variant_and_escapes_children() {
    let html = draw(
      Primitive::Button,
      props(&[
        ("variant", Value::str("outline")),
        ("children", Value::str("<b>Go</b>")),
      ]),
    );
    assert!(html.starts_with("<button type=\"button\" class=\"border border-gray-300"));
    assert!(html.contains("&lt;b&gt;Go&lt;/b&gt;</button>"));
  }

  #[test]
  fn card_title_is_optional() {
    let with = draw(Primitive::Card, props(&[("title", Value::str("Stats"))]));
    assert!(with.contains("<h3 class=\"text-lg font-semibold mb-2 text-gray-900\">Stats</h3>"));
    let without = draw(Primitive::Card, Object::new());
    assert!(!without.contains("<h3"));
  }

  #[test]
  fn closed_modal_draws_nothing() {
    assert_eq!(draw(Primitive::Modal, Object::new()), "");
    let open = draw(
      Primitive::Modal,
      props(&[("isOpen", Value::Bool(true)), ("title", Value::str("Confirm"))]),
    );
    assert!(open.contains("Confirm"));
  }

  #[test]
  fn table_without_render_row_draws_fields() {
    let row: Object = props(&[("name", Value::str("Ada")), ("age", Value::Number(36.0))]);
    let html = draw(
      Primitive::Table,
      props(&[
        ("headers", Value::array(vec![Value::str("Name"), Value::str("Age")])),
        ("data", Value::array(vec![Value::object(row)])),
      ]),
    );
    assert!(html.contains(">Name</th>"));
    assert!(html.contains(">Ada</td>"));
    assert!(html.contains(">36</td>"));
  }

  #[test]
  fn chart_defaults_follow_type() {
    let html = draw(Primitive::Chart, props(&[("type", Value::str("pie"))]));
    assert!(html.contains("Pie Chart"));
    assert!(html.contains("Cat 5"));
    assert!(!html.contains("Cat 6"));
    assert!(html.contains("bg-purple-500"));
  }

  #[test]
  fn input_ignores_unknown_types() {
    let html = draw(Primitive::Input, props(&[("type", Value::str("file"))]));
    assert!(html.contains("<input type=\"text\""));
  }

  #[test]
  fn navbar_counts_history() {
    let html = draw(
      Primitive::Navbar,
      props(&[
        ("title", Value::str("Admin")),
        ("history", Value::array(vec![Value::Null, Value::Null])),
      ]),
    );
    assert!(html.contains("History (2)"));
  }
}
