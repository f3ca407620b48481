use pretty_assertions::assert_eq;

use super::*;

fn compile(src: &str) -> Definition { forge_markup::transform(src).unwrap() }

fn draw_with(src: &str, limits: Limits) -> Result<RenderedOutput, RenderError> {
  let component = instantiate(&compile(src), SandboxBinding::new(), limits).unwrap();
  render(component)
}

fn html(src: &str) -> String { draw_with(src, Limits::default()).unwrap().html }

fn render_err(src: &str) -> RenderError { draw_with(src, Limits::default()).unwrap_err() }

#[test]
fn lists_render_through_map() {
  let out = draw_with(
    r#"
    function GeneratedUI() {
      const items = ['a', 'b'];
      return (
        <ul className="list">
          {items.map((item, i) => <li key={i}>{item.toUpperCase()}</li>)}
        </ul>
      );
    }
    "#,
    Limits::default(),
  )
  .unwrap();
  assert_eq!(out.html, "<ul class=\"list\"><li>A</li><li>B</li></ul>");
  assert_eq!(out.element_count, 3);
}

#[test]
fn handlers_and_false_attributes_are_dropped() {
  let out = html(
    r#"function GeneratedUI() {
      return <div onClick={() => 1} id={3} hidden={false} title="t" />;
    }"#,
  );
  assert_eq!(out, "<div id=\"3\" title=\"t\"></div>");
}

#[test]
fn text_and_attributes_are_escaped() {
  let out = html(
    r#"function GeneratedUI() {
      const name = '<img src=x onerror="alert(1)">';
      return <p title={name}>{name}</p>;
    }"#,
  );
  assert!(!out.contains("<img"), "{out}");
  assert!(out.contains("title=\"&lt;img src=x onerror=&quot;alert(1)&quot;&gt;\""));
  assert!(out.contains(">&lt;img src=x onerror=\"alert(1)\"&gt;</p>"));
}

#[test]
fn hooks_draw_a_static_snapshot() {
  let out = html(
    r#"
    import React, { useState, useMemo, useEffect } from 'react';
    function GeneratedUI() {
      const [count, setCount] = useState(() => 2);
      const doubled = useMemo(() => count * 2, [count]);
      useEffect(() => { setCount(5); }, []);
      const [open] = React.useState(false);
      return <span>{count}:{doubled}{open && <b>open</b>}</span>;
    }
    "#,
  );
  assert_eq!(out, "<span>2:4</span>");
}

#[test]
fn local_components_receive_props_and_children() {
  let out = html(
    r#"
    function Badge({ label, tone = 'gray', children }) {
      return <span className={`badge badge-${tone}`}>{label}{children}</span>;
    }
    function GeneratedUI() {
      return <Badge label="New">!</Badge>;
    }
    "#,
  );
  assert_eq!(out, "<span class=\"badge badge-gray\">New!</span>");
}

#[test]
fn primitives_render_inside_descriptions() {
  let out = html(
    r#"
    const GeneratedUI = () => (
      <Card title="Stats">
        <Table
          headers={['Name']}
          data={[{ name: 'Ada' }, { name: 'Grace' }]}
          renderRow={(row) => <td>{row.name}</td>}
        />
        <Button variant="primary">Go</Button>
      </Card>
    );
    "#,
  );
  assert!(out.contains("Stats"));
  assert!(out.contains("<td>Ada</td>"));
  assert!(out.contains("<td>Grace</td>"));
  assert!(out.contains(">Go</button>"));
}

#[test]
fn fragments_flatten() {
  let out = html(
    r#"function GeneratedUI() {
      return <><p>a</p><React.Fragment><p>b</p></React.Fragment></>;
    }"#,
  );
  assert_eq!(out, "<p>a</p><p>b</p>");
}

#[test]
fn conditionals_and_nullish_children() {
  let out = html(
    r#"function GeneratedUI() {
      const show = false;
      const user = null;
      return <p>{show && <b>x</b>}{show ? 'yes' : 'no'}{user?.name ?? 'anon'}{undefined}</p>;
    }"#,
  );
  assert_eq!(out, "<p>noanon</p>");
}

#[test]
fn unbounded_recursion_hits_the_depth_limit() {
  let err = render_err(
    r#"
    function Loop(n) { return Loop(n + 1); }
    function GeneratedUI() { return <p>{Loop(0)}</p>; }
    "#,
  );
  assert_eq!(err, RenderError::CallDepthExceeded { limit: 64 });
}

#[test]
fn runaway_work_exhausts_fuel() {
  let limits = Limits {
    fuel: 1_000,
    ..Limits::default()
  };
  let err = draw_with(
    r#"
    function GeneratedUI() {
      const xs = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
      return <p>{xs.map(() => xs.map(() => xs.map(() => 1)))}</p>;
    }
    "#,
    limits,
  )
  .unwrap_err();
  assert_eq!(err, RenderError::FuelExhausted { limit: 1_000 });
}

#[test]
fn runtime_type_errors_name_the_callee() {
  let err = render_err("function GeneratedUI() { const o = {}; o.go(); return null; }");
  assert_eq!(err, RenderError::Type("o.go is not a function".into()));

  let err = render_err("function GeneratedUI() { const o = null; return <p>{o.name}</p>; }");
  assert!(matches!(err, RenderError::Type(ref msg) if msg.contains("reading 'name'")));
}

#[test]
fn plain_objects_are_not_valid_children() {
  let err = render_err("function GeneratedUI() { return <p>{{ a: 1 }}</p>; }");
  assert_eq!(err, RenderError::InvalidChild("object"));
}

#[test]
fn instantiation_rejects_unbound_names_before_running() {
  let def = compile("function GeneratedUI() { fetch('/api'); return null; }");
  let err = instantiate(&def, SandboxBinding::new(), Limits::default())
    .err()
    .unwrap();
  assert_eq!(err, InstantiationError::Unbound {
    name: "fetch".into(),
  });
}

#[test]
fn module_scope_failures_surface_at_instantiation() {
  let def = compile(
    "const config = null;\nconst title = config.title;\nfunction GeneratedUI() { return null; }",
  );
  let err = instantiate(&def, SandboxBinding::new(), Limits::default())
    .err()
    .unwrap();
  assert!(matches!(err, InstantiationError::Module(RenderError::Type(_))));
}

#[test]
fn non_function_entries_are_not_callable() {
  let def = compile("const Config = 5;\nexport default Config;");
  let err = instantiate(&def, SandboxBinding::new(), Limits::default())
    .err()
    .unwrap();
  assert_eq!(err, InstantiationError::NotCallable {
    entry: "Config".into(),
  });
}

#[test]
fn component_reports_its_entry_name() {
  let def = compile("export default function Dashboard() { return <p>hi</p>; }");
  let component = instantiate(&def, SandboxBinding::new(), Limits::default()).unwrap();
  assert_eq!(component.name(), "Dashboard");
  assert_eq!(render(component).unwrap().html, "<p>hi</p>");
}

#[test]
fn dropping_the_interpreter_releases_closure_scopes() {
  let def = compile("function Helper() { return 1; }\nfunction GeneratedUI() { return Helper(); }");
  let mut interp = Interpreter::new(Limits::default());
  let module = interp.load_module(&def, SandboxBinding::new()).unwrap();
  assert!(module.lookup("Helper").is_some());
  drop(interp);
  assert!(module.lookup("Helper").is_none());
}

#[test]
fn nesting_across_recursive_calls_is_bounded_on_a_small_stack() {
  let src = format!(
    "function F({{ n }}) {{ return n > 0 ? {}<F n={{n - 1}} />{} : 'leaf'; }}\n\
     export default function GeneratedUI() {{ return <F n={{60}} />; }}",
    "[".repeat(40),
    "]".repeat(40),
  );
  let err = std::thread::Builder::new()
    .stack_size(2 << 20)
    .spawn(move || draw_with(&src, Limits::default()).unwrap_err())
    .unwrap()
    .join()
    .unwrap();
  assert_eq!(err, RenderError::NestingTooDeep { limit: 192 });
}

#[test]
fn values_nested_past_the_limit_are_rejected() {
  let src = format!(
    "function GeneratedUI() {{\n\
       const xs = '{}'.split('');\n\
       return <p>{{xs.reduce((acc) => [acc], 0).length}}</p>;\n\
     }}",
    "a".repeat(300),
  );
  assert_eq!(render_err(&src), RenderError::NestingTooDeep { limit: 192 });
}

/// A component that doubles `s0` with `step` `count` times and prints the
/// length of the result.
fn doubling(seed: &str, step: &str, count: usize, result: &str) -> String {
  let mut src = format!("function GeneratedUI() {{\n  const s0 = {seed};\n");
  for i in 1..=count {
    let line = step.replace("PREV", &format!("s{}", i - 1));
    src.push_str(&format!("  const s{i} = {line};\n"));
  }
  src.push_str(&format!("  return <p>{}</p>;\n}}", result.replace("LAST", &format!("s{count}"))));
  src
}

#[test]
fn doubling_strings_stops_at_the_output_limit() {
  let src = doubling("'abcdefgh'", "PREV + PREV", 24, "{LAST.length}");
  assert_eq!(render_err(&src), RenderError::OutputTooLarge { limit: 1 << 20 });

  let src = doubling("'abcdefgh'", "`${PREV}${PREV}`", 24, "{LAST.length}");
  assert_eq!(render_err(&src), RenderError::OutputTooLarge { limit: 1 << 20 });
}

#[test]
fn doubling_elements_stops_at_the_element_limit() {
  let src = doubling("<b>x</b>", "[PREV, PREV]", 20, "{LAST}");
  assert_eq!(render_err(&src), RenderError::TooManyElements { limit: 10_000 });

  let src = doubling("<b>x</b>", "<div>{PREV}{PREV}</div>", 20, "{LAST}");
  assert_eq!(render_err(&src), RenderError::TooManyElements { limit: 10_000 });
}

#[test]
fn building_large_strings_costs_fuel_by_size() {
  let src = doubling("'abcdefgh'", "PREV + PREV", 14, "{LAST.length}");
  assert_eq!(html(&src), "<p>131072</p>");

  let limits = Limits {
    fuel: 2_000,
    ..Limits::default()
  };
  let err = draw_with(&src, limits).unwrap_err();
  assert_eq!(err, RenderError::FuelExhausted { limit: 2_000 });
}

#[test]
fn escaped_output_is_held_to_the_byte_limit() {
  let limits = Limits {
    max_output_bytes: 1_000,
    ..Limits::default()
  };
  let src = format!("function GeneratedUI() {{ return <p>{}</p>; }}", "&lt;".repeat(300));
  let err = draw_with(&src, limits).unwrap_err();
  assert_eq!(err, RenderError::OutputTooLarge { limit: 1_000 });
}
