//! Methods on arrays, strings and numbers.
//!
//! Only non-mutating methods exist; values in the sandbox are immutable.
//! A method pays for walking its receiver up front and for the size of
//! what it returns afterwards.

use super::{
  interp::Interpreter,
  value::{Measured, Value, format_number, join},
};
use crate::error::RenderError;

type Result<T, E = RenderError> = std::result::Result<T, E>;

impl Interpreter {
  pub(crate) fn call_builtin(
    &mut self,
    receiver: &Value,
    method: &str,
    args: Vec<Value>,
  ) -> Result<Value> {
    let result = match receiver {
      Value::Array(items) => {
        self.spend(items.len() as u64)?;
        self.array_method(items, method, args)?
      }
      Value::Str(s) => {
        self.spend_bytes(s.len())?;
        if method == "split" {
          self.spend(split_count(s, args.first()) as u64)?;
        }
        string_method(s, method, &args)?
      }
      Value::Number(n) => number_method(*n, method, &args)?,
      other => return Err(not_a_function(other.type_of(), method)),
    };
    match &result {
      Value::Str(s) => self.spend_bytes(s.len())?,
      Value::Array(items) => self.spend(items.len() as u64)?,
      _ => {}
    }
    self.admit(result)
  }

  fn array_method(
    &mut self,
    items: &Measured<Vec<Value>>,
    method: &str,
    args: Vec<Value>,
  ) -> Result<Value> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
    let callback = arg(0);

    Ok(match method {
      "map" => {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
          out.push(self.call(&callback, vec![item.clone(), Value::Number(i as f64)])?);
        }
        Value::array(out)
      }
      "filter" => {
        let mut out = Vec::new();
        for (i, item) in items.iter().enumerate() {
          if self.test(&callback, item, i)? {
            out.push(item.clone());
          }
        }
        Value::array(out)
      }
      "forEach" => {
        for (i, item) in items.iter().enumerate() {
          self.call(&callback, vec![item.clone(), Value::Number(i as f64)])?;
        }
        Value::Undefined
      }
      "find" | "findIndex" => {
        let mut found = None;
        for (i, item) in items.iter().enumerate() {
          if self.test(&callback, item, i)? {
            found = Some(i);
            break;
          }
        }
        match (method, found) {
          ("find", Some(i)) => items[i].clone(),
          ("find", None) => Value::Undefined,
          (_, Some(i)) => Value::Number(i as f64),
          (_, None) => Value::Number(-1.0),
        }
      }
      "some" => {
        let mut any = false;
        for (i, item) in items.iter().enumerate() {
          if self.test(&callback, item, i)? {
            any = true;
            break;
          }
        }
        Value::Bool(any)
      }
      "every" => {
        let mut all = true;
        for (i, item) in items.iter().enumerate() {
          if !self.test(&callback, item, i)? {
            all = false;
            break;
          }
        }
        Value::Bool(all)
      }
      "reduce" => {
        let mut entries = items.iter().enumerate();
        let mut acc = match args.get(1) {
          Some(initial) => initial.clone(),
          None => match entries.next() {
            Some((_, first)) => first.clone(),
            None => {
              return Err(RenderError::Type(
                "reduce of empty array with no initial value".to_string(),
              ));
            }
          },
        };
        for (i, item) in entries {
          acc = self.call(&callback, vec![acc, item.clone(), Value::Number(i as f64)])?;
        }
        acc
      }
      "join" => {
        let separator = match arg(0) {
          Value::Undefined => ",".to_string(),
          other => other.to_display(),
        };
        let gaps = items.len().saturating_sub(1);
        self.fits(
          items
            .extent()
            .bytes
            .saturating_add(separator.len().saturating_mul(gaps)),
        )?;
        Value::str(&join(items, &separator))
      }
      "slice" => {
        let (start, end) = bounds(items.len(), &arg(0), &arg(1));
        Value::array(items[start..end.max(start)].to_vec())
      }
      "includes" => Value::Bool(items.iter().any(|item| same_value_zero(item, &callback))),
      "indexOf" => Value::Number(
        items
          .iter()
          .position(|item| item.strict_eq(&callback))
          .map_or(-1.0, |i| i as f64),
      ),
      "concat" => {
        let added = args.iter().map(|arg| match arg {
          Value::Array(more) => more.len(),
          _ => 1,
        });
        self.spend(added.sum::<usize>() as u64)?;
        let mut out = items.to_vec();
        for arg in args {
          match arg {
            Value::Array(more) => out.extend(more.iter().cloned()),
            other => out.push(other),
          }
        }
        Value::array(out)
      }
      "toString" => Value::str(&join(items, ",")),
      _ => return Err(not_a_function("array", method)),
    })
  }

  fn test(&mut self, predicate: &Value, item: &Value, index: usize) -> Result<bool> {
    Ok(
      self
        .call(predicate, vec![item.clone(), Value::Number(index as f64)])?
        .truthy(),
    )
  }
}

/// Number of parts `split` will produce, so they are paid for before any
/// is allocated.
fn split_count(s: &str, separator: Option<&Value>) -> usize {
  match separator {
    None | Some(Value::Undefined) => 1,
    Some(separator) => {
      let separator = separator.to_display();
      if separator.is_empty() {
        s.chars().count()
      } else {
        s.matches(separator.as_str()).count() + 1
      }
    }
  }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Result<Value> {
  let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
  let needle = || arg(0).to_display();

  Ok(match method {
    "toUpperCase" => Value::str(&s.to_uppercase()),
    "toLowerCase" => Value::str(&s.to_lowercase()),
    "trim" => Value::str(s.trim()),
    "toString" => Value::str(s),
    "includes" => Value::Bool(s.contains(&needle())),
    "startsWith" => Value::Bool(s.starts_with(&needle())),
    "endsWith" => Value::Bool(s.ends_with(&needle())),
    "charAt" => {
      let index = arg(0).to_number();
      let index = if index.is_nan() { 0.0 } else { index };
      let c = (index >= 0.0)
        .then(|| s.chars().nth(index as usize))
        .flatten()
        .map(String::from)
        .unwrap_or_default();
      Value::str(&c)
    }
    "slice" => {
      let chars: Vec<char> = s.chars().collect();
      let (start, end) = bounds(chars.len(), &arg(0), &arg(1));
      Value::str(&chars[start..end.max(start)].iter().collect::<String>())
    }
    "split" => {
      let parts: Vec<Value> = match arg(0) {
        Value::Undefined => vec![Value::str(s)],
        separator => {
          let separator = separator.to_display();
          if separator.is_empty() {
            s.chars().map(|c| Value::str(&c.to_string())).collect()
          } else {
            s.split(separator.as_str()).map(Value::str).collect()
          }
        }
      };
      Value::array(parts)
    }
    _ => return Err(not_a_function("string", method)),
  })
}

fn number_method(n: f64, method: &str, args: &[Value]) -> Result<Value> {
  let digits = args.first().map(Value::to_number).unwrap_or(0.0);
  Ok(match method {
    "toString" => Value::str(&format_number(n)),
    "toFixed" => {
      if !(0.0..=100.0).contains(&digits) {
        return Err(RenderError::Type(
          "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
      }
      if n.is_finite() {
        Value::str(&format!("{:.*}", digits as usize, n))
      } else {
        Value::str(&format_number(n))
      }
    }
    "toLocaleString" => Value::str(&locale_number(n)),
    _ => return Err(not_a_function("number", method)),
  })
}

/// Grouped thousands with at most three fraction digits, as `en-US` prints.
fn locale_number(n: f64) -> String {
  if !n.is_finite() || n.abs() >= 1e21 {
    return format_number(n);
  }
  let rounded = (n * 1000.0).round() / 1000.0;
  let digits = format_number(rounded.abs());
  let (whole, fraction) = match digits.split_once('.') {
    Some((whole, fraction)) => (whole, Some(fraction)),
    None => (digits.as_str(), None),
  };

  let mut out = String::new();
  if rounded < 0.0 {
    out.push('-');
  }
  for (i, c) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  if let Some(fraction) = fraction {
    out.push('.');
    out.push_str(fraction);
  }
  out
}

/// Resolve `slice(start, end)` arguments against a length. Negative values
/// count from the end.
fn bounds(len: usize, start: &Value, end: &Value) -> (usize, usize) {
  let resolve = |value: &Value, default: usize| -> usize {
    if matches!(value, Value::Undefined) {
      return default;
    }
    let n = value.to_number();
    if n.is_nan() {
      0
    } else if n < 0.0 {
      len.saturating_sub((-n) as usize)
    } else {
      (n as usize).min(len)
    }
  };
  (resolve(start, 0), resolve(end, len))
}

fn same_value_zero(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
    _ => a.strict_eq(b),
  }
}

fn not_a_function(receiver: &str, method: &str) -> RenderError {
  RenderError::Type(format!("{receiver}.{method} is not a function"))
}
