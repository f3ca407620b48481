//! Tokeniser for the expression half of the description language.
//!
//! JSX text and tags are not tokenised; the parser reads them with the raw
//! character helpers at the bottom of this file and switches back to tokens
//! inside `{…}` containers.

use crate::error::{Error, Position, Result};

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
  Ident(String),
  Number(f64),
  Str(String),
  Template(Vec<RawPart>),
  Punct(Punct),
  Eof,
}

/// A piece of a template literal. Embedded expressions are kept as byte
/// ranges into the full source and parsed by a sub-parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawPart {
  Text(String),
  Expr { start: usize, end: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Punct {
  LParen,
  RParen,
  LBrace,
  RBrace,
  LBracket,
  RBracket,
  Comma,
  Semi,
  Colon,
  Dot,
  Ellipsis,
  Question,
  QuestionDot,
  Nullish,
  Arrow,
  Assign,
  /// `+=`, `++` and friends. Always rejected by the parser.
  Mutate,
  Eq,
  StrictEq,
  NotEq,
  StrictNotEq,
  Lt,
  Gt,
  LtEq,
  GtEq,
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Bang,
  AndAnd,
  OrOr,
}

/// Longest spellings first so `===` wins over `==` and `=`.
const PUNCTS: &[(&str, Punct)] = &[
  ("===", Punct::StrictEq),
  ("!==", Punct::StrictNotEq),
  ("...", Punct::Ellipsis),
  ("&&=", Punct::Mutate),
  ("||=", Punct::Mutate),
  ("??=", Punct::Mutate),
  ("=>", Punct::Arrow),
  ("==", Punct::Eq),
  ("!=", Punct::NotEq),
  ("<=", Punct::LtEq),
  (">=", Punct::GtEq),
  ("&&", Punct::AndAnd),
  ("||", Punct::OrOr),
  ("??", Punct::Nullish),
  ("?.", Punct::QuestionDot),
  ("++", Punct::Mutate),
  ("--", Punct::Mutate),
  ("+=", Punct::Mutate),
  ("-=", Punct::Mutate),
  ("*=", Punct::Mutate),
  ("/=", Punct::Mutate),
  ("%=", Punct::Mutate),
  ("(", Punct::LParen),
  (")", Punct::RParen),
  ("{", Punct::LBrace),
  ("}", Punct::RBrace),
  ("[", Punct::LBracket),
  ("]", Punct::RBracket),
  (",", Punct::Comma),
  (";", Punct::Semi),
  (":", Punct::Colon),
  (".", Punct::Dot),
  ("?", Punct::Question),
  ("=", Punct::Assign),
  ("<", Punct::Lt),
  (">", Punct::Gt),
  ("+", Punct::Plus),
  ("-", Punct::Minus),
  ("*", Punct::Star),
  ("/", Punct::Slash),
  ("%", Punct::Percent),
  ("!", Punct::Bang),
];

impl Punct {
  pub(crate) fn as_str(self) -> &'static str {
    PUNCTS
      .iter()
      .find(|(_, p)| *p == self)
      .map(|(s, _)| *s)
      .unwrap_or("?")
  }
}

pub(crate) fn describe(token: &Token) -> String {
  match token {
    Token::Ident(name) => format!("`{name}`"),
    Token::Number(n) => format!("number `{n}`"),
    Token::Str(_) => "string literal".to_string(),
    Token::Template(_) => "template literal".to_string(),
    Token::Punct(p) => format!("`{}`", p.as_str()),
    Token::Eof => "end of input".to_string(),
  }
}

// ─── Lexer ───────────────────────────────────────────────────────────────────

/// A cursor over `src[pos..end]`. Copying a lexer is how the parser looks
/// ahead without consuming input.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lexer<'a> {
  src:            &'a str,
  pub(crate) pos: usize,
  end:            usize,
}

impl<'a> Lexer<'a> {
  pub(crate) fn new(src: &'a str) -> Self {
    Self {
      src,
      pos: 0,
      end: src.len(),
    }
  }

  /// A lexer restricted to `src[start..end]`. Positions stay relative to the
  /// full source so diagnostics point at the right line.
  pub(crate) fn range(src: &'a str, start: usize, end: usize) -> Self {
    Self {
      src,
      pos: start,
      end,
    }
  }

  pub(crate) fn source(&self) -> &'a str { self.src }

  pub(crate) fn position(&self, offset: usize) -> Position {
    Position::locate(self.src, offset)
  }

  pub(crate) fn rest(&self) -> &'a str { &self.src[self.pos..self.end] }

  pub(crate) fn peek_char(&self) -> Option<char> { self.rest().chars().next() }

  pub(crate) fn bump_char(&mut self) -> Option<char> {
    let c = self.peek_char()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  pub(crate) fn eat(&mut self, s: &str) -> bool {
    if self.rest().starts_with(s) {
      self.pos += s.len();
      true
    } else {
      false
    }
  }

  /// Skip whitespace, `// line` and `/* block */` comments.
  pub(crate) fn skip_trivia(&mut self) -> Result<()> {
    loop {
      let rest = self.rest();
      let trimmed = rest.trim_start();
      self.pos += rest.len() - trimmed.len();

      if self.rest().starts_with("//") {
        let line_len = self.rest().find('\n').unwrap_or(self.rest().len());
        self.pos += line_len;
      } else if self.rest().starts_with("/*") {
        let start = self.pos;
        match self.rest()[2..].find("*/") {
          Some(i) => self.pos += i + 4,
          None => {
            return Err(Error::Unterminated {
              what: "comment",
              at:   self.position(start),
            });
          }
        }
      } else {
        return Ok(());
      }
    }
  }

  /// Lex the next token, returning it with its start offset.
  pub(crate) fn next_token(&mut self) -> Result<(Token, usize)> {
    self.skip_trivia()?;
    let start = self.pos;
    let Some(c) = self.peek_char() else {
      return Ok((Token::Eof, start));
    };

    let token = match c {
      '"' | '\'' => Token::Str(self.lex_string(c)?),
      '`' => Token::Template(self.lex_template()?),
      c if c.is_ascii_digit() => Token::Number(self.lex_number()?),
      '.' if self.rest()[1..].starts_with(|d: char| d.is_ascii_digit()) => {
        Token::Number(self.lex_number()?)
      }
      c if is_ident_start(c) => Token::Ident(self.lex_ident()),
      _ => Token::Punct(self.lex_punct()?),
    };
    Ok((token, start))
  }

  fn lex_ident(&mut self) -> String {
    let start = self.pos;
    while let Some(c) = self.peek_char() {
      if is_ident_continue(c) {
        self.bump_char();
      } else {
        break;
      }
    }
    self.src[start..self.pos].to_string()
  }

  fn lex_number(&mut self) -> Result<f64> {
    let start = self.pos;
    let rest = self.rest();
    if rest.starts_with("0x") || rest.starts_with("0X") {
      self.pos += 2;
      let digits_start = self.pos;
      while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
        self.pos += 1;
      }
      let digits = self.src[digits_start..self.pos].replace('_', "");
      return u64::from_str_radix(&digits, 16)
        .map(|n| n as f64)
        .map_err(|_| self.syntax(start, "malformed hexadecimal literal"));
    }

    let mut seen_dot = false;
    let mut seen_exp = false;
    while let Some(c) = self.peek_char() {
      match c {
        '0'..='9' | '_' => self.pos += 1,
        '.' if !seen_dot && !seen_exp => {
          seen_dot = true;
          self.pos += 1;
        }
        'e' | 'E' if !seen_exp => {
          seen_exp = true;
          self.pos += 1;
          if matches!(self.peek_char(), Some('+' | '-')) {
            self.pos += 1;
          }
        }
        _ => break,
      }
    }
    let text = self.src[start..self.pos].replace('_', "");
    text
      .parse::<f64>()
      .map_err(|_| self.syntax(start, "malformed number literal"))
  }

  fn lex_string(&mut self, quote: char) -> Result<String> {
    let start = self.pos;
    self.bump_char();
    let mut out = String::new();
    loop {
      match self.bump_char() {
        None | Some('\n') => {
          return Err(Error::Unterminated {
            what: "string literal",
            at:   self.position(start),
          });
        }
        Some(c) if c == quote => return Ok(out),
        Some('\\') => self.lex_escape(&mut out, start)?,
        Some(c) => out.push(c),
      }
    }
  }

  fn lex_escape(&mut self, out: &mut String, start: usize) -> Result<()> {
    let Some(c) = self.bump_char() else {
      return Err(Error::Unterminated {
        what: "string literal",
        at:   self.position(start),
      });
    };
    match c {
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      '0' => out.push('\0'),
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'v' => out.push('\u{b}'),
      // Line continuation.
      '\n' => {}
      'x' => {
        let hex = self.take(2);
        out.push(self.code_point(&hex, start)?);
      }
      'u' => {
        let hex = if self.eat("{") {
          let len = self.rest().find('}').unwrap_or(self.rest().len());
          let hex = self.take(len);
          self.eat("}");
          hex
        } else {
          self.take(4)
        };
        out.push(self.code_point(&hex, start)?);
      }
      other => out.push(other),
    }
    Ok(())
  }

  fn take(&mut self, n: usize) -> String {
    let taken: String = self.rest().chars().take(n).collect();
    self.pos += taken.len();
    taken
  }

  fn code_point(&self, hex: &str, start: usize) -> Result<char> {
    u32::from_str_radix(hex, 16)
      .ok()
      .and_then(char::from_u32)
      .ok_or_else(|| self.syntax(start, "malformed escape sequence"))
  }

  fn lex_template(&mut self) -> Result<Vec<RawPart>> {
    let start = self.pos;
    self.bump_char();
    let mut parts = Vec::new();
    let mut text = String::new();
    loop {
      if self.eat("${") {
        if !text.is_empty() {
          parts.push(RawPart::Text(std::mem::take(&mut text)));
        }
        let expr_start = self.pos;
        let expr_end = self.skip_to_closing_brace(start)?;
        parts.push(RawPart::Expr {
          start: expr_start,
          end:   expr_end,
        });
        continue;
      }
      match self.bump_char() {
        None => {
          return Err(Error::Unterminated {
            what: "template literal",
            at:   self.position(start),
          });
        }
        Some('`') => break,
        Some('\\') => self.lex_escape(&mut text, start)?,
        Some(c) => text.push(c),
      }
    }
    if !text.is_empty() {
      parts.push(RawPart::Text(text));
    }
    Ok(parts)
  }

  /// Advance past the `}` that closes a `${` and return the offset of that
  /// `}`. Nested braces, strings and templates are skipped as tokens.
  fn skip_to_closing_brace(&mut self, template_start: usize) -> Result<usize> {
    let mut depth = 0usize;
    loop {
      let (token, at) = self.next_token()?;
      match token {
        Token::Punct(Punct::LBrace) => depth += 1,
        Token::Punct(Punct::RBrace) if depth == 0 => return Ok(at),
        Token::Punct(Punct::RBrace) => depth -= 1,
        Token::Eof => {
          return Err(Error::Unterminated {
            what: "template literal",
            at:   self.position(template_start),
          });
        }
        _ => {}
      }
    }
  }

  fn lex_punct(&mut self) -> Result<Punct> {
    let start = self.pos;
    let rest = self.rest();
    for (spelling, punct) in PUNCTS {
      if rest.starts_with(spelling) {
        // `a?.5:1` is a conditional, not optional chaining.
        if *punct == Punct::QuestionDot
          && rest[2..].starts_with(|c: char| c.is_ascii_digit())
        {
          continue;
        }
        self.pos += spelling.len();
        return Ok(*punct);
      }
    }
    let c = self.peek_char().unwrap_or('\0');
    Err(self.syntax(start, &format!("unexpected character `{c}`")))
  }

  fn syntax(&self, offset: usize, message: &str) -> Error {
    Error::Syntax {
      message: message.to_string(),
      at:      self.position(offset),
    }
  }

  // ── Raw JSX helpers ───────────────────────────────────────────────────

  /// Text up to the next `{` or `<`.
  pub(crate) fn read_jsx_text(&mut self) -> &'a str {
    let rest = self.rest();
    let len = rest.find(['{', '<']).unwrap_or(rest.len());
    self.pos += len;
    &rest[..len]
  }

  /// A tag or attribute name: identifier characters plus `-` and `:`.
  pub(crate) fn read_jsx_name(&mut self) -> Option<String> {
    let start = self.pos;
    if !self.peek_char().is_some_and(is_ident_start) {
      return None;
    }
    while let Some(c) = self.peek_char() {
      if is_ident_continue(c) || c == '-' || c == ':' {
        self.bump_char();
      } else {
        break;
      }
    }
    Some(self.src[start..self.pos].to_string())
  }

  /// A quoted attribute value. JSX strings have no escape sequences.
  pub(crate) fn read_jsx_string(&mut self) -> Result<&'a str> {
    let start = self.pos;
    let quote = self.bump_char().unwrap_or('"');
    let rest = self.rest();
    match rest.find(quote) {
      Some(len) => {
        self.pos += len + quote.len_utf8();
        Ok(&rest[..len])
      }
      None => Err(Error::Unterminated {
        what: "attribute string",
        at:   self.position(start),
      }),
    }
  }
}

fn is_ident_start(c: char) -> bool {
  c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
  c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn tokens(src: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
      let (token, _) = lexer.next_token().unwrap();
      if token == Token::Eof {
        return out;
      }
      out.push(token);
    }
  }

  #[test]
  fn longest_punctuation_wins() {
    assert_eq!(tokens("a === b"), vec![
      Token::Ident("a".into()),
      Token::Punct(Punct::StrictEq),
      Token::Ident("b".into()),
    ]);
    assert_eq!(tokens("x => x?.y ?? 0"), vec![
      Token::Ident("x".into()),
      Token::Punct(Punct::Arrow),
      Token::Ident("x".into()),
      Token::Punct(Punct::QuestionDot),
      Token::Ident("y".into()),
      Token::Punct(Punct::Nullish),
      Token::Number(0.0),
    ]);
  }

  #[test]
  fn comments_are_skipped() {
    let src = "a // line\n /* block\n */ b";
    assert_eq!(tokens(src), vec![
      Token::Ident("a".into()),
      Token::Ident("b".into())
    ]);
  }

  #[test]
  fn unterminated_block_comment_is_reported() {
    let mut lexer = Lexer::new("a /* never closed");
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert!(matches!(err, Error::Unterminated { what: "comment", .. }));
  }

  #[test]
  fn string_escapes() {
    assert_eq!(tokens(r#"'it\'s' "a\nb" 'A\u{1F600}'"#), vec![
      Token::Str("it's".into()),
      Token::Str("a\nb".into()),
      Token::Str("A\u{1F600}".into()),
    ]);
  }

  #[test]
  fn numbers() {
    assert_eq!(tokens("1 2.5 .5 1e3 0xff 1_000"), vec![
      Token::Number(1.0),
      Token::Number(2.5),
      Token::Number(0.5),
      Token::Number(1000.0),
      Token::Number(255.0),
      Token::Number(1000.0),
    ]);
  }

  #[test]
  fn template_with_nested_braces_and_strings() {
    let src = "`a ${ {k: '}'}.k } b`";
    let toks = tokens(src);
    let [Token::Template(parts)] = toks.as_slice() else {
      panic!("expected one template, got {toks:?}")
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], RawPart::Text("a ".into()));
    let RawPart::Expr { start, end } = parts[1] else {
      panic!("expected expression part")
    };
    assert_eq!(src[start..end].trim(), "{k: '}'}.k");
    assert_eq!(parts[2], RawPart::Text(" b".into()));
  }

  #[test]
  fn conditional_with_decimal_is_not_optional_chaining() {
    assert_eq!(tokens("a?.5:1"), vec![
      Token::Ident("a".into()),
      Token::Punct(Punct::Question),
      Token::Number(0.5),
      Token::Punct(Punct::Colon),
      Token::Number(1.0),
    ]);
  }

  #[test]
  fn unknown_character_reports_position() {
    let mut lexer = Lexer::new("a\n  #");
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err, Error::Syntax {
      message: "unexpected character `#`".into(),
      at:      Position { line: 2, column: 3 },
    });
  }
}
