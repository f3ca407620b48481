//! Recursive-descent parser for the description language.
//!
//! Pipeline:
//!   raw &str
//!     └─ parse_module()      → top-level items + imports
//!          └─ parse_statement() / parse_expression()
//!               └─ parse_jsx_element()  (raw character mode)
//!                    └─ resolve_entry()  → Definition

use std::{collections::HashSet, sync::Arc};

use crate::{
  ast::{
    Arg, BinaryOp, Body, DeclKind, Declaration, Definition, Expr, Function,
    Import, Item, JsxAttrValue, JsxAttribute, JsxChild, JsxElement, JsxTag,
    Literal, LogicalOp, Pattern, PropPattern, Property, SourceShape, Stmt,
    TemplatePart, UnaryOp,
  },
  error::{Error, Position, Result},
  lexer::{Lexer, Punct, RawPart, Token, describe},
};

/// Binding used for an anonymous `export default` value. `default` is a
/// reserved word, so no source text can shadow or reference it.
pub(crate) const DEFAULT_EXPORT: &str = "default";

const ENTRY_NAME: &str = "GeneratedUI";

/// Deepest expression, statement, pattern or element nesting accepted.
const MAX_NESTING: usize = 128;

const RESERVED: &[&str] = &[
  "break", "case", "catch", "class", "const", "continue", "debugger",
  "default", "delete", "do", "else", "export", "extends", "finally", "for",
  "function", "if", "import", "in", "instanceof", "let", "new", "return",
  "super", "switch", "this", "throw", "try", "typeof", "var", "void", "while",
  "with", "yield", "await", "async",
];

/// Keywords that start a construct the language does not support, with the
/// name used in the diagnostic.
const UNSUPPORTED: &[(&str, &str)] = &[
  ("for", "loop"),
  ("while", "loop"),
  ("do", "loop"),
  ("break", "loop control"),
  ("continue", "loop control"),
  ("class", "class"),
  ("new", "`new` expression"),
  ("this", "`this`"),
  ("super", "`super`"),
  ("switch", "switch statement"),
  ("try", "exception handling"),
  ("throw", "exception handling"),
  ("with", "`with` statement"),
  ("async", "async function"),
  ("await", "async function"),
  ("yield", "generator"),
  ("delete", "`delete` expression"),
  ("void", "`void` expression"),
  ("debugger", "`debugger` statement"),
];

fn unsupported_construct(word: &str) -> Option<&'static str> {
  UNSUPPORTED
    .iter()
    .find(|(kw, _)| *kw == word)
    .map(|(_, construct)| *construct)
}

struct Lexed {
  token: Token,
  start: usize,
  end:   usize,
}

pub(crate) struct Parser<'a> {
  lexer:    Lexer<'a>,
  peeked:   Option<Lexed>,
  last_end: usize,
  depth:    usize,
}

impl<'a> Parser<'a> {
  pub(crate) fn new(src: &'a str) -> Self {
    Self {
      lexer:    Lexer::new(src),
      peeked:   None,
      last_end: 0,
      depth:    0,
    }
  }

  fn sub(&self, start: usize, end: usize) -> Parser<'a> {
    Parser {
      lexer:    Lexer::range(self.lexer.source(), start, end),
      peeked:   None,
      last_end: start,
      depth:    self.depth,
    }
  }

  /// Go one nesting level deeper, failing once [`MAX_NESTING`] is passed
  /// so hostile input cannot exhaust the stack.
  fn deeper(&mut self) -> Result<()> {
    if self.depth >= MAX_NESTING {
      let at = self.peek_start()?;
      return Err(Error::Syntax {
        message: "nesting too deep".to_string(),
        at:      self.position(at),
      });
    }
    self.depth += 1;
    Ok(())
  }

  fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
    self.deeper()?;
    let result = f(self);
    self.depth -= 1;
    result
  }

  /// Run `f`, which builds a left-nested chain (`a + b + c`, `a.b()[c]`)
  /// and calls [`Self::deeper`] once per link, then restore the depth.
  fn chain<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
    let depth = self.depth;
    let result = f(self);
    self.depth = depth;
    result
  }

  // ── Token plumbing ────────────────────────────────────────────────────

  fn lex(&mut self) -> Result<Lexed> {
    match self.peeked.take() {
      Some(lexed) => Ok(lexed),
      None => {
        let (token, start) = self.lexer.next_token()?;
        Ok(Lexed {
          token,
          start,
          end: self.lexer.pos,
        })
      }
    }
  }

  fn fill(&mut self) -> Result<&Lexed> {
    let lexed = self.lex()?;
    Ok(self.peeked.insert(lexed))
  }

  fn peek(&mut self) -> Result<Token> { Ok(self.fill()?.token.clone()) }

  fn peek_start(&mut self) -> Result<usize> { Ok(self.fill()?.start) }

  fn peek_punct(&mut self) -> Result<Option<Punct>> {
    Ok(match self.fill()?.token {
      Token::Punct(p) => Some(p),
      _ => None,
    })
  }

  fn peek_is_word(&mut self, word: &str) -> Result<bool> {
    Ok(matches!(&self.fill()?.token, Token::Ident(w) if w == word))
  }

  fn bump(&mut self) -> Result<Lexed> {
    let lexed = self.lex()?;
    self.last_end = lexed.end;
    Ok(lexed)
  }

  fn eat(&mut self, punct: Punct) -> Result<bool> {
    if self.peek_punct()? == Some(punct) {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  fn eat_word(&mut self, word: &str) -> Result<bool> {
    if self.peek_is_word(word)? {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  fn expect(&mut self, punct: Punct) -> Result<()> {
    if self.eat(punct)? {
      return Ok(());
    }
    Err(self.unexpected(&format!("`{}`", punct.as_str()))?)
  }

  fn expect_word(&mut self, word: &str) -> Result<()> {
    if self.eat_word(word)? {
      return Ok(());
    }
    Err(self.unexpected(&format!("`{word}`"))?)
  }

  fn expect_eof(&mut self) -> Result<()> {
    if self.peek()? == Token::Eof {
      return Ok(());
    }
    Err(self.unexpected("end of expression")?)
  }

  /// A binding name: an identifier that is not a reserved word.
  fn expect_binding_name(&mut self) -> Result<String> {
    match self.peek()? {
      Token::Ident(name) => {
        if let Some(construct) = unsupported_construct(&name) {
          return Err(self.unsupported_here(construct)?);
        }
        if RESERVED.contains(&name.as_str()) {
          return Err(self.unexpected("a name")?);
        }
        self.bump()?;
        Ok(name)
      }
      _ => Err(self.unexpected("a name")?),
    }
  }

  /// A property name after `.`: any identifier, reserved words included.
  fn expect_property_name(&mut self) -> Result<String> {
    match self.peek()? {
      Token::Ident(name) => {
        self.bump()?;
        Ok(name)
      }
      _ => Err(self.unexpected("a property name")?),
    }
  }

  fn unexpected(&mut self, expected: &str) -> Result<Error> {
    let lexed = self.fill()?;
    let found = describe(&lexed.token);
    let start = lexed.start;
    Ok(Error::Syntax {
      message: format!("expected {expected}, found {found}"),
      at:      self.position(start),
    })
  }

  fn unsupported_here(&mut self, construct: &str) -> Result<Error> {
    let start = self.peek_start()?;
    Ok(self.unsupported_at(construct, start))
  }

  fn unsupported_at(&self, construct: &str, offset: usize) -> Error {
    Error::Unsupported {
      construct: construct.to_string(),
      at:        self.position(offset),
    }
  }

  fn position(&self, offset: usize) -> Position { self.lexer.position(offset) }

  /// Switch to raw character mode, un-reading any peeked token.
  fn raw(&mut self) -> &mut Lexer<'a> {
    if let Some(lexed) = self.peeked.take() {
      self.lexer.pos = lexed.start;
    }
    &mut self.lexer
  }

  /// Is there a line break between the last consumed token and the next?
  fn newline_before_peek(&mut self) -> Result<bool> {
    let start = self.peek_start()?;
    let gap = &self.lexer.source()[self.last_end.min(start)..start];
    Ok(gap.contains('\n'))
  }

  // ── Module ────────────────────────────────────────────────────────────

  pub(crate) fn parse_definition(&mut self) -> Result<Definition> {
    let mut module = Module::default();

    loop {
      match self.peek()? {
        Token::Eof => break,
        Token::Punct(Punct::Semi) => {
          self.bump()?;
        }
        Token::Ident(word) => match word.as_str() {
          "import" => {
            let import = self.parse_import()?;
            module.imports.push(import);
          }
          "export" => self.parse_export(&mut module)?,
          "function" => {
            let function = self.parse_function()?;
            module.add_function(function, SourceShape::Function);
          }
          "const" | "let" | "var" => {
            for decl in self.parse_declarations()? {
              module.add_declaration(decl)?;
            }
          }
          other => {
            let construct =
              unsupported_construct(other).unwrap_or("top-level statement");
            return Err(self.unsupported_here(construct)?);
          }
        },
        _ => return Err(self.unsupported_here("top-level statement")?),
      }
    }

    module.resolve_entry()
  }

  fn parse_import(&mut self) -> Result<Import> {
    let start = self.bump()?.start;
    if self.peek_punct()? == Some(Punct::LParen) {
      return Err(self.unsupported_at("dynamic import", start));
    }

    let mut names = Vec::new();
    if let Token::Str(module) = self.peek()? {
      self.bump()?;
      self.eat(Punct::Semi)?;
      return Ok(Import { module, names });
    }

    let mut wants_more = true;
    if matches!(self.peek()?, Token::Ident(_)) && !self.peek_is_word("from")? {
      names.push(self.expect_binding_name()?);
      wants_more = self.eat(Punct::Comma)?;
    }
    if wants_more {
      if self.eat(Punct::Star)? {
        self.expect_word("as")?;
        names.push(self.expect_binding_name()?);
      } else if self.eat(Punct::LBrace)? {
        while !self.eat(Punct::RBrace)? {
          let imported = match self.peek()? {
            Token::Str(s) => {
              self.bump()?;
              s
            }
            _ => self.expect_property_name()?,
          };
          let local = if self.eat_word("as")? {
            self.expect_binding_name()?
          } else {
            imported
          };
          names.push(local);
          if !self.eat(Punct::Comma)? {
            self.expect(Punct::RBrace)?;
            break;
          }
        }
      }
    }

    self.expect_word("from")?;
    let module = match self.peek()? {
      Token::Str(module) => {
        self.bump()?;
        module
      }
      _ => return Err(self.unexpected("a module specifier")?),
    };
    self.eat(Punct::Semi)?;
    Ok(Import { module, names })
  }

  fn parse_export(&mut self, module: &mut Module) -> Result<()> {
    let start = self.bump()?.start;

    if self.eat_word("default")? {
      if self.peek_is_word("function")? {
        let function = self.parse_function()?;
        let name = function.name.clone().unwrap_or(DEFAULT_EXPORT.to_string());
        module.add_named_function(name.clone(), function);
        module.default_export = Some(name);
        return Ok(());
      }

      let expr = self.parse_assignment()?;
      self.eat(Punct::Semi)?;
      if let Expr::Ident(name) = expr {
        module.default_export = Some(name);
      } else {
        module.add_declaration(Declaration {
          kind:    DeclKind::Const,
          pattern: Pattern::Ident(DEFAULT_EXPORT.to_string()),
          init:    Some(expr),
        })?;
        module.default_export = Some(DEFAULT_EXPORT.to_string());
      }
      return Ok(());
    }

    match self.peek()? {
      Token::Ident(word) if word == "function" => {
        let function = self.parse_function()?;
        module.add_function(function, SourceShape::Function);
        Ok(())
      }
      Token::Ident(word) if matches!(word.as_str(), "const" | "let" | "var") => {
        for decl in self.parse_declarations()? {
          module.add_declaration(decl)?;
        }
        Ok(())
      }
      _ => Err(self.unsupported_at("export form", start)),
    }
  }

  // ── Functions and statements ──────────────────────────────────────────

  fn parse_function(&mut self) -> Result<Function> {
    self.expect_word("function")?;
    if self.peek_punct()? == Some(Punct::Star) {
      return Err(self.unsupported_here("generator")?);
    }
    let name = match self.peek()? {
      Token::Ident(_) => Some(self.expect_binding_name()?),
      _ => None,
    };
    let params = self.parse_params()?;
    let body = Body::Block(self.parse_block()?);
    Ok(Function { name, params, body })
  }

  fn parse_params(&mut self) -> Result<Vec<Pattern>> {
    self.expect(Punct::LParen)?;
    let mut params = Vec::new();
    while !self.eat(Punct::RParen)? {
      if self.peek_punct()? == Some(Punct::Ellipsis) {
        return Err(self.unsupported_here("rest parameter")?);
      }
      params.push(self.parse_binding_element()?);
      if !self.eat(Punct::Comma)? {
        self.expect(Punct::RParen)?;
        break;
      }
    }
    Ok(params)
  }

  fn parse_binding_element(&mut self) -> Result<Pattern> {
    let pattern = self.parse_pattern()?;
    if self.eat(Punct::Assign)? {
      let fallback = self.parse_assignment()?;
      return Ok(Pattern::Default(Box::new(pattern), fallback));
    }
    Ok(pattern)
  }

  fn parse_pattern(&mut self) -> Result<Pattern> { self.nested(Self::pattern) }

  fn pattern(&mut self) -> Result<Pattern> {
    match self.peek_punct()? {
      Some(Punct::LBracket) => {
        self.bump()?;
        let mut items = Vec::new();
        while !self.eat(Punct::RBracket)? {
          if self.eat(Punct::Comma)? {
            items.push(None);
            continue;
          }
          if self.peek_punct()? == Some(Punct::Ellipsis) {
            return Err(self.unsupported_here("rest pattern")?);
          }
          items.push(Some(self.parse_binding_element()?));
          if !self.eat(Punct::Comma)? {
            self.expect(Punct::RBracket)?;
            break;
          }
        }
        Ok(Pattern::Array(items))
      }
      Some(Punct::LBrace) => {
        self.bump()?;
        let mut props = Vec::new();
        while !self.eat(Punct::RBrace)? {
          if self.peek_punct()? == Some(Punct::Ellipsis) {
            return Err(self.unsupported_here("rest pattern")?);
          }
          let key = match self.peek()? {
            Token::Str(s) => {
              self.bump()?;
              s
            }
            _ => self.expect_property_name()?,
          };
          let mut value = if self.eat(Punct::Colon)? {
            self.parse_pattern()?
          } else {
            if RESERVED.contains(&key.as_str()) {
              return Err(self.unexpected("a name")?);
            }
            Pattern::Ident(key.clone())
          };
          if self.eat(Punct::Assign)? {
            value = Pattern::Default(Box::new(value), self.parse_assignment()?);
          }
          props.push(PropPattern { key, value });
          if !self.eat(Punct::Comma)? {
            self.expect(Punct::RBrace)?;
            break;
          }
        }
        Ok(Pattern::Object(props))
      }
      _ => Ok(Pattern::Ident(self.expect_binding_name()?)),
    }
  }

  fn parse_declarations(&mut self) -> Result<Vec<Declaration>> {
    let kind = match self.bump()?.token {
      Token::Ident(word) if word == "const" => DeclKind::Const,
      _ => DeclKind::Let,
    };
    let mut decls = Vec::new();
    loop {
      let pattern = self.parse_pattern()?;
      let init = if self.eat(Punct::Assign)? {
        Some(self.parse_assignment()?)
      } else {
        None
      };
      if init.is_none() && (kind == DeclKind::Const || !matches!(pattern, Pattern::Ident(_))) {
        return Err(self.unexpected("`=`")?);
      }
      decls.push(Declaration {
        kind,
        pattern,
        init,
      });
      if !self.eat(Punct::Comma)? {
        break;
      }
    }
    self.eat(Punct::Semi)?;
    Ok(decls)
  }

  fn parse_block(&mut self) -> Result<Vec<Stmt>> {
    self.expect(Punct::LBrace)?;
    let mut stmts = Vec::new();
    while !self.eat(Punct::RBrace)? {
      if self.peek()? == Token::Eof {
        return Err(self.unexpected("`}`")?);
      }
      self.parse_statement(&mut stmts)?;
    }
    Ok(stmts)
  }

  fn parse_statement(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
    self.nested(|p| p.statement(out))
  }

  fn statement(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
    match self.peek()? {
      Token::Punct(Punct::Semi) => {
        self.bump()?;
      }
      Token::Punct(Punct::LBrace) => {
        return Err(self.unsupported_here("block statement")?);
      }
      Token::Ident(word) => match word.as_str() {
        "const" | "let" | "var" => {
          out.extend(self.parse_declarations()?.into_iter().map(Stmt::Declare));
        }
        "function" => {
          let function = self.parse_function()?;
          let Some(name) = function.name.clone() else {
            return Err(self.unexpected("a function name")?);
          };
          out.push(Stmt::Function {
            name,
            function: Arc::new(function),
          });
        }
        "return" => {
          self.bump()?;
          let ends = matches!(
            self.peek()?,
            Token::Eof | Token::Punct(Punct::Semi | Punct::RBrace)
          );
          let value = if ends || self.newline_before_peek()? {
            None
          } else {
            Some(self.parse_expression()?)
          };
          self.eat(Punct::Semi)?;
          out.push(Stmt::Return(value));
        }
        "if" => {
          self.bump()?;
          self.expect(Punct::LParen)?;
          let test = self.parse_expression()?;
          self.expect(Punct::RParen)?;
          let then = self.parse_branch()?;
          let otherwise = if self.eat_word("else")? {
            Some(self.parse_branch()?)
          } else {
            None
          };
          out.push(Stmt::If {
            test,
            then,
            otherwise,
          });
        }
        other => {
          if let Some(construct) = unsupported_construct(other) {
            return Err(self.unsupported_here(construct)?);
          }
          let expr = self.parse_expression()?;
          self.eat(Punct::Semi)?;
          out.push(Stmt::Expr(expr));
        }
      },
      _ => {
        let expr = self.parse_expression()?;
        self.eat(Punct::Semi)?;
        out.push(Stmt::Expr(expr));
      }
    }
    Ok(())
  }

  fn parse_branch(&mut self) -> Result<Vec<Stmt>> {
    if self.peek_punct()? == Some(Punct::LBrace) {
      return self.parse_block();
    }
    let mut stmts = Vec::new();
    self.parse_statement(&mut stmts)?;
    Ok(stmts)
  }

  // ── Expressions ───────────────────────────────────────────────────────

  pub(crate) fn parse_expression(&mut self) -> Result<Expr> {
    let expr = self.parse_assignment()?;
    if self.peek_punct()? == Some(Punct::Comma) {
      return Err(self.unsupported_here("comma operator")?);
    }
    Ok(expr)
  }

  /// An assignment-level expression: arrow function or conditional.
  /// Assignment itself is not part of the language and is rejected here.
  fn parse_assignment(&mut self) -> Result<Expr> { self.nested(Self::assignment) }

  fn assignment(&mut self) -> Result<Expr> {
    if self.arrow_ahead()? {
      return self.parse_arrow();
    }
    let expr = self.parse_conditional()?;
    if matches!(self.peek_punct()?, Some(Punct::Assign | Punct::Mutate)) {
      return Err(self.unsupported_here("assignment")?);
    }
    Ok(expr)
  }

  /// Look past the next token(s) for `=>` without consuming anything.
  fn arrow_ahead(&mut self) -> Result<bool> {
    let start = self.peek_start()?;
    let mut probe = self.lexer;
    probe.pos = start;
    let Ok((first, _)) = probe.next_token() else {
      return Ok(false);
    };
    match first {
      Token::Ident(name) if !RESERVED.contains(&name.as_str()) => Ok(matches!(
        probe.next_token(),
        Ok((Token::Punct(Punct::Arrow), _))
      )),
      Token::Punct(Punct::LParen) => {
        let mut depth = 1usize;
        while depth > 0 {
          match probe.next_token() {
            Ok((Token::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace), _)) => {
              depth += 1
            }
            Ok((Token::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace), _)) => {
              depth -= 1
            }
            // A `<` means JSX (or a comparison); neither appears in a
            // parameter list we accept.
            Ok((Token::Punct(Punct::Lt), _)) | Ok((Token::Eof, _)) | Err(_) => {
              return Ok(false);
            }
            Ok(_) => {}
          }
        }
        Ok(matches!(
          probe.next_token(),
          Ok((Token::Punct(Punct::Arrow), _))
        ))
      }
      _ => Ok(false),
    }
  }

  fn parse_arrow(&mut self) -> Result<Expr> {
    let params = if self.peek_punct()? == Some(Punct::LParen) {
      self.parse_params()?
    } else {
      vec![Pattern::Ident(self.expect_binding_name()?)]
    };
    self.expect(Punct::Arrow)?;
    let body = if self.peek_punct()? == Some(Punct::LBrace) {
      Body::Block(self.parse_block()?)
    } else {
      Body::Expr(self.parse_assignment()?)
    };
    Ok(Expr::Function(Arc::new(Function {
      name: None,
      params,
      body,
    })))
  }

  fn parse_conditional(&mut self) -> Result<Expr> {
    let test = self.parse_binary(1)?;
    if !self.eat(Punct::Question)? {
      return Ok(test);
    }
    let consequent = self.parse_assignment()?;
    self.expect(Punct::Colon)?;
    let alternate = self.parse_assignment()?;
    Ok(Expr::Conditional {
      test:       Box::new(test),
      consequent: Box::new(consequent),
      alternate:  Box::new(alternate),
    })
  }

  fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
    self.chain(|p| p.binary(min_prec))
  }

  fn binary(&mut self, min_prec: u8) -> Result<Expr> {
    let mut lhs = self.parse_unary()?;
    loop {
      let Some(punct) = self.peek_punct()? else {
        break;
      };
      let Some((prec, op)) = binary_operator(punct) else {
        break;
      };
      if prec < min_prec {
        break;
      }
      self.deeper()?;
      self.bump()?;
      let rhs = self.parse_binary(prec + 1)?;
      lhs = match op {
        Operator::Binary(op) => Expr::Binary {
          op,
          lhs: Box::new(lhs),
          rhs: Box::new(rhs),
        },
        Operator::Logical(op) => Expr::Logical {
          op,
          lhs: Box::new(lhs),
          rhs: Box::new(rhs),
        },
      };
    }
    Ok(lhs)
  }

  fn parse_unary(&mut self) -> Result<Expr> { self.nested(Self::unary) }

  fn unary(&mut self) -> Result<Expr> {
    let op = match self.peek()? {
      Token::Punct(Punct::Bang) => Some(UnaryOp::Not),
      Token::Punct(Punct::Minus) => Some(UnaryOp::Neg),
      Token::Punct(Punct::Plus) => Some(UnaryOp::Plus),
      Token::Punct(Punct::Mutate) => {
        return Err(self.unsupported_here("assignment")?);
      }
      Token::Ident(word) if word == "typeof" => Some(UnaryOp::TypeOf),
      _ => None,
    };
    match op {
      Some(op) => {
        self.bump()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
          op,
          operand: Box::new(operand),
        })
      }
      None => self.parse_postfix(),
    }
  }

  fn parse_postfix(&mut self) -> Result<Expr> { self.chain(Self::postfix) }

  fn postfix(&mut self) -> Result<Expr> {
    let mut expr = self.parse_primary()?;
    loop {
      if matches!(
        self.peek()?,
        Token::Punct(Punct::Dot | Punct::QuestionDot | Punct::LBracket | Punct::LParen)
      ) {
        self.deeper()?;
      }
      match self.peek()? {
        Token::Punct(Punct::Dot) => {
          self.bump()?;
          let property = self.expect_property_name()?;
          expr = Expr::Member {
            object: Box::new(expr),
            property,
            optional: false,
          };
        }
        Token::Punct(Punct::QuestionDot) => {
          self.bump()?;
          expr = match self.peek_punct()? {
            Some(Punct::LParen) => Expr::Call {
              callee:   Box::new(expr),
              args:     self.parse_args()?,
              optional: true,
            },
            Some(Punct::LBracket) => {
              self.bump()?;
              let index = self.parse_expression()?;
              self.expect(Punct::RBracket)?;
              Expr::Index {
                object:   Box::new(expr),
                index:    Box::new(index),
                optional: true,
              }
            }
            _ => Expr::Member {
              object:   Box::new(expr),
              property: self.expect_property_name()?,
              optional: true,
            },
          };
        }
        Token::Punct(Punct::LBracket) => {
          self.bump()?;
          let index = self.parse_expression()?;
          self.expect(Punct::RBracket)?;
          expr = Expr::Index {
            object:   Box::new(expr),
            index:    Box::new(index),
            optional: false,
          };
        }
        Token::Punct(Punct::LParen) => {
          expr = Expr::Call {
            callee:   Box::new(expr),
            args:     self.parse_args()?,
            optional: false,
          };
        }
        Token::Template(_) if !self.newline_before_peek()? => {
          return Err(self.unsupported_here("tagged template")?);
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  fn parse_args(&mut self) -> Result<Vec<Arg>> {
    self.expect(Punct::LParen)?;
    let mut args = Vec::new();
    while !self.eat(Punct::RParen)? {
      if self.eat(Punct::Ellipsis)? {
        args.push(Arg::Spread(self.parse_assignment()?));
      } else {
        args.push(Arg::Expr(self.parse_assignment()?));
      }
      if !self.eat(Punct::Comma)? {
        self.expect(Punct::RParen)?;
        break;
      }
    }
    Ok(args)
  }

  fn parse_primary(&mut self) -> Result<Expr> {
    let start = self.peek_start()?;
    match self.peek()? {
      Token::Number(n) => {
        self.bump()?;
        Ok(Expr::Literal(Literal::Number(n)))
      }
      Token::Str(s) => {
        self.bump()?;
        Ok(Expr::Literal(Literal::String(s)))
      }
      Token::Template(raw) => {
        self.bump()?;
        self.parse_template(raw)
      }
      Token::Ident(word) => match word.as_str() {
        "true" | "false" => {
          self.bump()?;
          Ok(Expr::Literal(Literal::Bool(word == "true")))
        }
        "null" => {
          self.bump()?;
          Ok(Expr::Literal(Literal::Null))
        }
        "undefined" => {
          self.bump()?;
          Ok(Expr::Literal(Literal::Undefined))
        }
        "function" => Ok(Expr::Function(Arc::new(self.parse_function()?))),
        "import" => Err(self.unsupported_at("dynamic import", start)),
        _ => Ok(Expr::Ident(self.expect_binding_name()?)),
      },
      Token::Punct(Punct::LParen) => {
        self.bump()?;
        let expr = self.parse_expression()?;
        self.expect(Punct::RParen)?;
        Ok(expr)
      }
      Token::Punct(Punct::LBracket) => self.parse_array(),
      Token::Punct(Punct::LBrace) => self.parse_object(),
      Token::Punct(Punct::Lt) => Ok(Expr::Jsx(Box::new(self.parse_jsx_element()?))),
      Token::Punct(Punct::Slash) => {
        Err(self.unsupported_at("regular expression literal", start))
      }
      _ => Err(self.unexpected("an expression")?),
    }
  }

  fn parse_template(&mut self, raw: Vec<RawPart>) -> Result<Expr> {
    let mut parts = Vec::with_capacity(raw.len());
    for part in raw {
      match part {
        RawPart::Text(text) => parts.push(TemplatePart::Text(text)),
        RawPart::Expr { start, end } => {
          let mut sub = self.sub(start, end);
          let expr = sub.parse_expression()?;
          sub.expect_eof()?;
          parts.push(TemplatePart::Expr(expr));
        }
      }
    }
    Ok(Expr::Template(parts))
  }

  fn parse_array(&mut self) -> Result<Expr> {
    self.expect(Punct::LBracket)?;
    let mut items = Vec::new();
    while !self.eat(Punct::RBracket)? {
      if self.peek_punct()? == Some(Punct::Comma) {
        return Err(self.unsupported_here("array hole")?);
      }
      if self.eat(Punct::Ellipsis)? {
        items.push(Arg::Spread(self.parse_assignment()?));
      } else {
        items.push(Arg::Expr(self.parse_assignment()?));
      }
      if !self.eat(Punct::Comma)? {
        self.expect(Punct::RBracket)?;
        break;
      }
    }
    Ok(Expr::Array(items))
  }

  fn parse_object(&mut self) -> Result<Expr> {
    self.expect(Punct::LBrace)?;
    let mut props = Vec::new();
    while !self.eat(Punct::RBrace)? {
      if self.eat(Punct::Ellipsis)? {
        props.push(Property::Spread(self.parse_assignment()?));
      } else {
        let key = match self.peek()? {
          Token::Ident(name) => {
            self.bump()?;
            name
          }
          Token::Str(s) => {
            self.bump()?;
            s
          }
          Token::Number(n) => {
            self.bump()?;
            format_key(n)
          }
          Token::Punct(Punct::LBracket) => {
            return Err(self.unsupported_here("computed property key")?);
          }
          _ => return Err(self.unexpected("a property key")?),
        };
        if self.eat(Punct::Colon)? {
          props.push(Property::KeyValue(key, self.parse_assignment()?));
        } else if self.peek_punct()? == Some(Punct::LParen) {
          return Err(self.unsupported_here("method definition")?);
        } else {
          if RESERVED.contains(&key.as_str()) {
            return Err(self.unexpected("`:`")?);
          }
          props.push(Property::KeyValue(key.clone(), Expr::Ident(key)));
        }
      }
      if !self.eat(Punct::Comma)? {
        self.expect(Punct::RBrace)?;
        break;
      }
    }
    Ok(Expr::Object(props))
  }

  // ── JSX ───────────────────────────────────────────────────────────────

  fn parse_jsx_element(&mut self) -> Result<JsxElement> { self.nested(Self::jsx_element) }

  fn jsx_element(&mut self) -> Result<JsxElement> {
    let lexer = self.raw();
    let start = lexer.pos;
    let at = lexer.position(start);
    lexer.eat("<");
    lexer.skip_trivia()?;

    if lexer.eat(">") {
      let children = self.parse_jsx_children(&JsxTag::Fragment, at)?;
      return Ok(JsxElement {
        tag: JsxTag::Fragment,
        attributes: Vec::new(),
        children,
        at,
      });
    }

    let tag = self.parse_jsx_tag_name()?;
    let mut attributes = Vec::new();
    loop {
      let lexer = self.raw();
      lexer.skip_trivia()?;
      if lexer.eat("/>") {
        return Ok(JsxElement {
          tag,
          attributes,
          children: Vec::new(),
          at,
        });
      }
      if lexer.eat(">") {
        break;
      }
      if lexer.eat("{") {
        lexer.skip_trivia()?;
        if !lexer.eat("...") {
          return Err(self.raw_error("expected `...` in attribute spread"));
        }
        let expr = self.parse_assignment()?;
        self.expect(Punct::RBrace)?;
        attributes.push(JsxAttribute::Spread(expr));
        continue;
      }

      let Some(name) = lexer.read_jsx_name() else {
        return Err(self.raw_error("expected attribute name, `>` or `/>`"));
      };
      lexer.skip_trivia()?;
      let value = if lexer.eat("=") {
        lexer.skip_trivia()?;
        match lexer.peek_char() {
          Some('"' | '\'') => {
            JsxAttrValue::Text(decode_entities(lexer.read_jsx_string()?))
          }
          Some('{') => {
            lexer.bump_char();
            let expr = self.parse_assignment()?;
            self.expect(Punct::RBrace)?;
            JsxAttrValue::Expr(expr)
          }
          Some('<') => {
            JsxAttrValue::Expr(Expr::Jsx(Box::new(self.parse_jsx_element()?)))
          }
          _ => return Err(self.raw_error("expected attribute value")),
        }
      } else {
        JsxAttrValue::Implicit
      };
      attributes.push(JsxAttribute::Named { name, value });
    }

    let children = self.parse_jsx_children(&tag, at)?;
    Ok(JsxElement {
      tag,
      attributes,
      children,
      at,
    })
  }

  fn parse_jsx_tag_name(&mut self) -> Result<JsxTag> {
    let lexer = self.raw();
    let mut segments = Vec::new();
    loop {
      let Some(segment) = lexer.read_jsx_name() else {
        return Err(self.raw_error("expected tag name"));
      };
      segments.push(segment);
      if !lexer.eat(".") {
        break;
      }
    }
    let is_host = segments.len() == 1
      && segments[0].starts_with(|c: char| c.is_ascii_lowercase());
    Ok(if is_host {
      JsxTag::Host(segments.remove(0))
    } else {
      JsxTag::Component(segments)
    })
  }

  fn parse_jsx_children(
    &mut self,
    tag: &JsxTag,
    at: Position,
  ) -> Result<Vec<JsxChild>> {
    let mut children = Vec::new();
    loop {
      let lexer = self.raw();
      match lexer.peek_char() {
        None => {
          return Err(Error::Unterminated {
            what: "JSX element",
            at,
          });
        }
        Some('<') if lexer.rest()[1..].trim_start().starts_with('/') => {
          lexer.eat("<");
          lexer.skip_trivia()?;
          lexer.eat("/");
          lexer.skip_trivia()?;
          let close_at = lexer.position(lexer.pos);
          let closing = if lexer.peek_char() == Some('>') {
            JsxTag::Fragment
          } else {
            self.parse_jsx_tag_name()?
          };
          let lexer = self.raw();
          lexer.skip_trivia()?;
          if !lexer.eat(">") {
            return Err(self.raw_error("expected `>`"));
          }
          if &closing != tag {
            return Err(Error::MismatchedTag {
              expected: tag.display_name(),
              found:    closing.display_name(),
              at:       close_at,
            });
          }
          return Ok(children);
        }
        Some('<') => {
          children.push(JsxChild::Element(self.parse_jsx_element()?));
        }
        Some('{') => {
          lexer.bump_char();
          lexer.skip_trivia()?;
          if lexer.eat("}") {
            continue;
          }
          if lexer.rest().starts_with("...") {
            return Err(self.raw_error("spread children are not supported"));
          }
          let expr = self.parse_expression()?;
          self.expect(Punct::RBrace)?;
          children.push(JsxChild::Expr(expr));
        }
        Some(_) => {
          let text = lexer.read_jsx_text();
          if let Some(text) = normalize_jsx_text(text) {
            children.push(JsxChild::Text(decode_entities(&text)));
          }
        }
      }
    }
  }

  fn raw_error(&mut self, message: &str) -> Error {
    let lexer = self.raw();
    Error::Syntax {
      message: message.to_string(),
      at:      lexer.position(lexer.pos),
    }
  }
}

// ─── Operators ───────────────────────────────────────────────────────────────

enum Operator {
  Binary(BinaryOp),
  Logical(LogicalOp),
}

/// Precedence (higher binds tighter) and operator for a binary punctuator.
fn binary_operator(punct: Punct) -> Option<(u8, Operator)> {
  use Operator::{Binary, Logical};
  Some(match punct {
    Punct::Nullish => (1, Logical(LogicalOp::Nullish)),
    Punct::OrOr => (1, Logical(LogicalOp::Or)),
    Punct::AndAnd => (2, Logical(LogicalOp::And)),
    Punct::Eq => (3, Binary(BinaryOp::Eq)),
    Punct::NotEq => (3, Binary(BinaryOp::NotEq)),
    Punct::StrictEq => (3, Binary(BinaryOp::StrictEq)),
    Punct::StrictNotEq => (3, Binary(BinaryOp::StrictNotEq)),
    Punct::Lt => (4, Binary(BinaryOp::Lt)),
    Punct::Gt => (4, Binary(BinaryOp::Gt)),
    Punct::LtEq => (4, Binary(BinaryOp::LtEq)),
    Punct::GtEq => (4, Binary(BinaryOp::GtEq)),
    Punct::Plus => (5, Binary(BinaryOp::Add)),
    Punct::Minus => (5, Binary(BinaryOp::Sub)),
    Punct::Star => (6, Binary(BinaryOp::Mul)),
    Punct::Slash => (6, Binary(BinaryOp::Div)),
    Punct::Percent => (6, Binary(BinaryOp::Rem)),
    _ => return None,
  })
}

fn format_key(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    n.to_string()
  }
}

// ─── JSX text ────────────────────────────────────────────────────────────────

/// Collapse JSX text the way React does: lines are trimmed at their inner
/// edges, blank lines dropped, and the rest joined with single spaces.
fn normalize_jsx_text(raw: &str) -> Option<String> {
  let lines: Vec<&str> = raw.split('\n').collect();
  let last = lines.len() - 1;
  let mut out = String::new();
  for (i, line) in lines.iter().enumerate() {
    let mut line = line.trim_end_matches('\r');
    if i != 0 {
      line = line.trim_start();
    }
    if i != last {
      line = line.trim_end();
    }
    if line.is_empty() {
      continue;
    }
    if !out.is_empty() {
      out.push(' ');
    }
    out.push_str(line);
  }
  (!out.is_empty()).then_some(out)
}

/// Decode the HTML character references JSX allows in text and attributes.
fn decode_entities(text: &str) -> String {
  if !text.contains('&') {
    return text.to_string();
  }
  let mut out = String::with_capacity(text.len());
  let mut rest = text;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    rest = &rest[amp..];
    let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
      let entity = &rest[1..semi];
      let c = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => entity
          .strip_prefix("#x")
          .or_else(|| entity.strip_prefix("#X"))
          .and_then(|hex| u32::from_str_radix(hex, 16).ok())
          .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
          .and_then(char::from_u32),
      };
      c.map(|c| (c, semi))
    });
    match decoded {
      Some((c, semi)) => {
        out.push(c);
        rest = &rest[semi + 1..];
      }
      None => {
        out.push('&');
        rest = &rest[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

// ─── Module assembly ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Module {
  items:          Vec<Item>,
  imports:        Vec<Import>,
  default_export: Option<String>,
  /// Component candidates in source order.
  candidates:     Vec<(String, SourceShape)>,
  declared:       HashSet<String>,
  functions:      HashSet<String>,
}

impl Module {
  fn add_function(&mut self, function: Function, shape: SourceShape) {
    // Anonymous declarations only occur after `export default`.
    let name = function.name.clone().unwrap_or(DEFAULT_EXPORT.to_string());
    self.candidates.push((name.clone(), shape));
    self.add_named_function(name, function);
  }

  fn add_named_function(&mut self, name: String, function: Function) {
    self.functions.insert(name.clone());
    self.items.push(Item::Function {
      name,
      function: Arc::new(function),
    });
  }

  fn add_declaration(&mut self, decl: Declaration) -> Result<()> {
    for name in decl.pattern.bound_names() {
      if self.functions.contains(name) || !self.declared.insert(name.to_string()) {
        return Err(Error::DuplicateDeclaration {
          name: name.to_string(),
        });
      }
    }
    if let (Pattern::Ident(name), Some(Expr::Function(_))) = (&decl.pattern, &decl.init) {
      self.candidates.push((name.clone(), SourceShape::Arrow));
    }
    self.items.push(Item::Declare(decl));
    Ok(())
  }

  /// Pick the component to call: the default export, else the last
  /// `GeneratedUI`, else the last function-valued declaration.
  fn resolve_entry(self) -> Result<Definition> {
    let (entry, shape) = if let Some(name) = self.default_export {
      (name, SourceShape::DefaultExport)
    } else if let Some(found) = self
      .candidates
      .iter()
      .rev()
      .find(|(name, _)| name == ENTRY_NAME)
    {
      found.clone()
    } else if let Some(last) = self.candidates.last() {
      last.clone()
    } else {
      return Err(Error::NoEntryPoint);
    };

    Ok(Definition {
      entry,
      items: self.items,
      imports: self.imports,
      shape,
    })
  }
}
