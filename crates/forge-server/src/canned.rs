//! A [`GenerationService`] that answers from a fixed set of descriptions.
//!
//! Requests are matched on keywords in the intent. Responses go through the
//! same normalisation a live service's output would, so both paths produce
//! one canonical shape.

use std::{
  future::Future,
  sync::atomic::{AtomicU64, Ordering},
  time::Duration,
};

use chrono::Utc;
use forge_core::generation::{Generation, GenerationError, GenerationRequest, GenerationService};

const DASHBOARD: &str = include_str!("canned/dashboard.jsx");
const LOGIN: &str = include_str!("canned/login.jsx");
const TABLE: &str = include_str!("canned/table.jsx");
const MODAL: &str = include_str!("canned/modal.jsx");

/// Characters removed from intents before matching.
const INTENT_STRIP: &[char] = &['<', '>', '{', '}', '[', ']', '$'];

struct Canned {
  keywords:    &'static [&'static str],
  code:        &'static str,
  explanation: &'static str,
  /// Used instead of `explanation` when the request carries existing code.
  extending:   Option<&'static str>,
}

const RESPONSES: &[Canned] = &[
  Canned {
    keywords:    &["dashboard", "sales", "analytics"],
    code:        DASHBOARD,
    explanation: "A sales dashboard with sidebar navigation, key metric cards, a sales \
                  chart and a recent orders table.",
    extending:   None,
  },
  Canned {
    keywords:    &["login", "sign in"],
    code:        LOGIN,
    explanation: "A login form with email and password fields and social sign-in \
                  options, centred in a card.",
    extending:   None,
  },
  Canned {
    keywords:    &["table", "users", "data"],
    code:        TABLE,
    explanation: "A user management table with search, role and status badges and \
                  per-row actions.",
    extending:   None,
  },
  Canned {
    keywords:    &["modal", "settings"],
    code:        MODAL,
    explanation: "A settings card with a modal dialog for editing preferences.",
    extending:   Some(
      "Added a settings modal to your existing UI, opened from a button in a \
       settings card.",
    ),
  },
];

pub struct CannedGenerator {
  latency: Duration,
  next_id: AtomicU64,
}

impl CannedGenerator {
  pub fn new(latency: Duration) -> Self {
    Self {
      latency,
      next_id: AtomicU64::new(1),
    }
  }

  fn answer(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
    let intent = sanitize_intent(&request.intent);
    if intent.trim().is_empty() {
      return Err(GenerationError::new("intent is empty"));
    }
    let lowered = intent.to_lowercase();

    let (code, explanation) = match RESPONSES
      .iter()
      .find(|canned| canned.keywords.iter().any(|k| lowered.contains(*k)))
    {
      Some(canned) => {
        let explanation = match (&request.existing_code, canned.extending) {
          (Some(_), Some(extending)) => extending,
          _ => canned.explanation,
        };
        (canned.code.to_string(), explanation.to_string())
      }
      None => match &request.existing_code {
        Some(existing) => (
          existing.clone(),
          format!("Kept the existing structure for \"{intent}\"."),
        ),
        None => (
          LOGIN.to_string(),
          format!("A card-based layout for \"{intent}\"."),
        ),
      },
    };

    Ok(Generation {
      id:          self.next_id.fetch_add(1, Ordering::Relaxed),
      code:        normalize_code(&code),
      explanation,
      timestamp:   Utc::now(),
    })
  }
}

impl GenerationService for CannedGenerator {
  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<Generation, GenerationError>> + Send + '_ {
    async move {
      if !self.latency.is_zero() {
        tokio::time::sleep(self.latency).await;
      }
      let generation = self.answer(&request);
      match &generation {
        Ok(g) => tracing::debug!(generation = g.id, intent = %request.intent, "canned generation"),
        Err(err) => tracing::warn!(error = %err, "canned generation refused"),
      }
      generation
    }
  }
}

fn sanitize_intent(intent: &str) -> String {
  intent.chars().filter(|c| !INTENT_STRIP.contains(c)).collect()
}

/// Strip markdown code fences and a leading `export default`, leaving a
/// plain `function …` declaration.
pub fn normalize_code(code: &str) -> String {
  let mut code = code.trim();
  if let Some(rest) = code.strip_prefix("```") {
    // Drop the info string (`jsx`, `tsx`, …) up to the end of the line.
    code = rest.split_once('\n').map_or("", |(_, body)| body);
    code = code.trim_end().strip_suffix("```").unwrap_or(code).trim();
  }
  let code = code.strip_prefix("export default ").unwrap_or(code);
  format!("{}\n", code.trim())
}

#[cfg(test)]
mod tests {
  use forge_engine::{EngineConfig, Pipeline};
  use pretty_assertions::assert_eq;

  use super::*;

  fn generator() -> CannedGenerator { CannedGenerator::new(Duration::ZERO) }

  #[test]
  fn intents_select_by_keyword() {
    let g = generator();
    let code = |intent: &str| g.answer(&GenerationRequest::new(intent)).unwrap().code;
    assert!(code("Build a SALES dashboard").contains("Recent Orders"));
    assert!(code("a sign in page").contains("Welcome Back"));
    assert!(code("list of users").contains("User Management"));
    assert!(code("settings modal").contains("Open Settings Modal"));
  }

  #[test]
  fn unmatched_intents_keep_existing_code() {
    let request = GenerationRequest {
      intent:            "make it blue".to_string(),
      existing_code:     Some("function GeneratedUI() { return <p>x</p>; }".to_string()),
      parent_version_id: None,
    };
    let generation = generator().answer(&request).unwrap();
    assert_eq!(generation.code, "function GeneratedUI() { return <p>x</p>; }\n");
  }

  #[test]
  fn modal_explanation_mentions_existing_ui() {
    let fresh = generator()
      .answer(&GenerationRequest::new("settings modal"))
      .unwrap();
    assert_eq!(
      fresh.explanation,
      "A settings card with a modal dialog for editing preferences."
    );

    let request = GenerationRequest {
      intent:            "add a settings modal".to_string(),
      existing_code:     Some("function GeneratedUI() { return <p>x</p>; }".to_string()),
      parent_version_id: None,
    };
    let extended = generator().answer(&request).unwrap();
    assert!(extended.code.contains("Open Settings Modal"));
    assert!(
      extended
        .explanation
        .starts_with("Added a settings modal to your existing UI")
    );

    let request = GenerationRequest {
      intent: "sales dashboard".to_string(),
      ..request
    };
    let dashboard = generator().answer(&request).unwrap();
    assert!(dashboard.explanation.starts_with("A sales dashboard"));
  }

  #[test]
  fn ids_increase_per_generation() {
    let g = generator();
    let first = g.answer(&GenerationRequest::new("login")).unwrap();
    let second = g.answer(&GenerationRequest::new("login")).unwrap();
    assert_eq!((first.id, second.id), (1, 2));
  }

  #[test]
  fn markup_characters_are_stripped_from_intents() {
    assert_eq!(sanitize_intent("<b>{table}</b> $[x]"), "btable/b x");
    let err = generator()
      .answer(&GenerationRequest::new("<>{}"))
      .unwrap_err();
    assert_eq!(err.message, "intent is empty");
  }

  #[test]
  fn fences_and_default_exports_are_normalised() {
    let fenced = "```jsx\nexport default function GeneratedUI() {}\n```";
    assert_eq!(normalize_code(fenced), "function GeneratedUI() {}\n");
    assert_eq!(normalize_code("  function A() {}  "), "function A() {}\n");
  }

  #[test]
  fn every_canned_description_renders() {
    let mut pipeline = Pipeline::new(&EngineConfig::default()).unwrap();
    for canned in RESPONSES {
      let run = pipeline.run(&normalize_code(canned.code));
      assert!(run.is_rendered(), "{:?}", run.outcome);
    }
  }
}
