//! AI query interpreter: free text in, one of five query shapes out.
//!
//! Interpretation is delegated to an external text-generation endpoint with a
//! fixed instruction prompt. The contract with callers is total: every
//! failure path (unconfigured credential, transport fault, bad status,
//! malformed envelope, unparseable enum parameter) degrades to
//! [`Interpretation::Fallback`], never an error.

use std::time::Duration;

use roster_core::{
  query::{AiQuery, QueryKind},
  taxonomy::{Department, EducationLevel, WorkerStatus},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Settings for the external text-generation endpoint. An empty `api_key`
/// means the feature is unconfigured and every question falls back.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
  pub api_key:      String,
  pub endpoint:     String,
  pub timeout_secs: u64,
}

impl Default for AiConfig {
  fn default() -> Self {
    AiConfig {
      api_key:      String::new(),
      endpoint:     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_owned(),
      timeout_secs: 30,
    }
  }
}

/// The outcome of interpreting one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
  /// One of the five vocabulary shapes, parameter validated where the shape
  /// demands an enum value.
  Recognized(AiQuery),
  /// The endpoint answered with a well-formed envelope whose `queryType` is
  /// outside the vocabulary. The dispatcher answers "could not understand".
  Unrecognized { query_type: String },
  /// Any failure. The dispatcher treats this as a total-worker count.
  Fallback(String),
}

const INSTRUCTIONS: &str = "You classify a question about a worker directory \
into exactly one query. Respond with only a JSON object of the form \
{\"queryType\": \"...\", \"parameter\": \"...\"}. queryType must be one of: \
count_workers (no parameter), count_by_status (parameter: Active, Inactive \
or OnVacation), count_by_department (parameter: Marketing, Operations, \
HumanResources, Logistics, Sales, Accounting or Technology), \
count_by_position (parameter: a substring of the position title), \
count_by_education (parameter: Technical, Technologist, Professional, \
Masters or Specialization). Use count_workers when unsure.";

/// Client for the interpretation endpoint.
pub struct Interpreter {
  client: Option<reqwest::Client>,
  config: AiConfig,
}

impl Interpreter {
  pub fn new(config: AiConfig) -> Self {
    // Building the client can only fail on broken TLS backends; treat that
    // as unconfigured rather than refusing to start.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .ok();
    Interpreter { client, config }
  }

  /// Interpret a free-text question. Never returns an error.
  pub async fn interpret(&self, question: &str) -> Interpretation {
    if self.config.api_key.is_empty() {
      return fallback("AI credential not configured");
    }
    let Some(client) = &self.client else {
      return fallback("HTTP client unavailable");
    };

    let body = json!({
      "contents": [{
        "parts": [{ "text": format!("{INSTRUCTIONS}\n\nQuestion: {question}") }]
      }]
    });

    let response = match client
      .post(&self.config.endpoint)
      .header("x-goog-api-key", &self.config.api_key)
      .json(&body)
      .send()
      .await
    {
      Ok(r) => r,
      Err(e) => return fallback(&format!("transport failure: {e}")),
    };

    if !response.status().is_success() {
      return fallback(&format!("endpoint returned {}", response.status()));
    }

    let envelope: GenerateResponse = match response.json().await {
      Ok(v) => v,
      Err(e) => return fallback(&format!("unreadable response body: {e}")),
    };

    let Some(text) = envelope.generated_text() else {
      return fallback("response carried no generated text");
    };

    interpret_text(&text)
  }
}

fn fallback(reason: &str) -> Interpretation {
  warn!(reason, "AI interpretation degraded to count_workers");
  Interpretation::Fallback(reason.to_owned())
}

// ─── Response envelope ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  text: Option<String>,
}

impl GenerateResponse {
  fn generated_text(&self) -> Option<String> {
    self
      .candidates
      .first()?
      .content
      .as_ref()?
      .parts
      .first()?
      .text
      .clone()
  }
}

// ─── Generated-text parsing ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
  #[serde(rename = "queryType")]
  query_type: String,
  #[serde(default)]
  parameter:  String,
}

/// Parse the model's answer into an interpretation. Split from the transport
/// so the full decision table is testable without a network.
fn interpret_text(text: &str) -> Interpretation {
  let stripped = strip_code_fences(text);

  let envelope: QueryEnvelope = match serde_json::from_str(stripped) {
    Ok(v) => v,
    Err(e) => return fallback(&format!("malformed query envelope: {e}")),
  };

  let Ok(kind) = envelope.query_type.parse::<QueryKind>() else {
    return Interpretation::Unrecognized { query_type: envelope.query_type };
  };

  let parameter = envelope.parameter.trim().to_owned();
  let valid = match kind {
    QueryKind::CountWorkers | QueryKind::CountByPosition => true,
    QueryKind::CountByStatus => parameter.parse::<WorkerStatus>().is_ok(),
    QueryKind::CountByDepartment => parameter.parse::<Department>().is_ok(),
    QueryKind::CountByEducation => parameter.parse::<EducationLevel>().is_ok(),
  };
  if !valid {
    return fallback(&format!(
      "parameter {parameter:?} is not valid for {kind}"
    ));
  }

  Interpretation::Recognized(AiQuery { kind, parameter })
}

/// Models often wrap the JSON in a markdown code fence; peel it off.
fn strip_code_fences(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(inner) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let inner = inner.strip_prefix("json").unwrap_or(inner);
  inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recognizes_all_five_shapes() {
    let cases = [
      (r#"{"queryType": "count_workers", "parameter": ""}"#, QueryKind::CountWorkers, ""),
      (r#"{"queryType": "count_by_status", "parameter": "OnVacation"}"#, QueryKind::CountByStatus, "OnVacation"),
      (r#"{"queryType": "count_by_department", "parameter": "Sales"}"#, QueryKind::CountByDepartment, "Sales"),
      (r#"{"queryType": "count_by_position", "parameter": "engineer"}"#, QueryKind::CountByPosition, "engineer"),
      (r#"{"queryType": "count_by_education", "parameter": "Masters"}"#, QueryKind::CountByEducation, "Masters"),
    ];
    for (text, kind, parameter) in cases {
      assert_eq!(
        interpret_text(text),
        Interpretation::Recognized(AiQuery {
          kind,
          parameter: parameter.to_owned()
        }),
        "case: {text}"
      );
    }
  }

  #[test]
  fn fenced_envelopes_parse() {
    let fenced = "```json\n{\"queryType\": \"count_workers\", \"parameter\": \"\"}\n```";
    assert_eq!(
      interpret_text(fenced),
      Interpretation::Recognized(AiQuery::count_workers())
    );
    assert_eq!(
      strip_code_fences("```\n{\"a\": 1}\n```"),
      "{\"a\": 1}"
    );
    assert_eq!(strip_code_fences("  plain  "), "plain");
  }

  #[test]
  fn unknown_query_type_is_unrecognized_not_fallback() {
    let text = r#"{"queryType": "sum_sales", "parameter": ""}"#;
    assert_eq!(
      interpret_text(text),
      Interpretation::Unrecognized { query_type: "sum_sales".to_owned() }
    );
  }

  #[test]
  fn malformed_json_falls_back() {
    assert!(matches!(
      interpret_text("the answer is 42"),
      Interpretation::Fallback(_)
    ));
  }

  #[test]
  fn invalid_enum_parameter_falls_back() {
    let text = r#"{"queryType": "count_by_status", "parameter": "retired"}"#;
    assert!(matches!(interpret_text(text), Interpretation::Fallback(_)));
  }

  #[test]
  fn enum_parameters_are_case_insensitive() {
    let text = r#"{"queryType": "count_by_department", "parameter": "human_resources"}"#;
    assert!(matches!(
      interpret_text(text),
      Interpretation::Recognized(_)
    ));
  }

  #[tokio::test]
  async fn unconfigured_interpreter_always_falls_back() {
    let interpreter = Interpreter::new(AiConfig::default());
    let outcome = interpreter.interpret("how many workers are there?").await;
    assert!(matches!(outcome, Interpretation::Fallback(_)));
  }
}
