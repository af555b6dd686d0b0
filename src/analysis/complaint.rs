//! Complaint analysis: the banking complaint pipeline and its response shape.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::AnalysisError;
use crate::llm::{recover, ChatModel, PromptBuilder, Recovered};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /analyze` on the complaint service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRequest {
    pub customer_query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub input_word_count: usize,
    pub response_time_seconds: f64,
}

/// Fixed-shape complaint analysis.  Model-derived fields carry whatever
/// the reply held at their path, untouched; a missing path is `null` (or
/// `[]` for the steps).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplaintAnalysisResult {
    pub complaint_type: Value,
    pub sub_category: Value,
    pub summary: Value,
    pub priority: Value,
    pub risk_score: Value,
    pub risk_level: Value,
    pub sentiment: Value,
    pub escalation_required: Value,
    pub handled_by: Value,
    pub resolution_steps: Value,
    pub ticket_title: Value,
    pub ticket_department: Value,
    #[serde(rename = "SLA_hours")]
    pub sla_hours: Value,
    pub agent_reply: Value,
    pub metrics: RequestMetrics,
}

impl ComplaintAnalysisResult {
    /// Project a recovered reply onto the result shape.
    pub fn from_recovered(parsed: &Recovered, metrics: RequestMetrics) -> Self {
        let at = |path: &[&str]| parsed.path(path).clone();
        let resolution_steps = match parsed.get("suggested_resolution_steps") {
            Value::Null => Value::Array(Vec::new()),
            steps => steps.clone(),
        };

        Self {
            complaint_type: at(&["classification", "primary_category"]),
            sub_category: at(&["classification", "sub_category"]),
            summary: at(&["summary", "main_issue"]),
            priority: at(&["priority", "level"]),
            risk_score: at(&["fraud_risk", "risk_score"]),
            risk_level: at(&["fraud_risk", "risk_level"]),
            sentiment: at(&["sentiment", "sentiment_label"]),
            escalation_required: at(&["escalation", "required"]),
            handled_by: at(&["escalation", "department"]),
            resolution_steps,
            ticket_title: at(&["auto_ticket", "ticket_title"]),
            ticket_department: at(&["auto_ticket", "department"]),
            sla_hours: at(&["auto_ticket", "SLA_hours"]),
            agent_reply: parsed.get("agent_reply_draft").clone(),
            metrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Whitespace-delimited token count.
pub fn input_word_count(query: &str) -> usize {
    query.split_whitespace().count()
}

/// Seconds since `started`, rounded to two decimals.
fn elapsed_seconds(started: Instant) -> f64 {
    let secs = started.elapsed().as_secs_f64();
    ((secs * 100.0).round() / 100.0).max(0.0)
}

// ---------------------------------------------------------------------------
// ComplaintAnalyzer
// ---------------------------------------------------------------------------

pub struct ComplaintAnalyzer {
    llm: Arc<dyn ChatModel>,
    prompts: PromptBuilder,
}

impl ComplaintAnalyzer {
    pub fn new(llm: Arc<dyn ChatModel>, prompts: PromptBuilder) -> Self {
        Self { llm, prompts }
    }

    /// Run one complaint through the model.  `started` is the moment the
    /// request arrived; the reported response time is measured from it.
    pub async fn analyze(
        &self,
        customer_query: &str,
        started: Instant,
    ) -> Result<ComplaintAnalysisResult, AnalysisError> {
        let prompt = self.prompts.complaint(customer_query);
        let raw = self.llm.complete(&prompt).await.map_err(|e| {
            log::warn!("Complaint model call failed: {e}");
            e
        })?;

        let parsed = recover(&raw);
        if parsed.is_empty() {
            log::warn!("No JSON object in model reply ({} chars)", raw.len());
            return Err(AnalysisError::UnrecoverableOutput { raw_response: raw });
        }

        let metrics = RequestMetrics {
            input_word_count: input_word_count(customer_query),
            response_time_seconds: elapsed_seconds(started),
        };
        Ok(ComplaintAnalysisResult::from_recovered(&parsed, metrics))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::llm::{ChatPrompt, LlmError};

    /// Replies with a fixed text (or HTTP status) and records prompts.
    pub(crate) struct ScriptedModel {
        reply: Result<String, u16>,
        pub calls: AtomicUsize,
        pub last_prompt: Mutex<Option<ChatPrompt>>,
    }

    impl ScriptedModel {
        pub fn replying(text: impl Into<String>) -> Self {
            Self {
                reply: Ok(text.into()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Status {
                    status: *status,
                    body: "upstream unavailable".into(),
                }),
            }
        }
    }

    fn metrics() -> RequestMetrics {
        RequestMetrics {
            input_word_count: 0,
            response_time_seconds: 0.0,
        }
    }

    const FRAUD_REPLY: &str = r#"{
        "classification": {"primary_category": "Fraud", "sub_category": "Unauthorized Transaction"},
        "summary": {"main_issue": "Account emptied without consent"},
        "priority": {"level": "Critical"},
        "fraud_risk": {"risk_score": 95, "risk_level": "High"},
        "sentiment": {"sentiment_label": "Angry"},
        "escalation": {"required": true, "department": "Fraud Investigation"},
        "suggested_resolution_steps": ["Freeze the account", "Open a dispute"],
        "auto_ticket": {"ticket_title": "Unauthorized withdrawal", "department": "Fraud", "SLA_hours": 4},
        "agent_reply_draft": "Dear Customer, we have frozen your account."
    }"#;

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(input_word_count("My card was stolen"), 4);
        assert_eq!(input_word_count("  spaced\tout\n words "), 3);
        assert_eq!(input_word_count(""), 0);
    }

    #[test]
    fn full_reply_is_projected() {
        let result = ComplaintAnalysisResult::from_recovered(&recover(FRAUD_REPLY), metrics());

        assert_eq!(result.complaint_type, json!("Fraud"));
        assert_eq!(result.sub_category, json!("Unauthorized Transaction"));
        assert_eq!(result.priority, json!("Critical"));
        assert_eq!(result.risk_score, json!(95));
        assert_eq!(result.escalation_required, json!(true));
        assert_eq!(result.handled_by, json!("Fraud Investigation"));
        assert_eq!(result.resolution_steps, json!(["Freeze the account", "Open a dispute"]));
        assert_eq!(result.ticket_department, json!("Fraud"));
        assert_eq!(result.sla_hours, json!(4));
        assert!(result.agent_reply.as_str().unwrap().starts_with("Dear Customer"));
    }

    #[test]
    fn missing_paths_become_null() {
        let parsed = recover(r#"{"classification": {"primary_category": "Billing"}}"#);
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());

        assert_eq!(result.complaint_type, json!("Billing"));
        assert_eq!(result.sub_category, Value::Null);
        assert_eq!(result.priority, Value::Null);
        assert_eq!(result.risk_score, Value::Null);
        assert_eq!(result.escalation_required, Value::Null);
        assert_eq!(result.resolution_steps, json!([]));
        assert_eq!(result.agent_reply, Value::Null);
    }

    #[test]
    fn free_form_values_pass_through_untouched() {
        let parsed = recover(
            r#"{
                "fraud_risk": {"risk_score": "85/100"},
                "auto_ticket": {"SLA_hours": "24 hours"},
                "priority": {"level": {"name": "Critical"}},
                "escalation": {"required": "Y"},
                "suggested_resolution_steps": ["Call back", null, 3, {"step": "x"}]
            }"#,
        );
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());

        assert_eq!(result.risk_score, json!("85/100"));
        assert_eq!(result.sla_hours, json!("24 hours"));
        assert_eq!(result.priority, json!({"name": "Critical"}));
        assert_eq!(result.escalation_required, json!("Y"));
        assert_eq!(result.resolution_steps, json!(["Call back", null, 3, {"step": "x"}]));
    }

    #[test]
    fn numbers_stay_numbers() {
        let parsed = recover(
            r#"{"priority": {"level": 1}, "fraud_risk": {"risk_score": 72.5}, "escalation": {"required": false}}"#,
        );
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());

        assert_eq!(result.priority, json!(1));
        assert_eq!(result.risk_score, json!(72.5));
        assert_eq!(result.escalation_required, json!(false));
    }

    #[test]
    fn scalar_where_an_object_was_expected_yields_null() {
        let parsed = recover(r#"{"classification": "Fraud", "fraud_risk": {"risk_level": null}}"#);
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());

        assert_eq!(result.complaint_type, Value::Null);
        assert_eq!(result.risk_level, Value::Null);
    }

    #[test]
    fn non_array_steps_are_kept_as_given() {
        let parsed = recover(r#"{"suggested_resolution_steps": "Refund"}"#);
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());
        assert_eq!(result.resolution_steps, json!("Refund"));
    }

    #[test]
    fn serialised_shape_uses_public_field_names() {
        let parsed = recover(r#"{"auto_ticket": {"SLA_hours": 24}}"#);
        let result = ComplaintAnalysisResult::from_recovered(&parsed, metrics());
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["SLA_hours"], json!(24));
        assert_eq!(value["complaint_type"], Value::Null);
        assert_eq!(value["resolution_steps"], json!([]));
        assert_eq!(value["metrics"]["input_word_count"], json!(0));
        assert!(value.get("sla_hours").is_none());
    }

    #[tokio::test]
    async fn fraud_reply_is_preserved_verbatim() {
        let model = Arc::new(ScriptedModel::replying(FRAUD_REPLY));
        let analyzer = ComplaintAnalyzer::new(model.clone(), PromptBuilder::default());

        let result = analyzer
            .analyze("Someone emptied my account overnight", Instant::now())
            .await
            .unwrap();

        assert_eq!(result.priority, json!("Critical"));
        assert_eq!(result.escalation_required, json!(true));
        assert_eq!(result.metrics.input_word_count, 5);
        assert!(result.metrics.response_time_seconds >= 0.0);

        let prompt = model.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.user.ends_with("Someone emptied my account overnight\n"));
        assert_eq!(prompt.temperature, 0.0);
    }

    #[tokio::test]
    async fn fenced_partial_reply_is_shaped() {
        let model = Arc::new(ScriptedModel::replying(
            "```json\n{\"classification\":{\"primary_category\":\"Billing\"}}\n```",
        ));
        let analyzer = ComplaintAnalyzer::new(model, PromptBuilder::default());

        let result = analyzer.analyze("Charged twice", Instant::now()).await.unwrap();

        assert_eq!(result.complaint_type, json!("Billing"));
        assert_eq!(result.summary, Value::Null);
        assert_eq!(result.resolution_steps, json!([]));
    }

    #[tokio::test]
    async fn response_time_tracks_elapsed_time() {
        let model = Arc::new(ScriptedModel::replying("{\"a\":1}"));
        let analyzer = ComplaintAnalyzer::new(model, PromptBuilder::default());
        let started = Instant::now() - Duration::from_millis(1500);

        let result = analyzer.analyze("late", started).await.unwrap();
        assert!(result.metrics.response_time_seconds >= 1.5);
    }

    #[tokio::test]
    async fn prose_reply_is_unrecoverable() {
        let model = Arc::new(ScriptedModel::replying("I cannot help with that."));
        let analyzer = ComplaintAnalyzer::new(model, PromptBuilder::default());

        let err = analyzer.analyze("help", Instant::now()).await.unwrap_err();
        match err {
            AnalysisError::UnrecoverableOutput { raw_response } => {
                assert_eq!(raw_response, "I cannot help with that.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let model = Arc::new(ScriptedModel::failing(503));
        let analyzer = ComplaintAnalyzer::new(model, PromptBuilder::default());

        let err = analyzer.analyze("help", Instant::now()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream(LlmError::Status { status: 503, .. })));
    }
}
