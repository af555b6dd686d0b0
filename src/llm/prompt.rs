//! Prompt templates for complaint analysis and call-quality scoring.
//!
//! [`PromptBuilder`] turns caller text into a [`ChatPrompt`]: a
//! `(system, user)` message pair plus the sampling temperature to use.  The
//! templates are static; only the embedded text changes between requests.

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// Complaint analysis
// ---------------------------------------------------------------------------

const COMPLAINT_SYSTEM: &str = "\
You are a banking AI engine. \
Return strict raw JSON only. \
No markdown. No explanations. \
Banking domain only.";

const COMPLAINT_INSTRUCTIONS: &str = "\
You are an Enterprise Banking Complaint Analysis AI.

Analyze the customer complaint and return structured JSON.

Objectives:
1. Classify the complaint
2. Detect fraud or financial risk
3. Assign priority level
4. Determine escalation requirement
5. Assign responsible department
6. Generate risk score (0-100)
7. Detect sentiment
8. Provide clear banking resolution steps
9. Create internal ticket details
10. Draft professional banking agent response

Strict Business Rules:
- If account emptied, unauthorized transaction, scam, phishing, or money loss -> classify as Fraud
- Fraud cases must be Critical priority
- Fraud cases require escalation
- Financial risk must influence risk score
- Use only banking terminology
- Avoid medical or unrelated wording

Never write the customer's name in the output. The agent_reply_draft must start with \"Dear Customer...\".
Return STRICT RAW JSON only in this structure:
";

const COMPLAINT_SCHEMA: &str = r#"{
  "classification": {
    "primary_category": "",
    "sub_category": ""
  },
  "summary": {
    "main_issue": ""
  },
  "priority": {
    "level": ""
  },
  "fraud_risk": {
    "risk_score": 0,
    "risk_level": ""
  },
  "sentiment": {
    "sentiment_label": ""
  },
  "escalation": {
    "required": false,
    "department": ""
  },
  "suggested_resolution_steps": [],
  "auto_ticket": {
    "ticket_title": "",
    "department": "",
    "SLA_hours": 0
  },
  "agent_reply_draft": ""
}"#;

// ---------------------------------------------------------------------------
// Call quality analysis
// ---------------------------------------------------------------------------

const CALL_SYSTEM: &str = "You analyze call center conversations.";

const CALL_INSTRUCTIONS: &str = "You are a professional Call Quality Analyst.

Analyze the following transcript:
";

const CALL_SCHEMA: &str = r#"Return STRICT JSON:
{
    "summary": "...",
    "customer_sentiment": "Positive/Neutral/Negative",
    "sentiment_score": 1-10,
    "agent_performance_score": 1-10,
    "agent_feedback": "..."
}"#;

// ---------------------------------------------------------------------------
// ChatPrompt
// ---------------------------------------------------------------------------

/// One chat-completion exchange: the system instruction, the user message
/// and the sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds the two service prompts.
///
/// # Example
/// ```rust
/// use banking_ai::llm::PromptBuilder;
///
/// let builder = PromptBuilder::default();
/// let prompt = builder.complaint("My card was stolen");
/// assert!(prompt.user.ends_with("My card was stolen\n"));
/// assert_eq!(prompt.temperature, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    complaint_temperature: f32,
    call_temperature: f32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(0.0, 0.2)
    }
}

impl PromptBuilder {
    pub fn new(complaint_temperature: f32, call_temperature: f32) -> Self {
        Self {
            complaint_temperature,
            call_temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.complaint_temperature, config.call_temperature)
    }

    /// Complaint-analysis prompt with `customer_query` embedded last.
    pub fn complaint(&self, customer_query: &str) -> ChatPrompt {
        let mut user = String::with_capacity(
            COMPLAINT_INSTRUCTIONS.len() + COMPLAINT_SCHEMA.len() + customer_query.len() + 32,
        );
        user.push_str(COMPLAINT_INSTRUCTIONS);
        user.push('\n');
        user.push_str(COMPLAINT_SCHEMA);
        user.push_str("\n\nCustomer Complaint:\n");
        user.push_str(customer_query);
        user.push('\n');

        ChatPrompt {
            system: COMPLAINT_SYSTEM.to_string(),
            user,
            temperature: self.complaint_temperature,
        }
    }

    /// Call-quality prompt with the transcript between the instructions and
    /// the JSON skeleton.
    pub fn call_quality(&self, transcript: &str) -> ChatPrompt {
        let user = format!("{CALL_INSTRUCTIONS}\n{transcript}\n\n{CALL_SCHEMA}\n");

        ChatPrompt {
            system: CALL_SYSTEM.to_string(),
            user,
            temperature: self.call_temperature,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
