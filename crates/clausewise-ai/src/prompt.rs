//! Analysis request construction.
//!
//! The request is a fixed instruction block, then the response schema, then
//! the contract text between explicit markers. Building it is pure: the same
//! text and options always give the same request.

use clausewise_core::ExtractedText;

const INSTRUCTIONS: &str = "\
# Contract Review

You review commercial contracts. Read the contract below and report the following.

## Key elements
1. Parties: the company names, and every signatory with their title.
2. Dates: effective date, termination date, renewal dates. Use YYYY-MM-DD where the contract gives a full date.
3. Financial terms: total contract value (amount and currency) and the payment terms or schedule.
4. Obligations: the key commitments, deliverables and requirements of each party.
5. Governing law: the applicable law and the jurisdiction or venue for disputes.

## Risk analysis
- Non-standard clauses: clauses that depart from common practice, each with a short explanation.
- Missing clauses: standard provisions this contract lacks.
- Unusual terms: terms that need attention, each with the concern they raise.

## Classification
Classify the contract as exactly one of SERVICE_AGREEMENT, NDA, EMPLOYMENT_CONTRACT, LICENSE_AGREEMENT, PURCHASE_ORDER.
If it is none of these, answer OTHER.

## Output
Reply with a single JSON object that conforms to the schema below.
Do not wrap it in markdown code fences and do not add any text before or after it.
Leave out fields the contract does not support instead of guessing.
";

/// The schema the reply must conform to.
///
/// `OTHER` is part of the classification enum. It is a manual-review request,
/// and downstream it classifies as unrecognized.
pub const RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["keyElements", "riskAnalysis", "classification"],
  "properties": {
    "keyElements": {
      "type": "object",
      "properties": {
        "parties": {
          "type": "object",
          "properties": {
            "companies": { "type": "array", "items": { "type": "string" } },
            "signatories": {
              "type": "array",
              "items": {
                "type": "object",
                "properties": {
                  "name": { "type": "string" },
                  "title": { "type": "string" }
                }
              }
            }
          }
        },
        "dates": {
          "type": "object",
          "required": ["effectiveDate"],
          "properties": {
            "effectiveDate": { "type": "string", "format": "date" },
            "terminationDate": { "type": "string", "format": "date" },
            "renewalDates": { "type": "array", "items": { "type": "string", "format": "date" } }
          }
        },
        "financial": {
          "type": "object",
          "properties": {
            "contractValue": {
              "type": "object",
              "properties": {
                "amount": { "type": "number" },
                "currency": { "type": "string" }
              }
            },
            "paymentTerms": { "type": "string" }
          }
        },
        "obligations": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "party": { "type": "string" },
              "commitment": { "type": "string" }
            }
          }
        },
        "governingLaw": {
          "type": "object",
          "properties": {
            "jurisdiction": { "type": "string" },
            "applicableLaw": { "type": "string" }
          }
        }
      }
    },
    "riskAnalysis": {
      "type": "object",
      "properties": {
        "nonStandardClauses": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "clause": { "type": "string" },
              "explanation": { "type": "string" }
            }
          }
        },
        "missingClauses": { "type": "array", "items": { "type": "string" } },
        "unusualTerms": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "term": { "type": "string" },
              "concern": { "type": "string" }
            }
          }
        }
      }
    },
    "classification": {
      "type": "string",
      "enum": [
        "SERVICE_AGREEMENT",
        "NDA",
        "EMPLOYMENT_CONTRACT",
        "LICENSE_AGREEMENT",
        "PURCHASE_ORDER",
        "OTHER"
      ]
    }
  }
}"#;

const CONTRACT_BEGIN: &str = "<<<CONTRACT TEXT BEGIN>>>";
const CONTRACT_END: &str = "<<<CONTRACT TEXT END>>>";
const TRUNCATION_NOTE: &str = "[contract text truncated]";

/// A complete request for the reasoning service. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    prompt: String,
    truncated: bool,
}

impl AnalysisRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Whether the contract text was cut to fit `max_text_chars`.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_prompt(self) -> String {
        self.prompt
    }
}

/// Builds [`AnalysisRequest`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptBuilder {
    /// Cap on contract characters sent. `None` sends the whole text.
    pub max_text_chars: Option<usize>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = Some(max);
        self
    }

    pub fn build(&self, text: &ExtractedText) -> AnalysisRequest {
        let (body, truncated) = match self.max_text_chars {
            Some(max) => truncate_chars(text.as_str(), max),
            None => (text.as_str(), false),
        };

        let mut prompt = String::with_capacity(
            INSTRUCTIONS.len() + RESPONSE_SCHEMA.len() + body.len() + 128,
        );
        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n## Schema\n");
        prompt.push_str(RESPONSE_SCHEMA);
        prompt.push_str("\n\n");
        prompt.push_str(CONTRACT_BEGIN);
        prompt.push('\n');
        prompt.push_str(body);
        if truncated {
            prompt.push('\n');
            prompt.push_str(TRUNCATION_NOTE);
        }
        prompt.push('\n');
        prompt.push_str(CONTRACT_END);
        prompt.push('\n');

        AnalysisRequest { prompt, truncated }
    }
}

/// The first `max` characters of `s`, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (&s[..idx], true),
        None => (s, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ExtractedText {
        ExtractedText::new(s).unwrap()
    }

    #[test]
    fn schema_is_valid_json_with_other() {
        let schema: serde_json::Value = serde_json::from_str(RESPONSE_SCHEMA).unwrap();
        let labels: Vec<&str> = schema["properties"]["classification"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for t in clausewise_core::ContractType::ALL {
            assert!(labels.contains(&t.as_str()), "{t} missing from schema");
        }
        assert!(labels.contains(&clausewise_core::OTHER_LABEL));
    }

    #[test]
    fn sections_appear_in_order() {
        let req = PromptBuilder::new().build(&text("This Agreement is made between..."));
        let p = req.prompt();
        let instructions = p.find("## Key elements").unwrap();
        let schema = p.find("\"riskAnalysis\"").unwrap();
        let begin = p.find(CONTRACT_BEGIN).unwrap();
        let body = p.find("This Agreement is made").unwrap();
        let end = p.find(CONTRACT_END).unwrap();
        assert!(instructions < schema && schema < begin && begin < body && body < end);
        assert!(!req.is_truncated());
    }

    #[test]
    fn build_is_deterministic() {
        let t = text("Mutual NDA between Acme and Globex.");
        let builder = PromptBuilder::new().with_max_text_chars(1000);
        assert_eq!(builder.build(&t), builder.build(&t));
    }

    #[test]
    fn truncates_on_char_boundary() {
        let t = text("Prix: 1 000 €, payable à réception.");
        let req = PromptBuilder::new().with_max_text_chars(13).build(&t);
        assert!(req.is_truncated());
        assert!(req.prompt().contains("Prix: 1 000 €\n"));
        assert!(req.prompt().contains(TRUNCATION_NOTE));
        assert!(!req.prompt().contains("réception"));
    }

    #[test]
    fn short_text_is_not_truncated() {
        let req = PromptBuilder::new().with_max_text_chars(100).build(&text("short"));
        assert!(!req.is_truncated());
        assert!(!req.prompt().contains(TRUNCATION_NOTE));
    }
}
