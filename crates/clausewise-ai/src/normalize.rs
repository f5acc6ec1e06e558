//! Reply normalization: the only path from untrusted reply text to a
//! [`ContractRecord`].
//!
//! 1. Strip markdown code fences and surrounding whitespace.
//! 2. Parse strictly; failing that, parse the outermost `{ ... }` slice once.
//! 3. Require a JSON object with a string `classification`.
//! 4. Map every other field leniently: wrong-typed or `null` values read as
//!    absent, numbers where text is expected are stringified, and numeric
//!    strings are accepted for amounts.
//!
//! A reply that fails any of the first three steps is an error carrying the
//! raw text. No empty record is ever substituted.

use clausewise_core::{
    Classification, ContractRecord, ContractValue, Dates, ErrorKind, Financial, GoverningLaw,
    KeyElements, NonStandardClause, Obligation, Parties, RiskAnalysis, Signatory, UnusualTerm,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::AnalysisReply;

const FENCE: &str = "```";

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("reply is not valid JSON: {source}")]
    InvalidJson {
        source: serde_json::Error,
        raw: String,
    },

    #[error("reply JSON is not an object")]
    NotAnObject { raw: String },

    #[error("reply has no string classification")]
    MissingClassification { raw: String },
}

impl NormalizeError {
    /// The reply text exactly as received, for diagnostics.
    pub fn raw(&self) -> &str {
        match self {
            Self::InvalidJson { raw, .. }
            | Self::NotAnObject { raw }
            | Self::MissingClassification { raw } => raw,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedReply
    }
}

/// Remove leading/trailing code-fence markers and surrounding whitespace.
///
/// Repeats until nothing changes, so the result is a fixed point and applying
/// it twice is the same as applying it once.
pub fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    loop {
        let before = s.len();
        if let Some(rest) = s.strip_prefix(FENCE) {
            s = match rest.get(..4) {
                Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
                _ => rest,
            };
        }
        if let Some(rest) = s.strip_suffix(FENCE) {
            s = rest;
        }
        s = s.trim();
        if s.len() == before {
            return s;
        }
    }
}

/// Turn a reply into a contract record.
pub fn normalize(reply: &AnalysisReply) -> Result<ContractRecord, NormalizeError> {
    let raw = reply.as_str();
    let body = strip_fences(raw);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(source) => match outermost_object(body).and_then(|s| serde_json::from_str::<Value>(s).ok()) {
            Some(v) => {
                debug!("recovered JSON object from surrounding reply text");
                v
            }
            None => {
                warn!(error = %source, raw = %raw, "analysis reply is not JSON");
                return Err(NormalizeError::InvalidJson {
                    source,
                    raw: raw.to_string(),
                });
            }
        },
    };

    let Value::Object(root) = value else {
        warn!(raw = %raw, "analysis reply is not a JSON object");
        return Err(NormalizeError::NotAnObject {
            raw: raw.to_string(),
        });
    };

    let Some(Value::String(label)) = root.get("classification") else {
        warn!(raw = %raw, "analysis reply has no classification");
        return Err(NormalizeError::MissingClassification {
            raw: raw.to_string(),
        });
    };

    let record = ContractRecord {
        key_elements: object(root.get("keyElements")).map(key_elements),
        risk_analysis: object(root.get("riskAnalysis")).map(risk_analysis),
        classification: Classification::from_label(label),
    };
    if !record.classification.is_recognized() {
        debug!(classification = %record.classification, "reply classification is outside the known set");
    }
    Ok(record)
}

fn outermost_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (start < end).then(|| &s[start..=end])
}

// ── Sections ──

fn key_elements(obj: &Map<String, Value>) -> KeyElements {
    KeyElements {
        parties: object(obj.get("parties")).map(|p| Parties {
            companies: elements(p.get("companies")).filter_map(text).collect(),
            signatories: elements(p.get("signatories"))
                .filter_map(signatory)
                .collect(),
        }),
        dates: object(obj.get("dates")).map(|d| Dates {
            effective_date: field(d, "effectiveDate"),
            termination_date: field(d, "terminationDate"),
            renewal_dates: elements(d.get("renewalDates")).filter_map(text).collect(),
        }),
        financial: object(obj.get("financial")).map(|f| Financial {
            contract_value: object(f.get("contractValue")).map(|v| ContractValue {
                amount: v.get("amount").and_then(amount),
                currency: field(v, "currency"),
            }),
            payment_terms: field(f, "paymentTerms"),
        }),
        obligations: elements(obj.get("obligations"))
            .filter_map(|v| match v {
                Value::Object(o) => Some(Obligation {
                    party: field(o, "party"),
                    commitment: field(o, "commitment"),
                }),
                other => text(other).map(|c| Obligation {
                    party: None,
                    commitment: Some(c),
                }),
            })
            .collect(),
        governing_law: object(obj.get("governingLaw")).map(|g| GoverningLaw {
            jurisdiction: field(g, "jurisdiction"),
            applicable_law: field(g, "applicableLaw"),
        }),
    }
}

fn risk_analysis(obj: &Map<String, Value>) -> RiskAnalysis {
    RiskAnalysis {
        non_standard_clauses: elements(obj.get("nonStandardClauses"))
            .filter_map(|v| match v {
                Value::Object(o) => Some(NonStandardClause {
                    clause: field(o, "clause"),
                    explanation: field(o, "explanation"),
                }),
                other => text(other).map(|c| NonStandardClause {
                    clause: Some(c),
                    explanation: None,
                }),
            })
            .collect(),
        missing_clauses: elements(obj.get("missingClauses"))
            .filter_map(text)
            .collect(),
        unusual_terms: elements(obj.get("unusualTerms"))
            .filter_map(|v| match v {
                Value::Object(o) => Some(UnusualTerm {
                    term: field(o, "term"),
                    concern: field(o, "concern"),
                }),
                other => text(other).map(|t| UnusualTerm {
                    term: Some(t),
                    concern: None,
                }),
            })
            .collect(),
    }
}

fn signatory(v: &Value) -> Option<Signatory> {
    match v {
        Value::Object(o) => Some(Signatory {
            name: field(o, "name"),
            title: field(o, "title"),
        }),
        other => text(other).map(|name| Signatory {
            name: Some(name),
            title: None,
        }),
    }
}

// ── Lenient readers ──

fn object(v: Option<&Value>) -> Option<&Map<String, Value>> {
    v?.as_object()
}

/// Items of a list field. A lone value reads as a one-item list; `null` or
/// absence reads as empty.
fn elements(v: Option<&Value>) -> impl Iterator<Item = &Value> {
    let items: &[Value] = match v {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(single) => std::slice::from_ref(single),
    };
    items.iter()
}

fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(text)
}

/// Scalar text: strings as-is, numbers and booleans stringified.
fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn amount(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            cleaned.parse().ok().filter(|a: &f64| a.is_finite())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausewise_core::ContractType;

    fn reply(s: &str) -> AnalysisReply {
        AnalysisReply::new(s)
    }

    fn full_record() -> ContractRecord {
        ContractRecord {
            key_elements: Some(KeyElements {
                parties: Some(Parties {
                    companies: vec!["Acme Corp".into(), "Globex LLC".into()],
                    signatories: vec![
                        Signatory {
                            name: Some("Jane Doe".into()),
                            title: Some("CEO".into()),
                        },
                        Signatory {
                            name: Some("John Roe".into()),
                            title: None,
                        },
                    ],
                }),
                dates: Some(Dates {
                    effective_date: Some("2024-01-05".into()),
                    termination_date: Some("2025-01-04".into()),
                    renewal_dates: vec!["2025-01-05".into()],
                }),
                financial: Some(Financial {
                    contract_value: Some(ContractValue {
                        amount: Some(125000.5),
                        currency: Some("USD".into()),
                    }),
                    payment_terms: Some("Net 30".into()),
                }),
                obligations: vec![Obligation {
                    party: Some("Acme Corp".into()),
                    commitment: Some("Provide support".into()),
                }],
                governing_law: Some(GoverningLaw {
                    jurisdiction: Some("Delaware".into()),
                    applicable_law: Some("Delaware law".into()),
                }),
            }),
            risk_analysis: Some(RiskAnalysis {
                non_standard_clauses: vec![NonStandardClause {
                    clause: Some("Auto-renewal".into()),
                    explanation: Some("Renews without notice".into()),
                }],
                missing_clauses: vec!["Force majeure".into()],
                unusual_terms: vec![UnusualTerm {
                    term: Some("Unlimited liability".into()),
                    concern: Some("Uncapped exposure".into()),
                }],
            }),
            classification: ContractType::ServiceAgreement.into(),
        }
    }

    #[test]
    fn serialized_record_normalizes_back_unchanged() {
        let mut sparse = ContractRecord::new(ContractType::Nda);
        sparse.key_elements = Some(KeyElements {
            dates: Some(Dates::default()),
            ..Default::default()
        });
        let unrecognized = ContractRecord::new(Classification::from_label("OTHER"));

        for record in [full_record(), sparse, unrecognized] {
            let json = serde_json::to_string_pretty(&record).unwrap();
            assert_eq!(normalize(&reply(&json)).unwrap(), record);
            let fenced = format!("```json\n{json}\n```");
            assert_eq!(normalize(&reply(&fenced)).unwrap(), record);
        }
    }

    #[test]
    fn fenced_nda_reply() {
        let r = reply(
            "```json\n{\"classification\":\"NDA\",\"keyElements\":{\"parties\":{\"companies\":[\"Acme\"]}}}\n```",
        );
        let record = normalize(&r).unwrap();
        assert_eq!(record.classification, Classification::Known(ContractType::Nda));
        assert_eq!(record.companies(), ["Acme"]);
    }

    #[test]
    fn prose_is_malformed_and_keeps_raw() {
        let err = normalize(&reply("not json at all")).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidJson { .. }));
        assert_eq!(err.raw(), "not json at all");
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
    }

    #[test]
    fn unknown_classification_is_accepted() {
        let r = reply(
            r#"{"classification":"SOMETHING_ELSE","keyElements":{"governingLaw":{"jurisdiction":"Ontario"}},"riskAnalysis":{"missingClauses":["Termination"]}}"#,
        );
        let record = normalize(&r).unwrap();
        assert_eq!(
            record.classification,
            Classification::Unrecognized("SOMETHING_ELSE".into())
        );
        assert_eq!(record.jurisdiction(), Some("Ontario"));
        assert_eq!(record.missing_clauses(), ["Termination"]);
    }

    #[test]
    fn object_is_recovered_from_preamble() {
        let r = reply("Here is the analysis:\n{\"classification\":\"PURCHASE_ORDER\"}\nLet me know if you need more.");
        let record = normalize(&r).unwrap();
        assert_eq!(
            record.classification.contract_type(),
            Some(ContractType::PurchaseOrder)
        );
    }

    #[test]
    fn truncated_reply_is_malformed() {
        let r = reply("```json\n{\"classification\":\"NDA\",\"keyElements\":{\"parties\":");
        assert!(matches!(
            normalize(&r).unwrap_err(),
            NormalizeError::InvalidJson { .. }
        ));
    }

    #[test]
    fn non_object_and_missing_classification_are_malformed() {
        assert!(matches!(
            normalize(&reply("[1, 2, 3]")).unwrap_err(),
            NormalizeError::NotAnObject { .. }
        ));
        assert!(matches!(
            normalize(&reply("\"NDA\"")).unwrap_err(),
            NormalizeError::NotAnObject { .. }
        ));
        assert!(matches!(
            normalize(&reply(r#"{"keyElements":{}}"#)).unwrap_err(),
            NormalizeError::MissingClassification { .. }
        ));
        assert!(matches!(
            normalize(&reply(r#"{"classification":null}"#)).unwrap_err(),
            NormalizeError::MissingClassification { .. }
        ));
        assert!(matches!(
            normalize(&reply(r#"{"classification":3}"#)).unwrap_err(),
            NormalizeError::MissingClassification { .. }
        ));
    }

    #[test]
    fn scalars_are_read_leniently() {
        let r = reply(
            r#"{
                "classification": "SERVICE_AGREEMENT",
                "keyElements": {
                    "parties": {"companies": "Acme Corp", "signatories": ["Jane Doe", null, {"name": "Raj", "title": 7}]},
                    "dates": {"effectiveDate": null, "terminationDate": 2025, "renewalDates": null},
                    "financial": {"contractValue": {"amount": "50,000", "currency": "EUR"}, "paymentTerms": {"nested": true}},
                    "obligations": "Pay on time",
                    "governingLaw": "Delaware"
                },
                "riskAnalysis": {"missingClauses": [null, "Indemnity"], "unusualTerms": []}
            }"#,
        );
        let record = normalize(&r).unwrap();
        assert_eq!(record.companies(), ["Acme Corp"]);
        assert_eq!(record.signatories().len(), 2);
        assert_eq!(record.signatories()[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.signatories()[1].title.as_deref(), Some("7"));
        assert_eq!(record.effective_date(), None);
        assert_eq!(record.termination_date(), Some("2025"));
        assert!(record.renewal_dates().is_empty());
        assert_eq!(record.contract_value().and_then(|v| v.amount), Some(50000.0));
        assert_eq!(record.payment_terms(), None);
        assert_eq!(record.obligations()[0].commitment.as_deref(), Some("Pay on time"));
        assert!(record.governing_law().is_none());
        assert_eq!(record.missing_clauses(), ["Indemnity"]);
        assert!(!record.has_high_risks());
    }

    #[test]
    fn wrong_typed_sections_read_as_absent() {
        let record =
            normalize(&reply(r#"{"classification":"NDA","keyElements":[],"riskAnalysis":"none"}"#))
                .unwrap();
        assert!(record.key_elements.is_none());
        assert!(record.risk_analysis.is_none());
    }

    #[test]
    fn strip_fences_cases() {
        let cases = [
            ("```json\n{}\n```", "{}"),
            ("```JSON\n{}\n```", "{}"),
            ("```\n{}\n```", "{}"),
            ("  {\"a\":1}  ", "{\"a\":1}"),
            ("```json{}```", "{}"),
            ("```json\n```json\n{}\n```\n```", "{}"),
            ("{}", "{}"),
            ("", ""),
            ("```", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_fences(input), expected, "{input:?}");
        }
    }

    #[test]
    fn strip_fences_is_idempotent() {
        let inputs = [
            "",
            " ",
            "`",
            "``",
            "```",
            "````",
            "``````",
            "```json",
            "```jsonjson```",
            "```json\n{\"classification\":\"NDA\"}\n```",
            "\n\n```json\n\n```\n",
            "not json at all",
            "{\"code\":\"```\"}",
            "``` ```` ```",
            "```js\n{}\n```",
            "é```jsoné```",
        ];
        for input in inputs {
            let once = strip_fences(input);
            assert_eq!(strip_fences(once), once, "{input:?}");
        }
    }
}
