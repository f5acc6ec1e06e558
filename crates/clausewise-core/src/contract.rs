//! The validated contract record produced from an analysis reply.
//!
//! Every field except `classification` is optional. Sub-objects are `Option`
//! so an absent section stays distinguishable from an empty one; lists are
//! plain `Vec`s where absent and empty mean the same thing. Consumers should
//! go through the accessor methods on [`ContractRecord`], which are total.
//!
//! Serialization produces the camelCase shape of the analysis schema, so a
//! serialized record can be fed back through the normalizer unchanged.

use serde::Serialize;

use crate::classification::Classification;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_elements: Option<KeyElements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_analysis: Option<RiskAnalysis>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyElements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parties: Option<Parties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<Dates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial: Option<Financial>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub obligations: Vec<Obligation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governing_law: Option<GoverningLaw>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parties {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatories: Vec<Signatory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signatory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Contract dates as the service reported them (normally `YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renewal_dates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Financial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_value: Option<ContractValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContractValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Obligation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoverningLaw {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_law: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub non_standard_clauses: Vec<NonStandardClause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_clauses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unusual_terms: Vec<UnusualTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NonStandardClause {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnusualTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concern: Option<String>,
}

impl ContractRecord {
    /// A record with nothing but a classification.
    pub fn new(classification: impl Into<Classification>) -> Self {
        Self {
            key_elements: None,
            risk_analysis: None,
            classification: classification.into(),
        }
    }

    // ── Key elements ──

    pub fn companies(&self) -> &[String] {
        self.parties()
            .map(|p| p.companies.as_slice())
            .unwrap_or_default()
    }

    pub fn signatories(&self) -> &[Signatory] {
        self.parties()
            .map(|p| p.signatories.as_slice())
            .unwrap_or_default()
    }

    pub fn effective_date(&self) -> Option<&str> {
        self.dates()?.effective_date.as_deref()
    }

    pub fn termination_date(&self) -> Option<&str> {
        self.dates()?.termination_date.as_deref()
    }

    pub fn renewal_dates(&self) -> &[String] {
        self.dates()
            .map(|d| d.renewal_dates.as_slice())
            .unwrap_or_default()
    }

    pub fn contract_value(&self) -> Option<&ContractValue> {
        self.financial()?.contract_value.as_ref()
    }

    pub fn payment_terms(&self) -> Option<&str> {
        self.financial()?.payment_terms.as_deref()
    }

    pub fn obligations(&self) -> &[Obligation] {
        self.key_elements
            .as_ref()
            .map(|k| k.obligations.as_slice())
            .unwrap_or_default()
    }

    /// Obligations whose `party` equals `party` exactly.
    pub fn obligations_for<'a>(&'a self, party: &'a str) -> impl Iterator<Item = &'a Obligation> {
        self.obligations()
            .iter()
            .filter(move |o| o.party.as_deref() == Some(party))
    }

    pub fn governing_law(&self) -> Option<&GoverningLaw> {
        self.key_elements.as_ref()?.governing_law.as_ref()
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.governing_law()?.jurisdiction.as_deref()
    }

    pub fn applicable_law(&self) -> Option<&str> {
        self.governing_law()?.applicable_law.as_deref()
    }

    // ── Risk analysis ──

    pub fn non_standard_clauses(&self) -> &[NonStandardClause] {
        self.risk_analysis
            .as_ref()
            .map(|r| r.non_standard_clauses.as_slice())
            .unwrap_or_default()
    }

    pub fn missing_clauses(&self) -> &[String] {
        self.risk_analysis
            .as_ref()
            .map(|r| r.missing_clauses.as_slice())
            .unwrap_or_default()
    }

    pub fn unusual_terms(&self) -> &[UnusualTerm] {
        self.risk_analysis
            .as_ref()
            .map(|r| r.unusual_terms.as_slice())
            .unwrap_or_default()
    }

    /// True when the analysis flagged unusual terms or non-standard clauses.
    pub fn has_high_risks(&self) -> bool {
        !self.unusual_terms().is_empty() || !self.non_standard_clauses().is_empty()
    }

    fn parties(&self) -> Option<&Parties> {
        self.key_elements.as_ref()?.parties.as_ref()
    }

    fn dates(&self) -> Option<&Dates> {
        self.key_elements.as_ref()?.dates.as_ref()
    }

    fn financial(&self) -> Option<&Financial> {
        self.key_elements.as_ref()?.financial.as_ref()
    }
}
