//! View selection: which presentation branch a record gets, and the
//! type-specific highlight fields shown for it.
//!
//! Views are derived on demand from a [`ContractRecord`] and never cached.

use chrono::NaiveDate;
use clausewise_core::{Classification, ContractRecord, ContractType};
use serde::Serialize;

/// Value shown for any highlight whose source field is absent or blank.
pub const NOT_SPECIFIED: &str = "Not specified";

const ISO_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%B %-d, %Y";

/// Presentation state of a record.
///
/// Starts `Unclassified`; one transition on the record's classification
/// moves it to a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "type", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Unclassified,
    Classified(ContractType),
    Unrecognized,
}

impl ViewState {
    /// The terminal state for a classification.
    pub fn of(classification: &Classification) -> Self {
        match classification.contract_type() {
            Some(t) => Self::Classified(t),
            None => Self::Unrecognized,
        }
    }

    /// Apply a classification. Terminal states ignore further input.
    pub fn advance(self, classification: &Classification) -> Self {
        match self {
            Self::Unclassified => Self::of(classification),
            terminal => terminal,
        }
    }

    pub fn needs_manual_review(&self) -> bool {
        matches!(self, Self::Unrecognized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationView {
    pub state: ViewState,
    /// Classification label with underscores shown as spaces.
    pub badge: String,
    pub title: &'static str,
    pub description: &'static str,
    /// Empty unless the state is `Classified`.
    pub highlights: Vec<Highlight>,
    pub needs_manual_review: bool,
    pub has_high_risks: bool,
}

/// Derive the presentation view for a record.
pub fn select_view(record: &ContractRecord) -> ClassificationView {
    let state = ViewState::default().advance(&record.classification);
    let (title, description, highlights) = match state {
        ViewState::Classified(t) => {
            let (title, description) = heading(t);
            (title, description, highlights(t, record))
        }
        ViewState::Unclassified | ViewState::Unrecognized => (
            "Unrecognized Contract",
            "This contract type is not recognized and needs manual review",
            Vec::new(),
        ),
    };

    ClassificationView {
        state,
        badge: record.classification.as_str().replace('_', " "),
        title,
        description,
        highlights,
        needs_manual_review: state.needs_manual_review(),
        has_high_risks: record.has_high_risks(),
    }
}

fn heading(t: ContractType) -> (&'static str, &'static str) {
    match t {
        ContractType::ServiceAgreement => (
            "Service Agreement Details",
            "Key service delivery terms and conditions",
        ),
        ContractType::Nda => (
            "Non-Disclosure Agreement",
            "Confidentiality and information protection terms",
        ),
        ContractType::EmploymentContract => {
            ("Employment Contract", "Employment terms and conditions")
        }
        ContractType::LicenseAgreement => {
            ("License Agreement", "Licensing terms and usage rights")
        }
        ContractType::PurchaseOrder => ("Purchase Order", "Order details and delivery terms"),
    }
}

/// The ordered highlight fields for a known contract type.
///
/// Every lookup is total: missing or blank fields become [`NOT_SPECIFIED`].
pub fn highlights(t: ContractType, record: &ContractRecord) -> Vec<Highlight> {
    let h = |label, value: Option<String>| Highlight {
        label,
        value: value.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    };

    match t {
        ContractType::ServiceAgreement => vec![
            h("Service Value", money(record)),
            h("Payment Terms", present(record.payment_terms()).map(str::to_string)),
            h("Duration", duration(record)),
        ],
        ContractType::Nda => vec![
            h("Parties Bound", parties(record)),
            h("Jurisdiction", present(record.jurisdiction()).map(str::to_string)),
            h("Effective Date", present(record.effective_date()).map(format_date)),
        ],
        ContractType::EmploymentContract => vec![
            h("Parties", parties(record)),
            h("Start Date", present(record.effective_date()).map(format_date)),
            h("Compensation", money(record)),
        ],
        ContractType::LicenseAgreement => vec![
            h(
                "Licensor",
                record
                    .companies()
                    .first()
                    .and_then(|c| present(Some(c.as_str())))
                    .map(str::to_string),
            ),
            h("License Fee", money(record)),
            h(
                "Term",
                present(record.termination_date()).map(|d| format!("Until {}", format_date(d))),
            ),
        ],
        ContractType::PurchaseOrder => vec![
            h("Order Value", money(record)),
            h("Payment Terms", present(record.payment_terms()).map(str::to_string)),
            h("Delivery Date", present(record.termination_date()).map(format_date)),
        ],
    }
}

/// `Some` only for non-blank text.
fn present(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn parties(record: &ContractRecord) -> Option<String> {
    let names: Vec<&str> = record
        .companies()
        .iter()
        .filter_map(|c| present(Some(c.as_str())))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// `<amount> <currency>`, or whichever half is present.
fn money(record: &ContractRecord) -> Option<String> {
    let value = record.contract_value()?;
    let amount = value.amount.map(|a| a.to_string());
    let currency = present(value.currency.as_deref());
    match (amount, currency) {
        (Some(a), Some(c)) => Some(format!("{a} {c}")),
        (Some(a), None) => Some(a),
        (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}

fn duration(record: &ContractRecord) -> Option<String> {
    match (
        present(record.effective_date()),
        present(record.termination_date()),
    ) {
        (Some(start), Some(end)) => {
            let window = format!("From {} to {}", format_date(start), format_date(end));
            match (parse_date(start), parse_date(end)) {
                (Some(s), Some(e)) => Some(format!("{window} ({} days)", (e - s).num_days())),
                _ => Some(window),
            }
        }
        (Some(start), None) => Some(format!("From {}", format_date(start))),
        (None, Some(end)) => Some(format!("Until {}", format_date(end))),
        (None, None) => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE).ok()
}

/// `2024-01-05` → `January 5, 2024`; anything else verbatim.
fn format_date(s: &str) -> String {
    match parse_date(s) {
        Some(d) => d.format(DISPLAY_DATE).to_string(),
        None => s.trim().to_string(),
    }
}
