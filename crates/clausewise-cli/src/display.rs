//! Vertical card display for analyzed contracts.
//!
//! Renders a contract record and its classification view as a grouped,
//! human-readable card. Sections with no data are skipped.

use std::fmt::Write;

use clausewise_ai::ClassificationView;
use clausewise_core::ContractRecord;

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Print a contract as a vertical card grouped by section.
pub fn print_contract_card(record: &ContractRecord, view: &ClassificationView) {
    print!("{}", render_contract_card(record, view));
}

pub fn render_contract_card(record: &ContractRecord, view: &ClassificationView) -> String {
    let mut out = String::new();
    let _ = write_card(&mut out, record, view);
    out
}

fn write_card(
    out: &mut String,
    record: &ContractRecord,
    view: &ClassificationView,
) -> std::fmt::Result {
    writeln!(out, "=== {} ===", view.badge)?;
    writeln!(out, "{}", view.title)?;
    writeln!(out, "{}", view.description)?;
    if view.needs_manual_review {
        writeln!(out, "! Unrecognized contract type: manual review needed")?;
    }
    if view.has_high_risks {
        writeln!(out, "! High-risk terms flagged")?;
    }
    writeln!(out)?;

    if !view.highlights.is_empty() {
        writeln!(out, "Highlights")?;
        for h in &view.highlights {
            row(out, h.label, &h.value)?;
        }
        writeln!(out)?;
    }

    write_parties(out, record)?;
    write_dates(out, record)?;
    write_financial(out, record)?;
    write_obligations(out, record)?;
    write_governing_law(out, record)?;
    write_risks(out, record)?;
    Ok(())
}

// ── Key elements ──

fn write_parties(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    let companies = record.companies();
    let signatories = record.signatories();
    if companies.is_empty() && signatories.is_empty() {
        return Ok(());
    }

    writeln!(out, "Parties")?;
    if !companies.is_empty() {
        row(out, "companies", &companies.join(", "))?;
    }
    if !signatories.is_empty() {
        let lines = signatories.iter().map(|s| match (&s.name, &s.title) {
            (Some(n), Some(t)) => format!("{n} ({t})"),
            (Some(n), None) => n.clone(),
            (None, Some(t)) => format!("- ({t})"),
            (None, None) => "-".to_string(),
        });
        list(out, "signatories", lines.collect())?;
    }
    writeln!(out)
}

fn write_dates(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    let renewals = record.renewal_dates();
    if record.effective_date().is_none()
        && record.termination_date().is_none()
        && renewals.is_empty()
    {
        return Ok(());
    }

    writeln!(out, "Dates")?;
    if let Some(d) = record.effective_date() {
        row(out, "effective", d)?;
    }
    if let Some(d) = record.termination_date() {
        row(out, "termination", d)?;
    }
    if !renewals.is_empty() {
        row(out, "renewals", &renewals.join(", "))?;
    }
    writeln!(out)
}

fn write_financial(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    let value = record.contract_value().and_then(|v| match (v.amount, &v.currency) {
        (Some(a), Some(c)) => Some(format!("{a} {c}")),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(c)) => Some(c.clone()),
        (None, None) => None,
    });
    if value.is_none() && record.payment_terms().is_none() {
        return Ok(());
    }

    writeln!(out, "Financial")?;
    if let Some(v) = value {
        row(out, "contract value", &v)?;
    }
    if let Some(t) = record.payment_terms() {
        row(out, "payment terms", t)?;
    }
    writeln!(out)
}

fn write_obligations(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    let obligations = record.obligations();
    if obligations.is_empty() {
        return Ok(());
    }

    writeln!(out, "Obligations ({})", obligations.len())?;
    let lines = obligations
        .iter()
        .map(|o| {
            format!(
                "{}: {}",
                o.party.as_deref().unwrap_or("-"),
                o.commitment.as_deref().unwrap_or("-")
            )
        })
        .collect();
    bullets(out, lines)?;
    writeln!(out)
}

fn write_governing_law(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    if record.jurisdiction().is_none() && record.applicable_law().is_none() {
        return Ok(());
    }

    writeln!(out, "Governing Law")?;
    if let Some(j) = record.jurisdiction() {
        row(out, "jurisdiction", j)?;
    }
    if let Some(l) = record.applicable_law() {
        row(out, "applicable law", l)?;
    }
    writeln!(out)
}

// ── Risk analysis ──

fn write_risks(out: &mut String, record: &ContractRecord) -> std::fmt::Result {
    let non_standard = record.non_standard_clauses();
    let missing = record.missing_clauses();
    let unusual = record.unusual_terms();
    if non_standard.is_empty() && missing.is_empty() && unusual.is_empty() {
        return Ok(());
    }

    writeln!(out, "Risk Analysis")?;
    if !non_standard.is_empty() {
        let lines = non_standard
            .iter()
            .map(|c| with_note(c.clause.as_deref(), c.explanation.as_deref()))
            .collect();
        list(out, "non-standard clauses", lines)?;
    }
    if !missing.is_empty() {
        list(out, "missing clauses", missing.to_vec())?;
    }
    if !unusual.is_empty() {
        let lines = unusual
            .iter()
            .map(|t| with_note(t.term.as_deref(), t.concern.as_deref()))
            .collect();
        list(out, "unusual terms", lines)?;
    }
    writeln!(out)
}

// ── Helpers ──

fn row(out: &mut String, label: &str, value: &str) -> std::fmt::Result {
    writeln!(out, "  {:<26} {}", label, value)
}

fn list(out: &mut String, label: &str, items: Vec<String>) -> std::fmt::Result {
    writeln!(out, "  {} ({}):", label, items.len())?;
    bullets(out, items)
}

fn bullets(out: &mut String, items: Vec<String>) -> std::fmt::Result {
    let len = items.len();
    for item in items.iter().take(MAX_LIST_ITEMS) {
        writeln!(out, "    - {item}")?;
    }
    if len > MAX_LIST_ITEMS {
        writeln!(out, "    ... and {} more", len - MAX_LIST_ITEMS)?;
    }
    Ok(())
}

fn with_note(head: Option<&str>, note: Option<&str>) -> String {
    match (head, note) {
        (Some(h), Some(n)) => format!("{h}: {n}"),
        (Some(h), None) => h.to_string(),
        (None, Some(n)) => n.to_string(),
        (None, None) => "-".to_string(),
    }
}
