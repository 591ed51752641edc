//! Pre-flight risk analysis for a journal change.
//!
//! Pure: recomputed on every input change of the change form, never writes.

use std::collections::{BTreeSet, HashSet};

use super::types::{ReassignmentRequest, Severity, Warning};
use crate::books::{EntryState, Ledger, LedgerEntry, LedgerKind, PaymentRecord};

/// Stateless analyzer producing warnings for a candidate batch.
pub struct RiskAnalyzer;

impl RiskAnalyzer {
    /// Produces every warning that applies to `request`, in display order.
    ///
    /// Checks are independent of each other. The ledger-kind check reports only
    /// the first mismatching entry and the payment checks stop at the first
    /// payment that cannot be moved.
    #[must_use]
    pub fn analyze(request: &ReassignmentRequest) -> Vec<Warning> {
        let mut warnings = Vec::new();
        let entries = &request.entries;

        if entries.is_empty() {
            warnings.push(Warning::info("No moves selected"));
        }

        if request.destination.is_some() {
            let posted = entries
                .iter()
                .filter(|e| e.state == EntryState::Posted)
                .count();
            if posted > 0 {
                warnings.push(Warning::warning(format!(
                    "{posted} move(s) are posted. Changing the journal of posted moves \
                     may affect accounting integrity."
                )));
            }

            let sealed = entries.iter().filter(|e| e.is_sealed()).count();
            if sealed > 0 {
                warnings.push(if request.force_change {
                    Warning::warning(format!(
                        "{sealed} move(s) are locked by hash and will be changed anyway."
                    ))
                } else {
                    Warning::error(format!(
                        "{sealed} move(s) are locked by hash. Use 'Force Change' to move them."
                    ))
                });
            }
        }

        let sources: HashSet<_> = entries.iter().map(|e| e.ledger_id).collect();
        if sources.len() > 1 {
            warnings.push(Warning::info(format!(
                "Selected moves come from {} different journals.",
                sources.len()
            )));
        }

        let reconciled = entries.iter().filter(|e| e.has_reconciled_lines()).count();
        if reconciled > 0 {
            warnings.push(Warning::warning(format!(
                "{reconciled} move(s) have reconciled lines. \
                 This operation will not unreconcile them."
            )));
        }

        let types: BTreeSet<&str> = entries.iter().map(|e| e.entry_type.as_str()).collect();
        if types.len() > 1 {
            warnings.push(Warning::info(format!(
                "Selected moves have different types: {}.",
                types.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        if let Some(destination) = request.destination.as_ref() {
            if let Some(warning) = Self::kind_mismatch(request, destination) {
                warnings.push(warning);
            }

            if !request.payments.is_empty() {
                warnings.push(Warning::info(format!(
                    "{} payment(s) linked to these moves will also change journal.",
                    request.payments.len()
                )));
            }

            if let Some(warning) = request
                .payments
                .iter()
                .find_map(|payment| Self::payment_blocker(request, payment, destination))
            {
                warnings.push(warning);
            }
        }

        warnings
    }

    /// Renders warnings as the HTML list shown on the change form.
    ///
    /// Returns `None` when there is nothing to show.
    #[must_use]
    pub fn render_html(warnings: &[Warning]) -> Option<String> {
        if warnings.is_empty() {
            return None;
        }

        let items: String = warnings
            .iter()
            .map(|w| {
                let label = match w.severity {
                    Severity::Info => "Info",
                    Severity::Warning => "Warning",
                    Severity::Error => "Error",
                };
                format!("<li><b>{label}:</b> {}</li>", escape_html(&w.message))
            })
            .collect();

        Some(format!("<ul>{items}</ul>"))
    }

    fn kind_mismatch(request: &ReassignmentRequest, destination: &Ledger) -> Option<Warning> {
        request.entries.iter().find_map(|entry| {
            let expected = Self::expected_kind(request, entry)?;
            (expected != destination.kind).then(|| {
                Warning::warning(format!(
                    "Move {} has type '{}' but target journal type is '{}'. \
                     This may cause issues.",
                    entry.display_name(),
                    entry.entry_type,
                    destination.kind
                ))
            })
        })
    }

    /// Misc entries have no kind of their own; they are held to their current ledger's.
    fn expected_kind(request: &ReassignmentRequest, entry: &LedgerEntry) -> Option<LedgerKind> {
        entry.entry_type.ledger_kind().or_else(|| {
            request
                .source_ledgers
                .get(&entry.ledger_id)
                .map(|ledger| ledger.kind)
        })
    }

    fn payment_blocker(
        request: &ReassignmentRequest,
        payment: &PaymentRecord,
        destination: &Ledger,
    ) -> Option<Warning> {
        let mut applicable = destination.bindings_for(payment.direction).peekable();

        if applicable.peek().is_none() {
            return Some(Warning::error(format!(
                "Payment {} cannot change journal: journal '{}' has no {} payment method.",
                payment.name, destination.name, payment.direction
            )));
        }

        let binding_has_account = applicable.any(|b| b.outstanding_account_id.is_some());
        let company_has_default = request
            .destination_company
            .as_ref()
            .and_then(|c| c.default_outstanding_account(payment.direction))
            .is_some();

        (!binding_has_account && !company_has_default).then(|| {
            Warning::error(format!(
                "Payment {} cannot change journal: no payment method on journal '{}' has an \
                 outstanding account and the company has no default {} outstanding account.",
                payment.name, destination.name, payment.direction
            ))
        })
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
