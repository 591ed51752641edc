//! Payment method/account resolution on a destination ledger.
//!
//! Picks the binding a payment should use once it moves, then the outstanding
//! account: the binding's own account first, the company default second.

use rejournal_shared::types::AccountId;
use serde::{Deserialize, Serialize};

use super::error::ResolutionError;
use crate::books::{Company, Ledger, PaymentMethodBinding, PaymentRecord};

/// Which fallback step selected the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMatch {
    /// Same method code, with an outstanding account.
    SameCodeWithAccount,
    /// Same method code, without an account.
    SameCode,
    /// Different code, with an outstanding account.
    AnyWithAccount,
    /// First applicable binding.
    FirstApplicable,
}

/// Where the outstanding account came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSource {
    /// Configured on the binding.
    Binding,
    /// Company default for the payment direction.
    CompanyDefault,
}

/// A compatible pairing on the destination ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Selected binding.
    pub binding: PaymentMethodBinding,
    /// How the binding was matched.
    pub matched_by: BindingMatch,
    /// Outstanding account to use.
    pub outstanding_account_id: AccountId,
    /// Where the account came from.
    pub account_source: AccountSource,
}

/// Stateless resolver for payment method bindings.
pub struct CompatibilityResolver;

impl CompatibilityResolver {
    /// Resolves the binding and outstanding account for `payment` on `destination`.
    ///
    /// Among bindings applicable to the payment's direction, in configuration order:
    /// 1. same code as the current binding, with an outstanding account
    /// 2. same code, with or without account
    /// 3. any binding with an outstanding account
    /// 4. the first applicable binding
    ///
    /// A binding without an account falls back to `company`'s default account for the
    /// payment's direction. Without a default, the first applicable binding carrying an
    /// account is used instead.
    ///
    /// # Errors
    ///
    /// - `NoApplicableMethod` if no binding supports the payment's direction
    /// - `NoOutstandingAccount` if no applicable binding has an account and the company
    ///   has no default
    pub fn resolve(
        payment: &PaymentRecord,
        destination: &Ledger,
        company: Option<&Company>,
    ) -> Result<Resolution, ResolutionError> {
        let (binding, matched_by) = Self::select_binding(payment, destination).ok_or_else(|| {
            ResolutionError::NoApplicableMethod {
                ledger: destination.name.clone(),
                direction: payment.direction,
            }
        })?;
        let company_default =
            company.and_then(|c| c.default_outstanding_account(payment.direction));

        let (binding, matched_by, outstanding_account_id, account_source) =
            match (binding.outstanding_account_id, company_default) {
                (Some(account), _) => (binding, matched_by, account, AccountSource::Binding),
                (None, Some(account)) => {
                    (binding, matched_by, account, AccountSource::CompanyDefault)
                }
                (None, None) => destination
                    .bindings_for(payment.direction)
                    .find_map(|b| b.outstanding_account_id.map(|account| (b, account)))
                    .map(|(b, account)| {
                        (b, BindingMatch::AnyWithAccount, account, AccountSource::Binding)
                    })
                    .ok_or_else(|| ResolutionError::NoOutstandingAccount {
                        ledger: destination.name.clone(),
                        code: binding.code.clone(),
                        direction: payment.direction,
                    })?,
            };

        Ok(Resolution {
            binding: binding.clone(),
            matched_by,
            outstanding_account_id,
            account_source,
        })
    }

    /// Runs the binding fallback search without looking at company defaults.
    #[must_use]
    pub fn select_binding<'a>(
        payment: &PaymentRecord,
        destination: &'a Ledger,
    ) -> Option<(&'a PaymentMethodBinding, BindingMatch)> {
        let applicable: Vec<&'a PaymentMethodBinding> =
            destination.bindings_for(payment.direction).collect();

        if let Some(code) = payment.method_code.as_deref() {
            if let Some(binding) = first_match(&applicable, |b| b.code == code && has_account(b)) {
                return Some((binding, BindingMatch::SameCodeWithAccount));
            }
            if let Some(binding) = first_match(&applicable, |b| b.code == code) {
                return Some((binding, BindingMatch::SameCode));
            }
        }

        if let Some(binding) = first_match(&applicable, has_account) {
            return Some((binding, BindingMatch::AnyWithAccount));
        }

        applicable
            .first()
            .map(|binding| (*binding, BindingMatch::FirstApplicable))
    }
}

fn first_match<'a>(
    bindings: &[&'a PaymentMethodBinding],
    predicate: impl Fn(&PaymentMethodBinding) -> bool,
) -> Option<&'a PaymentMethodBinding> {
    bindings.iter().copied().find(|binding| predicate(*binding))
}

fn has_account(binding: &PaymentMethodBinding) -> bool {
    binding.outstanding_account_id.is_some()
}
