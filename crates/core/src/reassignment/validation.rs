//! Pre-flight checks gating a journal change.

use super::error::BlockingError;
use super::types::ReassignmentRequest;

/// Validates that a batch change can be attempted.
///
/// Checks, in order, stopping at the first failure:
/// 1. At least one entry is selected
/// 2. A destination ledger is set
/// 3. At least one entry is not already on the destination
/// 4. No posted entry is sealed by the hash chain, unless the change is forced
///
/// Never writes anything.
///
/// # Errors
///
/// Returns the first `BlockingError` encountered.
pub fn validate(request: &ReassignmentRequest) -> Result<(), BlockingError> {
    if request.entries.is_empty() {
        return Err(BlockingError::EmptySelection);
    }

    let Some(destination) = request.destination.as_ref() else {
        return Err(BlockingError::NoDestination);
    };

    if request
        .entries
        .iter()
        .all(|entry| entry.ledger_id == destination.id)
    {
        return Err(BlockingError::AllAlreadyInTarget {
            ledger: destination.name.clone(),
        });
    }

    if !request.force_change
        && let Some(entry) = request.entries.iter().find(|entry| entry.is_sealed())
    {
        return Err(BlockingError::LockedBySeal {
            entry_id: entry.id,
            entry: entry.display_name().to_string(),
        });
    }

    Ok(())
}
