use crate::models::{BookingStatus, PaymentStatus};

/// Validates booking state transitions before anything is persisted.
///
/// Both axes are explicit transition tables rather than set-membership
/// checks: a request may name a perfectly valid status that is still not
/// reachable from the current one. Same-state updates are accepted as
/// idempotent no-ops so retried admin actions do not error.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Unknown room type: {0}")]
    UnknownRoomType(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Transition: status axis. Cancelled and completed are terminal.
pub fn check_status_transition(
    current: BookingStatus,
    requested: BookingStatus,
) -> Result<(), LifecycleError> {
    if current == requested {
        return Ok(());
    }

    let allowed = match current {
        BookingStatus::Pending => matches!(
            requested,
            BookingStatus::Confirmed | BookingStatus::Cancelled
        ),
        BookingStatus::Confirmed => matches!(
            requested,
            BookingStatus::Completed | BookingStatus::Cancelled
        ),
        BookingStatus::Cancelled | BookingStatus::Completed => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            from: current.to_string(),
            to: requested.to_string(),
        })
    }
}

/// Transition: payment axis. Refunds only follow a successful payment;
/// a failed attempt may be retried straight to paid.
pub fn check_payment_transition(
    current: PaymentStatus,
    requested: PaymentStatus,
) -> Result<(), LifecycleError> {
    if current == requested {
        return Ok(());
    }

    let allowed = match current {
        PaymentStatus::Pending => {
            matches!(requested, PaymentStatus::Paid | PaymentStatus::Failed)
        }
        PaymentStatus::Failed => matches!(requested, PaymentStatus::Paid),
        PaymentStatus::Paid => matches!(requested, PaymentStatus::Refunded),
        PaymentStatus::Refunded => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            from: current.to_string(),
            to: requested.to_string(),
        })
    }
}
