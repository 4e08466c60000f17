//! Registration transition rules.
//!
//! These are pure decisions over a snapshot of the current registration row;
//! the caller loads the row, asks for a plan, and applies it. The checks are
//! read-then-write without locks, so concurrent callers can both pass the
//! capacity check (accepted limitation of the current schema).

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::RegistrationStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("status must be one of interested, pending_payment or confirmed")]
    NotSelfService,

    #[error("cannot downgrade a confirmed registration")]
    CannotDowngrade,

    #[error("registration is already cancelled")]
    AlreadyCancelled,

    #[error("attendance can only be recorded once the event has started")]
    EventNotStarted,

    #[error("capacity reached")]
    CapacityReached,
}

/// What the caller should do to the registration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAction {
    Create(RegistrationStatus),
    Replace(RegistrationStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAction {
    /// Interested rows are removed outright so the user can re-toggle freely.
    DeleteRow,
    /// Anything further along keeps a cancelled row for history.
    MarkCancelled,
}

/// Plan a user-initiated register call.
///
/// The user may only ask for interested, pending_payment or confirmed.
/// Cancelled and rejected rows are overwritten as a fresh start; the single
/// forbidden move is confirmed -> interested.
pub fn plan_register(
    existing: Option<RegistrationStatus>,
    requested: RegistrationStatus,
) -> Result<RegisterAction, TransitionError> {
    use RegistrationStatus::*;

    if !matches!(requested, Interested | PendingPayment | Confirmed) {
        return Err(TransitionError::NotSelfService);
    }

    match existing {
        None => Ok(RegisterAction::Create(requested)),
        Some(Cancelled) | Some(Rejected) => Ok(RegisterAction::Replace(requested)),
        Some(Confirmed) if requested == Interested => Err(TransitionError::CannotDowngrade),
        Some(_) => Ok(RegisterAction::Replace(requested)),
    }
}

/// Plan a user-initiated cancellation of an existing row.
pub fn plan_cancel(existing: RegistrationStatus) -> Result<CancelAction, TransitionError> {
    match existing {
        RegistrationStatus::Cancelled => Err(TransitionError::AlreadyCancelled),
        RegistrationStatus::Interested => Ok(CancelAction::DeleteRow),
        _ => Ok(CancelAction::MarkCancelled),
    }
}

/// Validate a manager-initiated status update.
///
/// Managers may set any status, including moving backwards; the only guards
/// are that attendance outcomes wait for the event's calendar start date
/// (time of day ignored) and that confirmations respect capacity.
pub fn check_manager_transition(
    target: RegistrationStatus,
    event_start_date: NaiveDate,
    today: NaiveDate,
    confirmed_count: i64,
    capacity: Option<i32>,
) -> Result<(), TransitionError> {
    match target {
        RegistrationStatus::Attended | RegistrationStatus::NoShow => {
            if today < event_start_date {
                return Err(TransitionError::EventNotStarted);
            }
        }
        RegistrationStatus::Confirmed => {
            if let Some(cap) = capacity {
                if confirmed_count >= cap as i64 {
                    return Err(TransitionError::CapacityReached);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Ratings require a prior attended registration for the (user, event) pair.
pub fn can_rate(existing: Option<RegistrationStatus>) -> bool {
    existing == Some(RegistrationStatus::Attended)
}
