//! Pure order lifecycle rules. No I/O here: the store consults these before
//! it touches the remote service, so an invalid transition never leaves the
//! process.

use crate::domain::{OrderStatus, PaymentMethod};
use crate::error::StoreError;

/// Whether `from -> to` is one of the four permitted transitions.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    if from.is_terminal() {
        return false;
    }
    matches!(
        (from, to),
        (New, Processing) | (New, Cancelled) | (Processing, Completed) | (Processing, Cancelled)
    )
}

/// Validates a requested transition, failing closed on anything outside the
/// state machine.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), StoreError> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        Err(StoreError::InvalidTransition { from, to })
    }
}

/// Resolves the payment method an order carries after reaching `target`.
///
/// Completion requires one; every other state carries none, cancelled orders
/// included.
pub fn payment_for(
    target: OrderStatus,
    payment: Option<PaymentMethod>,
) -> Result<Option<PaymentMethod>, StoreError> {
    match target {
        OrderStatus::Completed => payment.map(Some).ok_or(StoreError::PaymentRequired),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 4] = [New, Processing, Completed, Cancelled];

    #[test]
    fn valid_transitions_pass() {
        for (from, to) in [
            (New, Processing),
            (New, Cancelled),
            (Processing, Completed),
            (Processing, Cancelled),
        ] {
            assert!(validate_transition(from, to).is_ok(), "{} -> {}", from, to);
        }
    }

    #[test]
    fn everything_else_fails_closed() {
        let valid = [
            (New, Processing),
            (New, Cancelled),
            (Processing, Completed),
            (Processing, Cancelled),
        ];
        for from in ALL {
            for to in ALL {
                if valid.contains(&(from, to)) {
                    continue;
                }
                assert_eq!(
                    validate_transition(from, to),
                    Err(StoreError::InvalidTransition { from, to }),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Completed, Cancelled] {
            for to in ALL {
                assert!(!is_valid_transition(from, to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn completion_requires_payment() {
        assert_eq!(payment_for(Completed, None), Err(StoreError::PaymentRequired));
        assert_eq!(
            payment_for(Completed, Some(PaymentMethod::Cash)),
            Ok(Some(PaymentMethod::Cash))
        );
    }

    #[test]
    fn non_completion_carries_no_payment() {
        assert_eq!(payment_for(Cancelled, Some(PaymentMethod::Gpay)), Ok(None));
        assert_eq!(payment_for(Processing, None), Ok(None));
    }
}
