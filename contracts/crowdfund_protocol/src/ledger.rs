//! # Ledger rules
//!
//! Pure fund-accounting transitions for a single project. Every function takes
//! the current values, checks all preconditions and returns the next values
//! without touching storage, so an entry point either commits the whole
//! result or returns an error having written nothing.

use crate::types::{ProjectConfig, ProjectState, Request};
use crate::Error;

/// Credit a contribution of `amount` made by an address currently holding
/// `contributed`. Returns the next state and the contributor's new total.
pub fn contribute(
    state: &ProjectState,
    contributed: i128,
    amount: i128,
) -> Result<(ProjectState, i128), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let contributed = contributed.checked_add(amount).ok_or(Error::Overflow)?;
    let next = ProjectState {
        raised_amount: state
            .raised_amount
            .checked_add(amount)
            .ok_or(Error::Overflow)?,
        balance: state.balance.checked_add(amount).ok_or(Error::Overflow)?,
        num_requests: state.num_requests,
    };
    Ok((next, contributed))
}

/// A refund is owed only once the deadline has elapsed, the target was
/// missed and the caller still has an outstanding contribution.
pub fn is_refund_eligible(
    config: &ProjectConfig,
    state: &ProjectState,
    contributed: i128,
    now: u64,
) -> bool {
    now >= config.deadline_at() && state.raised_amount < config.target_amount && contributed > 0
}

/// Return the state after refunding `contributed` in full.
pub fn refund(
    config: &ProjectConfig,
    state: &ProjectState,
    contributed: i128,
    now: u64,
) -> Result<ProjectState, Error> {
    if !is_refund_eligible(config, state, contributed, now) {
        return Err(Error::NotEligibleForRefund);
    }
    // Earlier payments may have spent part of what was raised.
    if contributed > state.balance {
        return Err(Error::InsufficientBalance);
    }

    Ok(ProjectState {
        raised_amount: state.raised_amount - contributed,
        balance: state.balance - contributed,
        num_requests: state.num_requests,
    })
}

/// Append a request. `value` is only checked against the balance when the
/// request is paid.
pub fn open_request(state: &ProjectState, value: i128) -> Result<(ProjectState, u32), Error> {
    if value < 0 {
        return Err(Error::InvalidAmount);
    }

    let index = state.num_requests;
    let next = ProjectState {
        num_requests: index.checked_add(1).ok_or(Error::Overflow)?,
        ..state.clone()
    };
    Ok((next, index))
}

/// Settle `request` against the held balance, returning the next state and
/// the completed request.
pub fn pay(state: &ProjectState, request: &Request) -> Result<(ProjectState, Request), Error> {
    if request.completed {
        return Err(Error::RequestAlreadyCompleted);
    }
    if request.value > state.balance {
        return Err(Error::InsufficientBalance);
    }

    let next = ProjectState {
        balance: state.balance - request.value,
        ..state.clone()
    };
    let paid = Request {
        completed: true,
        ..request.clone()
    };
    Ok((next, paid))
}

#[cfg(test)]
mod tests {
    use soroban_sdk::{testutils::Address as _, Address, Env, String};

    use super::*;

    fn config(env: &Env, target_amount: i128, deadline: u64) -> ProjectConfig {
        ProjectConfig {
            id: 0,
            manager: Address::generate(env),
            target_amount,
            deadline,
            created_at: 100,
        }
    }

    fn state(raised_amount: i128, balance: i128) -> ProjectState {
        ProjectState {
            raised_amount,
            balance,
            num_requests: 0,
        }
    }

    #[test]
    fn contribute_accumulates() {
        let (next, total) = contribute(&state(10, 10), 10, 5).unwrap();
        assert_eq!(next.raised_amount, 15);
        assert_eq!(next.balance, 15);
        assert_eq!(total, 15);
    }

    #[test]
    fn contribute_rejects_non_positive_amounts() {
        assert_eq!(contribute(&state(0, 0), 0, 0), Err(Error::InvalidAmount));
        assert_eq!(contribute(&state(0, 0), 0, -1), Err(Error::InvalidAmount));
    }

    #[test]
    fn contribute_detects_overflow() {
        assert_eq!(
            contribute(&state(i128::MAX, i128::MAX), 1, 1),
            Err(Error::Overflow)
        );
    }

    #[test]
    fn refund_requires_all_three_conditions() {
        let env = Env::default();
        let cfg = config(&env, 1_000, 50);

        // Deadline at 150.
        assert!(!is_refund_eligible(&cfg, &state(10, 10), 10, 149));
        assert!(is_refund_eligible(&cfg, &state(10, 10), 10, 150));
        // Target met.
        assert!(!is_refund_eligible(&cfg, &state(1_000, 1_000), 10, 500));
        // Nothing to return.
        assert!(!is_refund_eligible(&cfg, &state(10, 10), 0, 500));
    }

    #[test]
    fn refund_returns_full_contribution() {
        let env = Env::default();
        let cfg = config(&env, 1_000, 50);
        let next = refund(&cfg, &state(30, 30), 20, 200).unwrap();
        assert_eq!(next.raised_amount, 10);
        assert_eq!(next.balance, 10);
    }

    #[test]
    fn refund_fails_when_payments_drained_the_balance() {
        let env = Env::default();
        let cfg = config(&env, 1_000, 50);
        assert_eq!(
            refund(&cfg, &state(30, 5), 20, 200),
            Err(Error::InsufficientBalance)
        );
    }

    #[test]
    fn open_request_assigns_sequential_indices() {
        let (s1, first) = open_request(&state(0, 0), 10).unwrap();
        let (s2, second) = open_request(&s1, 1_000_000).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(s2.num_requests, 2);
        assert_eq!(open_request(&s2, -1), Err(Error::InvalidAmount));
    }

    #[test]
    fn pay_is_single_shot_and_bounded_by_balance() {
        let env = Env::default();
        let request = Request {
            description: String::from_str(&env, "tools"),
            recipient: Address::generate(&env),
            value: 40,
            completed: false,
        };

        assert_eq!(
            pay(&state(30, 30), &request),
            Err(Error::InsufficientBalance)
        );

        let (next, paid) = pay(&state(50, 50), &request).unwrap();
        assert_eq!(next.balance, 10);
        assert_eq!(next.raised_amount, 50);
        assert!(paid.completed);
        assert_eq!(pay(&next, &paid), Err(Error::RequestAlreadyCompleted));
    }
}
