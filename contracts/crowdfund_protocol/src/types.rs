//! # Types
//!
//! Data structures shared by the registry, the project ledger and storage.
//!
//! ## Config / State split
//!
//! A project is stored as two separate ledger entries:
//!
//! - [`ProjectConfig`]: written once by `create_project`; never mutated.
//! - [`ProjectState`]: rewritten on every contribution, payment, refund and
//!   request creation.
//!
//! Contributions and requests live in their own keyed entries so that the
//! per-project entries stay small no matter how many contributors a campaign
//! attracts. The public API exposes the reconstructed [`Project`] view.
//!
//! ## Request lifecycle
//!
//! ```text
//! Pending (completed = false) ──make_payment──► Completed (completed = true)
//! ```
//!
//! `Completed` is terminal; a request is paid at most once.

use soroban_sdk::{contracttype, Address, String};

/// Immutable project configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub manager: Address,
    pub target_amount: i128,
    /// Seconds after `created_at` at which refunds may open.
    pub deadline: u64,
    pub created_at: u64,
}

impl ProjectConfig {
    /// Absolute ledger timestamp at which the deadline elapses.
    ///
    /// `create_project` rejects deadlines for which this would overflow.
    pub fn deadline_at(&self) -> u64 {
        self.created_at.saturating_add(self.deadline)
    }
}

/// Mutable project state.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProjectState {
    /// Sum of all outstanding contributions.
    pub raised_amount: i128,
    /// Funds currently held for this project (raised minus paid out).
    pub balance: i128,
    pub num_requests: u32,
}

/// Full representation of a crowdfunding project.
///
/// Returned by `get_project`; reconstructed from the split
/// `ProjectConfig` + `ProjectState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Registry index (auto-incremented).
    pub id: u64,
    /// Account that created the project; the only one allowed to spend.
    pub manager: Address,
    /// Amount the campaign has to raise to avoid refunds.
    pub target_amount: i128,
    /// Relative deadline in seconds.
    pub deadline: u64,
    /// Ledger timestamp of creation.
    pub created_at: u64,
    /// Outstanding contributions.
    pub raised_amount: i128,
    /// Funds currently held.
    pub balance: i128,
    /// Number of spend requests created so far.
    pub num_requests: u32,
}

impl Project {
    pub fn from_parts(config: ProjectConfig, state: ProjectState) -> Self {
        Project {
            id: config.id,
            manager: config.manager,
            target_amount: config.target_amount,
            deadline: config.deadline,
            created_at: config.created_at,
            raised_amount: state.raised_amount,
            balance: state.balance,
            num_requests: state.num_requests,
        }
    }
}

/// A manager-created spend request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub description: String,
    pub recipient: Address,
    pub value: i128,
    pub completed: bool,
}
