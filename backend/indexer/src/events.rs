//! Event types emitted by the crowdfund contract, as seen off-chain.
//!
//! These mirror the contract events defined in
//! `contracts/crowdfund_protocol/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A project was registered (`created` topic).
    ProjectCreated,
    /// A contributor sent funds (`funded` topic).
    FundsSent,
    /// The manager opened a spend request (`request` topic).
    RequestCreated,
    /// A request was paid out (`paid` topic).
    PaymentMade,
    /// A contributor was refunded (`refunded` topic).
    Refunded,
    /// An event from this contract that we don't recognise.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "funded" => Self::FundsSent,
            "request" => Self::RequestCreated,
            "paid" => Self::PaymentMade,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::FundsSent => "funds_sent",
            Self::RequestCreated => "request_created",
            Self::PaymentMade => "payment_made",
            Self::Refunded => "refunded",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "project_created" => Self::ProjectCreated,
            "funds_sent" => Self::FundsSent,
            "request_created" => Self::RequestCreated,
            "payment_made" => Self::PaymentMade,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        }
    }

    /// Data fields holding the acting address and the amount, in lookup order.
    pub fn data_fields(&self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Self::ProjectCreated => (&["manager", "address"], &["target_amount"]),
            Self::FundsSent | Self::Refunded => (&["contributor", "address"], &["amount"]),
            Self::RequestCreated | Self::PaymentMade => (&["recipient", "address"], &["value"]),
            Self::Unknown => (&[], &[]),
        }
    }
}

/// A decoded contract event, ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdfundEvent {
    /// RPC-assigned event identifier; unique per event.
    pub event_id: Option<String>,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: Option<String>,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }
}
