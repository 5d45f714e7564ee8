//! Per-project totals rebuilt from the indexed event stream.
//!
//! The contract is the source of truth; this is a read model for frontends
//! that would otherwise issue one RPC simulation per accessor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub manager: Option<String>,
    pub target_amount: Option<i128>,
    /// Outstanding contributions (sent minus refunded).
    pub raised_amount: i128,
    pub paid_out: i128,
    pub refunded: i128,
    /// Funds the contract still holds for the project.
    pub balance: i128,
    pub requests_created: u32,
    pub requests_paid: u32,
    /// Net outstanding contribution per contributor; fully refunded
    /// contributors are dropped.
    pub contributors: BTreeMap<String, i128>,
}

impl ProjectSummary {
    /// `true` once outstanding contributions cover the target.
    pub fn target_reached(&self) -> bool {
        self.target_amount
            .is_some_and(|target| self.raised_amount >= target)
    }
}

fn amount_of(event: &EventRecord) -> Result<i128> {
    let raw = event.amount.as_deref().ok_or_else(|| {
        IndexerError::EventParse(format!("event {} has no amount", event.id))
    })?;
    raw.parse().map_err(|_| {
        IndexerError::EventParse(format!("event {} has invalid amount {raw:?}", event.id))
    })
}

/// Fold `events` (ordered by ledger) into a [`ProjectSummary`].
pub fn summarize(project_id: &str, events: &[EventRecord]) -> Result<ProjectSummary> {
    let mut summary = ProjectSummary {
        project_id: project_id.to_string(),
        ..Default::default()
    };

    for event in events {
        match event.kind() {
            EventKind::ProjectCreated => {
                summary.manager = event.actor.clone();
                summary.target_amount = Some(amount_of(event)?);
            }
            EventKind::FundsSent => {
                let amount = amount_of(event)?;
                summary.raised_amount += amount;
                summary.balance += amount;
                if let Some(actor) = &event.actor {
                    *summary.contributors.entry(actor.clone()).or_default() += amount;
                }
            }
            EventKind::RequestCreated => summary.requests_created += 1,
            EventKind::PaymentMade => {
                let value = amount_of(event)?;
                summary.paid_out += value;
                summary.balance -= value;
                summary.requests_paid += 1;
            }
            EventKind::Refunded => {
                let amount = amount_of(event)?;
                summary.raised_amount -= amount;
                summary.balance -= amount;
                summary.refunded += amount;
                if let Some(actor) = &event.actor {
                    summary.contributors.remove(actor);
                }
            }
            EventKind::Unknown => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, kind: EventKind, actor: &str, amount: Option<&str>) -> EventRecord {
        EventRecord {
            id,
            event_id: Some(format!("evt-{id}")),
            event_type: kind.as_str().to_string(),
            project_id: Some("3".to_string()),
            actor: Some(actor.to_string()),
            amount: amount.map(String::from),
            ledger: 100 + id,
            timestamp: 1_700_000_000 + id,
            contract_id: "CONTRACT1".to_string(),
            tx_hash: Some(format!("TX{id}")),
            created_at: 0,
        }
    }

    #[test]
    fn summarize_full_lifecycle() {
        let events = vec![
            record(1, EventKind::ProjectCreated, "GMANAGER", Some("1000")),
            record(2, EventKind::FundsSent, "GALICE", Some("300")),
            record(3, EventKind::FundsSent, "GBOB", Some("200")),
            record(4, EventKind::FundsSent, "GALICE", Some("100")),
            record(5, EventKind::RequestCreated, "GSHOP", Some("250")),
            record(6, EventKind::PaymentMade, "GSHOP", Some("250")),
            record(7, EventKind::Refunded, "GBOB", Some("200")),
        ];

        let summary = summarize("3", &events).unwrap();

        assert_eq!(summary.manager.as_deref(), Some("GMANAGER"));
        assert_eq!(summary.target_amount, Some(1000));
        assert_eq!(summary.raised_amount, 400);
        assert_eq!(summary.paid_out, 250);
        assert_eq!(summary.refunded, 200);
        assert_eq!(summary.balance, 150);
        assert_eq!(summary.requests_created, 1);
        assert_eq!(summary.requests_paid, 1);
        assert_eq!(summary.contributors.len(), 1);
        assert_eq!(summary.contributors.get("GALICE"), Some(&400));
        assert!(!summary.target_reached());
    }

    #[test]
    fn summarize_ignores_unknown_events() {
        let events = vec![record(1, EventKind::Unknown, "GX", None)];
        let summary = summarize("3", &events).unwrap();
        assert_eq!(summary, ProjectSummary {
            project_id: "3".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn summarize_rejects_bad_amounts() {
        let events = vec![record(1, EventKind::FundsSent, "GALICE", Some("lots"))];
        assert!(matches!(
            summarize("3", &events),
            Err(IndexerError::EventParse(_))
        ));

        let events = vec![record(2, EventKind::Refunded, "GALICE", None)];
        assert!(summarize("3", &events).is_err());
    }

    #[test]
    fn target_reached_when_raised_meets_target() {
        let events = vec![
            record(1, EventKind::ProjectCreated, "GMANAGER", Some("500")),
            record(2, EventKind::FundsSent, "GALICE", Some("500")),
        ];
        assert!(summarize("3", &events).unwrap().target_reached());
    }
}
