#![allow(dead_code)]

extern crate std;

use soroban_sdk::{token, Address, Vec};

use crate::types::Project;
use crate::CrowdfundProtocolClient;

/// Held balance is never negative.
pub fn assert_balance_non_negative(project: &Project) {
    assert!(
        project.balance >= 0,
        "project {} has negative balance ({})",
        project.id,
        project.balance
    );
}

/// `raised_amount` equals the sum of every contributor's outstanding entry.
///
/// `contributors` must list every address that ever contributed.
pub fn assert_raised_matches_contributions(
    client: &CrowdfundProtocolClient,
    project_id: u64,
    contributors: &[Address],
) {
    let sum: i128 = contributors
        .iter()
        .map(|c| client.fund_contributors(&project_id, c))
        .sum();
    let raised = client.raised_amount(&project_id);
    assert_eq!(
        raised, sum,
        "project {project_id}: raised_amount {raised} != sum of contributions {sum}"
    );
}

/// The tokens held by the contract are exactly the sum of all project balances.
pub fn assert_token_balance_reconciles(client: &CrowdfundProtocolClient, token: &token::Client) {
    let held: i128 = client
        .all_projects()
        .iter()
        .map(|id| client.get_balance(&id))
        .sum();
    let actual = token.balance(&client.address);
    assert_eq!(
        actual, held,
        "contract holds {actual} tokens but projects account for {held}"
    );
}

/// `num_requests` matches the number of stored requests.
pub fn assert_request_count_matches(client: &CrowdfundProtocolClient, project_id: u64) {
    let count = client.num_requests(&project_id);
    let requests = client.all_requests(&project_id);
    assert_eq!(
        requests.len(),
        count,
        "project {project_id}: num_requests {count} but {} stored",
        requests.len()
    );
}

/// Registry entries are sequential starting from 0.
pub fn assert_sequential_ids(ids: &Vec<u64>) {
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(id, i as u64, "expected project id {i}, got {id}");
    }
}

/// Fields fixed at creation never change.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "project id changed");
    assert_eq!(original.manager, current.manager, "project manager changed");
    assert_eq!(
        original.target_amount, current.target_amount,
        "project target_amount changed"
    );
    assert_eq!(original.deadline, current.deadline, "project deadline changed");
    assert_eq!(
        original.created_at, current.created_at,
        "project created_at changed"
    );
}

/// Run the invariants that only need the client.
pub fn assert_all_project_invariants(
    client: &CrowdfundProtocolClient,
    project_id: u64,
    contributors: &[Address],
) {
    assert_balance_non_negative(&client.get_project(&project_id));
    assert_raised_matches_contributions(client, project_id, contributors);
    assert_request_count_matches(client, project_id);
}
