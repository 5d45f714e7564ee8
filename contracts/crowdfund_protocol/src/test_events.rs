extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger as _},
    token, vec, Address, Env, IntoVal, String, TryIntoVal, Val, Vec,
};

use crate::events::{FundsSent, PaymentMade, ProjectCreated, Refunded, RequestCreated};
use crate::{CrowdfundProtocol, CrowdfundProtocolClient};

fn setup() -> (Env, CrowdfundProtocolClient<'static>, token::StellarAssetClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let token_admin = Address::generate(&env);
    let token_address = env
        .register_stellar_asset_contract_v2(token_admin)
        .address();
    let contract_id = env.register(CrowdfundProtocol, (&token_address,));
    let client = CrowdfundProtocolClient::new(&env, &contract_id);
    let token_sac = token::StellarAssetClient::new(&env, &token_address);
    (env, client, token_sac)
}

#[test]
fn test_project_created_event() {
    let (env, client, _) = setup();
    let manager = Address::generate(&env);

    let id = client.create_project(&manager, &5_000, &86_400);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("created").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProjectCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectCreated {
            project_id: id,
            manager,
            target_amount: 5_000,
            deadline: 86_400,
        }
    );
}

#[test]
fn test_funds_sent_event() {
    let (env, client, token_sac) = setup();
    let manager = Address::generate(&env);
    let contributor = Address::generate(&env);
    let id = client.create_project(&manager, &5_000, &86_400);
    token_sac.mint(&contributor, &1_000);

    client.send_funds(&id, &contributor, &1_000);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![
        &env,
        symbol_short!("funded").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundsSent = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsSent {
            project_id: id,
            contributor,
            amount: 1_000,
        }
    );
}

#[test]
fn test_request_and_payment_events() {
    let (env, client, token_sac) = setup();
    let manager = Address::generate(&env);
    let contributor = Address::generate(&env);
    let recipient = Address::generate(&env);
    let id = client.create_project(&manager, &500, &86_400);
    token_sac.mint(&contributor, &1_000);
    client.send_funds(&id, &contributor, &1_000);

    let index = client.create_request(
        &id,
        &manager,
        &String::from_str(&env, "printing"),
        &recipient,
        &400,
    );

    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![
            &env,
            symbol_short!("request").into_val(&env),
            id.into_val(&env),
        ]
    );
    let created: RequestCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        created,
        RequestCreated {
            project_id: id,
            request_index: index,
            recipient: recipient.clone(),
            value: 400,
        }
    );

    client.make_payment(&id, &manager, &index);

    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("paid").into_val(&env), id.into_val(&env)]
    );
    let paid: PaymentMade = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        paid,
        PaymentMade {
            project_id: id,
            request_index: index,
            recipient,
            value: 400,
        }
    );
}

#[test]
fn test_refunded_event() {
    let (env, client, token_sac) = setup();
    let manager = Address::generate(&env);
    let contributor = Address::generate(&env);
    let id = client.create_project(&manager, &10_000, &60);
    token_sac.mint(&contributor, &250);
    client.send_funds(&id, &contributor, &250);

    env.ledger().with_mut(|li| li.timestamp += 60);
    client.refund(&id, &contributor);

    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![
            &env,
            symbol_short!("refunded").into_val(&env),
            id.into_val(&env),
        ]
    );
    let refunded: Refunded = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        refunded,
        Refunded {
            project_id: id,
            contributor,
            amount: 250,
        }
    );
}

#[test]
fn test_failed_call_publishes_nothing() {
    let (env, client, _) = setup();
    let manager = Address::generate(&env);
    let stranger = Address::generate(&env);
    let id = client.create_project(&manager, &10_000, &60);

    let result = client.try_create_request(
        &id,
        &stranger,
        &String::from_str(&env, "nope"),
        &stranger,
        &1,
    );
    assert!(result.is_err());

    let request_topics: Vec<Val> = vec![
        &env,
        symbol_short!("request").into_val(&env),
        id.into_val(&env),
    ];
    let published_request = env
        .events()
        .all()
        .iter()
        .any(|(_, topics, _)| topics == request_topics);
    assert!(!published_request);
}
