//! Property tests for the replay engine's convergence invariants, using
//! `proptest` for "fold in any order, check convergence" style coverage.

mod common;

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Duration;

use common::{account_group, multimember_group, pk, StubSecretStore};
use groupindex::registry::contact::ContactState;
use groupindex::{GroupMetadataIndex, MemberDeviceBinding, VecEventLog, WireEvent};
use proptest::prelude::*;

fn own_binding() -> MemberDeviceBinding {
    MemberDeviceBinding {
        member_pk: pk(1),
        device_pk: pk(10),
    }
}

fn push_all(log: &mut VecEventLog, events: &[WireEvent]) {
    for e in events {
        log.push(e.to_bytes().unwrap());
    }
}

fn arb_byte() -> impl Strategy<Value = u8> {
    1u8..=250
}

// ---------------------------------------------------------------------------
// Invariant 1: member/device registry is order-independent.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn invariant1_member_device_registry_is_order_independent(
        pairs in prop::collection::vec((arb_byte(), arb_byte()), 1..20)
    ) {
        // Distinct device keys by construction index, distinct member keys
        // from the generated byte (collisions are fine: multiple devices
        // can share a member).
        let events: Vec<WireEvent> = pairs
            .iter()
            .enumerate()
            .map(|(i, (member_byte, _))| WireEvent::GroupMemberDeviceAdded {
                member_pk: pk(*member_byte).0,
                device_pk: pk((i as u8).wrapping_add(200)).0,
            })
            .collect();

        let mut forward = VecEventLog::new();
        push_all(&mut forward, &events);

        let mut reversed_events = events.clone();
        reversed_events.reverse();
        let mut backward = VecEventLog::new();
        push_all(&mut backward, &reversed_events);

        let idx_a = GroupMetadataIndex::new(multimember_group(pk(99)), own_binding(), StubSecretStore);
        idx_a.update_index(&forward).unwrap();
        let idx_b = GroupMetadataIndex::new(multimember_group(pk(99)), own_binding(), StubSecretStore);
        idx_b.update_index(&backward).unwrap();

        prop_assert_eq!(idx_a.member_count(), idx_b.member_count());
        prop_assert_eq!(idx_a.device_count(), idx_b.device_count());
        prop_assert_eq!(idx_a.device_count(), events.len());

        // Every device appears under exactly the member that added it, and
        // each member's device list contains exactly its own devices.
        for (i, (member_byte, _)) in pairs.iter().enumerate() {
            let device = pk((i as u8).wrapping_add(200));
            prop_assert_eq!(idx_a.member_of(&device).unwrap(), pk(*member_byte));
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: contact state reflects the newest event in log order.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn invariant2_contact_state_reflects_newest_event(
        // A sequence of (state tag 0..=6) applied oldest-first; the
        // newest (last-appended) entry must win.
        tags in prop::collection::vec(0u8..7, 1..12)
    ) {
        let contact = pk(0x42);
        let mut log = VecEventLog::new();
        let events: Vec<WireEvent> = tags
            .iter()
            .map(|t| match t {
                0 => WireEvent::ContactRequestOutgoingEnqueued {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
                1 => WireEvent::ContactRequestOutgoingSent {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
                2 => WireEvent::ContactRequestIncomingReceived {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
                3 => WireEvent::ContactRequestIncomingDiscarded {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
                4 => WireEvent::ContactRequestIncomingAccepted {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
                5 => WireEvent::ContactBlocked { contact_pk: contact.0 },
                _ => WireEvent::ContactUnblocked {
                    contact_pk: contact.0, metadata: None, rendezvous_seed: None,
                },
            })
            .collect();
        push_all(&mut log, &events);

        let expected = match tags.last().unwrap() {
            0 => ContactState::ToRequest,
            1 => ContactState::Added,
            2 => ContactState::Received,
            3 => ContactState::Discarded,
            4 => ContactState::Added,
            5 => ContactState::Blocked,
            _ => ContactState::Removed,
        };

        let index = GroupMetadataIndex::new(account_group(pk(1)), own_binding(), StubSecretStore);
        index.update_index(&log).unwrap();

        prop_assert_eq!(index.get_contact(&contact).unwrap().state, expected);
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: a removed service token never reappears, regardless of
// where in the log the (re-)add lands relative to the remove.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn invariant5_tombstoned_token_never_resurfaces(
        remove_before_add in any::<bool>(),
        extra_adds in 0usize..4,
    ) {
        let mut log = VecEventLog::new();
        let add = WireEvent::ServiceTokenAdded { token_id: "T".into(), payload: vec![9] };
        let remove = WireEvent::ServiceTokenRemoved { token_id: "T".into() };

        if remove_before_add {
            log.push(add.to_bytes().unwrap());
            log.push(remove.to_bytes().unwrap());
        } else {
            log.push(remove.to_bytes().unwrap());
            log.push(add.to_bytes().unwrap());
        }
        for _ in 0..extra_adds {
            log.push(add.to_bytes().unwrap());
        }

        let index = GroupMetadataIndex::new(account_group(pk(1)), own_binding(), StubSecretStore);
        index.update_index(&log).unwrap();

        prop_assert!(index.list_service_tokens().is_empty());
    }
}

// ---------------------------------------------------------------------------
// Invariant 6: two replays over the same log converge to the same
// observable state.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn invariant6_replay_is_deterministic(
        member_bytes in prop::collection::vec(arb_byte(), 1..10)
    ) {
        let mut log = VecEventLog::new();
        let events: Vec<WireEvent> = member_bytes
            .iter()
            .enumerate()
            .map(|(i, b)| WireEvent::GroupMemberDeviceAdded {
                member_pk: pk(*b).0,
                device_pk: pk((i as u8).wrapping_add(200)).0,
            })
            .collect();
        push_all(&mut log, &events);

        let index = GroupMetadataIndex::new(multimember_group(pk(99)), own_binding(), StubSecretStore);
        index.update_index(&log).unwrap();
        let first_count = index.member_count();
        let first_devices: HashSet<_> = index.other_members_devices().into_iter().collect();

        index.update_index(&log).unwrap();
        prop_assert_eq!(index.member_count(), first_count);
        let second_devices: HashSet<_> = index.other_members_devices().into_iter().collect();
        prop_assert_eq!(first_devices, second_devices);
    }
}

// ---------------------------------------------------------------------------
// Invariant 7: query results are independent copies.
// ---------------------------------------------------------------------------

#[test]
fn invariant7_query_results_are_independent_copies() {
    let mut log = VecEventLog::new();
    log.push(
        WireEvent::GroupMemberDeviceAdded {
            member_pk: pk(1).0,
            device_pk: pk(10).0,
        }
        .to_bytes()
        .unwrap(),
    );
    let index = GroupMetadataIndex::new(multimember_group(pk(99)), own_binding(), StubSecretStore);
    index.update_index(&log).unwrap();

    let mut devices = index.devices_of(&pk(1)).unwrap();
    devices.push(pk(255));
    // Mutating the returned Vec must not affect the index's own state.
    assert_eq!(index.devices_of(&pk(1)).unwrap(), vec![pk(10)]);
    let _ = devices;
}

// ---------------------------------------------------------------------------
// Invariant 8: update_index never deadlocks (handlers never reacquire the
// write lease). Bounded with a channel timeout rather than an infinite join.
// ---------------------------------------------------------------------------

#[test]
fn invariant8_update_index_does_not_deadlock() {
    let mut log = VecEventLog::new();
    for i in 0..50u8 {
        log.push(
            WireEvent::GroupMemberDeviceAdded {
                member_pk: pk(i).0,
                device_pk: pk(i.wrapping_add(100)).0,
            }
            .to_bytes()
            .unwrap(),
        );
    }

    let index = std::sync::Arc::new(GroupMetadataIndex::new(
        multimember_group(pk(99)),
        own_binding(),
        StubSecretStore,
    ));
    let (tx, rx) = mpsc::channel();
    let worker_index = index.clone();
    std::thread::spawn(move || {
        let result = worker_index.update_index(&log);
        let _ = tx.send(result.is_ok());
    });

    match rx.recv_timeout(Duration::from_secs(5)) {
        Ok(ok) => assert!(ok),
        Err(_) => panic!("update_index did not return within the timeout, possible deadlock"),
    }
}
