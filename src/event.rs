//! Event decoder (C1).
//!
//! Parses one log entry, bound to the group descriptor it belongs to, into a
//! typed [`Event`]. The split mirrors an outer envelope naming the tag with
//! an inner CBOR-encoded payload decoded per-tag. `Event` is a Rust sum type
//! rather than a dynamically dispatched op type, so the replay engine's
//! dispatch is an exhaustive match, and no tag can be silently skipped.
//!
//! The decoder is pure: it never touches index state, and it does not
//! verify signatures (the log layer is assumed to have done that already).

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::identity::{GroupDescriptor, PublicKey};

/// Tags recognized by the decoder (§6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    AccountContactBlocked,
    AccountContactRequestDisabled,
    AccountContactRequestEnabled,
    AccountContactRequestIncomingAccepted,
    AccountContactRequestIncomingDiscarded,
    AccountContactRequestIncomingReceived,
    AccountContactRequestOutgoingEnqueued,
    AccountContactRequestOutgoingSent,
    AccountContactRequestReferenceReset,
    AccountContactUnblocked,
    AccountGroupJoined,
    AccountGroupLeft,
    ContactAliasKeyAdded,
    GroupDeviceChainKeyAdded,
    GroupMemberDeviceAdded,
    MultiMemberGroupAdminRoleGranted,
    MultiMemberGroupInitialMemberAnnounced,
    AccountServiceTokenAdded,
    AccountServiceTokenRemoved,
    GroupMetadataPayloadSent,
    AccountVerifiedCredentialRegistered,
}

/// Metadata that accompanies every decoded event.
#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub event_type: EventType,
}

// ---------------------------------------------------------------------------
// Wire payloads: one log entry's payload is a single ciborium-encoded
// WireEvent. There is no separate outer frame; the log layer hands the
// decoder the raw CBOR bytes directly.
// ---------------------------------------------------------------------------

/// Raw wire form of one log entry's payload, decoded per `EventType`.
/// A real log layer would hand the decoder `Vec<u8>`; the test double and
/// the decoder both work against this pre-parsed form to keep the encoding
/// details (ciborium) isolated to one place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum WireEvent {
    ContactBlocked {
        contact_pk: [u8; 32],
    },
    ContactRequestDisabled,
    ContactRequestEnabled,
    ContactRequestIncomingAccepted {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    ContactRequestIncomingDiscarded {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    ContactRequestIncomingReceived {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    ContactRequestOutgoingEnqueued {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    ContactRequestOutgoingSent {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    ContactRequestReferenceReset {
        seed: Vec<u8>,
    },
    ContactUnblocked {
        contact_pk: [u8; 32],
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
    },
    GroupJoined {
        group_pk: [u8; 32],
        group_type: u8,
        seeds: Vec<u8>,
    },
    GroupLeft {
        group_pk: [u8; 32],
    },
    ContactAliasKeyAdded {
        sender_device_pk: [u8; 32],
        alias_pk: [u8; 32],
    },
    GroupDeviceChainKeyAdded {
        sender_device_pk: [u8; 32],
        destination_member_pk: [u8; 32],
    },
    GroupMemberDeviceAdded {
        member_pk: [u8; 32],
        device_pk: [u8; 32],
    },
    MultiMemberGroupAdminRoleGranted {
        member_pk: [u8; 32],
    },
    MultiMemberGroupInitialMemberAnnounced {
        member_pk: [u8; 32],
    },
    ServiceTokenAdded {
        token_id: String,
        payload: Vec<u8>,
    },
    ServiceTokenRemoved {
        token_id: String,
    },
    MetadataPayloadSent,
    VerifiedCredentialRegistered {
        credential: Vec<u8>,
    },
}

impl WireEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            WireEvent::ContactBlocked { .. } => EventType::AccountContactBlocked,
            WireEvent::ContactRequestDisabled => EventType::AccountContactRequestDisabled,
            WireEvent::ContactRequestEnabled => EventType::AccountContactRequestEnabled,
            WireEvent::ContactRequestIncomingAccepted { .. } => {
                EventType::AccountContactRequestIncomingAccepted
            }
            WireEvent::ContactRequestIncomingDiscarded { .. } => {
                EventType::AccountContactRequestIncomingDiscarded
            }
            WireEvent::ContactRequestIncomingReceived { .. } => {
                EventType::AccountContactRequestIncomingReceived
            }
            WireEvent::ContactRequestOutgoingEnqueued { .. } => {
                EventType::AccountContactRequestOutgoingEnqueued
            }
            WireEvent::ContactRequestOutgoingSent { .. } => {
                EventType::AccountContactRequestOutgoingSent
            }
            WireEvent::ContactRequestReferenceReset { .. } => {
                EventType::AccountContactRequestReferenceReset
            }
            WireEvent::ContactUnblocked { .. } => EventType::AccountContactUnblocked,
            WireEvent::GroupJoined { .. } => EventType::AccountGroupJoined,
            WireEvent::GroupLeft { .. } => EventType::AccountGroupLeft,
            WireEvent::ContactAliasKeyAdded { .. } => EventType::ContactAliasKeyAdded,
            WireEvent::GroupDeviceChainKeyAdded { .. } => EventType::GroupDeviceChainKeyAdded,
            WireEvent::GroupMemberDeviceAdded { .. } => EventType::GroupMemberDeviceAdded,
            WireEvent::MultiMemberGroupAdminRoleGranted { .. } => {
                EventType::MultiMemberGroupAdminRoleGranted
            }
            WireEvent::MultiMemberGroupInitialMemberAnnounced { .. } => {
                EventType::MultiMemberGroupInitialMemberAnnounced
            }
            WireEvent::ServiceTokenAdded { .. } => EventType::AccountServiceTokenAdded,
            WireEvent::ServiceTokenRemoved { .. } => EventType::AccountServiceTokenRemoved,
            WireEvent::MetadataPayloadSent => EventType::GroupMetadataPayloadSent,
            WireEvent::VerifiedCredentialRegistered { .. } => {
                EventType::AccountVerifiedCredentialRegistered
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IndexError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        ciborium::from_reader(bytes).map_err(|e| IndexError::Deserialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Typed, validated events: what handlers actually consume
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ContactEventFields {
    pub contact_pk: PublicKey,
    pub metadata: Option<Vec<u8>>,
    pub rendezvous_seed: Option<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub enum Event {
    ContactBlocked { contact_pk: PublicKey },
    ContactRequestDisabled,
    ContactRequestEnabled,
    ContactRequestIncomingAccepted(ContactEventFields),
    ContactRequestIncomingDiscarded(ContactEventFields),
    ContactRequestIncomingReceived(ContactEventFields),
    ContactRequestOutgoingEnqueued(ContactEventFields),
    ContactRequestOutgoingSent(ContactEventFields),
    ContactRequestReferenceReset { seed: Vec<u8> },
    ContactUnblocked { contact_pk: PublicKey },
    GroupJoined { group: GroupDescriptor },
    GroupLeft { group_pk: PublicKey },
    ContactAliasKeyAdded { sender_device_pk: PublicKey, alias_pk: PublicKey },
    GroupDeviceChainKeyAdded { sender_device_pk: PublicKey, destination_member_pk: PublicKey },
    GroupMemberDeviceAdded { member_pk: PublicKey, device_pk: PublicKey },
    MultiMemberGroupAdminRoleGranted { member_pk: PublicKey },
    MultiMemberGroupInitialMemberAnnounced { member_pk: PublicKey },
    ServiceTokenAdded { token_id: String, payload: Vec<u8> },
    ServiceTokenRemoved { token_id: String },
    MetadataPayloadSent,
    VerifiedCredentialRegistered { credential: Vec<u8> },
}

fn contact_fields(
    contact_pk: [u8; 32],
    metadata: Option<Vec<u8>>,
    rendezvous_seed: Option<Vec<u8>>,
) -> Result<ContactEventFields, IndexError> {
    Ok(ContactEventFields {
        contact_pk: PublicKey::from_slice(&contact_pk)?,
        metadata,
        rendezvous_seed,
    })
}

fn group_type_from_tag(tag: u8) -> Result<crate::identity::GroupType, IndexError> {
    use crate::identity::GroupType;
    match tag {
        0 => Ok(GroupType::Account),
        1 => Ok(GroupType::Contact),
        2 => Ok(GroupType::MultiMember),
        other => Err(IndexError::InvalidInput(format!(
            "unknown group type tag {other}"
        ))),
    }
}

/// Decode one log entry's payload into an `(EventEnvelope, Event)` pair.
///
/// Pure function: does not read or write index state. `_group` is accepted
/// for a per-group decode context even though this decoder does not
/// currently need to inspect it (no per-group wire format variation exists
/// yet).
pub fn decode(
    payload: &[u8],
    _group: &GroupDescriptor,
) -> Result<(EventEnvelope, Event), IndexError> {
    let wire = WireEvent::from_bytes(payload)?;
    let event_type = wire.event_type();

    let event = match wire {
        WireEvent::ContactBlocked { contact_pk } => Event::ContactBlocked {
            contact_pk: PublicKey::from_slice(&contact_pk)?,
        },
        WireEvent::ContactRequestDisabled => Event::ContactRequestDisabled,
        WireEvent::ContactRequestEnabled => Event::ContactRequestEnabled,
        WireEvent::ContactRequestIncomingAccepted {
            contact_pk,
            metadata,
            rendezvous_seed,
        } => Event::ContactRequestIncomingAccepted(contact_fields(
            contact_pk,
            metadata,
            rendezvous_seed,
        )?),
        WireEvent::ContactRequestIncomingDiscarded {
            contact_pk,
            metadata,
            rendezvous_seed,
        } => Event::ContactRequestIncomingDiscarded(contact_fields(
            contact_pk,
            metadata,
            rendezvous_seed,
        )?),
        WireEvent::ContactRequestIncomingReceived {
            contact_pk,
            metadata,
            rendezvous_seed,
        } => Event::ContactRequestIncomingReceived(contact_fields(
            contact_pk,
            metadata,
            rendezvous_seed,
        )?),
        WireEvent::ContactRequestOutgoingEnqueued {
            contact_pk,
            metadata,
            rendezvous_seed,
        } => Event::ContactRequestOutgoingEnqueued(contact_fields(
            contact_pk,
            metadata,
            rendezvous_seed,
        )?),
        WireEvent::ContactRequestOutgoingSent {
            contact_pk,
            metadata,
            rendezvous_seed,
        } => Event::ContactRequestOutgoingSent(contact_fields(
            contact_pk,
            metadata,
            rendezvous_seed,
        )?),
        WireEvent::ContactRequestReferenceReset { seed } => {
            Event::ContactRequestReferenceReset { seed }
        }
        WireEvent::ContactUnblocked { contact_pk, .. } => Event::ContactUnblocked {
            contact_pk: PublicKey::from_slice(&contact_pk)?,
        },
        WireEvent::GroupJoined {
            group_pk,
            group_type,
            seeds,
        } => Event::GroupJoined {
            group: GroupDescriptor {
                group_pk: PublicKey::from_slice(&group_pk)?,
                group_type: group_type_from_tag(group_type)?,
                seeds,
            },
        },
        WireEvent::GroupLeft { group_pk } => Event::GroupLeft {
            group_pk: PublicKey::from_slice(&group_pk)?,
        },
        WireEvent::ContactAliasKeyAdded {
            sender_device_pk,
            alias_pk,
        } => Event::ContactAliasKeyAdded {
            sender_device_pk: PublicKey::from_slice(&sender_device_pk)?,
            alias_pk: PublicKey::from_slice(&alias_pk)?,
        },
        WireEvent::GroupDeviceChainKeyAdded {
            sender_device_pk,
            destination_member_pk,
        } => Event::GroupDeviceChainKeyAdded {
            sender_device_pk: PublicKey::from_slice(&sender_device_pk)?,
            destination_member_pk: PublicKey::from_slice(&destination_member_pk)?,
        },
        WireEvent::GroupMemberDeviceAdded {
            member_pk,
            device_pk,
        } => Event::GroupMemberDeviceAdded {
            member_pk: PublicKey::from_slice(&member_pk)?,
            device_pk: PublicKey::from_slice(&device_pk)?,
        },
        WireEvent::MultiMemberGroupAdminRoleGranted { member_pk } => {
            Event::MultiMemberGroupAdminRoleGranted {
                member_pk: PublicKey::from_slice(&member_pk)?,
            }
        }
        WireEvent::MultiMemberGroupInitialMemberAnnounced { member_pk } => {
            Event::MultiMemberGroupInitialMemberAnnounced {
                member_pk: PublicKey::from_slice(&member_pk)?,
            }
        }
        WireEvent::ServiceTokenAdded { token_id, payload } => {
            Event::ServiceTokenAdded { token_id, payload }
        }
        WireEvent::ServiceTokenRemoved { token_id } => Event::ServiceTokenRemoved { token_id },
        WireEvent::MetadataPayloadSent => Event::MetadataPayloadSent,
        WireEvent::VerifiedCredentialRegistered { credential } => {
            Event::VerifiedCredentialRegistered { credential }
        }
    };

    Ok((EventEnvelope { event_type }, event))
}
