//! Replay Engine (C7) and Query Surface (C8), the index itself.
//!
//! `GroupMetadataIndex` owns one `RwLock<IndexState>` guarding every
//! derived structure (§5), following the same `Arc<RwLock<...>>`
//! shared-state idiom used elsewhere in this crate for long-lived state.
//! `update_index` holds the write lease for its entire duration, including
//! every handler invocation and the post-action pass; query methods each
//! take their own read lease and return owned copies, never internal
//! references (§4.9).

use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::error::IndexError;
use crate::event::{decode, Event};
use crate::identity::{GroupDescriptor, GroupType, MemberDeviceBinding, PublicKey};
use crate::log::{EntryHash, EventLog};
use crate::postaction::{self, AliasKeyStagedEvent};
use crate::registry::contact::{ContactRecord, ContactRegistry, ContactState};
use crate::registry::credential::CredentialRegistry;
use crate::registry::member::MemberDeviceRegistry;
use crate::registry::roster::{GroupRoster, RosterEntry};
use crate::registry::service_token::{ServiceToken, ServiceTokenRegistry};
use crate::secret_store::SecretStore;

/// Everything rebuilt or persisted across `update_index` calls. Split in
/// two halves per §3's Lifecycle note: `members`/`secret_sent` are
/// monotonic; everything else is reinitialized at the top of every replay.
struct IndexState {
    // Monotonic across replays (§3 Lifecycle).
    members: MemberDeviceRegistry,
    secret_sent: BTreeSet<PublicKey>,

    // Reset at the start of every `update_index` call.
    contacts: ContactRegistry,
    roster: GroupRoster,
    service_tokens: ServiceTokenRegistry,
    credentials: CredentialRegistry,
    contact_request_enabled: Option<bool>,
    contact_request_seed: Option<Vec<u8>>,
    own_alias_key_sent: bool,
    other_alias_key: Option<PublicKey>,
    handled: BTreeSet<EntryHash>,
}

impl IndexState {
    fn new() -> Self {
        IndexState {
            members: MemberDeviceRegistry::new(),
            secret_sent: BTreeSet::new(),
            contacts: ContactRegistry::new(),
            roster: GroupRoster::new(),
            service_tokens: ServiceTokenRegistry::new(),
            credentials: CredentialRegistry::new(),
            contact_request_enabled: None,
            contact_request_seed: None,
            own_alias_key_sent: false,
            other_alias_key: None,
            handled: BTreeSet::new(),
        }
    }

    fn reset_per_replay(&mut self) {
        self.contacts = ContactRegistry::new();
        self.roster = GroupRoster::new();
        self.service_tokens = ServiceTokenRegistry::new();
        self.credentials = CredentialRegistry::new();
        self.contact_request_enabled = None;
        self.contact_request_seed = None;
        self.own_alias_key_sent = false;
        self.other_alias_key = None;
        self.handled = BTreeSet::new();
    }
}

pub struct GroupMetadataIndex<S: SecretStore> {
    group: GroupDescriptor,
    own: MemberDeviceBinding,
    secret_store: S,
    state: RwLock<IndexState>,
}

impl<S: SecretStore> GroupMetadataIndex<S> {
    /// Construct an index bound to one (group, own member/device, secret
    /// store) triple. Begins empty.
    pub fn new(group: GroupDescriptor, own: MemberDeviceBinding, secret_store: S) -> Self {
        GroupMetadataIndex {
            group,
            own,
            secret_store,
            state: RwLock::new(IndexState::new()),
        }
    }

    // -----------------------------------------------------------------
    // C7: Replay Engine
    // -----------------------------------------------------------------

    /// Fold the full log snapshot, newest-first, under an exclusive write
    /// lease (§4.7, §5). Decode/handler errors are logged and swallowed so
    /// that one corrupt entry never bricks the whole group view; post-action
    /// failures are surfaced because they indicate a global inconsistency
    /// discovered only after every entry was processed (§7).
    pub fn update_index(&self, log: &dyn EventLog) -> Result<(), IndexError> {
        let mut state = self.state.write().expect("index lock poisoned");
        state.reset_per_replay();

        let entries = log.entries();
        let mut alias_queue: Vec<AliasKeyStagedEvent> = Vec::new();

        for entry in entries.iter().rev() {
            if self.group.group_type != GroupType::Account && state.handled.contains(&entry.hash)
            {
                continue;
            }

            let (_, event) = match decode(&entry.payload, &self.group) {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::warn!("skipping malformed log entry {:?}: {e}", entry.hash);
                    continue;
                }
            };

            if let Err(e) = self.dispatch(&mut state, event, &mut alias_queue) {
                log::warn!("handler failed for entry {:?}: {e}", entry.hash);
            }
            state.handled.insert(entry.hash);
        }

        let outcome =
            postaction::reconcile(alias_queue, &state.members, &self.own.member_pk).map_err(
                |e| {
                    log::error!("alias-key reconciliation failed: {e}");
                    e
                },
            )?;
        state.own_alias_key_sent = outcome.own_alias_key_sent;
        state.other_alias_key = outcome.other_alias_key;

        Ok(())
    }

    fn dispatch(
        &self,
        state: &mut IndexState,
        event: Event,
        alias_queue: &mut Vec<AliasKeyStagedEvent>,
    ) -> Result<(), IndexError> {
        match event {
            Event::ContactRequestOutgoingEnqueued(f) => state.contacts.apply_contact_event(
                f.contact_pk,
                ContactState::ToRequest,
                f.metadata,
                f.rendezvous_seed,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactRequestOutgoingSent(f) => state.contacts.apply_contact_event(
                f.contact_pk,
                ContactState::Added,
                f.metadata,
                f.rendezvous_seed,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactRequestIncomingReceived(f) => state.contacts.apply_contact_event(
                f.contact_pk,
                ContactState::Received,
                f.metadata,
                f.rendezvous_seed,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactRequestIncomingDiscarded(f) => state.contacts.apply_contact_event(
                f.contact_pk,
                ContactState::Discarded,
                f.metadata,
                f.rendezvous_seed,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactRequestIncomingAccepted(f) => state.contacts.apply_contact_event(
                f.contact_pk,
                ContactState::Added,
                f.metadata,
                f.rendezvous_seed,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactBlocked { contact_pk } => state.contacts.apply_contact_event(
                contact_pk,
                ContactState::Blocked,
                None,
                None,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactUnblocked { contact_pk } => state.contacts.apply_contact_event(
                contact_pk,
                ContactState::Removed,
                None,
                None,
                self.group.group_type,
                &self.secret_store,
            ),
            Event::ContactAliasKeyAdded {
                sender_device_pk,
                alias_pk,
            } => {
                alias_queue.push(AliasKeyStagedEvent {
                    sender_device_pk,
                    alias_pk,
                });
                Ok(())
            }
            Event::ContactRequestDisabled => {
                state.contact_request_enabled.get_or_insert(false);
                Ok(())
            }
            Event::ContactRequestEnabled => {
                state.contact_request_enabled.get_or_insert(true);
                Ok(())
            }
            Event::ContactRequestReferenceReset { seed } => {
                state.contact_request_seed.get_or_insert(seed);
                Ok(())
            }
            Event::GroupJoined { group } => {
                state.roster.group_joined(group);
                Ok(())
            }
            Event::GroupLeft { group_pk } => {
                state.roster.group_left(group_pk);
                Ok(())
            }
            Event::GroupDeviceChainKeyAdded {
                sender_device_pk,
                destination_member_pk,
            } => {
                if sender_device_pk == self.own.device_pk {
                    state.secret_sent.insert(destination_member_pk);
                }
                Ok(())
            }
            Event::GroupMemberDeviceAdded {
                member_pk,
                device_pk,
            } => {
                state.members.add_member_device(member_pk, device_pk);
                Ok(())
            }
            // Deliberately empty: grants beyond the initial admin are not
            // applied by this handler, preserved as specified rather than
            // "fixed".
            Event::MultiMemberGroupAdminRoleGranted { .. } => Ok(()),
            Event::MultiMemberGroupInitialMemberAnnounced { member_pk } => {
                state.members.grant_initial_admin(member_pk)
            }
            Event::ServiceTokenAdded { token_id, payload } => {
                state.service_tokens.add(ServiceToken { token_id, payload });
                Ok(())
            }
            Event::ServiceTokenRemoved { token_id } => {
                state.service_tokens.remove(token_id);
                Ok(())
            }
            Event::MetadataPayloadSent => Ok(()),
            Event::VerifiedCredentialRegistered { credential } => {
                state.credentials.append(credential);
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------
    // C8: Query Surface
    // -----------------------------------------------------------------

    pub fn list_contacts(&self) -> Vec<ContactRecord> {
        self.state.read().expect("index lock poisoned").contacts.list_contacts()
    }

    pub fn get_contact(&self, contact_pk: &PublicKey) -> Result<ContactRecord, IndexError> {
        self.state
            .read()
            .expect("index lock poisoned")
            .contacts
            .get_contact(contact_pk)
    }

    pub fn get_contact_by_group_pk(&self, group_pk: &PublicKey) -> Result<ContactRecord, IndexError> {
        self.state
            .read()
            .expect("index lock poisoned")
            .contacts
            .get_contact_by_group_pk(group_pk)
    }

    pub fn member_of(&self, device_pk: &PublicKey) -> Result<PublicKey, IndexError> {
        self.state.read().expect("index lock poisoned").members.member_of(device_pk)
    }

    pub fn devices_of(&self, member_pk: &PublicKey) -> Result<Vec<PublicKey>, IndexError> {
        self.state
            .read()
            .expect("index lock poisoned")
            .members
            .devices_of(member_pk)
    }

    pub fn member_count(&self) -> usize {
        self.state.read().expect("index lock poisoned").members.member_count()
    }

    pub fn device_count(&self) -> usize {
        self.state.read().expect("index lock poisoned").members.device_count()
    }

    pub fn list_members(&self) -> Vec<PublicKey> {
        self.state.read().expect("index lock poisoned").members.list_members()
    }

    pub fn list_devices(&self) -> Vec<PublicKey> {
        self.state.read().expect("index lock poisoned").members.list_devices()
    }

    pub fn list_admins(&self) -> Vec<PublicKey> {
        self.state.read().expect("index lock poisoned").members.list_admins()
    }

    pub fn other_members_devices(&self) -> Vec<PublicKey> {
        let state = self.state.read().expect("index lock poisoned");
        state.members.other_members_devices(&self.own.member_pk)
    }

    pub fn list_groups(&self) -> Vec<(PublicKey, RosterEntry)> {
        self.state.read().expect("index lock poisoned").roster.list_groups()
    }

    pub fn list_service_tokens(&self) -> Vec<ServiceToken> {
        self.state
            .read()
            .expect("index lock poisoned")
            .service_tokens
            .list()
    }

    pub fn list_verified_credentials(&self) -> Vec<Vec<u8>> {
        self.state
            .read()
            .expect("index lock poisoned")
            .credentials
            .list()
    }

    pub fn contact_requests_enabled(&self) -> Option<bool> {
        self.state.read().expect("index lock poisoned").contact_request_enabled
    }

    pub fn contact_requests_seed(&self) -> Option<Vec<u8>> {
        self.state
            .read()
            .expect("index lock poisoned")
            .contact_request_seed
            .clone()
    }

    pub fn are_secrets_already_sent(&self, destination_member_pk: &PublicKey) -> bool {
        self.state
            .read()
            .expect("index lock poisoned")
            .secret_sent
            .contains(destination_member_pk)
    }

    pub fn own_alias_key_sent(&self) -> bool {
        self.state.read().expect("index lock poisoned").own_alias_key_sent
    }

    pub fn other_alias_key(&self) -> Option<PublicKey> {
        self.state.read().expect("index lock poisoned").other_alias_key
    }
}
