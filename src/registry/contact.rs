//! Contact State Machine (C3, §4.3).
//!
//! First-write-wins on `state` (relative to newest-first replay order, see
//! §5), with metadata/rendezvous-seed filled in lazily on whichever event
//! observes them first, following the standard LWW-register "only fill if
//! absent" rule, plus a reverse-lookup index from contact PK to derived
//! group PK.

use std::collections::BTreeMap;

use crate::error::IndexError;
use crate::identity::{GroupType, PublicKey};
use crate::secret_store::SecretStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactState {
    ToRequest,
    Added,
    Received,
    Discarded,
    Blocked,
    Removed,
}

/// The quadruple (PK, rendezvous seed, metadata, state) a user advertises.
/// `state` is carried on `ContactRecord`, not duplicated here.
#[derive(Clone, Debug)]
pub struct ShareableContact {
    pub pk: PublicKey,
    pub public_rendezvous_seed: Option<Vec<u8>>,
    pub metadata: Option<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub struct ContactRecord {
    pub state: ContactState,
    pub contact: ShareableContact,
}

#[derive(Default, Clone, Debug)]
pub struct ContactRegistry {
    contacts: BTreeMap<PublicKey, ContactRecord>,
    contacts_by_group_pk: BTreeMap<PublicKey, PublicKey>,
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one of the eight contact-lifecycle events (§4.3 table). If a
    /// record already exists, `state` is left untouched and only absent
    /// `metadata`/`rendezvous_seed` fields are filled. Otherwise a new
    /// record is created in `induced_state`, and, only when the bound
    /// group is of type `Account`, the secret store is queried for the
    /// contact's derived group PK to populate the reverse index.
    pub fn apply_contact_event(
        &mut self,
        contact_pk: PublicKey,
        induced_state: ContactState,
        metadata: Option<Vec<u8>>,
        rendezvous_seed: Option<Vec<u8>>,
        group_type: GroupType,
        secret_store: &dyn SecretStore,
    ) -> Result<(), IndexError> {
        if let Some(existing) = self.contacts.get_mut(&contact_pk) {
            if existing.contact.metadata.is_none() {
                existing.contact.metadata = metadata;
            }
            if existing.contact.public_rendezvous_seed.is_none() {
                existing.contact.public_rendezvous_seed = rendezvous_seed;
            }
            return Ok(());
        }

        if group_type != GroupType::Account {
            return Err(IndexError::GroupInvalidType(
                "contact creation is only valid in an Account group".into(),
            ));
        }

        let group_pk = secret_store.group_for_contact(&contact_pk)?;

        self.contacts.insert(
            contact_pk,
            ContactRecord {
                state: induced_state,
                contact: ShareableContact {
                    pk: contact_pk,
                    public_rendezvous_seed: rendezvous_seed,
                    metadata,
                },
            },
        );
        self.contacts_by_group_pk.insert(group_pk, contact_pk);
        Ok(())
    }

    /// Deep copy of every contact record (§4.3: `listContacts` must not
    /// expose internal byte slices by reference).
    pub fn list_contacts(&self) -> Vec<ContactRecord> {
        self.contacts.values().cloned().collect()
    }

    pub fn get_contact(&self, contact_pk: &PublicKey) -> Result<ContactRecord, IndexError> {
        self.contacts
            .get(contact_pk)
            .cloned()
            .ok_or_else(|| IndexError::MissingMapKey(format!("no contact for {contact_pk}")))
    }

    pub fn get_contact_by_group_pk(
        &self,
        group_pk: &PublicKey,
    ) -> Result<ContactRecord, IndexError> {
        let contact_pk = self.contacts_by_group_pk.get(group_pk).ok_or_else(|| {
            IndexError::MissingMapKey(format!("no contact for derived group {group_pk}"))
        })?;
        self.get_contact(contact_pk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSecretStore;
    impl SecretStore for StubSecretStore {
        fn group_for_contact(&self, contact_pk: &PublicKey) -> Result<PublicKey, IndexError> {
            Ok(*contact_pk)
        }
    }

    fn pk(byte: u8) -> PublicKey {
        PublicKey([byte; 32])
    }

    #[test]
    fn creation_requires_account_group() {
        let mut reg = ContactRegistry::new();
        let err = reg
            .apply_contact_event(
                pk(1),
                ContactState::ToRequest,
                None,
                None,
                GroupType::MultiMember,
                &StubSecretStore,
            )
            .unwrap_err();
        assert!(matches!(err, IndexError::GroupInvalidType(_)));
    }

    #[test]
    fn newer_event_does_not_change_state_only_fills_absent_fields() {
        let mut reg = ContactRegistry::new();
        // Newest-first replay: Sent observed first, fixes state=Added.
        reg.apply_contact_event(
            pk(1),
            ContactState::Added,
            None,
            None,
            GroupType::Account,
            &StubSecretStore,
        )
        .unwrap();
        // Older Enqueued observed next: must not flip state back to ToRequest,
        // but does fill the still-absent metadata/seed.
        reg.apply_contact_event(
            pk(1),
            ContactState::ToRequest,
            Some(b"meta".to_vec()),
            Some(b"seed".to_vec()),
            GroupType::Account,
            &StubSecretStore,
        )
        .unwrap();

        let record = reg.get_contact(&pk(1)).unwrap();
        assert_eq!(record.state, ContactState::Added);
        assert_eq!(record.contact.metadata, Some(b"meta".to_vec()));
        assert_eq!(record.contact.public_rendezvous_seed, Some(b"seed".to_vec()));
    }
}
