use groupindex::{GroupDescriptor, GroupType, IndexError, PublicKey, SecretStore, WireEvent};

/// Deterministic stand-in for the real secret store: derives a contact's
/// group PK as BLAKE3("contact-group" || contact_pk).
pub struct StubSecretStore;

impl SecretStore for StubSecretStore {
    fn group_for_contact(&self, contact_pk: &PublicKey) -> Result<PublicKey, IndexError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"contact-group");
        hasher.update(contact_pk.as_bytes());
        Ok(PublicKey(*hasher.finalize().as_bytes()))
    }
}

pub fn pk(byte: u8) -> PublicKey {
    PublicKey([byte; 32])
}

pub fn account_group(own_pk: PublicKey) -> GroupDescriptor {
    GroupDescriptor {
        group_pk: own_pk,
        group_type: GroupType::Account,
        seeds: vec![],
    }
}

pub fn multimember_group(group_pk: PublicKey) -> GroupDescriptor {
    GroupDescriptor {
        group_pk,
        group_type: GroupType::MultiMember,
        seeds: vec![],
    }
}

pub fn encode(event: &WireEvent) -> Vec<u8> {
    event.to_bytes().unwrap()
}
