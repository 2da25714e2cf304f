//! Secret-store interface consumed by the contact state machine (§6).
//!
//! The secret store itself lives outside this crate (it resolves a contact
//! public key to the group identifier derived for that contact, and holds
//! the keys needed to decrypt that group's own log). Only the trait
//! boundary is defined here.

use crate::error::IndexError;
use crate::identity::PublicKey;

pub trait SecretStore {
    /// Resolve the group identifier derived for a contact's public key.
    /// Only ever called while the bound group is of type `Account` (§4.3).
    fn group_for_contact(&self, contact_pk: &PublicKey) -> Result<PublicKey, IndexError>;
}
