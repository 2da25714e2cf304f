//! Identity types shared across the index: public keys, group descriptors,
//! and the immutable own-member/device binding.
//!
//! `PublicKey` is a `[u8; 32]` wrapper with `Ord`/`Hash` for use as a map
//! key and a hex `Display`/`Debug`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Opaque Ed25519 public key, 32 bytes, compared and keyed by raw byte form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const SIZE: usize = 32;

    /// Decode a public key from a byte slice, checking only its length.
    /// The underlying log layer is assumed to have already checked the
    /// signature; like the wider identifier types this index builds on,
    /// the key is carried opaquely and never curve-validated here (§4.1).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() != Self::SIZE {
            return Err(IndexError::Deserialization(format!(
                "expected {}-byte public key, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(PublicKey(buf))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &self.to_hex()[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One of the three cryptographic namespaces a group can be (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    Account,
    Contact,
    MultiMember,
}

/// Immutable group descriptor the index is bound to at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub group_pk: PublicKey,
    pub group_type: GroupType,
    /// Cryptographic seeds opaque to the index; carried for downstream
    /// consumers (transport, secret store), never inspected here.
    pub seeds: Vec<u8>,
}

/// The immutable pair (memberPK, devicePK) identifying the local participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeviceBinding {
    pub member_pk: PublicKey,
    pub device_pk: PublicKey,
}
