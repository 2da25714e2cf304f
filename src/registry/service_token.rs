//! Service Token Registry (C5, §4.5): tombstone-on-remove, first-write-wins
//! on re-add.
//!
//! Follows an OR-Set removal idiom (mark, don't delete); here the
//! tombstone is a `None` value under the key so that listing skips it
//! while `serviceTokenAdded` still sees the key occupied and refuses to
//! resurrect it.

use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct ServiceToken {
    pub token_id: String,
    pub payload: Vec<u8>,
}

#[derive(Default, Clone, Debug)]
pub struct ServiceTokenRegistry {
    tokens: BTreeMap<String, Option<ServiceToken>>,
}

impl ServiceTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `serviceTokenAdded`, ignored if the id is already present, including
    /// as a tombstone.
    pub fn add(&mut self, token: ServiceToken) {
        self.tokens
            .entry(token.token_id.clone())
            .or_insert(Some(token));
    }

    /// `serviceTokenRemoved`, writes a tombstone, overwriting any live
    /// value (newest-first replay means the *newest* remove wins if one is
    /// observed after an add of the same id was already recorded this
    /// replay, matching §5's "newest observation fixes the value").
    pub fn remove(&mut self, token_id: String) {
        self.tokens.insert(token_id, None);
    }

    pub fn list(&self) -> Vec<ServiceToken> {
        self.tokens.values().flatten().cloned().collect()
    }
}
