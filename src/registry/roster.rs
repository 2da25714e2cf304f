//! Group Roster (C4, §4.4): first-write-wins by groupPK.
//!
//! Grounded on the same LWW-register shape as the contact registry, but
//! simpler: there is no field-merge, only a single first-write-wins slot
//! per key. There is a known asymmetry: a join-then-leave replays as Left,
//! and a leave-then-rejoin also replays as Left, because the newer join is
//! ignored once a Left record exists. This is implemented as specified,
//! not "fixed".

use std::collections::BTreeMap;

use crate::identity::{GroupDescriptor, PublicKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterState {
    Joined,
    Left,
}

#[derive(Clone, Debug)]
pub struct RosterEntry {
    pub state: RosterState,
    pub group: Option<GroupDescriptor>,
}

#[derive(Default, Clone, Debug)]
pub struct GroupRoster {
    groups: BTreeMap<PublicKey, RosterEntry>,
}

impl GroupRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// `GroupJoined(group)`, a no-op if a record already exists under this key.
    pub fn group_joined(&mut self, group: GroupDescriptor) {
        self.groups.entry(group.group_pk).or_insert(RosterEntry {
            state: RosterState::Joined,
            group: Some(group.clone()),
        });
    }

    /// `GroupLeft(groupPK)`, a no-op if a record already exists under this key.
    pub fn group_left(&mut self, group_pk: PublicKey) {
        self.groups.entry(group_pk).or_insert(RosterEntry {
            state: RosterState::Left,
            group: None,
        });
    }

    pub fn list_groups(&self) -> Vec<(PublicKey, RosterEntry)> {
        self.groups
            .iter()
            .map(|(pk, entry)| (*pk, entry.clone()))
            .collect()
    }
}
