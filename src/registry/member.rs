//! Member/Device Registry (C2, §4.2).
//!
//! A `BTreeMap` keyed by identity, with a parallel reverse index for O(1)
//! device lookup. Unlike an OR-Set tracking invite/accept/remove
//! transitions, this registry only ever grows: devices are never removed
//! from a group metadata index.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::IndexError;
use crate::identity::{MemberDeviceBinding, PublicKey};

#[derive(Default, Clone, Debug)]
pub struct MemberDeviceRegistry {
    members: BTreeMap<PublicKey, Vec<MemberDeviceBinding>>,
    devices: BTreeMap<PublicKey, MemberDeviceBinding>,
    admins: BTreeSet<PublicKey>,
}

impl MemberDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `addMemberDevice`, idempotent by device key (§4.2).
    pub fn add_member_device(&mut self, member_pk: PublicKey, device_pk: PublicKey) {
        if self.devices.contains_key(&device_pk) {
            return;
        }
        let binding = MemberDeviceBinding {
            member_pk,
            device_pk,
        };
        self.members.entry(member_pk).or_default().push(binding);
        self.devices.insert(device_pk, binding);
    }

    pub fn member_of(&self, device_pk: &PublicKey) -> Result<PublicKey, IndexError> {
        self.devices
            .get(device_pk)
            .map(|b| b.member_pk)
            .ok_or_else(|| IndexError::MissingInput(format!("unknown device {device_pk}")))
    }

    pub fn devices_of(&self, member_pk: &PublicKey) -> Result<Vec<PublicKey>, IndexError> {
        self.members
            .get(member_pk)
            .map(|bindings| bindings.iter().map(|b| b.device_pk).collect())
            .ok_or_else(|| IndexError::InvalidInput(format!("unknown member {member_pk}")))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// All known member keys, in no particular order.
    pub fn list_members(&self) -> Vec<PublicKey> {
        self.members.keys().copied().collect()
    }

    /// All known device keys, in no particular order.
    pub fn list_devices(&self) -> Vec<PublicKey> {
        self.devices.keys().copied().collect()
    }

    /// Grant the initial admin of a MultiMember group. Duplicate admission
    /// is an internal error per §3's admin-set invariant: the initial-admin
    /// event must name exactly one admin.
    pub fn grant_initial_admin(&mut self, member_pk: PublicKey) -> Result<(), IndexError> {
        if !self.admins.insert(member_pk) {
            return Err(IndexError::Internal(format!(
                "duplicate initial admin admission for {member_pk}"
            )));
        }
        Ok(())
    }

    pub fn list_admins(&self) -> Vec<PublicKey> {
        self.admins.iter().copied().collect()
    }

    /// All device keys whose member is not `own_member`. Order unspecified
    /// (§4.2); returned as a set to additionally guarantee no duplicates.
    pub fn other_members_devices(&self, own_member: &PublicKey) -> Vec<PublicKey> {
        self.devices
            .values()
            .filter(|b| &b.member_pk != own_member)
            .map(|b| b.device_pk)
            .collect()
    }
}
