//! Post-action: alias-key reconciliation (§4.8).
//!
//! Runs once, after the full newest-first fold, against state the replay
//! already holds the write lease for: it must not reacquire any lock
//! (§5). Drains the alias-key staging queue built during this replay:
//! a queued event whose sender resolves to the own member marks
//! `own_alias_key_sent`; otherwise it becomes the (single-slot)
//! `other_alias_key`, with later-processed foreign keys overwriting
//! earlier ones. The single slot is a known limitation of the one-contact
//! assumption, not a bug this crate papers over.

use crate::error::IndexError;
use crate::identity::PublicKey;
use crate::registry::member::MemberDeviceRegistry;

#[derive(Clone, Copy, Debug)]
pub struct AliasKeyStagedEvent {
    pub sender_device_pk: PublicKey,
    pub alias_pk: PublicKey,
}

/// Output of reconciliation, folded into the index's per-replay state.
#[derive(Default, Clone, Debug)]
pub struct AliasKeyOutcome {
    pub own_alias_key_sent: bool,
    pub other_alias_key: Option<PublicKey>,
}

pub fn reconcile(
    queue: Vec<AliasKeyStagedEvent>,
    members: &MemberDeviceRegistry,
    own_member: &PublicKey,
) -> Result<AliasKeyOutcome, IndexError> {
    let mut outcome = AliasKeyOutcome::default();

    for staged in queue {
        let sender_member = members.member_of(&staged.sender_device_pk)?;
        if &sender_member == own_member {
            outcome.own_alias_key_sent = true;
        } else {
            outcome.other_alias_key = Some(staged.alias_pk);
        }
    }

    Ok(outcome)
}
