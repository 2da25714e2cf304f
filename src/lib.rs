//! Group metadata index: the deterministic replay engine that folds an
//! append-only, content-addressed event log into the authoritative
//! in-memory state of a cryptographically-secured peer group: members,
//! devices, admins, contacts, joined/left groups, service tokens, and
//! verified credentials. See SPEC_FULL.md for the full requirements.

// Crate-level lint configuration: suppress stylistic warnings that don't affect correctness.
#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod error;
pub mod event;
pub mod identity;
pub mod index;
pub mod log;
pub mod postaction;
pub mod registry;
pub mod secret_store;

pub use error::{IndexError, Result};
pub use event::{decode, Event, EventEnvelope, EventType, WireEvent};
pub use identity::{GroupDescriptor, GroupType, MemberDeviceBinding, PublicKey};
pub use index::GroupMetadataIndex;
pub use log::{EntryHash, EventLog, LogEntryRef, VecEventLog};
pub use secret_store::SecretStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
