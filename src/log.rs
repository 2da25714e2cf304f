//! Log-layer interface consumed by the replay engine (§6, out of scope §1).
//!
//! The replicated event log itself is an external collaborator; this module
//! only defines the trait boundary and a small in-memory test double, kept
//! as a lightweight fixture in the crate rather than reaching for a mocking
//! library.

/// Content-addressed, stable identifier of one log entry. A fixed-size
/// hash, `Ord` so it can be used as a set/map key without extra allocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryHash(pub [u8; 32]);

impl EntryHash {
    pub fn of(payload: &[u8]) -> Self {
        EntryHash(*blake3::hash(payload).as_bytes())
    }
}

impl std::fmt::Debug for EntryHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntryHash({})", hex::encode(&self.0[..8]))
    }
}

/// One entry as handed to the decoder: its stable hash and raw payload.
#[derive(Clone, Debug)]
pub struct LogEntryRef {
    pub hash: EntryHash,
    pub payload: Vec<u8>,
}

/// The ordered log the replay engine folds. Implemented by the external
/// replicated-log component; entries are in append (oldest-first) order,
/// the replay engine itself walks them newest-first (§4.7 step 2).
pub trait EventLog {
    fn entries(&self) -> Vec<LogEntryRef>;
}

/// In-memory log fixture used by tests. Entries are pushed in append order;
/// `entries()` returns them in that same (oldest-first) order, exactly as a
/// real log's iterator would.
#[derive(Default, Clone)]
pub struct VecEventLog {
    entries: Vec<LogEntryRef>,
}

impl VecEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw payload, computing its content hash.
    pub fn push(&mut self, payload: Vec<u8>) -> EntryHash {
        let hash = EntryHash::of(&payload);
        self.entries.push(LogEntryRef { hash, payload });
        hash
    }

    /// Append an already-malformed/opaque payload (for tolerance tests).
    pub fn push_raw(&mut self, payload: Vec<u8>) -> EntryHash {
        self.push(payload)
    }
}

impl EventLog for VecEventLog {
    fn entries(&self) -> Vec<LogEntryRef> {
        self.entries.clone()
    }
}
