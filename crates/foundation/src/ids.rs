use serde::{Deserialize, Serialize};

/// Stable identity of a loaded indicator row.
///
/// Ids are assigned in load order starting at 0 and are never reused, so
/// ascending id order is the original row order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Hands out [`RecordId`]s in increasing order.
#[derive(Debug, Default)]
pub struct RecordIdAllocator {
    next: u32,
}

impl RecordIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RecordId {
        let id = RecordId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
