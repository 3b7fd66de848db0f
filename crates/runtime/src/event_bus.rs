use serde::Serialize;

/// Which condition a status line reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// A frame is being drawn.
    Drawing,
    /// No active region yields any record.
    EmptySelection,
    /// Playback went back to idle.
    PlaybackStopped,
}

/// How prominently the front end should show a status line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Warning,
}

/// One status line for the front end.
///
/// The text is final; styling is up to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    /// Monotonic per-bus sequence number.
    pub seq: u64,
    pub kind: StatusKind,
    pub level: StatusLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct StatusBus {
    next_seq: u64,
    events: Vec<StatusEvent>,
}

impl StatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: StatusKind, level: StatusLevel, message: impl Into<String>) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.events.push(StatusEvent {
            seq,
            kind,
            level,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[StatusEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<StatusEvent> {
        std::mem::take(&mut self.events)
    }
}
