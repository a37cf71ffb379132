use crate::DrawEvent;

/// Every drawing event since the last clear, in server receipt order.
///
/// The log has no upper bound; only `clear` removes entries.
#[derive(Debug, Default)]
pub struct CanvasEventLog {
    events: Vec<DrawEvent>,
}

impl CanvasEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: DrawEvent) {
        self.events.push(event);
    }

    /// Events to replay to a late joiner, or `None` when there is nothing to replay.
    pub fn snapshot(&self) -> Option<&[DrawEvent]> {
        if self.events.is_empty() {
            None
        } else {
            Some(&self.events)
        }
    }

    /// Empties the log, returning how many events were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawEvent> + '_ {
        self.events.iter()
    }
}
