use crate::{ColorNotice, ConnectionId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    #[serde(rename = "userId")]
    pub id: ConnectionId,
    pub color: String,
    #[serde(rename = "colorName")]
    pub color_name: String,
}

impl Participant {
    pub fn new(id: ConnectionId, color: impl Into<String>, color_name: impl Into<String>) -> Self {
        Self {
            id,
            color: color.into(),
            color_name: color_name.into(),
        }
    }

    pub fn notice(&self) -> ColorNotice {
        ColorNotice {
            color: self.color.clone(),
            color_name: self.color_name.clone(),
            user_id: self.id,
        }
    }
}

/// Participants that have a color, iterated in the order they first registered.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    order: Vec<ConnectionId>,
    participants: HashMap<ConnectionId, Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the participant, or overwrites it in place if its id is already registered.
    pub fn register(&mut self, participant: Participant) {
        let id = participant.id;
        if self.participants.insert(id, participant).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<Participant> {
        let removed = self.participants.remove(&id);
        if removed.is_some() {
            self.order.retain(|e| *e != id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.participants.get(id))
    }

    pub fn others(&self, id: ConnectionId) -> impl Iterator<Item = &Participant> + '_ {
        self.iter().filter(move |p| p.id != id)
    }

    pub fn for_each_other<F>(&self, id: ConnectionId, mut f: F)
    where
        F: FnMut(&Participant, ConnectionId),
    {
        for participant in self.others(id) {
            f(participant, participant.id);
        }
    }
}
