use crate::color_assigner;
use crate::{
    BroadcastRouter, CanvasEventLog, ClientMessage, ConnectionId, Delivery, DrawEvent, EndNotice,
    Fanout, Participant, ParticipantRegistry, ServerMessage, SetColorRequest, StrokeNotice,
    Timestamp,
};
use serde::Serialize;
use std::collections::HashMap;
use std::num::Wrapping;

/// Where an open connection is in its lifecycle. Closed connections have no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Connected,
    ColorAssigned,
    Streaming,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub connections: Vec<ConnectionId>,
    pub participants: Vec<Participant>,
    pub canvas_events: usize,
}

/// The shared drawing session: open connections, their colors and the canvas log.
///
/// Every mutation goes through `&mut self`, so whoever owns the session processes
/// one connection event at a time. Outbound effects are returned as deliveries for
/// the transport to send.
pub struct Session {
    connection_id_source: Wrapping<ConnectionId>,
    connection_states: HashMap<ConnectionId, ConnectionState>,
    registry: ParticipantRegistry,
    canvas_log: CanvasEventLog,
    router: BroadcastRouter,
}

impl Session {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_states: HashMap::new(),
            registry: ParticipantRegistry::new(),
            canvas_log: CanvasEventLog::new(),
            router: BroadcastRouter::new(),
        }
    }

    pub fn open_connection(&mut self) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connection_states
            .insert(connection_id, ConnectionState::Connected);
        self.router.attach(connection_id);
        log::info!("User connected: {}", connection_id);
        connection_id
    }

    /// Forgets the connection and its participant. Returns false if it wasn't open.
    pub fn close_connection(&mut self, connection_id: ConnectionId) -> bool {
        if self.connection_states.remove(&connection_id).is_none() {
            log::warn!("Connection {} is not open", connection_id);
            return false;
        }
        self.router.detach(connection_id);
        self.registry.remove(connection_id);
        log::info!("User disconnected: {}", connection_id);
        true
    }

    pub fn handle_message(
        &mut self,
        from: ConnectionId,
        message: ClientMessage,
        received_at: Timestamp,
    ) -> Vec<Delivery> {
        let mut outbox = Vec::new();
        if !self.connection_states.contains_key(&from) {
            log::warn!("Ignoring message from unknown connection {}", from);
            return outbox;
        }

        match message {
            ClientMessage::RequestColor => self.request_color(from, &mut outbox),
            ClientMessage::DrawingStart(point) => {
                log::debug!("Drawing start from {}", from);
                self.record_stroke(
                    from,
                    DrawEvent::Start {
                        point: point.clone(),
                        timestamp: received_at,
                        user_id: from,
                    },
                    ServerMessage::DrawingStart(StrokeNotice {
                        point,
                        user_id: from,
                    }),
                    &mut outbox,
                );
            }
            ClientMessage::DrawingMove(point) => self.record_stroke(
                from,
                DrawEvent::Move {
                    point: point.clone(),
                    timestamp: received_at,
                    user_id: from,
                },
                ServerMessage::DrawingMove(StrokeNotice {
                    point,
                    user_id: from,
                }),
                &mut outbox,
            ),
            ClientMessage::DrawingEnd => {
                log::debug!("Drawing end from {}", from);
                self.record_stroke(
                    from,
                    DrawEvent::End {
                        timestamp: received_at,
                        user_id: from,
                    },
                    ServerMessage::DrawingEnd(EndNotice { user_id: from }),
                    &mut outbox,
                );
            }
            ClientMessage::ClearCanvas => self.clear_canvas(from, &mut outbox),
            ClientMessage::SetColor(request) => self.set_color(from, &request, &mut outbox),
        }

        outbox
    }

    pub fn connection_state(&self, connection_id: ConnectionId) -> Option<ConnectionState> {
        self.connection_states.get(&connection_id).copied()
    }

    pub fn connection_count(&self) -> usize {
        self.connection_states.len()
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn canvas_log(&self) -> &CanvasEventLog {
        &self.canvas_log
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connections: self.router.endpoints().to_vec(),
            participants: self.registry.iter().cloned().collect(),
            canvas_events: self.canvas_log.len(),
        }
    }

    fn request_color(&mut self, from: ConnectionId, outbox: &mut Vec<Delivery>) {
        let entry = color_assigner::assign(&self.registry);
        let participant = Participant::new(from, entry.color, entry.name);
        let notice = participant.notice();
        self.registry.register(participant);
        self.advance(from, ConnectionState::ColorAssigned);
        log::info!("Assigned {} to {}", entry.name, from);

        self.router.route(
            from,
            Fanout::SenderOnly,
            ServerMessage::ColorAssigned(notice.clone()),
            outbox,
        );
        for other in self.registry.others(from) {
            self.router.route(
                from,
                Fanout::SenderOnly,
                ServerMessage::OtherUserColor(other.notice()),
                outbox,
            );
        }
        self.router.route(
            from,
            Fanout::AllButSender,
            ServerMessage::OtherUserColor(notice),
            outbox,
        );

        if let Some(events) = self.canvas_log.snapshot() {
            log::info!("Sending canvas state ({} events) to {}", events.len(), from);
            self.router.route(
                from,
                Fanout::SenderOnly,
                ServerMessage::CanvasState(events.to_vec()),
                outbox,
            );
        }
    }

    fn record_stroke(
        &mut self,
        from: ConnectionId,
        event: DrawEvent,
        broadcast: ServerMessage,
        outbox: &mut Vec<Delivery>,
    ) {
        self.canvas_log.append(event);
        self.advance(from, ConnectionState::Streaming);
        self.router
            .route(from, Fanout::AllButSender, broadcast, outbox);
    }

    fn clear_canvas(&mut self, from: ConnectionId, outbox: &mut Vec<Delivery>) {
        let dropped = self.canvas_log.clear();
        log::info!("Canvas cleared by {} ({} events dropped)", from, dropped);
        self.router.route(
            from,
            Fanout::AllIncludingSender,
            ServerMessage::CanvasCleared,
            outbox,
        );
    }

    fn set_color(
        &mut self,
        from: ConnectionId,
        request: &SetColorRequest,
        outbox: &mut Vec<Delivery>,
    ) {
        let color = match color_assigner::apply_manual_color(request.requested()) {
            Ok(color) => color,
            Err(rejected) => {
                log::debug!("{} from {}", rejected, from);
                return;
            }
        };

        let participant = Participant::new(from, color.clone(), color);
        let notice = participant.notice();
        self.registry.register(participant);
        self.advance(from, ConnectionState::ColorAssigned);
        log::info!("{} picked color {}", from, notice.color);

        self.router.route(
            from,
            Fanout::SenderOnly,
            ServerMessage::ColorAssigned(notice.clone()),
            outbox,
        );
        self.router.route(
            from,
            Fanout::AllButSender,
            ServerMessage::OtherUserColor(notice),
            outbox,
        );
    }

    /// States only move forward; a re-request while streaming stays streaming.
    fn advance(&mut self, connection_id: ConnectionId, next: ConnectionState) {
        if let Some(state) = self.connection_states.get_mut(&connection_id) {
            *state = (*state).max(next);
        }
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        loop {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !self.connection_states.contains_key(&candidate) {
                break candidate;
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrokePoint;
    use serde_json::json;

    fn point(x: i32, y: i32) -> StrokePoint {
        StrokePoint {
            x: Some(json!(x)),
            y: Some(json!(y)),
            color: Some(json!("#ff4444")),
            tool: Some(json!("brush")),
        }
    }

    #[test]
    fn it_walks_the_lifecycle() {
        let mut session = Session::new();
        let id = session.open_connection();
        assert_eq!(session.connection_state(id), Some(ConnectionState::Connected));

        session.handle_message(id, ClientMessage::RequestColor, 1);
        assert_eq!(
            session.connection_state(id),
            Some(ConnectionState::ColorAssigned)
        );

        session.handle_message(id, ClientMessage::DrawingStart(point(1, 1)), 2);
        assert_eq!(session.connection_state(id), Some(ConnectionState::Streaming));

        session.handle_message(id, ClientMessage::RequestColor, 3);
        assert_eq!(session.connection_state(id), Some(ConnectionState::Streaming));

        assert!(session.close_connection(id));
        assert_eq!(session.connection_state(id), None);
        assert!(!session.close_connection(id));
    }

    #[test]
    fn closed_connection_is_ignored() {
        let mut session = Session::new();
        let id = session.open_connection();
        session.close_connection(id);

        let outbox = session.handle_message(id, ClientMessage::DrawingStart(point(0, 0)), 1);
        assert!(outbox.is_empty());
        assert!(session.canvas_log().is_empty());
    }

    #[test]
    fn drawing_without_color_is_relayed() {
        let mut session = Session::new();
        let a = session.open_connection();
        let b = session.open_connection();

        let outbox = session.handle_message(a, ClientMessage::DrawingEnd, 5);
        assert_eq!(
            outbox,
            vec![Delivery {
                to: b,
                message: ServerMessage::DrawingEnd(EndNotice { user_id: a }),
            }]
        );
        assert_eq!(
            session.canvas_log().iter().cloned().collect::<Vec<_>>(),
            vec![DrawEvent::End {
                timestamp: 5,
                user_id: a
            }]
        );
    }

    #[test]
    fn request_color_orders_responses() {
        let mut session = Session::new();
        let a = session.open_connection();
        session.handle_message(a, ClientMessage::RequestColor, 1);
        session.handle_message(a, ClientMessage::DrawingStart(point(3, 4)), 2);

        let b = session.open_connection();
        let outbox = session.handle_message(b, ClientMessage::RequestColor, 3);

        let blue = Participant::new(b, "#4444ff", "Blue").notice();
        let red = Participant::new(a, "#ff4444", "Red").notice();
        assert_eq!(
            outbox,
            vec![
                Delivery {
                    to: b,
                    message: ServerMessage::ColorAssigned(blue.clone()),
                },
                Delivery {
                    to: b,
                    message: ServerMessage::OtherUserColor(red),
                },
                Delivery {
                    to: a,
                    message: ServerMessage::OtherUserColor(blue),
                },
                Delivery {
                    to: b,
                    message: ServerMessage::CanvasState(vec![DrawEvent::Start {
                        point: point(3, 4),
                        timestamp: 2,
                        user_id: a,
                    }]),
                },
            ]
        );
    }

    #[test]
    fn set_color_overwrites_participant() {
        let mut session = Session::new();
        let a = session.open_connection();
        let b = session.open_connection();
        session.handle_message(a, ClientMessage::RequestColor, 1);

        let outbox = session.handle_message(
            a,
            ClientMessage::SetColor(SetColorRequest {
                color: Some(json!(" #0a0B0c ")),
            }),
            2,
        );

        let notice = Participant::new(a, "#0a0B0c", "#0a0B0c").notice();
        assert_eq!(
            outbox,
            vec![
                Delivery {
                    to: a,
                    message: ServerMessage::ColorAssigned(notice.clone()),
                },
                Delivery {
                    to: b,
                    message: ServerMessage::OtherUserColor(notice),
                },
            ]
        );
        assert_eq!(session.registry().len(), 1);
        assert_eq!(
            session.registry().get(a).map(|p| p.color.as_str()),
            Some("#0a0B0c")
        );
    }

    #[test]
    fn snapshot_reflects_session() {
        let mut session = Session::new();
        let a = session.open_connection();
        let b = session.open_connection();
        session.handle_message(b, ClientMessage::RequestColor, 1);
        session.handle_message(a, ClientMessage::DrawingMove(point(1, 2)), 2);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.connections, vec![a, b]);
        assert_eq!(snapshot.participants, vec![Participant::new(b, "#ff4444", "Red")]);
        assert_eq!(snapshot.canvas_events, 1);
    }
}
