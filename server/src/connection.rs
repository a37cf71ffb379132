use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};

use drawing_system::{ClientMessage, ConnectionId, ServerMessage};

use crate::config::ServerConfig;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    Message(ServerMessage),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

#[derive(Debug, PartialEq)]
enum ConnectionState {
    /// Waiting for the server to hand out an id; inbound messages are held until then.
    Idle { pending: Vec<ClientMessage> },
    Connected(ConnectionId),
}

impl ConnectionState {
    /// Holds the message while idle. Once connected, hands it back with the sender id.
    fn accept(&mut self, message: ClientMessage) -> Option<(ConnectionId, ClientMessage)> {
        match self {
            ConnectionState::Idle { pending } => {
                pending.push(message);
                None
            }
            ConnectionState::Connected(from) => Some((*from, message)),
        }
    }

    /// Moves to `Connected`, returning the held messages in arrival order.
    fn connect(&mut self, connection_id: ConnectionId) -> Vec<ClientMessage> {
        match std::mem::replace(self, ConnectionState::Connected(connection_id)) {
            ConnectionState::Idle { pending } => pending,
            ConnectionState::Connected(_) => Vec::new(),
        }
    }
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    channel_capacity: usize,
}

impl ConnectionActor {
    fn forward(&mut self, message: ClientMessage) {
        if let Some((from, message)) = self.state.accept(message) {
            if self
                .srv_tx
                .send(ServerCommand::Message { from, message })
                .is_err()
            {
                log::warn!("Server stopped; dropping message from {}", from);
            }
        }
    }

    fn reject(&mut self, ctx: &mut ws::WebsocketContext<Self>, code: CloseCode, reason: String) {
        log::warn!("Closing connection: {}", reason);
        ctx.close(Some(CloseReason {
            code,
            description: Some(reason),
        }));
        ctx.stop();
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(self.channel_capacity);

        if self.srv_tx.send(ServerCommand::Connect { tx }).is_err() {
            log::warn!("Server stopped; refusing connection");
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            while let Some(event) = rx.recv().await {
                if addr.do_send(ConnectionActorMessage(event)).is_err() {
                    break;
                }
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            if self.srv_tx.send(ServerCommand::Disconnect { from: id }).is_err() {
                log::warn!("Server stopped before {} disconnected", id);
            }
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("Ingress size: {}", text.len());
                match ClientMessage::from_json(&text) {
                    Ok(message) => {
                        log::debug!("Ingress {:?}", message);
                        self.forward(message);
                    }
                    Err(e) => self.reject(ctx, CloseCode::Invalid, e.to_string()),
                }
            }
            Ok(ws::Message::Binary(_)) => self.reject(
                ctx,
                CloseCode::Unsupported,
                "binary frames are not supported".into(),
            ),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                log::debug!("Ignoring continuation frame; fragmented messages are not supported")
            }
            Ok(_) => (),
            Err(e) => {
                log::warn!("Websocket protocol error: {}", e);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { connection_id } => {
                for message in self.state.connect(connection_id) {
                    self.forward(message);
                }
            }
            ConnectionEvent::Message(message) => {
                log::debug!("Egress {:?}", message);
                match message.to_json() {
                    Ok(serialized) => ctx.text(serialized),
                    Err(e) => log::warn!("{}", e),
                }
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            state: ConnectionState::Idle {
                pending: Vec::new(),
            },
            srv_tx: srv_tx.get_ref().clone(),
            channel_capacity: config.channel_capacity,
        },
        &req,
        stream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_messages_are_flushed_in_order_on_connect() {
        let mut state = ConnectionState::Idle {
            pending: Vec::new(),
        };
        assert_eq!(state.accept(ClientMessage::RequestColor), None);
        assert_eq!(state.accept(ClientMessage::DrawingEnd), None);

        assert_eq!(
            state.connect(4),
            vec![ClientMessage::RequestColor, ClientMessage::DrawingEnd]
        );
        assert_eq!(state, ConnectionState::Connected(4));
    }

    #[test]
    fn connected_state_passes_messages_through() {
        let mut state = ConnectionState::Connected(2);
        assert_eq!(
            state.accept(ClientMessage::ClearCanvas),
            Some((2, ClientMessage::ClearCanvas))
        );
        assert!(state.connect(2).is_empty());
    }
}
