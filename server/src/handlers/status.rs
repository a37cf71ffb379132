use actix_web::error;
use actix_web::web;
use actix_web::{HttpResponse, Result};
use tokio::sync::oneshot;

use crate::server::{ServerCommand, ServerTx};

/// Read-only view of the session: open connections, participants, canvas log size.
pub async fn status_handler(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let (tx, rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::Status { tx })
        .map_err(|_| error::ErrorServiceUnavailable("server stopped"))?;
    let snapshot = rx
        .await
        .map_err(|_| error::ErrorServiceUnavailable("server stopped"))?;
    Ok(HttpResponse::Ok().json(snapshot))
}
