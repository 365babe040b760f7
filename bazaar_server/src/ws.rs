//! The realtime chat channel.
//!
//! Each connection moves through `Connecting → Authorizing → Open → Closed`. The websocket
//! handshake is completed first; the credential and participant checks run once, immediately after,
//! and a failed check closes the socket with a policy-violation code before it ever reaches `Open`.
//! While `Open`, each inbound text frame is one message submission: malformed frames and rejected
//! submissions are dropped without closing the connection. On disconnect the connection is removed
//! from the fan-out registry and the remaining participants receive a presence event.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{AggregatedMessage, CloseCode, CloseReason, MessageStream, Session};
use bazaar_engine::{
    authz::capability_for,
    db_types::Principal,
    traits::{ChatManagement, IdentityManagement, OrderManagement},
    ChatApi,
    IdentityApi,
};
use futures::StreamExt;
use log::*;

use crate::{
    data_objects::{ChatEvent, InboundFrame, StreamQuery},
    fanout::ConnectionRegistry,
    route,
};

route!(chat_stream => Get "/chats/{chat_id}/stream" impl ChatManagement, OrderManagement, IdentityManagement);
/// Route handler for the realtime chat channel.
///
/// The credential travels as a query parameter because browser websocket clients cannot set
/// headers. The handshake is accepted before authorization so that a rejection can be signalled
/// with a close code rather than an HTTP error.
pub async fn chat_stream<B>(
    req: HttpRequest,
    body: web::Payload,
    path: web::Path<i64>,
    query: web::Query<StreamQuery>,
    identity_api: web::Data<IdentityApi<B>>,
    chat_api: web::Data<ChatApi<B>>,
    registry: web::Data<ConnectionRegistry>,
) -> Result<HttpResponse, actix_web::Error>
where
    B: ChatManagement + OrderManagement + IdentityManagement + 'static,
{
    let chat_id = path.into_inner();
    let credential = query.into_inner().credential;
    trace!("📡️ Incoming stream connection for chat {chat_id}");
    let (response, session, msg_stream) = actix_ws::handle(&req, body)?;
    actix_web::rt::spawn(chat_session(chat_id, credential, identity_api, chat_api, registry, session, msg_stream));
    Ok(response)
}

async fn chat_session<B>(
    chat_id: i64,
    credential: String,
    identity_api: web::Data<IdentityApi<B>>,
    chat_api: web::Data<ChatApi<B>>,
    registry: web::Data<ConnectionRegistry>,
    mut session: Session,
    msg_stream: MessageStream,
) where
    B: ChatManagement + OrderManagement + IdentityManagement + 'static,
{
    // Authorizing. Principal resolution and the participant-of-order check happen exactly once,
    // before the first frame is exchanged.
    let principal = match identity_api.authenticate(&credential).await {
        Ok(principal) => principal,
        Err(e) => {
            debug!("📡️ Closing stream for chat {chat_id}: {e}");
            return close_with_policy_violation(session).await;
        },
    };
    let order = match chat_api.order_for_chat(chat_id).await {
        Ok(Some((_, order))) => order,
        Ok(None) => {
            debug!("📡️ Closing stream: chat {chat_id} does not exist");
            return close_with_policy_violation(session).await;
        },
        Err(e) => {
            warn!("📡️ Could not resolve chat {chat_id}: {e}");
            return close_with_policy_violation(session).await;
        },
    };
    if !capability_for(&principal, &order).may_view() {
        debug!("📡️ Closing stream: {} is not a participant of chat {chat_id}", principal.username);
        return close_with_policy_violation(session).await;
    }

    // Open. Register with the fan-out and let the other side know.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    registry.register(chat_id, principal.id, tx);
    registry.broadcast(chat_id, &ChatEvent::presence(&principal, true), Some(principal.id));
    info!("📡️ {} joined chat {chat_id}", principal.username);

    let mut stream = msg_stream.aggregate_continuations();
    let close_reason = loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(AggregatedMessage::Text(text))) => {
                    handle_submission(chat_api.as_ref(), &registry, &principal, chat_id, &text).await;
                },
                Some(Ok(AggregatedMessage::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break None;
                    }
                },
                Some(Ok(AggregatedMessage::Close(reason))) => break reason,
                // Binary and pong frames carry no submissions; drop them and stay open.
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    debug!("📡️ Protocol error on chat {chat_id}: {e}");
                    break None;
                },
                None => break None,
            },
            event = rx.recv() => match event {
                Some(event) => {
                    let Ok(frame) = serde_json::to_string(&event) else { continue };
                    if session.text(frame).await.is_err() {
                        break None;
                    }
                },
                None => break None,
            },
        }
    };

    // Closed. Deregister first so the departing connection never receives its own leave event.
    registry.unregister(chat_id, principal.id);
    registry.broadcast(chat_id, &ChatEvent::presence(&principal, false), Some(principal.id));
    info!("📡️ {} left chat {chat_id}", principal.username);
    let _ = session.close(close_reason).await;
}

/// Decode and persist one inbound submission, then fan it out to every connected participant.
/// The sender is included: the echo carries the persisted message id and acts as the delivery
/// acknowledgement. Failures are dropped without touching the connection.
async fn handle_submission<B>(
    chat_api: &ChatApi<B>,
    registry: &ConnectionRegistry,
    sender: &Principal,
    chat_id: i64,
    text: &str,
) where
    B: ChatManagement + OrderManagement,
{
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("📡️ Dropping malformed frame on chat {chat_id}: {e}");
            return;
        },
    };
    match chat_api.post_message(sender, chat_id, &frame.content).await {
        Ok(message) => registry.broadcast(chat_id, &ChatEvent::from_message(&message, sender), None),
        Err(e) => debug!("📡️ Dropping rejected submission on chat {chat_id}: {e}"),
    }
}

async fn close_with_policy_violation(session: Session) {
    let reason = CloseReason { code: CloseCode::Policy, description: None };
    let _ = session.close(Some(reason)).await;
}
