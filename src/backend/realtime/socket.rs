/**
 * WebSocket Transport
 *
 * Drives one upgraded socket for an already authenticated principal:
 *
 * 1. `hub.connect` registers the connection and hands back its outbound queue
 * 2. a writer task serializes queued `ServerEvent`s as text frames
 * 3. the reader loop parses `ClientEvent`s and hands them to the hub one at a
 *    time, so a client's frames are processed in the order sent
 * 4. on close or transport error `hub.disconnect` runs exactly once
 */

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::backend::auth::Principal;
use crate::backend::realtime::hub::RealtimeHub;
use crate::shared::{ClientEvent, ServerEvent, SharedError};

pub async fn run_connection(socket: WebSocket, hub: RealtimeHub, principal: Principal) {
    let (connection, mut outbox) = hub.connect(&principal);
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match encode_frame(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to encode {}: {}", event.name(), e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match parse_frame(text.as_str()) {
                Ok(event) => hub.handle(&principal, connection, event).await,
                Err(err) => hub.send_error(connection, format!("Malformed frame: {}", err)),
            },
            Ok(WsMessage::Binary(_)) => {
                hub.send_error(connection, "Binary frames are not supported")
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[Realtime] {} transport error: {}", connection, e);
                break;
            }
        }
    }

    hub.disconnect(connection);
    writer.abort();
}

/// Decode an inbound text frame
pub fn parse_frame(text: &str) -> Result<ClientEvent, SharedError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode an outbound frame the way the writer task does
pub fn encode_frame(event: &ServerEvent) -> Result<String, SharedError> {
    Ok(serde_json::to_string(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_frame_errors_are_serialization_errors() {
        assert_matches!(
            parse_frame("{not json"),
            Err(SharedError::SerializationError { .. })
        );

        let err = parse_frame(r#"{"event":"typing","data":{"recipientId":"nope","isTyping":true}}"#)
            .unwrap_err();
        assert_matches!(err, SharedError::SerializationError { .. });
    }

    #[test]
    fn test_parse_frame() {
        let frame = parse_frame(r#"{"event":"leaveChat","data":{"userId":"00000000-0000-0000-0000-000000000001","recipientId":"00000000-0000-0000-0000-000000000002"}}"#);
        assert_matches!(frame, Ok(ClientEvent::LeaveChat(_)));
    }

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(&ServerEvent::JoinedChat { chat_room: "a:b".into() }).unwrap();
        assert_eq!(frame, r#"{"event":"joinedChat","data":{"chatRoom":"a:b"}}"#);
    }
}
