// WebSocket server for draft clients.

use std::net::SocketAddr;

use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{info, warn};

use crate::handler::Handler;

/// Outbound frames buffered per connection before the reader back-pressures.
const OUTBOUND_BUFFER: usize = 64;

/// Bind the listener on `127.0.0.1:{port}`. Port 0 picks a free port.
pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    info!("WebSocket server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept connections forever, serving each on its own task.
///
/// Connections are independent: a slow or misbehaving client only stalls its
/// own replies. Runs until the task is aborted or accepting fails.
pub async fn run(listener: TcpListener, handler: Handler) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Accepted TCP connection from {addr}");
        let handler = handler.clone();
        tokio::spawn(async move {
            serve_connection(stream, addr, handler).await;
        });
    }
}

async fn serve_connection(stream: TcpStream, addr: SocketAddr, handler: Handler) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {addr}: {e}");
            return;
        }
    };

    let (mut write, read) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = write.send(msg).await {
                warn!("Failed to write to {addr}: {e}");
                break;
            }
        }
        let _ = write.close().await;
    });

    let addr_str = addr.to_string();
    if process_message_stream(read, &tx, &handler, &addr_str)
        .await
        .is_err()
    {
        warn!("Writer for {addr_str} went away before the reader finished");
    }

    // Dropping the sender lets the writer drain queued replies and exit.
    drop(tx);
    let _ = writer.await;
    info!("Client {addr_str} disconnected");
}

/// Answer each text frame from `stream` with one reply on `tx`, in arrival
/// order. Returns `Err(())` if the outbound channel is closed.
///
/// Generic over the stream type so it can be driven by in-memory streams.
pub async fn process_message_stream<St>(
    mut stream: St,
    tx: &mpsc::Sender<Message>,
    handler: &Handler,
    addr: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                let reply = handler.handle_text(text.to_string()).await;
                if tx.send(Message::Text(reply.into())).await.is_err() {
                    return Err(());
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {addr} sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {addr}: {e}");
                break;
            }
            _ => {
                // Binary, Ping, Pong and raw frames carry no requests.
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftclock_core::db::Database;
    use draftclock_core::draft::clock::ClockSettings;
    use draftclock_core::draft::league::MemberRole;
    use draftclock_core::service::DraftService;
    use futures_util::stream;
    use std::sync::Arc;

    fn mock_stream(
        messages: Vec<Result<Message, WsError>>,
    ) -> impl Stream<Item = Result<Message, WsError>> + Unpin {
        stream::iter(messages)
    }

    fn handler() -> Handler {
        let db = Database::open(":memory:").unwrap();
        let league = db.create_league("Socket League", None, None).unwrap();
        db.add_member(league, "amy", "Amy's", MemberRole::Admin, None).unwrap();
        Handler::new(
            Arc::new(DraftService::new(db, ClockSettings::default())),
            None,
        )
    }

    fn reply_json(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_request_gets_one_reply() {
        let (tx, mut rx) = mpsc::channel(64);
        let messages = vec![Ok(Message::Text(
            r#"{"type":"GET_DRAFT_STATE","request_id":"a","league_id":1}"#.into(),
        ))];

        process_message_stream(mock_stream(messages), &tx, &handler(), "test")
            .await
            .unwrap();

        let reply = reply_json(rx.recv().await.unwrap());
        assert_eq!(reply["type"], "DRAFT_STATE");
        assert_eq!(reply["request_id"], "a");
        assert_eq!(reply["state"]["status"], "not_started");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn replies_follow_request_order() {
        let (tx, mut rx) = mpsc::channel(64);
        let messages = vec![
            Ok(Message::Text(r#"{"type":"GET_DRAFT_STATE","request_id":"1","league_id":1}"#.into())),
            Ok(Message::Text("garbage".into())),
            Ok(Message::Text(r#"{"type":"GET_DRAFT_STATE","request_id":"3","league_id":99}"#.into())),
        ];

        process_message_stream(mock_stream(messages), &tx, &handler(), "test")
            .await
            .unwrap();

        assert_eq!(reply_json(rx.recv().await.unwrap())["request_id"], "1");
        assert_eq!(reply_json(rx.recv().await.unwrap())["kind"], "BAD_REQUEST");
        let third = reply_json(rx.recv().await.unwrap());
        assert_eq!(third["request_id"], "3");
        assert_eq!(third["kind"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn close_frame_stops_processing() {
        let (tx, mut rx) = mpsc::channel(64);
        let messages = vec![
            Ok(Message::Text(r#"{"type":"GET_DRAFT_STATE","league_id":1}"#.into())),
            Ok(Message::Close(None)),
            Ok(Message::Text(r#"{"type":"GET_DRAFT_STATE","league_id":1}"#.into())),
        ];

        process_message_stream(mock_stream(messages), &tx, &handler(), "test")
            .await
            .unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn error_stops_processing() {
        let (tx, mut rx) = mpsc::channel(64);
        let messages = vec![
            Err(WsError::ConnectionClosed),
            Ok(Message::Text(r#"{"type":"GET_DRAFT_STATE","league_id":1}"#.into())),
        ];

        process_message_stream(mock_stream(messages), &tx, &handler(), "test")
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn binary_and_ping_messages_are_ignored() {
        let (tx, mut rx) = mpsc::channel(64);
        let messages = vec![
            Ok(Message::Binary(vec![1, 2, 3].into())),
            Ok(Message::Ping(vec![].into())),
            Ok(Message::Pong(vec![].into())),
        ];

        process_message_stream(mock_stream(messages), &tx, &handler(), "test")
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn returns_err_when_channel_closed() {
        let (tx, rx) = mpsc::channel(64);
        drop(rx);

        let messages = vec![Ok(Message::Text(
            r#"{"type":"GET_DRAFT_STATE","league_id":1}"#.into(),
        ))];

        let result = process_message_stream(mock_stream(messages), &tx, &handler(), "test").await;
        assert!(result.is_err());
    }
}
