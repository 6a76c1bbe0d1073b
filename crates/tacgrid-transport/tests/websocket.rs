//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a `tokio-tungstenite` client to
//! verify that frames actually cross the network.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tacgrid_transport::{Connection, Transport, TransportError, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on a random port, connects one client, and returns both ends.
    async fn connected_pair() -> (tacgrid_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server_handle = tokio::spawn(async move {
            let incoming = transport.accept().await.expect("should accept");
            WebSocketTransport::upgrade(incoming)
                .await
                .expect("should upgrade")
        });

        let (client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/websocket"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        (server_conn, client)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (server_conn, mut client_ws) = connected_pair().await;
        assert!(server_conn.id().into_inner() > 0);

        // UTF-8 payloads go out as text frames.
        server_conn
            .send(br#"{"Type":"Hello"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_data().as_ref(), br#"{"Type":"Hello"}"#);

        client_ws
            .send(Message::Text(r#"{"Row":1,"Column":2}"#.into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"Row":1,"Column":2}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (server_conn, mut client_ws) = connected_pair().await;

        server_conn.send(&[0xff, 0xfe, 0x00]).await.unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_is_pending() {
        let (server_conn, mut client_ws) = connected_pair().await;
        let server_conn = Arc::new(server_conn);

        // A reader parked in recv() must not block a writer.
        let reader = {
            let conn = Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), server_conn.send(b"ping"))
            .await
            .expect("send must not wait for the reader")
            .unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client_ws.send(Message::Text("pong".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some(&b"pong"[..]));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client_ws) = connected_pair().await;

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_accept_returns_before_the_handshake() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        // Connects but never sends the upgrade request.
        let _silent = tokio::net::TcpStream::connect(addr).await.unwrap();

        let incoming = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must not wait for the handshake")
            .expect("should accept");
        assert_eq!(incoming.peer_addr().ip(), addr.ip());

        let upgrade = tokio::time::timeout(
            Duration::from_millis(100),
            WebSocketTransport::upgrade(incoming),
        )
        .await;
        assert!(upgrade.is_err(), "upgrade should still be waiting on the peer");
    }

    #[tokio::test]
    async fn test_upgrade_of_non_websocket_peer_fails() {
        use tokio::io::AsyncWriteExt;

        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client.write_all(b"hello there\r\n\r\n").await.unwrap();

        let incoming = transport.accept().await.expect("should accept");
        let result = WebSocketTransport::upgrade(incoming).await;
        assert!(matches!(result, Err(TransportError::HandshakeFailed(_))));
    }
}
