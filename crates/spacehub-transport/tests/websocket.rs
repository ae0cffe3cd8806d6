//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real WebSocket listener on an OS-assigned port
//! and talk to it with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use bytes::Bytes;
    use futures_util::{SinkExt, StreamExt};
    use spacehub_transport::{
        Connection, Handshake, Inbound, Transport, TransportError,
        WebSocketConfig, WebSocketConnection, WebSocketTransport,
    };
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn bind(config: WebSocketConfig) -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0", config)
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    /// Accepts one connection on `transport` while a client connects to
    /// `ws://{addr}/ws`.
    async fn pair(
        mut transport: WebSocketTransport,
        addr: &str,
    ) -> (WebSocketConnection, ClientWs) {
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("should upgrade")
        });
        let (client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
                .await
                .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        // JSON goes out as a text frame.
        conn.send(Bytes::from_static(br#"{"type":"ERROR","error":"x"}"#))
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"ERROR","error":"x"}"#);

        client
            .send(Message::text(r#"{"type":"JOIN"}"#.to_string()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(
            received,
            Inbound::Message(Bytes::from_static(br#"{"type":"JOIN"}"#))
        );

        conn.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_binary_frames_are_accepted() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        client
            .send(Message::binary(b"hello".to_vec()))
            .await
            .unwrap();
        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, Inbound::Message(Bytes::from_static(b"hello")));
    }

    #[tokio::test]
    async fn test_pong_is_reported_as_probe() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        client.send(Message::Pong(Bytes::new())).await.unwrap();
        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, Inbound::Probe);
    }

    #[tokio::test]
    async fn test_server_ping_reaches_client() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        conn.ping().await.expect("ping");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_ping());
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_close_twice_is_a_no_op() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        conn.close().await.expect("first close");
        conn.close().await.expect("second close");
        assert!(conn.is_closed());
        assert!(conn.send(Bytes::from_static(b"late")).await.is_err());

        // The client sees the close frame.
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_close());
    }

    #[tokio::test]
    async fn test_send_proceeds_while_recv_is_pending() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), conn.send(Bytes::from_static(b"{}")))
            .await
            .expect("send must not wait for the reader")
            .expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"{}");

        client.send(Message::Close(None)).await.unwrap();
        let read = reader.await.unwrap().unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_oversized_message_is_a_receive_error() {
        let config = WebSocketConfig {
            max_frame_bytes: 64,
            ..WebSocketConfig::default()
        };
        let (transport, addr) = bind(config).await;
        let (conn, mut client) = pair(transport, &addr).await;

        client
            .send(Message::text("x".repeat(1024)))
            .await
            .unwrap();
        assert!(conn.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_non_utf8_payload_goes_out_as_binary() {
        let (transport, addr) = bind(WebSocketConfig::default()).await;
        let (conn, mut client) = pair(transport, &addr).await;

        conn.send(Bytes::from_static(&[0xff, 0x00])).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00]);
    }

    #[tokio::test]
    async fn test_wrong_path_is_rejected() {
        let (mut transport, addr) = bind(WebSocketConfig::default()).await;
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await
        });

        let result =
            tokio_tungstenite::connect_async(format!("ws://{addr}/other")).await;
        assert!(result.is_err(), "upgrade on /other must fail");
        assert!(server.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_accept_returns_before_the_upgrade() {
        let (mut transport, addr) = bind(WebSocketConfig::default()).await;

        let silent = TcpStream::connect(&addr).await.unwrap();
        let pending = tokio::time::timeout(
            Duration::from_secs(1),
            transport.accept(),
        )
        .await
        .expect("accept must not wait for the upgrade request")
        .expect("should accept");
        assert_eq!(pending.peer_addr(), silent.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_silent_peer_does_not_hold_up_other_upgrades() {
        let (mut transport, addr) = bind(WebSocketConfig::default()).await;
        let (upgraded_tx, mut upgraded) = tokio::sync::mpsc::channel(4);

        tokio::spawn(async move {
            while let Ok(pending) = transport.accept().await {
                let upgraded_tx = upgraded_tx.clone();
                tokio::spawn(async move {
                    let _ = upgraded_tx.send(pending.complete().await).await;
                });
            }
        });

        let _silent = TcpStream::connect(&addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (_client, _) = tokio::time::timeout(
            Duration::from_secs(1),
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws")),
        )
        .await
        .expect("client must not wait behind the silent peer")
        .expect("client should connect");

        let conn = tokio::time::timeout(Duration::from_secs(1), upgraded.recv())
            .await
            .expect("upgrade in time")
            .expect("accept loop running");
        assert!(conn.is_ok());
    }

    #[tokio::test]
    async fn test_handshake_times_out_and_drops_peer() {
        let config = WebSocketConfig {
            handshake_timeout: Duration::from_millis(100),
            ..WebSocketConfig::default()
        };
        let (mut transport, addr) = bind(config).await;

        let mut silent = TcpStream::connect(&addr).await.unwrap();
        let pending = transport.accept().await.expect("should accept");
        let result = pending.complete().await;
        assert!(matches!(
            result,
            Err(TransportError::Timeout {
                operation: "handshake"
            })
        ));

        // The server side of the socket is gone.
        let mut buf = [0u8; 16];
        let read = tokio::time::timeout(Duration::from_secs(1), silent.read(&mut buf))
            .await
            .expect("peer should see the socket close");
        assert!(matches!(read, Ok(0) | Err(_)));
    }
}
