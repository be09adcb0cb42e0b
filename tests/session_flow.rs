//! End-to-end session flow over HTTP, the WebSocket relay and SSE.
#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use rps_arena::api;
use rps_arena::app_state::AppState;
use rps_arena::client::SessionView;
use rps_arena::domain::{EventBus, PlayerId, SessionEvent};
use rps_arena::service::SessionService;
use rps_arena::store::MemoryStore;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_app() -> (SocketAddr, Arc<SessionService>) {
    let service = Arc::new(SessionService::new(
        Arc::new(MemoryStore::new()),
        EventBus::new(64),
    ));
    let app = api::build_app(AppState::new(Arc::clone(&service)));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, service)
}

async fn connect_ws(addr: SocketAddr) -> Socket {
    let url = format!("ws://{addr}/ws");
    let Ok((socket, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed");
    };
    socket
}

/// Reads the next text frame as a session event.
async fn next_event(socket: &mut Socket) -> SessionEvent {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(FRAME_TIMEOUT, socket.next()).await else {
            panic!("no frame within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(event) = SessionEvent::from_json(text.as_str()) else {
                panic!("malformed frame: {text}");
            };
            return event;
        }
    }
}

/// Incremental reader over a `text/event-stream` response body.
struct SseReader {
    response: reqwest::Response,
    buffer: String,
}

impl SseReader {
    fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            buffer: String::new(),
        }
    }

    /// Returns the next event carried in `data:` lines, skipping keep-alive
    /// comments.
    async fn next_event(&mut self) -> SessionEvent {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let data: String = frame
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if data.is_empty() {
                    continue;
                }
                let Ok(event) = SessionEvent::from_json(&data) else {
                    panic!("malformed sse data: {data}");
                };
                return event;
            }

            let Ok(Ok(Some(chunk))) =
                tokio::time::timeout(FRAME_TIMEOUT, self.response.chunk()).await
            else {
                panic!("no sse chunk within timeout");
            };
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

async fn post(
    client: &reqwest::Client,
    addr: SocketAddr,
    path: &str,
    body: Value,
) -> reqwest::Response {
    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1{path}"))
        .json(&body)
        .send()
        .await
    else {
        panic!("POST {path} failed");
    };
    resp
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let Ok(resp) = client.get(&url).send().await else {
        panic!("GET {url} failed");
    };
    let status = resp.status().as_u16();
    let Ok(body) = resp.json::<Value>().await else {
        panic!("GET {url} returned no JSON");
    };
    (status, body)
}

async fn join(client: &reqwest::Client, addr: SocketAddr, name: &str) -> String {
    let resp = post(client, addr, "/game/join", json!({ "playerName": name })).await;
    assert_eq!(resp.status().as_u16(), 201);
    let Ok(body) = resp.json::<Value>().await else {
        panic!("join returned no JSON");
    };
    let Some(id) = body["playerId"].as_str() else {
        panic!("join response without playerId: {body}");
    };
    id.to_string()
}

async fn play(
    client: &reqwest::Client,
    addr: SocketAddr,
    player_id: &str,
    choice: &str,
) -> u16 {
    let body = json!({ "playerId": player_id, "choice": choice });
    post(client, addr, "/game/move", body).await.status().as_u16()
}

#[tokio::test]
async fn full_round_reaches_every_client() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let mut socket = connect_ws(addr).await;
    let mut view = SessionView::new();

    let first = next_event(&mut socket).await;
    assert_eq!(first.event_type_str(), "INITIAL_DATA");
    view.apply(&first);
    assert!(view.players().is_empty());

    let alice = join(&client, addr, "Alice").await;
    let bob = join(&client, addr, "Bob").await;

    let carol = post(&client, addr, "/game/join", json!({ "playerName": "Carol" })).await;
    assert_eq!(carol.status().as_u16(), 409);
    let Ok(err) = carol.json::<Value>().await else {
        panic!("409 without JSON body");
    };
    assert_eq!(err["error"]["code"], 2001);

    assert_eq!(play(&client, addr, &alice, "Rock").await, 200);
    assert_eq!(play(&client, addr, &bob, "tesoura").await, 200);

    let mut kinds = Vec::new();
    loop {
        let event = next_event(&mut socket).await;
        kinds.push(event.event_type_str());
        view.apply(&event);
        if matches!(event, SessionEvent::GameResult { .. }) {
            break;
        }
    }
    assert_eq!(
        kinds,
        ["PLAYER_JOIN", "PLAYER_JOIN", "MOVE", "MOVE", "GAME_RESULT"]
    );
    assert!(view.is_full());

    let Some(result) = view.last_result() else {
        panic!("no result folded");
    };
    assert_eq!(result.winner.as_deref(), Some("Alice"));
    assert_eq!(result.loser.as_deref(), Some("Bob"));
    assert!(!result.is_draw);
    assert!(view.take_ranking_refresh());

    let (status, ranking) = get_json(&client, format!("http://{addr}/api/v1/ranking")).await;
    assert_eq!(status, 200);
    assert_eq!(ranking["topPlayers"][0]["name"], "Alice");
    assert_eq!(ranking["topPlayers"][0]["wins"], 1);
    assert_eq!(ranking["topPlayers"][1]["losses"], 1);
}

#[tokio::test]
async fn sse_stream_starts_with_snapshot_and_releases_on_disconnect() {
    let (addr, service) = spawn_app().await;
    let client = reqwest::Client::new();
    let alice = join(&client, addr, "Alice").await;

    let url = format!("http://{addr}/api/v1/game/events");
    let Ok(response) = client.get(&url).send().await else {
        panic!("GET {url} failed");
    };
    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut stream = SseReader::new(response);
    let SessionEvent::InitialData { players, .. } = stream.next_event().await else {
        panic!("first sse event is not INITIAL_DATA");
    };
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id.to_string(), alice);
    assert_eq!(service.event_bus().receiver_count(), 1);

    join(&client, addr, "Bob").await;
    let SessionEvent::PlayerJoin { player, .. } = stream.next_event().await else {
        panic!("expected PLAYER_JOIN over sse");
    };
    assert_eq!(player.name, "Bob");

    drop(stream);
    // Each leave publishes an event, so the server notices the closed
    // socket on its next write.
    for _ in 0..100 {
        if service.event_bus().receiver_count() == 0 {
            break;
        }
        let _ = service.leave(PlayerId::new()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(service.event_bus().receiver_count(), 0);
}

#[tokio::test]
async fn reset_clears_roster_and_ranking_but_keeps_stats() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = join(&client, addr, "Alice").await;
    let bob = join(&client, addr, "Bob").await;
    assert_eq!(play(&client, addr, &alice, "Paper").await, 200);
    assert_eq!(play(&client, addr, &bob, "Rock").await, 200);

    let resp = post(&client, addr, "/game/reset", json!({})).await;
    assert_eq!(resp.status().as_u16(), 204);

    let mut socket = connect_ws(addr).await;
    let SessionEvent::InitialData { players, .. } = next_event(&mut socket).await else {
        panic!("first frame is not INITIAL_DATA");
    };
    assert!(players.is_empty());

    let url = format!("http://{addr}/api/v1/ranking?limit=10");
    let (_, ranking) = get_json(&client, url).await;
    assert_eq!(ranking["topPlayers"], json!([]));

    let url = format!("http://{addr}/api/v1/players/Alice/stats");
    let (status, stats) = get_json(&client, url).await;
    assert_eq!(status, 200);
    assert_eq!(stats["wins"], 1);
    assert_eq!(stats["totalGames"], 1);

    let url = format!("http://{addr}/api/v1/players/Nobody/stats");
    let (status, _) = get_json(&client, url).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn draw_is_published_without_touching_stats() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let mut socket = connect_ws(addr).await;
    let _ = next_event(&mut socket).await;

    let alice = join(&client, addr, "Alice").await;
    let bob = join(&client, addr, "Bob").await;
    assert_eq!(play(&client, addr, &alice, "Pedra").await, 200);
    assert_eq!(play(&client, addr, &bob, "Rock").await, 200);

    let result = loop {
        let event = next_event(&mut socket).await;
        if let SessionEvent::GameResult { .. } = event {
            break event;
        }
    };
    let SessionEvent::GameResult {
        winner,
        loser,
        is_draw,
        ..
    } = result
    else {
        panic!("loop only breaks on GAME_RESULT");
    };
    assert!(is_draw);
    assert!(winner.is_none() && loser.is_none());

    let url = format!("http://{addr}/api/v1/players/Alice/stats");
    let (status, _) = get_json(&client, url).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = post(&client, addr, "/game/join", json!({ "playerName": "   " })).await;
    assert_eq!(resp.status().as_u16(), 400);

    let alice = join(&client, addr, "Alice").await;
    assert_eq!(play(&client, addr, &alice, "Lizard").await, 400);
    assert_eq!(play(&client, addr, "not-a-uuid", "Rock").await, 400);

    let ghost = PlayerId::new().to_string();
    assert_eq!(play(&client, addr, &ghost, "Rock").await, 404);
}

#[tokio::test]
async fn leave_is_a_no_op_for_absent_or_malformed_ids() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let alice = join(&client, addr, "Alice").await;

    for id in [alice.as_str(), alice.as_str(), "player_1700000000000_k3j9x"] {
        let resp = post(&client, addr, "/game/leave", json!({ "playerId": id })).await;
        assert_eq!(resp.status().as_u16(), 204);
    }

    let url = format!("http://{addr}/api/v1/game/players");
    let (status, body) = get_json(&client, url).await;
    assert_eq!(status, 200);
    assert_eq!(body["players"], json!([]));
}

#[tokio::test]
async fn health_reports_ok() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (status, body) = get_json(&client, format!("http://{addr}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}
