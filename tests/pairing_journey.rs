//! End-to-end tests of the pairing API over real HTTP.
//!
//! Each test binds a server on port 0 with an in-process connector and
//! drives it with reqwest, covering the journeys a caller goes through:
//! starting a pairing, polling status, and downloading the archived
//! session. Run: `cargo test --test pairing_journey`

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use pairgate::pairing::PairingService;
use pairgate::protocol::SimulatedConnector;
use pairgate::server::{PairingServer, ServerConfig, routes};
use pairgate::store::SessionStore;

struct Broker {
    server: PairingServer,
    base_url: String,
    // Keeps the sessions root alive for the duration of the test.
    _root: TempDir,
}

impl Broker {
    async fn spawn(connect_delay: Duration, archive_delay: Duration) -> Self {
        let root = TempDir::new().unwrap();
        let store = SessionStore::new(root.path()).unwrap();
        let connector = Arc::new(SimulatedConnector::new(connect_delay));
        let service = Arc::new(PairingService::new(store, connector, archive_delay));

        let mut server = PairingServer::new(ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
        });
        server.start(routes(service)).await.unwrap();
        let base_url = format!("http://{}", server.local_addr().unwrap());

        Self {
            server,
            base_url,
            _root: root,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[tokio::test]
async fn test_pair_without_phone_is_rejected() {
    let mut broker = Broker::spawn(Duration::from_secs(60), Duration::from_secs(60)).await;
    let client = reqwest::Client::new();

    for body in [serde_json::json!({}), serde_json::json!({ "phone": "" })] {
        let resp = client
            .post(broker.url("/api/pair"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let payload: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(payload["error"], "phone required");
    }

    broker.server.shutdown().await;
}

#[tokio::test]
async fn test_status_and_download_for_unknown_token() {
    let mut broker = Broker::spawn(Duration::from_secs(60), Duration::from_secs(60)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(broker.url("/api/status/no-such-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let payload: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(payload["error"], "not found");

    let resp = client
        .get(broker.url("/api/download/no-such-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    broker.server.shutdown().await;
}

#[tokio::test]
async fn test_fresh_session_is_pending_and_not_ready() {
    // Delays far beyond the test horizon keep the session pending.
    let mut broker = Broker::spawn(Duration::from_secs(60), Duration::from_secs(60)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(broker.url("/api/pair"))
        .json(&serde_json::json!({ "phone": "15551234567" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: serde_json::Value = resp.json().await.unwrap();
    let token = created["token"].as_str().unwrap().to_string();
    assert_eq!(created["message"], "pairing started");

    let resp = client
        .get(broker.url(&format!("/api/status/{token}")))
        .send()
        .await
        .unwrap();
    let status: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(status["phone"], "15551234567");
    assert_eq!(status["connected"], false);

    let resp = client
        .get(broker.url(&format!("/api/download/{token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let payload: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(payload["error"], "not ready");

    broker.server.shutdown().await;
}

#[tokio::test]
async fn test_full_pairing_journey() {
    let mut broker = Broker::spawn(Duration::from_millis(50), Duration::from_millis(100)).await;
    let client = reqwest::Client::new();

    // Start pairing.
    let resp = client
        .post(broker.url("/api/pair"))
        .json(&serde_json::json!({ "phone": "15551234567" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: serde_json::Value = resp.json().await.unwrap();

    let token = created["token"].as_str().unwrap().to_string();
    Uuid::parse_str(&token).expect("token is a uuid");

    // 8 raw characters surface as hyphen-joined groups of 4.
    let code = created["code"].as_str().unwrap();
    assert_eq!(code.len(), 9);
    let groups: Vec<&str> = code.split('-').collect();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.len() == 4));

    // The connection opens once the connector reports it.
    let mut connected = false;
    for _ in 0..100 {
        let status: serde_json::Value = client
            .get(broker.url(&format!("/api/status/{token}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status["connected"] == true {
            connected = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(connected, "session never reported connected");

    // The archive becomes downloadable after the grace delay.
    let mut archive_bytes = None;
    for _ in 0..100 {
        let resp = client
            .get(broker.url(&format!("/api/download/{token}")))
            .send()
            .await
            .unwrap();
        if resp.status() == 200 {
            assert_eq!(
                resp.headers()["content-type"].to_str().unwrap(),
                "application/zip"
            );
            assert_eq!(
                resp.headers()["content-disposition"].to_str().unwrap(),
                format!("attachment; filename={token}.zip")
            );
            archive_bytes = Some(resp.bytes().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let first = archive_bytes.expect("archive never became ready");
    assert!(!first.is_empty());

    // The blob is a zip of the session directory, credentials included.
    let mut archive = zip::ZipArchive::new(Cursor::new(first.to_vec())).unwrap();
    assert!(archive.by_name("creds.json").is_ok());

    // Downloads are idempotent after readiness.
    let second = client
        .get(broker.url(&format!("/api/download/{token}")))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(first, second);

    broker.server.shutdown().await;
}
