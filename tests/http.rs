use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct HistoryItem {
    delta: i64,
    score_before: i64,
    score_after: i64,
    relative_time: String,
}

#[derive(Debug, Deserialize)]
struct Notification {
    kind: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TrackerResponse {
    current_score: i64,
    goal: i64,
    remaining: i64,
    wins: u64,
    losses: u64,
    progress_percent: i64,
    progress_tier: String,
    history: Vec<HistoryItem>,
    notification: Option<Notification>,
}

struct TestServer {
    base_url: String,
    child: Child,
    data_path: String,
    owns_data: bool,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        if self.owns_data {
            let _ = std::fs::remove_file(&self.data_path);
        }
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::OnceCell;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);
    static DATA_PATH: OnceCell<String> = OnceCell::new();

    pub fn register(pid: u32, data_path: &str) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            let _ = DATA_PATH.set(data_path.to_string());
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
        if let Some(path) = DATA_PATH.get() {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("goal_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

/// Server on a fresh data file that is removed when the server drops.
async fn spawn_server() -> TestServer {
    let mut server = spawn_server_with(&unique_data_path()).await;
    server.owns_data = true;
    server
}

async fn spawn_server_with(data_path: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_goal_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("POINT_STEP", "25")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        child,
        data_path: data_path.to_string(),
        owns_data: false,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    // the shared server lives in a static and is never dropped
    #[cfg(unix)]
    cleanup::register(server.child.id(), &server.data_path);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_state(client: &Client, base_url: &str) -> TrackerResponse {
    client
        .get(format!("{base_url}/api/state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn post_form(client: &Client, base_url: &str, path: &str, body: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}{path}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}

fn assert_redirects_home(response: &reqwest::Response) {
    assert_eq!(response.status().as_u16(), 303);
    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok());
    assert_eq!(location, Some("/"));
}

async fn post_json(
    client: &Client,
    base_url: &str,
    path: &str,
    body: serde_json::Value,
) -> reqwest::Response {
    client
        .post(format!("{base_url}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_score_add_records_a_win() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;

    let response = post_json(
        &client,
        &server.base_url,
        "/api/score",
        serde_json::json!({ "action": "add" }),
    )
    .await;
    assert!(response.status().is_success());
    let after: TrackerResponse = response.json().await.unwrap();

    assert_eq!(after.current_score, before.current_score + 25);
    assert_eq!(after.wins, before.wins + 1);
    assert_eq!(after.losses, before.losses);
    assert_eq!(after.history.len(), before.history.len() + 1);
    assert_eq!(after.wins + after.losses, after.history.len() as u64);

    let head = &after.history[0];
    assert_eq!(head.delta, 25);
    assert_eq!(head.score_before, before.current_score);
    assert_eq!(head.score_after, after.current_score);
    assert_eq!(head.relative_time, "just now");

    let note = after.notification.expect("missing notification");
    assert_eq!(note.kind, "success");
    assert_eq!(note.message, "+25 pts added!");
}

#[tokio::test]
async fn http_score_sub_records_a_loss() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;

    let response = post_json(
        &client,
        &server.base_url,
        "/api/score",
        serde_json::json!({ "action": "sub" }),
    )
    .await;
    assert!(response.status().is_success());

    let after = fetch_state(&client, &server.base_url).await;
    assert_eq!(after.current_score, before.current_score - 25);
    assert_eq!(after.wins, before.wins);
    assert_eq!(after.losses, before.losses + 1);
    assert_eq!(after.history[0].delta, -25);
    assert!(after.notification.is_none());
}

#[tokio::test]
async fn http_unknown_action_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;
    let response = post_json(
        &client,
        &server.base_url,
        "/api/score",
        serde_json::json!({ "action": "double" }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    let after = fetch_state(&client, &server.base_url).await;
    assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn http_invalid_goal_leaves_state_unchanged() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;
    for raw in ["abc", "0", "-5", ""] {
        let response = post_json(
            &client,
            &server.base_url,
            "/api/goal",
            serde_json::json!({ "goal": raw }),
        )
        .await;
        assert_eq!(response.status().as_u16(), 400, "input {raw:?}");
        assert_eq!(response.text().await.unwrap(), "Goal must be greater than 0!");
    }

    let after = fetch_state(&client, &server.base_url).await;
    assert_eq!(after.goal, before.goal);
    assert_eq!(after.current_score, before.current_score);
    assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn http_declined_clear_changes_nothing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_json(
        &client,
        &server.base_url,
        "/api/score",
        serde_json::json!({ "action": "add" }),
    )
    .await;
    let before = fetch_state(&client, &server.base_url).await;

    let response = post_json(
        &client,
        &server.base_url,
        "/api/clear",
        serde_json::json!({ "confirmed": false }),
    )
    .await;
    assert!(response.status().is_success());
    let after: TrackerResponse = response.json().await.unwrap();

    assert!(after.notification.is_none());
    assert_eq!(after.current_score, before.current_score);
    assert_eq!(after.history.len(), before.history.len());
    assert!(!after.history.is_empty());
}

#[tokio::test]
async fn http_goal_scenario_reaches_complete_and_clears() {
    let server = spawn_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let fresh = fetch_state(&client, base).await;
    assert_eq!(fresh.current_score, 0);
    assert_eq!(fresh.goal, 100);
    assert!(fresh.history.is_empty());

    let response = post_json(&client, base, "/api/goal", serde_json::json!({ "goal": "50" })).await;
    assert!(response.status().is_success());
    let updated: TrackerResponse = response.json().await.unwrap();
    assert_eq!(updated.goal, 50);
    assert_eq!(updated.notification.map(|note| note.kind).as_deref(), Some("success"));

    post_json(&client, base, "/api/score", serde_json::json!({ "action": "add" })).await;
    post_json(&client, base, "/api/score", serde_json::json!({ "action": "add" })).await;

    let done = fetch_state(&client, base).await;
    assert_eq!(done.current_score, 50);
    assert_eq!(done.remaining, 0);
    assert_eq!(done.progress_percent, 100);
    assert_eq!(done.progress_tier, "complete");

    let cleared: TrackerResponse = post_json(
        &client,
        base,
        "/api/clear",
        serde_json::json!({ "confirmed": true }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(cleared.current_score, 0);
    assert_eq!(cleared.wins, 0);
    assert_eq!(cleared.losses, 0);
    assert!(cleared.history.is_empty());
    assert_eq!(cleared.goal, 50);
    assert_eq!(cleared.notification.map(|note| note.kind).as_deref(), Some("info"));
}

#[tokio::test]
async fn http_state_survives_restart() {
    let data_path = unique_data_path();
    let client = Client::new();

    let first = spawn_server_with(&data_path).await;
    post_json(&client, &first.base_url, "/api/goal", serde_json::json!({ "goal": "200" })).await;
    post_json(&client, &first.base_url, "/api/score", serde_json::json!({ "action": "add" })).await;
    post_json(&client, &first.base_url, "/api/score", serde_json::json!({ "action": "sub" })).await;
    post_json(&client, &first.base_url, "/api/score", serde_json::json!({ "action": "add" })).await;
    let saved = fetch_state(&client, &first.base_url).await;
    drop(first);

    let second = spawn_server_with(&data_path).await;
    let restored = fetch_state(&client, &second.base_url).await;

    assert_eq!(restored.goal, 200);
    assert_eq!(restored.current_score, saved.current_score);
    assert_eq!(restored.wins, 2);
    assert_eq!(restored.losses, 1);
    let deltas: Vec<i64> = restored.history.iter().map(|item| item.delta).collect();
    assert_eq!(deltas, vec![25, -25, 25]);

    drop(second);
    let _ = std::fs::remove_file(&data_path);
}

#[tokio::test]
async fn http_index_renders_current_state() {
    let server = spawn_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Goal Tracker"));
    assert!(html.contains("No entries yet. Add your first result!"));
    assert!(html.contains("progress-low"));
}

#[tokio::test]
async fn http_form_routes_redirect_home() {
    let server = spawn_server().await;
    let client = no_redirect_client();
    let base = server.base_url.as_str();

    let response = post_form(&client, base, "/goal", "goal=60").await;
    assert_redirects_home(&response);
    assert_eq!(fetch_state(&client, base).await.goal, 60);

    let response = post_form(&client, base, "/score/add", "").await;
    assert_redirects_home(&response);
    let response = post_form(&client, base, "/score/add", "").await;
    assert_redirects_home(&response);
    let response = post_form(&client, base, "/score/sub", "").await;
    assert_redirects_home(&response);

    let state = fetch_state(&client, base).await;
    assert_eq!(state.current_score, 25);
    assert_eq!(state.wins, 2);
    assert_eq!(state.losses, 1);
    let deltas: Vec<i64> = state.history.iter().map(|item| item.delta).collect();
    assert_eq!(deltas, vec![-25, 25, 25]);

    let response = post_form(&client, base, "/clear", "confirmed=true").await;
    assert_redirects_home(&response);
    let cleared = fetch_state(&client, base).await;
    assert_eq!(cleared.current_score, 0);
    assert!(cleared.history.is_empty());
    assert_eq!(cleared.goal, 60);
}

#[tokio::test]
async fn http_form_goal_rejects_invalid_input() {
    let server = spawn_server().await;
    let client = no_redirect_client();
    let base = server.base_url.as_str();

    let before = fetch_state(&client, base).await;
    let response = post_form(&client, base, "/goal", "goal=abc").await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Goal must be greater than 0!");

    let after = fetch_state(&client, base).await;
    assert_eq!(after.goal, before.goal);
    assert_eq!(after.current_score, before.current_score);
}

#[tokio::test]
async fn http_form_clear_without_confirmation_keeps_history() {
    let server = spawn_server().await;
    let client = no_redirect_client();
    let base = server.base_url.as_str();

    post_form(&client, base, "/score/add", "").await;
    let response = post_form(&client, base, "/clear", "confirmed=false").await;
    assert_redirects_home(&response);

    let state = fetch_state(&client, base).await;
    assert_eq!(state.current_score, 25);
    assert_eq!(state.wins, 1);
    assert_eq!(state.history.len(), 1);
}
