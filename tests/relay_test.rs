//! End-to-end tests over a real Unix socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::{Barrier, Notify};

use w3cli_relayer::command::{CommandError, CommandExecutor, CommandInvocation, ProcessExecutor};
use w3cli_relayer::config::{CommandConfig, RelayConfig};
use w3cli_relayer::lifecycle::{Shutdown, Supervisor};
use w3cli_relayer::{RelayClient, RelayManager, RelayState};

mod common;

use common::{RecordingExecutor, Reply, TestRelay};

/// Answers "done" after a delay, announcing each command as it starts.
struct SlowExecutor {
    delay: Duration,
    started: Notify,
}

#[async_trait]
impl CommandExecutor for SlowExecutor {
    async fn execute(&self, _invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
        self.started.notify_one();
        tokio::time::sleep(self.delay).await;
        Ok(b"done".to_vec())
    }
}

/// Only answers once `parties` commands are running at the same time.
struct BarrierExecutor {
    barrier: Barrier,
    calls: AtomicUsize,
}

#[async_trait]
impl CommandExecutor for BarrierExecutor {
    async fn execute(&self, _invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;
        Ok(b"me".to_vec())
    }
}

async fn start_with(dir: &std::path::Path, executor: Arc<dyn CommandExecutor>) -> RelayManager {
    let config = RelayConfig::new("test", dir.join("relay.sock"), dir);
    let mut manager = RelayManager::for_relay(config, &CommandConfig::default(), executor).unwrap();
    manager.start().await.unwrap();
    manager
}

#[tokio::test]
async fn whoami_returns_stdout_as_text() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("did:key:z6Mk\n")).await;

    let res = relay.client().whoami().await.unwrap();
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type.as_deref(), Some("text/plain"));
    assert_eq!(res.text(), "did:key:z6Mk\n");
    assert_eq!(relay.executor.calls(), vec![vec!["whoami".to_string()]]);

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn fixed_commands_ignore_query() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("ok")).await;
    let client = relay.client();

    client.get("/w3cli/whoami", &[("extra", "1")]).await.unwrap();
    client.get("/w3cli/space-create", &[("name", "mine")]).await.unwrap();

    assert_eq!(
        relay.executor.calls(),
        vec![
            vec!["whoami".to_string()],
            vec![
                "space".to_string(),
                "create".to_string(),
                "rp_odao".to_string(),
                "--no-recovery".to_string()
            ],
        ]
    );

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn login_passes_email_verbatim() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("check your inbox")).await;

    let res = relay.client().login("ops+relay@example.com").await.unwrap();
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        relay.executor.calls(),
        vec![vec!["login".to_string(), "ops+relay@example.com".to_string()]]
    );

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn missing_parameters_are_bad_requests() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("unused")).await;
    let client = relay.client();

    let res = client.get("/w3cli/login", &[]).await.unwrap();
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), "email parameter is required");

    let res = client.get("/w3cli/login", &[("email", "")]).await.unwrap();
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = client.get("/w3cli/up", &[]).await.unwrap();
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), "file parameter is required");

    assert!(relay.executor.calls().is_empty());
    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn upload_of_missing_file_names_resolved_path() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("{}")).await;

    let res = relay.client().upload("rewards-42.json").await.unwrap();
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let expected = relay.rewards_dir().join("rewards-42.json");
    assert_eq!(res.text(), format!("file '{}' does not exist", expected.display()));
    assert!(relay.executor.calls().is_empty());

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn upload_rejects_paths_outside_rewards_dir() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("{}")).await;
    let client = relay.client();

    for file in ["../secret.json", "/etc/passwd"] {
        let res = client.upload(file).await.unwrap();
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{file}");
    }
    assert!(relay.executor.calls().is_empty());

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn upload_returns_json_unmodified() {
    let stdout = "{\"root\":{\"/\":\"bafybeigdyr\"}}\n";
    let mut relay = TestRelay::start(RecordingExecutor::stdout(stdout)).await;
    let path = relay.write_reward_file("rewards-42.json", "{}");

    let res = relay.client().upload("rewards-42.json").await.unwrap();
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type.as_deref(), Some("application/json"));
    assert_eq!(res.text(), stdout);
    assert_eq!(
        relay.executor.calls(),
        vec![vec![
            "up".to_string(),
            path.to_string_lossy().into_owned(),
            "--no-wrap".to_string(),
            "--json".to_string(),
        ]]
    );

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn upload_with_invalid_json_is_server_error() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("not json")).await;
    relay.write_reward_file("rewards.json", "{}");

    let res = relay.client().upload("rewards.json").await.unwrap();
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().starts_with("error serializing response"));

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn command_failure_is_server_error() {
    let mut relay = TestRelay::start(RecordingExecutor::new(Reply::Exit {
        code: 1,
        stderr: "boom".to_string(),
    }))
    .await;

    let res = relay.client().whoami().await.unwrap();
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.content_type.as_deref(), Some("text/plain"));
    let body = res.text();
    assert!(body.contains("status code 1"), "{body}");
    assert!(body.contains("boom"), "{body}");

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn real_process_failure_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = RelayConfig::new("false", dir.path().join("relay.sock"), dir.path());
    let mut manager = RelayManager::for_relay(
        config,
        &CommandConfig::default(),
        Arc::new(ProcessExecutor::new("false")),
    )
    .unwrap();
    manager.start().await.unwrap();

    let res = RelayClient::new(manager.socket_path()).whoami().await.unwrap();
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().starts_with("false exited with status code 1"));

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("ok")).await;

    let res = relay.client().get("/w3cli/nope", &[]).await.unwrap();
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(relay.executor.calls().is_empty());

    relay.manager.stop().await.unwrap();
}

#[tokio::test]
async fn socket_is_rebindable_after_stop() {
    let mut relay = TestRelay::start(RecordingExecutor::stdout("ok")).await;
    let socket = relay.manager.socket_path().to_path_buf();

    relay.manager.stop().await.unwrap();
    assert_eq!(relay.manager.state(), RelayState::Stopped);
    assert!(!socket.exists());
    assert!(relay.client().whoami().await.is_err());

    let config = RelayConfig::new("again", &socket, relay.rewards_dir());
    let mut again =
        RelayManager::for_relay(config, &CommandConfig::default(), relay.executor.clone()).unwrap();
    again.start().await.unwrap();
    let res = RelayClient::new(&socket).whoami().await.unwrap();
    assert_eq!(res.status, StatusCode::OK);
    again.stop().await.unwrap();
}

#[tokio::test]
async fn supervisor_serves_every_relay_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let executor = RecordingExecutor::stdout("me");
    let managers = ["a", "b"]
        .iter()
        .map(|name| {
            RelayManager::for_relay(
                RelayConfig::new(*name, dir.path().join(format!("{name}.sock")), dir.path()),
                &CommandConfig::default(),
                executor.clone(),
            )
            .unwrap()
        })
        .collect();
    let mut supervisor = Supervisor::new(managers);
    supervisor.start_all().await.unwrap();

    for name in ["a", "b"] {
        let res = RelayClient::new(dir.path().join(format!("{name}.sock")))
            .whoami()
            .await
            .unwrap();
        assert_eq!(res.text(), "me");
    }

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let trigger = shutdown.clone();
    let handle = tokio::spawn(async move { supervisor.run(rx).await });
    trigger.trigger();

    let failures = handle.await.unwrap();
    assert!(failures.is_empty());
    assert!(!dir.path().join("a.sock").exists());
    assert!(!dir.path().join("b.sock").exists());
}

#[tokio::test]
async fn in_flight_request_completes_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(SlowExecutor {
        delay: Duration::from_millis(300),
        started: Notify::new(),
    });
    let mut manager = start_with(dir.path(), executor.clone()).await;
    let socket = manager.socket_path().to_path_buf();

    let client = RelayClient::new(&socket);
    let request = tokio::spawn(async move { client.whoami().await });
    executor.started.notified().await;

    manager.stop().await.unwrap();
    assert_eq!(manager.state(), RelayState::Stopped);
    assert!(!socket.exists());

    let res = request.await.unwrap().unwrap();
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "done");
}

#[tokio::test]
async fn identical_concurrent_requests_run_independently() {
    const PARTIES: usize = 3;
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(BarrierExecutor {
        barrier: Barrier::new(PARTIES),
        calls: AtomicUsize::new(0),
    });
    let mut manager = start_with(dir.path(), executor.clone()).await;
    let client = RelayClient::new(manager.socket_path());

    // Serialized or deduplicated requests would never fill the barrier.
    let requests = (0..PARTIES).map(|_| client.whoami());
    let responses = tokio::time::timeout(
        Duration::from_secs(5),
        futures_util::future::join_all(requests),
    )
    .await
    .expect("requests were not run concurrently");

    for res in responses {
        let res = res.unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.text(), "me");
    }
    assert_eq!(executor.calls.load(Ordering::SeqCst), PARTIES);

    manager.stop().await.unwrap();
}
