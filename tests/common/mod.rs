//! Shared utilities for integration tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use w3cli_relayer::command::{CommandError, CommandExecutor, CommandInvocation};
use w3cli_relayer::config::{CommandConfig, RelayConfig};
use w3cli_relayer::{RelayClient, RelayManager};

/// Scripted outcome for every invocation.
#[derive(Debug, Clone)]
pub enum Reply {
    Stdout(Vec<u8>),
    Exit { code: i32, stderr: String },
}

/// Executor that records invocations instead of running anything.
pub struct RecordingExecutor {
    reply: Reply,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn stdout(out: &str) -> Arc<Self> {
        Self::new(Reply::Stdout(out.as_bytes().to_vec()))
    }

    /// Every recorded invocation as `[name, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push(invocation.argv().map(str::to_string).collect());
        match &self.reply {
            Reply::Stdout(out) => Ok(out.clone()),
            Reply::Exit { code, stderr } => Err(CommandError::Exited {
                program: "w3".to_string(),
                code: *code,
                stderr: stderr.clone(),
            }),
        }
    }
}

/// A started relay in its own temp directory, which doubles as the rewards root.
pub struct TestRelay {
    pub dir: TempDir,
    pub manager: RelayManager,
    pub executor: Arc<RecordingExecutor>,
}

impl TestRelay {
    pub async fn start(executor: Arc<RecordingExecutor>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::new("test", dir.path().join("relay.sock"), dir.path());
        let mut manager =
            RelayManager::for_relay(config, &CommandConfig::default(), executor.clone()).unwrap();
        manager.start().await.unwrap();
        Self {
            dir,
            manager,
            executor,
        }
    }

    pub fn client(&self) -> RelayClient {
        RelayClient::new(self.manager.socket_path())
    }

    pub fn rewards_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_reward_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}
