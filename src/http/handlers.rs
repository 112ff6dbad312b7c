//! Route handlers for the relayed `w3` commands.
//!
//! Each handler validates its input, builds one [`CommandInvocation`] and
//! awaits the executor. Handlers hold only immutable configuration, so any
//! number of requests can run them concurrently.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::command::{CommandError, CommandExecutor, CommandInvocation};
use crate::http::request::RequestContext;

/// How the response body should be labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Successful handler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: Vec<u8>,
    pub format: OutputFormat,
}

impl Payload {
    pub fn text(body: Vec<u8>) -> Self {
        Self {
            body,
            format: OutputFormat::Text,
        }
    }

    pub fn json(body: Vec<u8>) -> Self {
        Self {
            body,
            format: OutputFormat::Json,
        }
    }
}

/// Per-request failure. Never escapes into the relay lifecycle.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Missing or invalid input; the caller's fault.
    #[error("{0}")]
    Input(String),

    /// The external command failed or could not be started.
    #[error(transparent)]
    Execution(#[from] CommandError),

    /// The command output could not be served in the declared format.
    #[error("error serializing response: {0}")]
    Serialization(String),
}

pub type HandlerResult = Result<Payload, HandlerError>;

/// Uniform capability every registered route implements.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResult;
}

/// `w3 whoami`
pub struct WhoAmIHandler {
    executor: Arc<dyn CommandExecutor>,
}

impl WhoAmIHandler {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl RouteHandler for WhoAmIHandler {
    async fn handle(&self, _ctx: &RequestContext) -> HandlerResult {
        let stdout = self.executor.execute(CommandInvocation::new("whoami")).await?;
        Ok(Payload::text(stdout))
    }
}

/// `w3 login <email>`
pub struct LoginHandler {
    executor: Arc<dyn CommandExecutor>,
}

impl LoginHandler {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl RouteHandler for LoginHandler {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResult {
        let email = ctx.required_param("email")?;
        let stdout = self
            .executor
            .execute(CommandInvocation::new("login").arg(email))
            .await?;
        Ok(Payload::text(stdout))
    }
}

/// `w3 space create <space_name> --no-recovery`
pub struct SpaceCreateHandler {
    executor: Arc<dyn CommandExecutor>,
    space_name: String,
}

impl SpaceCreateHandler {
    pub fn new(executor: Arc<dyn CommandExecutor>, space_name: impl Into<String>) -> Self {
        Self {
            executor,
            space_name: space_name.into(),
        }
    }
}

#[async_trait]
impl RouteHandler for SpaceCreateHandler {
    async fn handle(&self, _ctx: &RequestContext) -> HandlerResult {
        let invocation = CommandInvocation::new("space").args([
            "create",
            self.space_name.as_str(),
            "--no-recovery",
        ]);
        let stdout = self.executor.execute(invocation).await?;
        Ok(Payload::text(stdout))
    }
}

/// `w3 up <rewards root>/<file> --no-wrap --json`
pub struct UploadHandler {
    executor: Arc<dyn CommandExecutor>,
    rewards_root: PathBuf,
}

impl UploadHandler {
    pub fn new(executor: Arc<dyn CommandExecutor>, rewards_root: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            rewards_root: rewards_root.into(),
        }
    }
}

#[async_trait]
impl RouteHandler for UploadHandler {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResult {
        let file = ctx.required_param("file")?;
        let path = resolve_upload_path(&self.rewards_root, file)?;

        match tokio::fs::metadata(&path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(HandlerError::Input(format!(
                    "file '{}' does not exist",
                    path.display()
                )));
            }
            // Anything else (e.g. permissions) is left for the command to report.
            _ => {}
        }

        let invocation = CommandInvocation::new("up")
            .arg(path.to_string_lossy())
            .args(["--no-wrap", "--json"]);
        let stdout = self.executor.execute(invocation).await?;
        Ok(Payload::json(stdout))
    }
}

/// Join `file` onto the rewards root, refusing anything that could leave it.
///
/// `.` components are dropped so the path handed to `w3` (and echoed back in
/// errors) is clean.
pub fn resolve_upload_path(root: &Path, file: &str) -> Result<PathBuf, HandlerError> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(HandlerError::Input(format!(
                    "file '{file}' must be a relative path inside the rewards files directory"
                )));
            }
        }
    }
    Ok(resolved)
}
