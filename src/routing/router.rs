//! Route registration.
//!
//! # Responsibilities
//! - Store (method, path) → handler registrations
//! - Reject duplicate registrations and methods axum cannot filter on
//! - Build the fixed relay route set from configuration
//!
//! Immutable after construction; shared across requests without locks.

use std::path::Path;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::MethodFilter;
use thiserror::Error;

use crate::command::CommandExecutor;
use crate::config::CommandConfig;
use crate::http::handlers::{
    LoginHandler, RouteHandler, SpaceCreateHandler, UploadHandler, WhoAmIHandler,
};

pub const WHOAMI_PATH: &str = "/w3cli/whoami";
pub const LOGIN_PATH: &str = "/w3cli/login";
pub const SPACE_CREATE_PATH: &str = "/w3cli/space-create";
pub const UPLOAD_PATH: &str = "/w3cli/up";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route {method} {path} is already registered")]
    Duplicate { method: Method, path: String },

    #[error("method {0} cannot be routed")]
    UnsupportedMethod(Method),
}

/// A single registered route.
#[derive(Clone)]
pub struct Route {
    method: Method,
    filter: MethodFilter,
    path: String,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn method_filter(&self) -> MethodFilter {
        self.filter
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Arc<dyn RouteHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Exact-match route registry.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four relayed `w3` endpoints, all `GET`.
    pub fn relay_routes(
        executor: Arc<dyn CommandExecutor>,
        command: &CommandConfig,
        rewards_root: &Path,
    ) -> Result<Self, RouteError> {
        let mut table = Self::new();
        table.register(
            Method::GET,
            WHOAMI_PATH,
            Arc::new(WhoAmIHandler::new(executor.clone())),
        )?;
        table.register(
            Method::GET,
            LOGIN_PATH,
            Arc::new(LoginHandler::new(executor.clone())),
        )?;
        table.register(
            Method::GET,
            SPACE_CREATE_PATH,
            Arc::new(SpaceCreateHandler::new(executor.clone(), command.space_name.clone())),
        )?;
        table.register(
            Method::GET,
            UPLOAD_PATH,
            Arc::new(UploadHandler::new(executor, rewards_root)),
        )?;
        Ok(table)
    }

    /// Register a handler for an exact method and path.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<(), RouteError> {
        let path = path.into();
        if self.lookup(&method, &path).is_some() {
            return Err(RouteError::Duplicate { method, path });
        }
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RouteError::UnsupportedMethod(method.clone()))?;

        self.routes.push(Route {
            method,
            filter,
            path,
            handler,
        });
        Ok(())
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Arc<dyn RouteHandler>> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.path == path)
            .map(|r| &r.handler)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
