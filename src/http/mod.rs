//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Unix socket connection (hyper, via axum::serve)
//!     → server.rs (middleware: request ID, span; exact-match dispatch)
//!     → request.rs (RequestContext: method, path, query, request ID)
//!     → handlers.rs (validate input, run one command)
//!     → response.rs (status, content type, body; one log line)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::{HandlerError, HandlerResult, OutputFormat, Payload, RouteHandler};
pub use request::{RequestContext, X_REQUEST_ID};
pub use server::build_router;
