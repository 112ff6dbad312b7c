//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at relay construction):
//!     CommandConfig + rewards root + executor
//!     → router.rs (RouteTable of (method, path) → handler)
//!     → http::server (compiled into an axum Router at start)
//!
//! Incoming Request:
//!     exact method + path match → handler
//!     unknown path → 404, wrong method → 405 (axum)
//! ```

pub mod router;

pub use router::{
    Route, RouteError, RouteTable, LOGIN_PATH, SPACE_CREATE_PATH, UPLOAD_PATH, WHOAMI_PATH,
};
