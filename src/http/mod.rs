//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (add request ID)
//!     → [routing layer picks control route or proxy]
//!     → [proxy pipeline forwards and rewrites]
//!     → response.rs (local responses, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
