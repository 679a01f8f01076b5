//! Development backend: an in-memory board server speaking the same REST
//! surface the board client calls.
//!
//! | Module   | Purpose                                              |
//! |----------|------------------------------------------------------|
//! | `store`  | Workflow statuses and their ordered cards            |
//! | `api`    | axum handlers and the `{message}` error envelope     |
//! | `server` | Router assembly, listener binding, graceful shutdown |

pub mod api;
pub mod server;
pub mod store;

pub use server::{ServerConfig, build_router, spawn_local, start_server};
pub use store::BoardStore;
