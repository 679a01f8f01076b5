//! Board: drag-and-drop Kanban state with backend reconciliation.
//!
//! ## Overview
//!
//! A board is an ordered set of columns (workflow statuses), each holding an
//! ordered list of cards (issues). Every local edit is applied optimistically
//! to an immutable snapshot, published to views, then mirrored to the
//! backend with exactly one REST call. If that call fails the snapshot is
//! thrown away and the board is refetched.
//!
//! ## Module Map
//!
//! ```text
//!  pointer/keyboard/CLI
//!          │
//!          v
//!  gesture.rs  (DropEvent → BoardCommand, closest-edge rule)
//!          │        ^
//!          │        └── registry.rs (id → Handle, edge lookup)
//!          v
//!  controller.rs  (BoardController task, BoardHandle)
//!          │  apply
//!          v
//!  state.rs  (BoardState snapshots, Operation record)
//!          │  plan_sync
//!          v
//!  sync.rs  (Operation → SyncRequest)
//!          │  send / fetch_board
//!          v
//!  client.rs  (BoardApi trait, reqwest BoardClient)
//! ```
//!
//! ## Supporting Modules
//!
//! | Module   | Responsibility                                          |
//! |----------|---------------------------------------------------------|
//! | `models` | Wire types: `Card`, `Column`, `BoardResponse`, statuses |
//! | `filter` | Search/assignee/type/epic views over a snapshot         |

pub mod client;
pub mod controller;
pub mod filter;
pub mod gesture;
pub mod models;
pub mod registry;
pub mod state;
pub mod sync;

pub use client::{BoardApi, BoardClient};
pub use controller::{Applied, BoardController, BoardHandle, BoardPhase, Notice, SyncOutcome};
pub use filter::{BoardFilter, FilteredBoard};
pub use models::{BoardKey, Card, Column, ColumnId};
pub use state::{BoardCommand, BoardState, Trigger};
pub use sync::{SyncRequest, plan_sync};
