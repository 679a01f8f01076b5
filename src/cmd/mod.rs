//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `board`  | `Board`          |
//! | `status` | `Status`         |
//! | `config` | `Config`         |
//! | `serve`  | `Serve`          |

pub mod board;
pub mod config;
pub mod serve;
pub mod status;

pub use board::cmd_board;
pub use config::cmd_config;
pub use serve::cmd_serve;
pub use status::cmd_status;
