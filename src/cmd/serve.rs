//! Development backend command (`boardsync serve`).

use anyhow::Result;

use boardsync::backend::{BoardStore, ServerConfig, start_server};

pub async fn cmd_serve(port: u16, dev: bool) -> Result<()> {
    start_server(ServerConfig { port, dev_mode: dev }, BoardStore::demo()).await
}
