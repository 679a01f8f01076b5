//! Workflow status commands (`boardsync status`).

use anyhow::{Context, Result, bail};
use console::style;

use boardsync::board::BoardClient;
use boardsync::board::models::{CreateWorkflowStatus, UpdateWorkflowStatus, WorkflowStatus};
use boardsync::board_config::BoardsyncConfig;

use super::super::StatusCommands;

pub async fn cmd_status(config: &BoardsyncConfig, command: StatusCommands) -> Result<()> {
    let client = BoardClient::from_config(&config.toml.backend)
        .context("Failed to build backend client")?;
    let key = config.board_key();

    match command {
        StatusCommands::List => {
            let statuses = client.list_statuses(key.workflow_id, key.project_id).await?;
            if statuses.is_empty() {
                println!("No statuses in workflow {}.", key.workflow_id);
                return Ok(());
            }
            println!(
                "{:<6} {:<6} {:<24} {:<12} {}",
                "ID", "ORDER", "NAME", "CATEGORY", "INITIAL"
            );
            for status in &statuses {
                println!(
                    "{:<6} {:<6} {:<24} {:<12} {}",
                    status.id,
                    status.order_index,
                    status.status_name,
                    status.status_category.as_deref().unwrap_or("-"),
                    if status.is_initial_status { "yes" } else { "" }
                );
            }
        }
        StatusCommands::Show { id } => {
            print_status(&client.get_status(id, key.project_id).await?);
        }
        StatusCommands::Create {
            name,
            category,
            initial,
        } => {
            let data = CreateWorkflowStatus {
                workflow_id: key.workflow_id,
                status_name: name,
                status_category: Some(category),
                is_initial_status: initial,
                order_index: None,
            };
            let status = client.create_status(&data, key.project_id).await?;
            println!("{} Created status #{}", style("✓").green(), status.id);
            print_status(&status);
            print_columns(&client, config).await?;
        }
        StatusCommands::Update {
            id,
            name,
            category,
            initial,
        } => {
            let data = UpdateWorkflowStatus {
                status_name: name,
                status_category: category,
                is_initial_status: initial,
                order_index: None,
            };
            if data.is_empty() {
                bail!("Nothing to update: pass --name, --category or --initial");
            }
            let status = client.update_status(id, &data, key.project_id).await?;
            println!("{} Updated status #{}", style("✓").green(), status.id);
            print_status(&status);
            print_columns(&client, config).await?;
        }
        StatusCommands::Delete { id } => {
            let response = client.delete_status(id, key.project_id).await?;
            println!("{} {}", style("✓").green(), response.message);
            print_columns(&client, config).await?;
        }
    }

    Ok(())
}

fn print_status(status: &WorkflowStatus) {
    println!("  id       = {}", status.id);
    println!("  name     = \"{}\"", status.status_name);
    println!(
        "  category = {}",
        status.status_category.as_deref().unwrap_or("-")
    );
    println!("  order    = {}", status.order_index);
    println!("  initial  = {}", status.is_initial_status);
}

/// Refetch the board after a status change and list its columns.
async fn print_columns(client: &BoardClient, config: &BoardsyncConfig) -> Result<()> {
    let board = client.get_board(&config.board_key()).await?;
    let titles: Vec<String> = board
        .ordered_column_ids
        .iter()
        .filter_map(|id| board.column_map.get(id))
        .map(|c| c.title.clone())
        .collect();
    println!("Board columns: {}", titles.join(" | "));
    Ok(())
}
