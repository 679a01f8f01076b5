//! Board view and edit commands (`boardsync board`).

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use tokio::sync::broadcast::{self, error::RecvError};

use boardsync::board::filter::FilteredBoard;
use boardsync::board::{
    Applied, BoardClient, BoardCommand, BoardController, BoardFilter, BoardHandle, BoardState,
    Card, Notice, SyncOutcome, Trigger,
};
use boardsync::board_config::BoardsyncConfig;

use super::super::BoardCommands;

pub async fn cmd_board(config: &BoardsyncConfig, command: BoardCommands) -> Result<()> {
    let handle = connect(config).await?;

    match command {
        BoardCommands::Show {
            search,
            assignees,
            issue_types,
            epics,
            json,
        } => {
            let filter = BoardFilter {
                search,
                assignee_ids: assignees,
                issue_type_ids: issue_types,
                epic_ids: epics,
            };
            let state = handle.wait_until_loaded().await?;
            let view = filter.apply(&state);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&view).context("Failed to serialize board")?
                );
            } else {
                print_board(&view, !filter.is_empty());
            }
            Ok(())
        }
        BoardCommands::MoveColumn { from, to } => {
            edit(
                &handle,
                BoardCommand::ReorderColumn {
                    start_index: from,
                    finish_index: to,
                },
            )
            .await
        }
        BoardCommands::MoveCard {
            card_key,
            column_id,
            index,
        } => {
            let state = handle.wait_until_loaded().await?;
            let command = move_card_command(&state, &card_key, column_id, index)?;
            edit(&handle, command).await
        }
        BoardCommands::ReorderCard {
            column_id,
            from,
            to,
        } => {
            edit(
                &handle,
                BoardCommand::ReorderCard {
                    column_id,
                    start_index: from,
                    finish_index: to,
                },
            )
            .await
        }
    }
}

async fn connect(config: &BoardsyncConfig) -> Result<BoardHandle> {
    let client = BoardClient::from_config(&config.toml.backend)
        .context("Failed to build backend client")?;
    let handle = BoardController::spawn(Arc::new(client), config.board_key());
    handle
        .wait_until_loaded()
        .await
        .with_context(|| format!("Could not open board at {}", config.toml.backend.base_url))?;
    Ok(handle)
}

/// Build the command for moving `card_key` into `column_id`. A move within
/// the card's own column becomes a reorder.
fn move_card_command(
    state: &BoardState,
    card_key: &str,
    column_id: boardsync::board::ColumnId,
    index: Option<usize>,
) -> Result<BoardCommand> {
    let Some((source, position)) = state.locate_card(card_key) else {
        bail!("Card {} is not on the board", card_key);
    };
    if source != column_id {
        return Ok(BoardCommand::MoveCard {
            start_column_id: source,
            finish_column_id: column_id,
            item_index_in_start_column: position,
            item_index_in_finish_column: index,
        });
    }
    let last = state
        .column(source)
        .map(|c| c.items.len().saturating_sub(1))
        .unwrap_or(0);
    Ok(BoardCommand::ReorderCard {
        column_id,
        start_index: position,
        finish_index: index.unwrap_or(last),
    })
}

/// Apply one edit and wait for the backend's verdict. A rejected edit
/// prints the resynced board and fails the command.
async fn edit(handle: &BoardHandle, command: BoardCommand) -> Result<()> {
    let mut notices = handle.subscribe();
    let ticket = match handle.apply(command, Trigger::Keyboard).await? {
        Applied::Changed(ticket) => ticket,
        Applied::Unchanged | Applied::Ignored => {
            println!("Board unchanged.");
            return Ok(());
        }
    };
    let request = ticket.request().to_string();

    match ticket.outcome().await? {
        SyncOutcome::Acknowledged => {
            println!("{} {}", style("✓").green(), request);
            if let Some(state) = handle.snapshot() {
                print_board(&BoardFilter::default().apply(&state), false);
            }
            Ok(())
        }
        SyncOutcome::Failed { message, .. } => {
            for notice in wait_for_resync(&mut notices).await {
                eprintln!("{} {}", style("!").red(), notice.message());
            }
            if let Some(state) = handle.snapshot() {
                println!("Board reloaded from server:");
                print_board(&BoardFilter::default().apply(&state), false);
            }
            bail!("Could not save edit ({}): {}", request, message)
        }
    }
}

/// Collect failure notices until the resync that follows them settles.
async fn wait_for_resync(notices: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut seen = Vec::new();
    loop {
        match notices.recv().await {
            Ok(notice) => {
                let done = matches!(notice, Notice::Refreshed | Notice::LoadFailed { .. });
                if !matches!(notice, Notice::Refreshed) {
                    seen.push(notice);
                }
                if done {
                    return seen;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return seen,
        }
    }
}

fn card_line(card: &Card) -> String {
    let mut line = format!(
        "  {} {}",
        style(format!("{:<10}", card.key)).cyan(),
        card.summary.as_deref().unwrap_or("")
    );
    if let Some(priority) = &card.priority {
        line.push_str(&format!(" {}", style(format!("[{}]", priority)).yellow()));
    }
    if let Some(points) = card.points {
        line.push_str(&format!(" {}", style(format!("{}pt", points)).dim()));
    }
    let names: Vec<&str> = card
        .assignees
        .iter()
        .filter_map(|a| a.full_name.as_deref())
        .collect();
    if !names.is_empty() {
        line.push_str(&format!(" {}", style(format!("@{}", names.join(", @"))).dim()));
    }
    line
}

fn print_board(view: &FilteredBoard, filtered: bool) {
    println!();
    for column in &view.columns {
        println!(
            "{} {}",
            style(&column.title).bold(),
            style(format!("(#{}, {})", column.column_id, column.items.len())).dim()
        );
        if column.items.is_empty() {
            println!("  {}", style("(empty)").dim());
        }
        for card in &column.items {
            println!("{}", card_line(card));
        }
        println!();
    }
    if filtered {
        println!(
            "Showing {} of {} issues",
            view.filtered_count, view.total_issues
        );
    } else {
        println!("{} issues", view.total_issues);
    }
}
