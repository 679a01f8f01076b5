//! Translation of the last recorded operation into exactly one backend call.

use std::fmt;

use super::models::{
    BoardKey, ColumnId, MoveCardRequest, ReorderCardsRequest, ReorderColumnsRequest,
};
use super::state::{BoardState, Outcome};

/// A backend call that mirrors one local edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    ReorderColumns {
        board_id: i64,
        project_id: i64,
        body: ReorderColumnsRequest,
    },
    ReorderCards {
        column_id: ColumnId,
        project_id: i64,
        body: ReorderCardsRequest,
    },
    MoveCard {
        card_id: i64,
        card_key: String,
        project_id: i64,
        body: MoveCardRequest,
    },
}

impl SyncRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncRequest::ReorderColumns { .. } => "column-reorder",
            SyncRequest::ReorderCards { .. } => "card-reorder",
            SyncRequest::MoveCard { .. } => "card-move",
        }
    }
}

impl fmt::Display for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncRequest::ReorderColumns { board_id, body, .. } => write!(
                f,
                "reorder columns of board {} to {:?}",
                board_id, body.ordered_column_ids
            ),
            SyncRequest::ReorderCards {
                column_id, body, ..
            } => write!(
                f,
                "reorder column {} to {:?}",
                column_id, body.ordered_issue_ids
            ),
            SyncRequest::MoveCard { card_key, body, .. } => write!(
                f,
                "move {} to column {} at {}",
                card_key, body.target_status_id, body.target_index
            ),
        }
    }
}

/// Build the call for `state`'s last operation, reading the post-edit
/// snapshot. Returns `None` when nothing was recorded.
pub fn plan_sync(state: &BoardState, key: &BoardKey) -> Option<SyncRequest> {
    let operation = state.last_operation()?;
    match &operation.outcome {
        Outcome::ColumnReorder { .. } => Some(SyncRequest::ReorderColumns {
            board_id: key.board_id(),
            project_id: key.project_id,
            body: ReorderColumnsRequest {
                ordered_column_ids: state.ordered_column_ids().iter().map(|c| c.get()).collect(),
            },
        }),
        Outcome::CardReorder { column_id, .. } => {
            let column = state.column(*column_id)?;
            Some(SyncRequest::ReorderCards {
                column_id: *column_id,
                project_id: key.project_id,
                body: ReorderCardsRequest {
                    ordered_issue_ids: column.items.iter().map(|c| c.id).collect(),
                },
            })
        }
        Outcome::CardMove {
            finish_column_id,
            item_index_in_finish_column,
            ..
        } => {
            let card = state
                .column(*finish_column_id)?
                .items
                .get(*item_index_in_finish_column)?;
            Some(SyncRequest::MoveCard {
                card_id: card.id,
                card_key: card.key.clone(),
                project_id: key.project_id,
                body: MoveCardRequest {
                    target_status_id: finish_column_id.get(),
                    target_index: *item_index_in_finish_column,
                },
            })
        }
    }
}
