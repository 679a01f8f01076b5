//! Immutable board snapshots and their transitions.
//!
//! Every drag outcome is a pure function from one `BoardState` to the next.
//! A transition either returns a fresh snapshot carrying the `Operation` it
//! performed, or `None` when the command would leave the board unchanged.
//! Columns sit behind `Arc`, so a transition only clones the columns it
//! touches.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::models::{BoardResponse, Card, Column, ColumnId};
use crate::errors::BoardError;

/// What started a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Pointer,
    #[default]
    Keyboard,
}

/// The index/column values needed to replay a local edit against the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outcome {
    ColumnReorder {
        column_id: ColumnId,
        start_index: usize,
        finish_index: usize,
    },
    CardReorder {
        column_id: ColumnId,
        start_index: usize,
        finish_index: usize,
    },
    CardMove {
        start_column_id: ColumnId,
        finish_column_id: ColumnId,
        item_index_in_start_column: usize,
        item_index_in_finish_column: usize,
    },
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::ColumnReorder { .. } => "column-reorder",
            Outcome::CardReorder { .. } => "card-reorder",
            Outcome::CardMove { .. } => "card-move",
        }
    }
}

/// The most recent local mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub trigger: Trigger,
    pub outcome: Outcome,
}

/// A request to change the board, as produced by the gesture interpreter
/// or a keyboard/CLI action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    ReorderColumn {
        start_index: usize,
        finish_index: usize,
    },
    ReorderCard {
        column_id: ColumnId,
        start_index: usize,
        finish_index: usize,
    },
    MoveCard {
        start_column_id: ColumnId,
        finish_column_id: ColumnId,
        item_index_in_start_column: usize,
        /// `None` inserts at the front of the destination column.
        item_index_in_finish_column: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState {
    columns: BTreeMap<ColumnId, Arc<Column>>,
    ordered_column_ids: Vec<ColumnId>,
    last_operation: Option<Operation>,
}

/// Remove the element at `start` and reinsert it at `finish`.
fn reorder<T: Clone>(list: &[T], start: usize, finish: usize) -> Vec<T> {
    let mut result = list.to_vec();
    let item = result.remove(start);
    result.insert(finish, item);
    result
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), BoardError> {
    if index < len {
        Ok(())
    } else {
        Err(BoardError::IndexOutOfRange { what, index, len })
    }
}

impl BoardState {
    /// Build a snapshot from a fetched board, rejecting payloads that break
    /// the lock-step or single-column-per-card invariants.
    pub fn from_response(response: BoardResponse) -> Result<Self, BoardError> {
        let BoardResponse {
            column_map,
            ordered_column_ids,
        } = response;

        let mut seen_columns = HashSet::new();
        for id in &ordered_column_ids {
            if !seen_columns.insert(*id) {
                return Err(BoardError::DuplicateColumn { column_id: id.get() });
            }
            if !column_map.contains_key(id) {
                return Err(BoardError::MissingColumn { column_id: id.get() });
            }
        }

        let mut seen_cards = HashSet::new();
        let mut seen_keys = HashSet::new();
        let mut columns = BTreeMap::new();
        for (key, column) in column_map {
            if !seen_columns.contains(&key) {
                return Err(BoardError::OrphanColumn { column_id: key.get() });
            }
            if key != column.column_id {
                return Err(BoardError::MismatchedColumnKey {
                    key: key.get(),
                    column_id: column.column_id.get(),
                });
            }
            for card in &column.items {
                if !seen_cards.insert(card.id) {
                    return Err(BoardError::DuplicateCard { card_id: card.id });
                }
                if !seen_keys.insert(card.key.clone()) {
                    return Err(BoardError::DuplicateCardKey {
                        key: card.key.clone(),
                    });
                }
            }
            columns.insert(key, Arc::new(column));
        }

        Ok(Self {
            columns,
            ordered_column_ids,
            last_operation: None,
        })
    }

    /// Wire form of the snapshot, without the operation record.
    pub fn to_response(&self) -> BoardResponse {
        BoardResponse {
            column_map: self
                .columns
                .iter()
                .map(|(id, column)| (*id, Column::clone(column)))
                .collect(),
            ordered_column_ids: self.ordered_column_ids.clone(),
        }
    }

    pub fn ordered_column_ids(&self) -> &[ColumnId] {
        &self.ordered_column_ids
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(&id).map(Arc::as_ref)
    }

    /// Columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.ordered_column_ids
            .iter()
            .filter_map(|id| self.columns.get(id).map(Arc::as_ref))
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.ordered_column_ids.iter().position(|c| *c == id)
    }

    pub fn last_operation(&self) -> Option<&Operation> {
        self.last_operation.as_ref()
    }

    pub fn card_count(&self) -> usize {
        self.columns.values().map(|c| c.items.len()).sum()
    }

    /// All card ids on the board, sorted.
    pub fn card_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .columns
            .values()
            .flat_map(|c| c.items.iter().map(|card| card.id))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Column and index of the card with display key `key`.
    pub fn locate_card(&self, key: &str) -> Option<(ColumnId, usize)> {
        self.columns
            .iter()
            .find_map(|(id, column)| column.position_of(key).map(|index| (*id, index)))
    }

    pub fn card(&self, key: &str) -> Option<&Card> {
        let (column_id, index) = self.locate_card(key)?;
        self.column(column_id).and_then(|c| c.items.get(index))
    }

    fn require_column(&self, id: ColumnId) -> Result<&Arc<Column>, BoardError> {
        self.columns
            .get(&id)
            .ok_or(BoardError::UnknownColumn { column_id: id.get() })
    }

    pub fn reorder_column(
        &self,
        start_index: usize,
        finish_index: usize,
        trigger: Trigger,
    ) -> Result<Option<BoardState>, BoardError> {
        let len = self.ordered_column_ids.len();
        check_index("column order", start_index, len)?;
        check_index("column order", finish_index, len)?;
        if start_index == finish_index {
            return Ok(None);
        }

        let column_id = self.ordered_column_ids[start_index];
        Ok(Some(BoardState {
            columns: self.columns.clone(),
            ordered_column_ids: reorder(&self.ordered_column_ids, start_index, finish_index),
            last_operation: Some(Operation {
                trigger,
                outcome: Outcome::ColumnReorder {
                    column_id,
                    start_index,
                    finish_index,
                },
            }),
        }))
    }

    pub fn reorder_card(
        &self,
        column_id: ColumnId,
        start_index: usize,
        finish_index: usize,
        trigger: Trigger,
    ) -> Result<Option<BoardState>, BoardError> {
        let column = self.require_column(column_id)?;
        let len = column.items.len();
        check_index("column items", start_index, len)?;
        check_index("column items", finish_index, len)?;
        if start_index == finish_index {
            return Ok(None);
        }

        let updated = Column {
            items: reorder(&column.items, start_index, finish_index),
            ..Column::clone(column)
        };
        let mut columns = self.columns.clone();
        columns.insert(column_id, Arc::new(updated));

        Ok(Some(BoardState {
            columns,
            ordered_column_ids: self.ordered_column_ids.clone(),
            last_operation: Some(Operation {
                trigger,
                outcome: Outcome::CardReorder {
                    column_id,
                    start_index,
                    finish_index,
                },
            }),
        }))
    }

    /// Move a card between two different columns. Same-column moves are a
    /// no-op; route them through [`BoardState::reorder_card`].
    pub fn move_card(
        &self,
        start_column_id: ColumnId,
        finish_column_id: ColumnId,
        item_index_in_start_column: usize,
        item_index_in_finish_column: Option<usize>,
        trigger: Trigger,
    ) -> Result<Option<BoardState>, BoardError> {
        if start_column_id == finish_column_id {
            return Ok(None);
        }
        let source = self.require_column(start_column_id)?;
        let destination = self.require_column(finish_column_id)?;
        check_index("column items", item_index_in_start_column, source.items.len())?;

        let finish_index = item_index_in_finish_column.unwrap_or(0);
        // Inserting at `len` appends.
        check_index("column items", finish_index, destination.items.len() + 1)?;

        let mut source_items = source.items.clone();
        let card = source_items.remove(item_index_in_start_column);
        let mut destination_items = destination.items.clone();
        destination_items.insert(finish_index, card);

        let mut columns = self.columns.clone();
        columns.insert(
            start_column_id,
            Arc::new(Column {
                items: source_items,
                ..Column::clone(source)
            }),
        );
        columns.insert(
            finish_column_id,
            Arc::new(Column {
                items: destination_items,
                ..Column::clone(destination)
            }),
        );

        Ok(Some(BoardState {
            columns,
            ordered_column_ids: self.ordered_column_ids.clone(),
            last_operation: Some(Operation {
                trigger,
                outcome: Outcome::CardMove {
                    start_column_id,
                    finish_column_id,
                    item_index_in_start_column,
                    item_index_in_finish_column: finish_index,
                },
            }),
        }))
    }

    /// Reducer entry point: dispatch a command to its transition.
    pub fn apply(
        &self,
        command: &BoardCommand,
        trigger: Trigger,
    ) -> Result<Option<BoardState>, BoardError> {
        match *command {
            BoardCommand::ReorderColumn {
                start_index,
                finish_index,
            } => self.reorder_column(start_index, finish_index, trigger),
            BoardCommand::ReorderCard {
                column_id,
                start_index,
                finish_index,
            } => self.reorder_card(column_id, start_index, finish_index, trigger),
            BoardCommand::MoveCard {
                start_column_id,
                finish_column_id,
                item_index_in_start_column,
                item_index_in_finish_column,
            } => self.move_card(
                start_column_id,
                finish_column_id,
                item_index_in_start_column,
                item_index_in_finish_column,
                trigger,
            ),
        }
    }
}
