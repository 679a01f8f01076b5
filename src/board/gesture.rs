//! Drop interpretation: turns a finished drag into a [`BoardCommand`].
//!
//! The UI layer reports what was dragged and the stack of drop targets under
//! the pointer (innermost first, so a card target is followed by its
//! column). Closest edges are resolved beforehand, usually through
//! [`super::registry::Registry`].

use serde::{Deserialize, Serialize};

use super::models::ColumnId;
use super::state::{BoardCommand, BoardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Columns are laid out left to right.
    Horizontal,
    /// Cards are stacked top to bottom.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a rendered card or column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edge of this box nearest to `pointer` along `axis`. The pointer is
    /// past the midpoint only when strictly below (or right of) it.
    pub fn closest_edge(&self, pointer: Point, axis: Axis) -> Edge {
        match axis {
            Axis::Vertical => {
                if pointer.y > self.y + self.height / 2.0 {
                    Edge::Bottom
                } else {
                    Edge::Top
                }
            }
            Axis::Horizontal => {
                if pointer.x > self.x + self.width / 2.0 {
                    Edge::Right
                } else {
                    Edge::Left
                }
            }
        }
    }
}

/// Where an item being reordered within one list should land.
///
/// `None` indices mean the item or target could not be found; the start
/// index is returned unchanged in that case.
pub fn reorder_destination_index(
    start_index: Option<usize>,
    index_of_target: Option<usize>,
    closest_edge: Option<Edge>,
    axis: Axis,
) -> Option<usize> {
    let (Some(start), Some(target)) = (start_index, index_of_target) else {
        return start_index;
    };
    if start == target {
        return Some(start);
    }
    let Some(edge) = closest_edge else {
        return Some(target);
    };

    let going_after = matches!(
        (axis, edge),
        (Axis::Vertical, Edge::Bottom) | (Axis::Horizontal, Edge::Right)
    );
    let moving_forward = start < target;

    Some(match (moving_forward, going_after) {
        (true, true) => target,
        (true, false) => target - 1,
        (false, true) => target + 1,
        (false, false) => target,
    })
}

/// The thing being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Column { column_id: ColumnId },
    Card { card_key: String, column_id: ColumnId },
}

/// One entry in the drop-target stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column {
        column_id: ColumnId,
        closest_edge: Option<Edge>,
    },
    Card {
        card_key: String,
        column_id: ColumnId,
        closest_edge: Option<Edge>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub source: DragSource,
    /// Innermost target first.
    pub targets: Vec<DropTarget>,
}

/// Translate a drop into the board command it implies, or `None` when the
/// drop lands nowhere or refers to things no longer on the board.
pub fn interpret_drop(state: &BoardState, event: &DropEvent) -> Option<BoardCommand> {
    let target = event.targets.first()?;
    match &event.source {
        DragSource::Column { column_id } => interpret_column_drop(state, *column_id, target),
        DragSource::Card {
            card_key,
            column_id,
        } => interpret_card_drop(state, card_key, *column_id, target),
    }
}

fn interpret_column_drop(
    state: &BoardState,
    column_id: ColumnId,
    target: &DropTarget,
) -> Option<BoardCommand> {
    let start_index = state.column_index(column_id)?;
    let (target_column, closest_edge) = match target {
        DropTarget::Column {
            column_id,
            closest_edge,
        } => (*column_id, *closest_edge),
        // A column dropped over one of another column's cards lands on that column.
        DropTarget::Card { column_id, .. } => (*column_id, None),
    };
    let index_of_target = state.column_index(target_column)?;

    let finish_index = reorder_destination_index(
        Some(start_index),
        Some(index_of_target),
        closest_edge,
        Axis::Horizontal,
    )?;
    Some(BoardCommand::ReorderColumn {
        start_index,
        finish_index,
    })
}

fn interpret_card_drop(
    state: &BoardState,
    card_key: &str,
    source_column_id: ColumnId,
    target: &DropTarget,
) -> Option<BoardCommand> {
    let source = state.column(source_column_id)?;
    let item_index = source.position_of(card_key)?;

    match target {
        DropTarget::Column { column_id, .. } => {
            let destination = state.column(*column_id)?;
            if destination.column_id == source.column_id {
                let last = source.items.len().checked_sub(1)?;
                let finish_index =
                    reorder_destination_index(Some(item_index), Some(last), None, Axis::Vertical)?;
                return Some(BoardCommand::ReorderCard {
                    column_id: source.column_id,
                    start_index: item_index,
                    finish_index,
                });
            }
            Some(BoardCommand::MoveCard {
                start_column_id: source.column_id,
                finish_column_id: destination.column_id,
                item_index_in_start_column: item_index,
                item_index_in_finish_column: None,
            })
        }
        DropTarget::Card {
            card_key: target_key,
            column_id,
            closest_edge,
        } => {
            let destination = state.column(*column_id)?;
            let index_of_target = destination.position_of(target_key)?;

            if destination.column_id == source.column_id {
                let finish_index = reorder_destination_index(
                    Some(item_index),
                    Some(index_of_target),
                    *closest_edge,
                    Axis::Vertical,
                )?;
                return Some(BoardCommand::ReorderCard {
                    column_id: source.column_id,
                    start_index: item_index,
                    finish_index,
                });
            }

            let finish_index = if *closest_edge == Some(Edge::Bottom) {
                index_of_target + 1
            } else {
                index_of_target
            };
            Some(BoardCommand::MoveCard {
                start_column_id: source.column_id,
                finish_column_id: destination.column_id,
                item_index_in_start_column: item_index,
                item_index_in_finish_column: Some(finish_index),
            })
        }
    }
}
