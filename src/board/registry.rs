//! Maps logical card/column identifiers to whatever the UI layer renders
//! them with, so drop targets can be resolved to positions and edges.

use std::collections::HashMap;

use super::gesture::{Axis, DropTarget, Edge, Point, Rect};
use super::models::ColumnId;

/// Opaque UI handle for a rendered card or column.
pub trait Handle {
    /// Current bounding box in the same coordinate space as pointer events.
    fn bounds(&self) -> Rect;
}

impl Handle for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

pub struct Registry<H> {
    cards: HashMap<String, H>,
    columns: HashMap<ColumnId, H>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self {
            cards: HashMap::new(),
            columns: HashMap::new(),
        }
    }
}

impl<H: Handle> Registry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card handle, returning the handle it replaces.
    pub fn register_card(&mut self, card_key: impl Into<String>, handle: H) -> Option<H> {
        self.cards.insert(card_key.into(), handle)
    }

    pub fn register_column(&mut self, column_id: ColumnId, handle: H) -> Option<H> {
        self.columns.insert(column_id, handle)
    }

    pub fn unregister_card(&mut self, card_key: &str) -> Option<H> {
        self.cards.remove(card_key)
    }

    pub fn unregister_column(&mut self, column_id: ColumnId) -> Option<H> {
        self.columns.remove(&column_id)
    }

    pub fn card(&self, card_key: &str) -> Option<&H> {
        self.cards.get(card_key)
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&H> {
        self.columns.get(&column_id)
    }

    pub fn card_edge(&self, card_key: &str, pointer: Point) -> Option<Edge> {
        self.card(card_key)
            .map(|h| h.bounds().closest_edge(pointer, Axis::Vertical))
    }

    pub fn column_edge(&self, column_id: ColumnId, pointer: Point) -> Option<Edge> {
        self.column(column_id)
            .map(|h| h.bounds().closest_edge(pointer, Axis::Horizontal))
    }

    /// Drop-target record for a card under the pointer.
    pub fn card_target(&self, card_key: &str, column_id: ColumnId, pointer: Point) -> DropTarget {
        DropTarget::Card {
            card_key: card_key.to_string(),
            column_id,
            closest_edge: self.card_edge(card_key, pointer),
        }
    }

    /// Drop-target record for a column under the pointer. Edges only matter
    /// when a column is being dragged.
    pub fn column_target(&self, column_id: ColumnId, pointer: Point, with_edge: bool) -> DropTarget {
        DropTarget::Column {
            column_id,
            closest_edge: if with_edge {
                self.column_edge(column_id, pointer)
            } else {
                None
            },
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len() + self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::gesture::{DragSource, DropEvent, interpret_drop};
    use crate::board::state::BoardCommand;
    use crate::board::state::tests::sample_board;

    #[derive(Debug, PartialEq)]
    struct FakeElement {
        name: &'static str,
        rect: Rect,
    }

    impl Handle for FakeElement {
        fn bounds(&self) -> Rect {
            self.rect
        }
    }

    #[test]
    fn test_register_replaces_and_returns_previous() {
        let mut registry = Registry::new();
        let first = FakeElement {
            name: "first",
            rect: Rect::default(),
        };
        let second = FakeElement {
            name: "second",
            rect: Rect::default(),
        };
        assert!(registry.register_card("A-1", first).is_none());
        let replaced = registry.register_card("A-1", second).unwrap();
        assert_eq!(replaced.name, "first");
        assert_eq!(registry.card("A-1").unwrap().name, "second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_removes_handles() {
        let mut registry: Registry<Rect> = Registry::new();
        registry.register_column(ColumnId(1), Rect::new(0.0, 0.0, 300.0, 600.0));
        registry.register_card("A-1", Rect::new(0.0, 0.0, 300.0, 50.0));
        assert!(registry.unregister_column(ColumnId(1)).is_some());
        assert!(registry.unregister_card("A-1").is_some());
        assert!(registry.unregister_card("A-1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_edges_resolve_through_handle_bounds() {
        let mut registry: Registry<Rect> = Registry::new();
        registry.register_card("B-4", Rect::new(320.0, 40.0, 280.0, 60.0));
        registry.register_column(ColumnId(2), Rect::new(320.0, 0.0, 280.0, 800.0));

        assert_eq!(
            registry.card_edge("B-4", Point::new(400.0, 95.0)),
            Some(Edge::Bottom)
        );
        assert_eq!(
            registry.card_edge("B-4", Point::new(400.0, 45.0)),
            Some(Edge::Top)
        );
        assert_eq!(
            registry.column_edge(ColumnId(2), Point::new(590.0, 10.0)),
            Some(Edge::Right)
        );
        assert_eq!(registry.card_edge("missing", Point::default()), None);
    }

    #[test]
    fn test_registry_feeds_drop_interpretation() {
        let board = sample_board();
        let mut registry: Registry<Rect> = Registry::new();
        registry.register_card("B-4", Rect::new(320.0, 40.0, 280.0, 60.0));

        // Pointer in the lower half of B-4 while dragging A-1 over column 2.
        let pointer = Point::new(400.0, 90.0);
        let event = DropEvent {
            source: DragSource::Card {
                card_key: "A-1".to_string(),
                column_id: ColumnId(1),
            },
            targets: vec![
                registry.card_target("B-4", ColumnId(2), pointer),
                registry.column_target(ColumnId(2), pointer, false),
            ],
        };
        assert_eq!(
            interpret_drop(&board, &event),
            Some(BoardCommand::MoveCard {
                start_column_id: ColumnId(1),
                finish_column_id: ColumnId(2),
                item_index_in_start_column: 0,
                item_index_in_finish_column: Some(1),
            })
        );
    }
}
