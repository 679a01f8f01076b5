//! In-memory board data behind the development backend.
//!
//! Workflows own ordered statuses; each status owns an ordered list of
//! cards. A board is the projection of one workflow's statuses.

use std::collections::BTreeMap;

use crate::board::models::{
    Assignee, BoardResponse, Card, Column, ColumnId, CreateWorkflowStatus, UpdateWorkflowStatus,
    WorkflowStatus,
};
use crate::errors::BackendError;

struct StoredStatus {
    status: WorkflowStatus,
    items: Vec<Card>,
}

#[derive(Default)]
pub struct BoardStore {
    statuses: Vec<StoredStatus>,
    next_status_id: i64,
}

/// `ids` is a permutation of `expected` (same ids, each exactly once).
fn is_permutation(ids: &[i64], expected: &[i64]) -> bool {
    let mut a = ids.to_vec();
    let mut b = expected.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

impl BoardStore {
    pub fn new() -> Self {
        Self {
            statuses: Vec::new(),
            next_status_id: 1,
        }
    }

    /// Seed a store from a board, assigning `order_index` from the column order.
    pub fn from_board(workflow_id: i64, board: BoardResponse) -> Self {
        let mut store = Self::new();
        let BoardResponse {
            mut column_map,
            ordered_column_ids,
        } = board;
        for (index, id) in ordered_column_ids.iter().enumerate() {
            let Some(column) = column_map.remove(id) else {
                continue;
            };
            store.next_status_id = store.next_status_id.max(id.get() + 1);
            store.statuses.push(StoredStatus {
                status: WorkflowStatus {
                    id: id.get(),
                    workflow_id,
                    order_index: index as i64,
                    status_name: column.title,
                    status_category: None,
                    is_initial_status: index == 0,
                },
                items: column.items,
            });
        }
        store
    }

    /// Demo board used by `boardsync serve`.
    pub fn demo() -> Self {
        let assignee = |id: i64, name: &str| Assignee {
            id,
            full_name: Some(name.to_string()),
        };
        let card = |id: i64, summary: &str, priority: &str, points: f64| Card {
            priority: Some(priority.to_string()),
            points: Some(points),
            issue_type: Some("task".to_string()),
            issue_type_id: Some(1),
            ..Card::new(id, format!("DEMO-{}", id), summary)
        };

        let mut login = card(1, "Login page rejects valid passwords", "high", 3.0);
        login.assignees = vec![assignee(1, "Mai Nguyen")];
        login.epic_name = Some("Auth".to_string());
        login.epic_link_id = Some(100);
        let mut export = card(4, "Export board as CSV", "low", 2.0);
        export.assignees = vec![assignee(2, "Quang Le")];

        let mut column_map = BTreeMap::new();
        column_map.insert(
            ColumnId(1),
            Column::new(
                ColumnId(1),
                "To Do",
                vec![
                    login,
                    card(2, "Add sprint burndown chart", "medium", 5.0),
                    card(3, "Notification settings page", "medium", 3.0),
                ],
            ),
        );
        column_map.insert(ColumnId(2), Column::new(ColumnId(2), "In Progress", vec![export]));
        column_map.insert(
            ColumnId(3),
            Column::new(
                ColumnId(3),
                "Done",
                vec![card(5, "Project role matrix", "medium", 1.0)],
            ),
        );
        let mut store = Self::from_board(
            1,
            BoardResponse {
                column_map,
                ordered_column_ids: vec![ColumnId(1), ColumnId(2), ColumnId(3)],
            },
        );
        let categories = ["to_do", "in_progress", "done"];
        for (stored, category) in store.statuses.iter_mut().zip(categories) {
            stored.status.status_category = Some(category.to_string());
        }
        store
    }

    fn workflow_exists(&self, workflow_id: i64) -> bool {
        self.statuses.iter().any(|s| s.status.workflow_id == workflow_id)
    }

    /// Statuses of a workflow, in board order.
    fn workflow_statuses(&self, workflow_id: i64) -> Vec<&StoredStatus> {
        let mut statuses: Vec<&StoredStatus> = self
            .statuses
            .iter()
            .filter(|s| s.status.workflow_id == workflow_id)
            .collect();
        statuses.sort_by_key(|s| (s.status.order_index, s.status.id));
        statuses
    }

    fn find_status_mut(&mut self, id: i64) -> Result<&mut StoredStatus, BackendError> {
        self.statuses
            .iter_mut()
            .find(|s| s.status.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Workflow status {} not found", id)))
    }

    pub fn board(&self, workflow_id: i64) -> Result<BoardResponse, BackendError> {
        if !self.workflow_exists(workflow_id) {
            return Err(BackendError::NotFound(format!(
                "Workflow {} not found",
                workflow_id
            )));
        }
        let statuses = self.workflow_statuses(workflow_id);
        Ok(BoardResponse {
            column_map: statuses
                .iter()
                .map(|s| {
                    let id = ColumnId(s.status.id);
                    (
                        id,
                        Column::new(id, s.status.status_name.clone(), s.items.clone()),
                    )
                })
                .collect(),
            ordered_column_ids: statuses.iter().map(|s| ColumnId(s.status.id)).collect(),
        })
    }

    pub fn reorder_columns(&mut self, board_id: i64, ordered: &[i64]) -> Result<(), BackendError> {
        let current: Vec<i64> = self
            .workflow_statuses(board_id)
            .iter()
            .map(|s| s.status.id)
            .collect();
        if current.is_empty() {
            return Err(BackendError::NotFound(format!("Board {} not found", board_id)));
        }
        if !is_permutation(ordered, &current) {
            return Err(BackendError::BadRequest(
                "orderedColumnIds must list every column of the board exactly once".to_string(),
            ));
        }
        for (index, id) in ordered.iter().enumerate() {
            self.find_status_mut(*id)?.status.order_index = index as i64;
        }
        Ok(())
    }

    pub fn reorder_cards(&mut self, column_id: i64, ordered: &[i64]) -> Result<(), BackendError> {
        let stored = self.find_status_mut(column_id)?;
        let current: Vec<i64> = stored.items.iter().map(|c| c.id).collect();
        if !is_permutation(ordered, &current) {
            return Err(BackendError::BadRequest(
                "orderedIssueIds must list every issue of the column exactly once".to_string(),
            ));
        }
        let mut by_id: BTreeMap<i64, Card> =
            stored.items.drain(..).map(|c| (c.id, c)).collect();
        stored.items = ordered.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    pub fn move_card(
        &mut self,
        card_id: i64,
        target_status_id: i64,
        target_index: usize,
    ) -> Result<(), BackendError> {
        let target_len = {
            let target = self.find_status_mut(target_status_id)?;
            target.items.iter().filter(|c| c.id != card_id).count()
        };
        if target_index > target_len {
            return Err(BackendError::BadRequest(format!(
                "targetIndex {} is past the end of status {}",
                target_index, target_status_id
            )));
        }

        let card = self
            .statuses
            .iter_mut()
            .find_map(|s| {
                s.items
                    .iter()
                    .position(|c| c.id == card_id)
                    .map(|pos| s.items.remove(pos))
            })
            .ok_or_else(|| BackendError::NotFound(format!("Issue {} not found", card_id)))?;

        self.find_status_mut(target_status_id)?
            .items
            .insert(target_index, card);
        Ok(())
    }

    // -- Workflow statuses --

    pub fn list_statuses(&self, workflow_id: i64) -> Vec<WorkflowStatus> {
        self.workflow_statuses(workflow_id)
            .into_iter()
            .map(|s| s.status.clone())
            .collect()
    }

    pub fn get_status(&self, id: i64) -> Result<WorkflowStatus, BackendError> {
        self.statuses
            .iter()
            .find(|s| s.status.id == id)
            .map(|s| s.status.clone())
            .ok_or_else(|| BackendError::NotFound(format!("Workflow status {} not found", id)))
    }

    fn clear_initial(&mut self, workflow_id: i64, except: i64) {
        for stored in self
            .statuses
            .iter_mut()
            .filter(|s| s.status.workflow_id == workflow_id && s.status.id != except)
        {
            stored.status.is_initial_status = false;
        }
    }

    pub fn create_status(
        &mut self,
        data: CreateWorkflowStatus,
    ) -> Result<WorkflowStatus, BackendError> {
        data.validate()
            .map_err(|e| BackendError::BadRequest(e.to_string()))?;

        let order_index = data.order_index.unwrap_or_else(|| {
            self.workflow_statuses(data.workflow_id)
                .last()
                .map(|s| s.status.order_index + 1)
                .unwrap_or(0)
        });
        let id = self.next_status_id;
        self.next_status_id += 1;

        let status = WorkflowStatus {
            id,
            workflow_id: data.workflow_id,
            order_index,
            status_name: data.status_name.trim().to_string(),
            status_category: data.status_category,
            is_initial_status: data.is_initial_status,
        };
        if status.is_initial_status {
            self.clear_initial(status.workflow_id, id);
        }
        self.statuses.push(StoredStatus {
            status: status.clone(),
            items: Vec::new(),
        });
        Ok(status)
    }

    pub fn update_status(
        &mut self,
        id: i64,
        data: UpdateWorkflowStatus,
    ) -> Result<WorkflowStatus, BackendError> {
        data.validate()
            .map_err(|e| BackendError::BadRequest(e.to_string()))?;

        let stored = self.find_status_mut(id)?;
        if let Some(name) = data.status_name {
            stored.status.status_name = name.trim().to_string();
        }
        if let Some(category) = data.status_category {
            stored.status.status_category = Some(category);
        }
        if let Some(order_index) = data.order_index {
            stored.status.order_index = order_index;
        }
        if let Some(initial) = data.is_initial_status {
            stored.status.is_initial_status = initial;
        }
        let status = stored.status.clone();
        if status.is_initial_status {
            self.clear_initial(status.workflow_id, id);
        }
        Ok(status)
    }

    /// Delete a status. Statuses that still hold issues are refused.
    pub fn delete_status(&mut self, id: i64) -> Result<(), BackendError> {
        let position = self
            .statuses
            .iter()
            .position(|s| s.status.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Workflow status {} not found", id)))?;
        let held = self.statuses[position].items.len();
        if held > 0 {
            return Err(BackendError::Conflict(format!(
                "Workflow status {} still holds {} issue(s)",
                id, held
            )));
        }
        self.statuses.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::BoardState;

    fn card_ids(board: &BoardResponse, column: i64) -> Vec<i64> {
        board.column_map[&ColumnId(column)]
            .items
            .iter()
            .map(|c| c.id)
            .collect()
    }

    #[test]
    fn test_demo_board_is_valid() {
        let store = BoardStore::demo();
        let board = store.board(1).unwrap();
        let state = BoardState::from_response(board).unwrap();
        assert_eq!(state.card_count(), 5);
        assert_eq!(
            state.ordered_column_ids(),
            &[ColumnId(1), ColumnId(2), ColumnId(3)]
        );
    }

    #[test]
    fn test_unknown_workflow_is_not_found() {
        let store = BoardStore::demo();
        assert!(matches!(store.board(9), Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_reorder_columns_requires_permutation() {
        let mut store = BoardStore::demo();
        assert!(matches!(
            store.reorder_columns(1, &[1, 2]),
            Err(BackendError::BadRequest(_))
        ));
        store.reorder_columns(1, &[3, 1, 2]).unwrap();
        assert_eq!(
            store.board(1).unwrap().ordered_column_ids,
            vec![ColumnId(3), ColumnId(1), ColumnId(2)]
        );
    }

    #[test]
    fn test_reorder_cards_requires_permutation() {
        let mut store = BoardStore::demo();
        assert!(matches!(
            store.reorder_cards(1, &[1, 2, 4]),
            Err(BackendError::BadRequest(_))
        ));
        store.reorder_cards(1, &[3, 1, 2]).unwrap();
        assert_eq!(card_ids(&store.board(1).unwrap(), 1), vec![3, 1, 2]);
    }

    #[test]
    fn test_move_card_between_statuses() {
        let mut store = BoardStore::demo();
        store.move_card(2, 2, 1).unwrap();
        let board = store.board(1).unwrap();
        assert_eq!(card_ids(&board, 1), vec![1, 3]);
        assert_eq!(card_ids(&board, 2), vec![4, 2]);
    }

    #[test]
    fn test_move_card_rejects_bad_targets() {
        let mut store = BoardStore::demo();
        assert!(matches!(
            store.move_card(2, 99, 0),
            Err(BackendError::NotFound(_))
        ));
        assert!(matches!(
            store.move_card(2, 3, 5),
            Err(BackendError::BadRequest(_))
        ));
        assert!(matches!(
            store.move_card(42, 3, 0),
            Err(BackendError::NotFound(_))
        ));
        // Nothing moved.
        assert_eq!(card_ids(&store.board(1).unwrap(), 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_create_status_appends_and_validates() {
        let mut store = BoardStore::demo();
        let created = store
            .create_status(CreateWorkflowStatus {
                workflow_id: 1,
                status_name: " Review ".to_string(),
                status_category: Some("in_progress".to_string()),
                is_initial_status: false,
                order_index: None,
            })
            .unwrap();
        assert_eq!(created.status_name, "Review");
        assert_eq!(created.order_index, 3);
        assert_eq!(
            store.board(1).unwrap().ordered_column_ids.last(),
            Some(&ColumnId(created.id))
        );

        let invalid = store.create_status(CreateWorkflowStatus {
            workflow_id: 1,
            status_name: String::new(),
            status_category: None,
            is_initial_status: false,
            order_index: None,
        });
        assert!(matches!(invalid, Err(BackendError::BadRequest(_))));
    }

    #[test]
    fn test_initial_status_is_exclusive() {
        let mut store = BoardStore::demo();
        store
            .update_status(
                3,
                UpdateWorkflowStatus {
                    is_initial_status: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let initial: Vec<i64> = store
            .list_statuses(1)
            .iter()
            .filter(|s| s.is_initial_status)
            .map(|s| s.id)
            .collect();
        assert_eq!(initial, vec![3]);
    }

    #[test]
    fn test_delete_status_refuses_non_empty() {
        let mut store = BoardStore::demo();
        assert!(matches!(
            store.delete_status(1),
            Err(BackendError::Conflict(_))
        ));
        store.move_card(5, 1, 0).unwrap();
        store.delete_status(3).unwrap();
        assert!(matches!(store.get_status(3), Err(BackendError::NotFound(_))));
        assert_eq!(store.board(1).unwrap().ordered_column_ids.len(), 2);
    }
}
