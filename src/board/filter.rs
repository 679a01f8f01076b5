//! Read-only filtered views of a board.

use serde::Serialize;

use super::models::{Card, Column};
use super::state::BoardState;

/// View criteria. Empty criteria match every card; set criteria combine
/// with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    pub search: Option<String>,
    pub assignee_ids: Vec<i64>,
    pub issue_type_ids: Vec<i64>,
    pub epic_ids: Vec<i64>,
}

/// Columns in display order with non-matching cards hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredBoard {
    pub columns: Vec<Column>,
    pub total_issues: usize,
    pub filtered_count: usize,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty())
            && self.assignee_ids.is_empty()
            && self.issue_type_ids.is_empty()
            && self.epic_ids.is_empty()
    }

    pub fn matches(&self, card: &Card) -> bool {
        // Blank text is no criterion; otherwise the raw text is matched.
        if let Some(search) = self.search.as_deref()
            && !search.trim().is_empty()
        {
            let needle = search.to_lowercase();
            let hit = |text: Option<&str>| {
                text.is_some_and(|t| t.to_lowercase().contains(&needle))
            };
            let found = hit(Some(&card.key))
                || hit(card.summary.as_deref())
                || hit(card.name.as_deref())
                || card.assignees.iter().any(|a| hit(a.full_name.as_deref()));
            if !found {
                return false;
            }
        }

        if !self.assignee_ids.is_empty()
            && !card
                .assignees
                .iter()
                .any(|a| self.assignee_ids.contains(&a.id))
        {
            return false;
        }

        if !self.issue_type_ids.is_empty()
            && !card
                .issue_type_id
                .is_some_and(|id| self.issue_type_ids.contains(&id))
        {
            return false;
        }

        if !self.epic_ids.is_empty()
            && !card
                .epic_link_id
                .is_some_and(|id| self.epic_ids.contains(&id))
        {
            return false;
        }

        true
    }

    pub fn apply(&self, state: &BoardState) -> FilteredBoard {
        let mut total_issues = 0;
        let mut filtered_count = 0;
        let columns = state
            .columns()
            .map(|column| {
                total_issues += column.items.len();
                let items: Vec<Card> = column
                    .items
                    .iter()
                    .filter(|card| self.matches(card))
                    .cloned()
                    .collect();
                filtered_count += items.len();
                Column::new(column.column_id, column.title.clone(), items)
            })
            .collect();
        FilteredBoard {
            columns,
            total_issues,
            filtered_count,
        }
    }
}
