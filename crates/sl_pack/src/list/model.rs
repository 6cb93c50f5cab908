//! The row/column contract the component table view consumes, plus the
//! change notifications it subscribes to.

use sl_core::json::ProblemSeverity;

use super::ComponentList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Version,
}

/// Decoration shown next to a component's name when its patches carry
/// problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFlags {
    pub selectable: bool,
    pub enabled: bool,
}

/// Structural change notifications, sent to the registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    ModelReset,
    RowsInserted { first: usize, last: usize },
    RowsRemoved { first: usize, last: usize },
    RowsAboutToMove { from: usize, to: usize },
    RowsMoved { from: usize, to: usize },
}

impl ComponentList {
    pub const COLUMN_COUNT: usize = 2;

    pub fn row_count(&self) -> usize {
        self.components.len()
    }

    pub fn header(column: Column) -> &'static str {
        match column {
            Column::Name => "Name",
            Column::Version => "Version",
        }
    }

    pub fn display_data(&self, row: usize, column: Column) -> Option<String> {
        let component = self.components.get(row)?;
        Some(match column {
            Column::Name => component.name().to_owned(),
            Column::Version => {
                if component.is_custom() {
                    format!("{} (Custom)", component.version())
                } else {
                    component.version().to_owned()
                }
            }
        })
    }

    pub fn decoration(&self, row: usize, column: Column) -> Option<Decoration> {
        if column != Column::Name {
            return None;
        }
        match self.components.get(row)?.problem_severity() {
            ProblemSeverity::Warning => Some(Decoration::Warning),
            ProblemSeverity::Error => Some(Decoration::Error),
            ProblemSeverity::None => None,
        }
    }

    /// Valid rows are selectable and enabled; anything else is inert.
    pub fn row_flags(&self, row: usize) -> RowFlags {
        if row < self.components.len() {
            RowFlags {
                selectable: true,
                enabled: true,
            }
        } else {
            RowFlags::default()
        }
    }

    pub(crate) fn emit(&self, event: ListEvent) {
        if let Some(sender) = &self.events {
            // a dropped receiver just means nobody is watching
            let _ = sender.send(event);
        }
    }
}
