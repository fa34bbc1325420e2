//! Import records: one CSV row mapped onto poem fields.

use crate::tabular::TabularRow;

/// Column holding the poem title.
pub const TITLE_COLUMN: &str = "Title";
/// Column holding the poet's name.
pub const POET_COLUMN: &str = "Poet";
/// Column holding the poem text.
pub const BODY_COLUMN: &str = "Poem";
/// Optional tag column.
pub const TAGS_COLUMN: &str = "Tags";

/// A single row of import data.
///
/// Values are kept exactly as read; dedup compares titles verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRecord {
    pub line: u64,
    pub title: String,
    pub poet_name: String,
    pub body: String,
    pub tags: Option<String>,
}

impl ImportRecord {
    pub fn from_row(row: &TabularRow) -> Self {
        let value = |column: &str| row.get(column).unwrap_or_default().to_string();
        Self {
            line: row.line(),
            title: value(TITLE_COLUMN),
            poet_name: value(POET_COLUMN),
            body: value(BODY_COLUMN),
            tags: row
                .get(TAGS_COLUMN)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
        }
    }

    /// Whether title, poet, and body are all present (non-blank).
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.poet_name.trim().is_empty()
            && !self.body.trim().is_empty()
    }
}
