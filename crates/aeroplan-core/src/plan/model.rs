//! Assembly plan types.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One row of a cleaned table.
pub type TableRow = Vec<String>;

/// A rectangular table with at least two rows, the first being the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTable {
    rows: Vec<TableRow>,
}

impl PlanTable {
    /// Wraps cleaned rows, rejecting grids that are too small or ragged.
    pub fn from_rows(rows: Vec<TableRow>) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }
        let width = rows[0].len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self { rows })
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    pub fn data_rows(&self) -> &[TableRow] {
        &self.rows[1..]
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Renders the table back to markdown with a separator under the header.
    pub fn to_markdown(&self) -> String {
        let line = |row: &TableRow| format!("| {} |", row.join(" | "));
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        for (i, row) in self.rows.iter().enumerate() {
            out.push(line(row));
            if i == 0 {
                out.push(format!("|{}", "---|".repeat(self.width())));
            }
        }
        out.join("\n")
    }
}

/// A plan table stamped with its generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyPlanRecord {
    pub table: PlanTable,
    pub generated_at: DateTime<Local>,
}

impl AssemblyPlanRecord {
    pub fn new(table: PlanTable) -> Self {
        Self {
            table,
            generated_at: Local::now(),
        }
    }

    /// `assembly_plan_<YYYYMMDD_HHMMSS>`, the artifact key.
    pub fn file_stem(&self) -> String {
        format!("assembly_plan_{}", self.generated_at.format("%Y%m%d_%H%M%S"))
    }
}
