//! Assembly plan domain module.
//!
//! Design answers are free text with a four-phase structure. Phase 3 holds
//! the plan as a markdown table, which is extracted, cleaned into a
//! rectangular grid and persisted for downstream tooling.
//!
//! # Module Structure
//!
//! - `extract`: Locates the Phase 3 table text (`extract_phase3_table`)
//! - `clean`: Normalizes table text into rows (`clean_markdown_table`)
//! - `model`: Plan types (`PlanTable`, `AssemblyPlanRecord`, `TableRow`)
//! - `repository`: Persistence trait (`PlanRepository`)

mod clean;
mod extract;
mod model;
mod repository;

// Re-export public API
pub use clean::clean_markdown_table;
pub use extract::extract_phase3_table;
pub use model::{AssemblyPlanRecord, PlanTable, TableRow};
pub use repository::PlanRepository;

/// Runs extraction and cleaning over a full design answer.
///
/// Returns `None` when there is no Phase 3 table or fewer than two rows
/// survive cleaning.
pub fn extract_plan_table(answer: &str) -> Option<PlanTable> {
    let raw = extract_phase3_table(answer)?;
    PlanTable::from_rows(clean_markdown_table(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plan_table_scenario() {
        let text = "Phase 3. Plan\n|Order|Operation|\n|---|---|\n|1|JigIn|\n\nPhase 4. Validation";
        let table = extract_plan_table(text).unwrap();
        assert_eq!(
            table.rows(),
            &[
                vec!["Order".to_string(), "Operation".to_string()],
                vec!["1".to_string(), "JigIn".to_string()],
            ]
        );
    }

    #[test]
    fn test_extract_plan_table_keeps_every_data_row() {
        let before_phase4 =
            "Phase 3. Plan\n|Order|Operation|\n|---|---|\n|1|JigIn|\n|2|Drilling|\n\nPhase 4. Validation";
        let at_end = "Phase 3. Plan\n|Order|Operation|\n|---|---|\n|1|JigIn|\n|2|Drilling|";

        for text in [before_phase4, at_end] {
            let table = extract_plan_table(text).unwrap();
            assert_eq!(table.data_rows().len(), 2, "input: {text:?}");
            assert_eq!(table.rows()[2], vec!["2", "Drilling"]);
        }
    }

    #[test]
    fn test_extract_plan_table_needs_two_rows() {
        let text = "Phase 3\n|Order|Operation|\n|---|---|\nTotal | 5\n";
        assert!(extract_plan_table(text).is_none());
    }

    #[test]
    fn test_full_design_answer_round_trip() {
        let answer = "\
## Phase 1. **Data Extraction**
| Resource | Cost (€/h) |
|---|---|
| Crane | 50 |

## Phase 2. **Constraint Analysis**
- JigIn precedes Drilling

## Phase 3. **Plan Generation**
| Order | Operation | Type | Duration (min) |
|:---|:---:|---|---:|
| 1 | JigIn | Manual | 30 |
| 2a | Drilling | Automatic | 45 |
| 2b | Sealing | Manual |
| Total | | | 75 |

Total due time: 75 min

## Phase 4. **Validation Report**
- [✓] Completed 4 joints of 1/4 body
";
        let table = extract_plan_table(answer).unwrap();
        assert_eq!(table.rows().len(), 4);
        assert_eq!(table.header().unwrap()[1], "Operation");
        assert_eq!(table.rows()[2], vec!["2a", "Drilling", "Automatic", "45"]);
        // short row padded to the table width
        assert_eq!(table.rows()[3], vec!["2b", "Sealing", "Manual", ""]);
        assert!(table.rows().iter().all(|r| r.len() == 4));
    }
}
