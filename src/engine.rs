use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CATALOG;
use crate::catalog::GeneRecord;
use crate::cell_table::{CELL_COUNT, CellTable};
use crate::cell_type::CellType;

pub type GeneId = String;
pub type OpId = String;
pub type RunId = String;

/// No more than three genes can be compared at once; a fourth selection is
/// silently ignored.
pub const MAX_COMPARED_GENES: usize = 3;

/// The session's interaction state: the one mutable piece of the
/// application, exclusively owned by the top-level controller. Lives for
/// the lifetime of the process; there is no terminal state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub search_text: String,
    /// Catalog id of the gene shown in browse mode.
    pub selected_gene: Option<GeneId>,
    pub compare_mode: bool,
    /// Selection-ordered, duplicates allowed, length capped at
    /// [`MAX_COMPARED_GENES`]. Ignored while `compare_mode` is off, but
    /// not cleared by leaving it off.
    pub compared_genes: Vec<GeneId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    UpdateSearchText { text: String },
    SelectGene { id: GeneId },
    ToggleCompareMode,
    ClearComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub changed: bool,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    Io,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Io,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for EngineError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub supported_export_charts: Vec<String>,
    pub cell_types: Vec<String>,
    pub catalog_size: usize,
    pub cell_count: usize,
    pub max_compared_genes: usize,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &SessionState;
}

/// Session controller: owns the interaction state, the once-per-session
/// cell table, and the operation journal. Interaction operations are total
/// over their domain — unknown gene ids and the compare cap degrade to
/// no-ops with a message instead of an error, so `apply` only fails on
/// concerns outside the state machine (payload parsing, export I/O).
#[derive(Debug, Clone)]
pub struct AtlasEngine {
    state: SessionState,
    cells: CellTable,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl AtlasEngine {
    pub fn new() -> Self {
        Self::with_cells(CellTable::generate(CELL_COUNT))
    }

    /// Reproducible session for tests and deterministic CLI exports.
    pub fn new_seeded(seed: u64) -> Self {
        Self::with_cells(CellTable::generate_seeded(CELL_COUNT, seed))
    }

    fn with_cells(cells: CellTable) -> Self {
        Self {
            state: SessionState::default(),
            cells,
            journal: Vec::new(),
            op_counter: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            supported_operations: vec![
                "UpdateSearchText".to_string(),
                "SelectGene".to_string(),
                "ToggleCompareMode".to_string(),
                "ClearComparison".to_string(),
            ],
            supported_export_charts: vec![
                "scatter".to_string(),
                "bar".to_string(),
                "radar".to_string(),
            ],
            cell_types: CellType::ALL
                .iter()
                .map(|ct| ct.label().to_string())
                .collect(),
            catalog_size: CATALOG.len(),
            cell_count: CELL_COUNT,
            max_compared_genes: MAX_COMPARED_GENES,
        }
    }

    /// The selected gene's catalog record, if the selection is set.
    pub fn selected_record(&self) -> Option<&'static GeneRecord> {
        self.state
            .selected_gene
            .as_deref()
            .and_then(|id| CATALOG.lookup(id))
    }

    /// Catalog records of the compared genes, in selection order.
    pub fn compared_records(&self) -> Vec<&'static GeneRecord> {
        self.state
            .compared_genes
            .iter()
            .filter_map(|id| CATALOG.lookup(id))
            .collect()
    }

    /// Search suggestions for the current search text, catalog order.
    pub fn suggestions(&self) -> Vec<&'static str> {
        CATALOG.search(&self.state.search_text)
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn apply_internal(&mut self, op: Operation) -> OpResult {
        let op_id = self.next_op_id();
        let mut changed = false;
        let mut messages = Vec::new();
        match op {
            Operation::UpdateSearchText { text } => {
                changed = self.state.search_text != text;
                self.state.search_text = text;
            }
            Operation::SelectGene { id } => {
                if CATALOG.lookup(&id).is_none() {
                    messages.push(format!("Gene '{id}' is not in the catalog; ignored"));
                } else if self.state.compare_mode {
                    if self.state.compared_genes.len() < MAX_COMPARED_GENES {
                        self.state.compared_genes.push(id.clone());
                        messages.push(format!(
                            "Added '{id}' to comparison ({}/{MAX_COMPARED_GENES})",
                            self.state.compared_genes.len()
                        ));
                        changed = true;
                    } else {
                        messages.push(format!(
                            "Comparison already holds {MAX_COMPARED_GENES} genes; '{id}' ignored"
                        ));
                    }
                } else {
                    changed = self.state.selected_gene.as_deref() != Some(id.as_str());
                    messages.push(format!("Selected gene '{id}'"));
                    self.state.selected_gene = Some(id);
                }
            }
            Operation::ToggleCompareMode => {
                if self.state.compare_mode {
                    // Clear-and-exit is one combined action.
                    self.state.compared_genes.clear();
                    self.state.compare_mode = false;
                    messages.push("Compare mode off; comparison cleared".to_string());
                } else {
                    self.state.compare_mode = true;
                    messages.push("Compare mode on".to_string());
                }
                changed = true;
            }
            Operation::ClearComparison => {
                changed = self.state.compare_mode || !self.state.compared_genes.is_empty();
                self.state.compared_genes.clear();
                self.state.compare_mode = false;
                messages.push("Comparison cleared".to_string());
            }
        }
        OpResult {
            op_id,
            changed,
            messages,
        }
    }
}

impl Default for AtlasEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for AtlasEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let result = self.apply_internal(op.clone());
        self.journal.push(OperationRecord {
            run_id: "interactive".to_string(),
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone());
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &SessionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AtlasEngine {
        AtlasEngine::new_seeded(7)
    }

    fn select(engine: &mut AtlasEngine, id: &str) -> OpResult {
        engine
            .apply(Operation::SelectGene { id: id.to_string() })
            .unwrap()
    }

    #[test]
    fn test_select_gene_replaces_selection_in_browse_mode() {
        let mut engine = engine();
        select(&mut engine, "CD3D");
        assert_eq!(engine.state().selected_gene.as_deref(), Some("CD3D"));
        select(&mut engine, "MS4A1");
        assert_eq!(engine.state().selected_gene.as_deref(), Some("MS4A1"));
    }

    #[test]
    fn test_select_unknown_gene_is_a_noop() {
        let mut engine = engine();
        select(&mut engine, "CD3D");
        let res = select(&mut engine, "NOT_A_GENE");
        assert!(!res.changed);
        assert!(res.messages[0].contains("not in the catalog"));
        assert_eq!(engine.state().selected_gene.as_deref(), Some("CD3D"));
    }

    #[test]
    fn test_toggle_compare_mode_alternates_and_exit_clears() {
        let mut engine = engine();
        engine.apply(Operation::ToggleCompareMode).unwrap();
        assert!(engine.state().compare_mode);
        select(&mut engine, "CD3D");
        select(&mut engine, "CD8A");
        assert_eq!(engine.state().compared_genes.len(), 2);

        engine.apply(Operation::ToggleCompareMode).unwrap();
        assert!(!engine.state().compare_mode);
        assert!(engine.state().compared_genes.is_empty());

        engine.apply(Operation::ToggleCompareMode).unwrap();
        assert!(engine.state().compare_mode);
        assert!(engine.state().compared_genes.is_empty());
    }

    #[test]
    fn test_fourth_comparison_selection_is_ignored() {
        let mut engine = engine();
        engine.apply(Operation::ToggleCompareMode).unwrap();
        for id in ["CD3D", "CD8A", "MS4A1", "NKG7"] {
            select(&mut engine, id);
        }
        assert_eq!(
            engine.state().compared_genes,
            vec!["CD3D", "CD8A", "MS4A1"],
            "first three selections kept in order"
        );
        // The browse selection is untouched by the ignored fourth pick.
        assert!(engine.state().selected_gene.is_none());
    }

    #[test]
    fn test_duplicate_comparison_selections_are_allowed() {
        let mut engine = engine();
        engine.apply(Operation::ToggleCompareMode).unwrap();
        select(&mut engine, "CD4");
        select(&mut engine, "CD4");
        assert_eq!(engine.state().compared_genes, vec!["CD4", "CD4"]);
    }

    #[test]
    fn test_update_search_text_changes_nothing_else() {
        let mut engine = engine();
        select(&mut engine, "CD3D");
        engine
            .apply(Operation::UpdateSearchText {
                text: "cd8".to_string(),
            })
            .unwrap();
        assert_eq!(engine.state().search_text, "cd8");
        assert_eq!(engine.state().selected_gene.as_deref(), Some("CD3D"));
        assert!(engine.state().compared_genes.is_empty());
        assert_eq!(engine.suggestions(), vec!["CD8A", "CD8B"]);
    }

    #[test]
    fn test_clear_comparison_empties_and_exits() {
        let mut engine = engine();
        engine.apply(Operation::ToggleCompareMode).unwrap();
        select(&mut engine, "GZMB");
        engine.apply(Operation::ClearComparison).unwrap();
        assert!(!engine.state().compare_mode);
        assert!(engine.state().compared_genes.is_empty());
    }

    #[test]
    fn test_workflow_applies_ops_in_order_and_journals_them() {
        let mut engine = engine();
        let wf = Workflow {
            run_id: "r1".to_string(),
            ops: vec![
                Operation::ToggleCompareMode,
                Operation::SelectGene {
                    id: "PRF1".to_string(),
                },
                Operation::SelectGene {
                    id: "GNLY".to_string(),
                },
            ],
        };
        let results = engine.apply_workflow(wf).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(engine.state().compared_genes, vec!["PRF1", "GNLY"]);
        assert_eq!(engine.operation_log().len(), 3);
        assert_eq!(engine.operation_log()[0].run_id, "r1");
        assert_eq!(results[0].op_id, "op-1");
        assert_eq!(results[2].op_id, "op-3");
    }

    #[test]
    fn test_session_cell_table_is_generated_once() {
        let engine = engine();
        assert_eq!(engine.cells().len(), CELL_COUNT);
        let other = AtlasEngine::new_seeded(7);
        assert_eq!(
            engine.cells().cells()[0].coord1,
            other.cells().cells()[0].coord1
        );
    }
}
