use rand::Rng;
use serde::Serialize;

use crate::catalog::GeneRecord;
use crate::cell_table::SimulatedCell;
use crate::cell_type::CellType;
use crate::expression::expression_color_bucket;

/// A simulated cell with the derived expression value for the currently
/// selected gene attached. The value is the gene's per-type mean plus
/// uniform jitter in [-1, 1], drawn per cell per recomputation and never
/// stored; callers needing determinism capture one snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExpressionPoint {
    pub id: usize,
    pub coord1: f32,
    pub coord2: f32,
    pub cell_type: CellType,
    pub expression: Option<f32>,
}

impl ExpressionPoint {
    /// Bucket color when an expression value is attached, the cell-type
    /// base color otherwise.
    pub fn plot_color(&self) -> &'static str {
        match self.expression {
            Some(value) => expression_color_bucket(Some(value)),
            None => self.cell_type.color_hex(),
        }
    }
}

/// One bar of the per-cell-type summary chart.
#[derive(Debug, Clone, Serialize)]
pub struct CellTypeSummaryRow {
    pub cell_type: CellType,
    pub mean_expression: f32,
    pub color: &'static str,
}

/// One radar-chart row: a cell type plus one value per compared gene, in
/// selection order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub cell_type: CellType,
    pub values: Vec<f32>,
}

/// Attaches per-cell expression for `gene` to every cell. With no gene the
/// cells pass through unchanged and keep their base display color.
pub fn with_expression<R: Rng>(
    cells: &[SimulatedCell],
    gene: Option<&GeneRecord>,
    rng: &mut R,
) -> Vec<ExpressionPoint> {
    cells
        .iter()
        .map(|cell| ExpressionPoint {
            id: cell.id,
            coord1: cell.coord1,
            coord2: cell.coord2,
            cell_type: cell.cell_type,
            expression: gene.map(|g| {
                g.expression_profile.level(cell.cell_type) + rng.gen_range(-1.0f32..=1.0)
            }),
        })
        .collect()
}

/// Six rows in the fixed cell-type order, means taken straight from the
/// profile. No gene yields no rows.
pub fn cell_type_summary(gene: Option<&GeneRecord>) -> Vec<CellTypeSummaryRow> {
    let Some(gene) = gene else {
        return vec![];
    };
    CellType::ALL
        .iter()
        .map(|ct| CellTypeSummaryRow {
            cell_type: *ct,
            mean_expression: gene.expression_profile.level(*ct),
            color: ct.color_hex(),
        })
        .collect()
}

/// One row per cell type, each holding the compared genes' profile values
/// by selection position. Empty input yields an empty matrix.
pub fn comparison_matrix(genes: &[&GeneRecord]) -> Vec<ComparisonRow> {
    if genes.is_empty() {
        return vec![];
    }
    CellType::ALL
        .iter()
        .map(|ct| ComparisonRow {
            cell_type: *ct,
            values: genes
                .iter()
                .map(|g| g.expression_profile.level(*ct))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CATALOG;
    use crate::cell_table::CellTable;
    use crate::expression::{BUCKET_DEEP_RED, BUCKET_PALE_GRAY};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_with_expression_no_gene_passes_cells_through() {
        let table = CellTable::generate_seeded(20, 3);
        let mut rng = StdRng::seed_from_u64(0);
        let points = with_expression(table.cells(), None, &mut rng);
        assert_eq!(points.len(), 20);
        for (point, cell) in points.iter().zip(table.cells()) {
            assert_eq!(point.id, cell.id);
            assert_eq!(point.coord1, cell.coord1);
            assert!(point.expression.is_none());
            assert_eq!(point.plot_color(), cell.display_color());
        }
    }

    #[test]
    fn test_with_expression_jitter_stays_within_one_unit() {
        let gene = CATALOG.lookup("CD3D").unwrap();
        let table = CellTable::generate_seeded(500, 9);
        let mut rng = StdRng::seed_from_u64(1);
        let points = with_expression(table.cells(), Some(gene), &mut rng);
        for point in &points {
            let mean = gene.expression_profile.level(point.cell_type);
            let value = point.expression.unwrap();
            assert!((value - mean).abs() <= 1.0 + f32::EPSILON);
        }
    }

    #[test]
    fn test_with_expression_redraws_jitter_per_recomputation() {
        let gene = CATALOG.lookup("MS4A1").unwrap();
        let table = CellTable::generate_seeded(100, 5);
        let mut rng = StdRng::seed_from_u64(2);
        let first = with_expression(table.cells(), Some(gene), &mut rng);
        let second = with_expression(table.cells(), Some(gene), &mut rng);
        let identical = first
            .iter()
            .zip(&second)
            .all(|(a, b)| a.expression == b.expression);
        assert!(!identical, "jitter is drawn per recomputation");
    }

    #[test]
    fn test_plot_color_buckets() {
        let mut point = ExpressionPoint {
            id: 0,
            coord1: 0.0,
            coord2: 0.0,
            cell_type: CellType::B,
            expression: Some(0.2),
        };
        assert_eq!(point.plot_color(), BUCKET_PALE_GRAY);
        point.expression = Some(9.0);
        assert_eq!(point.plot_color(), BUCKET_DEEP_RED);
        point.expression = None;
        assert_eq!(point.plot_color(), CellType::B.color_hex());
    }

    #[test]
    fn test_cell_type_summary_rows() {
        assert!(cell_type_summary(None).is_empty());
        let gene = CATALOG.lookup("CD14").unwrap();
        let rows = cell_type_summary(Some(gene));
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].cell_type, CellType::Cd4T);
        let monocytes = &rows[CellType::Monocytes.index()];
        assert_eq!(monocytes.mean_expression, 9.5);
        assert_eq!(monocytes.color, CellType::Monocytes.color_hex());
    }

    #[test]
    fn test_comparison_matrix_shapes() {
        assert!(comparison_matrix(&[]).is_empty());
        let g = CATALOG.lookup("NKG7").unwrap();
        let rows = comparison_matrix(&[g]);
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row.values.len() == 1));
        assert_eq!(rows[CellType::Nk.index()].values[0], 9.8);

        let h = CATALOG.lookup("GNLY").unwrap();
        let rows = comparison_matrix(&[g, h]);
        assert!(rows.iter().all(|row| row.values.len() == 2));
        assert_eq!(rows[CellType::Cd8T.index()].values, vec![7.5, 7.8]);
    }
}
