use svg::Document;
use svg::node::element::{Circle, Line, Path, Rectangle, Text};

use crate::catalog::GeneRecord;
use crate::cell_type::CellType;
use crate::derived_views::{CellTypeSummaryRow, ComparisonRow, ExpressionPoint};
use crate::expression::BUCKET_COLORS;
use crate::render_radar::COMPARE_COLORS;

const W: f32 = 900.0;
const H: f32 = 620.0;
const MARGIN_LEFT: f32 = 60.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_TOP: f32 = 48.0;
const MARGIN_BOTTOM: f32 = 56.0;

/// Scatter axes span a fixed [-12, 12] window around the [-10, 10]
/// coordinate range so jittered points never clip.
const SCATTER_DOMAIN: f32 = 12.0;

/// Radar values are plotted against a fixed 0..10 scale.
const RADAR_MAX: f32 = 10.0;

fn blank_document() -> Document {
    Document::new()
        .set("viewBox", (0, 0, W, H))
        .set("width", W)
        .set("height", H)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", W)
                .set("height", H)
                .set("fill", "#ffffff"),
        )
}

fn title_text(title: String) -> Text {
    Text::new(title)
        .set("x", 12)
        .set("y", 24)
        .set("font-family", "monospace")
        .set("font-size", 16)
        .set("fill", "#111111")
}

fn scatter_xy(coord1: f32, coord2: f32) -> (f32, f32) {
    let plot_w = W - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = H - MARGIN_TOP - MARGIN_BOTTOM;
    let x = MARGIN_LEFT + (coord1 + SCATTER_DOMAIN) / (2.0 * SCATTER_DOMAIN) * plot_w;
    let y = MARGIN_TOP + (SCATTER_DOMAIN - coord2) / (2.0 * SCATTER_DOMAIN) * plot_h;
    (x, y)
}

/// UMAP scatter of the whole cell table. With a selected gene the cells are
/// painted by expression bucket and a Low→High legend is appended, otherwise
/// by cell type with a cell-type legend.
pub fn export_scatter_svg(points: &[ExpressionPoint], gene: Option<&GeneRecord>) -> String {
    let mut doc = blank_document();

    // Gridlines every 5 units, labeled on both axes.
    let mut tick = -10i32;
    while tick <= 10 {
        let (x, _) = scatter_xy(tick as f32, 0.0);
        let (_, y) = scatter_xy(0.0, tick as f32);
        doc = doc
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", MARGIN_TOP)
                    .set("x2", x)
                    .set("y2", H - MARGIN_BOTTOM)
                    .set("stroke", "#E2E8F0")
                    .set("stroke-dasharray", "3 3"),
            )
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", y)
                    .set("x2", W - MARGIN_RIGHT)
                    .set("y2", y)
                    .set("stroke", "#E2E8F0")
                    .set("stroke-dasharray", "3 3"),
            )
            .add(
                Text::new(format!("{tick}"))
                    .set("x", x)
                    .set("y", H - MARGIN_BOTTOM + 16.0)
                    .set("text-anchor", "middle")
                    .set("font-family", "monospace")
                    .set("font-size", 10)
                    .set("fill", "#64748B"),
            )
            .add(
                Text::new(format!("{tick}"))
                    .set("x", MARGIN_LEFT - 8.0)
                    .set("y", y + 3.0)
                    .set("text-anchor", "end")
                    .set("font-family", "monospace")
                    .set("font-size", 10)
                    .set("fill", "#64748B"),
            );
        tick += 5;
    }

    for point in points {
        let (x, y) = scatter_xy(point.coord1, point.coord2);
        doc = doc.add(
            Circle::new()
                .set("cx", x)
                .set("cy", y)
                .set("r", 2.5)
                .set("fill", point.plot_color())
                .set("fill-opacity", 0.7),
        );
    }

    let title = match gene {
        Some(gene) => format!("UMAP projection — {}", gene.display_name),
        None => "UMAP projection — cell types".to_string(),
    };
    doc = doc.add(title_text(title));

    // Legend row along the bottom edge.
    let legend_y = H - 14.0;
    match gene {
        Some(_) => {
            doc = doc.add(
                Text::new("Low")
                    .set("x", MARGIN_LEFT)
                    .set("y", legend_y)
                    .set("font-family", "monospace")
                    .set("font-size", 11)
                    .set("fill", "#64748B"),
            );
            let mut x = MARGIN_LEFT + 34.0;
            for color in BUCKET_COLORS {
                doc = doc.add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", legend_y - 10.0)
                        .set("width", 28.0)
                        .set("height", 12.0)
                        .set("fill", color),
                );
                x += 32.0;
            }
            doc = doc.add(
                Text::new("High")
                    .set("x", x + 6.0)
                    .set("y", legend_y)
                    .set("font-family", "monospace")
                    .set("font-size", 11)
                    .set("fill", "#64748B"),
            );
        }
        None => {
            let mut x = MARGIN_LEFT;
            for ct in CellType::ALL {
                doc = doc
                    .add(
                        Rectangle::new()
                            .set("x", x)
                            .set("y", legend_y - 10.0)
                            .set("width", 12.0)
                            .set("height", 12.0)
                            .set("fill", ct.color_hex()),
                    )
                    .add(
                        Text::new(ct.label())
                            .set("x", x + 16.0)
                            .set("y", legend_y)
                            .set("font-family", "monospace")
                            .set("font-size", 11)
                            .set("fill", "#64748B"),
                    );
                x += 16.0 + estimate_text_width(ct.label()) + 14.0;
            }
        }
    }

    doc.to_string()
}

/// Per-cell-type mean expression bars for one gene, bars in the fixed
/// cell-type order and filled with the cell-type colors.
pub fn export_bar_svg(rows: &[CellTypeSummaryRow], gene: &GeneRecord) -> String {
    let mut doc = blank_document();

    let y_max = rows
        .iter()
        .map(|r| r.mean_expression)
        .fold(10.0f32, f32::max);
    let plot_h = H - MARGIN_TOP - MARGIN_BOTTOM;
    let plot_w = W - MARGIN_LEFT - MARGIN_RIGHT;
    let baseline = H - MARGIN_BOTTOM;

    // Horizontal guides every 2 expression units.
    let mut level = 0i32;
    while level as f32 <= y_max {
        let y = baseline - (level as f32 / y_max) * plot_h;
        doc = doc
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", y)
                    .set("x2", W - MARGIN_RIGHT)
                    .set("y2", y)
                    .set("stroke", "#E2E8F0")
                    .set("stroke-dasharray", "3 3"),
            )
            .add(
                Text::new(format!("{level}"))
                    .set("x", MARGIN_LEFT - 8.0)
                    .set("y", y + 3.0)
                    .set("text-anchor", "end")
                    .set("font-family", "monospace")
                    .set("font-size", 10)
                    .set("fill", "#64748B"),
            );
        level += 2;
    }

    let slot = plot_w / rows.len().max(1) as f32;
    let bar_w = slot * 0.6;
    for (i, row) in rows.iter().enumerate() {
        let x = MARGIN_LEFT + i as f32 * slot + (slot - bar_w) / 2.0;
        let h = (row.mean_expression / y_max) * plot_h;
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", baseline - h)
                    .set("width", bar_w)
                    .set("height", h)
                    .set("fill", row.color),
            )
            .add(
                Text::new(format!("{:.1}", row.mean_expression))
                    .set("x", x + bar_w / 2.0)
                    .set("y", baseline - h - 6.0)
                    .set("text-anchor", "middle")
                    .set("font-family", "monospace")
                    .set("font-size", 11)
                    .set("fill", "#444444"),
            )
            .add(
                Text::new(row.cell_type.short_label())
                    .set("x", x + bar_w / 2.0)
                    .set("y", baseline + 18.0)
                    .set("text-anchor", "middle")
                    .set("font-family", "monospace")
                    .set("font-size", 11)
                    .set("fill", "#64748B"),
            );
    }

    doc = doc.add(title_text(format!(
        "Expression by cell type — {}",
        gene.display_name
    )));
    doc.to_string()
}

fn radar_xy(cx: f32, cy: f32, axis: usize, value: f32, r: f32) -> (f32, f32) {
    let angle = 2.0 * std::f32::consts::PI * (axis as f32 / 6.0) - std::f32::consts::FRAC_PI_2;
    let dist = (value / RADAR_MAX).clamp(0.0, 1.0) * r;
    (cx + dist * angle.cos(), cy + dist * angle.sin())
}

fn radar_polygon_path(cx: f32, cy: f32, values: &[f32], r: f32) -> String {
    let mut path = String::new();
    for (axis, value) in values.iter().enumerate() {
        let (x, y) = radar_xy(cx, cy, axis, *value, r);
        let cmd = if axis == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{cmd} {x:.3} {y:.3} "));
    }
    path.push('Z');
    path
}

/// Radar comparison of up to three genes on a fixed 0..10 scale, one axis
/// per cell type.
pub fn export_radar_svg(rows: &[ComparisonRow], gene_names: &[String]) -> String {
    let mut doc = blank_document();
    let cx = W / 2.0;
    let cy = MARGIN_TOP + (H - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
    let r = ((H - MARGIN_TOP - MARGIN_BOTTOM) / 2.0) - 30.0;

    // Concentric grid hexagons every 2 units, plus the six axis spokes.
    let mut level = 2i32;
    while level as f32 <= RADAR_MAX {
        let ring = vec![level as f32; 6];
        doc = doc.add(
            Path::new()
                .set("d", radar_polygon_path(cx, cy, &ring, r))
                .set("fill", "none")
                .set("stroke", "#CBD5E1"),
        );
        level += 2;
    }
    for (axis, ct) in CellType::ALL.iter().enumerate() {
        let (x, y) = radar_xy(cx, cy, axis, RADAR_MAX, r);
        let angle =
            2.0 * std::f32::consts::PI * (axis as f32 / 6.0) - std::f32::consts::FRAC_PI_2;
        let (lx, ly) = (cx + (r + 18.0) * angle.cos(), cy + (r + 18.0) * angle.sin() + 4.0);
        doc = doc
            .add(
                Line::new()
                    .set("x1", cx)
                    .set("y1", cy)
                    .set("x2", x)
                    .set("y2", y)
                    .set("stroke", "#CBD5E1"),
            )
            .add(
                Text::new(ct.short_label())
                    .set("x", lx)
                    .set("y", ly)
                    .set("text-anchor", "middle")
                    .set("font-family", "monospace")
                    .set("font-size", 12)
                    .set("fill", "#64748B"),
            );
    }

    for (idx, _) in gene_names.iter().enumerate().take(COMPARE_COLORS.len()) {
        let values: Vec<f32> = rows
            .iter()
            .map(|row| row.values.get(idx).copied().unwrap_or(0.0))
            .collect();
        if values.is_empty() {
            continue;
        }
        let color = COMPARE_COLORS[idx];
        doc = doc.add(
            Path::new()
                .set("d", radar_polygon_path(cx, cy, &values, r))
                .set("fill", color)
                .set("fill-opacity", 0.3)
                .set("stroke", color)
                .set("stroke-width", 2),
        );
    }

    // Legend with one swatch per compared gene.
    let mut y = 24.0;
    for (idx, name) in gene_names.iter().enumerate().take(COMPARE_COLORS.len()) {
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", W - 180.0)
                    .set("y", y - 10.0)
                    .set("width", 12.0)
                    .set("height", 12.0)
                    .set("fill", COMPARE_COLORS[idx]),
            )
            .add(
                Text::new(name.clone())
                    .set("x", W - 162.0)
                    .set("y", y)
                    .set("font-family", "monospace")
                    .set("font-size", 12)
                    .set("fill", "#444444"),
            );
        y += 18.0;
    }

    doc = doc.add(title_text("Gene comparison radar".to_string()));
    doc.to_string()
}

fn estimate_text_width(label: &str) -> f32 {
    (label.chars().count().max(1) as f32) * 6.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CATALOG;
    use crate::cell_table::CellTable;
    use crate::derived_views::{cell_type_summary, comparison_matrix, with_expression};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scatter_svg_without_gene_uses_cell_type_legend() {
        let table = CellTable::generate_seeded(50, 11);
        let mut rng = StdRng::seed_from_u64(0);
        let points = with_expression(table.cells(), None, &mut rng);
        let text = export_scatter_svg(&points, None);
        assert!(text.starts_with("<svg"));
        assert_eq!(text.matches("<circle").count(), 50);
        assert!(text.contains("cell types"));
        assert!(text.contains("Dendritic cells"));
    }

    #[test]
    fn test_scatter_svg_with_gene_uses_bucket_legend() {
        let gene = CATALOG.lookup("CD3D").unwrap();
        let table = CellTable::generate_seeded(50, 11);
        let mut rng = StdRng::seed_from_u64(0);
        let points = with_expression(table.cells(), Some(gene), &mut rng);
        let text = export_scatter_svg(&points, Some(gene));
        assert!(text.contains("CD3D"));
        assert!(text.contains("Low"));
        assert!(text.contains("#CB181D"));
    }

    #[test]
    fn test_bar_svg_has_one_bar_per_cell_type() {
        let gene = CATALOG.lookup("MS4A1").unwrap();
        let rows = cell_type_summary(Some(gene));
        let text = export_bar_svg(&rows, gene);
        // Background rectangle plus six bars.
        assert_eq!(text.matches("<rect").count(), 1 + 6);
        assert!(text.contains("9.2"));
        assert!(text.contains("#FFA07A"));
    }

    #[test]
    fn test_radar_svg_has_one_polygon_per_gene() {
        let a = CATALOG.lookup("NKG7").unwrap();
        let b = CATALOG.lookup("GNLY").unwrap();
        let rows = comparison_matrix(&[a, b]);
        let names = vec![a.display_name.clone(), b.display_name.clone()];
        let text = export_radar_svg(&rows, &names);
        // Five grid rings plus two gene polygons.
        assert_eq!(text.matches("<path").count(), 5 + 2);
        assert!(text.contains("#8B5CF6"));
        assert!(text.contains("#EC4899"));
        assert!(!text.contains("#3B82F6"), "third color unused for 2 genes");
    }
}
