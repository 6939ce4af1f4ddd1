use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Vec2};
use itertools::Itertools;

use crate::CATALOG;
use crate::catalog::GeneRecord;
use crate::cell_type::hex_color32;
use crate::derived_views::{ExpressionPoint, cell_type_summary, comparison_matrix};
use crate::engine::{AtlasEngine, Engine, MAX_COMPARED_GENES, Operation};
use crate::render_bar::RenderBar;
use crate::render_export::{export_bar_svg, export_radar_svg, export_scatter_svg};
use crate::render_radar::{COMPARE_COLORS, RenderRadar};
use crate::render_scatter::RenderScatter;

const BAR_CHART_HEIGHT: f32 = 200.0;

/// Central panel of the atlas. Dispatches between the browsing view
/// (scatter plus gene detail) and the comparison view (radar plus slots)
/// on the engine's compare flag.
#[derive(Debug, Default)]
pub struct MainArea {
    status: Option<String>,
}

impl MainArea {
    pub fn render(
        &mut self,
        engine: &mut AtlasEngine,
        points: &[ExpressionPoint],
        ui: &mut egui::Ui,
    ) {
        if engine.state().compare_mode {
            self.render_compare(engine, ui);
        } else {
            self.render_browse(engine, points, ui);
        }
        if let Some(status) = &self.status {
            ui.label(RichText::new(status).small().weak());
        }
    }

    fn render_browse(
        &mut self,
        engine: &mut AtlasEngine,
        points: &[ExpressionPoint],
        ui: &mut egui::Ui,
    ) {
        let gene = engine.selected_record();
        ui.horizontal_top(|ui| {
            let chart_width = ui.available_width() * 0.6;
            let chart_height = ui.available_height() - 24.0;
            ui.vertical(|ui| {
                ui.allocate_ui(Vec2::new(chart_width, chart_height), |ui| {
                    RenderScatter::new(points, gene).render(ui);
                });
                if ui.button("Export scatter as SVG").clicked() {
                    self.save_svg("scatter.svg", export_scatter_svg(points, gene));
                }
            });
            ui.separator();
            ui.vertical(|ui| match gene {
                Some(gene) => self.render_gene_detail(gene, ui),
                None => Self::render_catalog_overview(ui),
            });
        });
    }

    fn render_gene_detail(&mut self, gene: &GeneRecord, ui: &mut egui::Ui) {
        ui.heading(&gene.display_name);
        ui.label(&gene.description);
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Specificity score:");
            ui.label(
                RichText::new(format!("{}", gene.expression_profile.specificity_score()))
                    .strong()
                    .size(18.0),
            );
        });
        ui.label(
            RichText::new(format!("Pathways: {}", gene.pathways.join(", ")))
                .small()
                .color(Color32::DARK_GRAY),
        );
        ui.label(RichText::new(&gene.clinical_note).italics().small());
        ui.separator();

        let rows = cell_type_summary(Some(gene));
        let width = ui.available_width();
        ui.allocate_ui(Vec2::new(width, BAR_CHART_HEIGHT), |ui| {
            RenderBar::new(&rows).render(ui);
        });
        if ui.button("Export bar chart as SVG").clicked() {
            self.save_svg(
                &format!("{}_expression.svg", gene.id),
                export_bar_svg(&rows, gene),
            );
        }
    }

    /// Shown while no gene is selected: the most cell-type-specific genes
    /// of the catalog as a hint of where to start.
    fn render_catalog_overview(ui: &mut egui::Ui) {
        ui.heading("Gene Expression Atlas");
        ui.label("Select a gene to color the projection by its expression.");
        ui.add_space(8.0);
        ui.label(RichText::new("Most specific markers").strong());
        let top = CATALOG
            .iter()
            .sorted_by_key(|g| -g.expression_profile.specificity_score())
            .take(8);
        for gene in top {
            ui.label(format!(
                "{} ({}) — {}",
                gene.display_name,
                gene.expression_profile.specificity_score(),
                gene.description
            ));
        }
    }

    fn render_compare(&mut self, engine: &mut AtlasEngine, ui: &mut egui::Ui) {
        let records = engine.compared_records();
        let names: Vec<String> = records.iter().map(|g| g.display_name.clone()).collect();
        let rows = comparison_matrix(&records);

        ui.horizontal_top(|ui| {
            let chart_height = ui.available_height() - 24.0;
            let chart_width = (ui.available_width() * 0.6).min(chart_height);
            ui.vertical(|ui| {
                ui.allocate_ui(Vec2::new(chart_width, chart_height), |ui| {
                    RenderRadar::new(&rows, &names).render(ui);
                });
                if !records.is_empty() && ui.button("Export radar as SVG").clicked() {
                    self.save_svg("comparison.svg", export_radar_svg(&rows, &names));
                }
            });
            ui.separator();
            ui.vertical(|ui| {
                ui.heading("Comparison");
                ui.label(format!(
                    "Pick up to {MAX_COMPARED_GENES} genes from the list."
                ));
                ui.add_space(4.0);
                for (idx, gene) in records.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
                        ui.painter()
                            .rect_filled(rect, 2.0, hex_color32(COMPARE_COLORS[idx]));
                        ui.label(format!(
                            "{} ({})",
                            gene.display_name,
                            gene.expression_profile.specificity_score()
                        ));
                    });
                }
                if records.is_empty() {
                    ui.label(RichText::new("No genes selected yet.").weak());
                }
                ui.add_space(8.0);
                if ui.button("Clear comparison").clicked() {
                    let _ = engine.apply(Operation::ClearComparison);
                }
            });
        });
    }

    fn save_svg(&mut self, suggested_name: &str, svg_text: String) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(suggested_name)
            .add_filter("SVG", &["svg"])
            .save_file()
        else {
            return;
        };
        self.status = Some(match Self::write_svg(&path, &svg_text) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    fn write_svg(path: &std::path::Path, svg_text: &str) -> Result<()> {
        std::fs::write(path, svg_text)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CATALOG;

    #[test]
    fn test_write_svg_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let gene = CATALOG.lookup("CD14").unwrap();
        let svg = export_bar_svg(&cell_type_summary(Some(gene)), gene);
        MainArea::write_svg(&path, &svg).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }

    #[test]
    fn test_write_svg_fails_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("chart.svg");
        assert!(MainArea::write_svg(&path, "<svg/>").is_err());
    }
}
