use eframe::egui::{self, RichText};

use crate::CATALOG;
use crate::engine::{AtlasEngine, Engine, Operation};

/// Gene browser sidebar. Shows the whole catalog, narrowed by the live
/// search text, and issues a selection for every click; the engine decides
/// what the click means in the current mode.
#[derive(Debug, Default, Clone)]
pub struct LeftPanel {}

impl LeftPanel {
    pub fn render(&mut self, engine: &mut AtlasEngine, ui: &mut egui::Ui) {
        ui.heading("Genes");
        let suggestions = engine.suggestions();
        ui.label(
            RichText::new(format!("{} of {}", suggestions.len(), CATALOG.len()))
                .small()
                .weak(),
        );
        ui.separator();

        let selected_id = engine.state().selected_gene.clone();
        let compared: Vec<String> = engine.state().compared_genes.clone();
        let compare_mode = engine.state().compare_mode;

        let mut clicked: Option<String> = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical(|ui| {
                for id in suggestions {
                    let gene = match CATALOG.lookup(id) {
                        Some(gene) => gene,
                        None => continue,
                    };
                    let highlighted = if compare_mode {
                        compared.iter().any(|c| c == id)
                    } else {
                        selected_id.as_deref() == Some(id)
                    };
                    let text = format!(
                        "{}  ·  {}",
                        gene.display_name,
                        gene.expression_profile.specificity_score()
                    );
                    let button = egui::Button::new(text).selected(highlighted);
                    if ui.add(button).clicked() {
                        clicked = Some(id.to_string());
                    }
                }
            });
        });

        if let Some(id) = clicked {
            let _ = engine.apply(Operation::SelectGene { id });
        }
    }
}
