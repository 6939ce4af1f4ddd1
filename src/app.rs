use eframe::egui::{self, Ui};
use rand::thread_rng;

use crate::about;
use crate::derived_views::{ExpressionPoint, with_expression};
use crate::engine::{AtlasEngine, Engine, GeneId, Operation};
use crate::left_panel::LeftPanel;
use crate::main_area::MainArea;

/// The single-window atlas application. All interaction flows through the
/// engine as operations; the app only holds view state and the memoized
/// scatter points.
pub struct AtlasApp {
    engine: AtlasEngine,
    left_panel: LeftPanel,
    main_area: MainArea,
    /// Scatter points for the gene in `points_gene`, recomputed (with fresh
    /// jitter) only when the selection changes.
    points: Vec<ExpressionPoint>,
    points_gene: Option<GeneId>,
    points_valid: bool,
}

impl AtlasApp {
    pub fn new() -> Self {
        Self::with_engine(AtlasEngine::new())
    }

    pub fn new_seeded(seed: u64) -> Self {
        Self::with_engine(AtlasEngine::new_seeded(seed))
    }

    fn with_engine(engine: AtlasEngine) -> Self {
        Self {
            engine,
            left_panel: LeftPanel::default(),
            main_area: MainArea::default(),
            points: vec![],
            points_gene: None,
            points_valid: false,
        }
    }

    fn refresh_points_if_needed(&mut self) {
        let current = self.engine.state().selected_gene.clone();
        if self.points_valid && current == self.points_gene {
            return;
        }
        let gene = self.engine.selected_record();
        self.points = with_expression(self.engine.cells().cells(), gene, &mut thread_rng());
        self.points_gene = current;
        self.points_valid = true;
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Gene Expression Atlas");
            ui.separator();

            let mut search_text = self.engine.state().search_text.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut search_text)
                    .hint_text("Search genes")
                    .desired_width(180.0),
            );
            if response.changed() {
                let _ = self
                    .engine
                    .apply(Operation::UpdateSearchText { text: search_text });
            }

            let compare_mode = self.engine.state().compare_mode;
            let compare_button = egui::Button::new("Compare genes").selected(compare_mode);
            if ui.add(compare_button).clicked() {
                let _ = self.engine.apply(Operation::ToggleCompareMode);
            }
            if compare_mode {
                ui.label(format!(
                    "{}/3 selected",
                    self.engine.state().compared_genes.len()
                ));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(about::footer_text())
                        .small()
                        .weak(),
                );
            });
        });
    }
}

impl Default for AtlasApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for AtlasApp {
    // The runner still calls the deprecated `update` before `ui`; all
    // rendering lives in `update`, so `ui` has nothing left to draw.
    fn ui(&mut self, _ui: &mut Ui, _frame: &mut eframe::Frame) {}

    #[allow(deprecated)]
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("atlas_header").show(ctx, |ui| {
            self.render_header(ui);
        });

        egui::SidePanel::left("gene_browser")
            .resizable(true)
            .default_width(230.0)
            .show(ctx, |ui| {
                self.left_panel.render(&mut self.engine, ui);
            });

        self.refresh_points_if_needed();

        egui::CentralPanel::default().show(ctx, |ui| {
            let Self {
                engine,
                main_area,
                points,
                ..
            } = self;
            main_area.render(engine, points, ui);
        });
    }
}
