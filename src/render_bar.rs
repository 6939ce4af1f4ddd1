use eframe::egui::{self, Align2, Color32, FontFamily, FontId, Pos2, Rect, Sense, Vec2};

use crate::cell_type::hex_color32;
use crate::derived_views::CellTypeSummaryRow;
use crate::render_scatter::GRID_STROKE;

const AXIS_GUTTER: f32 = 28.0;
const LABEL_GUTTER: f32 = 18.0;

/// Bar chart of mean expression per cell type for the selected gene, one
/// bar per cell type in the fixed order, filled with the cell-type colors.
#[derive(Debug)]
pub struct RenderBar<'a> {
    rows: &'a [CellTypeSummaryRow],
    area: Rect,
}

impl<'a> RenderBar<'a> {
    pub fn new(rows: &'a [CellTypeSummaryRow]) -> Self {
        Self {
            rows,
            area: Rect::NOTHING,
        }
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size_before_wrap();
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        self.area = response.rect;
        if self.rows.is_empty() {
            return;
        }

        let y_max = self
            .rows
            .iter()
            .map(|r| r.mean_expression)
            .fold(10.0f32, f32::max);
        let baseline = self.area.bottom() - LABEL_GUTTER;
        let plot_h = baseline - self.area.top() - 16.0;
        let plot_left = self.area.left() + AXIS_GUTTER;
        let plot_w = self.area.right() - plot_left;

        let font_tick = FontId {
            size: 9.0,
            family: FontFamily::Monospace,
        };
        let mut level = 0i32;
        while level as f32 <= y_max {
            let y = baseline - (level as f32 / y_max) * plot_h;
            painter.line_segment(
                [
                    Pos2::new(plot_left, y),
                    Pos2::new(self.area.right(), y),
                ],
                GRID_STROKE.to_owned(),
            );
            painter.text(
                Pos2::new(plot_left - 4.0, y),
                Align2::RIGHT_CENTER,
                format!("{level}"),
                font_tick.to_owned(),
                Color32::GRAY,
            );
            level += 2;
        }

        let font_label = FontId {
            size: 10.0,
            family: FontFamily::Proportional,
        };
        let slot = plot_w / self.rows.len() as f32;
        let bar_w = slot * 0.6;
        for (i, row) in self.rows.iter().enumerate() {
            let x = plot_left + i as f32 * slot + (slot - bar_w) / 2.0;
            let h = (row.mean_expression / y_max) * plot_h;
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(x, baseline - h), Vec2::new(bar_w, h)),
                2.0,
                hex_color32(row.color),
            );
            painter.text(
                Pos2::new(x + bar_w / 2.0, baseline - h - 2.0),
                Align2::CENTER_BOTTOM,
                format!("{:.1}", row.mean_expression),
                font_tick.to_owned(),
                Color32::DARK_GRAY,
            );
            painter.text(
                Pos2::new(x + bar_w / 2.0, baseline + 2.0),
                Align2::CENTER_TOP,
                row.cell_type.short_label(),
                font_label.to_owned(),
                Color32::DARK_GRAY,
            );
        }
    }
}
