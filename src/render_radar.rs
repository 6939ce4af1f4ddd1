use eframe::egui::{
    self, Align2, Color32, FontFamily, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2,
};

use crate::cell_type::{CellType, hex_color32};
use crate::derived_views::ComparisonRow;

/// Stroke colors for the first, second and third compared gene.
pub const COMPARE_COLORS: [&str; 3] = ["#8B5CF6", "#EC4899", "#3B82F6"];

/// Radar values are plotted against a fixed 0..10 scale.
const RADAR_MAX: f32 = 10.0;
const LABEL_OFFSET: f32 = 16.0;

/// Radar chart comparing up to three genes, one axis per cell type, in
/// selection order.
#[derive(Debug)]
pub struct RenderRadar<'a> {
    rows: &'a [ComparisonRow],
    gene_names: &'a [String],
    center: Pos2,
    radius: f32,
}

impl<'a> RenderRadar<'a> {
    pub fn new(rows: &'a [ComparisonRow], gene_names: &'a [String]) -> Self {
        Self {
            rows,
            gene_names,
            center: Pos2::ZERO,
            radius: 0.0,
        }
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size_before_wrap();
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let area = response.rect;
        self.center = area.center();
        self.radius = area.width().min(area.height()) * 0.5 - 36.0;
        if self.radius <= 0.0 {
            return;
        }

        self.draw_grid(&painter);
        for (idx, _) in self
            .gene_names
            .iter()
            .enumerate()
            .take(COMPARE_COLORS.len())
        {
            self.draw_gene_polygon(&painter, idx);
        }
        self.draw_legend(&painter, area);
    }

    fn vertex(&self, axis: usize, value: f32) -> Pos2 {
        let angle =
            2.0 * std::f32::consts::PI * (axis as f32 / 6.0) - std::f32::consts::FRAC_PI_2;
        let dist = (value / RADAR_MAX).clamp(0.0, 1.0) * self.radius;
        Pos2 {
            x: self.center.x + dist * angle.cos(),
            y: self.center.y + dist * angle.sin(),
        }
    }

    fn draw_grid(&self, painter: &egui::Painter) {
        let grid_stroke = Stroke {
            width: 1.0,
            color: Color32::from_rgb(0xCB, 0xD5, 0xE1),
        };
        let mut level = 2i32;
        while level as f32 <= RADAR_MAX {
            let ring: Vec<Pos2> = (0..6).map(|axis| self.vertex(axis, level as f32)).collect();
            painter.add(Shape::closed_line(ring, grid_stroke));
            level += 2;
        }
        let font_axis = FontId {
            size: 11.0,
            family: FontFamily::Proportional,
        };
        for (axis, ct) in CellType::ALL.iter().enumerate() {
            let rim = self.vertex(axis, RADAR_MAX);
            painter.line_segment([self.center, rim], grid_stroke);
            let dir = (rim - self.center).normalized();
            painter.text(
                rim + dir * LABEL_OFFSET,
                Align2::CENTER_CENTER,
                ct.short_label(),
                font_axis.to_owned(),
                Color32::DARK_GRAY,
            );
        }
    }

    fn draw_gene_polygon(&self, painter: &egui::Painter, idx: usize) {
        let vertices: Vec<Pos2> = self
            .rows
            .iter()
            .enumerate()
            .map(|(axis, row)| self.vertex(axis, row.values.get(idx).copied().unwrap_or(0.0)))
            .collect();
        if vertices.is_empty() {
            return;
        }
        let color = hex_color32(COMPARE_COLORS[idx]);
        painter.add(Shape::convex_polygon(
            vertices.clone(),
            color.gamma_multiply(0.3),
            Stroke { width: 2.0, color },
        ));
        for vertex in vertices {
            painter.circle_filled(vertex, 2.5, color);
        }
    }

    fn draw_legend(&self, painter: &egui::Painter, area: Rect) {
        let font = FontId {
            size: 11.0,
            family: FontFamily::Proportional,
        };
        let mut y = area.top() + 8.0;
        for (idx, name) in self
            .gene_names
            .iter()
            .enumerate()
            .take(COMPARE_COLORS.len())
        {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(area.left() + 8.0, y), Vec2::new(10.0, 10.0)),
                0.0,
                hex_color32(COMPARE_COLORS[idx]),
            );
            painter.text(
                Pos2::new(area.left() + 22.0, y),
                Align2::LEFT_TOP,
                name,
                font.to_owned(),
                Color32::DARK_GRAY,
            );
            y += 15.0;
        }
    }
}
