use eframe::egui::{self, Context, CursorIcon, Pos2, Rect, Response, Sense, Ui};

use crate::app::Dashboard;
use crate::app::bubbles::{PointerEvent, TooltipChange, Viewport};
use crate::market::{EntityFilter, select_entities};

impl Dashboard {
    fn sync_chart(&mut self, viewport: Viewport, now: f64) {
        let key = self.build_key();
        if self.built.as_ref() == Some(&key) {
            self.chart.resize(viewport, now);
            return;
        }

        let filter = EntityFilter {
            query: &key.search_query,
            timeframe: key.timeframe,
            mode: key.mode,
            auto_trim: self.auto_trim,
            max_count: key.max_count,
        };
        let selected = select_entities(&self.entities, &filter);
        self.chart
            .rebuild(selected, self.view_model.clone(), viewport, now);
        self.built = Some(key);
    }

    fn forward_pointer(&mut self, ctx: &Context, rect: Rect, response: &Response) {
        let (pressed, released) = ctx.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
            )
        });
        let pointer = response.hover_pos().or_else(|| {
            if response.is_pointer_button_down_on() {
                response.interact_pointer_pos()
            } else {
                None
            }
        });

        let mut changes = Vec::new();
        match pointer {
            Some(screen) => {
                let point = Pos2::ZERO + (screen - rect.min);
                self.pointer_inside = true;
                if pressed && response.hovered() {
                    changes.push(self.chart.handle_pointer(PointerEvent::Down(point)));
                }
                changes.push(self.chart.handle_pointer(PointerEvent::Move(point)));
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                changes.push(self.chart.handle_pointer(PointerEvent::Leave));
            }
            None => {}
        }
        if released {
            changes.push(self.chart.handle_pointer(PointerEvent::Up));
        }

        if changes
            .iter()
            .any(|change| !matches!(change, TooltipChange::Unchanged))
        {
            ctx.request_repaint();
        }
    }

    fn cursor_icon(&self) -> Option<CursorIcon> {
        let interaction = self.chart.interaction();
        if interaction.dragging.is_some() {
            Some(CursorIcon::Grabbing)
        } else if interaction.hovered.is_none() {
            None
        } else if self.view_model.pop_mode_active {
            Some(CursorIcon::Crosshair)
        } else {
            Some(CursorIcon::Grab)
        }
    }

    pub(in crate::app) fn draw_chart(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let ctx = ui.ctx().clone();
        let now = ctx.input(|input| input.time);
        let viewport = Viewport {
            width: rect.width(),
            height: rect.height(),
            pixels_per_point: ctx.pixels_per_point(),
        };

        self.chart_origin = rect.min;
        self.sync_chart(viewport, now);
        self.chart.set_pop_mode(self.view_model.pop_mode_active);
        self.forward_pointer(&ctx, rect, &response);
        self.chart.advance(now);

        for node in self.chart.nodes() {
            self.badges.request(&node.image);
        }

        let painter = ui.painter_at(rect);
        self.chart.paint(&painter, rect.min, &self.badges);

        if self.chart.nodes().is_empty() && !viewport.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No coins match the current filters",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(150),
            );
        }

        if let Some(icon) = self.cursor_icon() {
            ui.output_mut(|output| {
                output.cursor_icon = icon;
            });
        }

        if self.chart.is_running() {
            ctx.request_repaint();
        }
    }
}
