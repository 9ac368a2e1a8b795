use eframe::egui::{self, Color32, Context, Id, Order, RichText};

use crate::app::Dashboard;

const GAIN_TEXT: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const LOSS_TEXT: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

impl Dashboard {
    pub(in crate::app) fn draw_tooltip(&self, ctx: &Context) {
        let Some(tooltip) = self.chart.tooltip() else {
            return;
        };

        egui::Area::new(Id::new("bubble_tooltip").with(&tooltip.id))
            .order(Order::Tooltip)
            .fixed_pos(self.chart_origin + tooltip.anchor.to_vec2())
            .constrain(true)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(240.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&tooltip.name).strong());
                        if let Some(rank) = tooltip.rank {
                            ui.label(RichText::new(format!("#{rank}")).weak());
                        }
                    });
                    ui.label(&tooltip.price);
                    let color = if tooltip.is_gain { GAIN_TEXT } else { LOSS_TEXT };
                    ui.label(RichText::new(&tooltip.change).color(color));
                    ui.label(RichText::new(&tooltip.market_cap).weak());
                });
            });
    }
}
