use eframe::egui::{self, Align, Key, Layout, Response, Ui};

use crate::app::Dashboard;
use crate::market::{SizingMode, Timeframe};
use crate::util::format_compact_currency;

const MAX_COUNT_RANGE: std::ops::RangeInclusive<usize> = 10..=250;
const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct KeyHold {
    secs: f32,
    carry: f32,
}

fn key_accel(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn nudge_with_arrow_keys(ui: &Ui, response: &Response, value: &mut usize, step: usize) -> bool {
    let state_id = response.id.with("arrow_key_hold");
    let mut hold = ui
        .ctx()
        .data(|data| data.get_temp::<KeyHold>(state_id).unwrap_or_default());

    let (delta_time, up, down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });
    let direction = (up as i8) - (down as i8);
    if !response.has_focus() || direction == 0 {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, KeyHold::default()));
        return false;
    }

    hold.secs += delta_time;
    hold.carry +=
        direction as f32 * step as f32 * SLIDER_KEY_BASE_RATE * key_accel(hold.secs) * delta_time;
    let whole = hold.carry.trunc();
    hold.carry -= whole;

    let old_value = *value;
    let (min, max) = (*MAX_COUNT_RANGE.start(), *MAX_COUNT_RANGE.end());
    *value = (*value as i64 + whole as i64).clamp(min as i64, max as i64) as usize;

    ui.ctx().request_repaint();
    ui.ctx().data_mut(|data| data.insert_temp(state_id, hold));
    *value != old_value
}

impl Dashboard {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.horizontal_wrapped(|ui| {
            ui.heading("Coin Bubbles");
            ui.separator();

            for mode in [SizingMode::Change, SizingMode::MarketCap] {
                ui.selectable_value(&mut self.view_model.mode, mode, mode.label())
                    .on_hover_text(match mode {
                        SizingMode::Change => "Size bubbles by price change over the timeframe.",
                        SizingMode::MarketCap => "Size bubbles by market capitalisation.",
                    });
            }
            ui.separator();

            for frame in Timeframe::ALL {
                ui.selectable_value(&mut self.view_model.timeframe, frame, frame.label());
            }
            ui.separator();

            ui.add(
                egui::TextEdit::singleline(&mut self.view_model.search_query)
                    .hint_text("Search coins")
                    .desired_width(160.0),
            )
            .on_hover_text("Match by name or symbol; falls back to fuzzy symbol matching.");

            let max_count = egui::Slider::new(&mut self.view_model.max_count, MAX_COUNT_RANGE)
                .text("max coins");
            let slider = ui
                .add(max_count)
                .on_hover_text("Cap the number of bubbles on screen.");
            if slider.hovered() {
                slider.request_focus();
            }
            nudge_with_arrow_keys(ui, &slider, &mut self.view_model.max_count, 1);
            ui.separator();

            ui.toggle_value(&mut self.view_model.pop_mode_active, "Pop mode")
                .on_hover_text("Click bubbles to pop them instead of dragging.");

            let popped = self.chart.popped_count();
            let restore = ui.add_enabled(
                popped > 0,
                egui::Button::new(format!("Restore popped ({popped})")),
            );
            if restore.clicked() {
                let now = ui.input(|input| input.time);
                self.chart.restore_popped(now);
            }

            let reload = ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
            if reload.clicked() {
                *reload_requested = true;
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(self.frame_stats.display_text(self.chart.nodes().len()));
                let total_cap = format_compact_currency(self.chart.total_market_cap());
                ui.label(format!("on screen {total_cap}"))
                    .on_hover_text("Combined market cap of the visible bubbles.");
                if is_reloading {
                    ui.spinner();
                }
                if let Some(status) = &self.status {
                    ui.colored_label(ui.visuals().warn_fg_color, status);
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_acceleration_ramps_and_saturates() {
        assert_eq!(key_accel(0.0), 1.0);
        assert!(key_accel(0.5) > key_accel(0.1));
        assert_eq!(key_accel(60.0), SLIDER_KEY_ACCEL_MAX);
    }
}
