use std::collections::VecDeque;

use eframe::egui::Context;

const FPS_SAMPLE_WINDOW: usize = 180;

#[derive(Default)]
pub(in crate::app) struct FrameStats {
    current: f32,
    samples: VecDeque<f32>,
}

impl FrameStats {
    pub(in crate::app) fn record(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        self.push_frame_time(dt);
    }

    fn push_frame_time(&mut self, dt: f32) {
        if dt <= f32::EPSILON {
            return;
        }

        self.current = (1.0 / dt).clamp(0.0, 1000.0);
        self.samples.push_back(self.current);
        while self.samples.len() > FPS_SAMPLE_WINDOW {
            self.samples.pop_front();
        }
    }

    pub(in crate::app) fn display_text(&self, live_nodes: usize) -> String {
        let mut parts = vec![format!("FPS {:.0}", self.current)];

        if !self.samples.is_empty() {
            let avg = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
            parts.push(format!("avg {avg:.1}"));
        }

        parts.push(format!("{live_nodes} bubbles"));
        parts.join(" | ")
    }
}
