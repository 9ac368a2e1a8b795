use eframe::egui::{Color32, Painter, Pos2, Stroke, vec2};

use super::sizing::hex_color;
use super::{BubbleChart, BubbleNode};
use crate::app::badges::BadgeCache;
use crate::app::render_utils::{
    blend_color, paint_circle_image, paint_glow, shadowed_text, with_alpha,
};
use crate::util::format_signed_percent;

const BODY_ALPHA: u8 = 0xf5;
const RING_ALPHA: u8 = 0xdd;
const GAIN_RING: &str = "#00ff00";
const LOSS_RING: &str = "#ff0000";

fn ring_color(percentage: f64) -> Color32 {
    if percentage >= 0.0 {
        hex_color(GAIN_RING)
    } else {
        hex_color(LOSS_RING)
    }
}

impl BubbleChart {
    /// Largest first, so smaller bubbles land on top and match the hit test.
    fn ensure_draw_order(&mut self) {
        if !self.draw_order_dirty && self.draw_order.len() == self.nodes.len() {
            return;
        }

        self.draw_order.clear();
        self.draw_order.extend(0..self.nodes.len());
        let nodes = &self.nodes;
        self.draw_order
            .sort_by(|a, b| nodes[*b].radius.total_cmp(&nodes[*a].radius));
        self.draw_order_dirty = false;
    }

    #[cfg(test)]
    pub(in crate::app) fn draw_order(&mut self) -> &[usize] {
        self.ensure_draw_order();
        &self.draw_order
    }

    pub(in crate::app) fn paint(&mut self, painter: &Painter, origin: Pos2, badges: &BadgeCache) {
        painter.rect_filled(painter.clip_rect(), 0.0, Color32::BLACK);
        if self.viewport.is_empty() {
            return;
        }

        self.ensure_draw_order();
        let offset = origin.to_vec2();
        let hovered = self.interaction.hovered.as_deref();

        for &index in &self.draw_order {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            let is_hovered = hovered == Some(node.id.as_str());
            let center = node.position.to_pos2() + offset;
            paint_bubble(painter, node, center, is_hovered, badges);
        }

        for particle in self.particles.iter() {
            let remaining = particle.remaining();
            painter.circle_filled(
                particle.position.to_pos2() + offset,
                particle.size * (0.4 + remaining * 0.6),
                with_alpha(particle.color, (remaining * 255.0) as u8),
            );
        }
    }
}

fn paint_bubble(
    painter: &Painter,
    node: &BubbleNode,
    center: Pos2,
    hovered: bool,
    badges: &BadgeCache,
) {
    let radius = node.radius;
    let body = with_alpha(node.color, BODY_ALPHA);
    let body = if hovered {
        blend_color(body, Color32::WHITE, 0.08)
    } else {
        body
    };
    painter.circle_filled(center, radius, body);

    let ring = ring_color(node.percentage);
    let stroke = Stroke::new(2.5, with_alpha(ring, RING_ALPHA));
    painter.circle_stroke(center, radius - 1.0, stroke);
    if hovered {
        paint_glow(painter, center, radius, ring);
    }

    if let Some(texture) = badges.texture(&node.image) {
        let badge_center = center - vec2(0.0, radius * 0.1);
        paint_circle_image(painter, texture, badge_center, radius * 0.3);
    }

    let symbol_size = (radius * 0.22).max(8.0);
    shadowed_text(
        painter,
        center + vec2(0.0, radius * 0.35),
        &node.symbol,
        symbol_size,
        Color32::WHITE,
    );

    let percent_size = (radius * 0.16).max(7.0);
    shadowed_text(
        painter,
        center + vec2(0.0, radius * 0.6),
        &format_signed_percent(node.percentage, 1),
        percent_size,
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::app::bubbles::sizing::percentage_color_hex;
    use crate::app::bubbles::{ViewModel, Viewport};
    use crate::app::scheduler::testing::SteppedScheduler;
    use crate::market::MarketEntity;
    use crate::market::entity::PriceChanges;

    #[test]
    fn ring_follows_sign_of_change() {
        assert_eq!(ring_color(0.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(ring_color(3.2), Color32::from_rgb(0, 255, 0));
        assert_eq!(ring_color(-0.01), Color32::from_rgb(255, 0, 0));
        assert_eq!(
            hex_color(percentage_color_hex(20.0)),
            Color32::from_rgb(0x10, 0xb9, 0x81)
        );
    }

    #[test]
    fn draw_order_puts_small_bubbles_last() {
        let entities = (0..12)
            .map(|index| MarketEntity {
                id: format!("coin-{index}"),
                symbol: format!("c{index}"),
                name: format!("Coin {index}"),
                current_price: 1.0,
                market_cap: 1.0e9,
                market_cap_rank: None,
                changes: PriceChanges {
                    day: (index as f64 - 6.0) * 3.0,
                    ..PriceChanges::default()
                },
                image: String::new(),
            })
            .collect::<Vec<_>>();
        let scheduler = Box::new(SteppedScheduler::new(1));
        let mut chart = BubbleChart::with_rng(scheduler, StdRng::seed_from_u64(5));
        chart.rebuild(
            entities,
            ViewModel {
                max_count: 100,
                ..ViewModel::default()
            },
            Viewport {
                width: 1024.0,
                height: 768.0,
                pixels_per_point: 1.0,
            },
            0.0,
        );

        let radii = chart
            .draw_order()
            .to_vec()
            .into_iter()
            .map(|index| chart.nodes()[index].radius)
            .collect::<Vec<_>>();
        assert_eq!(radii.len(), 12);
        assert!(radii.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
