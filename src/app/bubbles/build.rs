use eframe::egui::Vec2;

use super::normalize::normalize;
use super::sizing::{assign_radii, color_for_percentage};
use super::{BubbleChart, BubbleNode, InteractionState, ViewModel, Viewport};
use crate::app::physics::{Simulation, SimulationConfig, seed_position};
use crate::market::MarketEntity;

impl BubbleChart {
    pub(in crate::app) fn rebuild(
        &mut self,
        entities: Vec<MarketEntity>,
        view_model: ViewModel,
        viewport: Viewport,
        now: f64,
    ) {
        self.entities = entities;
        self.view_model = view_model;
        self.viewport = viewport;
        self.rebuild_nodes(now);
    }

    pub(in crate::app) fn resize(&mut self, viewport: Viewport, now: f64) {
        if !viewport.differs_from(&self.viewport) {
            return;
        }
        self.viewport = viewport;
        self.rebuild_nodes(now);
    }

    pub(in crate::app) fn set_pop_mode(&mut self, active: bool) {
        if self.view_model.pop_mode_active == active {
            return;
        }
        self.view_model.pop_mode_active = active;
        if active {
            self.release_drag();
        }
    }

    pub(in crate::app) fn restore_popped(&mut self, now: f64) {
        if self.popped.is_empty() {
            return;
        }
        tracing::info!(restored = self.popped.len(), "restoring popped bubbles");
        self.popped.clear();
        self.rebuild_nodes(now);
    }

    fn rebuild_nodes(&mut self, now: f64) {
        self.scheduler.stop();
        // A rebuild mid-drag cancels the drag; hover ids may no longer exist.
        self.interaction = InteractionState::default();
        self.tooltip = None;
        self.draw_order_dirty = true;
        self.revision = self.revision.wrapping_add(1);

        if self.viewport.is_empty() {
            self.nodes.clear();
            return;
        }

        let mode = self.view_model.mode;
        let candidates = normalize(&self.entities, self.view_model.timeframe, &self.popped);
        let radii = assign_radii(&candidates, mode, self.viewport);

        let viewport = self.viewport;
        let rng = &mut self.rng;
        let nodes = candidates
            .iter()
            .zip(radii)
            .map(|(candidate, radius)| {
                let entity = candidate.entity;
                BubbleNode {
                    id: entity.id.clone(),
                    symbol: entity.symbol.to_uppercase(),
                    name: entity.name.clone(),
                    rank: entity.market_cap_rank,
                    price: entity.current_price,
                    market_cap: candidate.market_cap,
                    percentage: candidate.percentage,
                    color: color_for_percentage(candidate.percentage),
                    radius,
                    image: entity.image.clone(),
                    position: seed_position(radius, viewport, rng),
                    velocity: Vec2::ZERO,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        self.nodes = nodes;
        self.simulation = Simulation::new(SimulationConfig::for_viewport(mode, viewport.tier()));
        self.scheduler.start(now);

        tracing::debug!(
            revision = self.revision,
            nodes = self.nodes.len(),
            popped = self.popped.len(),
            ?mode,
            width = viewport.width,
            height = viewport.height,
            "rebuilt bubble layout"
        );
    }
}
