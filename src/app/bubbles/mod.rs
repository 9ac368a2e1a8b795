mod build;
mod interaction;
mod normalize;
mod sizing;
mod view;

use std::collections::HashSet;

use eframe::egui::{Color32, Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::particles::ParticleField;
use super::physics::{Simulation, SimulationConfig};
use super::scheduler::Scheduler;
use crate::market::{MarketEntity, SizingMode, Timeframe};

pub(in crate::app) use interaction::{InteractionState, PointerEvent, Tooltip, TooltipChange};
pub(in crate::app) use sizing::DeviceTier;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) struct Viewport {
    pub(in crate::app) width: f32,
    pub(in crate::app) height: f32,
    pub(in crate::app) pixels_per_point: f32,
}

impl Viewport {
    pub(in crate::app) fn is_empty(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }

    pub(in crate::app) fn tier(&self) -> DeviceTier {
        DeviceTier::for_width(self.width)
    }

    pub(in crate::app) fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub(in crate::app) fn area(&self) -> f32 {
        self.width * self.height
    }

    pub(in crate::app) fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub(in crate::app) fn differs_from(&self, other: &Viewport) -> bool {
        (self.width - other.width).abs() > 0.5
            || (self.height - other.height).abs() > 0.5
            || (self.pixels_per_point - other.pixels_per_point).abs() > f32::EPSILON
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct ViewModel {
    pub(in crate::app) mode: SizingMode,
    pub(in crate::app) timeframe: Timeframe,
    pub(in crate::app) search_query: String,
    pub(in crate::app) pop_mode_active: bool,
    pub(in crate::app) max_count: usize,
}

#[derive(Clone, Debug)]
pub(in crate::app) struct BubbleNode {
    pub(in crate::app) id: String,
    pub(in crate::app) symbol: String,
    pub(in crate::app) name: String,
    pub(in crate::app) rank: Option<u32>,
    pub(in crate::app) price: f64,
    pub(in crate::app) market_cap: f64,
    pub(in crate::app) percentage: f64,
    pub(in crate::app) color: Color32,
    pub(in crate::app) radius: f32,
    pub(in crate::app) image: String,
    pub(in crate::app) position: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) pinned: Option<Vec2>,
}

pub(in crate::app) struct BubbleChart {
    entities: Vec<MarketEntity>,
    view_model: ViewModel,
    viewport: Viewport,
    nodes: Vec<BubbleNode>,
    simulation: Simulation,
    interaction: InteractionState,
    tooltip: Option<Tooltip>,
    particles: ParticleField,
    popped: HashSet<String>,
    scheduler: Box<dyn Scheduler>,
    rng: StdRng,
    draw_order: Vec<usize>,
    draw_order_dirty: bool,
    revision: u64,
}

impl BubbleChart {
    pub(in crate::app) fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self::with_rng(scheduler, StdRng::from_entropy())
    }

    pub(in crate::app) fn with_rng(scheduler: Box<dyn Scheduler>, rng: StdRng) -> Self {
        Self {
            entities: Vec::new(),
            view_model: ViewModel::default(),
            viewport: Viewport::default(),
            nodes: Vec::new(),
            simulation: Simulation::new(SimulationConfig::for_viewport(
                SizingMode::Change,
                DeviceTier::Wide,
            )),
            interaction: InteractionState::default(),
            tooltip: None,
            particles: ParticleField::default(),
            popped: HashSet::new(),
            scheduler,
            rng,
            draw_order: Vec::new(),
            draw_order_dirty: true,
            revision: 0,
        }
    }

    pub(in crate::app) fn nodes(&self) -> &[BubbleNode] {
        &self.nodes
    }

    #[cfg(test)]
    pub(in crate::app) fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(in crate::app) fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub(in crate::app) fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub(in crate::app) fn popped_count(&self) -> usize {
        self.popped.len()
    }

    pub(in crate::app) fn total_market_cap(&self) -> f64 {
        self.nodes.iter().map(|node| node.market_cap).sum()
    }

    #[cfg(test)]
    pub(in crate::app) fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    #[cfg(test)]
    pub(in crate::app) fn revision(&self) -> u64 {
        self.revision
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub(in crate::app) fn advance(&mut self, now: f64) -> u32 {
        if self.viewport.is_empty() {
            return 0;
        }

        let ticks = self.scheduler.due_ticks(now);
        for _ in 0..ticks {
            self.simulation.tick(&mut self.nodes, self.viewport);
            self.particles.advance();
        }
        ticks
    }

    pub(in crate::app) fn shutdown(&mut self) {
        self.scheduler.stop();
        self.interaction = InteractionState::default();
        self.tooltip = None;
        self.particles.clear();
        tracing::debug!(revision = self.revision, "bubble chart stopped");
    }
}
