mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::bubbles::{BubbleNode, DeviceTier, Viewport};
use crate::market::SizingMode;
use forces::{accumulate_charge, collect_close_pairs, fallback_direction};
use quadtree::{Bodies, Cell};

const BARNES_HUT_THETA: f32 = 0.9;

/// Gap kept between every bubble and the viewport edge after each tick.
pub(in crate::app) const EDGE_PADDING: f32 = 20.0;
const SEED_MARGIN: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct SimulationConfig {
    pub(in crate::app) charge_strength: f32,
    pub(in crate::app) center_strength: f32,
    pub(in crate::app) collision_padding: f32,
    pub(in crate::app) collision_strength: f32,
    pub(in crate::app) collision_iterations: usize,
    pub(in crate::app) alpha_decay: f32,
    pub(in crate::app) velocity_decay: f32,
    pub(in crate::app) drag_alpha_target: f32,
    pub(in crate::app) pop_reheat: f32,
}

impl SimulationConfig {
    pub(in crate::app) fn for_viewport(mode: SizingMode, tier: DeviceTier) -> Self {
        let charge_strength = match tier {
            DeviceTier::Narrow => -50.0,
            DeviceTier::Medium | DeviceTier::Wide => -60.0,
        };
        let collision_padding = match tier {
            DeviceTier::Narrow => 8.0,
            DeviceTier::Medium => 10.0,
            DeviceTier::Wide => 12.0,
        };

        match mode {
            SizingMode::Change => Self {
                charge_strength,
                center_strength: 0.0,
                collision_padding,
                collision_strength: 1.0,
                collision_iterations: 25,
                alpha_decay: 0.0005,
                velocity_decay: 0.95,
                drag_alpha_target: 0.3,
                pop_reheat: 0.3,
            },
            SizingMode::MarketCap => Self {
                charge_strength,
                center_strength: match tier {
                    DeviceTier::Narrow => 0.06,
                    DeviceTier::Medium => 0.045,
                    DeviceTier::Wide => 0.035,
                },
                collision_padding,
                collision_strength: 1.05,
                collision_iterations: 16,
                alpha_decay: 0.0005,
                velocity_decay: 0.92,
                drag_alpha_target: 0.3,
                pop_reheat: 0.3,
            },
        }
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    velocity_changes: Vec<Vec2>,
    reach: Vec<f32>,
    pairs: Vec<(usize, usize)>,
}

pub(in crate::app) struct Simulation {
    config: SimulationConfig,
    alpha: f32,
    alpha_target: f32,
    scratch: Scratch,
}

pub(in crate::app) fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    let low = radius + EDGE_PADDING;
    let high = extent - radius - EDGE_PADDING;
    if low > high {
        extent * 0.5
    } else {
        value.clamp(low, high)
    }
}

pub(in crate::app) fn clamp_to_viewport(position: Vec2, radius: f32, viewport: Viewport) -> Vec2 {
    vec2(
        clamp_axis(position.x, radius, viewport.width),
        clamp_axis(position.y, radius, viewport.height),
    )
}

fn seed_axis<R: Rng>(radius: f32, extent: f32, rng: &mut R) -> f32 {
    let low = radius + SEED_MARGIN;
    let high = extent - radius - SEED_MARGIN;
    if low >= high {
        extent * 0.5
    } else {
        rng.gen_range(low..high)
    }
}

pub(in crate::app) fn seed_position<R: Rng>(radius: f32, viewport: Viewport, rng: &mut R) -> Vec2 {
    let seeded = vec2(
        seed_axis(radius, viewport.width, rng),
        seed_axis(radius, viewport.height, rng),
    );
    clamp_to_viewport(seeded, radius, viewport)
}

impl Simulation {
    pub(in crate::app) fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            scratch: Scratch::default(),
        }
    }

    #[cfg(test)]
    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn begin_drag(&mut self) {
        self.alpha_target = self.config.drag_alpha_target;
    }

    pub(in crate::app) fn end_drag(&mut self) {
        self.alpha_target = 0.0;
    }

    pub(in crate::app) fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.pop_reheat);
    }

    pub(in crate::app) fn tick(&mut self, nodes: &mut [BubbleNode], viewport: Viewport) {
        if nodes.is_empty() || viewport.is_empty() {
            return;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        self.gather(nodes);
        self.apply_charge();
        self.apply_centering(viewport);
        self.integrate(nodes);
        self.resolve_collisions(nodes, viewport);

        for (node, position) in nodes.iter_mut().zip(&self.scratch.positions) {
            node.position = match node.pinned {
                Some(pin) => clamp_to_viewport(pin, node.radius, viewport),
                None => clamp_to_viewport(*position, node.radius, viewport),
            };
        }
    }

    fn gather(&mut self, nodes: &[BubbleNode]) {
        let scratch = &mut self.scratch;
        let positions = nodes.iter().map(|node| node.position);
        let radii = nodes.iter().map(|node| node.radius);
        scratch.positions.clear();
        scratch.positions.extend(positions);
        scratch.radii.clear();
        scratch.radii.extend(radii);
        scratch.velocity_changes.clear();
        scratch.velocity_changes.resize(nodes.len(), Vec2::ZERO);
    }

    fn apply_charge(&mut self) {
        let weight = self.config.charge_strength * self.alpha;
        let scratch = &mut self.scratch;
        if scratch.positions.len() < 2 || weight == 0.0 {
            return;
        }

        let bodies = Bodies {
            positions: &scratch.positions,
            reach: &scratch.radii,
        };
        let Some(root) = Cell::build(bodies) else {
            return;
        };
        for (index, change) in scratch.velocity_changes.iter_mut().enumerate() {
            accumulate_charge(
                &root,
                index,
                &scratch.positions,
                weight,
                BARNES_HUT_THETA,
                change,
            );
        }
    }

    fn apply_centering(&mut self, viewport: Viewport) {
        let strength = self.config.center_strength * self.alpha;
        if strength <= 0.0 {
            return;
        }

        let center = viewport.center();
        let scratch = &mut self.scratch;
        for (change, position) in scratch.velocity_changes.iter_mut().zip(&scratch.positions) {
            *change += (center - *position) * strength;
        }
    }

    fn integrate(&mut self, nodes: &mut [BubbleNode]) {
        let retain = 1.0 - self.config.velocity_decay;
        let scratch = &mut self.scratch;

        for (index, node) in nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pinned {
                node.velocity = Vec2::ZERO;
                scratch.positions[index] = pin;
                continue;
            }

            node.velocity = (node.velocity + scratch.velocity_changes[index]) * retain;
            scratch.positions[index] += node.velocity;
        }
    }

    /// Gauss-Seidel passes pushing overlapping pairs apart until
    /// `distance >= ra + rb + padding`. Candidate pairs are gathered once per
    /// tick. Each bubble reaches `r + (padding + slack) / 2`, where the slack of
    /// one maximum radius absorbs in-tick motion, and quadtree cells are pruned
    /// by the widest reach they hold.
    fn resolve_collisions(&mut self, nodes: &[BubbleNode], viewport: Viewport) {
        let node_count = nodes.len();
        if node_count < 2 || self.config.collision_iterations == 0 {
            return;
        }

        let padding = self.config.collision_padding;
        let strength = self.config.collision_strength;
        let slack = nodes.iter().map(|node| node.radius).fold(0.0, f32::max);
        let margin = (padding + slack) * 0.5;

        let scratch = &mut self.scratch;
        let reach = nodes.iter().map(|node| node.radius + margin);
        scratch.reach.clear();
        scratch.reach.extend(reach);
        scratch.pairs.clear();

        let bodies = Bodies {
            positions: &scratch.positions,
            reach: &scratch.reach,
        };
        let Some(root) = Cell::build(bodies) else {
            return;
        };
        collect_close_pairs(&root, &root, true, bodies, &mut scratch.pairs);
        if scratch.pairs.is_empty() {
            return;
        }

        for _ in 0..self.config.collision_iterations {
            let mut any_overlap = false;

            for &(a, b) in &scratch.pairs {
                let pinned_a = nodes[a].pinned.is_some();
                let pinned_b = nodes[b].pinned.is_some();
                if pinned_a && pinned_b {
                    continue;
                }

                let min_distance = nodes[a].radius + nodes[b].radius + padding;
                let delta = scratch.positions[a] - scratch.positions[b];
                let distance = delta.length();
                if distance >= min_distance {
                    continue;
                }
                any_overlap = true;

                let direction = if distance > 1e-4 {
                    delta / distance
                } else {
                    fallback_direction(a, b)
                };
                let correction = direction * ((min_distance - distance) * strength);

                // Heavier (larger) bubbles give way less.
                let area_a = nodes[a].radius * nodes[a].radius;
                let area_b = nodes[b].radius * nodes[b].radius;
                let share_a = if pinned_a {
                    0.0
                } else if pinned_b {
                    1.0
                } else {
                    area_b / (area_a + area_b)
                };

                scratch.positions[a] += correction * share_a;
                scratch.positions[b] -= correction * (1.0 - share_a);
            }

            for (position, node) in scratch.positions.iter_mut().zip(nodes) {
                *position = clamp_to_viewport(*position, node.radius, viewport);
            }

            if !any_overlap {
                break;
            }
        }
    }
}
