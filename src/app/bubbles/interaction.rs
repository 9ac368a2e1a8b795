use eframe::egui::{Pos2, Vec2, vec2};

use super::{BubbleChart, BubbleNode};
use crate::app::physics::clamp_to_viewport;
use crate::util::{format_cap_billions, format_price, format_signed_percent};

#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct InteractionState {
    pub(in crate::app) hovered: Option<String>,
    pub(in crate::app) dragging: Option<String>,
    pub(in crate::app) pointer: Option<Pos2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Tooltip {
    pub(in crate::app) id: String,
    pub(in crate::app) name: String,
    pub(in crate::app) rank: Option<u32>,
    pub(in crate::app) price: String,
    pub(in crate::app) change: String,
    pub(in crate::app) is_gain: bool,
    pub(in crate::app) market_cap: String,
    pub(in crate::app) anchor: Pos2,
}

const TOOLTIP_OFFSET: Vec2 = vec2(15.0, 15.0);

impl Tooltip {
    fn for_node(node: &BubbleNode, pointer: Pos2) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            rank: node.rank,
            price: format_price(node.price),
            change: format_signed_percent(node.percentage, 2),
            is_gain: node.percentage >= 0.0,
            market_cap: format_cap_billions(node.market_cap),
            anchor: pointer + TOOLTIP_OFFSET,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum TooltipChange {
    Unchanged,
    Show(Tooltip),
    Hide,
}

impl BubbleChart {
    /// Topmost bubble under `point`. Smaller bubbles are painted over larger
    /// ones, so the smallest containing bubble wins; ties go to node order.
    pub(in crate::app) fn hit_test(&self, point: Pos2) -> Option<usize> {
        let point = point.to_vec2();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| (node.position - point).length() < node.radius)
            .min_by(|a, b| a.1.radius.total_cmp(&b.1.radius).then(a.0.cmp(&b.0)))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn handle_pointer(&mut self, event: PointerEvent) -> TooltipChange {
        match event {
            PointerEvent::Down(point) => {
                self.interaction.pointer = Some(point);
                let Some(index) = self.hit_test(point) else {
                    return TooltipChange::Unchanged;
                };
                if self.view_model.pop_mode_active {
                    self.pop(index)
                } else {
                    self.begin_drag(index, point);
                    TooltipChange::Unchanged
                }
            }
            PointerEvent::Move(point) => {
                self.interaction.pointer = Some(point);
                if self.interaction.dragging.is_some() {
                    self.drag_to(point);
                    TooltipChange::Unchanged
                } else {
                    self.update_hover(point)
                }
            }
            PointerEvent::Up => {
                self.release_drag();
                TooltipChange::Unchanged
            }
            PointerEvent::Leave => {
                self.release_drag();
                self.interaction.pointer = None;
                if self.interaction.hovered.take().is_some() {
                    self.tooltip = None;
                    TooltipChange::Hide
                } else {
                    TooltipChange::Unchanged
                }
            }
        }
    }

    #[cfg(test)]
    pub(in crate::app) fn particles(&self) -> &crate::app::particles::ParticleField {
        &self.particles
    }

    fn begin_drag(&mut self, index: usize, point: Pos2) {
        self.release_drag();

        let viewport = self.viewport;
        let node = &mut self.nodes[index];
        let pin = clamp_to_viewport(point.to_vec2(), node.radius, viewport);
        node.pinned = Some(pin);
        node.position = pin;
        node.velocity = Vec2::ZERO;

        self.interaction.dragging = Some(node.id.clone());
        self.simulation.begin_drag();
    }

    fn drag_to(&mut self, point: Pos2) {
        let viewport = self.viewport;
        let dragged = self.interaction.dragging.as_deref();
        let Some(node) = self
            .nodes
            .iter_mut()
            .find(|node| Some(node.id.as_str()) == dragged)
        else {
            self.release_drag();
            return;
        };

        let pin = clamp_to_viewport(point.to_vec2(), node.radius, viewport);
        node.pinned = Some(pin);
        node.position = pin;
    }

    pub(super) fn release_drag(&mut self) {
        let Some(id) = self.interaction.dragging.take() else {
            return;
        };
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
            node.pinned = None;
        }
        self.simulation.end_drag();
    }

    fn update_hover(&mut self, point: Pos2) -> TooltipChange {
        let hovered = self.hit_test(point).map(|index| &self.nodes[index]);
        let hovered_id = hovered.map(|node| node.id.as_str());

        if hovered_id == self.interaction.hovered.as_deref() {
            if let Some(tooltip) = self.tooltip.as_mut() {
                tooltip.anchor = point + TOOLTIP_OFFSET;
            }
            return TooltipChange::Unchanged;
        }

        self.interaction.hovered = hovered_id.map(str::to_owned);
        self.tooltip = hovered.map(|node| Tooltip::for_node(node, point));
        match &self.tooltip {
            Some(tooltip) => TooltipChange::Show(tooltip.clone()),
            None => TooltipChange::Hide,
        }
    }

    fn pop(&mut self, index: usize) -> TooltipChange {
        let node = self.nodes.remove(index);
        self.popped.insert(node.id.clone());
        self.particles
            .spawn_burst(node.position, node.color, node.radius, &mut self.rng);
        self.simulation.reheat();
        self.draw_order_dirty = true;

        tracing::info!(id = %node.id, remaining = self.nodes.len(), "popped bubble");

        if self.interaction.dragging.as_deref() == Some(node.id.as_str()) {
            self.interaction.dragging = None;
            self.simulation.end_drag();
        }

        if self.interaction.hovered.as_deref() == Some(node.id.as_str()) {
            self.interaction.hovered = None;
            self.tooltip = None;
            TooltipChange::Hide
        } else {
            TooltipChange::Unchanged
        }
    }
}
