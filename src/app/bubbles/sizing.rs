use std::f32::consts::PI;

use eframe::egui::Color32;

use super::Viewport;
use super::normalize::Candidate;
use crate::market::SizingMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum DeviceTier {
    Narrow,
    Medium,
    Wide,
}

impl DeviceTier {
    pub(in crate::app) fn for_width(width: f32) -> Self {
        if width < 640.0 {
            Self::Narrow
        } else if width < 1024.0 {
            Self::Medium
        } else {
            Self::Wide
        }
    }

    pub(in crate::app) fn radius_range(self) -> (f32, f32) {
        match self {
            Self::Narrow => (30.0, 70.0),
            Self::Medium => (35.0, 85.0),
            Self::Wide => (40.0, 100.0),
        }
    }

    fn area_target(self) -> f32 {
        match self {
            Self::Narrow => 0.30,
            Self::Medium => 0.36,
            Self::Wide => 0.42,
        }
    }

    fn ceiling(self) -> (f32, f32) {
        match self {
            Self::Narrow => (70.0, 0.18),
            Self::Medium => (85.0, 0.17),
            Self::Wide => (110.0, 0.16),
        }
    }
}

const MARKET_CAP_EASING: f64 = 1.15;
const SHRINK_FLOOR: f32 = 0.65;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct RadiusBounds {
    pub(in crate::app) floor: f32,
    pub(in crate::app) hard_cap: f32,
}

pub(in crate::app) fn radius_bounds(viewport: Viewport) -> RadiusBounds {
    let tier = viewport.tier();
    let (min_radius, _) = tier.radius_range();
    let (ceiling, fraction) = tier.ceiling();
    RadiusBounds {
        floor: min_radius * SHRINK_FLOOR,
        hard_cap: ceiling.min(viewport.shorter_side() * fraction).max(1.0),
    }
}

fn market_cap_ceiling(viewport: Viewport, node_count: usize) -> f32 {
    let (min_radius, max_radius) = viewport.tier().radius_range();
    let fraction = if node_count > 140 {
        0.11
    } else if node_count > 100 {
        0.13
    } else {
        0.16
    };
    max_radius
        .min(viewport.shorter_side() * fraction)
        .max(min_radius)
}

fn change_radius(magnitude: f64, max_magnitude: f64, min_radius: f32, max_radius: f32) -> f32 {
    if max_magnitude <= 0.0 {
        return min_radius;
    }
    let t = (magnitude / max_magnitude).clamp(0.0, 1.0).sqrt() as f32;
    min_radius + (max_radius - min_radius) * t
}

fn normalize_log(value: f64, min: f64, max: f64) -> f64 {
    let min = min.max(1.0);
    let max = max.max(min);
    let value = value.max(1.0);

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0)
}

fn market_cap_radius(
    cap: f64,
    min_cap: f64,
    max_cap: f64,
    min_radius: f32,
    max_radius: f32,
) -> f32 {
    let eased = normalize_log(cap, min_cap, max_cap).powf(MARKET_CAP_EASING) as f32;
    min_radius + (max_radius - min_radius) * eased
}

pub(super) fn assign_radii(
    candidates: &[Candidate<'_>],
    mode: SizingMode,
    viewport: Viewport,
) -> Vec<f32> {
    if candidates.is_empty() || viewport.is_empty() {
        return Vec::new();
    }

    let tier = viewport.tier();
    let (min_radius, max_radius) = tier.radius_range();

    let mut radii = match mode {
        SizingMode::Change => {
            let largest = candidates
                .iter()
                .map(|candidate| candidate.percentage.abs())
                .fold(0.0_f64, f64::max);
            candidates
                .iter()
                .map(|candidate| candidate.percentage.abs())
                .map(|magnitude| change_radius(magnitude, largest, min_radius, max_radius))
                .collect::<Vec<_>>()
        }
        SizingMode::MarketCap => {
            let mut min_cap = f64::INFINITY;
            let mut max_cap = f64::NEG_INFINITY;
            for candidate in candidates {
                let cap = candidate.market_cap.max(1.0);
                min_cap = min_cap.min(cap);
                max_cap = max_cap.max(cap);
            }
            let ceiling = market_cap_ceiling(viewport, candidates.len());
            candidates
                .iter()
                .map(|candidate| candidate.market_cap)
                .map(|cap| market_cap_radius(cap, min_cap, max_cap, min_radius, ceiling))
                .collect::<Vec<_>>()
        }
    };

    let bounds = radius_bounds(viewport);

    let total_area: f32 = radii.iter().map(|radius| PI * radius * radius).sum();
    let target_area = tier.area_target() * viewport.area();
    if total_area > target_area && total_area > 0.0 {
        let shrink = (target_area / total_area).sqrt();
        for radius in &mut radii {
            *radius = (*radius * shrink).max(bounds.floor);
        }
    }

    for radius in &mut radii {
        *radius = radius.min(bounds.hard_cap);
    }

    radii
}

const COLOR_BUCKETS: [(f64, &str); 6] = [
    (15.0, "#10b981"),
    (10.0, "#14b8a6"),
    (7.0, "#22c55e"),
    (5.0, "#34d399"),
    (3.0, "#4ade80"),
    (1.0, "#6ee7b7"),
];

const NEGATIVE_BUCKETS: [(f64, &str); 5] = [
    (-1.0, "#fca5a5"),
    (-3.0, "#f87171"),
    (-5.0, "#ef4444"),
    (-7.0, "#dc2626"),
    (-10.0, "#b91c1c"),
];

pub(in crate::app) fn percentage_color_hex(percentage: f64) -> &'static str {
    if percentage.is_nan() || percentage == 0.0 {
        return "#6b7280";
    }

    if percentage > 0.0 {
        return COLOR_BUCKETS
            .iter()
            .find(|(threshold, _)| percentage >= *threshold)
            .map(|(_, hex)| *hex)
            .unwrap_or("#86efac");
    }

    NEGATIVE_BUCKETS
        .iter()
        .find(|(threshold, _)| percentage > *threshold)
        .map(|(_, hex)| *hex)
        .unwrap_or("#991b1b")
}

pub(in crate::app) fn color_for_percentage(percentage: f64) -> Color32 {
    hex_color(percentage_color_hex(percentage))
}

pub(in crate::app) fn hex_color(hex: &str) -> Color32 {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Color32::from_rgb(r, g, b),
        _ => Color32::GRAY,
    }
}
