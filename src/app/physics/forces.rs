use eframe::egui::{Vec2, vec2};

use super::quadtree::{Bodies, Cell};

/// Direction used when two centers coincide, spread over the golden angle so
/// stacked bubbles fan out instead of moving as one.
pub(super) fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn charge_between(point: Vec2, source: Vec2, weight: f32) -> Vec2 {
    let delta = source - point;
    let distance_sq = delta.length_sq().max(1.0);
    delta * (weight / distance_sq)
}

pub(super) fn accumulate_charge(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    weight: f32,
    theta: f32,
    velocity: &mut Vec2,
) {
    if cell.count <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other == index {
                continue;
            }
            let delta = positions[other] - point;
            if delta.length_sq() < 1e-6 {
                *velocity -= fallback_direction(index, other) * weight.abs();
                continue;
            }
            *velocity += charge_between(point, positions[other], weight);
        }
        return;
    }

    let distance = (cell.centroid - point).length().max(1e-3);
    let far_enough = !cell.square.contains(point) && (cell.square.side() / distance) < theta;
    if far_enough {
        *velocity += charge_between(point, cell.centroid, weight * cell.count);
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, weight, theta, velocity);
    }
}

pub(super) fn collect_close_pairs(
    cell_a: &Cell,
    cell_b: &Cell,
    same_cell: bool,
    bodies: Bodies<'_>,
    pairs: &mut Vec<(usize, usize)>,
) {
    let limit = cell_a.reach + cell_b.reach;
    if cell_a.square.gap_sq(cell_b.square) > limit * limit {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        let Bodies { positions, reach } = bodies;
        let mut consider = |from: usize, to: usize| {
            let limit = reach[from] + reach[to];
            if (positions[from] - positions[to]).length_sq() <= limit * limit {
                pairs.push((from.min(to), from.max(to)));
            }
        };

        if same_cell {
            for (offset, &from) in cell_a.members.iter().enumerate() {
                for &to in &cell_a.members[offset + 1..] {
                    consider(from, to);
                }
            }
        } else {
            for &from in &cell_a.members {
                for &to in &cell_b.members {
                    consider(from, to);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (first, child_a) in children.iter().enumerate() {
            collect_close_pairs(child_a, child_a, true, bodies, pairs);
            for child_b in &children[first + 1..] {
                collect_close_pairs(child_a, child_b, false, bodies, pairs);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.square.half_extent >= cell_b.square.half_extent
    };

    if split_a {
        for child in cell_a.children() {
            collect_close_pairs(child, cell_b, false, bodies, pairs);
        }
    } else {
        for child in cell_b.children() {
            collect_close_pairs(cell_a, child, false, bodies, pairs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_pairs(positions: &[Vec2], reach: &[f32]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for a in 0..positions.len() {
            for b in (a + 1)..positions.len() {
                let limit = reach[a] + reach[b];
                if (positions[a] - positions[b]).length_sq() <= limit * limit {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    fn close_pairs(positions: &[Vec2], reach: &[f32]) -> Vec<(usize, usize)> {
        let bodies = Bodies { positions, reach };
        let root = Cell::build(bodies).unwrap();
        let mut pairs = Vec::new();
        collect_close_pairs(&root, &root, true, bodies, &mut pairs);
        pairs.sort_unstable();
        pairs
    }

    fn scattered(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| {
                let t = index as f32;
                vec2((t * 97.3) % 900.0, (t * 61.7) % 700.0)
            })
            .collect()
    }

    fn unit_reach(positions: &[Vec2]) -> Vec<f32> {
        vec![1.0; positions.len()]
    }

    #[test]
    fn close_pairs_match_brute_force() {
        let positions = scattered(150);
        let reach = (0..150)
            .map(|index| 20.0 + (index % 7) as f32 * 6.0)
            .collect::<Vec<_>>();

        let pairs = close_pairs(&positions, &reach);
        assert_eq!(pairs, brute_force_pairs(&positions, &reach));
    }

    #[test]
    fn one_wide_bubble_still_finds_distant_neighbours() {
        let positions = scattered(150);
        let mut reach = vec![4.0; 150];
        reach[42] = 400.0;

        let pairs = close_pairs(&positions, &reach);
        assert_eq!(pairs, brute_force_pairs(&positions, &reach));
        let touching_wide = pairs.iter().filter(|(a, b)| *a == 42 || *b == 42).count();
        assert!(touching_wide > 10, "{touching_wide}");
    }

    #[test]
    fn negative_charge_pushes_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let charge = unit_reach(&positions);
        let root = Cell::build(Bodies {
            positions: &positions,
            reach: &charge,
        })
        .unwrap();

        let mut left = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, -60.0, 0.9, &mut left);
        let mut right = Vec2::ZERO;
        accumulate_charge(&root, 1, &positions, -60.0, 0.9, &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left.x + 6.0).abs() < 1e-4);
    }

    #[test]
    fn far_cluster_is_approximated_by_its_centroid() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..20 {
            let offset = vec2((index % 5) as f32, (index / 5) as f32);
            positions.push(vec2(5000.0, 5000.0) + offset);
        }
        let charge = unit_reach(&positions);
        let root = Cell::build(Bodies {
            positions: &positions,
            reach: &charge,
        })
        .unwrap();

        let mut approximate = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, -50.0, 0.9, &mut approximate);
        let mut exact = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, -50.0, 0.0, &mut exact);

        assert!((approximate - exact).length() / exact.length() < 0.01);
    }
}
