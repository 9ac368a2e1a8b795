use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (span.x.max(span.y) * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        match (point.x >= self.center.x, point.y >= self.center.y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let gap = ((self.center - other.center).abs() - vec2(reach, reach)).max(Vec2::ZERO);
        gap.length_sq()
    }
}

#[derive(Clone, Copy)]
pub(super) struct Bodies<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) reach: &'a [f32],
}

pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) count: f32,
    pub(super) reach: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<Cell>>; 4],
}

impl Cell {
    pub(super) fn build(bodies: Bodies<'_>) -> Option<Self> {
        let square = Square::enclosing(bodies.positions)?;
        let members = (0..bodies.positions.len()).collect::<Vec<_>>();
        Some(Self::subdivide(square, members, bodies, 0))
    }

    fn subdivide(square: Square, members: Vec<usize>, bodies: Bodies<'_>, depth: usize) -> Self {
        let count = members.len() as f32;
        let mut centroid = Vec2::ZERO;
        let mut reach = 0.0_f32;
        for &index in &members {
            centroid += bodies.positions[index];
            reach = reach.max(bodies.reach[index]);
        }
        if count > 0.0 {
            centroid /= count;
        }

        let mut cell = Self {
            square,
            centroid,
            count,
            reach,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.members {
            buckets[square.quadrant_of(bodies.positions[index])].push(index);
        }

        // Coincident points would otherwise recurse until MAX_DEPTH.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let child = Self::subdivide(square.quadrant(quadrant), bucket, bodies, depth + 1);
            cell.children[quadrant] = Some(Box::new(child));
        }
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_members(cell: &Cell, out: &mut Vec<usize>) {
        out.extend_from_slice(&cell.members);
        for child in cell.children() {
            collect_members(child, out);
        }
    }

    fn assert_reach_covers_members(cell: &Cell, reach: &[f32]) {
        let mut members = Vec::new();
        collect_members(cell, &mut members);
        let widest = members.iter().map(|&index| reach[index]).fold(0.0, f32::max);
        assert_eq!(cell.reach, widest);
        for child in cell.children() {
            assert_reach_covers_members(child, reach);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..100)
            .map(|index| vec2((index % 10) as f32 * 37.0, (index / 10) as f32 * 23.0))
            .collect::<Vec<_>>();
        let reach = (0..100).map(|index| index as f32).collect::<Vec<_>>();
        let root = Cell::build(Bodies {
            positions: &positions,
            reach: &reach,
        })
        .unwrap();

        let mut members = Vec::new();
        collect_members(&root, &mut members);
        members.sort_unstable();
        assert_eq!(members, (0..100).collect::<Vec<_>>());
        assert_eq!(root.count, 100.0);
        assert!(!root.is_leaf());
    }

    #[test]
    fn cells_carry_the_widest_reach_below_them() {
        let positions = (0..64)
            .map(|index| vec2((index % 8) as f32 * 50.0, (index / 8) as f32 * 50.0))
            .collect::<Vec<_>>();
        let mut reach = vec![10.0; 64];
        reach[9] = 120.0;
        reach[50] = 35.0;
        let root = Cell::build(Bodies {
            positions: &positions,
            reach: &reach,
        })
        .unwrap();

        assert_eq!(root.reach, 120.0);
        assert_reach_covers_members(&root, &reach);
        assert!(root.children().any(|child| child.reach == 10.0));
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 40];
        let root = Cell::build(Bodies {
            positions: &positions,
            reach: &[1.0; 40],
        })
        .unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.members.len(), 40);
        assert!(root.square.contains(vec2(5.0, 5.0)));
    }

    #[test]
    fn gap_between_distant_squares() {
        let a = Square {
            center: vec2(0.0, 0.0),
            half_extent: 1.0,
        };
        let b = Square {
            center: vec2(5.0, 0.0),
            half_extent: 1.0,
        };
        assert_eq!(a.gap_sq(b), 9.0);
        assert_eq!(a.gap_sq(a), 0.0);
        let empty = Bodies {
            positions: &[],
            reach: &[],
        };
        assert!(Cell::build(empty).is_none());
    }
}
