//! Bounded flood fill over the voxel grid.
//!
//! Trunk and canopy discovery are both breadth-first searches over the 26
//! neighbours of each cell, limited by a horizontal radius around a centre,
//! a vertical band, and a cap on the result size. Hitting the cap yields a
//! valid but incomplete set.
//!
//! Results are [`BTreeSet`]s so iteration (and therefore block removal and
//! drop order) is deterministic.

use std::collections::{BTreeSet, VecDeque};

use arbor_types::{MaterialClass, Marker, VoxelPos};
use arbor_world::WorldHost;

use crate::config::HarvestConfig;

/// Lowest accepted base height relative to the marker's support block.
const BASE_DY_MIN: i32 = -1;

/// Highest accepted base height relative to the marker's support block.
const BASE_DY_MAX: i32 = 2;

/// Limits of one flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Maximum |dx| and |dz| from the centre.
    pub radius: i32,
    /// How far below the centre the search may go.
    pub below: i32,
    /// How far above the centre the search may go.
    pub above: i32,
    /// Maximum result size.
    pub cap: usize,
}

impl SearchBounds {
    /// Bounds of the trunk search (and of the tree base scan).
    pub const fn trunk(config: &HarvestConfig) -> Self {
        Self {
            radius: config.horizontal_radius,
            below: config.vertical_below,
            above: config.vertical_above,
            cap: config.max_trunk,
        }
    }

    /// Bounds of the canopy search: wider and taller than the trunk's.
    pub const fn canopy(config: &HarvestConfig) -> Self {
        Self {
            radius: config.horizontal_radius.saturating_add(config.canopy_radius_bonus),
            below: config.vertical_below,
            above: config.vertical_above.saturating_add(config.canopy_above_bonus),
            cap: config.max_canopy,
        }
    }

    /// Whether `pos` lies inside these bounds around `centre`.
    pub const fn admits(&self, centre: VoxelPos, pos: VoxelPos) -> bool {
        let reach = self.radius.unsigned_abs();
        pos.x.abs_diff(centre.x) <= reach
            && pos.z.abs_diff(centre.z) <= reach
            && pos.y >= centre.y.saturating_sub(self.below)
            && pos.y <= centre.y.saturating_add(self.above)
    }
}

/// The blocks one harvest removes. Built by [`collect`]: the two sets are
/// disjoint and each is within its own cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSet {
    /// Connected trunk blocks, including the base.
    pub trunk: BTreeSet<VoxelPos>,
    /// Canopy blocks reachable from the trunk.
    pub canopy: BTreeSet<VoxelPos>,
}

impl HarvestSet {
    /// Total blocks in both sets.
    pub fn len(&self) -> usize {
        self.trunk.len().saturating_add(self.canopy.len())
    }

    /// Whether there is nothing to harvest. An empty trunk means no tree.
    pub fn is_empty(&self) -> bool {
        self.trunk.is_empty()
    }
}

/// Collect the trunk at `base`, then the canopy around it.
///
/// An empty trunk yields an empty set without searching for canopy.
pub fn collect<W>(world: &W, base: VoxelPos, config: &HarvestConfig) -> HarvestSet
where
    W: WorldHost + ?Sized,
{
    let trunk = collect_trunk(world, base, &SearchBounds::trunk(config));
    if trunk.is_empty() {
        return HarvestSet::default();
    }
    let canopy = collect_canopy(world, &trunk, base, &SearchBounds::canopy(config));
    HarvestSet { trunk, canopy }
}

/// The 26 cells around `pos`, in dx, dy, dz order.
fn neighbours(pos: VoxelPos) -> impl Iterator<Item = VoxelPos> {
    (-1..=1)
        .flat_map(|dx| (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz))))
        .filter(|&offset| offset != (0, 0, 0))
        .map(move |(dx, dy, dz)| pos.offset(dx, dy, dz))
}

/// Collect the trunk connected to `base`.
///
/// The base itself must be trunk material; otherwise the result is empty.
pub fn collect_trunk<W>(world: &W, base: VoxelPos, bounds: &SearchBounds) -> BTreeSet<VoxelPos>
where
    W: WorldHost + ?Sized,
{
    let mut collected = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([base]);

    while collected.len() < bounds.cap {
        let Some(current) = queue.pop_front() else {
            break;
        };
        if !visited.insert(current) || !bounds.admits(base, current) {
            continue;
        }
        if world.classify(current) != MaterialClass::Trunk {
            continue;
        }
        collected.insert(current);

        for neighbour in neighbours(current) {
            if visited.contains(&neighbour) || !bounds.admits(base, neighbour) {
                continue;
            }
            if world.classify(neighbour) == MaterialClass::Trunk {
                queue.push_back(neighbour);
            }
        }
    }
    collected
}

/// Collect the canopy around a trunk.
///
/// The whole trunk seeds the search and counts as already visited, so no
/// trunk block can appear in the result. Bounds are centred on `base`.
pub fn collect_canopy<W>(
    world: &W,
    trunk: &BTreeSet<VoxelPos>,
    base: VoxelPos,
    bounds: &SearchBounds,
) -> BTreeSet<VoxelPos>
where
    W: WorldHost + ?Sized,
{
    let mut collected = BTreeSet::new();
    let mut seen = trunk.clone();
    let mut queue: VecDeque<VoxelPos> = trunk.iter().copied().collect();

    'search: while let Some(current) = queue.pop_front() {
        for neighbour in neighbours(current) {
            if collected.len() >= bounds.cap {
                break 'search;
            }
            if !seen.insert(neighbour) || !bounds.admits(base, neighbour) {
                continue;
            }
            if world.classify(neighbour) != MaterialClass::Canopy {
                continue;
            }
            collected.insert(neighbour);
            queue.push_back(neighbour);
        }
    }
    collected
}

/// Find the trunk block a marker is attached next to.
///
/// Scans the box around the marker's support block (x fastest, then y,
/// then z) for trunk blocks and keeps the one whose centre is nearest the
/// marker; the first one seen wins ties. The winner must be horizontally
/// orthogonal to the support block and between one below and two above it.
pub fn find_tree_base<W>(world: &W, marker: &Marker, bounds: &SearchBounds) -> Option<VoxelPos>
where
    W: WorldHost + ?Sized,
{
    let support = marker.support;
    let min = support.offset(
        bounds.radius.saturating_neg(),
        bounds.below.saturating_neg(),
        bounds.radius.saturating_neg(),
    );
    let max = support.offset(bounds.radius, bounds.above, bounds.radius);

    let mut closest: Option<(VoxelPos, f64)> = None;
    for z in min.z..=max.z {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let pos = VoxelPos::new(x, y, z);
                if world.classify(pos) != MaterialClass::Trunk {
                    continue;
                }
                let distance = marker.position.distance_sq(pos.center());
                if closest.is_none_or(|(_, best)| distance < best) {
                    closest = Some((pos, distance));
                }
            }
        }
    }

    let (base, _) = closest?;
    let horizontal = base
        .x
        .abs_diff(support.x)
        .saturating_add(base.z.abs_diff(support.z));
    if horizontal != 1 {
        return None;
    }
    let dy = base.y.checked_sub(support.y)?;
    (BASE_DY_MIN..=BASE_DY_MAX).contains(&dy).then_some(base)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use arbor_types::{ItemStack, Vec3, WorldId};
    use arbor_world::MemoryWorld;

    use super::*;

    fn world() -> MemoryWorld {
        MemoryWorld::new(WorldId::new("minecraft:overworld"))
    }

    fn bounds() -> SearchBounds {
        SearchBounds::trunk(&HarvestConfig::default())
    }

    fn marker_at(world: &mut MemoryWorld, support: VoxelPos, position: Vec3) -> Marker {
        let id = world.add_marker(support, position, ItemStack::vanilla("iron_axe"));
        world
            .alive_markers()
            .into_iter()
            .find(|m| m.id == id)
            .unwrap()
    }

    #[test]
    fn trunk_search_follows_diagonals() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base, "oak_log").unwrap();
        w.place(VoxelPos::new(1, 65, 1), "oak_log").unwrap();
        w.place(VoxelPos::new(2, 66, 1), "birch_log").unwrap();
        w.place(VoxelPos::new(4, 64, 0), "oak_log").unwrap();

        let trunk = collect_trunk(&w, base, &bounds());
        assert_eq!(trunk.len(), 3);
        assert!(!trunk.contains(&VoxelPos::new(4, 64, 0)));
    }

    #[test]
    fn trunk_search_needs_a_trunk_seed() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base, "oak_leaves").unwrap();
        w.place(base.up(), "oak_log").unwrap();
        assert!(collect_trunk(&w, base, &bounds()).is_empty());
    }

    #[test]
    fn trunk_search_respects_the_cap() {
        let mut w = world();
        w.fill(VoxelPos::new(-2, 64, -2), VoxelPos::new(2, 70, 2), "oak_log")
            .unwrap();
        let capped = SearchBounds { cap: 10, ..bounds() };
        let trunk = collect_trunk(&w, VoxelPos::new(0, 64, 0), &capped);
        assert_eq!(trunk.len(), 10);
    }

    #[test]
    fn trunk_search_stays_inside_radius_and_band() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.fill(VoxelPos::new(0, 64, 0), VoxelPos::new(9, 64, 0), "oak_log")
            .unwrap();
        w.fill(VoxelPos::new(0, 65, 0), VoxelPos::new(0, 100, 0), "oak_log")
            .unwrap();
        let trunk = collect_trunk(&w, base, &bounds());
        assert!(trunk.iter().all(|p| bounds().admits(base, *p)));
        assert!(trunk.contains(&VoxelPos::new(6, 64, 0)));
        assert!(!trunk.contains(&VoxelPos::new(7, 64, 0)));
        assert!(trunk.contains(&VoxelPos::new(0, 96, 0)));
        assert!(!trunk.contains(&VoxelPos::new(0, 97, 0)));
    }

    #[test]
    fn canopy_excludes_trunk_and_reaches_wider() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.fill(base, VoxelPos::new(0, 68, 0), "oak_log").unwrap();
        w.fill(VoxelPos::new(1, 68, 0), VoxelPos::new(8, 68, 0), "oak_leaves")
            .unwrap();
        w.place(VoxelPos::new(9, 68, 0), "oak_leaves").unwrap();

        let config = HarvestConfig::default();
        let trunk = collect_trunk(&w, base, &SearchBounds::trunk(&config));
        let canopy = collect_canopy(&w, &trunk, base, &SearchBounds::canopy(&config));
        assert_eq!(canopy.len(), 8);
        assert!(canopy.is_disjoint(&trunk));
        assert!(!canopy.contains(&VoxelPos::new(9, 68, 0)));
    }

    #[test]
    fn canopy_never_exceeds_its_cap() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base, "oak_log").unwrap();
        w.fill(VoxelPos::new(-3, 65, -3), VoxelPos::new(3, 67, 3), "oak_leaves")
            .unwrap();
        let trunk = collect_trunk(&w, base, &bounds());
        let capped = SearchBounds {
            cap: 5,
            ..SearchBounds::canopy(&HarvestConfig::default())
        };
        assert_eq!(collect_canopy(&w, &trunk, base, &capped).len(), 5);
    }

    #[test]
    fn base_must_be_orthogonally_adjacent() {
        let mut w = world();
        let support = VoxelPos::new(0, 64, 0);
        w.place(VoxelPos::new(1, 64, 1), "oak_log").unwrap();
        let marker = marker_at(&mut w, support, Vec3::new(0.97, 64.5, 0.97));
        assert_eq!(find_tree_base(&w, &marker, &bounds()), None);
    }

    #[test]
    fn base_must_sit_in_the_vertical_band() {
        let mut w = world();
        let support = VoxelPos::new(0, 64, 0);
        w.place(VoxelPos::new(1, 67, 0), "oak_log").unwrap();
        let marker = marker_at(&mut w, support, Vec3::new(0.97, 64.5, 0.5));
        assert_eq!(find_tree_base(&w, &marker, &bounds()), None);

        w.place(VoxelPos::new(1, 66, 0), "oak_log").unwrap();
        assert_eq!(
            find_tree_base(&w, &marker, &bounds()),
            Some(VoxelPos::new(1, 66, 0))
        );
    }

    #[test]
    fn equidistant_candidates_resolve_in_scan_order() {
        let support = VoxelPos::new(0, 64, 0);
        let centre = Vec3::new(0.5, 64.5, 0.5);

        let mut w = world();
        w.place(VoxelPos::new(1, 64, 0), "oak_log").unwrap();
        w.place(VoxelPos::new(-1, 64, 0), "oak_log").unwrap();
        let marker = marker_at(&mut w, support, centre);
        for _ in 0..3 {
            assert_eq!(
                find_tree_base(&w, &marker, &bounds()),
                Some(VoxelPos::new(-1, 64, 0))
            );
        }

        let mut w = world();
        w.place(VoxelPos::new(0, 64, 1), "oak_log").unwrap();
        w.place(VoxelPos::new(1, 64, 0), "oak_log").unwrap();
        let marker = marker_at(&mut w, support, centre);
        assert_eq!(
            find_tree_base(&w, &marker, &bounds()),
            Some(VoxelPos::new(1, 64, 0))
        );
    }

    #[test]
    fn collect_splits_a_tree_into_disjoint_capped_sets() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.fill(base, VoxelPos::new(0, 67, 0), "oak_log").unwrap();
        w.fill(VoxelPos::new(-2, 66, -2), VoxelPos::new(2, 68, 2), "oak_leaves")
            .unwrap();
        w.fill(VoxelPos::new(0, 66, 0), VoxelPos::new(0, 67, 0), "oak_log")
            .unwrap();

        let config = HarvestConfig::default();
        let set = collect(&w, base, &config);
        assert_eq!(set.trunk.len(), 4);
        assert_eq!(set.canopy.len(), 73);
        assert!(set.trunk.is_disjoint(&set.canopy));
        assert_eq!(set.len(), 77);

        let capped = HarvestConfig {
            max_trunk: 2,
            max_canopy: 10,
            ..HarvestConfig::default()
        };
        let set = collect(&w, base, &capped);
        assert_eq!((set.trunk.len(), set.canopy.len()), (2, 10));
        assert!(set.trunk.is_disjoint(&set.canopy));
    }

    #[test]
    fn collect_without_a_trunk_is_empty() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base.up(), "oak_leaves").unwrap();
        let set = collect(&w, base, &HarvestConfig::default());
        assert!(set.is_empty());
        assert!(set.canopy.is_empty());
    }
}
