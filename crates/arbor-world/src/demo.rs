//! A small tree farm for the demo engine.
//!
//! Two plots on a grass floor: a single oak with an axe marker beside it
//! (and a shears marker above that one), and a 2x2 dark oak with its own
//! axe marker. Each plot's floor has a chest underneath so replant
//! conveyors have somewhere to drain.

use arbor_types::{ItemStack, MarkerId, Vec3, VoxelPos, WorldId};

use crate::error::WorldError;
use crate::memory::MemoryWorld;

/// Floor height of the demo farm.
const FLOOR_Y: i32 = 63;

/// Handles to the interesting parts of the demo farm.
#[derive(Debug, Clone)]
pub struct DemoFarm {
    /// Base of the oak trunk.
    pub oak_base: VoxelPos,
    /// Axe marker next to the oak.
    pub oak_marker: MarkerId,
    /// Shears marker stacked above the oak's axe marker.
    pub shears_marker: MarkerId,
    /// North-west trunk cell of the dark oak.
    pub dark_oak_base: VoxelPos,
    /// Axe marker next to the dark oak.
    pub dark_oak_marker: MarkerId,
}

/// Build the demo farm in a fresh [`MemoryWorld`].
pub fn build_demo_farm(id: WorldId) -> Result<(MemoryWorld, DemoFarm), WorldError> {
    let mut world = MemoryWorld::new(id);
    let trunk_top = FLOOR_Y + 5;

    world.fill(
        VoxelPos::new(-4, FLOOR_Y - 2, -4),
        VoxelPos::new(14, FLOOR_Y - 2, 5),
        "stone",
    )?;
    world.fill(
        VoxelPos::new(-4, FLOOR_Y, -4),
        VoxelPos::new(14, FLOOR_Y, 5),
        "grass_block",
    )?;

    // Oak: a five-high trunk with a leaf cap.
    let oak_base = VoxelPos::new(0, FLOOR_Y + 1, 0);
    world.place(oak_base.down().down(), "chest")?;
    world.fill(
        VoxelPos::new(-2, trunk_top - 1, -2),
        VoxelPos::new(2, trunk_top + 1, 2),
        "oak_leaves",
    )?;
    world.fill(oak_base, VoxelPos::new(0, trunk_top, 0), "oak_log")?;

    let support = VoxelPos::new(1, FLOOR_Y + 1, 0);
    world.place(support, "glass")?;
    world.place(support.up(), "glass")?;
    let oak_marker = world.add_marker(
        support,
        Vec3::new(1.97, f64::from(FLOOR_Y) + 1.5, 0.5),
        ItemStack::vanilla("iron_axe"),
    );
    let shears_marker = world.add_marker(
        support.up(),
        Vec3::new(1.97, f64::from(FLOOR_Y) + 2.5, 0.5),
        ItemStack::vanilla("shears"),
    );

    // Dark oak: a 2x2 trunk, four high.
    let dark_oak_base = VoxelPos::new(8, FLOOR_Y + 1, 0);
    for (dx, dz) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        world.place(dark_oak_base.offset(dx, -2, dz), "chest")?;
    }
    world.fill(
        VoxelPos::new(6, FLOOR_Y + 4, -2),
        VoxelPos::new(11, FLOOR_Y + 5, 3),
        "dark_oak_leaves",
    )?;
    world.fill(
        dark_oak_base,
        dark_oak_base.offset(1, 3, 1),
        "dark_oak_log",
    )?;

    let dark_support = VoxelPos::new(10, FLOOR_Y + 1, 0);
    world.place(dark_support, "glass")?;
    let dark_oak_marker = world.add_marker(
        dark_support,
        Vec3::new(10.03, f64::from(FLOOR_Y) + 1.5, 0.5),
        ItemStack::vanilla("diamond_axe"),
    );

    Ok((
        world,
        DemoFarm {
            oak_base,
            oak_marker,
            shears_marker,
            dark_oak_base,
            dark_oak_marker,
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::WorldHost;
    use arbor_types::MaterialClass;

    #[test]
    fn demo_farm_has_both_trees_and_three_markers() {
        let (world, farm) = build_demo_farm(WorldId::new("minecraft:overworld")).unwrap();
        assert_eq!(world.classify(farm.oak_base), MaterialClass::Trunk);
        assert_eq!(world.classify(farm.dark_oak_base), MaterialClass::Trunk);
        assert_eq!(
            world.classify(farm.dark_oak_base.offset(1, 0, 1)),
            MaterialClass::Trunk
        );
        assert_eq!(world.alive_markers().len(), 3);
    }

    #[test]
    fn floor_under_the_trees_is_soil_above_a_chest() {
        let (world, farm) = build_demo_farm(WorldId::new("minecraft:overworld")).unwrap();
        assert!(world.container_contents(farm.oak_base.offset(0, -2, 0)).is_some());
        assert_eq!(
            world.block_state(farm.oak_base.down()).block.path(),
            "grass_block"
        );
    }
}
