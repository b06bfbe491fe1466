//! Grid positions and continuous geometry.
//!
//! [`VoxelPos`] is the integer block coordinate used as a map key
//! everywhere. [`Vec3`] and [`Aabb`] describe entity positions and the
//! query regions used to find markers and loose items.
//!
//! # Packed layout
//!
//! A position packs into one `i64` the same way the host stores block
//! positions: 26 bits of X in the top bits, 26 bits of Z in the middle,
//! 12 bits of Y at the bottom. Each field is two's-complement and is
//! sign-extended on unpack.

use serde::{Deserialize, Serialize};

const BITS_X: u32 = 26;
const BITS_Z: u32 = 26;
const BITS_Y: u32 = 12;
const SHIFT_Z: u32 = BITS_Y;
const SHIFT_X: u32 = BITS_Y + BITS_Z;
const MASK_X: i64 = (1_i64 << BITS_X) - 1;
const MASK_Z: i64 = (1_i64 << BITS_Z) - 1;
const MASK_Y: i64 = (1_i64 << BITS_Y) - 1;

/// An integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl VoxelPos {
    /// Create a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Offset by the given deltas. Saturates at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// The position directly above.
    pub const fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The position directly below.
    pub const fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The centre of the block as a continuous point.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Pack into a single `i64` (see the module docs for the layout).
    pub fn pack(self) -> i64 {
        let x = (i64::from(self.x) & MASK_X).wrapping_shl(SHIFT_X);
        let z = (i64::from(self.z) & MASK_Z).wrapping_shl(SHIFT_Z);
        let y = i64::from(self.y) & MASK_Y;
        x | z | y
    }

    /// Unpack a value produced by [`VoxelPos::pack`].
    pub fn unpack(packed: i64) -> Self {
        let x = packed.wrapping_shr(SHIFT_X);
        let z = packed.wrapping_shl(64 - SHIFT_X).wrapping_shr(64 - BITS_Z);
        let y = packed.wrapping_shl(64 - BITS_Y).wrapping_shr(64 - BITS_Y);
        Self {
            x: narrow(x),
            y: narrow(y),
            z: narrow(z),
        }
    }
}

/// Every unpacked field is at most 26 bits wide, so it always fits.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or_default()
}

impl core::fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A continuous point (entity positions, velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// North-south component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance to `other`.
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz))
    }
}

/// An axis-aligned box with `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Lower corner.
    pub min: Vec3,
    /// Upper corner.
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from two corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// The unit box occupied by a block.
    pub fn block(pos: VoxelPos) -> Self {
        let min = Vec3::new(f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
        let max = Vec3::new(min.x + 1.0, min.y + 1.0, min.z + 1.0);
        Self { min, max }
    }

    /// Grow the box by `amount` on every side.
    pub fn expand(self, amount: f64) -> Self {
        Self {
            min: Vec3::new(self.min.x - amount, self.min.y - amount, self.min.z - amount),
            max: Vec3::new(self.max.x + amount, self.max.y + amount, self.max.z + amount),
        }
    }

    /// Whether the two boxes overlap with non-zero volume.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Whether `point` lies inside (lower bound inclusive, upper exclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }
}
