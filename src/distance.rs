use bevy::prelude::*;

/// Distance calculation algorithms on the tile lattice
pub enum DistanceAlg {
    /// No diagonal movement: |x2-x1| + |y2-y1|
    Manhattan,
}

impl DistanceAlg {
    pub fn distance2d(&self, p1: IVec2, p2: IVec2) -> i32 {
        let delta = (p2 - p1).abs();

        match self {
            DistanceAlg::Manhattan => delta.x + delta.y,
        }
    }
}
