use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Handle of a rigid body inside a physics backend. Ids are dense and follow
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub usize);

/// Rigid motion of a body relative to the frame its aggregate was built in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyTransform {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BodyTransform {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    #[must_use]
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Maps a build-frame point to world space. Rotation is about `pivot`,
    /// normally the body's centroid.
    #[inline]
    #[must_use]
    pub fn apply(&self, point: DVec3, pivot: DVec3) -> DVec3 {
        pivot + self.rotation * (point - pivot) + self.translation
    }
}

/// World transforms of every body at one simulation frame, indexed by
/// [`BodyId`]. Produced by the physics backend, read-only to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub frame: u32,
    pub transforms: Vec<BodyTransform>,
}

impl SceneSnapshot {
    #[must_use]
    pub fn new(frame: u32, transforms: Vec<BodyTransform>) -> Self {
        Self { frame, transforms }
    }

    #[must_use]
    pub fn transform(&self, id: BodyId) -> Option<&BodyTransform> {
        self.transforms.get(id.0)
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.transforms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_is_noop() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(BodyTransform::IDENTITY.apply(p, DVec3::ZERO), p);
    }

    #[test]
    fn test_rotation_about_pivot() {
        let t = BodyTransform {
            translation: DVec3::new(0.0, 0.0, 1.0),
            rotation: DQuat::from_rotation_z(FRAC_PI_2),
        };
        let pivot = DVec3::new(1.0, 0.0, 0.0);
        let out = t.apply(DVec3::new(2.0, 0.0, 0.0), pivot);
        assert!((out - DVec3::new(1.0, 1.0, 1.0)).length() < 1e-12);
    }
}
