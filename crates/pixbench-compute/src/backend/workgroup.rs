//! Work-group geometry for 2D kernel launches.
//!
//! The local shape is derived from the device's maximum invocation count:
//! `(floor(sqrt(max)), max / floor(sqrt(max)), 1)`, clamped to the per-axis
//! limits. The global shape rounds the image up to whole work-groups, so the
//! kernel must bounds-check.

use std::collections::HashMap;

/// Device limits the geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkGroupLimits {
    /// Maximum invocations in one work-group.
    pub max_invocations: u32,
    /// Per-axis work-group size limits.
    pub max_size: [u32; 3],
    /// Maximum work-groups per dispatch dimension.
    pub max_groups_per_dim: u32,
}

impl WorkGroupLimits {
    /// Limits with every per-axis cap equal to `max_invocations`.
    pub fn uniform(max_invocations: u32) -> Self {
        Self {
            max_invocations,
            max_size: [max_invocations; 3],
            max_groups_per_dim: u32::MAX,
        }
    }
}

#[cfg(feature = "wgpu")]
impl From<&wgpu::Limits> for WorkGroupLimits {
    fn from(limits: &wgpu::Limits) -> Self {
        Self {
            max_invocations: limits.max_compute_invocations_per_workgroup,
            max_size: [
                limits.max_compute_workgroup_size_x,
                limits.max_compute_workgroup_size_y,
                limits.max_compute_workgroup_size_z,
            ],
            max_groups_per_dim: limits.max_compute_workgroups_per_dimension,
        }
    }
}

/// Local and global launch shape for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkGroupShape {
    /// Invocations per work-group on each axis.
    pub local: [u32; 3],
    /// Total invocations on each axis, a multiple of `local`.
    pub global: [u32; 3],
}

impl WorkGroupShape {
    /// Shape covering a `width` x `height` image.
    pub fn for_image(width: u32, height: u32, limits: &WorkGroupLimits) -> Self {
        let max = limits.max_invocations.max(1);
        let side = max.isqrt().max(1);
        let local = [
            side.min(limits.max_size[0]).max(1),
            (max / side).min(limits.max_size[1]).max(1),
            1,
        ];
        let global = [
            width.div_ceil(local[0]) * local[0],
            height.div_ceil(local[1]) * local[1],
            1,
        ];
        Self { local, global }
    }

    /// Number of work-groups to dispatch on each axis.
    pub fn groups(&self) -> [u32; 3] {
        [
            self.global[0] / self.local[0],
            self.global[1] / self.local[1],
            self.global[2] / self.local[2],
        ]
    }

    /// Values for the kernel's `WG_X` / `WG_Y` override constants.
    pub fn override_constants(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("WG_X".to_string(), self.local[0] as f64),
            ("WG_Y".to_string(), self.local[1] as f64),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_local_from_256() {
        let shape = WorkGroupShape::for_image(100, 100, &WorkGroupLimits::uniform(256));
        assert_eq!(shape.local, [16, 16, 1]);
        assert_eq!(shape.global, [112, 112, 1]);
        assert_eq!(shape.groups(), [7, 7, 1]);
    }

    #[test]
    fn test_non_square_max() {
        // floor(sqrt(1024)) = 32; 1024 / 32 = 32
        let shape = WorkGroupShape::for_image(33, 1, &WorkGroupLimits::uniform(1024));
        assert_eq!(shape.local, [32, 32, 1]);
        assert_eq!(shape.global, [64, 32, 1]);

        // floor(sqrt(128)) = 11; 128 / 11 = 11
        let shape = WorkGroupShape::for_image(11, 12, &WorkGroupLimits::uniform(128));
        assert_eq!(shape.local, [11, 11, 1]);
        assert_eq!(shape.global, [11, 22, 1]);
    }

    #[test]
    fn test_axis_limits_clamp() {
        let limits = WorkGroupLimits {
            max_invocations: 256,
            max_size: [256, 8, 64],
            max_groups_per_dim: 65535,
        };
        let shape = WorkGroupShape::for_image(20, 20, &limits);
        assert_eq!(shape.local, [16, 8, 1]);
        assert_eq!(shape.global, [32, 24, 1]);
    }

    #[test]
    fn test_override_constants() {
        let shape = WorkGroupShape::for_image(1, 1, &WorkGroupLimits::uniform(64));
        let constants = shape.override_constants();
        assert_eq!(constants["WG_X"], 8.0);
        assert_eq!(constants["WG_Y"], 8.0);
    }
}
