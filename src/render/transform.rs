//! Sample-to-transform conversion: axis remap and rotation matrix.

use glam::{Mat3, Quat, Vec3};
use std::fmt;

use crate::telemetry::OrientationSample;

/// Maps sensor axes onto the renderer's right-handed, Y-up axes.
///
/// Renderer axis `i` is sensor axis `order[i]` multiplied by `signs[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRemap {
    order: [usize; 3],
    signs: [f32; 3],
}

impl AxisRemap {
    pub const IDENTITY: AxisRemap = AxisRemap {
        order: [0, 1, 2],
        signs: [1.0, 1.0, 1.0],
    };

    /// The sensor's Z is up; the renderer's Y is up.
    pub const SWAP_YZ: AxisRemap = AxisRemap {
        order: [0, 2, 1],
        signs: [1.0, 1.0, 1.0],
    };

    /// Build a remap. `order` must be a permutation of `0..3`.
    pub fn new(order: [usize; 3], flip: [bool; 3]) -> Option<Self> {
        let mut seen = [false; 3];
        for &axis in &order {
            if axis > 2 || seen[axis] {
                return None;
            }
            seen[axis] = true;
        }
        let signs = flip.map(|f| if f { -1.0 } else { 1.0 });
        Some(Self { order, signs })
    }

    /// Parse a remap such as `"x,z,y"` or `"-x,z,y"`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!(
                "expected three comma-separated axes like \"x,z,y\", got '{}'",
                spec
            ));
        }

        let mut order = [0usize; 3];
        let mut flip = [false; 3];
        for (i, part) in parts.iter().enumerate() {
            let (negated, name) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, *part),
            };
            order[i] = match name {
                "x" | "X" => 0,
                "y" | "Y" => 1,
                "z" | "Z" => 2,
                other => return Err(format!("unknown axis '{}'", other)),
            };
            flip[i] = negated;
        }

        Self::new(order, flip).ok_or_else(|| format!("axes repeat in '{}'", spec))
    }

    /// Remap a vector from sensor axes to renderer axes.
    pub fn apply(&self, v: Vec3) -> Vec3 {
        let src = v.to_array();
        Vec3::new(
            self.signs[0] * src[self.order[0]],
            self.signs[1] * src[self.order[1]],
            self.signs[2] * src[self.order[2]],
        )
    }

    /// Remap the vector part of a quaternion, leaving `w` and the overall
    /// magnitude alone.
    pub fn apply_quat(&self, q: Quat) -> Quat {
        let v = self.apply(Vec3::new(q.x, q.y, q.z));
        Quat::from_xyzw(v.x, v.y, v.z, q.w)
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::SWAP_YZ
    }
}

impl fmt::Display for AxisRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 3] = ["x", "y", "z"];
        for i in 0..3 {
            if i > 0 {
                f.write_str(",")?;
            }
            if self.signs[i] < 0.0 {
                f.write_str("-")?;
            }
            f.write_str(NAMES[self.order[i]])?;
        }
        Ok(())
    }
}

/// Rotation matrix for `q` without normalizing it first.
///
/// For a unit quaternion this is the usual rotation; any other magnitude
/// carries its scale and skew straight into the matrix.
pub fn rotation_matrix(q: Quat) -> Mat3 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    Mat3::from_cols(
        Vec3::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy)),
        Vec3::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx)),
        Vec3::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy)),
    )
}

/// Per-frame model transform for the rendered solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub rotation: Mat3,
    pub position: Vec3,
    pub scale: f32,
}

impl RenderTransform {
    /// Build the transform for one snapshot.
    pub fn from_sample(sample: &OrientationSample, remap: AxisRemap, scale: f32) -> Self {
        let q = remap.apply_quat(sample.to_quat());
        Self {
            rotation: rotation_matrix(q),
            position: Vec3::ZERO,
            scale,
        }
    }

    /// Map a model-space point to world space.
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.position + self.rotation * (p * self.scale)
    }
}
