//! Decoded orientation samples.

use glam::{Quat, Vec3};
use std::fmt;

use super::grammar::Grammar;

/// One decoded pose reading.
///
/// The shape follows the firmware grammar in use; a single run only ever
/// produces one of the two variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationSample {
    /// Quaternion as emitted by the firmware. Not normalized.
    Quaternion { w: f32, x: f32, y: f32, z: f32 },
    /// Pitch/roll style angle pair in degrees.
    Euler { x: f32, y: f32 },
}

impl OrientationSample {
    /// The value held before the first successful decode.
    pub fn initial(grammar: Grammar) -> Self {
        match grammar {
            Grammar::Quaternion => OrientationSample::Quaternion {
                w: 1.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            Grammar::Euler => OrientationSample::Euler { x: 0.0, y: 0.0 },
        }
    }

    /// Grammar this sample belongs to.
    pub fn grammar(&self) -> Grammar {
        match self {
            OrientationSample::Quaternion { .. } => Grammar::Quaternion,
            OrientationSample::Euler { .. } => Grammar::Euler,
        }
    }

    /// Convert to the common quaternion form, in sensor axes.
    ///
    /// Quaternion readings pass through with their original magnitude.
    /// Angle pairs become an axis-angle rotation whose axis is the normalized
    /// `(-x, -y, 0)` vector and whose angle is that vector's length in degrees.
    pub fn to_quat(&self) -> Quat {
        match *self {
            OrientationSample::Quaternion { w, x, y, z } => Quat::from_xyzw(x, y, z, w),
            OrientationSample::Euler { x, y } => {
                let v = Vec3::new(-x, -y, 0.0);
                let degrees = v.length();
                if degrees <= f32::EPSILON || !degrees.is_finite() {
                    return Quat::IDENTITY;
                }
                Quat::from_axis_angle(v / degrees, degrees.to_radians())
            }
        }
    }

    /// Euclidean norm of the quaternion reading; `None` for angle pairs.
    pub fn quaternion_norm(&self) -> Option<f32> {
        match *self {
            OrientationSample::Quaternion { w, x, y, z } => {
                Some((w * w + x * x + y * y + z * z).sqrt())
            }
            OrientationSample::Euler { .. } => None,
        }
    }
}

impl fmt::Display for OrientationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationSample::Quaternion { w, x, y, z } => {
                write!(f, "w = {:.4}  x = {:.4}  y = {:.4}  z = {:.4}", w, x, y, z)
            }
            OrientationSample::Euler { x, y } => write!(f, "x = {}\ty = {}", x, y),
        }
    }
}
