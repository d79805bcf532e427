//! Vector helpers layered over [`glam::DVec2`].
//!
//! Addition, subtraction, scalar multiplication and `length()` come straight
//! from glam's operators; this trait only adds what glam leaves out.

use crate::{Fp, Vec2};

pub trait Vector: Sized {
    /// Returns the unit vector, or the zero vector unchanged if `self` has no length.
    fn normalize_safe(self) -> Self;
    /// Rotates about the origin by `phi` radians.
    fn rotate_by(self, phi: Fp) -> Self;
    /// Rotates about `pivot` by `phi` radians.
    fn rotate_around(self, phi: Fp, pivot: Self) -> Self;
    /// Returns `atan2` of the offset from `other` to `self`.
    fn angle_to_point(self, other: Self) -> Fp;
}

impl Vector for Vec2 {
    #[inline]
    fn normalize_safe(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            self / len
        } else {
            self
        }
    }

    #[inline]
    fn rotate_by(self, phi: Fp) -> Vec2 {
        let (s, c) = phi.sin_cos();
        Vec2::new(c * self.x - s * self.y, s * self.x + c * self.y)
    }

    #[inline]
    fn rotate_around(self, phi: Fp, pivot: Vec2) -> Vec2 {
        (self - pivot).rotate_by(phi) + pivot
    }

    #[inline]
    fn angle_to_point(self, other: Vec2) -> Fp {
        Fp::atan2(self.y - other.y, self.x - other.x)
    }
}
