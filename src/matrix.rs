//! 3×3 affine transforms in homogeneous 2D coordinates.
//!
//! Matrices are column-major, matching both `glam` and the layout GLSL expects
//! for `mat3` uniforms. Camera math runs in `f64` because map coordinates are
//! in the millions and `f32` would lose sub-unit precision; matrices are
//! narrowed to `f32` only when uploaded to the GPU.

use glam::{DMat3, DVec2, DVec3};

/// Homogeneous point for a 2D position (`w = 1`).
pub fn point(x: f64, y: f64) -> DVec3 {
    DVec3::new(x, y, 1.0)
}

/// Applies `m` to a homogeneous vector.
pub fn transform(m: &DMat3, v: DVec3) -> DVec3 {
    *m * v
}

/// Applies `m` to a 2D point, returning the 2D result.
pub fn transform_point(m: &DMat3, p: DVec2) -> DVec2 {
    transform(m, point(p.x, p.y)).truncate()
}

/// Matrix product `a * b` (apply `b` first, then `a`).
pub fn multiply(a: &DMat3, b: &DMat3) -> DMat3 {
    *a * *b
}

/// Inverts `m`.
///
/// Returns `None` when the determinant is zero or not finite, which happens
/// for degenerate views such as a zero-sized viewport.
pub fn invert(m: &DMat3) -> Option<DMat3> {
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inverse = m.inverse();
    inverse.is_finite().then_some(inverse)
}

pub fn scale(sx: f64, sy: f64) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(sx, 0.0, 0.0),
        DVec3::new(0.0, sy, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    )
}

pub fn translate(tx: f64, ty: f64) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(tx, ty, 1.0),
    )
}

/// Column-major `f32` array suitable for `uniform_matrix_3_f32_slice`.
pub fn to_gl(m: &DMat3) -> [f32; 9] {
    m.as_mat3().to_cols_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_identity(m: DMat3, eps: f64) {
        assert!(
            m.abs_diff_eq(DMat3::IDENTITY, eps),
            "expected identity, got {:?}",
            m
        );
    }

    #[test]
    fn test_scale_and_translate_compose() {
        let m = multiply(&translate(10.0, -4.0), &scale(2.0, 3.0));
        let p = transform_point(&m, DVec2::new(1.0, 1.0));
        assert!((p - DVec2::new(12.0, -1.0)).length() < EPS);
    }

    #[test]
    fn test_multiply_order() {
        // Translate first, then scale
        let m = multiply(&scale(2.0, 2.0), &translate(1.0, 1.0));
        let p = transform_point(&m, DVec2::ZERO);
        assert!((p - DVec2::new(2.0, 2.0)).length() < EPS);
    }

    #[test]
    fn test_invert_round_trips_to_identity() {
        let samples = [
            multiply(&translate(3.0, 7.0), &scale(0.5, -2.0)),
            multiply(&scale(0.000553, -0.000553), &translate(-408328.09, -7202747.0)),
            translate(-1e6, 2e6),
            scale(1e-3, 1e3),
        ];
        for m in samples {
            let inv = invert(&m).expect("non-singular matrix must invert");
            assert_identity(multiply(&inv, &m), 1e-6);
            assert_identity(multiply(&m, &inv), 1e-6);
        }
    }

    #[test]
    fn test_invert_singular_is_none() {
        assert!(invert(&scale(0.0, 1.0)).is_none());
        assert!(invert(&DMat3::ZERO).is_none());
    }

    #[test]
    fn test_invert_non_finite_is_none() {
        assert!(invert(&scale(f64::INFINITY, 1.0)).is_none());
        assert!(invert(&scale(f64::NAN, 1.0)).is_none());
    }

    #[test]
    fn test_homogeneous_point_keeps_w() {
        let v = transform(&translate(5.0, 5.0), point(1.0, 2.0));
        assert_eq!(v, DVec3::new(6.0, 7.0, 1.0));
    }

    #[test]
    fn test_to_gl_is_column_major() {
        let cols = to_gl(&translate(4.0, 5.0));
        assert_eq!(cols, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 4.0, 5.0, 1.0]);
    }
}
