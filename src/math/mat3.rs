use std::ops::{Index, IndexMut};

/// A 3x3 matrix in column-major order, used for normal matrices.
///
/// Elements 0-2, 3-5 and 6-8 are the three columns; they line up with
/// elements 0-2, 4-6 and 8-10 of a [`super::Mat4`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat3 {
    m: [f32; 9],
}

impl Mat3 {
    pub const fn from_array(m: [f32; 9]) -> Self {
        Self { m }
    }

    pub const fn zero() -> Self {
        Self { m: [0.0; 9] }
    }

    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self::from_array([
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ])
    }

    pub fn as_array(&self) -> &[f32; 9] {
        &self.m
    }

    /// Flips the matrix over its diagonal in place.
    pub fn transpose(&mut self) -> &mut Self {
        self.m.swap(1, 3);
        self.m.swap(2, 6);
        self.m.swap(5, 7);
        self
    }

    /// Writes the transpose into `dest`, leaving `self` unchanged.
    pub fn transpose_into<'a>(&self, dest: &'a mut Mat3) -> &'a mut Mat3 {
        let m = &self.m;
        dest.m = [m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]];
        dest
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for Mat3 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.m[i]
    }
}

impl IndexMut<usize> for Mat3 {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.m[i]
    }
}

impl From<cgmath::Matrix3<f32>> for Mat3 {
    fn from(matrix: cgmath::Matrix3<f32>) -> Self {
        let cols: [[f32; 3]; 3] = matrix.into();
        let mut m = [0.0; 9];
        for (c, col) in cols.iter().enumerate() {
            m[c * 3..c * 3 + 3].copy_from_slice(col);
        }
        Mat3::from_array(m)
    }
}

impl From<Mat3> for cgmath::Matrix3<f32> {
    fn from(matrix: Mat3) -> Self {
        let m = matrix.m;
        cgmath::Matrix3::new(m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_mat3(rng: &mut impl Rng) -> Mat3 {
        let mut m = [0.0; 9];
        for v in m.iter_mut() {
            *v = rng.random_range(-10.0..10.0);
        }
        Mat3::from_array(m)
    }

    #[test]
    fn test_transpose_is_an_involution() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let original = random_mat3(&mut rng);
            let mut m = original;
            m.transpose().transpose();
            assert_eq!(m, original);
        }
    }

    #[test]
    fn test_transpose_in_place_matches_copy() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let mut dest = Mat3::zero();
        m.transpose_into(&mut dest);
        assert_eq!(
            dest.as_array(),
            &[1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]
        );
        // source untouched
        assert_eq!(m[1], 2.0);

        let mut in_place = m;
        in_place.transpose();
        assert_eq!(in_place, dest);
    }

    #[test]
    fn test_matches_cgmath_layout() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let c: cgmath::Matrix3<f32> = m.into();
        assert_eq!(c.x.y, 2.0);
        assert_eq!(c.y.x, 4.0);
        assert_eq!(Mat3::from(c), m);
    }
}
