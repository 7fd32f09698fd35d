use std::ops::{Index, IndexMut};

use super::{Mat3, MathError, Vec3};

/// A 4x4 matrix in column-major order.
///
/// Index `c * 4 + r` addresses column `c`, row `r`; `m[12..15]` is the
/// translation column. Transforms right-multiply, matching the classic
/// fixed-function `glTranslate`/`glRotate` behaviour.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4 {
    m: [f32; 16],
}

impl Mat4 {
    pub const fn from_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub const fn zero() -> Self {
        Self { m: [0.0; 16] }
    }

    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self::from_array([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Raw column-major values, ready for a `mat4` uniform.
    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    pub fn set_identity(&mut self) -> &mut Self {
        *self = Self::identity();
        self
    }

    /// Right-multiplies by a translation in place. Only the translation column changes.
    pub fn translate(&mut self, v: Vec3) -> &mut Self {
        let src = *self;
        src.translate_into(v, self);
        self
    }

    /// Writes `self * T(v)` into `dest`.
    pub fn translate_into<'a>(&self, v: Vec3, dest: &'a mut Mat4) -> &'a mut Mat4 {
        let a = &self.m;
        let (x, y, z) = (v.x, v.y, v.z);
        let d = &mut dest.m;

        d[..12].copy_from_slice(&a[..12]);
        d[12] = a[0] * x + a[4] * y + a[8] * z + a[12];
        d[13] = a[1] * x + a[5] * y + a[9] * z + a[13];
        d[14] = a[2] * x + a[6] * y + a[10] * z + a[14];
        d[15] = a[3] * x + a[7] * y + a[11] * z + a[15];
        dest
    }

    /// Rotates in place by `angle` radians around `axis`.
    ///
    /// The axis does not need to be normalized. A zero-length axis returns
    /// [`MathError::ZeroAxis`] and leaves the matrix untouched.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> Result<&mut Self, MathError> {
        let src = *self;
        src.rotate_into(angle, axis, self)?;
        Ok(self)
    }

    /// Writes `self * R(angle, axis)` into `dest`. The translation column is copied through.
    pub fn rotate_into<'a>(
        &self,
        angle: f32,
        axis: Vec3,
        dest: &'a mut Mat4,
    ) -> Result<&'a mut Mat4, MathError> {
        let (mut x, mut y, mut z) = (axis.x, axis.y, axis.z);
        let mut len = (x * x + y * y + z * z).sqrt();
        if len == 0.0 {
            return Err(MathError::ZeroAxis);
        }
        if len != 1.0 {
            len = 1.0 / len;
            x *= len;
            y *= len;
            z *= len;
        }

        let s = angle.sin();
        let c = angle.cos();
        let t = 1.0 - c;

        // Rodrigues basis
        let b00 = x * x * t + c;
        let b01 = y * x * t + z * s;
        let b02 = z * x * t - y * s;

        let b10 = x * y * t - z * s;
        let b11 = y * y * t + c;
        let b12 = z * y * t + x * s;

        let b20 = x * z * t + y * s;
        let b21 = y * z * t - x * s;
        let b22 = z * z * t + c;

        let a = &self.m;
        let d = &mut dest.m;
        for r in 0..4 {
            let (a0, a1, a2) = (a[r], a[4 + r], a[8 + r]);
            d[r] = a0 * b00 + a1 * b01 + a2 * b02;
            d[4 + r] = a0 * b10 + a1 * b11 + a2 * b12;
            d[8 + r] = a0 * b20 + a1 * b21 + a2 * b22;
            d[12 + r] = a[12 + r];
        }
        Ok(dest)
    }

    /// Rotates in place around the X axis.
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        let src = *self;
        src.rotate_x_into(angle, self);
        self
    }

    pub fn rotate_x_into<'a>(&self, angle: f32, dest: &'a mut Mat4) -> &'a mut Mat4 {
        let (s, c) = angle.sin_cos();
        let a = &self.m;
        let d = &mut dest.m;

        // columns 0 and 3 are unaffected
        for r in 0..4 {
            let (a1, a2) = (a[4 + r], a[8 + r]);
            d[r] = a[r];
            d[4 + r] = a1 * c + a2 * s;
            d[8 + r] = a1 * -s + a2 * c;
            d[12 + r] = a[12 + r];
        }
        dest
    }

    /// Rotates in place around the Y axis.
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        let src = *self;
        src.rotate_y_into(angle, self);
        self
    }

    pub fn rotate_y_into<'a>(&self, angle: f32, dest: &'a mut Mat4) -> &'a mut Mat4 {
        let (s, c) = angle.sin_cos();
        let a = &self.m;
        let d = &mut dest.m;

        // columns 1 and 3 are unaffected
        for r in 0..4 {
            let (a0, a2) = (a[r], a[8 + r]);
            d[r] = a0 * c + a2 * -s;
            d[4 + r] = a[4 + r];
            d[8 + r] = a0 * s + a2 * c;
            d[12 + r] = a[12 + r];
        }
        dest
    }

    /// Rotates in place around the Z axis.
    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        let src = *self;
        src.rotate_z_into(angle, self);
        self
    }

    pub fn rotate_z_into<'a>(&self, angle: f32, dest: &'a mut Mat4) -> &'a mut Mat4 {
        let (s, c) = angle.sin_cos();
        let a = &self.m;
        let d = &mut dest.m;

        // columns 2 and 3 are unaffected
        for r in 0..4 {
            let (a0, a1) = (a[r], a[4 + r]);
            d[r] = a0 * c + a1 * s;
            d[4 + r] = a0 * -s + a1 * c;
            d[8 + r] = a[8 + r];
            d[12 + r] = a[12 + r];
        }
        dest
    }

    /// Off-center perspective projection from the six clip planes.
    ///
    /// Right-handed eye space, NDC depth in [-1, 1].
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut dest = Mat4::zero();
        Self::frustum_into(left, right, bottom, top, near, far, &mut dest);
        dest
    }

    #[allow(clippy::too_many_arguments)]
    pub fn frustum_into(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        dest: &mut Mat4,
    ) -> &mut Mat4 {
        let rl = right - left;
        let tb = top - bottom;
        let fn_ = far - near;

        #[rustfmt::skip]
        let m = [
            (near * 2.0) / rl,   0.0,                 0.0,                        0.0,
            0.0,                 (near * 2.0) / tb,   0.0,                        0.0,
            (right + left) / rl, (top + bottom) / tb, -(far + near) / fn_,        -1.0,
            0.0,                 0.0,                 -(far * near * 2.0) / fn_,  0.0,
        ];
        dest.m = m;
        dest
    }

    /// Symmetric perspective projection. `fovy_deg` is the vertical field of view in degrees.
    pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let mut dest = Mat4::zero();
        Self::perspective_into(fovy_deg, aspect, near, far, &mut dest);
        dest
    }

    pub fn perspective_into(
        fovy_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
        dest: &mut Mat4,
    ) -> &mut Mat4 {
        let top = near * (fovy_deg * std::f32::consts::PI / 360.0).tan();
        let right = top * aspect;
        Self::frustum_into(-right, right, -top, top, near, far, dest)
    }

    /// Inverse of the upper-left 3x3 block.
    ///
    /// Transposing the result gives the normal matrix for this model-view
    /// matrix. Fails with [`MathError::Singular`] when the determinant is zero.
    pub fn to_inverse_mat3(&self) -> Result<Mat3, MathError> {
        let mut dest = Mat3::zero();
        self.to_inverse_mat3_into(&mut dest)?;
        Ok(dest)
    }

    /// Like [`Mat4::to_inverse_mat3`], reusing `dest`. On failure `dest` is not modified.
    pub fn to_inverse_mat3_into<'a>(&self, dest: &'a mut Mat3) -> Result<&'a mut Mat3, MathError> {
        let m = &self.m;
        let (a00, a01, a02) = (m[0], m[1], m[2]);
        let (a10, a11, a12) = (m[4], m[5], m[6]);
        let (a20, a21, a22) = (m[8], m[9], m[10]);

        let b01 = a22 * a11 - a12 * a21;
        let b11 = -a22 * a10 + a12 * a20;
        let b21 = a21 * a10 - a11 * a20;

        let det = a00 * b01 + a01 * b11 + a02 * b21;
        if det == 0.0 {
            return Err(MathError::Singular);
        }
        let id = 1.0 / det;

        dest[0] = b01 * id;
        dest[1] = (-a22 * a01 + a02 * a21) * id;
        dest[2] = (a12 * a01 - a02 * a11) * id;
        dest[3] = b11 * id;
        dest[4] = (a22 * a00 - a02 * a20) * id;
        dest[5] = (-a12 * a00 + a02 * a10) * id;
        dest[6] = b21 * id;
        dest[7] = (-a21 * a00 + a01 * a20) * id;
        dest[8] = (a11 * a00 - a01 * a10) * id;
        Ok(dest)
    }

    /// Transforms a point (implicit w = 1). The bottom row is ignored; no perspective divide.
    pub fn multiply_vec3(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12],
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13],
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14],
        )
    }

    pub fn multiply_vec3_in_place<'a>(&self, v: &'a mut Vec3) -> &'a mut Vec3 {
        *v = self.multiply_vec3(*v);
        v
    }

    /// View matrix for a camera at `eye` looking at `center`.
    ///
    /// Degenerate inputs never fail: `eye == center` yields the identity,
    /// and an `up` parallel to the view direction yields zero right/up rows.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let mut dest = Mat4::zero();
        Self::look_at_into(eye, center, up, &mut dest);
        dest
    }

    pub fn look_at_into(eye: Vec3, center: Vec3, up: Vec3, dest: &mut Mat4) -> &mut Mat4 {
        if eye == center {
            return dest.set_identity();
        }

        // eye != center, so the length is non-zero
        let z = eye - center;
        let z = z * (1.0 / z.length());
        let x = up.cross(z).normalize_or_zero();
        let y = z.cross(x).normalize_or_zero();

        #[rustfmt::skip]
        let m = [
            x.x,          y.x,          z.x,          0.0,
            x.y,          y.y,          z.y,          0.0,
            x.z,          y.z,          z.z,          0.0,
            -x.dot(eye),  -y.dot(eye),  -z.dot(eye),  1.0,
        ];
        dest.m = m;
        dest
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for Mat4 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.m[i]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.m[i]
    }
}

impl From<cgmath::Matrix4<f32>> for Mat4 {
    fn from(matrix: cgmath::Matrix4<f32>) -> Self {
        let cols: [[f32; 4]; 4] = matrix.into();
        let mut m = [0.0; 16];
        for (c, col) in cols.iter().enumerate() {
            m[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        Mat4::from_array(m)
    }
}

impl From<Mat4> for cgmath::Matrix4<f32> {
    #[rustfmt::skip]
    fn from(matrix: Mat4) -> Self {
        let m = matrix.m;
        cgmath::Matrix4::new(
            m[0], m[1], m[2], m[3],
            m[4], m[5], m[6], m[7],
            m[8], m[9], m[10], m[11],
            m[12], m[13], m[14], m[15],
        )
    }
}
