//! # Primitive Shape Generation
//!
//! Parametric surfaces sampled over a latitude/longitude grid. Every shape
//! is described by a plain parameter struct whose `Default` is the full
//! unit shape; override fields with struct update syntax and call `build`.

use super::{GeometryData, GeometryError};
use crate::math::{deg_to_rad, Vec3};

/// UV sphere (or a latitude/longitude patch of one).
///
/// Both ends of each angular range are emitted, so a full sphere has a
/// duplicated seam column and all samples of a polar ring share one
/// position. Normals are those of the unit sphere and are not corrected for
/// a non-uniform `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f32,
    pub center: Vec3,
    pub scale: Vec3,
    pub min_lat_deg: f32,
    pub max_lat_deg: f32,
    pub min_lng_deg: f32,
    pub max_lng_deg: f32,
    pub lat_divisions: u32,
    pub lng_divisions: u32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            radius: 1.0,
            center: Vec3::zero(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            min_lat_deg: -90.0,
            max_lat_deg: 90.0,
            min_lng_deg: -180.0,
            max_lng_deg: 180.0,
            lat_divisions: 20,
            lng_divisions: 20,
        }
    }
}

impl Sphere {
    /// Generate the sphere
    ///
    /// Produces `(lat_divisions + 1) * (lng_divisions + 1)` vertices and
    /// `lat_divisions * lng_divisions * 6` indices.
    pub fn build(&self) -> Result<GeometryData, GeometryError> {
        check_divisions("lat_divisions", self.lat_divisions)?;
        check_divisions("lng_divisions", self.lng_divisions)?;
        check_finite("radius", self.radius)?;
        check_vec3("center", self.center)?;
        check_vec3("scale", self.scale)?;
        check_range("latitude", self.min_lat_deg, self.max_lat_deg)?;
        check_range("longitude", self.min_lng_deg, self.max_lng_deg)?;

        let ring_len = self.lng_divisions as u64 + 1;
        let vertex_count = (self.lat_divisions as u64 + 1) * ring_len;
        check_vertex_count(vertex_count)?;

        let min_lat = deg_to_rad(self.min_lat_deg);
        let max_lat = deg_to_rad(self.max_lat_deg);
        let min_lng = deg_to_rad(self.min_lng_deg);
        let max_lng = deg_to_rad(self.max_lng_deg);

        let lat_step = (max_lat - min_lat) / self.lat_divisions as f32;
        let lng_step = (max_lng - min_lng) / self.lng_divisions as f32;

        let index_count = self.lat_divisions as usize * self.lng_divisions as usize * 6;
        let mut data = GeometryData::with_capacity(vertex_count as usize, index_count);

        let (r, c, scale) = (self.radius, self.center, self.scale);
        let ring_len = ring_len as u32;

        for y in 0..=self.lat_divisions {
            let lat = min_lat + y as f32 * lat_step;
            let (sin_lat, cos_lat) = lat.sin_cos();
            let ring_radius = r * cos_lat;

            for x in 0..=self.lng_divisions {
                let lng = min_lng + x as f32 * lng_step;
                let (sin_lng, cos_lng) = lng.sin_cos();

                data.push_vertex(
                    [
                        ring_radius * scale.x * sin_lng + c.x,
                        r * scale.y * sin_lat + c.y,
                        ring_radius * scale.z * cos_lng + c.z,
                    ],
                    [cos_lat * sin_lng, sin_lat, cos_lat * cos_lng],
                    [
                        x as f32 / self.lng_divisions as f32,
                        y as f32 / self.lat_divisions as f32,
                    ],
                );
            }

            // stitch this ring to the previous one
            if y > 0 {
                let prev = (y - 1) * ring_len;
                let cur = y * ring_len;
                for x0 in 0..self.lng_divisions {
                    let x1 = x0 + 1;
                    data.indices.extend_from_slice(&[
                        prev + x0,
                        prev + x1,
                        cur + x0,
                        prev + x1,
                        cur + x1,
                        cur + x0,
                    ]);
                }
            }
        }

        Ok(data)
    }
}

/// Open cylinder side standing on the XZ plane at `center`, rising `height` along Y.
///
/// Each of the two rings has `divisions` samples without a repeated end
/// point, and the last quad always joins sample `divisions - 1` back to
/// sample 0. For a longitude range short of 360° that closing quad spans
/// the gap, so partial cylinders get a seam across the opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub center: Vec3,
    pub height: f32,
    pub radius: f32,
    pub divisions: u32,
    pub min_lng_deg: f32,
    pub max_lng_deg: f32,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self {
            center: Vec3::zero(),
            height: 1.0,
            radius: 1.0,
            divisions: 20,
            min_lng_deg: 0.0,
            max_lng_deg: 360.0,
        }
    }
}

impl Cylinder {
    /// Generate the cylinder: `2 * divisions` vertices, `6 * divisions` indices.
    pub fn build(&self) -> Result<GeometryData, GeometryError> {
        check_divisions("divisions", self.divisions)?;
        check_vec3("center", self.center)?;
        check_finite("height", self.height)?;
        check_finite("radius", self.radius)?;
        check_range("longitude", self.min_lng_deg, self.max_lng_deg)?;
        check_vertex_count(self.divisions as u64 * 2)?;

        let n = self.divisions;
        let min_lng = deg_to_rad(self.min_lng_deg);
        let max_lng = deg_to_rad(self.max_lng_deg);
        let lng_step = (max_lng - min_lng) / n as f32;

        let mut data = GeometryData::with_capacity(n as usize * 2, n as usize * 6);
        let (r, c) = (self.radius, self.center);

        for (ring_y, v) in [(0.0, 0.0), (self.height, 1.0)] {
            for i in 0..n {
                let a = min_lng + i as f32 * lng_step;
                let (sin_a, cos_a) = a.sin_cos();
                data.push_vertex(
                    [r * sin_a + c.x, ring_y + c.y, r * cos_a + c.z],
                    [sin_a, 0.0, cos_a],
                    [i as f32 / n as f32, v],
                );
            }
        }

        for x0 in 0..n {
            let x1 = (x0 + 1) % n;
            data.indices
                .extend_from_slice(&[x0, x1, x0 + n, x1, x1 + n, x0 + n]);
        }

        Ok(data)
    }
}

fn check_divisions(name: &'static str, value: u32) -> Result<(), GeometryError> {
    if value == 0 {
        return Err(GeometryError::ZeroDivisions { name });
    }
    Ok(())
}

fn check_finite(name: &'static str, value: f32) -> Result<(), GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NotFinite { name, value });
    }
    Ok(())
}

fn check_vec3(name: &'static str, v: Vec3) -> Result<(), GeometryError> {
    for value in v.to_array() {
        check_finite(name, value)?;
    }
    Ok(())
}

fn check_range(name: &'static str, min: f32, max: f32) -> Result<(), GeometryError> {
    check_finite(name, min)?;
    check_finite(name, max)?;
    if min >= max {
        return Err(GeometryError::BadRange { name, min, max });
    }
    Ok(())
}

fn check_vertex_count(count: u64) -> Result<(), GeometryError> {
    if count > u32::MAX as u64 {
        return Err(GeometryError::TooManyVertices(count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_sphere_counts() {
        for (lat, lng) in [(1, 1), (2, 3), (7, 5), (20, 20)] {
            let sphere = Sphere {
                lat_divisions: lat,
                lng_divisions: lng,
                ..Default::default()
            }
            .build()
            .unwrap();

            let expected_vertices = ((lat + 1) * (lng + 1)) as usize;
            assert_eq!(sphere.vertex_count(), expected_vertices);
            assert_eq!(sphere.indices.len(), (lat * lng * 6) as usize);
            assert!(sphere
                .indices
                .iter()
                .all(|&i| (i as usize) < expected_vertices));
            assert!(sphere.validate().is_ok());
        }
    }

    #[test]
    fn test_small_sphere_scenario() {
        let sphere = Sphere {
            radius: 1.0,
            lat_divisions: 2,
            lng_divisions: 2,
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(sphere.vertex_count(), 9);
        assert_eq!(sphere.indices.len(), 24);

        // lat = +90° ring collapses onto the north pole
        for position in &sphere.positions[6..9] {
            assert!(approx(*position, [0.0, 1.0, 0.0]), "{:?}", position);
        }
        // and lat = -90° onto the south pole
        for position in &sphere.positions[0..3] {
            assert!(approx(*position, [0.0, -1.0, 0.0]), "{:?}", position);
        }
        // equator, lng = 0 faces +Z
        assert!(approx(sphere.positions[4], [0.0, 0.0, 1.0]));
        assert!(approx(sphere.normals[4], [0.0, 0.0, 1.0]));
        assert_eq!(sphere.tex_coords[4], [0.5, 0.5]);
    }

    #[test]
    fn test_sphere_first_quad_indices() {
        let sphere = Sphere {
            lat_divisions: 1,
            lng_divisions: 1,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(sphere.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn test_sphere_respects_center_and_scale() {
        let sphere = Sphere {
            radius: 2.0,
            center: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(1.0, 0.5, 3.0),
            lat_divisions: 2,
            lng_divisions: 4,
            ..Default::default()
        }
        .build()
        .unwrap();

        // equator ring starts at index 5; lng = -180°, -90°, 0°, 90°, 180°
        assert!(approx(sphere.positions[7], [1.0, 2.0, 3.0 + 2.0 * 3.0]));
        assert!(approx(sphere.positions[8], [1.0 + 2.0, 2.0, 3.0]));
        // normals stay on the unit sphere regardless of scale
        assert!(approx(sphere.normals[7], [0.0, 0.0, 1.0]));
        // pole height uses scale.y
        assert!(approx(sphere.positions[14], [1.0, 2.0 + 2.0 * 0.5, 3.0]));
    }

    #[test]
    fn test_partial_sphere_does_not_wrap() {
        let sphere = Sphere {
            min_lng_deg: 0.0,
            max_lng_deg: 90.0,
            lat_divisions: 1,
            lng_divisions: 3,
            ..Default::default()
        }
        .build()
        .unwrap();

        // the last sample of a ring never links back to the first
        for tri in sphere.indices.chunks(3) {
            let cols: HashSet<u32> = tri.iter().map(|i| i % 4).collect();
            assert!(!(cols.contains(&0) && cols.contains(&3)));
        }
    }

    #[test]
    fn test_cylinder_counts_and_wraparound() {
        let n = 4;
        let cylinder = Cylinder {
            divisions: n,
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(cylinder.vertex_count(), 2 * n as usize);
        assert_eq!(cylinder.indices.len(), 6 * n as usize);
        assert!(cylinder.validate().is_ok());

        let mut seen = HashSet::new();
        for quad in cylinder.indices.chunks(6) {
            let x0 = quad[0];
            let x1 = quad[1];
            assert_eq!(x1, (x0 + 1) % n);
            assert_eq!(quad, &[x0, x1, x0 + n, x1, x1 + n, x0 + n]);
            assert!(seen.insert(x0));
        }
        assert_eq!(seen.len(), n as usize);

        // closing quad joins vertex 3 back to vertex 0
        assert_eq!(&cylinder.indices[18..24], &[3, 0, 7, 0, 4, 7]);
    }

    #[test]
    fn test_partial_cylinder_still_closes_seam() {
        let cylinder = Cylinder {
            min_lng_deg: 0.0,
            max_lng_deg: 180.0,
            divisions: 4,
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(cylinder.vertex_count(), 8);
        assert_eq!(&cylinder.indices[18..24], &[3, 0, 7, 0, 4, 7]);
    }

    #[test]
    fn test_cylinder_ring_positions() {
        let cylinder = Cylinder {
            center: Vec3::new(0.0, 1.0, 0.0),
            height: 2.0,
            radius: 0.5,
            divisions: 4,
            ..Default::default()
        }
        .build()
        .unwrap();

        assert!(approx(cylinder.positions[0], [0.0, 1.0, 0.5]));
        assert!(approx(cylinder.positions[1], [0.5, 1.0, 0.0]));
        assert!(approx(cylinder.positions[4], [0.0, 3.0, 0.5]));
        assert!(approx(cylinder.normals[1], [1.0, 0.0, 0.0]));
        assert_eq!(cylinder.tex_coords[1], [0.25, 0.0]);
        assert_eq!(cylinder.tex_coords[5], [0.25, 1.0]);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let zero = Sphere {
            lat_divisions: 0,
            ..Default::default()
        };
        assert_eq!(
            zero.build(),
            Err(GeometryError::ZeroDivisions {
                name: "lat_divisions"
            })
        );

        let reversed = Sphere {
            min_lng_deg: 90.0,
            max_lng_deg: -90.0,
            ..Default::default()
        };
        assert!(matches!(
            reversed.build(),
            Err(GeometryError::BadRange {
                name: "longitude",
                ..
            })
        ));

        let nan_radius = Cylinder {
            radius: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_radius.build(),
            Err(GeometryError::NotFinite { name: "radius", .. })
        ));

        let no_divisions = Cylinder {
            divisions: 0,
            ..Default::default()
        };
        assert!(no_divisions.build().is_err());
    }
}
