//! Isoparametric curves, control mesh rows and columns, boundaries and
//! fixed-resolution triangulation of surfaces.

use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::surface::Surface;
use crate::types::{Rows, SrfBndry, SrfDir};
use freeform_math::Vec3;

impl Surface {
    /// Isoparametric curve with the `dir` parameter held at `t`.
    ///
    /// `SrfDir::U` yields `S(t, v)`, a curve along V.
    pub fn crv_from_srf(&self, t: f64, dir: SrfDir) -> Result<Curve> {
        let rows = self
            .strips(dir)
            .iter()
            .map(|s| s.eval_stored(t))
            .collect::<Result<Rows>>()?;
        Ok(self.strip_curve(dir.other(), &rows))
    }

    /// Control mesh column (`SrfDir::U`) or row (`SrfDir::V`) `index` as a curve.
    pub fn crv_from_mesh(&self, index: usize, dir: SrfDir) -> Result<Curve> {
        let size = self.dir_length(dir);
        if index >= size {
            return Err(CagdError::IndexNotInMesh { index, size });
        }
        let mut strips = self.strips(dir.other());
        Ok(strips.swap_remove(index))
    }

    /// Replace control mesh column (`SrfDir::U`) or row (`SrfDir::V`) `index` by
    /// the control points of `crv`.
    pub fn crv_to_mesh(&mut self, crv: &Curve, index: usize, dir: SrfDir) -> Result<()> {
        let size = self.dir_length(dir);
        if index >= size {
            return Err(CagdError::IndexNotInMesh { index, size });
        }
        let len = self.dir_length(dir.other());
        if crv.ptype != self.ptype || crv.length != len {
            return Err(CagdError::PtOrLenMismatch(format!(
                "curve {:?} of length {} into mesh {:?} of length {len}",
                crv.ptype, crv.length, self.ptype
            )));
        }
        for c in self.ptype.coords() {
            for (i, &x) in crv.points[c].iter().enumerate() {
                let idx = match dir {
                    SrfDir::U => i * self.u_length + index,
                    SrfDir::V => index * self.u_length + i,
                };
                self.points[c][idx] = x;
            }
        }
        Ok(())
    }

    /// One boundary curve.
    ///
    /// Directions with open end conditions read the boundary straight off the
    /// control mesh.
    pub fn bndry_crv(&self, bndry: SrfBndry) -> Result<Curve> {
        let (dir, at_max) = match bndry {
            SrfBndry::UMin => (SrfDir::U, false),
            SrfBndry::UMax => (SrfDir::U, true),
            SrfBndry::VMin => (SrfDir::V, false),
            SrfBndry::VMax => (SrfDir::V, true),
        };
        if self.dir_has_open_ec(dir) {
            let index = if at_max { self.dir_length(dir) - 1 } else { 0 };
            return self.crv_from_mesh(index, dir);
        }
        let (min, max) = self.dir_domain(dir);
        self.crv_from_srf(if at_max { max } else { min }, dir)
    }

    /// The four boundary curves in U-min, U-max, V-min, V-max order.
    pub fn bndry_crvs(&self) -> Result<[Curve; 4]> {
        Ok([
            self.bndry_crv(SrfBndry::UMin)?,
            self.bndry_crv(SrfBndry::UMax)?,
            self.bndry_crv(SrfBndry::VMin)?,
            self.bndry_crv(SrfBndry::VMax)?,
        ])
    }

    /// Triangulate on a uniform `nu x nv` grid of parameter samples.
    pub fn to_tri_mesh(&self, nu: usize, nv: usize) -> Result<TriMesh> {
        if nu < 2 || nv < 2 {
            return Err(CagdError::WrongSize(format!("{nu} x {nv} samples, need at least 2 x 2")));
        }
        let (u0, u1, v0, v1) = self.domain();
        let mut mesh = TriMesh {
            nu,
            nv,
            params: Vec::with_capacity(nu * nv),
            points: Vec::with_capacity(nu * nv),
            normals: Vec::with_capacity(nu * nv),
        };
        for j in 0..nv {
            let v = v0 + (v1 - v0) * j as f64 / (nv - 1) as f64;
            for i in 0..nu {
                let u = u0 + (u1 - u0) * i as f64 / (nu - 1) as f64;
                mesh.points.push(self.eval_e(u, v)?);
                mesh.normals.push(self.normal(u, v, true)?);
                mesh.params.push((u, v));
            }
        }
        Ok(mesh)
    }
}

/// Surface samples on a regular parameter grid, row-major in V.
///
/// Sample `(i, j)` sits at `params[j * nu + i]`. Each grid cell splits into
/// two triangles along its diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    /// Samples along U.
    pub nu: usize,
    /// Samples along V.
    pub nv: usize,
    /// `(u, v)` of every sample.
    pub params: Vec<(f64, f64)>,
    /// Euclidean surface point of every sample.
    pub points: Vec<Vec<f64>>,
    /// Unit surface normal of every sample.
    pub normals: Vec<Vec3>,
}

impl TriMesh {
    /// Index of grid sample `(i, j)`.
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nu + i
    }

    /// Number of samples.
    pub fn num_vertices(&self) -> usize {
        self.params.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        2 * (self.nu - 1) * (self.nv - 1)
    }

    /// Vertex triples, counter-clockwise in `(u, v)`.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let mut tris = Vec::with_capacity(self.num_triangles());
        for j in 0..self.nv - 1 {
            for i in 0..self.nu - 1 {
                let a = self.index(i, j);
                let b = a + 1;
                let c = a + self.nu;
                let d = c + 1;
                tris.push([a, b, d]);
                tris.push([a, d, c]);
            }
        }
        tris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeomType, PointType};
    use approx::assert_abs_diff_eq;

    /// 3 x 2 Bezier patch with z = col * row.
    fn patch() -> Surface {
        let mut ctl = Vec::new();
        for row in 0..2 {
            for col in 0..3 {
                ctl.push(vec![col as f64, row as f64, (col * row) as f64]);
            }
        }
        Surface::bezier(PointType::E3, 3, 2, &ctl).unwrap()
    }

    #[test]
    fn test_crv_from_srf_matches_eval() {
        let srf = patch();
        let along_v = srf.crv_from_srf(0.3, SrfDir::U).unwrap();
        assert_eq!(along_v.length, 2);
        let along_u = srf.crv_from_srf(0.6, SrfDir::V).unwrap();
        assert_eq!(along_u.length, 3);
        let p = srf.eval(0.3, 0.6).unwrap();
        for (a, b) in along_v.eval(0.6).unwrap().iter().zip(&p) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        for (a, b) in along_u.eval(0.3).unwrap().iter().zip(&p) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mesh_row_and_column() {
        let srf = patch();
        let col = srf.crv_from_mesh(2, SrfDir::U).unwrap();
        assert_eq!(col.ctl_point_e(1), vec![2.0, 1.0, 2.0]);
        let row = srf.crv_from_mesh(1, SrfDir::V).unwrap();
        assert_eq!(row.length, 3);
        assert_eq!(row.ctl_point_e(2), vec![2.0, 1.0, 2.0]);
        assert_eq!(
            srf.crv_from_mesh(3, SrfDir::U),
            Err(CagdError::IndexNotInMesh { index: 3, size: 3 })
        );
    }

    #[test]
    fn test_crv_to_mesh() {
        let mut srf = patch();
        let mut row = srf.crv_from_mesh(0, SrfDir::V).unwrap();
        row.points[3] = vec![5.0, 5.0, 5.0];
        srf.crv_to_mesh(&row, 0, SrfDir::V).unwrap();
        assert_eq!(srf.points[3][..3], [5.0, 5.0, 5.0]);
        assert_eq!(srf.points[3][3..], [0.0, 1.0, 2.0]);

        let short = Curve::bezier(PointType::E3, &[vec![0.0; 3], vec![1.0; 3]]).unwrap();
        assert!(matches!(
            srf.crv_to_mesh(&short, 0, SrfDir::V),
            Err(CagdError::PtOrLenMismatch(_))
        ));
        assert!(srf.crv_to_mesh(&short, 1, SrfDir::U).is_ok());
    }

    #[test]
    fn test_boundaries() {
        let srf = patch();
        let [umin, umax, vmin, vmax] = srf.bndry_crvs().unwrap();
        assert_eq!(umin.ctl_point_e(1), vec![0.0, 1.0, 0.0]);
        assert_eq!(umax.ctl_point_e(1), vec![2.0, 1.0, 2.0]);
        assert_eq!(vmin.length, 3);
        assert_eq!(vmax.ctl_point_e(1), vec![1.0, 1.0, 1.0]);

        // A floating B-spline direction goes through evaluation.
        let mut ctl = Vec::new();
        for row in 0..2 {
            for col in 0..4 {
                ctl.push(vec![col as f64, row as f64, 0.0]);
            }
        }
        let bsp = Surface::bspline(
            PointType::E3,
            (3, 2),
            (4, 2),
            &ctl,
            crate::knots::uniform_float(7),
            vec![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        let umin = bsp.bndry_crv(SrfBndry::UMin).unwrap();
        assert_eq!(umin.gtype, GeomType::BSpline);
        let p = umin.eval_e(0.5).unwrap();
        let q = bsp.eval_e(2.0, 0.5).unwrap();
        for (a, b) in p.iter().zip(&q) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tri_mesh() {
        let srf = patch();
        let mesh = srf.to_tri_mesh(4, 3).unwrap();
        assert_eq!(mesh.num_vertices(), 12);
        assert_eq!(mesh.num_triangles(), 2 * 3 * 2);
        assert!(matches!(patch().to_tri_mesh(1, 5), Err(CagdError::WrongSize(_))));

        let tris = mesh.triangles();
        assert_eq!(tris.len(), mesh.num_triangles());
        assert!(tris.iter().flatten().all(|&i| i < mesh.num_vertices()));
        assert_eq!(tris[0], [0, 1, 5]);

        let k = mesh.index(2, 1);
        let (u, v) = mesh.params[k];
        assert_abs_diff_eq!(u, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v, 0.5, epsilon = 1e-12);
        for (a, b) in mesh.points[k].iter().zip(srf.eval_e(u, v).unwrap()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
        }
        let n = srf.normal(u, v, true).unwrap();
        assert_abs_diff_eq!(mesh.normals[k].dot(&n), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mesh.normals[0].norm(), 1.0, epsilon = 1e-12);
    }
}
