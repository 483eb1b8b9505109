//! Patch objects store their geometry twice: as per-face coordinate
//! columns (`xdata`, `ydata`, `zdata`, `cdata`) and as an indexed mesh
//! (`faces`, `vertices`, `facevertexcdata`). Writing either side rebuilds
//! the other.

use crate::handle::Handle;
use crate::value::{Tensor, Value};

use super::GraphicsEngine;

/// Indexed mesh built from coordinate columns, one column per face.
#[derive(Debug, Clone, PartialEq)]
struct Mesh {
    faces: Tensor,
    vertices: Tensor,
    vertex_colors: Value,
}

/// Coordinate columns built from an indexed mesh.
#[derive(Debug, Clone, PartialEq)]
struct Columns {
    x: Tensor,
    y: Tensor,
    z: Value,
    c: Value,
}

fn tensor(data: Vec<f64>, shape: Vec<usize>) -> Option<Tensor> {
    match Tensor::new(data, shape) {
        Ok(t) => Some(t),
        Err(err) => {
            log::debug!(target: "runmat_graphics", "patch geometry rejected: {err}");
            None
        }
    }
}

fn mesh_from_columns(x: &Tensor, y: &Tensor, z: Option<&Tensor>, c: &Tensor) -> Option<Mesh> {
    let (x, y, z) = if x.rows == 1 && x.cols > 1 {
        (x.as_column(), y.as_column(), z.map(Tensor::as_column))
    } else {
        (x.clone(), y.clone(), z.cloned())
    };
    let (nr, nc) = (x.rows, x.cols);
    if y.len() != x.len() || z.as_ref().map(|z| z.len() != x.len()).unwrap_or(false) {
        log::warn!(target: "runmat_graphics", "patch: xdata, ydata and zdata must have the same size");
        return None;
    }
    let dims = if z.is_some() { 3 } else { 2 };
    let n = nr * nc;
    let mut vertices = vec![0.0; n * dims];
    let mut faces = vec![0.0; n];
    for k in 0..n {
        vertices[k] = x.data[k];
        vertices[n + k] = y.data[k];
        if let Some(z) = &z {
            vertices[2 * n + k] = z.data[k];
        }
        // Face j (a column of the input) lists vertices j*nr+1 ..= j*nr+nr.
        let (row, col) = (k % nr, k / nr);
        faces[row * nc + col] = (k + 1) as f64;
    }
    let vertex_colors = if c.is_empty() {
        Value::Empty
    } else if c.ndims() == 3 {
        let planes = c.shape[2];
        Value::Tensor(tensor(c.data.clone(), vec![c.len() / planes, planes])?)
    } else {
        Value::Tensor(c.as_column())
    };
    Some(Mesh {
        faces: tensor(faces, vec![nc, nr])?,
        vertices: tensor(vertices, vec![n, dims])?,
        vertex_colors,
    })
}

fn columns_from_mesh(faces: &Tensor, vertices: &Tensor, colors: &Tensor) -> Option<Columns> {
    let (nf, nc) = (faces.rows, faces.cols);
    let nv = vertices.rows;
    let has_z = vertices.cols > 2;
    let n = nf * nc;
    let mut x = vec![f64::NAN; n];
    let mut y = vec![f64::NAN; n];
    let mut z = vec![f64::NAN; n];
    let mut index = vec![None; n];

    // Output columns are faces and rows are vertex slots.
    for f in 0..nf {
        let mut previous = None;
        for v in 0..nc {
            let raw = faces.get2(f, v);
            // A NaN pads a short face by repeating its last vertex.
            let idx = if raw.is_nan() { previous } else { Some(raw) };
            previous = idx;
            let Some(row) = idx
                .filter(|i| *i >= 1.0 && (*i as usize) <= nv)
                .map(|i| i as usize - 1)
            else {
                continue;
            };
            let at = v + nc * f;
            x[at] = vertices.get2(row, 0);
            y[at] = vertices.get2(row, 1);
            if has_z {
                z[at] = vertices.get2(row, 2);
            }
            index[at] = Some(row);
        }
    }

    let planes = colors.cols;
    let c = if colors.is_empty() {
        Value::Empty
    } else if colors.rows == nf && nf != nv {
        // One colour per face: 1 x nf (x 3 for truecolor).
        let mut data = vec![0.0; nf * planes];
        for f in 0..nf {
            for p in 0..planes {
                data[f + nf * p] = colors.get2(f, p);
            }
        }
        let shape = if planes == 1 { vec![1, nf] } else { vec![1, nf, planes] };
        Value::Tensor(tensor(data, shape)?)
    } else if colors.rows == nv {
        let mut data = vec![f64::NAN; n * planes];
        for (k, row) in index.iter().enumerate() {
            if let Some(row) = row {
                for p in 0..planes {
                    data[k + n * p] = colors.get2(*row, p);
                }
            }
        }
        let shape = if planes == 1 { vec![nc, nf] } else { vec![nc, nf, planes] };
        Value::Tensor(tensor(data, shape)?)
    } else {
        Value::Empty
    };

    Some(Columns {
        x: tensor(x, vec![nc, nf])?,
        y: tensor(y, vec![nc, nf])?,
        z: if has_z {
            Value::Tensor(tensor(z, vec![nc, nf])?)
        } else {
            Value::Empty
        },
        c,
    })
}

impl GraphicsEngine {
    pub(super) fn patch_hook(&mut self, h: Handle, key: &str) {
        match key {
            "xdata" | "ydata" | "zdata" | "cdata" => self.update_patch_mesh(h),
            "faces" | "vertices" | "facevertexcdata" => self.update_patch_columns(h),
            _ => return,
        }
        self.update_data_cache(h);
        self.update_parent_limits(h);
    }

    /// Rebuild `faces`, `vertices` and `facevertexcdata` from the
    /// coordinate columns.
    fn update_patch_mesh(&mut self, h: Handle) {
        let Some(_guard) = self.guards.enter(h, "patch_data") else {
            return;
        };
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let as_tensor = |name: &str| obj.value(name).to_tensor().unwrap_or_else(|| Tensor::zeros(0, 0));
        let (x, y, z, c) = (
            as_tensor("xdata"),
            as_tensor("ydata"),
            as_tensor("zdata"),
            as_tensor("cdata"),
        );
        let Some(mesh) = mesh_from_columns(&x, &y, (!z.is_empty()).then_some(&z), &c) else {
            return;
        };
        self.store_derived(h, "faces", Value::Tensor(mesh.faces));
        self.store_derived(h, "vertices", Value::Tensor(mesh.vertices));
        self.store_derived(h, "facevertexcdata", mesh.vertex_colors);
    }

    /// Rebuild the coordinate columns and `cdata` from the indexed mesh.
    fn update_patch_columns(&mut self, h: Handle) {
        let Some(_guard) = self.guards.enter(h, "patch_data") else {
            return;
        };
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let as_tensor = |name: &str| obj.value(name).to_tensor().unwrap_or_else(|| Tensor::zeros(0, 0));
        let (faces, vertices, colors) = (
            as_tensor("faces"),
            as_tensor("vertices"),
            as_tensor("facevertexcdata"),
        );
        if vertices.cols < 2 && !vertices.is_empty() {
            log::warn!(target: "runmat_graphics", "patch: vertices must have 2 or 3 columns");
            return;
        }
        let Some(columns) = columns_from_mesh(&faces, &vertices, &colors) else {
            return;
        };
        self.store_derived(h, "xdata", Value::Tensor(columns.x));
        self.store_derived(h, "ydata", Value::Tensor(columns.y));
        self.store_derived(h, "zdata", columns.z);
        self.store_derived(h, "cdata", columns.c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(rows: &[&[f64]]) -> Tensor {
        Tensor::from_rows(rows)
    }

    #[test]
    fn columns_become_an_indexed_mesh() {
        let x = t(&[&[0.0, 1.0], &[1.0, 2.0], &[0.0, 1.0]]);
        let y = t(&[&[0.0, 0.0], &[0.0, 0.0], &[1.0, 1.0]]);
        let mesh = mesh_from_columns(&x, &y, None, &Tensor::zeros(0, 0)).unwrap();
        assert_eq!(mesh.faces.shape, vec![2, 3]);
        assert_eq!(mesh.faces.get2(0, 0), 1.0);
        assert_eq!(mesh.faces.get2(1, 2), 6.0);
        assert_eq!(mesh.vertices.shape, vec![6, 2]);
        assert_eq!(mesh.vertices.get2(3, 0), 1.0);
        assert_eq!(mesh.vertices.get2(5, 1), 1.0);
        assert_eq!(mesh.vertex_colors, Value::Empty);
    }

    #[test]
    fn nan_face_entries_repeat_the_previous_vertex() {
        let faces = t(&[&[1.0, 2.0, 3.0, 4.0], &[2.0, 3.0, 4.0, f64::NAN]]);
        let vertices = t(&[&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0], &[0.0, 1.0]]);
        let cols = columns_from_mesh(&faces, &vertices, &Tensor::zeros(0, 0)).unwrap();
        assert_eq!(cols.x.shape, vec![4, 2]);
        assert_eq!(cols.x.get2(3, 1), cols.x.get2(2, 1));
        assert_eq!(cols.y.get2(3, 1), 1.0);
        assert_eq!(cols.z, Value::Empty);
    }

    #[test]
    fn face_colours_and_vertex_colours() {
        let faces = t(&[&[1.0, 2.0, 3.0]]);
        let vertices = t(&[&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0]]);
        let per_vertex = t(&[&[10.0], &[20.0], &[30.0]]);
        let cols = columns_from_mesh(&faces, &vertices, &per_vertex).unwrap();
        let Value::Tensor(c) = cols.c else {
            panic!("expected per-vertex colour data");
        };
        assert_eq!(c.shape, vec![3, 1]);
        assert_eq!(c.data, vec![10.0, 20.0, 30.0]);

        let two = t(&[&[1.0, 2.0, 3.0], &[1.0, 3.0, 4.0]]);
        let four = t(&[&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0], &[0.0, 1.0]]);
        let rgb = t(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]]);
        let cols = columns_from_mesh(&two, &four, &rgb).unwrap();
        let Value::Tensor(c) = cols.c else {
            panic!("expected per-face colour data");
        };
        assert_eq!(c.shape, vec![1, 2, 3]);
        assert_eq!(c.data, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }
}
