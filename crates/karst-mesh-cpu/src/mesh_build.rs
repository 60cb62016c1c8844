use karst_geom::Vec3;

/// One face of an axis-aligned cuboid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Face {
    /// Outward unit normal.
    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosY => Vec3::new(0.0, 1.0, 0.0),
            Face::NegY => Vec3::new(0.0, -1.0, 0.0),
            Face::PosX => Vec3::new(1.0, 0.0, 0.0),
            Face::NegX => Vec3::new(-1.0, 0.0, 0.0),
            Face::PosZ => Vec3::new(0.0, 0.0, 1.0),
            Face::NegZ => Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

/// CPU-side triangle soup for one block type of one chunk: interleavable
/// position and normal streams, three floats per vertex, no index buffer.
/// This is the renderer's upload boundary.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Pre-reserve for `n` cuboid ranges (12 triangles each).
    #[inline]
    pub fn reserve_ranges(&mut self, n: usize) {
        self.pos.reserve(n * 36 * 3);
        self.norm.reserve(n * 36 * 3);
    }

    #[inline]
    fn push_vertex(&mut self, v: Vec3, n: Vec3) {
        self.pos.extend_from_slice(&[v.x, v.y, v.z]);
        self.norm.extend_from_slice(&[n.x, n.y, n.z]);
    }

    /// Append a quad as two triangles. The corner order may be given either
    /// way round; the emitted winding is always counter-clockwise seen from
    /// the side the normal points to.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, n: Vec3) {
        let mut vs = [a, b, c, d];
        let winding = (vs[1] - vs[0]).cross(vs[2] - vs[0]);
        if winding.dot(n) < 0.0 {
            vs.swap(1, 3);
        }
        for tri in [[0, 1, 2], [0, 2, 3]] {
            for i in tri {
                self.push_vertex(vs[i], n);
            }
        }
    }

    /// Append all six faces of the box `[min, max)` with outward normals:
    /// 12 triangles, 36 vertices.
    pub fn add_box(&mut self, min: Vec3, max: Vec3) {
        // corner order: (x,z) plane at min.y then max.y
        let c = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        const FACES: [(Face, [usize; 4]); 6] = [
            (Face::NegY, [0, 1, 2, 3]),
            (Face::PosY, [4, 5, 6, 7]),
            (Face::NegZ, [0, 1, 5, 4]),
            (Face::PosZ, [3, 2, 6, 7]),
            (Face::NegX, [0, 3, 7, 4]),
            (Face::PosX, [1, 2, 6, 5]),
        ];
        for (face, idx) in FACES {
            self.add_quad(c[idx[0]], c[idx[1]], c[idx[2]], c[idx[3]], face.normal());
        }
    }
}
