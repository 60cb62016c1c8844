//! Raycast targeting for block edits.
#![forbid(unsafe_code)]

use karst_geom::Vec3;

/// Result of a grid raycast: the solid cell that was hit, the last empty
/// cell the ray passed through (where a placement goes), and the face
/// normal of the crossing.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub bx: i32,
    pub by: i32,
    pub bz: i32,
    pub px: i32,
    pub py: i32,
    pub pz: i32,
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

/// Walk the voxel grid from `origin` along `dir` (amanatides/woo DDA) until
/// `is_solid` reports a hit or `max_dist` is exceeded. The sampler decides
/// what counts as solid, so callers can route through whatever chunk storage
/// they have.
pub fn raycast_first_hit<F>(origin: Vec3, dir: Vec3, max_dist: f32, mut is_solid: F) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let len = dir.length();
    if len < 1e-6 {
        return None;
    }
    let d = dir * (1.0 / len);

    let mut cell = [
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    ];
    let comp = [d.x, d.y, d.z];
    let frac = [
        origin.x - origin.x.floor(),
        origin.y - origin.y.floor(),
        origin.z - origin.z.floor(),
    ];

    let mut step = [0i32; 3];
    let mut t_max = [f32::MAX; 3];
    let mut t_delta = [f32::MAX; 3];
    for axis in 0..3 {
        let inv = inv_or_max(comp[axis]);
        if comp[axis] > 0.0 {
            step[axis] = 1;
            t_max[axis] = (1.0 - frac[axis]) * inv;
            t_delta[axis] = inv;
        } else if comp[axis] < 0.0 {
            step[axis] = -1;
            t_max[axis] = frac[axis] * inv;
            t_delta[axis] = inv;
        }
    }

    let mut prev = cell;
    let mut t = 0.0f32;

    for _ in 0..512 {
        if t > max_dist {
            break;
        }
        if is_solid(cell[0], cell[1], cell[2]) {
            let mut n = [0i32; 3];
            for axis in 0..3 {
                n[axis] = prev[axis] - cell[axis];
            }
            return Some(RayHit {
                bx: cell[0],
                by: cell[1],
                bz: cell[2],
                px: prev[0],
                py: prev[1],
                pz: prev[2],
                nx: n[0],
                ny: n[1],
                nz: n[2],
            });
        }
        prev = cell;
        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        cell[axis] += step[axis];
        t = t_max[axis];
        t_max[axis] += t_delta[axis];
    }
    None
}
