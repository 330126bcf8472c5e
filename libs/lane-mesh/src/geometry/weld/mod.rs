//! # Vertex Welding
//!
//! Merges soup vertices closer than a threshold and rebuilds the index
//! buffer without degenerate or repeated triangles.


use super::check_indices;
use crate::error::MeshResult;
use glam::DVec3;
use std::collections::HashSet;

/// Welds `vertices` and remaps `triangles` in place of the originals.
///
/// Each vertex is absorbed by the first already-kept vertex closer than
/// `threshold` (3D distance), so the result depends on input order.
/// Triangles that collapse to fewer than three distinct indices are
/// dropped, as are triangles whose sorted index triple was already emitted.
/// Surviving triangles keep their original winding.
///
/// # Errors
///
/// `InvalidOperation` when a triangle references a missing vertex.
///
/// # Example
///
/// ```rust
/// use lane_mesh::geometry::weld_vertices;
/// use glam::DVec3;
///
/// let vertices = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 1.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ];
/// let triangles = [[0, 1, 2], [3, 4, 5]];
/// let (welded, tris) = weld_vertices(&vertices, &triangles, 0.01).unwrap();
/// assert_eq!(welded.len(), 4);
/// assert_eq!(tris, vec![[0, 1, 2], [1, 3, 2]]);
/// ```
pub fn weld_vertices(
    vertices: &[DVec3],
    triangles: &[[u32; 3]],
    threshold: f64,
) -> MeshResult<(Vec<DVec3>, Vec<[u32; 3]>)> {
    check_indices(vertices.len(), triangles)?;

    let mut welded: Vec<DVec3> = Vec::with_capacity(vertices.len());
    let remap: Vec<u32> = vertices
        .iter()
        .map(|&v| {
            let existing = welded.iter().position(|&w| v.distance(w) < threshold);
            match existing {
                Some(index) => index as u32,
                None => {
                    welded.push(v);
                    (welded.len() - 1) as u32
                }
            }
        })
        .collect();

    let mut present: HashSet<[u32; 3]> = HashSet::with_capacity(triangles.len());
    let mut kept = Vec::with_capacity(triangles.len());
    let mut dropped = 0usize;

    for tri in triangles {
        let [a, b, c] = tri.map(|i| remap[i as usize]);

        if a == b || b == c || a == c {
            dropped += 1;
            continue;
        }

        let mut key = [a, b, c];
        key.sort_unstable();
        if !present.insert(key) {
            dropped += 1;
            continue;
        }

        kept.push([a, b, c]);
    }

    log::debug!(
        "weld: {} -> {} vertices, {} triangles dropped",
        vertices.len(),
        welded.len(),
        dropped
    );

    Ok((welded, kept))
}
