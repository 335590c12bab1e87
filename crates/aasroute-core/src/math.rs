//! Minimal vector helpers for travel-time estimation.

/// A point or direction in world space.
pub type Vec3 = [f32; 3];

/// Euclidean distance between two points.
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Whether two axis-aligned boxes overlap (touching counts).
pub fn boxes_intersect(mins_a: &Vec3, maxs_a: &Vec3, mins_b: &Vec3, maxs_b: &Vec3) -> bool {
    (0..3).all(|i| mins_a[i] <= maxs_b[i] && maxs_a[i] >= mins_b[i])
}

/// Whether `point` lies inside the box `[mins, maxs]`.
pub fn box_contains(mins: &Vec3, maxs: &Vec3, point: &Vec3) -> bool {
    (0..3).all(|i| point[i] >= mins[i] && point[i] <= maxs[i])
}
