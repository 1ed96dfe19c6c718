use glam::DVec3;

/// Map a geographic coordinate onto a sphere of the given radius.
///
/// Scene convention: +Y is the north pole and longitude is offset by 180°,
/// so (0°, 0°) lands on -X. Grid lines, coastlines and arc endpoints all go
/// through this function and therefore stay aligned.
#[inline(always)]
pub fn project(lat: f64, lon: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    DVec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`project`]: recover (lat, lon) in degrees from a scene point.
/// The origin maps to (0, 0).
pub fn unproject(p: DVec3) -> (f64, f64) {
    let len = p.length();
    if len < f64::EPSILON {
        return (0.0, 0.0);
    }
    let lat = 90.0 - (p.y / len).clamp(-1.0, 1.0).acos().to_degrees();
    let lon = normalize_lon(p.z.atan2(p.x).to_degrees() - 180.0);
    (lat, lon)
}

/// Wrap longitude into [-180, 180)
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Index of the region bucket containing `value`.
/// Halves round toward +∞, so -7.5 with 15° buckets lands in bucket 0.
#[inline(always)]
pub fn bucket_index(value: f64, bucket_degrees: f64) -> i64 {
    (value / bucket_degrees + 0.5).floor() as i64
}

/// Snap a coordinate to the centre of its region bucket.
#[inline(always)]
pub fn bucket(value: f64, bucket_degrees: f64) -> f64 {
    bucket_index(value, bucket_degrees) as f64 * bucket_degrees
}
