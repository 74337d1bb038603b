//! Straight-line pointer glide planning.

use std::time::Duration;

use crate::geom::Point;

/// Upper bound on the frames of one glide. Longer glides use wider steps.
pub const MAX_GLIDE_FRAMES: usize = 4096;

/// How long a glide from `from` to `to` takes, in seconds.
///
/// Zero when the points coincide. Not finite or negative when the speed is
/// unusable.
pub fn glide_seconds(from: Point, to: Point, pixels_per_second: f64) -> f64 {
    let distance = from.distance(to);
    if distance == 0.0 {
        return 0.0;
    }
    distance / pixels_per_second
}

/// Intermediate pointer positions for a glide lasting `seconds`.
///
/// Frame `i` sits at offset `i * step` and proportion `offset / seconds`
/// along the line, so the target itself is never among the frames; the
/// caller finishes with an exact move. The step is widened as needed to stay
/// within [`MAX_GLIDE_FRAMES`].
pub fn glide_frames(from: Point, to: Point, seconds: f64, step: Duration) -> Vec<(Duration, Point)> {
    if !seconds.is_finite() || seconds <= 0.0 || step.is_zero() {
        return Vec::new();
    }
    let step_s = step.as_secs_f64().max(seconds / MAX_GLIDE_FRAMES as f64);
    let count = (seconds / step_s).ceil().min(MAX_GLIDE_FRAMES as f64) as usize;
    (0..count)
        .map(|i| {
            let s = step_s * i as f64;
            (Duration::from_secs_f64(s), from.lerp(to, s / seconds))
        })
        .collect()
}
