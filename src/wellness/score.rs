//! Wellness score computation
//!
//! Pure functions from raw signal measurements to bounded scores. All
//! outputs are clamped: callers can rely on [0, 1] channel scores and
//! [0, 100] final scores for any input, including degenerate ones.

use crate::config::WellnessConfig;
use crate::wellness::model::{
    FaceMesh, INNER_BROW_LEFT, INNER_BROW_RIGHT, LOWER_LIP, UPPER_LIP,
};

/// Brow-furrow channel: closer inner eyebrows read as higher furrow
///
/// 0 at or beyond the relaxed distance, 1 at zero distance.
#[must_use]
pub fn brow_furrow(distance: f32, relaxed_distance: f32) -> f32 {
    (1.0 - distance / relaxed_distance).clamp(0.0, 1.0)
}

/// Jaw-tension channel: a narrower lip gap reads as a clenched jaw
///
/// 0 at or beyond the relaxed gap, 1 at zero gap.
#[must_use]
pub fn jaw_tension(gap: f32, relaxed_gap: f32) -> f32 {
    (1.0 - gap.abs() / relaxed_gap).clamp(0.0, 1.0)
}

/// Combine the two facial channels into a stress score
///
/// Brow furrow is the stronger indicator and carries the larger weight.
#[must_use]
pub fn stress_score(furrow: f32, tension: f32, config: &WellnessConfig) -> f32 {
    (100.0 * (config.furrow_weight * furrow + config.tension_weight * tension)).clamp(0.0, 100.0)
}

/// Stress score for one detected face mesh
///
/// Returns 0 when the mesh is missing any of the four reference keypoints.
#[must_use]
pub fn stress_from_mesh(mesh: &FaceMesh, config: &WellnessConfig) -> f32 {
    let (Some(brow_left), Some(brow_right), Some(lip_upper), Some(lip_lower)) = (
        mesh.keypoint(INNER_BROW_LEFT),
        mesh.keypoint(INNER_BROW_RIGHT),
        mesh.keypoint(UPPER_LIP),
        mesh.keypoint(LOWER_LIP),
    ) else {
        return 0.0;
    };

    let brow_distance =
        (brow_left.x - brow_right.x).hypot(brow_left.y - brow_right.y);
    let lip_gap = lip_upper.y - lip_lower.y;

    stress_score(
        brow_furrow(brow_distance, config.brow_relaxed_distance),
        jaw_tension(lip_gap, config.lip_relaxed_gap),
        config,
    )
}

/// Fatigue score from the byte-scaled magnitude spectrum
///
/// Averages the lower half of the bin range (the band most representative
/// of voiced speech) and inverts against the healthy reference level: a
/// quieter, flatter voice scores higher.
#[must_use]
pub fn fatigue_score(spectrum: &[f32], reference_level: f32) -> f32 {
    let half = spectrum.len() / 2;
    if half == 0 {
        return 100.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let average = spectrum[..half].iter().sum::<f32>() / half as f32;

    ((1.0 - average / reference_level) * 100.0).clamp(0.0, 100.0)
}
