//! Heuristic ranking score for keyword clusters.

/// Volume at which the volume term saturates.
const VOLUME_SATURATION: f64 = 100_000.0;
/// Cluster size at which the breadth term saturates.
const BREADTH_SATURATION: f64 = 20.0;

const VOLUME_WEIGHT: f64 = 40.0;
const DIFFICULTY_WEIGHT: f64 = 30.0;
const COMPETITION_WEIGHT: f64 = 20.0;
const BREADTH_WEIGHT: f64 = 10.0;

/// Score a cluster. Higher is better; the maximum is `100.0`.
///
/// `difficulty` and `competition` are expected in `[0, 1]` and are clamped
/// to it; each term is capped before weighting so no single dimension can
/// dominate through extreme values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster_score(volume: u64, difficulty: f64, competition: f64, keyword_count: usize) -> f64 {
    let volume_term = (volume as f64 / VOLUME_SATURATION).min(1.0);
    let difficulty_term = 1.0 - clamp_unit(difficulty);
    let competition_term = 1.0 - clamp_unit(competition);
    let breadth_term = (keyword_count as f64 / BREADTH_SATURATION).min(1.0);

    volume_term * VOLUME_WEIGHT
        + difficulty_term * DIFFICULTY_WEIGHT
        + competition_term * COMPETITION_WEIGHT
        + breadth_term * BREADTH_WEIGHT
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn all_terms_maxed_scores_one_hundred() {
        assert!(approx(cluster_score(100_000, 0.0, 0.0, 20), 100.0));
    }

    #[test]
    fn volume_and_breadth_saturate() {
        assert!(approx(
            cluster_score(5_000_000, 0.0, 0.0, 500),
            cluster_score(100_000, 0.0, 0.0, 20)
        ));
    }

    #[test]
    fn worst_case_scores_zero() {
        assert!(approx(cluster_score(0, 1.0, 1.0, 0), 0.0));
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert!(approx(cluster_score(0, 2.0, -1.0, 0), 20.0));
    }

    #[test]
    fn mid_range_mix() {
        // 0.5*40 + 0.34*30 + 0.6*20 + 0.25*10
        let score = cluster_score(50_000, 0.66, 0.4, 5);
        assert!(approx(score, 20.0 + 10.2 + 12.0 + 2.5), "got {score}");
    }
}
