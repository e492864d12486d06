/// Empirical-Bayes smoothing and the lift/volume score shared by both
/// matrices.
///
/// Raw pair win rates are noisy at low sample sizes, so every pair is
/// shrunk toward a prior win rate weighted by `alpha` pseudo-games:
/// `smoothed = (wins + prior * alpha) / (games + alpha)`. The score then
/// rewards both win-rate lift over a hero's baseline and sample volume,
/// with a log on volume so one heavy pair cannot drown the ranking:
/// `score = w_lift * lift + w_vol * log10(games + 1)`.

/// Smoothing and scoring knobs for one matrix kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindParams {
    /// Prior win rate the smoothing shrinks toward.
    pub prior: f64,
    /// Pseudo-game count backing the prior. Must be positive.
    pub alpha: f64,
    pub w_lift: f64,
    pub w_vol: f64,
}

/// Parameter sets for the opponent (VS) and ally (WITH) matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formula {
    pub vs: KindParams,
    pub with: KindParams,
}

impl Default for Formula {
    fn default() -> Self {
        Formula {
            vs: KindParams {
                prior: 0.50,
                alpha: 400.0,
                w_lift: 100.0,
                w_vol: 8.0,
            },
            with: KindParams {
                prior: 0.52,
                alpha: 400.0,
                w_lift: 100.0,
                w_vol: 8.0,
            },
        }
    }
}

/// Smoothed win rate for a raw (wins, games) pair. Safe for games == 0
/// because alpha > 0.
pub fn eb_smooth(wins: u32, games: u32, prior: f64, alpha: f64) -> f64 {
    (wins as f64 + prior * alpha) / (games as f64 + alpha)
}

/// Pair score from lift and sample volume.
pub fn pair_score(lift: f64, games: u32, params: &KindParams) -> f64 {
    params.w_lift * lift + params.w_vol * ((games as f64) + 1.0).log10()
}
