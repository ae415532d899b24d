//! Probability model
//!
//! Every curve here has the form `p(r) = 1 - c^(-r)` with `c >= 1`. That is
//! the general solution of `p(0) = 0`, `p(inf) = 1` and
//! `p(2r) = 2p(r) - p(r)^2`: doubling the ratio must be worth the same as
//! fighting the same battle twice. Picking a curve means picking `c`, which
//! designers do by choosing the probability at ratio 1.
//!
//! Degenerate ratios are handled explicitly rather than left to IEEE:
//! - attack 0 gives ratio 0 (no effect), whatever the defense
//! - positive attack against defense 0 gives an infinite ratio (certain effect)

/// Probability that at least one of two independent events happens
pub fn union_probability(a: f64, b: f64) -> f64 {
    a + b - a * b
}

/// Strength ratio, with `0/0 = 0` and `x/0 = inf`
pub fn combat_ratio(attack: f64, defense: f64) -> f64 {
    if attack <= 0.0 {
        0.0
    } else if defense <= 0.0 {
        f64::INFINITY
    } else {
        attack / defense
    }
}

/// `1 - base^(-ratio)`
///
/// An infinite base or ratio means certainty as soon as the other term is
/// positive; `base <= 1` or `ratio <= 0` means the event never happens.
pub fn exponential_probability(ratio: f64, base: f64) -> f64 {
    if ratio <= 0.0 || base <= 1.0 || ratio.is_nan() || base.is_nan() {
        return 0.0;
    }
    if ratio.is_infinite() || base.is_infinite() {
        return 1.0;
    }
    (1.0 - base.powf(-ratio)).clamp(0.0, 1.0)
}

/// The base `c` of the curve whose value at ratio 1 is `p1`
pub fn base_for_probability_at_ratio_1(p1: f64) -> f64 {
    if p1 >= 1.0 {
        f64::INFINITY
    } else {
        1.0 / (1.0 - p1)
    }
}

/// Probability of the defender losing at least `strength_points`
///
/// `c(s) = coefficient/s + 1`, so the more points at stake the flatter the
/// curve. Zero points are always lost.
pub fn land_defender_loss_probability(ratio: f64, strength_points: u32, coefficient: f64) -> f64 {
    if strength_points == 0 {
        return 1.0;
    }
    exponential_probability(ratio, coefficient / strength_points as f64 + 1.0)
}

/// Probability of the attacker losing at least `strength_points`
///
/// Independent of the ratio: `1/(1+s)`, nothing beyond `max_loss`, nothing
/// at all against an undefended hex.
pub fn land_attacker_loss_probability(strength_points: u32, max_loss: u32, modified_defense: f64) -> f64 {
    if strength_points > max_loss || modified_defense <= 0.0 {
        return 0.0;
    }
    (1.0 / (1.0 + strength_points as f64)).clamp(0.0, 1.0)
}

/// Probability of the whole attacking force being destroyed
///
/// Only possible when attacking at worse than even odds.
pub fn land_attacker_elimination_probability(ratio: f64, modified_defense: f64) -> f64 {
    if modified_defense <= 0.0 {
        return 0.0;
    }
    (1.0 - ratio).clamp(0.0, 1.0)
}

/// Air/naval damage or elimination probability for one unit
///
/// `enemy_strength` is spread over `unit_count` units of `own_defense`
/// each, `p1` is the probability at ratio 1.
pub fn damage_or_elimination_probability(enemy_strength: f64, own_defense: f64, unit_count: usize, p1: f64) -> f64 {
    let ratio = combat_ratio(enemy_strength, own_defense * unit_count as f64);
    exponential_probability(ratio, base_for_probability_at_ratio_1(p1))
}

/// Probability of an air mission being canceled or a fleet retreating
pub fn cancel_or_retreat_probability(ratio: f64, p1: f64) -> f64 {
    exponential_probability(ratio, base_for_probability_at_ratio_1(p1))
}

/// Probability of a conventional bombing run succeeding
///
/// `even_odds_strength` of modified bomber strength gives exactly 50%.
pub fn bombing_success_probability(modified_attack: f64, even_odds_strength: f64) -> f64 {
    exponential_probability(combat_ratio(modified_attack, even_odds_strength), 2.0)
}

/// Probability of a country surrendering after an atomic strike
pub fn atomic_surrender_probability(country_modifier: f64, occupied_modifier: f64, prior_bombs: u32) -> f64 {
    exponential_probability(country_modifier * occupied_modifier * (1.0 + prior_bombs as f64), 2.0)
}

/// Inverse-CDF sampling over a survival function
///
/// `probability(s)` is the chance of losing at least `s` points. Returns the
/// largest `s` in `1..=max` with `draw < probability(s)`, scanning downward,
/// or 0 if there is none.
pub fn sample_threshold<F>(draw: f64, max: u32, probability: F) -> u32
where
    F: Fn(u32) -> f64,
{
    (1..=max).rev().find(|&s| draw < probability(s)).unwrap_or(0)
}
