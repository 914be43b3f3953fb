//! Outcome probability model.
//!
//! Two team profiles go in; sixteen market percentages, a best pick and a
//! one-line rationale come out.  The home side's rating is scaled by its home
//! advantage and the rating gap picks one of seven 1X2 buckets.  Goal markets
//! key off an expected-goals figure, taken from real goal rates when both
//! teams have them and from attack ratings otherwise.
//!
//! Invariants (hold for both variants):
//! - `1 + X + 2 == 100`
//! - `1X == 1 + X`, `X2 == X + 2`, `12 == 1 + 2`
//! - `Over + Under == 100` per line, `GG + NG == 100`

use rand::Rng;
use serde::Serialize;

use super::profile::{round_to, TeamProfile};
use crate::config::ModelVariant;

/// Home multiplier when the profile carries none.
pub const DEFAULT_HOME_ADVANTAGE: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Market {
    #[serde(rename = "1X2")]
    OneXTwo,
    #[serde(rename = "Double Chance")]
    DoubleChance,
    #[serde(rename = "Over/Under")]
    OverUnder,
    #[serde(rename = "Goal/No Goal")]
    GoalNoGoal,
}

/// One market outcome with its percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketPrediction {
    pub label: &'static str,
    pub code: &'static str,
    pub probability: u8,
    pub market: Market,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub expected_goals: f64,
    pub home_strength: f64,
    pub away_strength: f64,
    pub home_form: f64,
    pub away_form: f64,
    pub home_attack: f64,
    pub away_attack: f64,
    pub strength_diff: f64,
}

/// Everything attached to a fixture as `aiPronostico`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub best: MarketPrediction,
    pub all: Vec<MarketPrediction>,
    pub reasoning: String,
    pub confidence: u8,
    pub stats: PredictionStats,
}

// ── 1X2 buckets ──────────────────────────────────────────────────────────────

/// Percentage for one leg: `base + r * spread` (jittered) or `fixed`.
#[derive(Debug, Clone, Copy)]
struct Leg {
    base: f64,
    spread: f64,
    fixed: u8,
}

const fn leg(base: f64, spread: f64, fixed: u8) -> Leg {
    Leg { base, spread, fixed }
}

/// Home-win and away-win legs per rating-gap bucket; the draw is the remainder.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    home: Leg,
    away: Leg,
}

const HOME_DOMINANT: Bucket = Bucket { home: leg(70.0, 15.0, 77), away: leg(5.0, 10.0, 8) };
const HOME_STRONGER: Bucket = Bucket { home: leg(55.0, 15.0, 62), away: leg(10.0, 15.0, 17) };
const HOME_EDGE: Bucket = Bucket { home: leg(40.0, 15.0, 47), away: leg(20.0, 15.0, 27) };
const AWAY_DOMINANT: Bucket = Bucket { home: leg(5.0, 10.0, 8), away: leg(70.0, 15.0, 77) };
const AWAY_STRONGER: Bucket = Bucket { home: leg(10.0, 15.0, 17), away: leg(55.0, 15.0, 62) };
const AWAY_EDGE: Bucket = Bucket { home: leg(20.0, 15.0, 27), away: leg(40.0, 15.0, 47) };
const BALANCED: Bucket = Bucket { home: leg(30.0, 20.0, 40), away: leg(25.0, 20.0, 35) };

fn bucket_for(diff: f64) -> Bucket {
    if diff > 3.5 {
        HOME_DOMINANT
    } else if diff > 2.0 {
        HOME_STRONGER
    } else if diff > 0.5 {
        HOME_EDGE
    } else if diff < -3.5 {
        AWAY_DOMINANT
    } else if diff < -2.0 {
        AWAY_STRONGER
    } else if diff < -0.5 {
        AWAY_EDGE
    } else {
        BALANCED
    }
}

// ── Goal lines ───────────────────────────────────────────────────────────────

struct GoalLine {
    over_code: &'static str,
    over_label: &'static str,
    under_code: &'static str,
    under_label: &'static str,
    /// Expected goals above which the Over is favoured.
    threshold: f64,
    high: Leg,
    low: Leg,
}

const GOAL_LINES: [GoalLine; 4] = [
    GoalLine {
        over_code: "O0.5",
        over_label: "Over 0.5 Goals",
        under_code: "U0.5",
        under_label: "Under 0.5 Goals",
        threshold: 1.0,
        high: leg(80.0, 15.0, 87),
        low: leg(60.0, 20.0, 70),
    },
    GoalLine {
        over_code: "O1.5",
        over_label: "Over 1.5 Goals",
        under_code: "U1.5",
        under_label: "Under 1.5 Goals",
        threshold: 1.8,
        high: leg(70.0, 15.0, 77),
        low: leg(40.0, 20.0, 50),
    },
    GoalLine {
        over_code: "O2.5",
        over_label: "Over 2.5 Goals",
        under_code: "U2.5",
        under_label: "Under 2.5 Goals",
        threshold: 2.5,
        high: leg(60.0, 15.0, 67),
        low: leg(25.0, 20.0, 35),
    },
    GoalLine {
        over_code: "O3.5",
        over_label: "Over 3.5 Goals",
        under_code: "U3.5",
        under_label: "Under 3.5 Goals",
        threshold: 3.2,
        high: leg(50.0, 15.0, 57),
        low: leg(15.0, 15.0, 22),
    },
];

const BOTH_SCORE_LIKELY: Leg = leg(70.0, 15.0, 77);
const BOTH_SCORE_OPEN: Leg = leg(45.0, 25.0, 57);
/// Mean attack rating above which both sides are expected to score.
const BOTH_SCORE_ATTACK: f64 = 7.0;
/// Goals per game both sides must exceed for the same call from real rates.
const BOTH_SCORE_RATE: f64 = 1.2;

// ── Model ────────────────────────────────────────────────────────────────────

/// The prediction engine.  Holds only its variant; all state comes in per call.
#[derive(Debug, Clone, Copy)]
pub struct Predictor {
    variant: ModelVariant,
}

impl Predictor {
    pub fn new(variant: ModelVariant) -> Self {
        Predictor { variant }
    }

    fn pct<R: Rng>(&self, leg: Leg, rng: &mut R) -> u8 {
        match self.variant {
            ModelVariant::Fixed => leg.fixed,
            ModelVariant::Jittered => {
                let v = leg.base + rng.gen::<f64>() * leg.spread;
                v.round().clamp(0.0, 100.0) as u8
            }
        }
    }

    /// Expected total goals for the fixture.
    fn expected_goals<R: Rng>(&self, home: &TeamProfile, away: &TeamProfile, rng: &mut R) -> f64 {
        if let (Some((home_for, home_against)), Some((away_for, away_against))) =
            (home.goal_rates(), away.goal_rates())
        {
            return (home_for + away_against) / 2.0 + (away_for + home_against) / 2.0;
        }

        let avg_attack = (home.attack_or_strength() + away.attack_or_strength()) / 2.0;
        match self.variant {
            ModelVariant::Fixed => avg_attack,
            ModelVariant::Jittered => avg_attack * rng.gen_range(0.6..=1.4),
        }
    }

    fn both_teams_score_likely(home: &TeamProfile, away: &TeamProfile) -> bool {
        if let (Some((home_for, _)), Some((away_for, _))) = (home.goal_rates(), away.goal_rates()) {
            return home_for > BOTH_SCORE_RATE && away_for > BOTH_SCORE_RATE;
        }
        (home.attack_or_strength() + away.attack_or_strength()) / 2.0 > BOTH_SCORE_ATTACK
    }

    /// Score one fixture.
    pub fn predict<R: Rng>(
        &self,
        home_name: &str,
        away_name: &str,
        home: &TeamProfile,
        away: &TeamProfile,
        rng: &mut R,
    ) -> PredictionResult {
        let home_eff =
            (home.strength + home.form) * home.home_advantage.unwrap_or(DEFAULT_HOME_ADVANTAGE);
        let away_eff = away.strength + away.form;
        let diff = home_eff - away_eff;

        let bucket = bucket_for(diff);
        let p1 = self.pct(bucket.home, rng);
        let p2 = self.pct(bucket.away, rng);
        // Paired legs never sum past 100.
        let px = 100u8.saturating_sub(p1).saturating_sub(p2);

        let mut all = vec![
            outcome("1 (Home Win)", "1", p1, Market::OneXTwo),
            outcome("X (Draw)", "X", px, Market::OneXTwo),
            outcome("2 (Away Win)", "2", p2, Market::OneXTwo),
            outcome("1X (Home or Draw)", "1X", p1 + px, Market::DoubleChance),
            outcome("X2 (Draw or Away)", "X2", px + p2, Market::DoubleChance),
            outcome("12 (Home or Away)", "12", p1 + p2, Market::DoubleChance),
        ];

        let xg = self.expected_goals(home, away, rng);
        for line in &GOAL_LINES {
            let over = if xg > line.threshold {
                self.pct(line.high, rng)
            } else {
                self.pct(line.low, rng)
            };
            all.push(outcome(line.over_label, line.over_code, over, Market::OverUnder));
            all.push(outcome(line.under_label, line.under_code, 100 - over, Market::OverUnder));
        }

        let goal = if Self::both_teams_score_likely(home, away) {
            self.pct(BOTH_SCORE_LIKELY, rng)
        } else {
            self.pct(BOTH_SCORE_OPEN, rng)
        };
        all.push(outcome("Goal (Both Teams Score)", "GG", goal, Market::GoalNoGoal));
        all.push(outcome("No Goal (Not Both Score)", "NG", 100 - goal, Market::GoalNoGoal));

        let best = best_pick(&all)
            .cloned()
            .unwrap_or_else(|| outcome("1 (Home Win)", "1", p1, Market::OneXTwo));
        let reasoning = reasoning(diff, home_name, away_name, home, away, &best);

        PredictionResult {
            confidence: best.probability,
            best,
            all,
            reasoning,
            stats: PredictionStats {
                expected_goals: round_to(xg, 2),
                home_strength: home.strength,
                away_strength: away.strength,
                home_form: home.form,
                away_form: away.form,
                home_attack: home.attack_or_strength(),
                away_attack: away.attack_or_strength(),
                strength_diff: round_to(diff, 2),
            },
        }
    }
}

fn outcome(label: &'static str, code: &'static str, probability: u8, market: Market) -> MarketPrediction {
    MarketPrediction {
        label,
        code,
        probability,
        market,
    }
}

/// Highest probability; the earliest entry wins a tie.
pub fn best_pick(all: &[MarketPrediction]) -> Option<&MarketPrediction> {
    let (first, rest) = all.split_first()?;
    Some(rest.iter().fold(first, |best, cur| {
        if cur.probability > best.probability {
            cur
        } else {
            best
        }
    }))
}

fn reasoning(
    diff: f64,
    home_name: &str,
    away_name: &str,
    home: &TeamProfile,
    away: &TeamProfile,
    best: &MarketPrediction,
) -> String {
    if diff > 2.0 {
        format!(
            "{} much stronger ({}/10 vs {}/10). Home advantage should decide it",
            home_name, home.strength, away.strength
        )
    } else if diff < -2.0 {
        format!(
            "{} superior ({}/10 vs {}/10). Strong enough to overcome playing away",
            away_name, away.strength, home.strength
        )
    } else {
        let market = match best.market {
            Market::OneXTwo => "1X2",
            Market::DoubleChance => "Double Chance",
            Market::OverUnder => "Over/Under",
            Market::GoalNoGoal => "Goal/No Goal",
        };
        format!(
            "Balanced match. {}: {}/10, {}: {}/10. {} market recommended",
            home_name, home.strength, away_name, away.strength, market
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::profile::ProfileSource;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile(strength: f64, form: f64, attack: f64) -> TeamProfile {
        TeamProfile {
            strength,
            form,
            attack: Some(attack),
            defense: Some(6.0),
            home_advantage: None,
            avg_goals_for: None,
            avg_goals_against: None,
            source: ProfileSource::Table,
        }
    }

    fn with_rates(mut p: TeamProfile, gf: f64, ga: f64) -> TeamProfile {
        p.avg_goals_for = Some(gf);
        p.avg_goals_against = Some(ga);
        p.home_advantage = Some(1.1);
        p
    }

    fn prob(result: &PredictionResult, code: &str) -> u8 {
        result
            .all
            .iter()
            .find(|m| m.code == code)
            .map(|m| m.probability)
            .unwrap_or_else(|| panic!("missing market {}", code))
    }

    fn assert_invariants(r: &PredictionResult) {
        assert_eq!(r.all.len(), 16);
        let (p1, px, p2) = (prob(r, "1") as u32, prob(r, "X") as u32, prob(r, "2") as u32);
        assert_eq!(p1 + px + p2, 100);
        assert_eq!(prob(r, "1X") as u32, p1 + px);
        assert_eq!(prob(r, "X2") as u32, px + p2);
        assert_eq!(prob(r, "12") as u32, p1 + p2);
        for line in ["0.5", "1.5", "2.5", "3.5"] {
            let over = prob(r, &format!("O{}", line)) as u32;
            let under = prob(r, &format!("U{}", line)) as u32;
            assert_eq!(over + under, 100, "line {}", line);
        }
        assert_eq!(prob(r, "GG") as u32 + prob(r, "NG") as u32, 100);

        let max = r.all.iter().map(|m| m.probability).max().unwrap();
        assert_eq!(r.best.probability, max);
        assert_eq!(r.confidence, max);
    }

    /// Profiles spanning every 1X2 bucket.
    fn profile_grid() -> Vec<(TeamProfile, TeamProfile)> {
        let ratings = [1.0, 3.0, 5.0, 6.5, 8.0, 10.0];
        let mut pairs = Vec::new();
        for &h in &ratings {
            for &a in &ratings {
                pairs.push((profile(h, h, h), profile(a, a, a)));
            }
        }
        pairs
    }

    #[test]
    fn fixed_variant_invariants_hold_everywhere() {
        let model = Predictor::new(ModelVariant::Fixed);
        let mut rng = StepRng::new(0, 0);
        for (home, away) in profile_grid() {
            let r = model.predict("Home", "Away", &home, &away, &mut rng);
            assert_invariants(&r);
        }
    }

    #[test]
    fn jittered_variant_invariants_hold_everywhere() {
        let model = Predictor::new(ModelVariant::Jittered);
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..20 {
            for (home, away) in profile_grid() {
                let r = model.predict("Home", "Away", &home, &away, &mut rng);
                assert_invariants(&r);
            }
        }
    }

    #[test]
    fn fixed_variant_is_deterministic() {
        let model = Predictor::new(ModelVariant::Fixed);
        let home = profile(9.5, 9.0, 8.8);
        let away = profile(6.2, 6.0, 6.0);
        let a = model.predict("A", "B", &home, &away, &mut StdRng::seed_from_u64(1));
        let b = model.predict("A", "B", &home, &away, &mut StdRng::seed_from_u64(2));
        assert_eq!(a.all, b.all);
    }

    #[test]
    fn strong_home_side_lands_in_dominant_bucket() {
        // (9.5+9.0)*1.15 = 21.275 vs 12.2 → diff 9.075
        let model = Predictor::new(ModelVariant::Fixed);
        let r = model.predict(
            "Manchester City",
            "West Ham United",
            &profile(9.5, 9.0, 8.8),
            &profile(6.2, 6.0, 6.0),
            &mut StepRng::new(0, 0),
        );
        assert_eq!(prob(&r, "1"), 77);
        assert_eq!(prob(&r, "2"), 8);
        assert_eq!(prob(&r, "X"), 15);
        assert_eq!(r.best.code, "1X");
        assert_eq!(r.best.probability, 92);
        assert!(r.reasoning.starts_with("Manchester City much stronger"));
    }

    #[test]
    fn strong_away_side_lands_in_away_bucket() {
        // (5+5)*1.15 = 11.5 vs 18.5 → diff -7
        let model = Predictor::new(ModelVariant::Fixed);
        let r = model.predict(
            "Minnows",
            "Giants",
            &profile(5.0, 5.0, 5.0),
            &profile(9.5, 9.0, 9.0),
            &mut StepRng::new(0, 0),
        );
        assert_eq!(prob(&r, "2"), 77);
        assert_eq!(prob(&r, "1"), 8);
        assert!(r.reasoning.starts_with("Giants superior"));
    }

    #[test]
    fn balanced_match_names_the_winning_market() {
        // 8*1.15 = 9.2 vs 9.0 → diff 0.2
        let model = Predictor::new(ModelVariant::Fixed);
        let r = model.predict(
            "Home",
            "Away",
            &profile(4.0, 4.0, 4.0),
            &profile(4.5, 4.5, 4.0),
            &mut StepRng::new(0, 0),
        );
        assert_eq!((prob(&r, "1"), prob(&r, "X"), prob(&r, "2")), (40, 25, 35));
        // xg 4.0 clears every line; O0.5 at 87 beats 1X (65) and 12 (75).
        assert_eq!(r.best.code, "O0.5");
        assert!(r.reasoning.contains("Over/Under market recommended"));
    }

    #[test]
    fn tie_goes_to_first_entry() {
        let all = vec![
            outcome("a", "A", 60, Market::OneXTwo),
            outcome("b", "B", 70, Market::OneXTwo),
            outcome("c", "C", 70, Market::OverUnder),
        ];
        assert_eq!(best_pick(&all).map(|m| m.code), Some("B"));
    }

    #[test]
    fn no_markets_no_pick() {
        assert!(best_pick(&[]).is_none());
    }

    #[test]
    fn jitter_at_zero_gives_bucket_base() {
        let model = Predictor::new(ModelVariant::Jittered);
        let r = model.predict(
            "H",
            "A",
            &profile(9.5, 9.0, 8.8),
            &profile(6.2, 6.0, 6.0),
            &mut StepRng::new(0, 0),
        );
        assert_eq!(prob(&r, "1"), 70);
        assert_eq!(prob(&r, "2"), 5);
        assert_eq!(prob(&r, "X"), 25);
    }

    #[test]
    fn goal_rates_drive_expected_goals() {
        let model = Predictor::new(ModelVariant::Fixed);
        let home = with_rates(profile(6.0, 6.0, 6.0), 1.0, 0.8);
        let away = with_rates(profile(6.0, 6.0, 6.0), 0.9, 1.0);
        let r = model.predict("H", "A", &home, &away, &mut StepRng::new(0, 0));
        // (1.0+1.0)/2 + (0.9+0.8)/2 = 1.85
        assert!((r.stats.expected_goals - 1.85).abs() < 1e-9);
        assert_eq!(prob(&r, "O1.5"), 77);
        assert_eq!(prob(&r, "O2.5"), 35);
        // Neither side averages over 1.2 goals.
        assert_eq!(prob(&r, "GG"), 57);
        assert_eq!(prob(&r, "NG"), 43);
    }

    #[test]
    fn high_scoring_sides_favour_goal() {
        let model = Predictor::new(ModelVariant::Fixed);
        let home = with_rates(profile(7.0, 7.0, 7.0), 2.1, 1.3);
        let away = with_rates(profile(7.0, 7.0, 7.0), 1.8, 1.4);
        let r = model.predict("H", "A", &home, &away, &mut StepRng::new(0, 0));
        assert_eq!(prob(&r, "GG"), 77);
        assert_eq!(prob(&r, "O3.5"), 57);
    }

    #[test]
    fn profile_home_advantage_overrides_default() {
        let model = Predictor::new(ModelVariant::Fixed);
        let mut home = profile(5.0, 5.0, 5.0);
        home.home_advantage = Some(1.0);
        let r = model.predict("H", "A", &home, &profile(5.0, 5.0, 5.0), &mut StepRng::new(0, 0));
        assert!((r.stats.strength_diff).abs() < 1e-9);
    }

    #[test]
    fn result_serializes_with_expected_shape() {
        let model = Predictor::new(ModelVariant::Fixed);
        let r = model.predict(
            "H",
            "A",
            &profile(7.0, 7.0, 7.0),
            &profile(7.0, 7.0, 7.0),
            &mut StepRng::new(0, 0),
        );
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["all"].as_array().unwrap().len(), 16);
        assert_eq!(v["all"][3]["market"], "Double Chance");
        assert!(v["stats"]["expectedGoals"].is_number());
        assert_eq!(v["confidence"], v["best"]["probability"]);
    }
}
