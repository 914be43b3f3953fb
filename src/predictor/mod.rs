pub mod model;
pub mod names;
pub mod profile;
pub mod standings;

pub use model::{PredictionResult, Predictor};
pub use profile::ProfileResolver;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use crate::config::ModelVariant;
use crate::football_data::models::Fixture;

/// An upstream fixture with its prediction attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFixture {
    #[serde(flatten)]
    pub fixture: Fixture,
    #[serde(rename = "aiPronostico")]
    pub prediction: PredictionResult,
}

/// Resolves both teams of each fixture and runs the model over them.
#[derive(Clone)]
pub struct PredictionEngine {
    resolver: ProfileResolver,
    model: Predictor,
    seed: Option<u64>,
}

impl PredictionEngine {
    pub fn new(resolver: ProfileResolver, variant: ModelVariant, seed: Option<u64>) -> Self {
        PredictionEngine {
            resolver,
            model: Predictor::new(variant),
            seed,
        }
    }

    /// Random source for one request: seeded when configured, otherwise fresh.
    fn request_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Score fixtures in order.  Team lookups may hit the standings cache (and
    /// through it, upstream), one fixture at a time.
    pub async fn score_all(&self, fixtures: Vec<Fixture>) -> Vec<ScoredFixture> {
        let mut rng = self.request_rng();
        let mut scored = Vec::with_capacity(fixtures.len());

        for fixture in fixtures {
            let competition = fixture.competition_id();
            let home_name = fixture.home_team.display_name().to_string();
            let away_name = fixture.away_team.display_name().to_string();

            // Undecided sides get no standings lookup.
            let home_competition = competition.filter(|_| fixture.home_team.is_known());
            let away_competition = competition.filter(|_| fixture.away_team.is_known());

            let home = self.resolver.resolve(&home_name, home_competition, &mut rng).await;
            let away = self.resolver.resolve(&away_name, away_competition, &mut rng).await;
            let prediction = self.model.predict(&home_name, &away_name, &home, &away, &mut rng);

            debug!(
                "{} vs {} ({}): {} {}%",
                home_name,
                away_name,
                fixture.competition_name(),
                prediction.best.code,
                prediction.best.probability
            );
            scored.push(ScoredFixture {
                fixture,
                prediction,
            });
        }

        scored
    }
}
