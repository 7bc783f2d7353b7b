//! Genetic strategy parameters.

use crate::param::{ParamSet, ParamSpec};
use std::time::Duration;

const DEFAULT_POPULATION_SIZE: i64 = 100;
const DEFAULT_MAX_GENERATIONS: i64 = 500;
const DEFAULT_CROSSOVER_RATE: f64 = 0.8;
const DEFAULT_MUTATION_RATE: f64 = 0.1;
const DEFAULT_ELITE_RATE: f64 = 0.1;
const DEFAULT_TIME_LIMIT_MS: i64 = 60_000;

/// Tournament size for parent selection.
pub(crate) const TOURNAMENT_SIZE: usize = 3;
/// Generations without improvement before the run converges early.
pub(crate) const STAGNATION_LIMIT: u32 = 50;

/// Declared parameters and their documented defaults.
pub(crate) fn param_specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new(
            "populationSize",
            "Population size",
            "Number of candidate schedules evolved per generation",
            DEFAULT_POPULATION_SIZE.into(),
        )
        .with_bounds(2i64, 10_000i64),
        ParamSpec::new(
            "maxGenerations",
            "Max generations",
            "Upper bound on evolutionary generations",
            DEFAULT_MAX_GENERATIONS.into(),
        )
        .with_bounds(1i64, 100_000i64),
        ParamSpec::new(
            "crossoverRate",
            "Crossover rate",
            "Probability that a parent pair recombines",
            DEFAULT_CROSSOVER_RATE.into(),
        )
        .with_bounds(0.0, 1.0),
        ParamSpec::new(
            "mutationRate",
            "Mutation rate",
            "Probability that an offspring is mutated",
            DEFAULT_MUTATION_RATE.into(),
        )
        .with_bounds(0.0, 1.0),
        ParamSpec::new(
            "eliteRate",
            "Elite rate",
            "Fraction of the best schedules copied unchanged",
            DEFAULT_ELITE_RATE.into(),
        )
        .with_bounds(0.0, 0.9),
        ParamSpec::new(
            "timeLimitMs",
            "Time limit (ms)",
            "Soft wall-clock budget for one run",
            DEFAULT_TIME_LIMIT_MS.into(),
        )
        .with_bounds(1i64, 600_000i64),
    ]
}

/// Parsed genetic configuration.
#[derive(Debug, Clone)]
pub struct GeneticConfig {
    /// Candidate schedules per generation.
    pub population_size: usize,
    /// Upper bound on generations.
    pub max_generations: u64,
    /// Probability that a parent pair recombines.
    pub crossover_rate: f64,
    /// Probability that an offspring is mutated.
    pub mutation_rate: f64,
    /// Fraction of best schedules carried over unchanged.
    pub elite_rate: f64,
    /// Soft wall-clock budget.
    pub time_limit: Duration,
}

impl GeneticConfig {
    /// Builds a configuration from a validated parameter set.
    pub fn from_params(params: &ParamSet) -> Self {
        Self {
            population_size: params.get_i64("populationSize", DEFAULT_POPULATION_SIZE) as usize,
            max_generations: params.get_i64("maxGenerations", DEFAULT_MAX_GENERATIONS) as u64,
            crossover_rate: params.get_f64("crossoverRate", DEFAULT_CROSSOVER_RATE),
            mutation_rate: params.get_f64("mutationRate", DEFAULT_MUTATION_RATE),
            elite_rate: params.get_f64("eliteRate", DEFAULT_ELITE_RATE),
            time_limit: Duration::from_millis(
                params.get_i64("timeLimitMs", DEFAULT_TIME_LIMIT_MS) as u64,
            ),
        }
    }

    /// Number of elites preserved per generation.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64) * self.elite_rate) as usize
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self::from_params(&ParamSet::new())
    }
}
