//! Genetic evolutionary loop.
//!
//! A chromosome is one employee choice (or none) per demand slot.
//! Initialization only draws employees that pass the static gates for a
//! slot (skill and availability); crossing-day constraints are left to the
//! fitness function, which is the shared weighted objective.

use super::config::{GeneticConfig, STAGNATION_LIMIT, TOURNAMENT_SIZE};
use crate::control::{ExecControl, Progress, Signal};
use crate::eval::{self, Slot};
use crate::model::{ScheduleRequest, ScheduleResult, Termination};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::time::Instant;

type Chromosome = Vec<Option<usize>>;

struct Individual {
    genes: Chromosome,
    fitness: f64,
}

/// Runs the evolutionary loop to convergence or budget exhaustion.
pub fn run(request: &ScheduleRequest, config: &GeneticConfig, control: &ExecControl) -> ScheduleResult {
    let slots = eval::expand_slots(request);
    let domains = static_domains(request, &slots);
    let mut rng = StdRng::from_rng(&mut rand::rng());

    let start = Instant::now();

    // Degenerate demand needs no search.
    if slots.is_empty() {
        return eval::build_result(request, &slots, &[], start.elapsed(), 0, Termination::Completed);
    }

    let mut population: Vec<Individual> = (0..config.population_size)
        .map(|_| {
            let genes = random_chromosome(&domains, &mut rng);
            let fitness = fitness_of(request, &slots, &genes);
            Individual { genes, fitness }
        })
        .collect();
    population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

    let mut best = population[0].genes.clone();
    let mut best_fitness = population[0].fitness;
    let mut stagnation = 0u32;
    let mut generations = 0u64;
    let mut termination = Termination::Completed;

    for generation in 0..config.max_generations {
        if start.elapsed() >= config.time_limit {
            termination = Termination::TimeLimitExceeded;
            break;
        }
        if control.checkpoint() == Signal::Stop {
            termination = Termination::Stopped;
            break;
        }

        let elite_count = config.elite_count().min(population.len());
        let mut next: Vec<Individual> = population[..elite_count]
            .iter()
            .map(|i| Individual {
                genes: i.genes.clone(),
                fitness: i.fitness,
            })
            .collect();

        while next.len() < config.population_size {
            let p1 = tournament(&population, &mut rng);
            let p2 = tournament(&population, &mut rng);

            let mut child = if rng.random_bool(config.crossover_rate) {
                crossover(&population[p1].genes, &population[p2].genes, &mut rng)
            } else {
                population[p1].genes.clone()
            };

            if rng.random_bool(config.mutation_rate) {
                mutate(&mut child, &domains, &mut rng);
            }

            let fitness = fitness_of(request, &slots, &child);
            next.push(Individual { genes: child, fitness });
        }

        next.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        population = next;
        generations = generation + 1;

        if population[0].fitness < best_fitness {
            best_fitness = population[0].fitness;
            best = population[0].genes.clone();
            stagnation = 0;
        } else {
            stagnation += 1;
        }

        control.emit(Progress {
            percent: generations as f64 / config.max_generations as f64,
            phase: "evolve".into(),
            message: format!("generation {generations}, best objective {best_fitness:.1}"),
            elapsed: start.elapsed(),
            remaining: None,
        });

        // Converged: a perfect schedule cannot improve.
        if best_fitness == 0.0 {
            break;
        }
        if stagnation >= STAGNATION_LIMIT {
            break;
        }
    }

    eval::build_result(request, &slots, &best, start.elapsed(), generations, termination)
}

/// Employees passing the static gates (skill, availability) per slot.
fn static_domains(request: &ScheduleRequest, slots: &[Slot]) -> Vec<Vec<usize>> {
    slots
        .iter()
        .map(|slot| {
            let def = &request.shifts[slot.shift];
            (0..request.employees.len())
                .filter(|&e| {
                    let emp = &request.employees[e];
                    def.required_skill
                        .as_ref()
                        .is_none_or(|skill| emp.has_skill(skill))
                        && emp.is_available(slot.day, def.start_min, def.end_min)
                })
                .collect()
        })
        .collect()
}

fn random_chromosome(domains: &[Vec<usize>], rng: &mut StdRng) -> Chromosome {
    domains
        .iter()
        .map(|domain| domain.choose(rng).copied())
        .collect()
}

fn fitness_of(request: &ScheduleRequest, slots: &[Slot], genes: &Chromosome) -> f64 {
    let open = genes.iter().filter(|g| g.is_none()).count() as u32;
    let violations = eval::count_conflicts(request, slots, genes);
    let fairness = eval::fairness_variance(&eval::assignment_counts(request, genes));
    eval::objective(open, violations, fairness)
}

/// Tournament selection over a fitness-sorted population.
fn tournament(population: &[Individual], rng: &mut StdRng) -> usize {
    (0..TOURNAMENT_SIZE)
        .map(|_| rng.random_range(0..population.len()))
        .min()
        .unwrap_or(0)
}

/// Sub-range crossover: the child takes `p2`'s genes on a random span.
fn crossover(p1: &Chromosome, p2: &Chromosome, rng: &mut StdRng) -> Chromosome {
    let n = p1.len();
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let (lo, hi) = (a.min(b), a.max(b));
    let mut child = p1.clone();
    child[lo..=hi].clone_from_slice(&p2[lo..=hi]);
    child
}

/// Reassigns one random slot to a random candidate from its domain.
fn mutate(genes: &mut Chromosome, domains: &[Vec<usize>], rng: &mut StdRng) {
    let index = rng.random_range(0..genes.len());
    genes[index] = domains[index].choose(rng).copied();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Shift};
    use std::time::Duration;

    fn small_request() -> ScheduleRequest {
        ScheduleRequest::new(
            vec![Employee::new("A"), Employee::new("B")],
            vec![Shift::new("DAY", 480, 960)],
            1,
        )
    }

    #[test]
    fn test_trivial_problem_converges() {
        // 2 employees, 1 slot: any population contains a clean schedule.
        let config = GeneticConfig {
            population_size: 10,
            max_generations: 10,
            ..GeneticConfig::default()
        };
        let result = run(&small_request(), &config, &ExecControl::new());

        assert!(result.is_fully_staffed());
        assert_eq!(result.metrics.violations, 0);
        assert_eq!(result.termination, Termination::Completed);
    }

    #[test]
    fn test_generation_budget_respected() {
        let config = GeneticConfig {
            population_size: 4,
            max_generations: 3,
            ..GeneticConfig::default()
        };
        let result = run(&small_request(), &config, &ExecControl::new());
        assert!(result.stats.iterations <= 3);
    }

    #[test]
    fn test_time_limit_tagged() {
        let config = GeneticConfig {
            time_limit: Duration::ZERO,
            population_size: 4,
            ..GeneticConfig::default()
        };
        let result = run(&small_request(), &config, &ExecControl::new());
        assert_eq!(result.termination, Termination::TimeLimitExceeded);
    }

    #[test]
    fn test_skill_gate_respected_in_domains() {
        let request = ScheduleRequest::new(
            vec![Employee::new("A"), Employee::new("B").with_skill("icu")],
            vec![Shift::new("ICU", 480, 960).with_required_skill("icu")],
            1,
        );
        let slots = eval::expand_slots(&request);
        let domains = static_domains(&request, &slots);
        assert_eq!(domains[0], vec![1]);
    }

    #[test]
    fn test_empty_request_is_trivial() {
        let result = run(
            &ScheduleRequest::new(vec![], vec![], 1),
            &GeneticConfig::default(),
            &ExecControl::new(),
        );
        assert!(result.is_fully_staffed());
        assert_eq!(result.stats.iterations, 0);
    }

    #[test]
    fn test_crossover_preserves_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let p1: Chromosome = vec![Some(0); 10];
        let p2: Chromosome = vec![Some(1); 10];
        let child = crossover(&p1, &p2, &mut rng);
        assert_eq!(child.len(), 10);
        assert!(child.iter().all(|g| matches!(g, Some(0) | Some(1))));
    }
}
