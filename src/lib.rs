//! Pluggable shift-scheduling optimization engine.
//!
//! Builds employee-shift-day schedules under hard constraints
//! (availability, skills, one shift per day, consecutive-day and rest
//! rules) with four interchangeable strategies behind one contract:
//!
//! - **Greedy**: Priority-ordered construction — fastest, never
//!   backtracks, zero violations by construction.
//! - **Genetic**: Evolutionary population search over whole schedules,
//!   for tightly constrained problems worth the compute.
//! - **Backtrack**: Depth-first search with forward checking — complete
//!   within its depth window, for small coupled problems.
//! - **Heuristic**: Min-conflicts repair on a greedy seed — the balanced
//!   default for mid-sized rosters.
//!
//! Every strategy shares the lifecycle in [`Strategy`]: parameterization
//! through typed [`ParamSet`]s, validation, cooperative pause/resume/stop,
//! progress callbacks, and soft time limits. [`StrategyRegistry`] hands
//! out instances, caching them under deterministic parameter keys.
//!
//! # Example
//!
//! ```
//! use shiftplan::{Employee, ParamSet, ScheduleRequest, Shift, StrategyRegistry, StrategyType};
//!
//! let registry = StrategyRegistry::with_builtins();
//! let strategy = registry
//!     .get_or_create(StrategyType::Greedy, &ParamSet::new())
//!     .unwrap();
//!
//! let request = ScheduleRequest::new(
//!     vec![Employee::new("alice"), Employee::new("bob")],
//!     vec![Shift::new("DAY", 480, 960)],
//!     7,
//! );
//! let result = strategy.generate_schedule(&request).unwrap();
//! assert!(result.is_fully_staffed());
//! ```

pub mod backtrack;
pub mod control;
pub mod error;
pub mod eval;
pub mod genetic;
pub mod greedy;
pub mod heuristic;
pub mod model;
pub mod param;
pub mod registry;
pub mod strategy;

pub use backtrack::BacktrackStrategy;
pub use control::{ExecControl, Progress, ProgressFn, Signal, State};
pub use error::{EngineError, Result};
pub use genetic::GeneticStrategy;
pub use greedy::GreedyStrategy;
pub use heuristic::HeuristicStrategy;
pub use model::{
    Assignment, AvailabilityWindow, Employee, QualityMetrics, RunStats, ScheduleRequest,
    ScheduleResult, Shift, Termination, UnmetSlot,
};
pub use param::{ParamSet, ParamSpec, ParamValue, ValidationReport};
pub use registry::{CacheStatistics, Provider, StrategyRegistry};
pub use strategy::{Complexity, Strategy, StrategyInfo, StrategyType};
