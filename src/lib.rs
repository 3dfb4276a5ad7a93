//! A wave-based stochastic epidemic engine
//!
//! Epiwave simulates an epidemic spreading through a fixed population one day at a time. It
//! does not model contacts. Instead, every serial interval the set of people who could have
//! been exposed grows by the reproduction number, and a uniformly drawn share of the newly
//! exposed become infected. Each new infection is classified right away as a mild recovery,
//! a severe recovery or a death, and is scheduled to resolve on a day drawn from the matching
//! window.
//!
//! The pieces, leaf first:
//! * [`parameters`]: the disease parameters and their JSON loader.
//! * [`people`]: the population, its disease states and a display layout on the unit disk.
//! * [`frontier`]: the growing range of people eligible for infection.
//! * [`schedule`]: outcome classification and the day-indexed resolution calendar.
//! * [`engine`]: the [`EngineState`](engine::EngineState) value, the
//!   [`tick`](engine::tick) function and the [`Simulation`](engine::Simulation) iterator.
//!
//! Around them sit named random streams ([`random`]), the [`error`] type, [`log`]
//! configuration, the CSV [`report`] and the command-line [`runner`].
//!
//! ```
//! use epiwave::engine::Simulation;
//! use epiwave::parameters::Parameters;
//!
//! let parameters = Parameters {
//!     population_size: 200,
//!     ..Parameters::default()
//! };
//! let last = Simulation::new(parameters, 8)
//!     .unwrap()
//!     .map(Result::unwrap)
//!     .last()
//!     .unwrap();
//! assert_eq!(last.currently_infected, 0);
//! ```
pub mod engine;
pub mod error;
pub mod frontier;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod people;
pub mod random;
pub mod report;
pub mod runner;
pub mod schedule;

// Re-exported for use in macros
pub use paste;
pub use rand;

pub use engine::{run_to_completion, tick, DaySnapshot, EngineState, Simulation};
pub use error::EpiError;
pub use parameters::Parameters;
