//! The epidemic engine.
//!
//! All simulation state lives in one [`EngineState`] value. [`tick`] takes that value, advances
//! it by exactly one day and hands it back together with a [`DaySnapshot`] describing what
//! changed. Nothing is shared between ticks except through the state itself, so a run can be
//! replayed by cloning a state or by rebuilding it from the same seed.
//!
//! A tick does the following, in this order:
//! 1. If a wave is due, open it on the [`ExposureFrontier`], infect a uniformly drawn subset of
//!    the newly eligible people and classify them with the [`OutcomeSchedule`].
//! 2. Advance the day.
//! 3. Resolve every outcome scheduled for the new day.
//! 4. Report the day as a [`DaySnapshot`].
//!
//! [`Simulation`] wraps this in an iterator that yields one snapshot per day and stops as soon
//! as nobody is left infected. Renderers pull from it; the engine knows nothing about them.

use log::{debug, error, info, trace};
use serde::Serialize;

use crate::define_rng;
use crate::error::EpiError;
use crate::frontier::ExposureFrontier;
use crate::parameters::Parameters;
use crate::people::{DiseaseStatus, PersonId, Population};
use crate::random::{sample_multiple_from_known_length, RandomSource};
use crate::schedule::{Outcome, OutcomeSchedule, ResolvedOutcomes};

define_rng!(WaveRng);

/// Patient zero always holds the first id.
const PATIENT_ZERO: PersonId = PersonId(0);

/// Aggregate counts, maintained incrementally.
///
/// `currently_infected == total_infected_ever - (mild_recovered + severe_recovered + dead)`
/// holds after every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub total_infected_ever: usize,
    pub currently_infected: usize,
    pub mild_recovered: usize,
    pub severe_recovered: usize,
    pub dead: usize,
}

impl Counters {
    /// Everyone who has reached a terminal state.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.mild_recovered + self.severe_recovered + self.dead
    }

    fn record_infections(&mut self, count: usize) {
        self.total_infected_ever += count;
        self.currently_infected += count;
    }

    fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::MildRecovery => self.mild_recovered += 1,
            Outcome::SevereRecovery => self.severe_recovered += 1,
            Outcome::Death => self.dead += 1,
        }
        self.currently_infected -= 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// Someone is still infected.
    Running,
    /// Every infection ever recorded has resolved.
    Finished,
}

/// Non-fatal conditions noticed during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EngineWarning {
    /// A wave was due but every id has already been opened to an earlier wave. The engine keeps
    /// ticking to resolve outstanding outcomes.
    ExhaustedFrontier { day: u64 },
}

/// Read-only summary of one simulated day, for renderers and reports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaySnapshot {
    pub day: u64,
    pub currently_infected: usize,
    pub total_infected_ever: usize,
    pub mild_recovered: usize,
    pub severe_recovered: usize,
    pub dead: usize,
    pub newly_infected: Vec<PersonId>,
    pub newly_mild_recovered: Vec<PersonId>,
    pub newly_severe_recovered: Vec<PersonId>,
    pub newly_dead: Vec<PersonId>,
    /// Frontier position after this day's wave.
    pub exposed_after: usize,
    pub warning: Option<EngineWarning>,
}

impl DaySnapshot {
    fn new(
        state: &EngineState,
        newly_infected: Vec<PersonId>,
        resolved: ResolvedOutcomes,
        warning: Option<EngineWarning>,
    ) -> Self {
        let counters = state.counters;
        DaySnapshot {
            day: state.day,
            currently_infected: counters.currently_infected,
            total_infected_ever: counters.total_infected_ever,
            mild_recovered: counters.mild_recovered,
            severe_recovered: counters.severe_recovered,
            dead: counters.dead,
            newly_infected,
            newly_mild_recovered: resolved.mild,
            newly_severe_recovered: resolved.severe_recovery,
            newly_dead: resolved.death,
            exposed_after: state.frontier.exposed_after(),
            warning,
        }
    }
}

/// Everything the engine mutates, owned in one place.
#[derive(Clone, Debug)]
pub struct EngineState {
    day: u64,
    population: Population,
    frontier: ExposureFrontier,
    schedule: OutcomeSchedule,
    counters: Counters,
    random: RandomSource,
}

impl EngineState {
    /// Builds the day-0 state: a fresh population with patient zero infected and scheduled to
    /// recover mildly on the first day a mild case can.
    ///
    /// # Errors
    ///
    /// `EpiError::ConfigError` if `parameters` do not validate. No state is built in that case.
    pub fn new(parameters: &Parameters, seed: u64) -> Result<Self, EpiError> {
        parameters.validate()?;
        trace!(
            "Initializing engine state for {} people with seed {seed}",
            parameters.population_size
        );

        let mut state = EngineState {
            day: 0,
            population: Population::new(parameters.population_size),
            frontier: ExposureFrontier::new(parameters.population_size),
            schedule: OutcomeSchedule::new(),
            counters: Counters::default(),
            random: RandomSource::new(seed),
        };

        state
            .population
            .set_status(PATIENT_ZERO, DiseaseStatus::Infected)?;
        state.counters.record_infections(1);
        state.schedule.schedule(
            PATIENT_ZERO,
            Outcome::MildRecovery,
            parameters.incubation + parameters.mild_recovery.min(),
        )?;
        Ok(state)
    }

    #[must_use]
    pub fn day(&self) -> u64 {
        self.day
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn frontier(&self) -> &ExposureFrontier {
        &self.frontier
    }

    #[must_use]
    pub fn schedule(&self) -> &OutcomeSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        if self.counters.resolved() == self.counters.total_infected_ever {
            EngineStatus::Finished
        } else {
            EngineStatus::Running
        }
    }

    /// Describes the state as if it had just been reached: patient zero is reported as newly
    /// infected on day 0.
    #[must_use]
    pub fn initial_snapshot(&self) -> DaySnapshot {
        DaySnapshot::new(
            self,
            vec![PATIENT_ZERO],
            ResolvedOutcomes::default(),
            None,
        )
    }

    fn run_wave(&mut self, parameters: &Parameters) -> Result<Vec<PersonId>, EpiError> {
        let wave = self
            .frontier
            .open_next_wave(parameters.r0, self.counters.total_infected_ever);
        trace!(
            "day {}: wave opens ids {:?} for {} new infections",
            self.day,
            wave.eligible,
            wave.new_infections
        );

        let newly_infected: Vec<PersonId> = self
            .random
            .sample(WaveRng, |rng| {
                sample_multiple_from_known_length(rng, wave.eligible, wave.new_infections)
            })?
            .into_iter()
            .map(PersonId)
            .collect();

        for &person in &newly_infected {
            self.population.set_status(person, DiseaseStatus::Infected)?;
        }
        self.counters.record_infections(newly_infected.len());
        self.schedule.classify_and_schedule(
            newly_infected.clone(),
            self.day,
            parameters,
            &mut self.random,
        )?;
        Ok(newly_infected)
    }

    fn resolve_today(&mut self) -> Result<ResolvedOutcomes, EpiError> {
        let resolved = self.schedule.resolve(self.day);
        for (person, outcome) in resolved.iter() {
            self.population
                .set_status(person, outcome.terminal_status())?;
            self.counters.record_outcome(outcome);
        }
        Ok(resolved)
    }
}

/// Advances `state` by one day.
///
/// # Errors
///
/// Any error is fatal to the run: `EpiError::CapacityError` when rounding asks a sampling step
/// for more people than it has, or `EpiError::InvalidTransition` / `EpiError::AlreadyScheduled`
/// if the engine's own bookkeeping is inconsistent. The state is consumed either way.
pub fn tick(
    mut state: EngineState,
    parameters: &Parameters,
) -> Result<(EngineState, DaySnapshot), EpiError> {
    let mut newly_infected = Vec::new();
    let mut warning = None;

    // A finished epidemic has nobody left to spread it; only the clock moves.
    let running = state.status() == EngineStatus::Running;
    if running && state.frontier.wave_due(state.day, parameters.serial_interval) {
        newly_infected = state.run_wave(parameters)?;
    } else if running && state.day % parameters.serial_interval == 0 {
        info!(
            "day {}: wave skipped, every person has already been exposed",
            state.day
        );
        warning = Some(EngineWarning::ExhaustedFrontier { day: state.day });
    }

    state.day += 1;
    let resolved = state.resolve_today()?;

    let snapshot = DaySnapshot::new(&state, newly_infected, resolved, warning);
    debug!(
        "day {}: {} infected, {} mild recovered, {} severe recovered, {} dead",
        snapshot.day,
        snapshot.currently_infected,
        snapshot.mild_recovered,
        snapshot.severe_recovered,
        snapshot.dead
    );
    Ok((state, snapshot))
}

/// Ticks `state` until it is `Finished`.
///
/// # Errors
///
/// The first error returned by [`tick`].
pub fn run_to_completion(
    mut state: EngineState,
    parameters: &Parameters,
) -> Result<EngineState, EpiError> {
    while state.status() == EngineStatus::Running {
        state = tick(state, parameters)?.0;
    }
    Ok(state)
}

/// A finite stream of day snapshots.
///
/// Each call to `next` runs one [`tick`]. The stream ends once the state is `Finished`, or
/// right after the first error, which is yielded once.
pub struct Simulation {
    parameters: Parameters,
    seed: u64,
    state: Option<EngineState>,
}

impl Simulation {
    /// # Errors
    ///
    /// `EpiError::ConfigError` if `parameters` do not validate.
    pub fn new(parameters: Parameters, seed: u64) -> Result<Self, EpiError> {
        let state = EngineState::new(&parameters, seed)?;
        Ok(Simulation {
            parameters,
            seed,
            state: Some(state),
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The current state, or `None` after a fatal error.
    #[must_use]
    pub fn state(&self) -> Option<&EngineState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn into_state(self) -> Option<EngineState> {
        self.state
    }

    /// Throws the current run away and starts over from day 0 with `seed`.
    ///
    /// # Errors
    ///
    /// Never in practice: the parameters were validated when the simulation was created.
    pub fn reseed(&mut self, seed: u64) -> Result<(), EpiError> {
        debug!("Restarting simulation with seed {seed}");
        self.state = Some(EngineState::new(&self.parameters, seed)?);
        self.seed = seed;
        Ok(())
    }
}

impl Iterator for Simulation {
    type Item = Result<DaySnapshot, EpiError>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;
        if state.status() == EngineStatus::Finished {
            self.state = Some(state);
            return None;
        }
        match tick(state, &self.parameters) {
            Ok((state, snapshot)) => {
                if state.status() == EngineStatus::Finished {
                    info!("Epidemic finished on day {}", state.day());
                }
                self.state = Some(state);
                Some(Ok(snapshot))
            }
            Err(e) => {
                error!("Simulation stopped: {e}");
                Some(Err(e))
            }
        }
    }
}
