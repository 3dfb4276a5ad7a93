//! The fixed population of agents and their disease status.
//!
//! People are indexed by [`PersonId`] in `0..population_size` and are created once, when the
//! simulation starts. Only a person's [`DiseaseStatus`] ever changes afterwards, and only along
//! the path `NeverExposed -> Infected -> {RecoveredMild | RecoveredSevere | Dead}`.
//!
//! Each person also carries a [`DiskPosition`] for renderers. The engine never reads it.

use std::f64::consts::PI;
use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::EpiError;

/// Represents a unique person.
//  the id refers to that person's index in the range 0 to population
// - 1 in the `Population`.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiseaseStatus {
    NeverExposed,
    Infected,
    RecoveredMild,
    RecoveredSevere,
    Dead,
}

impl DiseaseStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DiseaseStatus::RecoveredMild | DiseaseStatus::RecoveredSevere | DiseaseStatus::Dead
        )
    }

    fn can_become(self, next: DiseaseStatus) -> bool {
        match self {
            DiseaseStatus::NeverExposed => next == DiseaseStatus::Infected,
            DiseaseStatus::Infected => next.is_terminal(),
            _ => false,
        }
    }
}

/// Polar display coordinates on the unit disk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DiskPosition {
    pub radius: f64,
    pub theta: f64,
}

impl DiskPosition {
    /// Sunflower (golden angle) layout: evenly fills the disk so that low ids sit in the middle
    /// and later waves spread outwards.
    #[allow(clippy::cast_precision_loss)]
    fn sunflower(index: usize, population_size: usize) -> Self {
        let k = index as f64 + 0.5;
        DiskPosition {
            radius: (k / population_size as f64).sqrt(),
            theta: PI * (1.0 + 5f64.sqrt()) * k,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: PersonId,
    pub status: DiseaseStatus,
    pub position: DiskPosition,
}

#[derive(Clone, Debug)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Creates `size` people, all `NeverExposed`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let agents = (0..size)
            .map(|index| Agent {
                id: PersonId(index),
                status: DiseaseStatus::NeverExposed,
                position: DiskPosition::sunflower(index, size),
            })
            .collect();
        Population { agents }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn get(&self, person_id: PersonId) -> Option<&Agent> {
        self.agents.get(person_id.0)
    }

    /// # Panics
    ///
    /// If `person_id` does not belong to this population.
    #[must_use]
    pub fn get_status(&self, person_id: PersonId) -> DiseaseStatus {
        self.agents[person_id.0].status
    }

    /// Moves a person to `status`.
    ///
    /// # Errors
    ///
    /// `EpiError::InvalidTransition` if the move is not allowed by the disease state machine;
    /// the person is left unchanged.
    pub fn set_status(&mut self, person_id: PersonId, status: DiseaseStatus) -> Result<(), EpiError> {
        let agent = &mut self.agents[person_id.0];
        if !agent.status.can_become(status) {
            return Err(EpiError::InvalidTransition {
                person: person_id,
                from: agent.status,
                to: status,
            });
        }
        agent.status = status;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    #[must_use]
    pub fn count_with_status(&self, status: DiseaseStatus) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.status == status)
            .count()
    }
}
