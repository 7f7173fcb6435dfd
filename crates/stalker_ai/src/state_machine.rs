//! Behavior states and transitions

use serde::{Deserialize, Serialize};
use stalker_world::WorldPos;
use std::fmt;

/// The five mutually exclusive behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StalkerState {
    /// Walking the waypoint route
    #[default]
    Patrol,
    /// Walking to a heard sound
    Investigate,
    /// Walking to and scanning around the last known player position
    Search,
    /// Pursuing the player
    Chase,
    /// Returning to the route, blind to stimuli
    Cooldown,
}

impl StalkerState {
    /// Whether vision and hearing are evaluated in this state
    pub fn perceives(self) -> bool {
        !matches!(self, Self::Cooldown)
    }

    /// Whether a sighting in this state goes through the reaction delay
    pub fn reacts(self) -> bool {
        matches!(self, Self::Patrol | Self::Investigate | Self::Search)
    }
}

impl fmt::Display for StalkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Patrol => "patrol",
            Self::Investigate => "investigate",
            Self::Search => "search",
            Self::Chase => "chase",
            Self::Cooldown => "cooldown",
        };
        f.write_str(name)
    }
}

/// A state to enter together with the data its entry action needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StateEntry {
    Patrol,
    Investigate { target: WorldPos },
    Search { last_known: WorldPos },
    Chase { last_known: WorldPos },
    Cooldown,
}

impl StateEntry {
    /// State this entry leads to
    pub fn state(&self) -> StalkerState {
        match self {
            Self::Patrol => StalkerState::Patrol,
            Self::Investigate { .. } => StalkerState::Investigate,
            Self::Search { .. } => StalkerState::Search,
            Self::Chase { .. } => StalkerState::Chase,
            Self::Cooldown => StalkerState::Cooldown,
        }
    }
}

/// What caused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionCause {
    /// Reaction delay elapsed after a sighting
    ReactionElapsed,
    /// A sound was heard
    Heard,
    /// The walk target was reached
    ArrivedAtTarget,
    /// Investigation took too long
    InvestigateTimeout,
    /// Search timer ran out
    SearchExpired,
    /// Memory of the player ran out
    MemoryExpired,
    /// Pursuit hit the fairness cap
    ChaseCapReached,
    /// Cooldown timer ran out
    CooldownElapsed,
    /// Set from outside the behavior logic
    Forced,
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ReactionElapsed => "reaction elapsed",
            Self::Heard => "heard a sound",
            Self::ArrivedAtTarget => "arrived",
            Self::InvestigateTimeout => "investigation timed out",
            Self::SearchExpired => "search expired",
            Self::MemoryExpired => "lost the player",
            Self::ChaseCapReached => "chase cap reached",
            Self::CooldownElapsed => "cooldown elapsed",
            Self::Forced => "forced",
        };
        f.write_str(text)
    }
}

/// Result of one state's tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Remain in the current state
    Stay,
    /// Leave for another state
    To { entry: StateEntry, cause: TransitionCause },
}

impl Transition {
    pub fn to(entry: StateEntry, cause: TransitionCause) -> Self {
        Self::To { entry, cause }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, Self::Stay)
    }
}

/// A transition that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange {
    pub from: StalkerState,
    pub to: StalkerState,
    pub cause: TransitionCause,
}
