//! Action types and action spaces

use serde::{Deserialize, Serialize};
use tracing::debug;

/// An action the runner can take on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Keep running
    Noop,
    /// Request a jump; ignored by physics when airborne or out of energy
    Jump,
}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 2;

    /// All actions in index order
    pub const ALL: [Action; Action::COUNT] = [Action::Noop, Action::Jump];

    pub fn index(self) -> usize {
        match self {
            Action::Noop => 0,
            Action::Jump => 1,
        }
    }

    /// Map a policy output onto the action set, clamping out-of-range indices
    /// to the last valid action.
    pub fn from_index(index: usize) -> Action {
        if index >= Action::COUNT {
            debug!(index, "action index out of range, clamping");
        }
        Action::ALL[index.min(Action::COUNT - 1)]
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Noop => "noop",
            Action::Jump => "jump",
        }
    }
}

/// Description of an action space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "PascalCase")]
pub enum ActionSpace {
    /// Discrete action space
    Discrete {
        /// Number of discrete actions
        n: usize,
        /// Optional action names
        #[serde(skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
}

impl ActionSpace {
    /// The runner's no-op / jump space
    pub fn runner() -> Self {
        ActionSpace::Discrete {
            n: Action::COUNT,
            names: Some(Action::ALL.iter().map(|a| a.name().to_string()).collect()),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            ActionSpace::Discrete { n, .. } => *n,
        }
    }
}
