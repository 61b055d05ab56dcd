use serde::{Deserialize, Serialize};
use std::fmt;

/// What a philosopher is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhilosopherState {
    Thinking,
    Hungry,
    Eating,
}

impl PhilosopherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "THINKING",
            Self::Hungry => "HUNGRY",
            Self::Eating => "EATING",
        }
    }
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
