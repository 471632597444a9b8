/// Crawl state definitions for level-by-level traversal
///
/// A run moves `Idle → LevelInFlight(0) → LevelComplete(0) → LevelInFlight(1) → …`
/// and ends in `Finished` once the depth bound is reached or a level
/// discovers nothing new.
use crate::EtlError;
use std::fmt;

/// Represents where the coordinator is in its traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Seed admitted, nothing fetched yet
    Idle,

    /// Every URL of this depth is being fetched and extracted
    LevelInFlight(u32),

    /// All fetches for this depth joined; frontier expansion is running
    LevelComplete(u32),

    /// Terminal state
    Finished,
}

impl CrawlState {
    /// Returns true if this is the terminal state
    #[cfg(test)]
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns the depth this state belongs to, if any
    #[cfg(test)]
    fn depth(&self) -> Option<u32> {
        match self {
            Self::LevelInFlight(d) | Self::LevelComplete(d) => Some(*d),
            Self::Idle | Self::Finished => None,
        }
    }

    /// Returns true if moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        match (*self, next) {
            (Self::Idle, Self::LevelInFlight(0)) => true,
            (Self::LevelInFlight(d), Self::LevelComplete(e)) => d == e,
            (Self::LevelComplete(d), Self::LevelInFlight(e)) => e == d + 1,
            (Self::LevelComplete(_), Self::Finished) => true,
            _ => false,
        }
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(self, next: CrawlState) -> Result<CrawlState, EtlError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EtlError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::LevelInFlight(d) => write!(f, "level_in_flight({})", d),
            Self::LevelComplete(d) => write!(f, "level_complete({})", d),
            Self::Finished => write!(f, "finished"),
        }
    }
}
