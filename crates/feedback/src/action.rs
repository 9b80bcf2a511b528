//! User actions on a presented item.

use crate::error::FeedbackError;
use std::fmt;
use std::str::FromStr;

/// What the user did with a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Like,
    Unlike,
    Click,
    Skip,
}

impl Action {
    /// Every action, in agent action-id order
    pub const ALL: [Action; 4] = [Action::Like, Action::Unlike, Action::Click, Action::Skip];

    /// Amount added to each of the item's category accumulators
    pub fn weight(self) -> i32 {
        match self {
            Action::Like => 2,
            Action::Unlike => -2,
            Action::Click => 1,
            Action::Skip => 0,
        }
    }

    /// Base reward before the similarity bonus
    pub fn reward(self) -> f32 {
        self.weight() as f32
    }

    /// Action id used by the learning agent
    pub fn index(self) -> usize {
        match self {
            Action::Like => 0,
            Action::Unlike => 1,
            Action::Click => 2,
            Action::Skip => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl FromStr for Action {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" => Ok(Action::Like),
            "unlike" => Ok(Action::Unlike),
            "click" => Ok(Action::Click),
            "skip" => Ok(Action::Skip),
            _ => Err(FeedbackError::UnknownAction(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Like => "like",
            Action::Unlike => "unlike",
            Action::Click => "click",
            Action::Skip => "skip",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_trimmed_and_case_insensitive() {
        assert_eq!("  LIKE \n".parse::<Action>(), Ok(Action::Like));
        assert_eq!("Skip".parse::<Action>(), Ok(Action::Skip));
        assert_eq!(
            "meh".parse::<Action>(),
            Err(FeedbackError::UnknownAction("meh".to_string()))
        );
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_weights_and_indices() {
        let weights: Vec<i32> = Action::ALL.iter().map(|a| a.weight()).collect();
        assert_eq!(weights, vec![2, -2, 1, 0]);
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(4), None);
    }
}
