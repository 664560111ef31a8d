use serde::{Deserialize, Serialize};

/// Outcome of a single round vote or quest vote, and the aggregate result
/// stored on a `Round`/`Quest` once the tally is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteResult {
    Pass,
    Fail,
}

impl VoteResult {
    pub fn from_approved(is_approved: bool) -> Self {
        if is_approved {
            VoteResult::Pass
        } else {
            VoteResult::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, VoteResult::Pass)
    }
}

impl std::fmt::Display for VoteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteResult::Pass => write!(f, "pass"),
            VoteResult::Fail => write!(f, "fail"),
        }
    }
}
