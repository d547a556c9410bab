pub mod matcher;

pub use matcher::{match_pattern, match_prefix};

/// Outcome of matching a pattern against an input position.
///
/// A success carries the number of bytes consumed, measured from the
/// position the match started at, never exceeding the remaining input. A
/// failure carries nothing: an unresolved rule name, a mismatched literal,
/// and an exhausted choice all report the same way.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MatchResult {
    Success(u32),
    Failure,
}

impl MatchResult {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, MatchResult::Success(_))
    }

    #[inline]
    pub fn length(self) -> Option<u32> {
        match self {
            MatchResult::Success(length) => Some(length),
            MatchResult::Failure => None,
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Success(length) => write!(f, "Success({length})"),
            MatchResult::Failure => write!(f, "Failure"),
        }
    }
}

#[test]
fn test_match_result() {
    assert_eq!(MatchResult::Success(3).to_string(), "Success(3)");
    assert_eq!(MatchResult::Failure.to_string(), "Failure");

    assert!(MatchResult::Success(0).is_success());
    assert!(!MatchResult::Failure.is_success());
    assert_eq!(MatchResult::Success(3).length(), Some(3));
    assert_eq!(MatchResult::Failure.length(), None);
}
