//! Membership diffing

use serde::{Deserialize, Serialize};

use crate::models::MemberSet;

/// Operations that converge a current member set to a desired one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPlan {
    /// desired − current
    pub to_add: MemberSet,
    /// current − desired
    pub to_remove: MemberSet,
}

impl MembershipPlan {
    /// Whether the sets already agree
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply the plan to `current`, yielding the converged set
    pub fn apply(&self, current: &MemberSet) -> MemberSet {
        current.difference(&self.to_remove).union(&self.to_add)
    }
}

/// Compute `(desired − current, current − desired)`
///
/// `current` must be a set actually read back from the directory, never a
/// stand-in for a listing that failed.
pub fn diff(desired: &MemberSet, current: &MemberSet) -> MembershipPlan {
    MembershipPlan {
        to_add: desired.difference(current),
        to_remove: current.difference(desired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> MemberSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_diff_scenario() {
        let plan = diff(&set(&["a", "b", "c"]), &set(&["b", "c", "d"]));
        assert_eq!(plan.to_add, set(&["a"]));
        assert_eq!(plan.to_remove, set(&["d"]));
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let members = set(&["a", "b"]);
        assert!(diff(&members, &members).is_empty());
    }

    #[test]
    fn test_diff_against_empty_current() {
        let plan = diff(&set(&["a", "b"]), &MemberSet::new());
        assert_eq!(plan.to_add, set(&["a", "b"]));
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_apply_converges() {
        let desired = set(&["a", "b", "c"]);
        let current = set(&["b", "c", "d"]);
        assert_eq!(diff(&desired, &current).apply(&current), desired);
    }
}
