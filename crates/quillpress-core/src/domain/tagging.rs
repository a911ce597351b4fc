use std::collections::BTreeSet;

use uuid::Uuid;

/// Association changes that turn a post's current tag set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    pub detach: Vec<Uuid>,
    pub attach: Vec<Uuid>,
}

impl TagChanges {
    /// Set difference in both directions. Duplicates in `desired` collapse.
    pub fn between(current: &[Uuid], desired: &[Uuid]) -> Self {
        let current: BTreeSet<Uuid> = current.iter().copied().collect();
        let desired: BTreeSet<Uuid> = desired.iter().copied().collect();

        Self {
            detach: current.difference(&desired).copied().collect(),
            attach: desired.difference(&current).copied().collect(),
        }
    }

    /// Changes for a post that has no tags yet.
    pub fn initial(desired: &[Uuid]) -> Self {
        Self::between(&[], desired)
    }

    pub fn is_empty(&self) -> bool {
        self.detach.is_empty() && self.attach.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_computes_both_sides() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let changes = TagChanges::between(&[a, b], &[b, c, c]);

        assert_eq!(changes.detach, vec![a]);
        assert_eq!(changes.attach, vec![c]);
    }

    #[test]
    fn test_empty_desired_detaches_everything() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut changes = TagChanges::between(&[a, b], &[]);
        changes.detach.sort();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(changes.detach, expected);
        assert!(changes.attach.is_empty());
    }

    #[test]
    fn test_unchanged_set_is_empty() {
        let a = Uuid::new_v4();
        assert!(TagChanges::between(&[a], &[a]).is_empty());
    }
}
