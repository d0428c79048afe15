//! Hideset algebra for macro recursion control.
//!
//! Every token produced by a macro expansion carries the set of macro names
//! it was expanded from; a name present in the set blocks re-expansion by
//! that macro. Sets are immutable values: union and intersection return new
//! sets, so a single set can be read by any number of tokens independently.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct HideSet(Option<Rc<BTreeSet<String>>>);

impl HideSet {
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn singleton(name: &str) -> Self {
        let mut set = BTreeSet::new();
        set.insert(name.to_string());
        Self(Some(Rc::new(set)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_none_or(|set| set.is_empty())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.as_ref().is_some_and(|set| set.contains(name))
    }

    /// Union with a single name, returning a new set.
    #[must_use]
    pub fn insert(&self, name: &str) -> Self {
        if self.contains(name) {
            return self.clone();
        }
        let mut set = self
            .0
            .as_ref()
            .map(|set| (**set).clone())
            .unwrap_or_default();
        set.insert(name.to_string());
        Self(Some(Rc::new(set)))
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        match (self.0.as_ref(), other.0.as_ref()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => {
                if b.is_subset(a) {
                    return self.clone();
                }
                if a.is_subset(b) {
                    return other.clone();
                }
                Self(Some(Rc::new(a.union(b).cloned().collect())))
            }
        }
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        match (self.0.as_ref(), other.0.as_ref()) {
            (None, _) | (_, None) => Self::empty(),
            (Some(a), Some(b)) => {
                let set: BTreeSet<String> = a.intersection(b).cloned().collect();
                if set.is_empty() {
                    Self::empty()
                } else {
                    Self(Some(Rc::new(set)))
                }
            }
        }
    }
}

impl fmt::Debug for HideSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            None => f.write_str("{}"),
            Some(set) => f.debug_set().entries(set.iter()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_never_mutates_operands() {
        let a = HideSet::singleton("A");
        let b = HideSet::singleton("B");
        let both = a.union(&b);
        assert!(both.contains("A") && both.contains("B"));
        assert!(!a.contains("B"), "left operand must stay unchanged");
        assert!(!b.contains("A"), "right operand must stay unchanged");
    }

    #[test]
    fn intersect_keeps_only_shared_names() {
        let ab = HideSet::singleton("A").insert("B");
        let bc = HideSet::singleton("B").insert("C");
        let only_b = ab.intersect(&bc);
        assert!(only_b.contains("B"));
        assert!(!only_b.contains("A"));
        assert!(!only_b.contains("C"));
    }

    #[test]
    fn intersect_with_empty_is_empty() {
        let a = HideSet::singleton("A");
        assert!(a.intersect(&HideSet::empty()).is_empty());
        assert!(HideSet::empty().intersect(&a).is_empty());
    }

    #[test]
    fn insert_deduplicates() {
        let a = HideSet::singleton("A");
        let same = a.insert("A");
        assert_eq!(a, same);
    }

    #[test]
    fn structural_equality_ignores_sharing() {
        let built = HideSet::singleton("X").insert("Y");
        let rebuilt = HideSet::singleton("Y").insert("X");
        assert_eq!(built, rebuilt);
    }
}
