use crate::EvidenceError;
use std::collections::BTreeSet;
use std::fmt;

/// A frame of discernment, the finite set of mutually exclusive outcomes that
/// evidence may support.
///
/// Elements are kept in sorted order so that subsets and reports render
/// deterministically regardless of the order evidence was supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    elements: BTreeSet<String>,
}

impl Frame {
    /// Constructs a frame from its elements.
    ///
    /// Duplicate elements collapse, since a frame is a set. The empty frame is
    /// permitted and enumerable, though no mass function can be built over it.
    ///
    /// # Arguments
    ///
    /// * `elements` - The outcomes under consideration.
    pub fn new<I, S>(elements: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements: BTreeSet<String> = elements.into_iter().map(|e| e.into()).collect();
        if elements.iter().any(|e| e.trim().is_empty()) {
            return Err(EvidenceError::InvalidEvidence(
                "frame elements cannot be blank".to_string(),
            ));
        }
        Ok(Self { elements })
    }

    /// The number of elements in the frame.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for a frame with no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Checks whether `element` is one of the frame's outcomes.
    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    /// Checks whether every element of `subset` belongs to the frame.
    pub fn contains_subset(&self, subset: &Subset) -> bool {
        subset.elements().all(|element| self.contains(element))
    }

    /// Iterates over the frame's elements in sorted order.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.as_str())
    }

    /// Returns the full frame as a [`Subset`], conventionally written Ω.
    pub fn full_set(&self) -> Subset {
        Subset {
            elements: self.elements.clone(),
        }
    }

    /// Iterates over every subset of the frame, the empty set and the full
    /// frame included.
    ///
    /// The power set has `2^n` members, so this is only tractable for small
    /// frames.
    pub fn subsets(&self) -> Subsets {
        assert!(self.elements.len() < 128, "frame too large to enumerate");
        Subsets {
            elements: self.elements.iter().cloned().collect(),
            cursor: 0,
            count: 1u128 << self.elements.len(),
        }
    }
}

/// An iterator over the power set of a [`Frame`].
///
/// Subsets are produced by counting through a bitmask over the frame's sorted
/// elements, so the empty set comes first and the full frame comes last.
pub struct Subsets {
    elements: Vec<String>,
    cursor: u128,
    count: u128,
}

impl Iterator for Subsets {
    type Item = Subset;

    fn next(&mut self) -> Option<Subset> {
        if self.cursor >= self.count {
            return None;
        }
        let bits = self.cursor;
        self.cursor += 1;
        Some(Subset::new(
            self.elements
                .iter()
                .enumerate()
                .filter(|(position, _)| bits & (1u128 << position) != 0)
                .map(|(_, element)| element.clone()),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.cursor) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Subsets {}

/// A subset of a [`Frame`], used both for the focal elements of a mass
/// function and for queried events.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subset {
    elements: BTreeSet<String>,
}

impl Subset {
    /// Constructs a subset from its elements. Duplicates collapse.
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(|e| e.into()).collect(),
        }
    }

    /// The empty set, conventionally written ∅.
    pub fn empty() -> Self {
        Self {
            elements: BTreeSet::new(),
        }
    }

    /// The number of elements in the subset.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for the empty set.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Checks whether `element` is a member of the subset.
    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    /// Checks whether every element of this subset is also in `other`.
    pub fn is_subset_of(&self, other: &Subset) -> bool {
        self.elements.is_subset(&other.elements)
    }

    /// Checks whether this subset and `other` have no elements in common.
    pub fn is_disjoint(&self, other: &Subset) -> bool {
        self.elements.is_disjoint(&other.elements)
    }

    /// Returns the elements common to this subset and `other`.
    pub fn intersection(&self, other: &Subset) -> Subset {
        Subset {
            elements: self
                .elements
                .intersection(&other.elements)
                .cloned()
                .collect(),
        }
    }

    /// Iterates over the subset's elements in sorted order.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.as_str())
    }
}

impl fmt::Display for Subset {
    /// Renders the subset in brace notation, e.g. `{rain,snow}`, with `∅` for
    /// the empty set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "{{")?;
        for (position, element) in self.elements.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "}}")
    }
}
