use crate::{EvidenceError, Frame, Subset};
use approx::{AbsDiffEq, RelativeEq};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

/// Tolerance used when checking that masses sum to one.
pub const MASS_SUM_TOLERANCE: f64 = 1e-9;

/// A [Dempster-Shafer](https://en.wikipedia.org/wiki/Dempster%E2%80%93Shafer_theory) mass
/// function over a [`Frame`] of discernment, also called a basic probability assignment.
///
/// Mass is assigned to subsets of the frame rather than to single outcomes, which lets a
/// source of evidence commit belief to "one of these" without splitting it artificially.
/// Mass assigned to the full frame represents ignorance. The empty set never carries mass
/// and all masses sum to one.
#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "validate_masses", skip_on_field_errors = false))]
pub struct MassFunction {
    pub(crate) frame: Frame,
    pub(crate) masses: BTreeMap<Subset, f64>,
}

/// Validates that a `MassFunction`'s masses are in range, assigned within the frame,
/// and sum to 1.0.
fn validate_masses(mass_function: &MassFunction) -> Result<(), ValidationError> {
    let mut sum = 0.0;
    for (subset, &mass) in &mass_function.masses {
        if !mass.is_finite() {
            return Err(ValidationError::new("mass must be finite"));
        }
        if !(0.0..=1.0).contains(&mass) {
            return Err(ValidationError::new("mass must be between zero and one"));
        }
        if subset.is_empty() && mass > 0.0 {
            return Err(ValidationError::new("empty set cannot carry mass"));
        }
        if !mass_function.frame.contains_subset(subset) {
            return Err(ValidationError::new("focal element outside the frame"));
        }
        sum += mass;
    }
    if (sum - 1.0).abs() > MASS_SUM_TOLERANCE {
        return Err(ValidationError::new("masses should sum to one"));
    }
    Ok(())
}

impl MassFunction {
    /// Builds a normalized mass function from raw evidence weights.
    ///
    /// Weights are observation counts or scores and do not need to sum to one; each is
    /// divided by the total. Weights for the same subset accumulate and zero weights are
    /// dropped, so only subsets with positive weight become focal elements.
    ///
    /// # Arguments
    ///
    /// * `frame` - The frame of discernment the evidence refers to.
    /// * `weights` - Subsets of the frame paired with non-negative weights.
    pub fn new<I>(frame: Frame, weights: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = (Subset, f64)>,
    {
        let mut masses: BTreeMap<Subset, f64> = BTreeMap::new();
        let mut total = 0.0;
        for (subset, weight) in weights {
            if !weight.is_finite() {
                return Err(EvidenceError::InvalidEvidence(format!(
                    "weight for {} must be finite",
                    subset
                )));
            }
            if weight < 0.0 {
                return Err(EvidenceError::InvalidEvidence(format!(
                    "weight for {} cannot be negative",
                    subset
                )));
            }
            if subset.is_empty() && weight > 0.0 {
                return Err(EvidenceError::InvalidEvidence(
                    "the empty set cannot carry evidence".to_string(),
                ));
            }
            if !frame.contains_subset(&subset) {
                return Err(EvidenceError::FrameMismatch(subset.to_string()));
            }
            if weight > 0.0 {
                total += weight;
                *masses.entry(subset).or_insert(0.0) += weight;
            }
        }
        if total <= 0.0 {
            return Err(EvidenceError::InvalidEvidence(
                "evidence weights must have a positive total".to_string(),
            ));
        }
        for mass in masses.values_mut() {
            *mass /= total;
        }
        Ok(Self { frame, masses })
    }

    /// The vacuous mass function, which assigns all mass to the full frame and therefore
    /// represents total ignorance.
    ///
    /// Over the empty frame the full set is the empty set, so the result fails
    /// validation; a frame needs at least one element to support evidence.
    pub fn vacuous(frame: Frame) -> Self {
        let mut masses = BTreeMap::new();
        masses.insert(frame.full_set(), 1.0);
        Self { frame, masses }
    }

    /// The frame of discernment this mass function is defined over.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The mass assigned to `subset`, zero if it is not a focal element.
    pub fn mass(&self, subset: &Subset) -> f64 {
        self.masses.get(subset).copied().unwrap_or(0.0)
    }

    /// Iterates over the focal elements, the subsets carrying positive mass, in sorted
    /// order with their masses.
    pub fn focal_elements(&self) -> impl Iterator<Item = (&Subset, f64)> {
        self.masses.iter().map(|(subset, &mass)| (subset, mass))
    }

    /// The degree of belief in `event`, the total mass of focal elements contained
    /// within it.
    ///
    /// Belief is the lower bound of the uncertainty interval: evidence that directly
    /// supports the event and nothing outside it.
    ///
    /// # Arguments
    ///
    /// * `event` - The queried subset of the frame.
    pub fn belief(&self, event: &Subset) -> Result<f64, EvidenceError> {
        self.check_event(event)?;
        // Not `.sum()`: its identity is -0.0, which would render as "-0.0000"
        // for events with no supporting focal elements.
        Ok(self
            .masses
            .iter()
            .filter(|(focal, _)| focal.is_subset_of(event))
            .map(|(_, &mass)| mass)
            .fold(0.0, |total, mass| total + mass))
    }

    /// The plausibility of `event`, the total mass of focal elements that intersect it.
    ///
    /// Plausibility is the upper bound of the uncertainty interval: evidence that does
    /// not contradict the event.
    ///
    /// # Arguments
    ///
    /// * `event` - The queried subset of the frame.
    pub fn plausibility(&self, event: &Subset) -> Result<f64, EvidenceError> {
        self.check_event(event)?;
        // Not `.sum()`: its identity is -0.0, which would render as "-0.0000"
        // for events intersecting no focal element.
        Ok(self
            .masses
            .iter()
            .filter(|(focal, _)| !focal.is_disjoint(event))
            .map(|(_, &mass)| mass)
            .fold(0.0, |total, mass| total + mass))
    }

    /// The `[belief, plausibility]` uncertainty interval for `event`.
    pub fn interval(&self, event: &Subset) -> Result<(f64, f64), EvidenceError> {
        Ok((self.belief(event)?, self.plausibility(event)?))
    }

    /// Discounts the mass function by the reliability discount `factor`[^1].
    ///
    /// Every focal element's mass is scaled by `1.0 - factor` and the removed mass is
    /// transferred to the full frame. A factor of zero leaves the mass function
    /// unchanged, a factor of one discards the source entirely and yields the vacuous
    /// mass function.
    ///
    /// # Arguments
    ///
    /// * `factor` - How unreliable the source is, between 0.0 and 1.0.
    ///
    /// [^1]: Glenn Shafer. 1976. A Mathematical Theory of Evidence.
    ///     Princeton University Press.
    pub fn discount(&self, factor: f64) -> Result<Self, EvidenceError> {
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(EvidenceError::DiscountOutOfRange(factor));
        }
        let mut masses: BTreeMap<Subset, f64> = BTreeMap::new();
        for (subset, &mass) in &self.masses {
            let scaled = mass * (1.0 - factor);
            if scaled > 0.0 {
                masses.insert(subset.clone(), scaled);
            }
        }
        if factor > 0.0 {
            *masses.entry(self.frame.full_set()).or_insert(0.0) += factor;
        }
        Ok(Self {
            frame: self.frame.clone(),
            masses,
        })
    }

    /// Queries validate the mass function they run against, catching values that have
    /// drifted out of range as early as possible.
    fn check_event(&self, event: &Subset) -> Result<(), EvidenceError> {
        if !self.frame.contains_subset(event) {
            return Err(EvidenceError::FrameMismatch(event.to_string()));
        }
        self.validate()?;
        Ok(())
    }
}

impl AbsDiffEq for MassFunction {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.frame == other.frame
            && self
                .masses
                .keys()
                .chain(other.masses.keys())
                .all(|subset| f64::abs_diff_eq(&self.mass(subset), &other.mass(subset), epsilon))
    }
}

impl RelativeEq for MassFunction {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.frame == other.frame
            && self.masses.keys().chain(other.masses.keys()).all(|subset| {
                f64::relative_eq(&self.mass(subset), &other.mass(subset), epsilon, max_relative)
            })
    }
}
