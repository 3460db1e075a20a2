use crate::{EvidenceError, MassFunction, Subset};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};
use validator::Validate;

/// The rule used to merge mass functions from independent evidence sources.
///
/// Both rules start from the same pairwise intersection of focal elements and differ
/// only in where the mass of contradictory intersections ends up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CombinationRule {
    /// Dempster's rule, which normalizes conflicting mass away and is undefined under
    /// total conflict.
    #[default]
    Dempster,
    /// Yager's rule, which transfers conflicting mass to the full frame as ignorance
    /// and is defined for any pair of sources.
    Yager,
}

impl MassFunction {
    /// Combines two mass functions over the same frame under the given rule.
    ///
    /// # Arguments
    ///
    /// * `other` - The mass function of the second, independent source.
    /// * `rule` - The [`CombinationRule`] to apply.
    pub fn combine(&self, other: &Self, rule: CombinationRule) -> Result<Self, EvidenceError> {
        match rule {
            CombinationRule::Dempster => self.combine_dempster(other),
            CombinationRule::Yager => self.combine_yager(other),
        }
    }

    /// Combines two mass functions with Dempster's rule of combination[^1].
    ///
    /// The masses of intersecting focal elements multiply and accumulate, while mass
    /// assigned to disjoint pairs becomes conflict that the remaining masses are
    /// renormalized by. Returns [`EvidenceError::TotalConflict`] when every pair of
    /// focal elements is disjoint, since nothing remains to renormalize.
    ///
    /// # Arguments
    ///
    /// * `other` - The mass function of the second, independent source.
    ///
    /// [^1]: Arthur P. Dempster. 1967. Upper and lower probabilities induced by a
    ///     multivalued mapping. The Annals of Mathematical Statistics 38, 2 (1967),
    ///     325-339. DOI:<https://doi.org/10.1214/aoms/1177698950>
    pub fn combine_dempster(&self, other: &Self) -> Result<Self, EvidenceError> {
        let (mut combined, conflict) = self.intersect_masses(other)?;
        let remainder = 1.0 - conflict;
        // Non-empty intersections should leave normalizable mass, but rounding can
        // still push the conflict up to one.
        if combined.is_empty() || remainder <= 0.0 {
            return Err(EvidenceError::TotalConflict);
        }
        for mass in combined.values_mut() {
            *mass /= remainder;
        }
        Ok(Self {
            frame: self.frame.clone(),
            masses: combined,
        })
    }

    /// Combines two mass functions with Yager's rule[^1].
    ///
    /// Intersections accumulate exactly as under Dempster's rule, but conflicting mass
    /// is handed to the full frame instead of being normalized away. Under total
    /// conflict the result is therefore the vacuous mass function.
    ///
    /// # Arguments
    ///
    /// * `other` - The mass function of the second, independent source.
    ///
    /// [^1]: Ronald R. Yager. 1987. On the Dempster-Shafer framework and new
    ///     combination rules. Information Sciences 41, 2 (1987), 93-137.
    ///     DOI:<https://doi.org/10.1016/0020-0255(87)90007-7>
    pub fn combine_yager(&self, other: &Self) -> Result<Self, EvidenceError> {
        let (mut combined, conflict) = self.intersect_masses(other)?;
        if conflict > 0.0 {
            *combined.entry(self.frame.full_set()).or_insert(0.0) += conflict;
        }
        Ok(Self {
            frame: self.frame.clone(),
            masses: combined,
        })
    }

    /// Folds a sequence of mass functions into one by repeated pairwise combination.
    ///
    /// Sources combine left to right in iteration order. Dempster's rule is commutative
    /// and associative, so its fold order does not matter. Yager's rule accumulates
    /// ignorance pairwise and its result depends on the order sources are supplied in.
    ///
    /// # Arguments
    ///
    /// * `sources` - The mass functions to be combined.
    /// * `rule` - The [`CombinationRule`] applied at each step.
    pub fn combine_multiple<'a, I>(sources: I, rule: CombinationRule) -> Result<Self, EvidenceError>
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        let mut sources = sources.into_iter();
        let first = sources.next().ok_or(EvidenceError::InsufficientEvidence)?;
        first.validate()?;
        let mut combined = first.clone();
        for source in sources {
            combined = combined.combine(source, rule)?;
        }
        Ok(combined)
    }

    /// The conflict between two mass functions, the total mass their focal elements
    /// assign to disjoint pairs.
    ///
    /// Zero means the sources never contradict each other; one means total conflict.
    ///
    /// # Arguments
    ///
    /// * `other` - The mass function of the second, independent source.
    pub fn conflict(&self, other: &Self) -> Result<f64, EvidenceError> {
        Ok(self.intersect_masses(other)?.1)
    }

    /// Multiplies out the focal elements of two mass functions, accumulating the mass
    /// of non-empty intersections and returning the conflict, the total mass that fell
    /// on disjoint pairs.
    fn intersect_masses(
        &self,
        other: &Self,
    ) -> Result<(BTreeMap<Subset, f64>, f64), EvidenceError> {
        if self.frame != other.frame {
            return Err(EvidenceError::FrameMismatch(
                other.frame.full_set().to_string(),
            ));
        }
        self.validate()?;
        other.validate()?;
        let mut combined: BTreeMap<Subset, f64> = BTreeMap::new();
        let mut conflict = 0.0;
        for (left, &left_mass) in &self.masses {
            for (right, &right_mass) in &other.masses {
                let product = left_mass * right_mass;
                if product == 0.0 {
                    continue;
                }
                let intersection = left.intersection(right);
                if intersection.is_empty() {
                    conflict += product;
                } else {
                    *combined.entry(intersection).or_insert(0.0) += product;
                }
            }
        }
        Ok((combined, conflict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;
    use std::str::FromStr;

    fn candidates() -> Frame {
        Frame::new(["1", "2", "3", "4"]).unwrap()
    }

    /// Five experts prefer candidate 1 and three consider only 2 or 3 viable.
    fn first_panel() -> MassFunction {
        MassFunction::new(
            candidates(),
            [
                (Subset::new(["1"]), 5.0),
                (Subset::new(["2", "3"]), 3.0),
            ],
        )
        .unwrap()
    }

    /// A second panel weighs {1,2} at 8, {3} at 7, and {4} at 1.
    fn second_panel() -> MassFunction {
        MassFunction::new(
            candidates(),
            [
                (Subset::new(["1", "2"]), 8.0),
                (Subset::new(["3"]), 7.0),
                (Subset::new(["4"]), 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn dempster_normalizes_conflict_away() -> Result<(), Box<dyn std::error::Error>> {
        let combined = first_panel().combine_dempster(&second_panel())?;

        // The conflict is 43/128, leaving masses of 40, 24, and 21 over 85.
        assert_relative_eq!(
            combined.mass(&Subset::new(["1"])),
            8.0 / 17.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.mass(&Subset::new(["2"])),
            24.0 / 85.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.mass(&Subset::new(["3"])),
            21.0 / 85.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_eq!(combined.focal_elements().count(), 3);

        assert_relative_eq!(
            combined.belief(&Subset::new(["1"]))?,
            8.0 / 17.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.plausibility(&Subset::new(["1"]))?,
            8.0 / 17.0,
            epsilon = 2.0 * f64::EPSILON
        );
        Ok(())
    }

    #[test]
    fn yager_transfers_conflict_to_the_frame() -> Result<(), Box<dyn std::error::Error>> {
        let combined = first_panel().combine_yager(&second_panel())?;

        assert_relative_eq!(
            combined.mass(&Subset::new(["1"])),
            40.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.mass(&Subset::new(["2"])),
            24.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.mass(&Subset::new(["3"])),
            21.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            combined.mass(&candidates().full_set()),
            43.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        Ok(())
    }

    #[test]
    fn rules_agree_when_there_is_no_conflict() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let first = MassFunction::new(
            frame.clone(),
            [(Subset::new(["a"]), 1.0), (frame.full_set(), 1.0)],
        )?;
        let second = MassFunction::new(
            frame.clone(),
            [(Subset::new(["a", "b"]), 3.0), (Subset::new(["a"]), 1.0)],
        )?;

        let dempster = first.combine_dempster(&second)?;
        let yager = first.combine_yager(&second)?;
        assert_relative_eq!(dempster, yager);
        Ok(())
    }

    #[test]
    fn dempster_is_commutative() -> Result<(), Box<dyn std::error::Error>> {
        let forward = first_panel().combine_dempster(&second_panel())?;
        let reverse = second_panel().combine_dempster(&first_panel())?;
        assert_relative_eq!(forward, reverse, epsilon = 2.0 * f64::EPSILON);
        Ok(())
    }

    #[test]
    fn dempster_is_associative() -> Result<(), Box<dyn std::error::Error>> {
        let third = MassFunction::new(
            candidates(),
            [(Subset::new(["1", "4"]), 1.0), (candidates().full_set(), 1.0)],
        )?;

        let left = first_panel()
            .combine_dempster(&second_panel())?
            .combine_dempster(&third)?;
        let right = first_panel().combine_dempster(&second_panel().combine_dempster(&third)?)?;
        assert_relative_eq!(left, right, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn vacuous_evidence_is_neutral() -> Result<(), Box<dyn std::error::Error>> {
        let vacuous = MassFunction::vacuous(candidates());
        for rule in [CombinationRule::Dempster, CombinationRule::Yager] {
            let combined = first_panel().combine(&vacuous, rule)?;
            assert_relative_eq!(combined, first_panel(), epsilon = 2.0 * f64::EPSILON);
        }
        Ok(())
    }

    #[test]
    fn contradicted_minority_opinion_prevails() -> Result<(), Box<dyn std::error::Error>> {
        // Two sources each back a different majority candidate, agreeing only on a
        // marginal third option, which ends up with all of the normalized mass.
        let frame = Frame::new(["a", "b", "c"])?;
        let first = MassFunction::new(
            frame.clone(),
            [(Subset::new(["a"]), 3.0), (Subset::new(["b"]), 1.0)],
        )?;
        let second = MassFunction::new(
            frame.clone(),
            [(Subset::new(["c"]), 3.0), (Subset::new(["b"]), 1.0)],
        )?;

        let combined = first.combine_dempster(&second)?;
        assert_eq!(combined.focal_elements().count(), 1);
        assert_relative_eq!(
            combined.mass(&Subset::new(["b"])),
            1.0,
            epsilon = 2.0 * f64::EPSILON
        );
        Ok(())
    }

    #[test]
    fn conflict_measures_disagreement() -> Result<(), Box<dyn std::error::Error>> {
        assert_relative_eq!(
            first_panel().conflict(&second_panel())?,
            43.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            second_panel().conflict(&first_panel())?,
            43.0 / 128.0,
            epsilon = 2.0 * f64::EPSILON
        );
        assert_relative_eq!(
            first_panel().conflict(&MassFunction::vacuous(candidates()))?,
            0.0
        );
        Ok(())
    }

    #[test]
    fn dempster_fails_under_total_conflict() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let first = MassFunction::new(frame.clone(), [(Subset::new(["a"]), 1.0)])?;
        let second = MassFunction::new(frame.clone(), [(Subset::new(["b"]), 1.0)])?;

        let result = first.combine_dempster(&second);
        assert!(matches!(result, Err(EvidenceError::TotalConflict)));
        Ok(())
    }

    #[test]
    fn yager_turns_total_conflict_into_ignorance() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let first = MassFunction::new(frame.clone(), [(Subset::new(["a"]), 1.0)])?;
        let second = MassFunction::new(frame.clone(), [(Subset::new(["b"]), 1.0)])?;

        let combined = first.combine_yager(&second)?;
        assert_relative_eq!(combined, MassFunction::vacuous(frame));
        Ok(())
    }

    #[test]
    fn combine_rejects_mismatched_frames() -> Result<(), Box<dyn std::error::Error>> {
        let first = MassFunction::vacuous(Frame::new(["a", "b"])?);
        let second = MassFunction::vacuous(Frame::new(["b", "c"])?);

        let result = first.combine(&second, CombinationRule::Dempster);
        assert!(matches!(result, Err(EvidenceError::FrameMismatch(_))));
        Ok(())
    }

    #[test]
    fn combine_rejects_malformed_masses() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let broken = MassFunction {
            frame: frame.clone(),
            masses: BTreeMap::from([(Subset::new(["a"]), 0.5)]),
        };

        let result = MassFunction::vacuous(frame).combine(&broken, CombinationRule::Yager);
        assert!(matches!(result, Err(EvidenceError::MalformedMass(_))));
        Ok(())
    }

    #[test]
    fn combine_multiple_folds_pairwise() -> Result<(), Box<dyn std::error::Error>> {
        let third = MassFunction::new(
            candidates(),
            [(Subset::new(["1", "4"]), 1.0), (candidates().full_set(), 1.0)],
        )?;
        let sources = vec![first_panel(), second_panel(), third];

        let folded = MassFunction::combine_multiple(&sources, CombinationRule::Dempster)?;
        let chained = first_panel()
            .combine_dempster(&second_panel())?
            .combine_dempster(&sources[2])?;
        assert_relative_eq!(folded, chained);

        let single = MassFunction::combine_multiple(&sources[..1], CombinationRule::Yager)?;
        assert_relative_eq!(single, first_panel());
        Ok(())
    }

    #[test]
    fn combine_multiple_requires_a_source() {
        let sources: Vec<MassFunction> = vec![];
        let result = MassFunction::combine_multiple(&sources, CombinationRule::Dempster);
        assert!(matches!(result, Err(EvidenceError::InsufficientEvidence)));
    }

    #[test]
    fn rule_names_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(CombinationRule::Dempster.to_string(), "dempster");
        assert_eq!(CombinationRule::Yager.to_string(), "yager");
        assert_eq!(
            CombinationRule::from_str("dempster")?,
            CombinationRule::Dempster
        );
        assert_eq!(CombinationRule::from_str("yager")?, CombinationRule::Yager);
        assert!(CombinationRule::from_str("murphy").is_err());
        assert_eq!(CombinationRule::default(), CombinationRule::Dempster);
        Ok(())
    }
}
