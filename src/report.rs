//! Renders mass functions and combination results as plain-text reports.

use credence_engine::{EvidenceError, MassFunction, Subset};

/// Masses at or below this value are omitted from distribution reports.
const MASS_DISPLAY_FLOOR: f64 = 0.0001;

/// Renders a subset for display, substituting `Ω` for the full frame.
fn subset_heading(mass_function: &MassFunction, subset: &Subset) -> String {
    if *subset == mass_function.frame().full_set() {
        "Ω".to_string()
    } else {
        subset.to_string()
    }
}

/// Renders the mass distribution of `mass_function` under a titled header,
/// largest masses first, ties broken by subset size.
pub fn mass_distribution(title: &str, mass_function: &MassFunction) -> String {
    let mut focal: Vec<(&Subset, f64)> = mass_function.focal_elements().collect();
    focal.sort_by(|(left_subset, left_mass), (right_subset, right_mass)| {
        right_mass
            .partial_cmp(left_mass)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| left_subset.len().cmp(&right_subset.len()))
    });

    let mut lines = vec![format!("=== {} ===", title)];
    for (subset, mass) in focal {
        if mass > MASS_DISPLAY_FLOOR {
            lines.push(format!(
                "  m({}) = {:.4}",
                subset_heading(mass_function, subset),
                mass
            ));
        }
    }
    lines.join("\n")
}

/// Renders a table of belief and plausibility intervals for the given events,
/// with the uncertainty column giving the width of each interval.
pub fn interval_table(
    mass_function: &MassFunction,
    events: &[Subset],
) -> Result<String, EvidenceError> {
    let headings: Vec<String> = events
        .iter()
        .map(|event| subset_heading(mass_function, event))
        .collect();
    let width = headings
        .iter()
        .map(|heading| heading.chars().count())
        .max()
        .unwrap_or(0)
        .max("Event".len());

    let mut lines = Vec::with_capacity(events.len() + 2);
    lines.push(format!(
        "{:<width$} | {:>6} | {:>12} | {:>11}",
        "Event",
        "Belief",
        "Plausibility",
        "Uncertainty",
        width = width
    ));
    lines.push("-".repeat(width + 38));
    for (event, heading) in events.iter().zip(&headings) {
        let (belief, plausibility) = mass_function.interval(event)?;
        lines.push(format!(
            "{:<width$} | {:6.4} | {:12.4} | {:11.4}",
            heading,
            belief,
            plausibility,
            plausibility - belief,
            width = width
        ));
    }
    Ok(lines.join("\n"))
}

/// Renders a side-by-side comparison of the singleton beliefs produced by
/// Yager's and Dempster's rules, followed by Yager's residual ignorance and,
/// when two sources were compared, the conflict between them.
///
/// `dempster` is `None` when that combination failed with total conflict; its
/// columns then read `n/a` instead of dropping the Yager half of the table.
pub fn rule_comparison(
    yager: &MassFunction,
    dempster: Option<&MassFunction>,
    conflict: Option<f64>,
) -> Result<String, EvidenceError> {
    let width = yager
        .frame()
        .elements()
        .map(|element| element.chars().count())
        .max()
        .unwrap_or(0)
        .max("Element".len());

    let mut lines = vec![
        format!(
            "{:<width$} | {:>6} | {:>8} | {:>10}",
            "Element",
            "Yager",
            "Dempster",
            "Difference",
            width = width
        ),
        "-".repeat(width + 33),
    ];
    for element in yager.frame().elements() {
        let event = Subset::new([element]);
        let yager_belief = yager.belief(&event)?;
        lines.push(match dempster {
            Some(dempster) => {
                let dempster_belief = dempster.belief(&event)?;
                format!(
                    "{:<width$} | {:6.3} | {:8.3} | {:10.3}",
                    element,
                    yager_belief,
                    dempster_belief,
                    dempster_belief - yager_belief,
                    width = width
                )
            }
            None => format!(
                "{:<width$} | {:6.3} | {:>8} | {:>10}",
                element,
                yager_belief,
                "n/a",
                "n/a",
                width = width
            ),
        });
    }
    lines.push(String::new());
    lines.push(format!(
        "Ignorance mass (Ω) under Yager: {:.3}",
        yager.mass(&yager.frame().full_set())
    ));
    if let Some(conflict) = conflict {
        lines.push(format!("Conflict between sources: {:.3}", conflict));
    }
    if dempster.is_none() {
        lines.push("Dempster's rule: total conflict, result undefined".to_string());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_engine::{CombinationRule, Frame};

    fn forecast() -> MassFunction {
        let frame = Frame::new(["rain", "snow", "sun"]).unwrap();
        MassFunction::new(
            frame.clone(),
            [
                (Subset::new(["rain"]), 4.0),
                (Subset::new(["rain", "snow"]), 3.0),
                (frame.full_set(), 3.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn distribution_sorts_by_mass_then_size() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let mass_function = MassFunction::new(
            frame.clone(),
            [
                (Subset::new(["a"]), 1.0),
                (Subset::new(["b"]), 1.0),
                (frame.full_set(), 2.0),
            ],
        )
        .unwrap();

        assert_eq!(
            mass_distribution("Mixture", &mass_function),
            "=== Mixture ===\n  m(Ω) = 0.5000\n  m({a}) = 0.2500\n  m({b}) = 0.2500"
        );
    }

    #[test]
    fn distribution_renders_the_full_frame_as_omega() {
        let frame = Frame::new(["rain", "snow"]).unwrap();
        let mass_function = MassFunction::new(
            frame.clone(),
            [(Subset::new(["rain"]), 3.0), (frame.full_set(), 2.0)],
        )
        .unwrap();

        assert_eq!(
            mass_distribution("Forecast", &mass_function),
            "=== Forecast ===\n  m({rain}) = 0.6000\n  m(Ω) = 0.4000"
        );
    }

    #[test]
    fn distribution_hides_negligible_masses() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let mass_function = MassFunction::new(
            frame,
            [(Subset::new(["a"]), 19999.0), (Subset::new(["b"]), 1.0)],
        )
        .unwrap();

        let report = mass_distribution("Noise", &mass_function);
        assert!(report.contains("m({a})"));
        assert!(!report.contains("m({b})"));
    }

    #[test]
    fn interval_table_lists_each_event() -> Result<(), Box<dyn std::error::Error>> {
        let mass_function = forecast();
        let events = vec![
            Subset::new(["rain"]),
            Subset::new(["snow"]),
            Subset::new(["sun"]),
        ];

        let report = interval_table(&mass_function, &events)?;
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Event  | Belief | Plausibility | Uncertainty");
        assert_eq!(lines[1], "-".repeat(44));
        assert_eq!(lines[2], "{rain} | 0.4000 |       1.0000 |      0.6000");
        assert_eq!(lines[3], "{snow} | 0.0000 |       0.6000 |      0.6000");
        assert_eq!(lines[4], "{sun}  | 0.0000 |       0.3000 |      0.3000");
        Ok(())
    }

    #[test]
    fn interval_table_rejects_out_of_frame_events() {
        let mass_function = forecast();
        let events = vec![Subset::new(["hail"])];
        assert!(interval_table(&mass_function, &events).is_err());
    }

    #[test]
    fn comparison_reports_both_rules() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["1", "2", "3", "4"])?;
        let first = MassFunction::new(
            frame.clone(),
            [(Subset::new(["1"]), 5.0), (Subset::new(["2", "3"]), 3.0)],
        )?;
        let second = MassFunction::new(
            frame,
            [
                (Subset::new(["1", "2"]), 8.0),
                (Subset::new(["3"]), 7.0),
                (Subset::new(["4"]), 1.0),
            ],
        )?;

        let yager = first.combine(&second, CombinationRule::Yager)?;
        let dempster = first.combine(&second, CombinationRule::Dempster)?;
        let conflict = first.conflict(&second)?;

        let report = rule_comparison(&yager, Some(&dempster), Some(conflict))?;
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Element |  Yager | Dempster | Difference");
        assert_eq!(lines[1], "-".repeat(40));
        assert_eq!(lines[4], "3       |  0.164 |    0.247 |      0.083");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Ignorance mass (Ω) under Yager: 0.336");
        assert_eq!(lines[8], "Conflict between sources: 0.336");
        Ok(())
    }

    #[test]
    fn comparison_omits_conflict_when_unknown() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let first = MassFunction::new(frame.clone(), [(Subset::new(["a"]), 1.0)])?;
        let second = MassFunction::vacuous(frame);

        let yager = first.combine(&second, CombinationRule::Yager)?;
        let dempster = first.combine(&second, CombinationRule::Dempster)?;

        let report = rule_comparison(&yager, Some(&dempster), None)?;
        assert!(report.contains("Ignorance mass"));
        assert!(!report.contains("Conflict between sources"));
        assert!(!report.contains("n/a"));
        Ok(())
    }

    #[test]
    fn comparison_marks_total_conflict() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(["a", "b"])?;
        let first = MassFunction::new(frame.clone(), [(Subset::new(["a"]), 1.0)])?;
        let second = MassFunction::new(frame, [(Subset::new(["b"]), 1.0)])?;

        let yager = first.combine(&second, CombinationRule::Yager)?;
        let report = rule_comparison(&yager, None, Some(first.conflict(&second)?))?;
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[2], "a       |  0.000 |      n/a |        n/a");
        assert_eq!(lines[5], "Ignorance mass (Ω) under Yager: 1.000");
        assert_eq!(lines[6], "Conflict between sources: 1.000");
        assert_eq!(lines[7], "Dempster's rule: total conflict, result undefined");
        Ok(())
    }
}
