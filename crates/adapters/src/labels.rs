//! The `labels` module parses the brace-delimited subset notation used by every
//! evidence format, e.g. `{rain}`, `{rain,snow}`, or `∅` for the empty set.

use crate::LabelError;
use credence_engine::Subset;
use regex::Regex;

lazy_static! {
    static ref RE_VALID_ELEMENT: Regex = Regex::new(r"^[^,{}]+$").unwrap();
}

/// Parses a subset label into a [`Subset`].
///
/// Elements are comma-separated inside a single pair of braces and surrounding
/// whitespace is ignored, so `{ rain, snow }` and `{rain,snow}` are the same subset.
/// `∅` and `{}` both denote the empty set.
///
/// # Arguments
///
/// * `label` - The subset label to parse.
pub fn parse_subset(label: &str) -> Result<Subset, LabelError> {
    let trimmed = label.trim();
    if trimmed == "∅" || trimmed == "{}" {
        return Ok(Subset::empty());
    }
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| LabelError::MissingBraces(label.to_string()))?;
    let mut elements = Vec::new();
    for token in inner.split(',') {
        let token = token.trim();
        if !RE_VALID_ELEMENT.is_match(token) {
            return Err(LabelError::InvalidElement(label.to_string()));
        }
        elements.push(token.to_string());
    }
    Ok(Subset::new(elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singletons_and_wider_subsets() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(parse_subset("{rain}")?, Subset::new(["rain"]));
        assert_eq!(
            parse_subset("{snow,rain}")?,
            Subset::new(["rain", "snow"])
        );
        assert_eq!(
            parse_subset(" { rain , snow } ")?,
            Subset::new(["rain", "snow"])
        );
        assert_eq!(parse_subset("{28-30,30-32}")?, Subset::new(["28-30", "30-32"]));
        // Repeated elements collapse.
        assert_eq!(
            parse_subset("{snow,rain,rain}")?,
            Subset::new(["rain", "snow"])
        );
        Ok(())
    }

    #[test]
    fn parses_the_empty_set() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(parse_subset("∅")?, Subset::empty());
        assert_eq!(parse_subset("{}")?, Subset::empty());
        Ok(())
    }

    #[test]
    fn rejects_labels_without_braces() {
        assert!(matches!(
            parse_subset("rain"),
            Err(LabelError::MissingBraces(_))
        ));
        assert!(matches!(
            parse_subset("{rain"),
            Err(LabelError::MissingBraces(_))
        ));
        assert!(matches!(
            parse_subset("rain}"),
            Err(LabelError::MissingBraces(_))
        ));
    }

    #[test]
    fn rejects_blank_and_nested_elements() {
        assert!(matches!(
            parse_subset("{rain,,snow}"),
            Err(LabelError::InvalidElement(_))
        ));
        assert!(matches!(
            parse_subset("{rain,{snow}}"),
            Err(LabelError::InvalidElement(_))
        ));
        assert!(matches!(
            parse_subset("{ }"),
            Err(LabelError::InvalidElement(_))
        ));
    }

    #[test]
    fn round_trips_through_display() -> Result<(), Box<dyn std::error::Error>> {
        let subset = Subset::new(["rain", "snow"]);
        assert_eq!(parse_subset(&subset.to_string())?, subset);
        assert_eq!(parse_subset(&Subset::empty().to_string())?, Subset::empty());
        Ok(())
    }
}
