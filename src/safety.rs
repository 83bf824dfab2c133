//! Content-safety auditor: tiers free-text input facts for review.
//!
//! Pure relabeling over extractor output. What counts as a sensitive
//! context or an exempt line is decided upstream by the policy config.

use crate::types::{Fact, FreeTextViolation, Tier};

/// Turn every free-text fact into a violation, tiered by whether a safety
/// comment was found near it. Both tiers are kept; nothing is suppressed.
pub fn classify(facts: &[Fact]) -> Vec<FreeTextViolation> {
    return facts
        .iter()
        .filter_map(|fact| {
            let Fact::FreeTextInput { annotated, at, text } = fact else {
                return None;
            };
            let tier = if *annotated { Tier::Annotated } else { Tier::NeedsReview };
            return Some(FreeTextViolation {
                at: at.clone(),
                text: text.clone(),
                tier,
            });
        })
        .collect();
}

/// Count of violations in the given tier.
pub fn count_in(violations: &[FreeTextViolation], tier: Tier) -> usize {
    return violations.iter().filter(|v| return v.tier == tier).count();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::{PathString, Provenance};

    fn input(annotated: bool, line: u32) -> Fact {
        Fact::FreeTextInput {
            annotated,
            at: Provenance {
                file: PathBuf::from("src/pages/DosingSession.tsx"),
                line,
            },
            text: "<textarea />".to_string(),
        }
    }

    #[test]
    fn both_tiers_are_reported_in_discovery_order() {
        let facts = vec![
            input(false, 3),
            Fact::NavLink {
                at: Provenance {
                    file: PathBuf::from("src/Nav.tsx"),
                    line: 1,
                },
                path: PathString::new("/a"),
            },
            input(true, 8),
        ];
        let violations = classify(&facts);
        let tiers: Vec<(Tier, u32)> = violations.iter().map(|v| (v.tier, v.at.line)).collect();
        assert_eq!(tiers, vec![(Tier::NeedsReview, 3), (Tier::Annotated, 8)]);
        assert_eq!(count_in(&violations, Tier::NeedsReview), 1);
        assert_eq!(count_in(&violations, Tier::Annotated), 1);
    }
}
