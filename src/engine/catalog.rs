//! Sequence catalog: which sequence fits a contact, phase, and product.
//!
//! Resolution walks a fixed priority list of rules top-down; the first match
//! wins. Nothing matching falls through to the major-projects sequence.

use crate::model::{ProductType, ProjectPhase, SequenceDefinition, StepTemplate, TouchKind};

/// Coarse classification of a free-text job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCategory {
    Architect,
    Designer,
    FacilitiesDirector,
    GeneralContractor,
    Procurement,
    Other,
}

impl RoleCategory {
    /// Classify a job title by keyword. Earlier keywords win, so
    /// "Interior Architect" is an architect and "Interior Designer" a designer.
    pub fn classify(role: &str) -> Self {
        const KEYWORDS: &[(&str, RoleCategory)] = &[
            ("architect", RoleCategory::Architect),
            ("designer", RoleCategory::Designer),
            ("design director", RoleCategory::Designer),
            ("facilit", RoleCategory::FacilitiesDirector),
            ("contractor", RoleCategory::GeneralContractor),
            ("superintendent", RoleCategory::GeneralContractor),
            ("procurement", RoleCategory::Procurement),
            ("purchasing", RoleCategory::Procurement),
            ("buyer", RoleCategory::Procurement),
        ];
        let role = role.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| role.contains(keyword))
            .map_or(Self::Other, |(_, category)| *category)
    }
}

/// One catalog rule. `product: None` matches any product.
struct Rule {
    role: RoleCategory,
    phases: &'static [ProjectPhase],
    product: Option<ProductType>,
    sequence: fn() -> SequenceDefinition,
}

impl Rule {
    fn matches(&self, role: RoleCategory, phase: ProjectPhase, product: ProductType) -> bool {
        self.role == role
            && self.phases.contains(&phase)
            && self.product.is_none_or(|p| p == product)
    }
}

const RULES: &[Rule] = &[
    Rule {
        role: RoleCategory::Architect,
        phases: &[ProjectPhase::SchematicDesign],
        product: Some(ProductType::Flooring),
        sequence: design_phase_flooring,
    },
    Rule {
        role: RoleCategory::Architect,
        phases: &[ProjectPhase::SchematicDesign],
        product: None,
        sequence: early_design_introduction,
    },
    Rule {
        role: RoleCategory::Architect,
        phases: &[ProjectPhase::DesignDevelopment],
        product: None,
        sequence: specification_push,
    },
    Rule {
        role: RoleCategory::Designer,
        phases: &[ProjectPhase::SchematicDesign, ProjectPhase::DesignDevelopment],
        product: None,
        sequence: designer_inspiration,
    },
    Rule {
        role: RoleCategory::FacilitiesDirector,
        phases: &[ProjectPhase::Planning],
        product: None,
        sequence: owner_early_engagement,
    },
    Rule {
        role: RoleCategory::GeneralContractor,
        phases: &[ProjectPhase::Construction],
        product: None,
        sequence: bid_support,
    },
    Rule {
        role: RoleCategory::Procurement,
        phases: &[ProjectPhase::ConstructionDocuments],
        product: None,
        sequence: procurement_alignment,
    },
];

/// Recommend a sequence for a contact role, project phase, and product.
pub fn recommend(role: &str, phase: ProjectPhase, product: ProductType) -> SequenceDefinition {
    let category = RoleCategory::classify(role);
    RULES
        .iter()
        .find(|rule| rule.matches(category, phase, product))
        .map_or_else(major_projects, |rule| (rule.sequence)())
}

fn step(kind: TouchKind, offset_days: u32, description: &str) -> StepTemplate {
    StepTemplate {
        kind,
        offset_days,
        description: description.to_string(),
    }
}

fn definition(name: &str, steps: Vec<StepTemplate>) -> SequenceDefinition {
    let touchpoints = steps.iter().filter(|s| s.kind != TouchKind::Wait).count();
    SequenceDefinition {
        name: name.to_string(),
        steps,
        touchpoints: u32::try_from(touchpoints).unwrap_or(u32::MAX),
    }
}

fn design_phase_flooring() -> SequenceDefinition {
    definition(
        "Design-phase flooring spec",
        vec![
            step(TouchKind::Email, 0, "Introduce flooring options for the renderings"),
            step(TouchKind::PhoneCall, 3, "Call to offer a sample review"),
            step(TouchKind::Email, 7, "Send the spec-ready follow-up"),
        ],
    )
}

fn early_design_introduction() -> SequenceDefinition {
    definition(
        "Early design introduction",
        vec![
            step(TouchKind::Email, 0, "Introduce the product line"),
            step(TouchKind::PhoneCall, 3, "Call to learn the design intent"),
            step(TouchKind::Email, 7, "Share relevant case studies"),
        ],
    )
}

fn specification_push() -> SequenceDefinition {
    definition(
        "Specification push",
        vec![
            step(TouchKind::Email, 0, "Send specification sheets"),
            step(TouchKind::PhoneCall, 3, "Call to walk through the specs"),
            step(TouchKind::Email, 7, "Offer a lunch-and-learn"),
            step(TouchKind::PhoneCall, 14, "Call before the spec deadline"),
        ],
    )
}

fn designer_inspiration() -> SequenceDefinition {
    definition(
        "Designer inspiration",
        vec![
            step(TouchKind::Email, 0, "Share the inspiration lookbook"),
            step(TouchKind::PhoneCall, 3, "Call to offer samples"),
            step(TouchKind::Email, 7, "Send a palette matched to the project"),
            step(TouchKind::Wait, 10, "Give samples time to arrive"),
            step(TouchKind::Email, 14, "Ask for feedback on the samples"),
        ],
    )
}

fn owner_early_engagement() -> SequenceDefinition {
    definition(
        "Owner early engagement",
        vec![
            step(TouchKind::Email, 0, "Introduce lifecycle cost savings"),
            step(TouchKind::PhoneCall, 3, "Call to discuss facility standards"),
            step(TouchKind::Email, 10, "Send a total-cost-of-ownership summary"),
            step(TouchKind::PhoneCall, 17, "Call to propose a site visit"),
        ],
    )
}

fn bid_support() -> SequenceDefinition {
    definition(
        "Bid support",
        vec![
            step(TouchKind::Email, 0, "Offer bid pricing support"),
            step(TouchKind::PhoneCall, 3, "Call to confirm quantities and schedule"),
            step(TouchKind::Email, 7, "Send lead times and install details"),
        ],
    )
}

fn procurement_alignment() -> SequenceDefinition {
    definition(
        "Procurement alignment",
        vec![
            step(TouchKind::Email, 0, "Share contract pricing options"),
            step(TouchKind::PhoneCall, 3, "Call to review vendor requirements"),
            step(TouchKind::Email, 7, "Send onboarding paperwork"),
        ],
    )
}

/// The fallback: six touchpoints over four weeks.
fn major_projects() -> SequenceDefinition {
    definition(
        "Major projects",
        vec![
            step(TouchKind::Email, 0, "Introduce the team and capabilities"),
            step(TouchKind::PhoneCall, 3, "Call to qualify scope and timeline"),
            step(TouchKind::Email, 7, "Share comparable project references"),
            step(TouchKind::PhoneCall, 14, "Call to propose a meeting"),
            step(TouchKind::Email, 21, "Send a tailored product overview"),
            step(TouchKind::Email, 28, "Close the loop"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_titles() {
        assert_eq!(RoleCategory::classify("Principal Architect"), RoleCategory::Architect);
        assert_eq!(RoleCategory::classify("Senior Interior Designer"), RoleCategory::Designer);
        assert_eq!(
            RoleCategory::classify("Director of Facilities"),
            RoleCategory::FacilitiesDirector
        );
        assert_eq!(RoleCategory::classify("Purchasing Manager"), RoleCategory::Procurement);
        assert_eq!(RoleCategory::classify("CFO"), RoleCategory::Other);
    }

    #[test]
    fn product_specific_rule_wins_over_general() {
        let def = recommend(
            "Principal Architect",
            ProjectPhase::SchematicDesign,
            ProductType::Flooring,
        );
        assert_eq!(def.name, "Design-phase flooring spec");

        let def = recommend(
            "Principal Architect",
            ProjectPhase::SchematicDesign,
            ProductType::Lighting,
        );
        assert_eq!(def.name, "Early design introduction");
    }

    #[test]
    fn unmatched_falls_back_to_major_projects() {
        let def = recommend("CFO", ProjectPhase::Construction, ProductType::Other);
        assert_eq!(def.name, "Major projects");
        assert_eq!(def.touchpoints, 6);
        assert_eq!(def.span_days(), 28);
    }

    #[test]
    fn touchpoints_exclude_waits() {
        let def = recommend(
            "Interior Designer",
            ProjectPhase::DesignDevelopment,
            ProductType::Furniture,
        );
        assert_eq!(def.name, "Designer inspiration");
        assert_eq!(def.steps.len(), 5);
        assert_eq!(def.touchpoints, 4);
    }

    #[test]
    fn every_definition_opens_with_an_email() {
        let mut defs: Vec<SequenceDefinition> = RULES.iter().map(|r| (r.sequence)()).collect();
        defs.push(major_projects());
        for def in defs {
            assert_eq!(def.steps[0].kind, TouchKind::Email, "{}", def.name);
            assert_eq!(def.steps[0].offset_days, 0, "{}", def.name);
        }
    }

    #[test]
    fn recommend_is_pure() {
        let a = recommend("Architect", ProjectPhase::DesignDevelopment, ProductType::Acoustics);
        let b = recommend("Architect", ProjectPhase::DesignDevelopment, ProductType::Acoustics);
        assert_eq!(a, b);
    }
}
