//! Generated content: email drafts, follow-ups, and voicemail scripts.
//!
//! Pure template substitution over the deal and contact. Same inputs,
//! same text.

use crate::model::{Contact, Deal};

/// Subject line prefix in rendered email text.
const SUBJECT_PREFIX: &str = "Subject: ";

/// Transcript lines quoted back in a post-call follow-up.
const MAX_TRANSCRIPT_FRAGMENTS: usize = 3;

/// An email draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Render as stored step content: a subject line, a blank line, the body.
    pub fn render(&self) -> String {
        format!("{SUBJECT_PREFIX}{}\n\n{}", self.subject, self.body)
    }

    /// Parse step content back into an email.
    ///
    /// Content without a leading subject line is all body, with the
    /// fallback subject.
    pub fn parse(content: &str, fallback_subject: &str) -> Self {
        if let Some(rest) = content.strip_prefix(SUBJECT_PREFIX) {
            let (subject, body) = rest.split_once('\n').unwrap_or((rest, ""));
            return Self {
                subject: subject.trim().to_string(),
                body: body.trim_start_matches('\n').to_string(),
            };
        }
        Self {
            subject: fallback_subject.to_string(),
            body: content.to_string(),
        }
    }
}

/// Subject used when an operator-written email carries none.
pub fn default_subject(deal: &Deal) -> String {
    format!("{}: {}", deal.project, deal.product.label())
}

/// First touch of a sequence.
pub fn introduction(deal: &Deal, contact: &Contact) -> Email {
    Email {
        subject: format!("{} {} for {}", deal.company, deal.product.label(), deal.project),
        body: format!(
            "Hi {first},\n\n\
             I saw that {project} is moving through {phase}. We've supported similar \
             projects with {product} selections, and I'd love to share a few options \
             that fit the design intent before specifications are locked.\n\n\
             Would a 20-minute conversation next week work?\n\n\
             Best,\n{owner}",
            first = contact.first_name(),
            project = deal.project,
            phase = deal.phase.label(),
            product = deal.product.label(),
            owner = deal.owner,
        ),
    }
}

/// The `nth` follow-up (1-based) after the introduction went unanswered.
pub fn follow_up(deal: &Deal, contact: &Contact, nth: usize) -> Email {
    let opener = match nth {
        1 => "Following up on my note from earlier this week.",
        2 => "Circling back in case my last email got buried.",
        _ => "One last note from me on this.",
    };
    Email {
        subject: format!("Re: {} {} for {}", deal.company, deal.product.label(), deal.project),
        body: format!(
            "Hi {first},\n\n\
             {opener} Happy to send samples or case studies for {project} if that's \
             more useful than a call.\n\n\
             Best,\n{owner}",
            first = contact.first_name(),
            project = deal.project,
            owner = deal.owner,
        ),
    }
}

/// Script for a voicemail left on a call step.
pub fn voicemail(deal: &Deal, contact: &Contact) -> String {
    format!(
        "Hi {first}, this is {owner}. I'm calling about {project} and the {product} \
         package. I sent over a note earlier this week and would love a few minutes \
         when you have them. I'll follow up by email as well. Thanks!",
        first = contact.first_name(),
        owner = deal.owner,
        project = deal.project,
        product = deal.product.label(),
    )
}

/// Follow-up email after a connected call, quoting what was said.
pub fn call_follow_up(deal: &Deal, contact: &Contact, transcript: &str, notes: &str) -> Email {
    let fragments: Vec<&str> = transcript
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_TRANSCRIPT_FRAGMENTS)
        .collect();

    let mut body = format!(
        "Hi {first},\n\nThanks for taking the time to talk about {project} today.",
        first = contact.first_name(),
        project = deal.project,
    );
    if !fragments.is_empty() {
        body.push_str(" To recap what we covered:\n");
        for fragment in fragments {
            body.push_str("\n- ");
            body.push_str(fragment);
        }
        body.push('\n');
    }
    if !notes.trim().is_empty() {
        body.push_str("\nNext steps on my side: ");
        body.push_str(notes.trim());
        body.push('\n');
    }
    body.push_str(&format!("\nBest,\n{}", deal.owner));

    Email {
        subject: format!("Great speaking today: {}", deal.project),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::model::{DealStage, OutreachProfile, ProductType, ProjectPhase};

    fn deal() -> Deal {
        Deal {
            id: Uuid::new_v4(),
            title: "Riverside flooring".into(),
            value: 250_000,
            stage: DealStage::Outreach,
            owner: "Jordan Lee".into(),
            company: "Acme Surfaces".into(),
            project: "Riverside Medical Center".into(),
            phase: ProjectPhase::SchematicDesign,
            product: ProductType::Flooring,
            created_at: Timestamp::UNIX_EPOCH,
            signals: vec![],
            profile: OutreachProfile::new(None),
        }
    }

    fn contact() -> Contact {
        Contact {
            id: "c-1".into(),
            name: "Sarah Chen".into(),
            role: "Principal Architect".into(),
            company: "Chen Studio".into(),
            email: None,
            phone: None,
            is_new: false,
            confirmed: true,
        }
    }

    #[test]
    fn rendered_email_parses_back() {
        let email = introduction(&deal(), &contact());
        let parsed = Email::parse(&email.render(), "unused");
        assert_eq!(parsed, email);
    }

    #[test]
    fn parse_without_subject_uses_fallback() {
        let parsed = Email::parse("Just checking in.", "Fallback");
        assert_eq!(parsed.subject, "Fallback");
        assert_eq!(parsed.body, "Just checking in.");
    }

    #[test]
    fn introduction_addresses_contact_and_signs_as_owner() {
        let email = introduction(&deal(), &contact());
        assert!(email.body.starts_with("Hi Sarah,"));
        assert!(email.body.ends_with("Jordan Lee"));
        assert!(email.body.contains("schematic design"));
    }

    #[test]
    fn call_follow_up_quotes_transcript_lines() {
        let transcript = "They want LVT in patient rooms.\n\nBudget review is in March.\nExtra\nMore";
        let email = call_follow_up(&deal(), &contact(), transcript, "send samples");
        assert!(email.body.contains("- They want LVT in patient rooms."));
        assert!(email.body.contains("- Budget review is in March."));
        assert!(email.body.contains("- Extra"));
        assert!(!email.body.contains("- More"));
        assert!(email.body.contains("Next steps on my side: send samples"));
    }

    #[test]
    fn call_follow_up_without_transcript_is_still_a_draft() {
        let email = call_follow_up(&deal(), &contact(), "", "");
        assert!(!email.body.contains("recap"));
        assert!(email.body.contains("Riverside Medical Center"));
    }

    #[test]
    fn follow_ups_vary_by_position() {
        let first = follow_up(&deal(), &contact(), 1);
        let second = follow_up(&deal(), &contact(), 2);
        assert_ne!(first.body, second.body);
        assert!(first.subject.starts_with("Re: "));
    }
}
