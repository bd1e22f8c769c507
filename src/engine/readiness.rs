//! Readiness evaluation: is outreach timely for this deal?
//!
//! Readiness is derived from the deal's accumulated signals. Only milestone
//! signals count, and readiness never regresses once reached.

use crate::model::{Contact, Deal, OutreachProfile, ReadinessStatus, Signal, SignalKind};

/// Recompute the readiness fields of the deal's profile from its signals.
///
/// Idempotent, and touches nothing but readiness: contacts, runs, and calls
/// are carried over as they are.
pub fn evaluate(deal: &Deal) -> OutreachProfile {
    let triggers: Vec<String> = milestones(&deal.signals)
        .map(|s| s.description.clone())
        .collect();

    let mut profile = deal.profile.clone();
    if triggers.is_empty() && profile.readiness_status == ReadinessStatus::NotReady {
        profile.readiness_reason = not_ready_reason(deal);
        profile.ready_triggers = None;
        return profile;
    }

    profile.readiness_status = ReadinessStatus::Ready;
    if !triggers.is_empty() {
        profile.readiness_reason = format!(
            "{} is showing buying signals: {}.",
            deal.project,
            triggers.join("; ")
        );
        profile.ready_triggers = Some(triggers);
    }
    profile
}

/// Append a signal and re-evaluate.
///
/// When this flips the deal to ready and a signal surfaced a contact, that
/// contact replaces the primary contact as new and unconfirmed. The contact
/// it replaces is kept so a decline can put it back.
///
/// Returns `true` when readiness flipped.
pub fn record_signal(deal: &mut Deal, signal: Signal) -> bool {
    let was_ready = deal.profile.readiness_status == ReadinessStatus::Ready;
    deal.signals.push(signal);
    deal.profile = evaluate(deal);

    let flipped = !was_ready && deal.profile.readiness_status == ReadinessStatus::Ready;
    if !flipped {
        return false;
    }

    log::debug!("deal {} is now ready for outreach", deal.id);
    if let Some(candidate) = discovered_contact(&deal.signals) {
        let new_contact = Contact {
            is_new: true,
            confirmed: false,
            ..candidate.clone()
        };
        deal.profile.displaced_contact = deal.profile.primary_contact.replace(new_contact);
    }
    true
}

fn milestones(signals: &[Signal]) -> impl Iterator<Item = &Signal> {
    signals.iter().filter(|s| s.kind == SignalKind::Milestone)
}

/// The most recently surfaced contact across all signals.
fn discovered_contact(signals: &[Signal]) -> Option<&Contact> {
    signals.iter().rev().find_map(|s| s.contact.as_ref())
}

fn not_ready_reason(deal: &Deal) -> String {
    let background: Vec<&str> = deal
        .signals
        .iter()
        .filter(|s| s.kind == SignalKind::Informational)
        .map(|s| s.description.as_str())
        .collect();

    let mut reason = format!(
        "No qualifying signals yet for {}. It is still in {}, and outreach opens once \
         design milestones surface (renderings, permits, or architect selection).",
        deal.project,
        deal.phase.label()
    );
    if !background.is_empty() {
        reason.push_str(" Background only so far: ");
        reason.push_str(&background.join("; "));
        reason.push('.');
    }
    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::engine::testing::{contact, deal};

    fn milestone(description: &str, contact: Option<Contact>) -> Signal {
        Signal {
            description: description.into(),
            kind: SignalKind::Milestone,
            observed_at: Timestamp::UNIX_EPOCH,
            source_url: None,
            contact,
        }
    }

    #[test]
    fn no_signals_is_not_ready() {
        let profile = evaluate(&deal());
        assert_eq!(profile.readiness_status, ReadinessStatus::NotReady);
        assert!(profile.readiness_reason.contains("No qualifying signals"));
        assert!(profile.ready_triggers.is_none());
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut d = deal();
        record_signal(&mut d, milestone("first renderings published", None));
        let once = evaluate(&d);
        d.profile = once.clone();
        let twice = evaluate(&d);
        assert_eq!(once.readiness_status, twice.readiness_status);
        assert_eq!(once.readiness_reason, twice.readiness_reason);
        assert_eq!(once.ready_triggers, twice.ready_triggers);
    }

    #[test]
    fn informational_signal_does_not_flip() {
        let mut d = deal();
        let flipped = record_signal(
            &mut d,
            Signal {
                kind: SignalKind::Informational,
                ..milestone("hospital board meeting scheduled", None)
            },
        );
        assert!(!flipped);
        assert_eq!(d.profile.readiness_status, ReadinessStatus::NotReady);
        assert!(d.profile.readiness_reason.contains("board meeting"));
    }

    #[test]
    fn milestone_flips_and_attaches_new_contact() {
        let mut d = deal();
        let original = d.profile.primary_contact.clone();
        let flipped = record_signal(
            &mut d,
            milestone("first renderings published", Some(contact("c-new", "Sarah Chen"))),
        );

        assert!(flipped);
        assert_eq!(d.profile.readiness_status, ReadinessStatus::Ready);
        assert_eq!(
            d.profile.ready_triggers,
            Some(vec!["first renderings published".to_string()])
        );
        let primary = d.profile.primary_contact.as_ref().unwrap();
        assert_eq!(primary.id, "c-new");
        assert!(primary.is_new);
        assert!(!primary.confirmed);
        assert_eq!(d.profile.displaced_contact, original);
    }

    #[test]
    fn triggers_concatenate_milestones() {
        let mut d = deal();
        record_signal(&mut d, milestone("renderings published", None));
        let flipped = record_signal(&mut d, milestone("permit filed", None));

        assert!(!flipped);
        assert_eq!(
            d.profile.ready_triggers,
            Some(vec![
                "renderings published".to_string(),
                "permit filed".to_string()
            ])
        );
    }

    #[test]
    fn contact_after_flip_is_not_attached() {
        let mut d = deal();
        record_signal(&mut d, milestone("renderings published", None));
        record_signal(
            &mut d,
            milestone("permit filed", Some(contact("c-late", "Late Contact"))),
        );
        assert_ne!(d.profile.primary_contact.unwrap().id, "c-late");
    }
}
