//! Contact resolution: confirm or decline a newly discovered contact.

use crate::model::{Contact, OutreachProfile};

use super::error::{OutreachError, Result};

/// Confirm the new primary contact.
///
/// Fails with `PreconditionFailed` unless the primary contact is new and
/// unconfirmed; the profile is untouched in that case.
pub fn confirm(profile: &mut OutreachProfile) -> Result<Contact> {
    let contact = pending_contact(profile)?;
    contact.confirmed = true;
    contact.is_new = false;
    let confirmed = contact.clone();
    profile.displaced_contact = None;
    Ok(confirmed)
}

/// Decline the new primary contact.
///
/// Puts back the contact it displaced, if there was one. Otherwise the new
/// contact stays as primary with its "new" flag cleared. No sequence is
/// created either way.
pub fn decline(profile: &mut OutreachProfile) -> Result<Option<Contact>> {
    pending_contact(profile)?;
    match profile.displaced_contact.take() {
        Some(previous) => profile.primary_contact = Some(previous),
        None => {
            if let Some(contact) = profile.primary_contact.as_mut() {
                contact.is_new = false;
            }
        }
    }
    Ok(profile.primary_contact.clone())
}

fn pending_contact(profile: &mut OutreachProfile) -> Result<&mut Contact> {
    match profile.primary_contact.as_mut() {
        Some(contact) if contact.awaiting_confirmation() => Ok(contact),
        Some(contact) => Err(OutreachError::PreconditionFailed(format!(
            "{} is not a new contact awaiting confirmation",
            contact.name
        ))),
        None => Err(OutreachError::PreconditionFailed(
            "deal has no primary contact".to_string(),
        )),
    }
}
