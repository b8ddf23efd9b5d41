//! Ownership guard shared by the section manager and the article store.
//!
//! Absent and foreign sections are indistinguishable to the caller.

use super::error::{store_failure, PantryError, PantryResult};
use crate::model::article::SectionRef;
use crate::model::section::{OwnerId, Section, SectionId, SectionScope};
use crate::repo::section_repo::SectionRepository;

/// Resolves a section the owner is allowed to see.
pub(crate) fn guard_section<S: SectionRepository>(
    sections: &S,
    owner_id: OwnerId,
    section_id: SectionId,
) -> PantryResult<Section> {
    sections
        .get_section(owner_id, section_id)
        .map_err(|err| store_failure("section_guard", err))?
        .ok_or(PantryError::SectionNotFound)
}

/// Resolves a textual destination reference to an owned section id.
pub(crate) fn guard_section_ref<S: SectionRepository>(
    sections: &S,
    owner_id: OwnerId,
    section: &SectionRef,
) -> PantryResult<SectionId> {
    let section_id = section.id().ok_or(PantryError::SectionNotFound)?;
    guard_section(sections, owner_id, section_id).map(|section| section.id)
}

/// Verifies a listing scope; `All` is always within the owner's reach.
pub(crate) fn guard_scope<S: SectionRepository>(
    sections: &S,
    owner_id: OwnerId,
    scope: SectionScope,
) -> PantryResult<()> {
    match scope {
        SectionScope::All => Ok(()),
        SectionScope::Section(section_id) => {
            guard_section(sections, owner_id, section_id).map(|_| ())
        }
    }
}
