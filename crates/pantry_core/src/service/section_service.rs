//! Section manager use-case service.
//!
//! # Responsibility
//! - Create, rename, delete and list an owner's sections.
//! - Distinguish "no sections" from "unknown owner".
//!
//! # Invariants
//! - `(owner, name)` is unique, compared case-sensitively.
//! - Renaming to the current name is a successful no-op.
//! - Foreign sections surface as `SectionNotFound`.

use super::error::{store_failure, PantryError, PantryResult};
use super::guard::guard_section;
use crate::model::section::{OwnerId, PantryStats, Section, SectionId};
use crate::repo::owner_repo::OwnerRepository;
use crate::repo::section_repo::SectionRepository;
use crate::repo::RepoError;
use log::{debug, info};

/// Section manager facade.
pub struct SectionService<O: OwnerRepository, S: SectionRepository> {
    owners: O,
    sections: S,
}

impl<O: OwnerRepository, S: SectionRepository> SectionService<O, S> {
    /// Creates service from repository implementations.
    pub fn new(owners: O, sections: S) -> Self {
        Self { owners, sections }
    }

    /// Lists all sections of `owner_id` in creation order.
    ///
    /// An empty list is only returned for an existing owner.
    pub fn list_sections(&self, owner_id: OwnerId) -> PantryResult<Vec<Section>> {
        let sections = self
            .sections
            .list_sections(owner_id)
            .map_err(|err| store_failure("section_list", err))?;
        if sections.is_empty() {
            self.ensure_owner_exists(owner_id)?;
        }
        Ok(sections)
    }

    /// Loads one owned section.
    pub fn get_section(&self, owner_id: OwnerId, section_id: SectionId) -> PantryResult<Section> {
        guard_section(&self.sections, owner_id, section_id)
    }

    /// Creates a section named `name` for `owner_id`.
    pub fn create_section(&self, owner_id: OwnerId, name: &str) -> PantryResult<Section> {
        self.ensure_owner_exists(owner_id)?;
        self.ensure_name_free(owner_id, name)?;

        let section = self
            .sections
            .create_section(owner_id, name)
            .map_err(|err| match err {
                RepoError::UniqueViolation => PantryError::SectionDuplicated,
                other => store_failure("section_create", other),
            })?;
        info!(
            "event=section_create module=pantry status=ok owner_id={} section_id={}",
            owner_id, section.id
        );
        Ok(section)
    }

    /// Renames one owned section.
    pub fn rename_section(
        &self,
        owner_id: OwnerId,
        section_id: SectionId,
        new_name: &str,
    ) -> PantryResult<()> {
        let current = guard_section(&self.sections, owner_id, section_id)?;
        if current.name == new_name {
            return Ok(());
        }
        self.ensure_name_free(owner_id, new_name)?;

        self.sections
            .rename_section(owner_id, section_id, new_name)
            .map_err(|err| match err {
                RepoError::UniqueViolation => PantryError::SectionDuplicated,
                RepoError::NotFound { .. } => PantryError::SectionNotFound,
                other => store_failure("section_rename", other),
            })?;
        info!(
            "event=section_rename module=pantry status=ok owner_id={} section_id={}",
            owner_id, section_id
        );
        Ok(())
    }

    /// Deletes one owned section together with every article inside it.
    pub fn delete_section(&self, owner_id: OwnerId, section_id: SectionId) -> PantryResult<()> {
        self.sections
            .delete_section(owner_id, section_id)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => PantryError::SectionNotFound,
                other => store_failure("section_delete", other),
            })?;
        info!(
            "event=section_delete module=pantry status=ok owner_id={} section_id={}",
            owner_id, section_id
        );
        Ok(())
    }

    /// Counts sections and articles of an existing owner.
    pub fn stats(&self, owner_id: OwnerId) -> PantryResult<PantryStats> {
        self.ensure_owner_exists(owner_id)?;
        self.sections
            .stats(owner_id)
            .map_err(|err| store_failure("pantry_stats", err))
    }

    fn ensure_owner_exists(&self, owner_id: OwnerId) -> PantryResult<()> {
        let exists = self
            .owners
            .owner_exists(owner_id)
            .map_err(|err| store_failure("owner_lookup", err))?;
        if !exists {
            debug!("event=owner_lookup module=pantry status=rejected owner_id={owner_id}");
            return Err(PantryError::UserUnknown);
        }
        Ok(())
    }

    fn ensure_name_free(&self, owner_id: OwnerId, name: &str) -> PantryResult<()> {
        let taken = self
            .sections
            .section_name_taken(owner_id, name)
            .map_err(|err| store_failure("section_name_check", err))?;
        if taken {
            return Err(PantryError::SectionDuplicated);
        }
        Ok(())
    }
}
