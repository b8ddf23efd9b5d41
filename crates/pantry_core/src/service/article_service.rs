//! Article store use-case service.
//!
//! # Responsibility
//! - Batch insert with merge-on-insert, edit (including cross-section
//!   moves), delete with forward navigation, and ordered reads.
//!
//! # Invariants
//! - Input is parsed before any store access; a parse failure anywhere in
//!   a batch writes nothing.
//! - Every destination section is ownership-checked before the batch is
//!   written.
//! - Articles outside the owner's sections surface as `ArticleNotFound`.

use super::error::{store_failure, PantryError, PantryResult};
use super::guard::{guard_scope, guard_section, guard_section_ref};
use crate::model::article::{
    Article, ArticleId, ArticleInput, Neighbors, OrderedArticle, ParsedArticle,
};
use crate::model::section::{OwnerId, SectionId, SectionScope};
use crate::repo::article_repo::{ArticleDraft, ArticleRepository};
use crate::repo::section_repo::SectionRepository;
use crate::repo::RepoError;
use log::{debug, info};
use std::collections::HashSet;

/// Article store facade.
pub struct ArticleService<S: SectionRepository, A: ArticleRepository> {
    sections: S,
    articles: A,
}

impl<S: SectionRepository, A: ArticleRepository> ArticleService<S, A> {
    /// Creates service from repository implementations.
    pub fn new(sections: S, articles: A) -> Self {
        Self { sections, articles }
    }

    /// Adds a batch of articles, merging quantities on identity collisions.
    ///
    /// # Contract
    /// - Fails on the first parse error, then on the first unowned section.
    /// - Colliding `(section, name, expiration)` rows get their quantities
    ///   summed; if either side is absent the merged quantity is absent.
    pub fn add_articles(&self, owner_id: OwnerId, inputs: &[ArticleInput]) -> PantryResult<()> {
        let parsed = inputs
            .iter()
            .map(ArticleInput::parse)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| {
                debug!("event=article_add module=pantry status=rejected reason={err}")
            })?;

        let mut verified: HashSet<SectionId> = HashSet::new();
        let mut drafts = Vec::with_capacity(parsed.len());
        for article in parsed {
            let section_id = match article.section.id() {
                Some(id) if verified.contains(&id) => id,
                _ => {
                    let id = guard_section_ref(&self.sections, owner_id, &article.section)?;
                    verified.insert(id);
                    id
                }
            };
            drafts.push(into_draft(article, section_id));
        }

        if drafts.is_empty() {
            return Ok(());
        }
        self.articles
            .upsert_articles(&drafts)
            .map_err(|err| store_failure("article_add", err))?;
        info!(
            "event=article_add module=pantry status=ok owner_id={} count={}",
            owner_id,
            drafts.len()
        );
        Ok(())
    }

    /// Loads one article living in one of the owner's sections.
    ///
    /// An article inside another owner's section is reported as
    /// `ArticleNotFound`, the same as an id that does not exist.
    pub fn get_article(&self, owner_id: OwnerId, article_id: ArticleId) -> PantryResult<Article> {
        self.articles
            .get_article(owner_id, article_id)
            .map_err(|err| store_failure("article_get", err))?
            .ok_or(PantryError::ArticleNotFound)
    }

    /// Lists articles in `scope` ordered by `(expiration, id)`, absent
    /// expiration last.
    ///
    /// `name_filter` restricts to a case-insensitive substring match.
    pub fn get_articles(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        name_filter: &str,
    ) -> PantryResult<Vec<Article>> {
        guard_scope(&self.sections, owner_id, scope)?;
        self.articles
            .list_articles(owner_id, scope, name_filter)
            .map_err(|err| store_failure("article_list", err))
    }

    /// Replaces name, expiration, quantity and section of one article.
    ///
    /// An empty section reference keeps the article where it is; any other
    /// text must name an owned section. Identical input is a successful
    /// no-op. A new key that belongs to a different article fails with
    /// `ArticleDuplicated`.
    pub fn edit_article(
        &self,
        owner_id: OwnerId,
        article_id: ArticleId,
        input: &ArticleInput,
    ) -> PantryResult<()> {
        let current = self.get_article(owner_id, article_id)?;
        let parsed = input.parse()?;
        let target_section = if parsed.section.is_empty() {
            current.section_id
        } else {
            parsed.section.id().ok_or(PantryError::SectionNotFound)?
        };

        if current.section_id == target_section
            && current.name == parsed.name
            && current.expiration == parsed.expiration
            && current.quantity == parsed.quantity
        {
            return Ok(());
        }

        // The current section already passed the owner-scoped lookup above.
        let section_id = if target_section == current.section_id {
            current.section_id
        } else {
            guard_section(&self.sections, owner_id, target_section)?.id
        };
        let draft = into_draft(parsed, section_id);

        let taken = self
            .articles
            .key_taken_by_other(&draft, article_id)
            .map_err(|err| store_failure("article_edit", err))?;
        if taken {
            return Err(PantryError::ArticleDuplicated);
        }

        self.articles
            .update_article(article_id, &draft)
            .map_err(|err| match err {
                RepoError::UniqueViolation => PantryError::ArticleDuplicated,
                RepoError::NotFound { .. } => PantryError::ArticleNotFound,
                other => store_failure("article_edit", other),
            })?;
        info!(
            "event=article_edit module=pantry status=ok owner_id={} article_id={} section_id={}",
            owner_id, article_id, section_id
        );
        Ok(())
    }

    /// Deletes one article.
    ///
    /// Returns the id that followed it in the owner's `(expiration, id)`
    /// order across all sections, or `None` when it was the last one.
    pub fn delete_article(
        &self,
        owner_id: OwnerId,
        article_id: ArticleId,
    ) -> PantryResult<Option<ArticleId>> {
        let next = self
            .articles
            .delete_article(owner_id, article_id)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => PantryError::ArticleNotFound,
                other => store_failure("article_delete", other),
            })?;
        info!(
            "event=article_delete module=pantry status=ok owner_id={} article_id={}",
            owner_id, article_id
        );
        Ok(next)
    }

    /// Returns the predecessor and successor of `article_id` within `scope`.
    pub fn get_neighbors(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        article_id: ArticleId,
    ) -> PantryResult<Neighbors> {
        guard_scope(&self.sections, owner_id, scope)?;
        self.articles
            .neighbors(owner_id, scope, article_id)
            .map_err(|err| store_failure("article_neighbors", err))?
            .ok_or(PantryError::ArticleNotFound)
    }

    /// Loads one article together with its neighbours within `scope`.
    pub fn get_ordered_article(
        &self,
        owner_id: OwnerId,
        scope: SectionScope,
        article_id: ArticleId,
    ) -> PantryResult<OrderedArticle> {
        let neighbors = self.get_neighbors(owner_id, scope, article_id)?;
        let article = self.get_article(owner_id, article_id)?;
        Ok(OrderedArticle {
            article,
            prev: neighbors.prev,
            next: neighbors.next,
        })
    }
}

fn into_draft(article: ParsedArticle, section_id: SectionId) -> ArticleDraft {
    ArticleDraft {
        section_id,
        name: article.name,
        expiration: article.expiration,
        quantity: article.quantity,
    }
}
