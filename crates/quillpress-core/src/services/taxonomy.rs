//! Categories and tags.

use std::sync::Arc;

use crate::domain::{Category, Principal, Tag, normalize_label};
use crate::error::{DomainError, ValidationErrors};
use crate::ports::{CategoryRepository, TagRepository};

/// Reference data that posts point at.
pub struct TaxonomyService {
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
}

impl TaxonomyService {
    pub fn new(categories: Arc<dyn CategoryRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { categories, tags }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.all().await?)
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, DomainError> {
        Ok(self.tags.all().await?)
    }

    pub async fn create_category(&self, principal: &Principal, name: &str) -> Result<Category, DomainError> {
        ensure_administrator(principal)?;
        let name = normalize_label(name).map_err(DomainError::Validation)?;
        if self.categories.find_by_name(&name).await?.is_some() {
            return Err(taken());
        }

        let category = self.categories.insert(Category::new(name)).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn create_tag(&self, principal: &Principal, name: &str) -> Result<Tag, DomainError> {
        ensure_administrator(principal)?;
        let name = normalize_label(name).map_err(DomainError::Validation)?;
        if self.tags.find_by_name(&name).await?.is_some() {
            return Err(taken());
        }

        let tag = self.tags.insert(Tag::new(name)).await?;
        tracing::info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }
}

fn ensure_administrator(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_administrator() {
        Ok(())
    } else {
        Err(DomainError::forbidden("administrator access required"))
    }
}

fn taken() -> DomainError {
    DomainError::Validation(ValidationErrors::single(
        "name",
        "The name has already been taken.",
    ))
}
