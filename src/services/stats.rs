//! Catalog statistics service (landing-page counts)

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Counts of the main catalog objects
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    pub num_copies: i64,
    pub num_copies_available: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Gather the catalog counts shown on the home page
    pub async fn catalog_counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.repository.books.count().await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
            num_copies: self.repository.copies.count().await?,
            num_copies_available: self.repository.copies.count_available().await?,
        })
    }
}
