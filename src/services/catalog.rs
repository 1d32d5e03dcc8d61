//! Catalog management service: books, authors, genres, languages and copies

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, BookShort, CreateBook, CreateTerm, Genre, Language, UpdateBook},
        copy::{BookCopy, CopyStatus, CreateCopy},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // -- Books ---------------------------------------------------------------

    /// Search books with filters
    pub async fn search_books(
        &self,
        query: &BookQuery,
        per_page: i64,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.search(query, per_page).await
    }

    /// Get book by ID with full details
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book. ISBNs must be unique across the catalog.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, None).await? {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }

        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book and its copies. Refused while a copy is on loan unless
    /// forced.
    pub async fn delete_book(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        if !force && self.repository.books.has_copies_on_loan(id).await? {
            return Err(AppError::BusinessRule(
                "Book has copies on loan".to_string(),
            ));
        }

        self.repository.books.delete(id).await
    }

    // -- Copies --------------------------------------------------------------

    /// List copies of a book
    pub async fn get_copies(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.copies.list_for_book(book_id).await
    }

    /// Catalogue a new physical copy of a book.
    ///
    /// Enforces the circulation invariant: due date and borrower may only be
    /// set on a copy that starts out on loan, and an on-loan copy must carry
    /// a due date.
    pub async fn create_copy(&self, book_id: i32, copy: CreateCopy) -> AppResult<BookCopy> {
        self.repository.books.get_by_id(book_id).await?;

        let status = copy.status.unwrap_or_default();
        if status == CopyStatus::OnLoan {
            if copy.due_back.is_none() {
                return Err(AppError::Validation(
                    "A copy on loan must have a due date".to_string(),
                ));
            }
        } else if copy.due_back.is_some() || copy.borrower_id.is_some() {
            return Err(AppError::Validation(
                "Due date and borrower are only valid for a copy on loan".to_string(),
            ));
        }

        if let Some(borrower_id) = copy.borrower_id {
            self.repository.users.get_by_id(borrower_id).await?;
        }

        self.repository.copies.create(book_id, &copy).await
    }

    /// Delete a copy
    pub async fn delete_copy(&self, id: Uuid, force: bool) -> AppResult<()> {
        let copy = self.repository.copies.get_by_id(id).await?;

        if copy.status == CopyStatus::OnLoan && !force {
            return Err(AppError::BusinessRule("Copy is on loan".to_string()));
        }

        self.repository.copies.delete(id).await
    }

    // -- Authors -------------------------------------------------------------

    /// List authors with pagination
    pub async fn list_authors(
        &self,
        query: &AuthorQuery,
        per_page: i64,
    ) -> AppResult<(Vec<Author>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        self.repository
            .authors
            .list(query.name.as_deref(), page, per_page)
            .await
    }

    /// Get author by ID
    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Create a new author
    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.authors.create(&author).await
    }

    /// Update an author
    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    /// Delete an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // -- Genres & languages --------------------------------------------------

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, term: CreateTerm) -> AppResult<Genre> {
        term.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.genres.name_exists(&term.name).await? {
            return Err(AppError::Conflict(format!(
                "Genre {} already exists",
                term.name
            )));
        }
        self.repository.genres.create(&term.name).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn create_language(&self, term: CreateTerm) -> AppResult<Language> {
        term.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.languages.name_exists(&term.name).await? {
            return Err(AppError::Conflict(format!(
                "Language {} already exists",
                term.name
            )));
        }
        self.repository.languages.create(&term.name).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await
    }
}
