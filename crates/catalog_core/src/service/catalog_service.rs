//! Catalog use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Repository errors are returned unchanged.

use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::book::{Book, BookId, NewBook};
use crate::model::book_instance::{BookInstance, BookInstanceId, LoanStatus};
use crate::model::genre::{Genre, GenreId, NewGenre};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_instance_repo::{
    BookInstanceListQuery, BookInstanceRepository, SqliteBookInstanceRepository,
};
use crate::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use crate::repo::genre_repo::{GenreRepository, SqliteGenreRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;

/// Book with its related author, genres and copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstance>,
}

/// Author with the books that reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Headline counts for the catalog home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub books: i64,
    pub copies: i64,
    pub available_copies: i64,
    pub authors: i64,
    pub genres: i64,
}

/// Facade over the four catalog repositories.
pub struct CatalogService<A, G, B, I> {
    authors: A,
    genres: G,
    books: B,
    copies: I,
}

/// Catalog service wired to SQLite repositories on one connection.
pub type SqliteCatalogService<'conn> = CatalogService<
    SqliteAuthorRepository<'conn>,
    SqliteGenreRepository<'conn>,
    SqliteBookRepository<'conn>,
    SqliteBookInstanceRepository<'conn>,
>;

impl<'conn> SqliteCatalogService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn open(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(CatalogService::new(
            SqliteAuthorRepository::try_new(conn)?,
            SqliteGenreRepository::try_new(conn)?,
            SqliteBookRepository::try_new(conn)?,
            SqliteBookInstanceRepository::try_new(conn)?,
        ))
    }
}

impl<A, G, B, I> CatalogService<A, G, B, I>
where
    A: AuthorRepository,
    G: GenreRepository,
    B: BookRepository,
    I: BookInstanceRepository,
{
    pub fn new(authors: A, genres: G, books: B, copies: I) -> Self {
        Self {
            authors,
            genres,
            books,
            copies,
        }
    }

    // Authors

    pub fn create_author(&self, author: NewAuthor) -> RepoResult<Author> {
        let created = self.authors.create_author(&author)?;
        info!(
            "event=author_create module=service status=ok author_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.authors.get_author(id)
    }

    /// Authors ordered by `(first_name, last_name)`.
    pub fn list_authors(&self) -> RepoResult<Vec<Author>> {
        self.authors.list_authors()
    }

    pub fn update_author(&self, author: &Author) -> RepoResult<()> {
        self.authors.update_author(author)
    }

    /// Deletes the author. Their books stay, with no author.
    pub fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let orphaned = self
            .books
            .list_books(&BookListQuery {
                author_id: Some(id),
                ..BookListQuery::default()
            })?
            .len();
        self.authors.delete_author(id)?;
        info!(
            "event=author_delete module=service status=ok author_id={} books_unlinked={}",
            id, orphaned
        );
        Ok(())
    }

    pub fn author_detail(&self, id: AuthorId) -> RepoResult<Option<AuthorDetail>> {
        let Some(author) = self.authors.get_author(id)? else {
            return Ok(None);
        };
        let books = self.books.list_books(&BookListQuery {
            author_id: Some(id),
            ..BookListQuery::default()
        })?;
        Ok(Some(AuthorDetail { author, books }))
    }

    // Genres

    pub fn create_genre(&self, name: &str) -> RepoResult<Genre> {
        let created = self.genres.create_genre(&NewGenre::new(name))?;
        info!(
            "event=genre_create module=service status=ok genre_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        self.genres.get_genre(id)
    }

    pub fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        self.genres.list_genres()
    }

    pub fn rename_genre(&self, id: GenreId, name: &str) -> RepoResult<()> {
        self.genres.update_genre(&Genre {
            id,
            name: name.to_string(),
        })
    }

    pub fn delete_genre(&self, id: GenreId) -> RepoResult<()> {
        self.genres.delete_genre(id)?;
        info!("event=genre_delete module=service status=ok genre_id={id}");
        Ok(())
    }

    // Books

    pub fn create_book(&self, book: NewBook) -> RepoResult<Book> {
        match self.books.create_book(&book) {
            Ok(created) => {
                info!(
                    "event=book_create module=service status=ok book_id={} genres={}",
                    created.id,
                    created.genre_ids.len()
                );
                Ok(created)
            }
            Err(err) => {
                warn!(
                    "event=book_create module=service status=error error_code={}",
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    pub fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.books.get_book(id)
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        self.books.find_book_by_isbn(isbn)
    }

    /// Books ordered by title.
    pub fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        self.books.list_books(query)
    }

    pub fn update_book(&self, book: &Book) -> RepoResult<()> {
        self.books.update_book(book)
    }

    /// Deletes a book that has no copies.
    pub fn delete_book(&self, id: BookId) -> RepoResult<()> {
        match self.books.delete_book(id) {
            Ok(()) => {
                info!("event=book_delete module=service status=ok book_id={id}");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=book_delete module=service status=error book_id={} error_code={}",
                    id,
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    pub fn book_detail(&self, id: BookId) -> RepoResult<Option<BookDetail>> {
        let Some(book) = self.books.get_book(id)? else {
            return Ok(None);
        };
        let author = match book.author_id {
            Some(author_id) => self.authors.get_author(author_id)?,
            None => None,
        };
        let genres = self.books.genres_for_book(id)?;
        let copies = self.copies.list_instances(&BookInstanceListQuery {
            book_id: Some(id),
            ..BookInstanceListQuery::default()
        })?;
        Ok(Some(BookDetail {
            book,
            author,
            genres,
            copies,
        }))
    }

    // Copies

    pub fn create_instance(&self, instance: &BookInstance) -> RepoResult<BookInstance> {
        let instance = instance.clone().normalized();
        self.copies.create_instance(&instance)?;
        info!(
            "event=instance_create module=service status=ok instance_id={} status_code={}",
            instance.id,
            instance.status.code()
        );
        Ok(instance)
    }

    pub fn get_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>> {
        self.copies.get_instance(id)
    }

    /// Copies ordered by `due_back`.
    pub fn list_instances(&self, query: &BookInstanceListQuery) -> RepoResult<Vec<BookInstance>> {
        self.copies.list_instances(query)
    }

    pub fn update_instance(&self, instance: &BookInstance) -> RepoResult<()> {
        self.copies.update_instance(instance)
    }

    pub fn delete_instance(&self, id: BookInstanceId) -> RepoResult<()> {
        self.copies.delete_instance(id)?;
        info!("event=instance_delete module=service status=ok instance_id={id}");
        Ok(())
    }

    /// `"{id} {book title}"` for one copy.
    pub fn instance_label(&self, id: BookInstanceId) -> RepoResult<String> {
        let instance = self
            .copies
            .get_instance(id)?
            .ok_or_else(|| RepoError::not_found("book instance", id))?;
        let title = match instance.book_id {
            Some(book_id) => self.books.get_book(book_id)?.map(|book| book.title),
            None => None,
        };
        Ok(instance.label(title.as_deref()))
    }

    pub fn stats(&self) -> RepoResult<CatalogStats> {
        let by_status = self.copies.count_by_status()?;
        let copies: i64 = by_status.iter().map(|(_, count)| count).sum();
        let available_copies = by_status
            .iter()
            .find(|(status, _)| *status == LoanStatus::Available)
            .map_or(0, |(_, count)| *count);

        Ok(CatalogStats {
            books: self.books.count_books()?,
            copies,
            available_copies,
            authors: self.authors.count_authors()?,
            genres: self.genres.count_genres()?,
        })
    }
}

/// Stable, text-free error code for log lines.
pub(crate) fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::Db(_) => "db_error",
        RepoError::NotFound { .. } => "not_found",
        RepoError::DuplicateIsbn(_) => "duplicate_isbn",
        RepoError::DeleteRestricted { .. } => "delete_restricted",
        RepoError::UninitializedConnection { .. } => "uninitialized_connection",
        RepoError::MissingRequiredTable(_) | RepoError::MissingRequiredColumn { .. } => {
            "schema_mismatch"
        }
        RepoError::InvalidData(_) => "invalid_data",
    }
}
