//! Core domain logic for the library catalog.
//! Authors, genres, books and loanable copies over SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::author::{Author, AuthorId, NewAuthor};
pub use model::book::{Book, BookId, NewBook};
pub use model::book_instance::{BookInstance, BookInstanceId, LoanStatus};
pub use model::genre::{Genre, GenreId, NewGenre};
pub use model::ModelValidationError;
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::book_instance_repo::{
    BookInstanceListQuery, BookInstanceRepository, SqliteBookInstanceRepository,
};
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::genre_repo::{GenreRepository, SqliteGenreRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{
    AuthorDetail, BookDetail, CatalogService, CatalogStats, SqliteCatalogService,
};
pub use service::loan_service::LoanService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
