//! Subcommand handlers.
//!
//! Each handler writes either a human-readable listing or, with `--json`,
//! the serialized records.

use crate::cli::{AuthorCommand, BookAddArgs, BookCommand, Commands, CopyCommand, GenreCommand};
use anyhow::{bail, Context};
use catalog_core::{
    BookInstance, BookInstanceListQuery, BookListQuery, LoanService, NewAuthor, NewBook,
    SqliteBookInstanceRepository, SqliteCatalogService,
};
use rusqlite::Connection;
use serde::Serialize;
use std::io::Write;

pub fn run(
    conn: &Connection,
    command: Commands,
    json: bool,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    let catalog =
        SqliteCatalogService::open(conn).context("catalog schema is not ready for use")?;
    let mut out = Output { json, writer };
    let out = &mut out;

    match command {
        Commands::Author(command) => author(&catalog, out, command),
        Commands::Genre(command) => genre(&catalog, out, command),
        Commands::Book(command) => book(&catalog, out, command),
        Commands::Copy(command) => {
            let loans = LoanService::new(SqliteBookInstanceRepository::try_new(conn)?);
            copy(&catalog, &loans, out, command)
        }
        Commands::Stats => {
            let stats = catalog.stats()?;
            out.emit(&stats, || {
                format!(
                    "books: {}\ncopies: {} ({} available)\nauthors: {}\ngenres: {}",
                    stats.books, stats.copies, stats.available_copies, stats.authors, stats.genres
                )
            })
        }
    }
}

type Loans<'conn> = LoanService<SqliteBookInstanceRepository<'conn>>;

fn author(
    catalog: &SqliteCatalogService<'_>,
    out: &mut Output<'_>,
    command: AuthorCommand,
) -> anyhow::Result<()> {
    match command {
        AuthorCommand::Add {
            first_name,
            last_name,
            born,
            died,
        } => {
            let author = catalog.create_author(NewAuthor {
                date_of_birth: born,
                date_of_death: died,
                ..NewAuthor::new(first_name, last_name)
            })?;
            out.emit(&author, || format!("created author {} ({})", author.id, author))
        }
        AuthorCommand::List => {
            let authors = catalog.list_authors()?;
            out.emit(&authors, || {
                authors
                    .iter()
                    .map(|author| format!("{:>5}  {}", author.id, author))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AuthorCommand::Show { id } => {
            let Some(detail) = catalog.author_detail(id)? else {
                bail!("author {id} not found");
            };
            out.emit(&detail, || {
                let mut lines = vec![
                    format!("{}  {}", detail.author, detail.author.absolute_url()),
                    format!(
                        "lived: {} - {}",
                        optional_date(detail.author.date_of_birth),
                        optional_date(detail.author.date_of_death)
                    ),
                ];
                lines.extend(
                    detail
                        .books
                        .iter()
                        .map(|book| format!("  {:>5}  {}", book.id, book)),
                );
                lines.join("\n")
            })
        }
        AuthorCommand::Delete { id } => {
            catalog.delete_author(id)?;
            out.done(format!("deleted author {id}"))
        }
    }
}

fn genre(
    catalog: &SqliteCatalogService<'_>,
    out: &mut Output<'_>,
    command: GenreCommand,
) -> anyhow::Result<()> {
    match command {
        GenreCommand::Add { name } => {
            let genre = catalog.create_genre(&name)?;
            out.emit(&genre, || format!("created genre {} ({})", genre.id, genre))
        }
        GenreCommand::List => {
            let genres = catalog.list_genres()?;
            out.emit(&genres, || {
                genres
                    .iter()
                    .map(|genre| format!("{:>5}  {}", genre.id, genre))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        GenreCommand::Rename { id, name } => {
            catalog.rename_genre(id, &name)?;
            out.done(format!("renamed genre {id}"))
        }
        GenreCommand::Delete { id } => {
            catalog.delete_genre(id)?;
            out.done(format!("deleted genre {id}"))
        }
    }
}

fn book(
    catalog: &SqliteCatalogService<'_>,
    out: &mut Output<'_>,
    command: BookCommand,
) -> anyhow::Result<()> {
    match command {
        BookCommand::Add(BookAddArgs {
            title,
            isbn,
            author,
            summary,
            genres,
        }) => {
            let book = catalog.create_book(NewBook {
                author_id: author,
                summary,
                genre_ids: genres,
                ..NewBook::new(title, isbn)
            })?;
            out.emit(&book, || format!("created book {} ({})", book.id, book))
        }
        BookCommand::List { author, genre } => {
            let books = catalog.list_books(&BookListQuery {
                author_id: author,
                genre_id: genre,
                ..BookListQuery::default()
            })?;
            out.emit(&books, || {
                books
                    .iter()
                    .map(|book| format!("{:>5}  {:<13}  {}", book.id, book.isbn, book))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        BookCommand::Show { id } => {
            let Some(detail) = catalog.book_detail(id)? else {
                bail!("book {id} not found");
            };
            out.emit(&detail, || {
                let author = detail
                    .author
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                let mut lines = vec![
                    format!("{}  {}", detail.book, detail.book.absolute_url()),
                    format!("author: {author}"),
                    format!("isbn: {}", detail.book.isbn),
                    format!(
                        "genres: {}",
                        detail
                            .genres
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ];
                if !detail.book.summary.is_empty() {
                    lines.push(format!("summary: {}", detail.book.summary));
                }
                lines.extend(detail.copies.iter().map(copy_line));
                lines.join("\n")
            })
        }
        BookCommand::Delete { id } => {
            catalog.delete_book(id)?;
            out.done(format!("deleted book {id}"))
        }
    }
}

fn copy(
    catalog: &SqliteCatalogService<'_>,
    loans: &Loans<'_>,
    out: &mut Output<'_>,
    command: CopyCommand,
) -> anyhow::Result<()> {
    match command {
        CopyCommand::Add {
            book_id,
            imprint,
            status,
        } => {
            let mut instance = BookInstance::new(book_id, imprint);
            instance.status = status;
            let created = catalog.create_instance(&instance)?;
            let label = catalog.instance_label(created.id)?;
            out.emit(&created, || format!("created copy {label}"))
        }
        CopyCommand::List { book, status } => {
            let copies = catalog.list_instances(&BookInstanceListQuery {
                book_id: book,
                status,
                ..BookInstanceListQuery::default()
            })?;
            out.emit(&copies, || {
                copies.iter().map(copy_line).collect::<Vec<_>>().join("\n")
            })
        }
        CopyCommand::Lend { id, due } => {
            let copy = loans.lend(id, due)?;
            out.emit(&copy, || copy_line(&copy))
        }
        CopyCommand::Return { id } => {
            let copy = loans.return_copy(id)?;
            out.emit(&copy, || copy_line(&copy))
        }
        CopyCommand::Reserve { id } => {
            let copy = loans.reserve(id)?;
            out.emit(&copy, || copy_line(&copy))
        }
        CopyCommand::Maintain { id } => {
            let copy = loans.send_to_maintenance(id)?;
            out.emit(&copy, || copy_line(&copy))
        }
        CopyCommand::Overdue { today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let overdue = loans.list_overdue(today)?;
            out.emit(&overdue, || {
                overdue.iter().map(copy_line).collect::<Vec<_>>().join("\n")
            })
        }
        CopyCommand::Delete { id } => {
            catalog.delete_instance(id)?;
            out.done(format!("deleted copy {id}"))
        }
    }
}

fn copy_line(copy: &BookInstance) -> String {
    format!(
        "  {}  {:<11}  due {}  {}",
        copy.id,
        copy.status.label(),
        optional_date(copy.due_back),
        copy.imprint
    )
}

fn optional_date(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |date| date.to_string())
}

struct Output<'w> {
    json: bool,
    writer: &'w mut dyn Write,
}

impl Output<'_> {
    fn emit<T, F>(&mut self, value: &T, human: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce() -> String,
    {
        if self.json {
            writeln!(self.writer, "{}", serde_json::to_string_pretty(value)?)?;
        } else {
            let text = human();
            if !text.is_empty() {
                writeln!(self.writer, "{text}")?;
            }
        }
        Ok(())
    }

    fn done(&mut self, message: String) -> anyhow::Result<()> {
        self.emit(&serde_json::json!({ "ok": true }), || message)
    }
}
