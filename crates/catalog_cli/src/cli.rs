//! Command-line surface and configuration.
//!
//! Every global option can also come from the environment, so one shell
//! profile can point all invocations at the same catalog file.

use catalog_core::{AuthorId, BookId, BookInstanceId, GenreId, LoanStatus};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Manage a library catalog: authors, genres, books and copies.")]
#[command(version)]
pub struct CommandLine {
    /// SQLite catalog file; created and migrated on first use.
    #[arg(long, global = true, env = "CATALOG_DB", default_value = "catalog.sqlite3")]
    pub db: PathBuf,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, global = true, env = "CATALOG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotated log files. File logging is off when unset.
    #[arg(long, global = true, env = "CATALOG_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage authors
    #[command(subcommand, alias = "a")]
    Author(AuthorCommand),
    /// Manage genres
    #[command(subcommand, alias = "g")]
    Genre(GenreCommand),
    /// Manage books
    #[command(subcommand, alias = "b")]
    Book(BookCommand),
    /// Manage individual copies and their loan status
    #[command(subcommand, alias = "c")]
    Copy(CopyCommand),
    /// Show catalog counts
    Stats,
}

#[derive(Subcommand)]
pub enum AuthorCommand {
    Add {
        first_name: String,
        last_name: String,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        born: Option<NaiveDate>,
        /// Date of death, YYYY-MM-DD
        #[arg(long)]
        died: Option<NaiveDate>,
    },
    List,
    /// Show one author with their books
    Show { id: AuthorId },
    /// Delete an author; their books are kept without an author
    Delete { id: AuthorId },
}

#[derive(Subcommand)]
pub enum GenreCommand {
    Add { name: String },
    List,
    Rename { id: GenreId, name: String },
    Delete { id: GenreId },
}

#[derive(Subcommand)]
pub enum BookCommand {
    Add(BookAddArgs),
    List {
        #[arg(long)]
        author: Option<AuthorId>,
        #[arg(long)]
        genre: Option<GenreId>,
    },
    /// Show one book with author, genres and copies
    Show { id: BookId },
    /// Delete a book; fails while copies exist
    Delete { id: BookId },
}

#[derive(Args)]
pub struct BookAddArgs {
    pub title: String,
    /// Up to 13 characters, unique across the catalog
    #[arg(long)]
    pub isbn: String,
    #[arg(long)]
    pub author: Option<AuthorId>,
    #[arg(long, default_value = "")]
    pub summary: String,
    /// Genre id; repeat for several genres
    #[arg(long = "genre")]
    pub genres: Vec<GenreId>,
}

#[derive(Subcommand)]
pub enum CopyCommand {
    Add {
        book_id: BookId,
        imprint: String,
        /// m|o|a|r or maintenance|on_loan|available|reserved
        #[arg(long, default_value = "maintenance")]
        status: LoanStatus,
    },
    List {
        #[arg(long)]
        book: Option<BookId>,
        #[arg(long)]
        status: Option<LoanStatus>,
    },
    Lend {
        id: BookInstanceId,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: NaiveDate,
    },
    Return { id: BookInstanceId },
    Reserve { id: BookInstanceId },
    Maintain { id: BookInstanceId },
    /// Copies on loan past their due date
    Overdue {
        /// Reference date, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    Delete { id: BookInstanceId },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Stable name for log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Author(_) => "author",
            Self::Genre(_) => "genre",
            Self::Book(_) => "book",
            Self::Copy(_) => "copy",
            Self::Stats => "stats",
        }
    }
}
