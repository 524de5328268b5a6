//! Command-line arguments, environment defaults and logging setup.

use std::path::PathBuf;
use std::time::Duration;

use catalog_core::views::book_list::DEFAULT_PER_PAGE;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for catalog
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Browse and edit the book catalog")]
#[command(version)]
pub struct Cli {
    /// Base URL of the catalog backend
    #[arg(
        long,
        global = true,
        default_value = catalog_core::DEFAULT_BASE_URL,
        env = "CATALOG_API_URL"
    )]
    pub api_url: String,

    /// Seconds to wait for a response before giving up
    #[arg(long, global = true, default_value_t = 10, env = "CATALOG_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Log outgoing payloads and every response
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List, show, add, edit, delete or import books
    #[command(subcommand)]
    Books(BooksCommand),

    /// List or add genres
    #[command(subcommand)]
    Genres(GenresCommand),
}

#[derive(Subcommand, Debug)]
pub enum BooksCommand {
    /// Show one page of the catalog
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE, env = "CATALOG_PER_PAGE")]
        per_page: u32,
    },

    /// Show a single book
    Show { id: String },

    /// Add a book
    Add(BookFields),

    /// Change some fields of a book
    Edit {
        id: String,

        #[command(flatten)]
        fields: BookFields,
    },

    /// Delete a book after confirmation
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create every book in a JSON array file
    Import { file: PathBuf },
}

/// Book fields as typed by the user. Quantity stays raw text so it goes
/// through the form's own parsing.
#[derive(Args, Debug, Default)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub quantity: Option<String>,

    /// Genre id; an empty value clears the genre
    #[arg(long)]
    pub genre: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GenresCommand {
    /// List all genres
    List,

    /// Add a genre
    Add {
        #[arg(long)]
        name: String,
    },

    /// List the books of one genre
    Books { id: Option<String> },
}

/// Install the stderr subscriber. `--verbose` forces `debug`; otherwise
/// `RUST_LOG` applies, falling back to `info`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "catalog",
            "books",
            "list",
            "--page",
            "3",
            "--api-url",
            "http://books.test:8080",
            "--timeout-secs",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://books.test:8080");
        assert_eq!(cli.timeout(), Duration::from_secs(1));
        match cli.command {
            Command::Books(BooksCommand::List { page, .. }) => assert_eq!(page, 3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn edit_fields_are_optional() {
        let cli =
            Cli::try_parse_from(["catalog", "books", "edit", "b1", "--quantity", "7"]).unwrap();
        match cli.command {
            Command::Books(BooksCommand::Edit { id, fields }) => {
                assert_eq!(id, "b1");
                assert_eq!(fields.quantity.as_deref(), Some("7"));
                assert!(fields.title.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn genre_books_id_is_optional() {
        let cli = Cli::try_parse_from(["catalog", "genres", "books"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Genres(GenresCommand::Books { id: None })
        ));
    }
}
