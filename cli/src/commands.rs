//! Command execution. Each command drives a core view (or a single
//! data-access round-trip) through the transport and renders the result.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use catalog_core::codec::BookRecord;
use catalog_core::views::{BookRow, Field, FormView};
use catalog_core::{
    drive, send, ApiError, Book, BookListView, CatalogClient, EntityId, FormTarget, Transport,
};

use crate::config::{BookFields, BooksCommand, Command, GenresCommand};
use crate::render;

/// Ids typed on the command line: integers select the legacy numeric-id
/// routes, anything else is a string id.
pub fn parse_id(raw: &str) -> EntityId {
    let raw = raw.trim();
    raw.parse::<i64>()
        .map(EntityId::from)
        .unwrap_or_else(|_| EntityId::from(raw))
}

fn reported(err: ApiError) -> anyhow::Error {
    anyhow!("{}", err.report())
}

pub struct Session<T> {
    client: CatalogClient,
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// Run `command` and return what should be printed. `confirm` is asked
    /// before anything is deleted.
    pub fn run<F>(&self, command: &Command, confirm: F) -> Result<String>
    where
        F: FnOnce(&EntityId) -> bool,
    {
        match command {
            Command::Books(BooksCommand::List { page, per_page }) => {
                self.list_books(*page, *per_page)
            }
            Command::Books(BooksCommand::Show { id }) => self.show_book(&parse_id(id)),
            Command::Books(BooksCommand::Add(fields)) => self.add_book(fields),
            Command::Books(BooksCommand::Edit { id, fields }) => {
                self.edit_book(&parse_id(id), fields)
            }
            Command::Books(BooksCommand::Delete { id, yes }) => {
                let yes = *yes;
                self.delete_book(&parse_id(id), |id| yes || confirm(id))
            }
            Command::Books(BooksCommand::Import { file }) => self.import_books(file),
            Command::Genres(GenresCommand::List) => self.list_genres(),
            Command::Genres(GenresCommand::Add { name }) => self.add_genre(name),
            Command::Genres(GenresCommand::Books { id }) => {
                self.books_by_genre(id.as_deref().map(parse_id).as_ref())
            }
        }
    }

    fn list_books(&self, page: u32, per_page: u32) -> Result<String> {
        let mut view = BookListView::new(self.client.clone(), per_page);
        let commands = view.mount();
        drive(&mut view, &self.transport, commands);
        if page > 1 && view.error().is_none() {
            let commands = view.set_page(page);
            drive(&mut view, &self.transport, commands);
        }
        if let Some(report) = view.error() {
            bail!("{report}");
        }
        if view.page() != page {
            tracing::warn!(
                requested = page,
                shown = view.page(),
                total_pages = view.total_pages(),
                "requested page is out of range, showing the nearest page"
            );
        }
        let rows = view.rows().unwrap_or_default();
        Ok(render::book_list(&rows, view.pager()))
    }

    fn show_book(&self, id: &EntityId) -> Result<String> {
        let response = send(&self.transport, &self.client.build_get_book(Some(id)))
            .map_err(reported)?;
        let book = self.client.parse_get_book(response).map_err(reported)?;
        Ok(render::book_detail(&book))
    }

    fn add_book(&self, fields: &BookFields) -> Result<String> {
        let mut form = FormView::new(self.client.clone(), FormTarget::NewBook);
        apply(&mut form, fields)?;
        self.save(&mut form)?;
        let title = form.book_draft().map(|d| d.title.trim()).unwrap_or_default();
        Ok(format!("Created book \"{title}\".\n"))
    }

    fn edit_book(&self, id: &EntityId, fields: &BookFields) -> Result<String> {
        let mut form = FormView::new(self.client.clone(), FormTarget::EditBook(id.clone()));
        let commands = form.mount();
        drive(&mut form, &self.transport, commands);
        if let Some(err) = form.error() {
            bail!("{err}");
        }
        if let Some(report) = form.genres().error() {
            tracing::warn!(%report, "genre options unavailable");
        }
        apply(&mut form, fields)?;
        self.save(&mut form)?;
        Ok(format!("Updated book {id}.\n"))
    }

    fn delete_book<F>(&self, id: &EntityId, confirm: F) -> Result<String>
    where
        F: FnOnce(&EntityId) -> bool,
    {
        let mut view = BookListView::new(self.client.clone(), 1);
        let commands = view.delete(id, confirm);
        if commands.is_empty() {
            return match view.error() {
                Some(report) => Err(anyhow!("{report}")),
                None => Ok("Delete cancelled.\n".to_string()),
            };
        }
        // A successful delete is followed by exactly one list re-fetch.
        let executed = drive(&mut view, &self.transport, commands);
        if executed < 2 {
            let message = view
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("failed to delete book {id}"));
            bail!("{message}");
        }
        Ok(format!("Deleted book {id}.\n"))
    }

    fn import_books(&self, file: &Path) -> Result<String> {
        let raw = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let records: Vec<BookRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array of books", file.display()))?;
        let books: Vec<Book> = records.into_iter().map(Book::from).collect();
        if books.is_empty() {
            return Ok("Nothing to import.\n".to_string());
        }

        let request = self.client.build_create_books(&books).map_err(reported)?;
        let response = send(&self.transport, &request).map_err(reported)?;
        let created = self.client.parse_create_books(response).map_err(reported)?;
        tracing::info!(sent = books.len(), created = created.len(), "import finished");

        let rows: Vec<BookRow> = created.iter().map(BookRow::from).collect();
        Ok(format!(
            "Imported {} of {} books.\n{}",
            created.len(),
            books.len(),
            render::book_table(&rows)
        ))
    }

    fn list_genres(&self) -> Result<String> {
        let response = send(&self.transport, &self.client.build_list_genres()).map_err(reported)?;
        let genres = self.client.parse_list_genres(response).map_err(reported)?;
        Ok(render::genre_table(&genres))
    }

    fn add_genre(&self, name: &str) -> Result<String> {
        let mut form = FormView::new(self.client.clone(), FormTarget::NewGenre);
        form.change(Field::Name, name)?;
        self.save(&mut form)?;
        Ok(format!("Created genre \"{}\".\n", name.trim()))
    }

    fn books_by_genre(&self, id: Option<&EntityId>) -> Result<String> {
        let request = self.client.build_list_books_by_genre(id);
        let response = send(&self.transport, &request).map_err(reported)?;
        let books = self.client.parse_list_books_by_genre(response).map_err(reported)?;
        let rows: Vec<BookRow> = books.iter().map(BookRow::from).collect();
        Ok(render::book_table(&rows))
    }

    fn save(&self, form: &mut FormView) -> Result<()> {
        let commands = form.submit();
        drive(form, &self.transport, commands);
        if let Some(err) = form.error() {
            bail!("{err}");
        }
        if form.navigation().is_none() {
            bail!("form was not submitted");
        }
        Ok(())
    }
}

fn apply(form: &mut FormView, fields: &BookFields) -> Result<()> {
    let values = [
        (Field::Title, &fields.title),
        (Field::Author, &fields.author),
        (Field::Quantity, &fields.quantity),
        (Field::GenreId, &fields.genre),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            form.change(field, value)?;
        }
    }
    Ok(())
}
