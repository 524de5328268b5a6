//! The catalog's single form component.
//!
//! # Design
//! New-book, edit-book and the genre route all share this view; a
//! [`FormTarget`] selects the draft kind, which requests run on mount and
//! which operation a submission calls. Book targets load genre options with
//! their own [`Resource`] state so a failed genre fetch never blocks editing.

use std::fmt;

use crate::client::CatalogClient;
use crate::codec::parse_quantity;
use crate::error::{ApiError, ErrorReport};
use crate::http::HttpRequest;
use crate::types::{Book, EntityId, Genre, NewGenre};

use super::{Command, Concern, Generations, Outcome, Route, Ticket, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    NewBook,
    EditBook(EntityId),
    NewGenre,
}

impl FormTarget {
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::NewBook => Some(FormTarget::NewBook),
            Route::EditBook(id) => Some(FormTarget::EditBook(id.clone())),
            Route::NewGenre => Some(FormTarget::NewGenre),
            Route::BookList => None,
        }
    }

    pub fn is_book(&self) -> bool {
        !matches!(self, FormTarget::NewGenre)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Quantity,
    GenreId,
    Name,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Quantity => "quantity",
            Field::GenreId => "genre_id",
            Field::Name => "name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side validation failure. Never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Field(FieldError),
    Api(ErrorReport),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Field(err) => err.fmt(f),
            FormError::Api(report) => report.fmt(f),
        }
    }
}

impl std::error::Error for FormError {}

/// Working copy of a book. `genre_id` holds the select control's raw value;
/// an empty string means "no genre".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub id: Option<EntityId>,
    pub title: String,
    pub author: String,
    pub quantity: u32,
    pub genre_id: String,
}

impl From<Book> for BookDraft {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            quantity: book.quantity,
            genre_id: book.genre_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

impl BookDraft {
    fn validate(&self) -> Result<(), FieldError> {
        if self.title.trim().is_empty() {
            return Err(FieldError::new(Field::Title, "title is required"));
        }
        if self.author.trim().is_empty() {
            return Err(FieldError::new(Field::Author, "author is required"));
        }
        Ok(())
    }

    /// The book to send: trimmed text fields, blank genre dropped.
    pub fn to_book(&self) -> Book {
        let genre_id = self.genre_id.trim();
        Book {
            id: self.id.clone(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            quantity: self.quantity,
            genre_id: (!genre_id.is_empty()).then(|| EntityId::from(genre_id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreDraft {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Book(BookDraft),
    Genre(GenreDraft),
}

/// Independently tracked remote data, e.g. the genre select options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(ErrorReport),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Resource::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            Resource::Failed(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Edit mode, waiting for the existing book.
    Loading,
    Editing,
    Submitting,
    /// Saved; the host should navigate to [`FormView::navigation`].
    Submitted,
}

#[derive(Debug, Clone)]
pub struct FormView {
    client: CatalogClient,
    target: FormTarget,
    draft: Draft,
    genres: Resource<Vec<Genre>>,
    phase: FormPhase,
    error: Option<FormError>,
    generations: Generations,
}

impl FormView {
    pub fn new(client: CatalogClient, target: FormTarget) -> Self {
        let draft = match &target {
            FormTarget::NewBook => Draft::Book(BookDraft::default()),
            FormTarget::EditBook(id) => Draft::Book(BookDraft {
                id: Some(id.clone()),
                ..BookDraft::default()
            }),
            FormTarget::NewGenre => Draft::Genre(GenreDraft::default()),
        };
        Self {
            client,
            target,
            draft,
            genres: Resource::Idle,
            phase: FormPhase::Editing,
            error: None,
            generations: Generations::default(),
        }
    }

    /// Requests to run when the form opens: genre options for book targets,
    /// plus the existing book in edit mode.
    pub fn mount(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.target.is_book() {
            self.genres = Resource::Loading;
            commands.push(Command {
                ticket: self.generations.next(Concern::Genres),
                request: self.client.build_list_genres(),
            });
        }
        if let FormTarget::EditBook(id) = &self.target {
            self.phase = FormPhase::Loading;
            commands.push(Command {
                ticket: self.generations.next(Concern::Book),
                request: self.client.build_get_book(Some(id)),
            });
        }
        commands
    }

    /// Store a field value as entered. `quantity` is parsed as a base-10
    /// integer, falling back to 0.
    pub fn change(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        match (&mut self.draft, field) {
            (Draft::Book(book), Field::Title) => book.title = value.to_string(),
            (Draft::Book(book), Field::Author) => book.author = value.to_string(),
            (Draft::Book(book), Field::Quantity) => book.quantity = parse_quantity(value),
            (Draft::Book(book), Field::GenreId) => book.genre_id = value.to_string(),
            (Draft::Genre(genre), Field::Name) => genre.name = value.to_string(),
            (_, field) => {
                return Err(FieldError::new(field, "field does not belong to this form"));
            }
        }
        Ok(())
    }

    /// Validate and emit the save request. Nothing is emitted while a save or
    /// the initial load is in flight, or when validation fails.
    pub fn submit(&mut self) -> Vec<Command> {
        if !self.can_submit() {
            return Vec::new();
        }
        let request = match self.build_submit() {
            Ok(request) => request,
            Err(err) => {
                self.error = Some(err);
                return Vec::new();
            }
        };
        self.error = None;
        self.phase = FormPhase::Submitting;
        vec![Command {
            ticket: self.generations.next(Concern::Submit),
            request,
        }]
    }

    pub fn cancel(&self) -> Route {
        Route::BookList
    }

    /// Where to go once the form has been saved.
    pub fn navigation(&self) -> Option<Route> {
        (self.phase == FormPhase::Submitted).then_some(Route::BookList)
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    pub fn target(&self) -> &FormTarget {
        &self.target
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn book_draft(&self) -> Option<&BookDraft> {
        match &self.draft {
            Draft::Book(book) => Some(book),
            Draft::Genre(_) => None,
        }
    }

    pub fn genres(&self) -> &Resource<Vec<Genre>> {
        &self.genres
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    fn build_submit(&self) -> Result<HttpRequest, FormError> {
        let api = |err: ApiError| FormError::Api(err.report());
        match (&self.target, &self.draft) {
            (FormTarget::NewBook, Draft::Book(draft)) => {
                draft.validate().map_err(FormError::Field)?;
                self.client.build_create_book(&draft.to_book()).map_err(api)
            }
            (FormTarget::EditBook(id), Draft::Book(draft)) => {
                draft.validate().map_err(FormError::Field)?;
                let mut book = draft.to_book();
                book.id = Some(id.clone());
                self.client.build_update_book(&book).map_err(api)
            }
            (FormTarget::NewGenre, Draft::Genre(draft)) => {
                let name = draft.name.trim();
                if name.is_empty() {
                    return Err(FormError::Field(FieldError::new(Field::Name, "name is required")));
                }
                self.client
                    .build_create_genre(&NewGenre {
                        name: name.to_string(),
                    })
                    .map_err(api)
            }
            (target, _) => Err(FormError::Api(ErrorReport {
                message: format!("draft does not match form target {target:?}"),
                status: None,
            })),
        }
    }

    fn on_genres(&mut self, outcome: Outcome) {
        self.genres = match outcome.and_then(|response| self.client.parse_list_genres(response)) {
            Ok(genres) => Resource::Loaded(genres),
            Err(err) => Resource::Failed(err.report()),
        };
    }

    fn on_book(&mut self, outcome: Outcome) {
        match outcome.and_then(|response| self.client.parse_get_book(response)) {
            Ok(book) => {
                let mut draft = BookDraft::from(book);
                if let FormTarget::EditBook(id) = &self.target {
                    draft.id.get_or_insert_with(|| id.clone());
                }
                self.draft = Draft::Book(draft);
            }
            Err(err) => self.error = Some(FormError::Api(err.report())),
        }
        self.phase = FormPhase::Editing;
    }

    fn on_submit(&mut self, outcome: Outcome) {
        let result = outcome.and_then(|response| match &self.target {
            FormTarget::NewBook => self.client.parse_create_book(response).map(drop),
            FormTarget::EditBook(_) => self.client.parse_update_book(response).map(drop),
            FormTarget::NewGenre => self.client.parse_create_genre(response).map(drop),
        });
        match result {
            Ok(()) => self.phase = FormPhase::Submitted,
            Err(err) => {
                self.error = Some(FormError::Api(err.report()));
                self.phase = FormPhase::Editing;
            }
        }
    }
}

impl View for FormView {
    fn handle(&mut self, ticket: Ticket, outcome: Outcome) -> Vec<Command> {
        if !self.generations.is_current(ticket) {
            return Vec::new();
        }
        match ticket.concern {
            Concern::Genres => self.on_genres(outcome),
            Concern::Book => self.on_book(outcome),
            Concern::Submit => self.on_submit(outcome),
            other => tracing::debug!(concern = ?other, "form ignores unrelated response"),
        }
        Vec::new()
    }
}
