//! Paginated book list with delete-with-confirmation.

use crate::client::CatalogClient;
use crate::error::{ApiError, ErrorReport};
use crate::types::{Book, EntityId};

use super::{Command, Concern, Generations, Outcome, Ticket, View};

pub const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Idle,
    ErrorShown,
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: Option<EntityId>,
    pub title: String,
    pub author: String,
    pub quantity: u32,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        let author = if book.author.trim().is_empty() {
            "N/A".to_string()
        } else {
            book.author.clone()
        };
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author,
            quantity: book.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub current: u32,
    pub total: u32,
}

impl Pager {
    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        1..=self.total
    }
}

#[derive(Debug, Clone)]
pub struct BookListView {
    client: CatalogClient,
    per_page: u32,
    page: u32,
    total_pages: u32,
    books: Vec<Book>,
    phase: ListPhase,
    error: Option<ErrorReport>,
    deleting: bool,
    generations: Generations,
}

impl BookListView {
    pub fn new(client: CatalogClient, per_page: u32) -> Self {
        Self {
            client,
            per_page: per_page.max(1),
            page: 1,
            total_pages: 1,
            books: Vec::new(),
            phase: ListPhase::Loading,
            error: None,
            deleting: false,
            generations: Generations::default(),
        }
    }

    pub fn mount(&mut self) -> Vec<Command> {
        vec![self.fetch()]
    }

    /// Re-fetch the current page.
    pub fn refresh(&mut self) -> Vec<Command> {
        vec![self.fetch()]
    }

    /// Move to `page`, clamped to the known page range. Selecting the page
    /// already shown issues nothing.
    pub fn set_page(&mut self, page: u32) -> Vec<Command> {
        let page = page.clamp(1, self.total_pages);
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        vec![self.fetch()]
    }

    pub fn next_page(&mut self) -> Vec<Command> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Vec<Command> {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Delete `id` once `confirm` agrees. Declining, or a delete already in
    /// flight, issues nothing.
    pub fn delete<F>(&mut self, id: &EntityId, confirm: F) -> Vec<Command>
    where
        F: FnOnce(&EntityId) -> bool,
    {
        if self.deleting {
            tracing::debug!(%id, "delete already in flight");
            return Vec::new();
        }
        if !confirm(id) {
            return Vec::new();
        }
        match self.client.build_delete_book(id) {
            Ok(request) => {
                self.deleting = true;
                vec![Command {
                    ticket: self.generations.next(Concern::Delete),
                    request,
                }]
            }
            Err(err) => {
                self.show_error(&err);
                Vec::new()
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
        if self.phase == ListPhase::ErrorShown {
            self.phase = ListPhase::Idle;
        }
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        self.error.as_ref()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Table rows, or `None` while a fetch is in flight.
    pub fn rows(&self) -> Option<Vec<BookRow>> {
        if self.is_loading() {
            return None;
        }
        Some(self.books.iter().map(BookRow::from).collect())
    }

    /// Pager controls, shown only when there is more than one page.
    pub fn pager(&self) -> Option<Pager> {
        (self.total_pages > 1).then_some(Pager {
            current: self.page,
            total: self.total_pages,
        })
    }

    fn fetch(&mut self) -> Command {
        self.phase = ListPhase::Loading;
        self.error = None;
        Command {
            ticket: self.generations.next(Concern::BookList),
            request: self.client.build_list_books(self.page, self.per_page),
        }
    }

    fn show_error(&mut self, err: &ApiError) {
        self.error = Some(err.report());
        self.phase = ListPhase::ErrorShown;
    }

    /// A page count that shrank below the current page (the last book of
    /// the last page was deleted) moves to the new last page and re-fetches.
    fn on_list(&mut self, outcome: Outcome) -> Vec<Command> {
        match outcome.and_then(|response| self.client.parse_list_books(response)) {
            Ok(page) => {
                self.books = page.books;
                self.total_pages = page.total_pages.max(1);
                self.error = None;
                self.phase = ListPhase::Idle;
                if self.page > self.total_pages {
                    tracing::debug!(
                        page = self.page,
                        total_pages = self.total_pages,
                        "page out of range, fetching last page"
                    );
                    self.page = self.total_pages;
                    return vec![self.fetch()];
                }
                Vec::new()
            }
            Err(err @ ApiError::Decode(_)) => {
                self.books.clear();
                self.total_pages = 1;
                self.show_error(&err);
                Vec::new()
            }
            Err(err) => {
                self.show_error(&err);
                Vec::new()
            }
        }
    }

    fn on_delete(&mut self, outcome: Outcome) -> Vec<Command> {
        self.deleting = false;
        match outcome.and_then(|response| self.client.parse_delete_book(response)) {
            Ok(()) => vec![self.fetch()],
            Err(err) => {
                self.show_error(&err);
                Vec::new()
            }
        }
    }
}

impl View for BookListView {
    fn handle(&mut self, ticket: Ticket, outcome: Outcome) -> Vec<Command> {
        if !self.generations.is_current(ticket) {
            return Vec::new();
        }
        match ticket.concern {
            Concern::BookList => self.on_list(outcome),
            Concern::Delete => self.on_delete(outcome),
            other => {
                tracing::debug!(concern = ?other, "book list ignores unrelated response");
                Vec::new()
            }
        }
    }
}
