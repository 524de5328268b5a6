//! I/O-free view models for the catalog screens.
//!
//! # Design
//! A view never performs a request itself. State transitions return
//! [`Command`]s (a ticket plus the request to run) and the host feeds each
//! outcome back through [`View::handle`]. Tickets carry a per-concern
//! generation number so a response that was overtaken by a newer request is
//! dropped instead of overwriting fresher state. [`drive`] is the simple
//! single-threaded event loop used by the CLI and by tests.

pub mod book_list;
pub mod form;
pub mod route;

use std::collections::{HashMap, VecDeque};

use crate::error::ApiError;
use crate::http::{send, HttpRequest, HttpResponse, Transport};

pub use book_list::{BookListView, BookRow, ListPhase, Pager};
pub use form::{Draft, Field, FieldError, FormError, FormPhase, FormTarget, FormView, Resource};
pub use route::Route;

/// Which in-flight request a response belongs to. A view holds at most one
/// live request per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    BookList,
    Delete,
    Genres,
    Book,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub concern: Concern,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

pub type Outcome = Result<HttpResponse, ApiError>;

pub trait View {
    /// Apply the outcome of the request issued under `ticket`, returning any
    /// follow-up commands.
    fn handle(&mut self, ticket: Ticket, outcome: Outcome) -> Vec<Command>;
}

/// Per-concern generation counters.
#[derive(Debug, Default, Clone)]
pub(crate) struct Generations {
    counters: HashMap<Concern, u64>,
}

impl Generations {
    pub(crate) fn next(&mut self, concern: Concern) -> Ticket {
        let counter = self.counters.entry(concern).or_insert(0);
        *counter += 1;
        Ticket {
            concern,
            generation: *counter,
        }
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        let current = self.counters.get(&ticket.concern).copied();
        if current == Some(ticket.generation) {
            return true;
        }
        tracing::debug!(
            concern = ?ticket.concern,
            generation = ticket.generation,
            ?current,
            "discarding stale response"
        );
        false
    }
}

/// Run `commands` and every follow-up through `transport` until the queue is
/// empty. Returns the number of requests executed.
pub fn drive<V, T>(view: &mut V, transport: &T, commands: Vec<Command>) -> usize
where
    V: View + ?Sized,
    T: Transport + ?Sized,
{
    let mut queue: VecDeque<Command> = commands.into();
    let mut executed = 0;
    while let Some(command) = queue.pop_front() {
        executed += 1;
        let outcome = send(transport, &command.request);
        queue.extend(view.handle(command.ticket, outcome));
    }
    executed
}
