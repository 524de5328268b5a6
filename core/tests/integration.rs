//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client and the
//! view models over real HTTP using ureq. Validates that request building,
//! envelope decoding and the view state machines agree with the server.

use catalog_core::views::{Field, FormPhase, ListPhase, Resource};
use catalog_core::{
    drive, ApiError, Book, BookListView, CatalogClient, EntityId, ErrorStatus, FormTarget,
    FormView, HttpMethod, HttpRequest, HttpResponse, NewGenre, Route, Transport, TransportError,
};
use mock_server::ListShape;

/// Executes requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// interpret them.
struct Ureq(ureq::Agent);

impl Ureq {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self(agent)
    }
}

impl Transport for Ureq {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = req.path.as_str();
        let body = req.body.as_deref();
        let result = match (req.method, body) {
            (HttpMethod::Get, _) => self.0.get(url).call(),
            (HttpMethod::Delete, None) => self.0.delete(url).call(),
            (HttpMethod::Delete, Some(body)) => self
                .0
                .delete(url)
                .force_send_body()
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, body) => self
                .0
                .post(url)
                .content_type("application/json")
                .send(body.unwrap_or_default().as_bytes()),
            (HttpMethod::Put, body) => self
                .0
                .put(url)
                .content_type("application/json")
                .send(body.unwrap_or_default().as_bytes()),
        };
        let mut response = result.map_err(|err| TransportError::Io(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Start a mock server on a random port and return its base URL.
fn start(shape: ListShape) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, shape).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn execute(req: HttpRequest) -> HttpResponse {
    Ureq::new().execute(&req).expect("HTTP transport error")
}

#[test]
fn crud_lifecycle_through_views() {
    let base = start(ListShape::Flat);
    let client = CatalogClient::new(&base).unwrap();
    let http = Ureq::new();

    // An empty store answers `data: null`; the list still shows one page.
    let mut list = BookListView::new(client.clone(), 2);
    let commands = list.mount();
    drive(&mut list, &http, commands);
    assert_eq!(list.phase(), ListPhase::Idle);
    assert!(list.books().is_empty());
    assert_eq!(list.total_pages(), 1);
    assert!(list.pager().is_none());

    // Create a genre through the genre form.
    let mut genre_form = FormView::new(client.clone(), FormTarget::NewGenre);
    assert!(genre_form.mount().is_empty());
    genre_form.change(Field::Name, "Classics").unwrap();
    let commands = genre_form.submit();
    drive(&mut genre_form, &http, commands);
    assert_eq!(genre_form.navigation(), Some(Route::BookList));

    // The book form offers it as an option.
    let mut form = FormView::new(client.clone(), FormTarget::NewBook);
    let commands = form.mount();
    drive(&mut form, &http, commands);
    let genres = match form.genres() {
        Resource::Loaded(genres) => genres.clone(),
        other => panic!("genres not loaded: {other:?}"),
    };
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Classics");
    let genre_id = genres[0].id.clone();

    form.change(Field::Title, "Persuasion").unwrap();
    form.change(Field::Author, "Austen").unwrap();
    form.change(Field::Quantity, "3").unwrap();
    form.change(Field::GenreId, &genre_id.to_string()).unwrap();
    let commands = form.submit();
    drive(&mut form, &http, commands);
    assert!(form.error().is_none(), "{:?}", form.error());
    assert_eq!(form.phase(), FormPhase::Submitted);

    // Two more books push the list to a second page.
    for title in ["Emma", "Sanditon"] {
        let req = client.build_create_book(&Book::new(title, "Austen")).unwrap();
        client.parse_create_book(execute(req)).unwrap();
    }
    let commands = list.refresh();
    drive(&mut list, &http, commands);
    let rows = list.rows().unwrap();
    let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);
    let pager = list.pager().unwrap();
    assert_eq!(pager.total, 2);
    assert!(pager.has_next());

    let commands = list.next_page();
    drive(&mut list, &http, commands);
    assert_eq!(list.page(), 2);
    assert_eq!(list.books()[0].title, "Sanditon");

    // Edit the first book: the form loads it, then saves changes.
    let commands = list.previous_page();
    drive(&mut list, &http, commands);
    let persuasion = list.books()[1].clone();
    let id = persuasion.id.clone().unwrap();
    assert_eq!(persuasion.quantity, 3);
    assert_eq!(persuasion.genre_id.as_ref(), Some(&genre_id));

    let route = Route::parse(&format!("/books/edit/{id}")).unwrap();
    let mut edit = FormView::new(client.clone(), FormTarget::from_route(&route).unwrap());
    let commands = edit.mount();
    drive(&mut edit, &http, commands);
    let draft = edit.book_draft().unwrap();
    assert_eq!(draft.title, "Persuasion");
    assert_eq!(draft.genre_id, genre_id.to_string());

    edit.change(Field::Quantity, "9").unwrap();
    let commands = edit.submit();
    drive(&mut edit, &http, commands);
    assert_eq!(edit.phase(), FormPhase::Submitted);

    let fetched = client
        .parse_get_book(execute(client.build_get_book(Some(&id))))
        .unwrap();
    assert_eq!(fetched.quantity, 9);

    // Books by genre, on both routes.
    let req = client.build_list_books_by_genre(Some(&genre_id));
    let in_genre = client.parse_list_books_by_genre(execute(req)).unwrap();
    assert_eq!(in_genre.len(), 1);
    assert_eq!(in_genre[0].id.as_ref(), Some(&id));

    // Delete it from the list; the list re-fetches afterwards.
    let commands = list.delete(&id, |_| true);
    let executed = drive(&mut list, &http, commands);
    assert_eq!(executed, 2);
    assert_eq!(list.phase(), ListPhase::Idle);
    assert!(list.books().iter().all(|b| b.id.as_ref() != Some(&id)));

    let err = client
        .parse_get_book(execute(client.build_get_book(Some(&id))))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.report().message, "book not found");
}

#[test]
fn backend_errors_reach_the_form() {
    let base = start(ListShape::Flat);
    let client = CatalogClient::new(&base).unwrap();
    let http = Ureq::new();

    let mut form = FormView::new(client, FormTarget::NewBook);
    let commands = form.mount();
    drive(&mut form, &http, commands);
    form.change(Field::Title, "Orphan").unwrap();
    form.change(Field::Author, "Nobody").unwrap();
    form.change(Field::GenreId, "no-such-genre").unwrap();
    let commands = form.submit();
    drive(&mut form, &http, commands);

    assert_eq!(form.phase(), FormPhase::Editing);
    match form.error() {
        Some(catalog_core::views::FormError::Api(report)) => {
            assert_eq!(report.message, "genre not found");
            assert_eq!(report.status, Some(ErrorStatus::Http(400)));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[test]
fn legacy_routes() {
    let base = start(ListShape::Flat);
    let client = CatalogClient::new(&base).unwrap();

    let req = client.build_create_genre(&NewGenre { name: "Poetry".into() }).unwrap();
    let genre = client.parse_create_genre(execute(req)).unwrap();

    let mut book = Book::new("Odes", "Keats");
    book.genre_id = Some(genre.id.clone());
    let req = client.build_create_book(&book).unwrap();
    let created = client.parse_create_book(execute(req)).unwrap();
    assert_eq!(created.title, "Odes");

    // Without an id the legacy lookup is rejected by the backend.
    let err = client.parse_get_book(execute(client.build_get_book(None))).unwrap_err();
    assert!(matches!(err, ApiError::Backend { .. }));
    assert_eq!(err.http_status(), Some(400));

    let req = client.build_list_books_by_genre(None);
    let err = client.parse_list_books_by_genre(execute(req)).unwrap_err();
    assert_eq!(err.report().message, "genre id is required");

    // Numeric ids go through the body-carrying delete route.
    let req = client.build_delete_book(&EntityId::from(42)).unwrap();
    assert_eq!(req.method, HttpMethod::Delete);
    let err = client.parse_delete_book(execute(req)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn batch_import() {
    let base = start(ListShape::Flat);
    let client = CatalogClient::new(&base).unwrap();

    let books = vec![Book::new("One", "A"), Book::new("Two", "B"), Book::new("", "C")];
    let req = client.build_create_books(&books).unwrap();
    let created = client.parse_create_books(execute(req)).unwrap();
    let titles: Vec<&str> = created.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two"]);

    let page = client.parse_list_books(execute(client.build_list_books(1, 20))).unwrap();
    assert_eq!(page.books.len(), 2);
    assert_eq!(page.total_items, Some(2));
}

#[test]
fn nested_and_bare_envelopes() {
    for (shape, expected_pages) in [(ListShape::Nested, 2), (ListShape::Bare, 1)] {
        let base = start(shape);
        let client = CatalogClient::new(&base).unwrap();
        let http = Ureq::new();
        for title in ["A", "B", "C"] {
            let req = client.build_create_book(&Book::new(title, "X")).unwrap();
            client.parse_create_book(execute(req)).unwrap();
        }

        let mut list = BookListView::new(client, 2);
        let commands = list.mount();
        drive(&mut list, &http, commands);
        assert_eq!(list.phase(), ListPhase::Idle, "{shape:?}");
        assert_eq!(list.total_pages(), expected_pages, "{shape:?}");
    }
}

#[test]
fn unreachable_backend_is_reported() {
    // Bind and drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = CatalogClient::new(&format!("http://{addr}")).unwrap();
    let http = Ureq::new();

    let mut list = BookListView::new(client, 20);
    let commands = list.mount();
    drive(&mut list, &http, commands);
    assert_eq!(list.phase(), ListPhase::ErrorShown);
    let report = list.error().unwrap();
    assert!(report.status.is_none());
    assert!(!report.message.is_empty());
}
