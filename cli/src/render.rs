//! Plain-text rendering of view state.

use std::fmt::Write;

use catalog_core::views::{BookRow, Pager};
use catalog_core::{Book, Genre};

fn id_text(id: Option<&catalog_core::EntityId>) -> String {
    id.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

/// Left-aligned columns separated by two spaces. The last column is not
/// padded.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header).chain(rows) {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                let pad = widths[i] - cell.chars().count();
                let _ = write!(out, "{cell}{}  ", " ".repeat(pad));
            }
        }
        out.push('\n');
    }
    out
}

pub fn book_table(rows: &[BookRow]) -> String {
    if rows.is_empty() {
        return "No books found.\n".to_string();
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                id_text(row.id.as_ref()),
                row.title.clone(),
                row.author.clone(),
                row.quantity.to_string(),
            ]
        })
        .collect();
    table(&["ID", "TITLE", "AUTHOR", "QTY"], &rows)
}

/// `Page 2 of 5 (previous, next)`.
pub fn pager_line(pager: &Pager) -> String {
    let moves: Vec<&str> = [
        pager.has_previous().then_some("previous"),
        pager.has_next().then_some("next"),
    ]
    .into_iter()
    .flatten()
    .collect();
    format!("Page {} of {} ({})\n", pager.current, pager.total, moves.join(", "))
}

pub fn book_list(rows: &[BookRow], pager: Option<Pager>) -> String {
    let mut out = book_table(rows);
    if let Some(pager) = pager {
        out.push_str(&pager_line(&pager));
    }
    out
}

pub fn book_detail(book: &Book) -> String {
    let row = BookRow::from(book);
    let mut out = String::new();
    let _ = writeln!(out, "id:       {}", id_text(book.id.as_ref()));
    let _ = writeln!(out, "title:    {}", row.title);
    let _ = writeln!(out, "author:   {}", row.author);
    let _ = writeln!(out, "quantity: {}", row.quantity);
    let _ = writeln!(out, "genre:    {}", id_text(book.genre_id.as_ref()));
    out
}

pub fn genre_table(genres: &[Genre]) -> String {
    if genres.is_empty() {
        return "No genres found.\n".to_string();
    }
    let rows: Vec<Vec<String>> = genres
        .iter()
        .map(|g| vec![g.id.to_string(), g.name.clone()])
        .collect();
    table(&["ID", "NAME"], &rows)
}

#[cfg(test)]
mod tests {
    use catalog_core::EntityId;

    use super::*;

    fn row(id: &str, title: &str, author: &str, quantity: u32) -> BookRow {
        BookRow {
            id: Some(EntityId::from(id)),
            title: title.to_string(),
            author: author.to_string(),
            quantity,
        }
    }

    #[test]
    fn book_table_aligns_columns() {
        let out = book_table(&[row("a1", "Emma", "Austen", 2), row("b22", "Dune", "N/A", 10)]);
        assert_eq!(
            out,
            "ID   TITLE  AUTHOR  QTY\n\
             a1   Emma   Austen  2\n\
             b22  Dune   N/A     10\n"
        );
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(book_list(&[], None), "No books found.\n");
        assert_eq!(genre_table(&[]), "No genres found.\n");
    }

    #[test]
    fn pager_lists_available_moves() {
        let first = Pager { current: 1, total: 3 };
        assert_eq!(pager_line(&first), "Page 1 of 3 (next)\n");
        let middle = Pager { current: 2, total: 3 };
        assert_eq!(pager_line(&middle), "Page 2 of 3 (previous, next)\n");
    }

    #[test]
    fn detail_shows_missing_values() {
        let book = Book::new("Emma", " ");
        let out = book_detail(&book);
        assert!(out.contains("id:       -\n"));
        assert!(out.contains("author:   N/A\n"));
        assert!(out.contains("genre:    -\n"));
    }
}
