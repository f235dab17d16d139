use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use crate::models::{Book, BookFilter};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("book not found")]
    NotFound,
}

// Storage seam for books. `id` on the input of `create`/`update_by_id` is ignored.
pub trait BookRepository: Send + Sync {
    fn create(&self, book: Book) -> Book;
    fn find_all(&self, filter: &BookFilter) -> Vec<Book>;
    fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError>;
    fn update_by_id(&self, id: i64, book: Book) -> Result<Book, RepositoryError>;
    fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

// In-memory store, ids start at 1
pub struct InMemoryBookRepository {
    books: DashMap<i64, Book>,
    next_id: AtomicI64,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BookRepository for InMemoryBookRepository {
    fn create(&self, mut book: Book) -> Book {
        book.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.books.insert(book.id, book.clone());
        book
    }

    fn find_all(&self, filter: &BookFilter) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter(|entry| match &filter.author {
                Some(author) if !author.is_empty() => &entry.author == author,
                _ => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        books.sort_by_key(|b| b.id);

        match filter.page {
            Some(page) => {
                let size = page.size as usize;
                let offset = (page.number.max(1) as usize - 1).saturating_mul(size);
                books.into_iter().skip(offset).take(size).collect()
            }
            None => books,
        }
    }

    fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError> {
        self.books
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(RepositoryError::NotFound)
    }

    fn update_by_id(&self, id: i64, mut book: Book) -> Result<Book, RepositoryError> {
        let mut entry = self.books.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        book.id = id;
        *entry = book.clone();
        Ok(book)
    }

    fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.books
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    fn book(title: &str, author: &str) -> Book {
        Book {
            id: 0,
            title: title.to_string(),
            author: author.to_string(),
            year: 2000,
        }
    }

    fn seeded() -> InMemoryBookRepository {
        let repo = InMemoryBookRepository::new();
        repo.create(book("Dune", "Herbert"));
        repo.create(book("Emma", "Austen"));
        repo.create(book("Persuasion", "Austen"));
        repo
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let repo = seeded();
        let ids: Vec<i64> = repo.find_all(&BookFilter::default()).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn filters_by_author() {
        let repo = seeded();
        let query = BookFilter {
            author: Some("Austen".into()),
            ..Default::default()
        };
        let titles: Vec<String> = repo.find_all(&query).into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Emma", "Persuasion"]);
    }

    #[test]
    fn paginates_after_filtering() {
        let repo = seeded();
        let page2 = BookFilter {
            page: Some(Page { number: 2, size: 2 }),
            ..Default::default()
        };
        let ids: Vec<i64> = repo.find_all(&page2).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3]);

        let austen_first = BookFilter {
            author: Some("Austen".into()),
            page: Some(Page { number: 1, size: 1 }),
        };
        let titles: Vec<String> = repo.find_all(&austen_first).into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Emma"]);

        let past_end = BookFilter {
            page: Some(Page { number: 9, size: 2 }),
            ..Default::default()
        };
        assert!(repo.find_all(&past_end).is_empty());
    }

    #[test]
    fn update_and_delete_missing_rows() {
        let repo = seeded();
        assert_eq!(repo.update_by_id(99, book("x", "y")), Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_by_id(99), Err(RepositoryError::NotFound));

        let updated = repo.update_by_id(1, book("Dune Messiah", "Herbert")).unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(repo.find_by_id(1).unwrap().title, "Dune Messiah");

        repo.delete_by_id(1).unwrap();
        assert_eq!(repo.find_by_id(1), Err(RepositoryError::NotFound));
    }
}
