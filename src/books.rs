use std::sync::Arc;
use thiserror::Error;
use crate::models::{Book, BookFilter, BookListQuery, CreateBookRequest, Page};
use crate::repository::{BookRepository, RepositoryError};

const MIN_YEAR: i32 = 1450;
const MAX_YEAR: i32 = 2100;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid book id")]
    InvalidId,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("book not found")]
    NotFound,
}

impl From<RepositoryError> for BookError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => BookError::NotFound,
        }
    }
}

// Book usecases over any repository
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, req: CreateBookRequest) -> Result<Book, BookError> {
        let book = validate(req)?;
        Ok(self.repo.create(book))
    }

    pub fn list(&self, query: BookListQuery) -> Result<Vec<Book>, BookError> {
        let filter = parse_filter(query)?;
        Ok(self.repo.find_all(&filter))
    }

    pub fn get(&self, raw_id: &str) -> Result<Book, BookError> {
        let id = parse_id(raw_id)?;
        Ok(self.repo.find_by_id(id)?)
    }

    pub fn update(&self, raw_id: &str, req: CreateBookRequest) -> Result<Book, BookError> {
        let id = parse_id(raw_id)?;
        let book = validate(req)?;
        Ok(self.repo.update_by_id(id, book)?)
    }

    pub fn delete(&self, raw_id: &str) -> Result<(), BookError> {
        let id = parse_id(raw_id)?;
        Ok(self.repo.delete_by_id(id)?)
    }
}

fn parse_id(raw_id: &str) -> Result<i64, BookError> {
    match raw_id.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(BookError::InvalidId),
    }
}

// Either of page/limit turns pagination on; the missing one takes its default.
fn parse_filter(query: BookListQuery) -> Result<BookFilter, BookError> {
    let number = query.page.as_deref().map(|raw| parse_bound("page", raw, None)).transpose()?;
    let size = query
        .limit
        .as_deref()
        .map(|raw| parse_bound("limit", raw, Some(MAX_PAGE_LIMIT)))
        .transpose()?;

    let page = match (number, size) {
        (None, None) => None,
        (number, size) => Some(Page {
            number: number.unwrap_or(1),
            size: size.unwrap_or(MAX_PAGE_LIMIT),
        }),
    };

    Ok(BookFilter {
        author: query.author,
        page,
    })
}

fn parse_bound(name: &str, raw: &str, max: Option<u32>) -> Result<u32, BookError> {
    let value = raw.trim().parse::<u32>().ok().filter(|v| *v >= 1);
    match (value, max) {
        (Some(value), Some(max)) if value <= max => Ok(value),
        (Some(value), None) => Ok(value),
        (_, Some(max)) => Err(BookError::InvalidQuery(format!(
            "{name} must be an integer between 1 and {max}"
        ))),
        (None, None) => Err(BookError::InvalidQuery(format!(
            "{name} must be a positive integer"
        ))),
    }
}

fn validate(req: CreateBookRequest) -> Result<Book, BookError> {
    let title = req.title.trim();
    let author = req.author.trim();

    if title.is_empty() {
        return Err(BookError::Validation("title is required".into()));
    }
    if author.is_empty() {
        return Err(BookError::Validation("author is required".into()));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&req.year) {
        return Err(BookError::Validation(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}"
        )));
    }

    Ok(Book {
        id: 0,
        title: title.to_string(),
        author: author.to_string(),
        year: req.year,
    })
}
