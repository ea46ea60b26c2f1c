//! Scripted `BookSource` for controller and loader tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bookhub_core::{BookRecord, FetchError, FilterSpec};

use crate::api::BookSource;

pub fn book(id: u64, title: &str) -> BookRecord {
    BookRecord {
        id,
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        genre: "Sci-Fi".to_string(),
        rating: 4.5,
        publication_date: "1965-08-01".to_string(),
        description: "Desert planet".to_string(),
        cover_image: Some("/media/covers/dune.jpg".to_string()),
        pages: 412,
        isbn: "9780441013593".to_string(),
        language: "English".to_string(),
        publisher: "Chilton Books".to_string(),
        price: 9.99,
        in_stock: true,
        created_at: "2024-01-02T10:00:00Z".to_string(),
        updated_at: "2024-01-03T11:30:00Z".to_string(),
    }
}

pub fn books(count: u64) -> Vec<BookRecord> {
    (1..=count).map(|id| book(id, &format!("Book {id}"))).collect()
}

type Scripted<T> = (Duration, Result<T, FetchError>);

/// Records every call and answers from a script, falling back to a default
#[derive(Default)]
pub struct FakeSource {
    searches: Mutex<Vec<(String, FilterSpec)>>,
    lookups: Mutex<Vec<u64>>,
    search_script: Mutex<VecDeque<Scripted<Vec<BookRecord>>>>,
    search_default: Mutex<Option<Result<Vec<BookRecord>, FetchError>>>,
    book_script: Mutex<VecDeque<Scripted<BookRecord>>>,
}

impl FakeSource {
    pub fn with_books(books: Vec<BookRecord>) -> Self {
        let source = Self::default();
        source.respond(Ok(books));
        source
    }

    /// Answer every unscripted search with `outcome`
    pub fn respond(&self, outcome: Result<Vec<BookRecord>, FetchError>) {
        *self.search_default.lock().unwrap() = Some(outcome);
    }

    /// Answer the next search with `outcome` after `delay`
    pub fn script_search(&self, delay: Duration, outcome: Result<Vec<BookRecord>, FetchError>) {
        self.search_script
            .lock()
            .unwrap()
            .push_back((delay, outcome));
    }

    /// Answer the next detail lookup with `outcome` after `delay`
    pub fn script_book(&self, delay: Duration, outcome: Result<BookRecord, FetchError>) {
        self.book_script.lock().unwrap().push_back((delay, outcome));
    }

    pub fn searches(&self) -> Vec<(String, FilterSpec)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn lookups(&self) -> Vec<u64> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookSource for FakeSource {
    async fn search(
        &self,
        query: &str,
        filters: &FilterSpec,
    ) -> Result<Vec<BookRecord>, FetchError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), filters.clone()));

        let scripted = self.search_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => self
                .search_default
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(Vec::new())),
        }
    }

    async fn book(&self, id: u64) -> Result<BookRecord, FetchError> {
        self.lookups.lock().unwrap().push(id);

        let scripted = self.book_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Ok(book(id, &format!("Book {id}"))),
        }
    }
}
