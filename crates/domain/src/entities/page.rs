use serde::{Deserialize, Serialize};

/// One page of a paged query, plus the page count the server reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_pages: u32) -> Self {
        Self { items, total_pages }
    }

    /// A page with no items and a single (empty) page in total.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
        }
    }
}
