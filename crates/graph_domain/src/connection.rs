use serde::{Deserialize, Serialize};

/// Links to the neighbouring pages of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of a paginated collection, e.g. `me/feed`.
///
/// Page URLs are opaque: they are returned by the server and fetched as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> Connection<T> {
    pub fn new(data: Vec<T>, paging: Option<Paging>) -> Self {
        Self { data, paging }
    }

    pub fn previous_page_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|paging| paging.previous.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn next_page_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|paging| paging.next.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn has_previous(&self) -> bool {
        self.previous_page_url().is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next_page_url().is_some()
    }
}
