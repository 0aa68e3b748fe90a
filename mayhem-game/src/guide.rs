//! Paginated rules guide.
use serde::{Deserialize, Serialize};

const DEFAULT_GUIDE_DATA: &str = include_str!("../assets/data/guide.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph { text: String },
    Bullets { items: Vec<String> },
    /// Numbered list.
    Steps { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub subheading: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideBook {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub close_label: String,
    pub slides: Vec<Slide>,
}

impl Default for GuideBook {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_GUIDE_DATA).unwrap_or_else(|err| {
            log::warn!("embedded guide failed to parse: {err}");
            Self {
                title: "Guidebook".to_string(),
                subtitle: None,
                close_label: "Close".to_string(),
                slides: vec![Slide::default()],
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Showing(usize),
    Closed,
}

/// Reader position within a [`GuideBook`].
#[derive(Debug, Clone)]
pub struct Guide {
    book: GuideBook,
    current: usize,
    open: bool,
}

impl Default for Guide {
    fn default() -> Self {
        Self::new(GuideBook::default())
    }
}

impl Guide {
    #[must_use]
    pub const fn new(book: GuideBook) -> Self {
        Self {
            book,
            current: 0,
            open: true,
        }
    }

    #[must_use]
    pub const fn book(&self) -> &GuideBook {
        &self.book
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.book.slides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book.slides.is_empty()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&Slide> {
        if self.open {
            self.book.slides.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len()
    }

    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Advance one slide; stepping past the last slide closes the guide.
    pub fn next(&mut self) -> Page {
        if !self.open {
            return Page::Closed;
        }
        if self.is_last() {
            self.close();
            return Page::Closed;
        }
        self.current += 1;
        Page::Showing(self.current)
    }

    /// Go back one slide; no-op on the first.
    pub fn prev(&mut self) -> Page {
        if !self.open {
            return Page::Closed;
        }
        if self.can_go_back() {
            self.current -= 1;
        }
        Page::Showing(self.current)
    }

    /// Jump straight to a slide, clamped to the book.
    pub fn go_to(&mut self, index: usize) -> Page {
        if self.is_empty() {
            return Page::Closed;
        }
        self.open = true;
        self.current = index.min(self.len() - 1);
        Page::Showing(self.current)
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// `"n / total"` with a one-based position.
    #[must_use]
    pub fn counter(&self) -> String {
        format!("{} / {}", self.current + 1, self.len())
    }

    #[must_use]
    pub fn next_label(&self) -> &'static str {
        if self.is_last() { "Close »" } else { "Next »" }
    }
}
