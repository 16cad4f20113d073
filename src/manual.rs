use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Labels of the editable fields, in form order
pub const FIELD_LABELS: [&str; 4] = ["Title", "Subject", "Author", "Publication Year"];

/// Index of the year field in `FIELD_LABELS`
pub const YEAR_FIELD: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Publication year must be an integer (got '{0}')")]
    InvalidYear(String),
}

/// A catalogue record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manual {
    pub title: String,
    pub subject: String,
    pub author: String,
    pub publication_year: i64,
}

impl Manual {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        author: impl Into<String>,
        publication_year: i64,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            author: author.into(),
            publication_year,
        }
    }

    /// Build a manual from raw form text. Only the year is checked.
    pub fn from_input(
        title: &str,
        subject: &str,
        author: &str,
        year: &str,
    ) -> Result<Self, InputError> {
        let publication_year = year
            .trim()
            .parse::<i64>()
            .map_err(|_| InputError::InvalidYear(year.to_string()))?;

        Ok(Self::new(title, subject, author, publication_year))
    }

    /// Build a manual from the four form buffers (see `FIELD_LABELS`)
    pub fn from_fields(fields: &[String; 4]) -> Result<Self, InputError> {
        Self::from_input(&fields[0], &fields[1], &fields[2], &fields[YEAR_FIELD])
    }

    /// Field values as form text, in `FIELD_LABELS` order
    pub fn to_fields(&self) -> [String; 4] {
        [
            self.title.clone(),
            self.subject.clone(),
            self.author.clone(),
            self.publication_year.to_string(),
        ]
    }

    /// One-line summary used by search results
    pub fn details(&self) -> String {
        format!(
            "{} ({}), Subject: {}, Author: {}",
            self.title, self.publication_year, self.subject, self.author
        )
    }
}
