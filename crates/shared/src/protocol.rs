use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Page, Product};

/// Where the paged endpoint reports its total element count.
///
/// Two server revisions are in the wild: a flat `totalElements` next to
/// `content`, and a nested `page.totalElements` metadata object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageShape {
    #[default]
    Auto,
    Flat,
    Nested,
}

impl FromStr for PageShape {
    type Err = PageDecodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "flat" => Ok(Self::Flat),
            "nested" => Ok(Self::Nested),
            other => Err(PageDecodeError::UnknownShape(other.to_string())),
        }
    }
}

impl fmt::Display for PageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageShape::Auto => "auto",
            PageShape::Flat => "flat",
            PageShape::Nested => "nested",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageDecodeError {
    #[error("page response carries no {0} total element count")]
    MissingTotal(PageShape),
    #[error("unknown page shape '{0}', expected auto, flat or nested")]
    UnknownShape(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Body of `GET /paged`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    #[serde(default)]
    pub content: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMetadata>,
}

impl PageResponse {
    pub fn flat(content: Vec<Product>, total_elements: u64) -> Self {
        Self {
            content,
            total_elements: Some(total_elements),
            page: None,
        }
    }

    pub fn nested(content: Vec<Product>, page: PageMetadata) -> Self {
        Self {
            content,
            total_elements: None,
            page: Some(page),
        }
    }

    pub fn total_elements(&self, shape: PageShape) -> Result<u64, PageDecodeError> {
        let flat = self.total_elements;
        let nested = self.page.as_ref().map(|page| page.total_elements);
        let found = match shape {
            PageShape::Flat => flat,
            PageShape::Nested => nested,
            PageShape::Auto => flat.or(nested),
        };
        found.ok_or(PageDecodeError::MissingTotal(shape))
    }

    /// Binds the response to the page that was requested.
    pub fn into_page(
        self,
        page_index: u32,
        page_size: u32,
        shape: PageShape,
    ) -> Result<Page, PageDecodeError> {
        let total_elements = self.total_elements(shape)?;
        Ok(Page {
            content: self.content,
            page_index,
            page_size,
            total_elements,
        })
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
