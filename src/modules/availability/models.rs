use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Simplified loan status of the top catalog result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AvailabilityStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Checked Out")]
    CheckedOut,
    #[serde(rename = "Not Found")]
    NotFound,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::CheckedOut => "Checked Out",
            AvailabilityStatus::NotFound => "Not Found",
        }
    }

    /// Parse a wire label; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Available" => Some(AvailabilityStatus::Available),
            "Checked Out" => Some(AvailabilityStatus::CheckedOut),
            "Not Found" => Some(AvailabilityStatus::NotFound),
            _ => None,
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string accepted by the lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub book_title: Option<String>,
}

impl SearchQuery {
    /// Build from decoded query pairs.
    ///
    /// A repeated `bookTitle` is joined with commas, so
    /// `bookTitle=Emma&bookTitle=Dune` searches for `Emma,Dune`.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let values: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| key == "bookTitle")
            .map(|(_, value)| value.as_str())
            .collect();

        let book_title = match values.as_slice() {
            [] => None,
            [single] => Some(single.to_string()),
            many => Some(many.join(",")),
        };

        Self { book_title }
    }

    /// The title to search for, if one was supplied.
    pub fn title(&self) -> Option<&str> {
        self.book_title.as_deref().filter(|title| !title.is_empty())
    }
}

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub status: AvailabilityStatus,
    /// Catalog URL that was queried, for the user to follow manually
    pub search_url: String,
}

/// Endpoint response as seen by a consumer.
///
/// A non-empty `error` marks a failure; an empty one is ignored and the
/// body is read as a success.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSearchResponse")]
pub enum SearchResponse {
    Failure {
        error: String,
        details: Option<String>,
    },
    Success {
        status: String,
        search_url: String,
    },
}

#[derive(Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "searchUrl")]
    search_url: Option<String>,
}

impl TryFrom<RawSearchResponse> for SearchResponse {
    type Error = String;

    fn try_from(raw: RawSearchResponse) -> Result<Self, Self::Error> {
        match raw {
            RawSearchResponse {
                error: Some(error),
                details,
                ..
            } if !error.is_empty() => Ok(SearchResponse::Failure { error, details }),
            RawSearchResponse {
                status: Some(status),
                search_url: Some(search_url),
                ..
            } => Ok(SearchResponse::Success { status, search_url }),
            _ => Err("response carries neither an error nor a status and searchUrl".to_string()),
        }
    }
}
