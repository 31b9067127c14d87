// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects & IDs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtistId(pub u64);

impl From<u64> for ArtistId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseId(pub u64);

impl From<u64> for ReleaseId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based page number identifying one page of a result set.
pub type PageToken = u32;

/// First page of every paginated listing.
pub const FIRST_PAGE: PageToken = 1;

/// Returns true when a search query should not hit the catalog at all.
pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub per_page: u32,
    pub items: u32,
    pub page: PageToken,
    pub pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// One page of catalog results together with the server's pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// ============================================================================
// Enums
// ============================================================================

/// Sort selections offered for an artist's discography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
    FormatAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        Self::YearDesc,
        Self::YearAsc,
        Self::TitleAsc,
        Self::TitleDesc,
        Self::FormatAsc,
    ];

    /// Value of the `sort` query parameter.
    pub fn api_sort(&self) -> &'static str {
        match self {
            Self::YearDesc | Self::YearAsc => "year",
            Self::TitleAsc | Self::TitleDesc => "title",
            Self::FormatAsc => "format",
        }
    }

    /// Value of the `sort_order` query parameter.
    pub fn api_order(&self) -> &'static str {
        match self {
            Self::YearDesc | Self::TitleDesc => "desc",
            Self::YearAsc | Self::TitleAsc | Self::FormatAsc => "asc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::YearDesc => "Year (newest)",
            Self::YearAsc => "Year (oldest)",
            Self::TitleAsc => "Title (A-Z)",
            Self::TitleDesc => "Title (Z-A)",
            Self::FormatAsc => "Format",
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.api_sort(), self.api_order())
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.to_string() == value.trim().to_lowercase())
            .ok_or_else(|| format!("unknown sort option: {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiscographyFilter {
    pub sort_by: SortOption,
}

impl DiscographyFilter {
    pub fn new(sort_by: SortOption) -> Self {
        Self { sort_by }
    }
}

// ============================================================================
// Catalog Entities
// ============================================================================

/// An item that can be accumulated in a paginated list.
pub trait ListItem {
    /// Stable identity used to keep accumulated lists free of duplicates.
    fn item_id(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub image_url: Option<String>,
    pub resource_url: String,
    pub kind: String,
}

impl ListItem for Artist {
    fn item_id(&self) -> u64 {
        self.id.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub title: String,
    pub year: Option<i32>,
    pub kind: String,
    pub role: String,
    pub thumb: Option<String>,
}

impl ListItem for Release {
    fn item_id(&self) -> u64 {
        self.id.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: ArtistId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: ArtistId,
    pub name: String,
    pub profile: Option<String>,
    pub images: Option<Vec<Image>>,
    pub members: Option<Vec<Member>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub position: String,
    pub title: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub catno: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    pub id: ReleaseId,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    pub tracklist: Vec<Track>,
    pub images: Option<Vec<Image>>,
    pub labels: Vec<Label>,
}

// ============================================================================
// Load States
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Loading,
    NotLoading { end_of_pagination: bool },
    Error(String),
}

impl LoadState {
    pub const IDLE: LoadState = LoadState::NotLoading {
        end_of_pagination: false,
    };

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Load state of the initial/refresh fetch and of load-more fetches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub append: LoadState,
}

// ============================================================================
// Domain Events
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent<TPayload> {
    pub name: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub payload: TPayload,
}

impl<TPayload> DomainEvent<TPayload> {
    pub fn new(name: &'static str, payload: TPayload) -> Self {
        Self {
            name,
            occurred_at: Utc::now(),
            payload,
        }
    }
}
