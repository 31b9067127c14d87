// SPDX-License-Identifier: GPL-3.0-or-later

//! Discogs JSON payloads and their mapping onto domain types.

use discotheque_domain::{
    Artist, ArtistDetail, ArtistId, Image, Label, Member, Paged, Pagination, Release,
    ReleaseDetail, ReleaseId, Track,
};
use serde::Deserialize;

/// Pagination block shared by search and release listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationResponse {
    pub per_page: u32,
    pub items: u32,
    pub page: u32,
    pub pages: u32,
}

impl From<PaginationResponse> for Pagination {
    fn from(value: PaginationResponse) -> Self {
        Pagination {
            per_page: value.per_page,
            items: value.items,
            page: value.page,
            pages: value.pages,
        }
    }
}

/// `GET /database/search?type=artist`
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub results: Vec<ArtistResult>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistResult {
    pub id: u64,
    pub title: String,
    pub thumb: Option<String>,
    pub cover_image: Option<String>,
    pub resource_url: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ArtistSearchResponse {
    pub fn into_domain(self) -> Paged<Artist> {
        Paged {
            items: self.results.into_iter().map(ArtistResult::into_domain).collect(),
            pagination: self.pagination.into(),
        }
    }
}

impl ArtistResult {
    pub fn into_domain(self) -> Artist {
        Artist {
            id: ArtistId(self.id),
            name: self.title,
            image_url: non_blank(self.thumb).or_else(|| non_blank(self.cover_image)),
            resource_url: self.resource_url,
            kind: self.kind,
        }
    }
}

/// `GET /artists/{id}/releases`
#[derive(Debug, Clone, Deserialize)]
pub struct ReleasesResponse {
    pub pagination: PaginationResponse,
    #[serde(default)]
    pub releases: Vec<ReleaseResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseResult {
    pub id: u64,
    pub title: String,
    pub year: Option<i32>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    pub thumb: Option<String>,
}

impl ReleasesResponse {
    pub fn into_domain(self) -> Paged<Release> {
        Paged {
            items: self.releases.into_iter().map(ReleaseResult::into_domain).collect(),
            pagination: self.pagination.into(),
        }
    }
}

impl ReleaseResult {
    pub fn into_domain(self) -> Release {
        Release {
            id: ReleaseId(self.id),
            title: self.title,
            year: known_year(self.year),
            kind: self.kind,
            role: self.role,
            thumb: non_blank(self.thumb),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberResponse {
    pub id: u64,
    pub name: String,
}

/// `GET /artists/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistDetailResponse {
    pub id: u64,
    pub name: String,
    pub profile: Option<String>,
    pub images: Option<Vec<ImageResponse>>,
    pub members: Option<Vec<MemberResponse>>,
}

impl ArtistDetailResponse {
    pub fn into_domain(self) -> ArtistDetail {
        ArtistDetail {
            id: ArtistId(self.id),
            name: self.name,
            profile: non_blank(self.profile),
            images: self.images.map(into_images),
            members: self.members.map(|members| {
                members
                    .into_iter()
                    .map(|member| Member {
                        id: ArtistId(member.id),
                        name: member.name,
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackResponse {
    pub position: String,
    pub title: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelResponse {
    pub name: String,
    pub catno: Option<String>,
}

/// `GET /releases/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDetailResponse {
    pub id: u64,
    pub title: String,
    pub year: Option<i32>,
    pub released: Option<String>,
    pub genres: Option<Vec<String>>,
    pub styles: Option<Vec<String>>,
    pub tracklist: Option<Vec<TrackResponse>>,
    pub images: Option<Vec<ImageResponse>>,
    pub labels: Option<Vec<LabelResponse>>,
}

impl ReleaseDetailResponse {
    pub fn into_domain(self) -> ReleaseDetail {
        let year = known_year(self.year).or_else(|| {
            self.released
                .as_deref()
                .and_then(|released| released.get(..4))
                .and_then(|prefix| prefix.parse().ok())
                .and_then(|year| known_year(Some(year)))
        });

        ReleaseDetail {
            id: ReleaseId(self.id),
            title: self.title,
            year,
            genres: self.genres.unwrap_or_default(),
            styles: self.styles.unwrap_or_default(),
            tracklist: self
                .tracklist
                .unwrap_or_default()
                .into_iter()
                .map(|track| Track {
                    position: track.position,
                    title: track.title,
                    duration: non_blank(track.duration),
                })
                .collect(),
            images: self.images.map(into_images),
            labels: self
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|label| Label {
                    name: label.name,
                    catno: non_blank(label.catno),
                })
                .collect(),
        }
    }
}

fn into_images(images: Vec<ImageResponse>) -> Vec<Image> {
    images
        .into_iter()
        .map(|image| Image { uri: image.uri })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

// Discogs reports an unknown year as 0.
fn known_year(year: Option<i32>) -> Option<i32> {
    year.filter(|year| *year > 0)
}
