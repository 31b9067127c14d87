// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{bail, Result};
use clap::Subcommand;
use discotheque_application::{
    AppState, ArtistSearchIntent, DetailEvent, DetailIntent, DiscographyIntent,
};
use discotheque_domain::{
    Artist, ArtistDetail, ArtistId, DiscographyFilter, LoadState, Release, ReleaseDetail,
    ReleaseId, SortOption,
};
use discotheque_paging::{LoadOutcome, PagingSnapshot};
use std::future::Future;
use std::io::Write;
use tokio::sync::watch;
use tracing::debug;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Search artists by name
    ///
    /// Usage examples:
    /// # First page of matches
    /// discotheque search "Radiohead"
    ///
    /// # First three pages
    /// discotheque search "Aphex Twin" --pages 3
    Search {
        /// Free-text query
        query: String,

        /// Number of result pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Show an artist's profile and members
    Artist {
        /// Discogs artist id
        id: u64,
    },

    /// List an artist's releases
    ///
    /// Sort options: year-desc (default), year-asc, title-asc, title-desc, format-asc.
    Releases {
        /// Discogs artist id
        artist_id: u64,

        #[arg(long, default_value_t = SortOption::YearDesc)]
        sort: SortOption,

        /// Number of result pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Show a release with its tracklist
    Release {
        /// Discogs release id
        id: u64,
    },
}

pub async fn execute_command(command: Commands, state: &AppState, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Search { query, pages } => {
            let search = state.artist_search();
            search.on_intent(ArtistSearchIntent::Search(query));
            if search.is_search_empty() {
                bail!("search query is blank");
            }
            let mut artists = search.artists();
            let snapshot = collect_pages(&mut artists, pages, || search.load_more_and_wait()).await?;
            for artist in &snapshot.items {
                writeln!(out, "{}", format_artist(artist))?;
            }
            report_append_error(&snapshot, out)?;
        }
        Commands::Artist { id } => {
            let detail = state.artist_detail();
            detail.on_intent(DetailIntent::Load(ArtistId(id)));
            match detail.settled().await {
                DetailEvent::Success(artist) => write_artist_detail(&artist, out)?,
                DetailEvent::Error(message) => bail!("artist {id}: {message}"),
                DetailEvent::Loading => bail!("artist {id}: lookup did not finish"),
            }
        }
        Commands::Releases {
            artist_id,
            sort,
            pages,
        } => {
            let discography = state.discography();
            discography.on_intent(DiscographyIntent::ApplyFilter(
                ArtistId(artist_id),
                DiscographyFilter::new(sort),
            ));
            let mut releases = discography.releases();
            let snapshot = collect_pages(&mut releases, pages, || discography.load_more_and_wait()).await?;
            writeln!(out, "Sorted by {}", sort.display_name())?;
            for release in &snapshot.items {
                writeln!(out, "{}", format_release(release))?;
            }
            report_append_error(&snapshot, out)?;
        }
        Commands::Release { id } => {
            let detail = state.release_detail();
            detail.on_intent(DetailIntent::Load(ReleaseId(id)));
            match detail.settled().await {
                DetailEvent::Success(release) => write_release_detail(&release, out)?,
                DetailEvent::Error(message) => bail!("release {id}: {message}"),
                DetailEvent::Loading => bail!("release {id}: lookup did not finish"),
            }
        }
    }
    Ok(())
}

/// Waits for the first page, then keeps appending until `pages` pages are loaded or the list ends.
async fn collect_pages<T, F, Fut>(
    snapshots: &mut watch::Receiver<PagingSnapshot<T>>,
    pages: u32,
    load_more: F,
) -> Result<PagingSnapshot<T>>
where
    T: Clone,
    F: Fn() -> Fut,
    Fut: Future<Output = Option<LoadOutcome>>,
{
    let mut snapshot = snapshots
        .wait_for(|s| {
            let refresh = &s.load_states.refresh;
            // A list that has not loaded yet has no items, no next page and no end marker.
            refresh.is_error()
                || (!refresh.is_loading()
                    && (!s.is_empty()
                        || s.next_key.is_some()
                        || s.load_states.append == LoadState::NotLoading { end_of_pagination: true }))
        })
        .await?
        .clone();
    if let Some(message) = snapshot.load_states.refresh.error_message() {
        bail!("{message}");
    }

    for page in 2..=pages {
        if snapshot.next_key.is_none() {
            break;
        }
        debug!(target: "cli", page, "loading next page");
        let outcome = load_more().await;
        snapshot = snapshots.borrow_and_update().clone();
        if outcome != Some(LoadOutcome::Applied) {
            debug!(target: "cli", page, ?outcome, "stopped paging");
            break;
        }
    }
    Ok(snapshot)
}

fn report_append_error<T>(snapshot: &PagingSnapshot<T>, out: &mut impl Write) -> Result<()> {
    if let Some(message) = snapshot.load_states.append.error_message() {
        writeln!(out, "(stopped early: {message})")?;
    }
    Ok(())
}

pub fn format_artist(artist: &Artist) -> String {
    format!("{:>10}  {}", artist.id.0, artist.name)
}

pub fn format_release(release: &Release) -> String {
    let year = release
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "----".to_string());
    format!("{:>10}  {}  {} [{}]", release.id.0, year, release.title, release.kind)
}

fn write_artist_detail(artist: &ArtistDetail, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} ({})", artist.name, artist.id)?;
    if let Some(profile) = &artist.profile {
        writeln!(out, "\n{profile}")?;
    }
    if let Some(members) = artist.members.as_deref().filter(|members| !members.is_empty()) {
        writeln!(out, "\nMembers:")?;
        for member in members {
            writeln!(out, "  {}", member.name)?;
        }
    }
    Ok(())
}

fn write_release_detail(release: &ReleaseDetail, out: &mut impl Write) -> Result<()> {
    match release.year {
        Some(year) => writeln!(out, "{} ({year})", release.title)?,
        None => writeln!(out, "{}", release.title)?,
    }
    if !release.genres.is_empty() {
        writeln!(out, "Genres: {}", release.genres.join(", "))?;
    }
    if !release.styles.is_empty() {
        writeln!(out, "Styles: {}", release.styles.join(", "))?;
    }
    for label in &release.labels {
        match &label.catno {
            Some(catno) => writeln!(out, "Label: {} ({catno})", label.name)?,
            None => writeln!(out, "Label: {}", label.name)?,
        }
    }
    writeln!(out)?;
    for track in &release.tracklist {
        let duration = track.duration.as_deref().unwrap_or("");
        writeln!(out, "{:>4}  {:<40} {duration}", track.position, track.title)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use discotheque_application::InMemoryEventBus;
    use discotheque_config::AppConfig;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(server: &MockServer) -> AppState {
        let mut config = AppConfig::default();
        config.discogs.base_url = server.uri();
        let client = discotheque_application::build_catalog_client(&config.discogs).unwrap();
        AppState::with_parts(config, Arc::new(client), Arc::new(InMemoryEventBus::new()))
    }

    fn output(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn release_without_year_shows_placeholder() {
        let release = Release {
            id: ReleaseId(42),
            title: "Untitled".to_string(),
            year: None,
            kind: "release".to_string(),
            role: "Main".to_string(),
            thumb: None,
        };
        assert_eq!(format_release(&release), "        42  ----  Untitled [release]");
    }

    #[tokio::test]
    async fn search_prints_requested_pages() {
        let server = MockServer::start().await;
        for page in 1..=2u64 {
            Mock::given(method("GET"))
                .and(path("/database/search"))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "pagination": {"per_page": 1, "items": 3, "page": page, "pages": 3},
                    "results": [{
                        "id": page,
                        "title": format!("Artist {page}"),
                        "resource_url": format!("https://api.discogs.com/artists/{page}"),
                        "uri": format!("/artist/{page}"),
                        "type": "artist"
                    }]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let state = state_for(&server);
        let mut out = Vec::new();
        execute_command(
            Commands::Search {
                query: "Artist".to_string(),
                pages: 2,
            },
            &state,
            &mut out,
        )
        .await
        .unwrap();

        let printed = output(out);
        assert!(printed.contains("Artist 1"));
        assert!(printed.contains("Artist 2"));
        assert!(!printed.contains("Artist 3"));
    }

    #[tokio::test]
    async fn search_continues_past_empty_first_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": {"per_page": 1, "items": 1, "page": 1, "pages": 2},
                "results": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": {"per_page": 1, "items": 1, "page": 2, "pages": 2},
                "results": [{
                    "id": 2,
                    "title": "Artist 2",
                    "resource_url": "https://api.discogs.com/artists/2",
                    "uri": "/artist/2",
                    "type": "artist"
                }]
            })))
            .mount(&server)
            .await;

        let state = state_for(&server);
        for (pages, expected) in [(1, ""), (2, "         2  Artist 2\n")] {
            let mut out = Vec::new();
            tokio::time::timeout(
                std::time::Duration::from_secs(5),
                execute_command(
                    Commands::Search {
                        query: "x".to_string(),
                        pages,
                    },
                    &state,
                    &mut out,
                ),
            )
            .await
            .expect("search did not finish")
            .unwrap();
            assert_eq!(output(out), expected);
        }
    }

    #[tokio::test]
    async fn missing_artist_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artists/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Artist not found."
            })))
            .mount(&server)
            .await;

        let state = state_for(&server);
        let mut out = Vec::new();
        let error = execute_command(Commands::Artist { id: 9 }, &state, &mut out)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "artist 9: HTTP status 404 Not Found");
    }

    #[tokio::test]
    async fn blank_search_is_rejected_without_request() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        let mut out = Vec::new();

        let result = execute_command(
            Commands::Search {
                query: " ".to_string(),
                pages: 1,
            },
            &state,
            &mut out,
        )
        .await;
        assert!(result.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn release_detail_prints_tracklist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/83182"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 83182,
                "title": "OK Computer",
                "year": 1997,
                "genres": ["Rock"],
                "tracklist": [{"position": "1", "title": "Airbag", "duration": "4:44"}],
                "labels": [{"name": "Parlophone", "catno": "NODATA 02"}]
            })))
            .mount(&server)
            .await;

        let state = state_for(&server);
        let mut out = Vec::new();
        execute_command(Commands::Release { id: 83182 }, &state, &mut out)
            .await
            .unwrap();

        let printed = output(out);
        assert!(printed.starts_with("OK Computer (1997)"));
        assert!(printed.contains("Label: Parlophone (NODATA 02)"));
        assert!(printed.contains("Airbag"));
    }
}
