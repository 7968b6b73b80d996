use tabled::Table;

use crate::{
    cli::{spinner, token::access_token},
    error, info,
    spotify::{self, SpotifyClient, playlists::MAX_PLAYLISTS_LIMIT},
    types::{PlaylistSummary, PlaylistTableRow},
    warning,
};

pub async fn list_playlists(search: Option<String>) {
    let client = SpotifyClient::from_env();
    let token = access_token(&client).await;

    let pb = spinner("Fetching playlists...");
    let mut playlists: Vec<PlaylistSummary> = Vec::new();
    let mut offset = 0;

    loop {
        let page = match spotify::playlists::get_user_playlists(
            &client,
            &token,
            offset,
            MAX_PLAYLISTS_LIMIT,
        )
        .await
        {
            Ok(page) => page,
            Err(e) => {
                pb.finish_and_clear();
                error!("Failed to fetch playlists. Err: {}", e);
            }
        };

        let fetched = page.items.len() as u32;
        playlists.extend(page.items);
        pb.set_message(format!("Fetched {} playlists...", playlists.len()));

        if page.next.is_none() || fetched == 0 {
            break;
        }
        offset += fetched;
    }
    pb.finish_and_clear();

    if let Some(query) = &search {
        playlists.retain(|p| spotify::playlists::matches_query(p, query));
    }

    if playlists.is_empty() {
        match search {
            Some(query) => warning!("No playlists match '{}'", query),
            None => warning!("No playlists found"),
        }
        return;
    }

    let table_rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            owner: p.owner_name().unwrap_or_default().to_string(),
            tracks: p
                .tracks
                .as_ref()
                .and_then(|t| t.total)
                .map(|total| total.to_string())
                .unwrap_or_default(),
            id: p.id,
            name: p.name,
        })
        .collect();

    let count = table_rows.len();
    println!("{}", Table::new(table_rows));
    info!("{} playlist(s)", count);
}
