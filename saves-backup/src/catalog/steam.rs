//! Steam saves: owned games from the Steam Web API, matched against the
//! `userdata/<account>/<appid>` directories present on this machine.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::{Catalog, CatalogEntry};
use crate::fs::guard::source_exists;
use crate::fs::walker::list_directory;
use crate::utils::errors::{BackupError, Result};

pub const DEFAULT_API_URL: &str = "https://api.steampowered.com";

const OWNED_GAMES_PATH: &str = "/IPlayerService/GetOwnedGames/v1/";

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    response: OwnedGamesResponse,
}

/// `response` object of `GetOwnedGames`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnedGamesResponse {
    #[serde(default)]
    pub game_count: u32,

    /// Absent when the profile is private
    #[serde(default)]
    pub games: Vec<OwnedGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGame {
    pub appid: u32,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub playtime_forever: u64,
}

/// Parse a `GetOwnedGames` body.
pub fn parse_owned_games(body: &[u8]) -> Result<OwnedGamesResponse> {
    let envelope: OwnedGamesEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.response)
}

/// Minimal Steam Web API client
pub struct SteamClient {
    http: reqwest::Client,
    base_url: String,
}

impl SteamClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the owned-games list (with app names) for `steam_id`.
    pub async fn owned_games(&self, api_key: &str, steam_id: &str) -> Result<OwnedGamesResponse> {
        let url = format!("{}{}", self.base_url, OWNED_GAMES_PATH);
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("key", api_key),
                ("steamid", steam_id),
                ("include_appinfo", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackupError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let owned = parse_owned_games(&body)?;
        tracing::info!("Steam reports {} owned games", owned.game_count);
        Ok(owned)
    }
}

/// Owned games that also have a save directory under `saves_dir`
#[derive(Debug, Clone)]
pub struct SteamCatalog {
    saves_dir: PathBuf,
    names: HashMap<u32, String>,
}

impl SteamCatalog {
    pub fn new(saves_dir: impl Into<PathBuf>, owned: OwnedGamesResponse) -> Self {
        let names = owned
            .games
            .into_iter()
            .map(|g| {
                let name = g.name.unwrap_or_else(|| g.appid.to_string());
                (g.appid, name)
            })
            .collect();

        Self {
            saves_dir: saves_dir.into(),
            names,
        }
    }
}

impl Catalog for SteamCatalog {
    fn name(&self) -> &str {
        "Steam"
    }

    /// Walks the local userdata directory, in name order, and keeps the
    /// app ids Steam says are owned. Unknown ids (tools, removed games)
    /// are skipped.
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        source_exists(&self.saves_dir)?;

        let listing = list_directory(&self.saves_dir).map_err(|e| BackupError::Listing {
            path: self.saves_dir.clone(),
            source: e,
        })?;

        let entries = listing
            .subdirs
            .into_iter()
            .filter_map(|dir| {
                let appid: u32 = dir.name.to_str()?.parse().ok()?;
                let name = self.names.get(&appid)?;
                Some(CatalogEntry::new(name.clone(), dir.path))
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "response": {
            "game_count": 3,
            "games": [
                { "appid": 620, "name": "Portal 2", "playtime_forever": 1200, "img_icon_url": "abc" },
                { "appid": 546560, "name": "Half-Life: Alyx", "playtime_forever": 0 },
                { "appid": 70, "name": "Half-Life", "playtime_forever": 30 }
            ]
        }
    }"#;

    #[test]
    fn test_parse_owned_games() {
        let owned = parse_owned_games(SAMPLE.as_bytes()).unwrap();
        assert_eq!(owned.game_count, 3);
        assert_eq!(owned.games.len(), 3);
        assert_eq!(owned.games[0].name.as_deref(), Some("Portal 2"));
    }

    #[test]
    fn test_parse_private_profile() {
        let owned = parse_owned_games(br#"{ "response": {} }"#).unwrap();
        assert_eq!(owned.game_count, 0);
        assert!(owned.games.is_empty());
    }

    #[test]
    fn test_entries_only_for_owned_local_directories() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let userdata = temp_dir.path();
        fs::create_dir(userdata.join("620"))?;
        fs::create_dir(userdata.join("546560"))?;
        fs::create_dir(userdata.join("7"))?; // Steam client settings, not owned
        fs::create_dir(userdata.join("config"))?;
        fs::write(userdata.join("70"), b"file, not a directory")?;

        let owned = parse_owned_games(SAMPLE.as_bytes()).unwrap();
        let catalog = SteamCatalog::new(userdata, owned);
        let entries = catalog.entries().unwrap();

        assert_eq!(
            entries,
            vec![
                CatalogEntry::new("Half-Life: Alyx", userdata.join("546560")),
                CatalogEntry::new("Portal 2", userdata.join("620")),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_missing_userdata_is_source_not_found() {
        let catalog = SteamCatalog::new("/nonexistent_userdata_12345", OwnedGamesResponse::default());
        let err = catalog.entries().unwrap_err();
        assert_eq!(err.kind(), crate::utils::errors::ErrorKind::SourceNotFound);
    }

    /// Serve exactly one HTTP response on a local port, returning the
    /// base URL and a handle yielding the raw request line.
    fn serve_once(status: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();

            let request = String::from_utf8_lossy(&request).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_owned_games_request() {
        let (base_url, server) = serve_once("200 OK", SAMPLE);

        let client = SteamClient::new(format!("{}/", base_url)).unwrap();
        let owned = client.owned_games("KEY123", "7656119").await.unwrap();
        assert_eq!(owned.games.len(), 3);

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /IPlayerService/GetOwnedGames/v1/?"));
        assert!(request_line.contains("key=KEY123"));
        assert!(request_line.contains("steamid=7656119"));
        assert!(request_line.contains("include_appinfo=1"));
    }

    #[tokio::test]
    async fn test_owned_games_http_error() {
        let (base_url, server) = serve_once("403 Forbidden", "bad key");

        let client = SteamClient::new(base_url).unwrap();
        let err = client.owned_games("nope", "1").await.unwrap_err();
        server.join().unwrap();

        match err {
            BackupError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
