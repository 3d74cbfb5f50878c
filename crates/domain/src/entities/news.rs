use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A news post shown on the lobby's landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub author: String,
    pub link: Option<Url>,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<NewsTag>,
}

/// Category a news post is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsTag {
    ServerUpdate,
    Tournament,
    GameUpdate,
    LobbyUpdate,
    Balance,
    Website,
    Ladder,
    Development,
    Uncategorized,
}

impl NewsTag {
    /// Coerces a server tag into a known category.
    ///
    /// Matching ignores case and separators; anything unrecognised is filed
    /// under [`NewsTag::Uncategorized`] rather than rejected.
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "server" | "serverupdate" => Self::ServerUpdate,
            "tournament" | "tournaments" => Self::Tournament,
            "fa" | "faupdate" | "gameupdate" => Self::GameUpdate,
            "lobby" | "lobbyupdate" | "client" => Self::LobbyUpdate,
            "balance" => Self::Balance,
            "website" => Self::Website,
            "ladder" | "matchmaker" => Self::Ladder,
            "development" | "developmentupdate" => Self::Development,
            _ => Self::Uncategorized,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ServerUpdate => "Server update",
            Self::Tournament => "Tournament",
            Self::GameUpdate => "Game update",
            Self::LobbyUpdate => "Lobby update",
            Self::Balance => "Balance",
            Self::Website => "Website",
            Self::Ladder => "Ladder",
            Self::Development => "Development",
            Self::Uncategorized => "Uncategorized",
        }
    }
}
