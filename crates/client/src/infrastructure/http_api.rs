//! Lobby API client (JSON:API over HTTP)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use lobby_domain::{DivisionId, PlayerId};
use lobby_shared::jsonapi::{self, ApiResource};
use lobby_shared::{
    LeaderboardDto, LeaderboardRatingDto, LeagueDto, LeagueSeasonScoreDto, NewsPostDto,
    ReviewAttributes, ReviewDto, ReviewKind, SubdivisionDto,
};

use crate::application::{MappingError, ServiceError, TransportError};
use crate::ports::outbound::ApiAccessor;

const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Longest error body we keep from a failed response.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for the lobby's JSON:API endpoints under `/data`.
#[derive(Clone)]
pub struct HttpApiAccessor {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpApiAccessor {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/data/{}", self.base_url, path))
            .header(ACCEPT, JSON_API_MEDIA_TYPE)
    }

    async fn get_document(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ServiceError> {
        tracing::debug!(path = %path, ?query, "GET lobby API");
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| self.transport_error(e))
    }

    /// Send a request document; returns the response document if there is one.
    async fn send_document(
        &self,
        method: Method,
        path: &str,
        document: Option<Value>,
    ) -> Result<Option<Value>, ServiceError> {
        tracing::debug!(method = %method, path = %path, "Sending to lobby API");
        let mut request = self.request(method, path);
        if let Some(document) = document {
            request = request
                .header(CONTENT_TYPE, JSON_API_MEDIA_TYPE)
                .body(document.to_string());
        }
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&body).map(Some).map_err(|e| {
            MappingError {
                entity: "document".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn get_many<T: ApiResource>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ServiceError> {
        let document = self.get_document(path, query).await?;
        Ok(jsonapi::decode_many(&document)?)
    }

    fn transport_error(&self, error: reqwest::Error) -> ServiceError {
        let transport = if error.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else if error.is_connect() {
            TransportError::Connection(error.to_string())
        } else if error.is_decode() {
            return MappingError {
                entity: "document".to_string(),
                reason: error.to_string(),
            }
            .into();
        } else {
            TransportError::Protocol(error.to_string())
        };
        tracing::error!(error = %error, "Lobby API request failed");
        transport.into()
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    tracing::error!(status = status.as_u16(), "Lobby API returned an error status");
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    }
    .into())
}

fn page_query(count: u32, page: u32) -> [(&'static str, String); 3] {
    [
        ("page[size]", count.to_string()),
        ("page[number]", page.to_string()),
        ("page[totals]", String::new()),
    ]
}

#[async_trait]
impl ApiAccessor for HttpApiAccessor {
    async fn get_news(&self) -> Result<Vec<NewsPostDto>, ServiceError> {
        self.get_many("newsPost", &[("sort", "-postedAt".to_string())])
            .await
    }

    async fn get_leaderboards(&self) -> Result<Vec<LeaderboardDto>, ServiceError> {
        self.get_many("leaderboard", &[]).await
    }

    async fn get_leaderboard_ratings(
        &self,
        leaderboard_technical_name: &str,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError> {
        self.get_many(
            "leaderboardRating",
            &[
                (
                    "filter",
                    format!(
                        "leaderboard.technicalName=={}",
                        rsql_quote(leaderboard_technical_name)
                    ),
                ),
                ("include", "player,leaderboard".to_string()),
                ("sort", "-rating".to_string()),
            ],
        )
        .await
    }

    async fn get_leaderboard_ratings_for_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError> {
        self.get_many(
            "leaderboardRating",
            &[
                ("filter", format!("player.id=={}", player_id)),
                ("include", "player,leaderboard".to_string()),
            ],
        )
        .await
    }

    async fn get_leaderboard_ratings_page(
        &self,
        leaderboard_technical_name: &str,
        count: u32,
        page: u32,
    ) -> Result<(Vec<LeaderboardRatingDto>, u32), ServiceError> {
        let mut query = vec![
            (
                "filter",
                format!(
                    "leaderboard.technicalName=={}",
                    rsql_quote(leaderboard_technical_name)
                ),
            ),
            ("include", "player,leaderboard".to_string()),
            ("sort", "-rating".to_string()),
        ];
        query.extend(page_query(count, page));

        let document = self.get_document("leaderboardRating", &query).await?;
        let ratings = jsonapi::decode_many(&document)?;
        Ok((ratings, jsonapi::total_pages(&document).unwrap_or(1)))
    }

    async fn get_leagues(&self) -> Result<Vec<LeagueDto>, ServiceError> {
        self.get_many("league", &[]).await
    }

    async fn get_subdivisions(
        &self,
        league_technical_name: &str,
    ) -> Result<Vec<SubdivisionDto>, ServiceError> {
        self.get_many(
            "subdivision",
            &[
                (
                    "filter",
                    format!("league.technicalName=={}", rsql_quote(league_technical_name)),
                ),
                ("include", "league".to_string()),
                ("sort", "index".to_string()),
            ],
        )
        .await
    }

    async fn get_league_season_scores(
        &self,
        subdivision_id: &DivisionId,
    ) -> Result<Vec<LeagueSeasonScoreDto>, ServiceError> {
        self.get_many(
            "leagueSeasonScore",
            &[
                ("filter", format!("subdivision.id=={}", subdivision_id)),
                ("include", "player,subdivision".to_string()),
                ("sort", "-score".to_string()),
            ],
        )
        .await
    }

    async fn get_league_season_score_for_player(
        &self,
        player_id: PlayerId,
        league_technical_name: &str,
    ) -> Result<Option<LeagueSeasonScoreDto>, ServiceError> {
        let scores: Vec<LeagueSeasonScoreDto> = self
            .get_many(
                "leagueSeasonScore",
                &[
                    (
                        "filter",
                        format!(
                            "player.id=={};subdivision.league.technicalName=={}",
                            player_id,
                            rsql_quote(league_technical_name)
                        ),
                    ),
                    ("include", "player,subdivision".to_string()),
                ],
            )
            .await?;
        Ok(scores.into_iter().next())
    }

    async fn create_review(
        &self,
        kind: ReviewKind,
        subject_id: &str,
        review: &ReviewDto,
    ) -> Result<ReviewDto, ServiceError> {
        let reviewer_id = review
            .reviewer
            .as_ref()
            .map(|reviewer| reviewer.id.clone())
            .ok_or_else(|| ServiceError::validation("A new review needs a reviewer"))?;
        let (subject_name, subject_type) = kind.subject_relationship();
        let document = jsonapi::encode(
            kind.resource_type(),
            None,
            &attributes(review),
            &[
                (subject_name, subject_type, subject_id),
                ("player", "player", reviewer_id.as_str()),
            ],
        )?;

        let response = self
            .send_document(Method::POST, kind.path_segment(), Some(document))
            .await?
            .ok_or_else(|| MappingError::missing(kind.resource_type(), "data"))?;
        let mut created: ReviewDto = jsonapi::decode_one_as(&response, kind.resource_type())?
            .ok_or_else(|| MappingError::missing(kind.resource_type(), "data"))?;
        // The reviewer is rarely included in the response.
        if created.reviewer.as_ref().and_then(|r| r.login.as_ref()).is_none() {
            created.reviewer = review.reviewer.clone();
        }
        Ok(created)
    }

    async fn update_review(
        &self,
        kind: ReviewKind,
        review: &ReviewDto,
    ) -> Result<(), ServiceError> {
        let id = review
            .id
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Cannot update a review without an id"))?;
        let document = jsonapi::encode(kind.resource_type(), Some(id), &attributes(review), &[])?;
        self.send_document(
            Method::PATCH,
            &format!("{}/{}", kind.path_segment(), id),
            Some(document),
        )
        .await?;
        Ok(())
    }

    async fn delete_review(&self, kind: ReviewKind, review_id: &str) -> Result<(), ServiceError> {
        self.send_document(
            Method::DELETE,
            &format!("{}/{}", kind.path_segment(), review_id),
            None,
        )
        .await?;
        Ok(())
    }
}

/// Quote `value` as an RSQL string literal.
fn rsql_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn attributes(review: &ReviewDto) -> ReviewAttributes {
    ReviewAttributes {
        text: review.text.clone().unwrap_or_default(),
        score: review.score.unwrap_or_default(),
    }
}
