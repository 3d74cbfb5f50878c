//! Conversion between wire DTOs and domain values.
//!
//! Remote payloads are untrusted: every field the server may omit is
//! optional in the DTOs, and this is where we decide which absences are
//! tolerable (defaulted) and which make the payload unusable.

use lobby_domain::{
    Avatar, AvatarId, Division, DivisionId, GameId, GameLaunch, League, LeagueEntry, LeagueId,
    Leaderboard, LeaderboardEntry, LeaderboardId, NewsItem, NewsTag, PlayerId, PlayerRef, Review,
    ReviewId, SeasonId,
};
use lobby_shared::{
    AvatarData, GameLaunchData, LeaderboardDto, LeaderboardRatingDto, LeagueDto,
    LeagueSeasonScoreDto, NewsPostDto, PlayerDto, ReviewDto, SubdivisionDto,
};
use url::Url;

use super::error::MappingError;

/// Maps API and server payloads into domain values and back.
#[cfg_attr(test, mockall::automock)]
pub trait DtoMapper: Send + Sync {
    fn map_news_post(&self, dto: &NewsPostDto) -> Result<NewsItem, MappingError>;
    fn map_league(&self, dto: &LeagueDto) -> Result<League, MappingError>;
    fn map_leaderboard(&self, dto: &LeaderboardDto) -> Result<Leaderboard, MappingError>;
    fn map_leaderboard_rating(
        &self,
        dto: &LeaderboardRatingDto,
    ) -> Result<LeaderboardEntry, MappingError>;
    fn map_subdivision(&self, dto: &SubdivisionDto) -> Result<Division, MappingError>;
    fn map_league_season_score(
        &self,
        dto: &LeagueSeasonScoreDto,
    ) -> Result<LeagueEntry, MappingError>;
    fn map_review(&self, dto: &ReviewDto) -> Result<Review, MappingError>;
    fn map_avatar(&self, data: &AvatarData) -> Result<Avatar, MappingError>;
    fn map_game_launch(&self, data: &GameLaunchData) -> GameLaunch;

    /// Wire form of a locally authored review.
    fn to_review_dto(&self, review: &Review) -> ReviewDto;
}

/// The production mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiDtoMapper;

impl ApiDtoMapper {
    pub fn new() -> Self {
        Self
    }
}

impl DtoMapper for ApiDtoMapper {
    fn map_news_post(&self, dto: &NewsPostDto) -> Result<NewsItem, MappingError> {
        const ENTITY: &str = "NewsItem";
        let title = required(ENTITY, "title", dto.title.as_ref())?.clone();
        let date = *required(ENTITY, "postedAt", dto.posted_at.as_ref())?;
        let link = match dto.link.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(link) => Some(parse_url(ENTITY, "link", link)?),
        };
        let mut tags: Vec<NewsTag> = dto.tags.iter().map(|tag| NewsTag::from_tag(tag)).collect();
        if tags.is_empty() {
            tags.push(NewsTag::Uncategorized);
        }

        Ok(NewsItem {
            author: dto.author.clone().unwrap_or_default(),
            link,
            title,
            content: dto.content.clone().unwrap_or_default(),
            date,
            tags,
        })
    }

    fn map_league(&self, dto: &LeagueDto) -> Result<League, MappingError> {
        let technical_name = required("League", "technicalName", dto.technical_name.as_ref())?;
        Ok(League {
            id: LeagueId::new(dto.id.clone()),
            technical_name: technical_name.clone(),
            name_key: dto.name_key.clone().unwrap_or_default(),
            description_key: dto.description_key.clone().unwrap_or_default(),
            current_season_id: dto.current_season_id.clone().map(SeasonId::new),
            created_at: dto.create_time,
            updated_at: dto.update_time,
        })
    }

    fn map_leaderboard(&self, dto: &LeaderboardDto) -> Result<Leaderboard, MappingError> {
        const ENTITY: &str = "Leaderboard";
        Ok(Leaderboard {
            id: LeaderboardId::new(parse_int(ENTITY, "id", &dto.id)?),
            technical_name: required(ENTITY, "technicalName", dto.technical_name.as_ref())?
                .clone(),
            name_key: dto.name_key.clone().unwrap_or_default(),
            description_key: dto.description_key.clone().unwrap_or_default(),
        })
    }

    fn map_leaderboard_rating(
        &self,
        dto: &LeaderboardRatingDto,
    ) -> Result<LeaderboardEntry, MappingError> {
        const ENTITY: &str = "LeaderboardEntry";
        let player = required(ENTITY, "player", dto.player.as_ref())?;
        let player = map_player(ENTITY, player)?;
        // Conservative estimate when the server did not precompute it.
        let rating = match (dto.rating, dto.mean, dto.deviation) {
            (Some(rating), _, _) => rating,
            (None, Some(mean), Some(deviation)) => mean - 3.0 * deviation,
            _ => return Err(MappingError::missing(ENTITY, "rating")),
        };

        Ok(LeaderboardEntry {
            player_id: player.id,
            username: player.username,
            rating,
            games_played: dto.total_games.unwrap_or(0),
            win_loss_ratio: win_loss_ratio(dto.won_games, dto.total_games),
            leaderboard_technical_name: dto
                .leaderboard
                .as_ref()
                .and_then(|leaderboard| leaderboard.technical_name.clone())
                .unwrap_or_default(),
        })
    }

    fn map_subdivision(&self, dto: &SubdivisionDto) -> Result<Division, MappingError> {
        const ENTITY: &str = "Division";
        Ok(Division {
            id: DivisionId::new(dto.id.clone()),
            league_technical_name: dto
                .league
                .as_ref()
                .and_then(|league| league.technical_name.clone())
                .unwrap_or_default(),
            name_key: dto.name_key.clone().unwrap_or_default(),
            index: *required(ENTITY, "index", dto.index.as_ref())?,
            highest_score: dto.highest_score.unwrap_or(0),
            min_rating: dto.min_rating,
            max_rating: dto.max_rating,
        })
    }

    fn map_league_season_score(
        &self,
        dto: &LeagueSeasonScoreDto,
    ) -> Result<LeagueEntry, MappingError> {
        const ENTITY: &str = "LeagueEntry";
        let player = required(ENTITY, "player", dto.player.as_ref())?;
        let player = map_player(ENTITY, player)?;

        Ok(LeagueEntry {
            player_id: Some(player.id),
            username: player.username,
            score: dto.score.unwrap_or(0),
            games_played: dto.game_count.unwrap_or(0),
            win_loss_ratio: win_loss_ratio(dto.won_games, dto.game_count),
            division_id: dto
                .subdivision
                .as_ref()
                .map(|subdivision| DivisionId::new(subdivision.id.clone())),
        })
    }

    fn map_review(&self, dto: &ReviewDto) -> Result<Review, MappingError> {
        const ENTITY: &str = "Review";
        let score = *required(ENTITY, "score", dto.score.as_ref())?;
        let score = u8::try_from(score).map_err(|e| MappingError::invalid(ENTITY, "score", e))?;
        let reviewer = dto
            .reviewer
            .as_ref()
            .map(|reviewer| map_player(ENTITY, reviewer))
            .transpose()?;

        Ok(Review {
            id: dto.id.clone().map(ReviewId::new),
            text: dto.text.clone().unwrap_or_default(),
            score,
            reviewer,
        })
    }

    fn map_avatar(&self, data: &AvatarData) -> Result<Avatar, MappingError> {
        Ok(Avatar::new(
            data.id.map(AvatarId::new),
            parse_url("Avatar", "url", &data.url)?,
            data.tooltip.clone(),
        ))
    }

    fn map_game_launch(&self, data: &GameLaunchData) -> GameLaunch {
        GameLaunch {
            uid: GameId::new(data.uid),
            featured_mod: data.featured_mod.clone(),
            args: data.args.clone(),
        }
    }

    fn to_review_dto(&self, review: &Review) -> ReviewDto {
        ReviewDto {
            id: review.id.as_ref().map(|id| id.as_str().to_string()),
            text: Some(review.text.clone()),
            score: Some(i16::from(review.score)),
            reviewer: review.reviewer.as_ref().map(|reviewer| PlayerDto {
                id: reviewer.id.to_string(),
                login: Some(reviewer.username.clone()),
            }),
        }
    }
}

fn required<'a, T>(entity: &str, field: &str, value: Option<&'a T>) -> Result<&'a T, MappingError> {
    value.ok_or_else(|| MappingError::missing(entity, field))
}

fn parse_int(entity: &str, field: &str, value: &str) -> Result<i32, MappingError> {
    value
        .trim()
        .parse()
        .map_err(|e| MappingError::invalid(entity, field, e))
}

fn parse_url(entity: &str, field: &str, value: &str) -> Result<Url, MappingError> {
    Url::parse(value).map_err(|e| MappingError::invalid(entity, field, e))
}

fn map_player(entity: &str, dto: &PlayerDto) -> Result<PlayerRef, MappingError> {
    Ok(PlayerRef {
        id: PlayerId::new(parse_int(entity, "player.id", &dto.id)?),
        username: dto.login.clone().unwrap_or_default(),
    })
}

/// Percentage of games won, 0 when nothing was played.
fn win_loss_ratio(won: Option<u32>, total: Option<u32>) -> f32 {
    match (won, total) {
        (Some(won), Some(total)) if total > 0 => won as f32 / total as f32 * 100.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn player(id: &str, login: &str) -> PlayerDto {
        PlayerDto {
            id: id.to_string(),
            login: Some(login.to_string()),
        }
    }

    #[test]
    fn news_post_defaults_optional_fields() {
        let dto = NewsPostDto {
            id: "1".to_string(),
            title: Some("Patch 3750".to_string()),
            posted_at: Some(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()),
            tags: vec!["balance".to_string()],
            ..Default::default()
        };

        let item = ApiDtoMapper.map_news_post(&dto).unwrap();

        assert_eq!(item.title, "Patch 3750");
        assert_eq!(item.author, "");
        assert_eq!(item.link, None);
        assert_eq!(item.tags, vec![NewsTag::Balance]);
    }

    #[test]
    fn news_post_without_tags_is_uncategorized() {
        let dto = NewsPostDto {
            id: "1".to_string(),
            title: Some("Hello".to_string()),
            posted_at: Some(Utc::now()),
            ..Default::default()
        };

        let item = ApiDtoMapper.map_news_post(&dto).unwrap();

        assert_eq!(item.tags, vec![NewsTag::Uncategorized]);
    }

    #[test]
    fn news_post_with_bad_link_fails() {
        let dto = NewsPostDto {
            id: "1".to_string(),
            title: Some("Hello".to_string()),
            posted_at: Some(Utc::now()),
            link: Some("not a url".to_string()),
            ..Default::default()
        };

        let error = ApiDtoMapper.map_news_post(&dto).unwrap_err();

        assert_eq!(error.entity, "NewsItem");
        assert!(error.reason.contains("link"));
    }

    #[test]
    fn league_requires_technical_name() {
        let dto = LeagueDto {
            id: "1".to_string(),
            ..Default::default()
        };

        let error = ApiDtoMapper.map_league(&dto).unwrap_err();

        assert_eq!(error, MappingError::missing("League", "technicalName"));
    }

    #[test]
    fn leaderboard_id_must_be_numeric() {
        let dto = LeaderboardDto {
            id: "ladder".to_string(),
            technical_name: Some("ladder_1v1".to_string()),
            ..Default::default()
        };

        assert!(ApiDtoMapper.map_leaderboard(&dto).is_err());
    }

    #[test]
    fn rating_falls_back_to_conservative_estimate() {
        let dto = LeaderboardRatingDto {
            id: "10".to_string(),
            mean: Some(1600.0),
            deviation: Some(50.0),
            total_games: Some(40),
            won_games: Some(30),
            player: Some(player("5", "Alice")),
            leaderboard: Some(LeaderboardDto {
                id: "1".to_string(),
                technical_name: Some("ladder_1v1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let entry = ApiDtoMapper.map_leaderboard_rating(&dto).unwrap();

        assert_eq!(entry.player_id, PlayerId::new(5));
        assert_eq!(entry.username, "Alice");
        assert_eq!(entry.rating, 1450.0);
        assert_eq!(entry.games_played, 40);
        assert_eq!(entry.win_loss_ratio, 75.0);
        assert_eq!(entry.leaderboard_technical_name, "ladder_1v1");
    }

    #[test]
    fn rating_without_player_fails() {
        let dto = LeaderboardRatingDto {
            id: "10".to_string(),
            rating: Some(1500.0),
            ..Default::default()
        };

        let error = ApiDtoMapper.map_leaderboard_rating(&dto).unwrap_err();

        assert_eq!(error, MappingError::missing("LeaderboardEntry", "player"));
    }

    #[test]
    fn season_score_without_games_has_zero_ratio() {
        let dto = LeagueSeasonScoreDto {
            id: "1".to_string(),
            score: Some(12),
            player: Some(player("7", "Bob")),
            subdivision: Some(SubdivisionDto {
                id: "3".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let entry = ApiDtoMapper.map_league_season_score(&dto).unwrap();

        assert_eq!(entry.score, 12);
        assert_eq!(entry.games_played, 0);
        assert_eq!(entry.win_loss_ratio, 0.0);
        assert_eq!(entry.division_id, Some(DivisionId::new("3")));
    }

    #[test]
    fn subdivision_takes_league_name_from_relationship() {
        let dto = SubdivisionDto {
            id: "3".to_string(),
            index: Some(2),
            league: Some(LeagueDto {
                id: "1".to_string(),
                technical_name: Some("ladder1v1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let division = ApiDtoMapper.map_subdivision(&dto).unwrap();

        assert_eq!(division.league_technical_name, "ladder1v1");
        assert_eq!(division.index, 2);
        assert_eq!(division.highest_score, 0);
    }

    #[test]
    fn review_keeps_server_assigned_id_and_reviewer() {
        let dto = ReviewDto {
            id: Some("1".to_string()),
            text: Some("something".to_string()),
            score: Some(1),
            reviewer: Some(player("1", "junit")),
        };

        let review = ApiDtoMapper.map_review(&dto).unwrap();

        assert_eq!(review.id, Some(ReviewId::new("1")));
        assert_eq!(review.score, 1);
        assert_eq!(review.reviewer, Some(PlayerRef::new(1, "junit")));
    }

    #[test]
    fn review_with_negative_score_fails() {
        let dto = ReviewDto {
            score: Some(-1),
            ..Default::default()
        };

        assert!(ApiDtoMapper.map_review(&dto).is_err());
    }

    #[test]
    fn review_round_trips_through_dto() {
        let review = Review::new("gg", 4)
            .with_id("9")
            .with_reviewer(PlayerRef::new(3, "carol"));

        let dto = ApiDtoMapper.to_review_dto(&review);

        assert_eq!(ApiDtoMapper.map_review(&dto).unwrap(), review);
    }

    #[test]
    fn avatar_requires_valid_url() {
        let data = AvatarData {
            id: Some(1),
            url: "http://example.com/avatar.png".to_string(),
            tooltip: "Test".to_string(),
        };

        let avatar = ApiDtoMapper.map_avatar(&data).unwrap();

        assert_eq!(avatar.id, Some(AvatarId::new(1)));
        assert_eq!(avatar.description, "Test");

        let broken = AvatarData {
            url: "::".to_string(),
            ..data
        };
        assert!(ApiDtoMapper.map_avatar(&broken).is_err());
    }
}
