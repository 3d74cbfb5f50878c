use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LeaderboardId, PlayerId};

/// Width of one rating histogram bucket.
pub const RATING_BUCKET_SIZE: i32 = 100;

/// A rating leaderboard (e.g. global, 1v1 ladder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub id: LeaderboardId,
    pub technical_name: String,
    pub name_key: String,
    pub description_key: String,
}

/// A player's rating on one leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub username: String,
    pub rating: f64,
    pub games_played: u32,
    pub win_loss_ratio: f32,
    pub leaderboard_technical_name: String,
}

/// Number of players whose rating falls into one histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingStat {
    /// Lower bound of the bucket, a multiple of [`RATING_BUCKET_SIZE`].
    pub rating: i32,
    pub total_count: u32,
    pub count_with_enough_games: u32,
}

impl RatingStat {
    /// Builds the rating distribution of a leaderboard, ordered by bucket.
    ///
    /// Players with at least `min_games` games are also counted in
    /// `count_with_enough_games`.
    pub fn histogram(entries: &[LeaderboardEntry], min_games: u32) -> Vec<RatingStat> {
        let mut buckets: BTreeMap<i32, RatingStat> = BTreeMap::new();

        for entry in entries {
            let rating = bucket_of(entry.rating);
            let stat = buckets.entry(rating).or_insert(RatingStat {
                rating,
                total_count: 0,
                count_with_enough_games: 0,
            });
            stat.total_count += 1;
            if entry.games_played >= min_games {
                stat.count_with_enough_games += 1;
            }
        }

        buckets.into_values().collect()
    }
}

fn bucket_of(rating: f64) -> i32 {
    let bucket = (rating / f64::from(RATING_BUCKET_SIZE)).floor() as i32;
    bucket * RATING_BUCKET_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: f64, games_played: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            player_id: PlayerId::new(1),
            username: "player".to_string(),
            rating,
            games_played,
            win_loss_ratio: 50.0,
            leaderboard_technical_name: "global".to_string(),
        }
    }

    #[test]
    fn histogram_groups_by_hundreds() {
        let entries = vec![entry(1012.0, 20), entry(1099.9, 3), entry(1500.0, 50)];

        let stats = RatingStat::histogram(&entries, 10);

        assert_eq!(
            stats,
            vec![
                RatingStat {
                    rating: 1000,
                    total_count: 2,
                    count_with_enough_games: 1
                },
                RatingStat {
                    rating: 1500,
                    total_count: 1,
                    count_with_enough_games: 1
                },
            ]
        );
    }

    #[test]
    fn negative_ratings_round_down() {
        let stats = RatingStat::histogram(&[entry(-30.0, 0)], 10);
        assert_eq!(stats[0].rating, -100);
        assert_eq!(stats[0].count_with_enough_games, 0);
    }

    #[test]
    fn empty_leaderboard_has_no_buckets() {
        assert!(RatingStat::histogram(&[], 10).is_empty());
    }
}
