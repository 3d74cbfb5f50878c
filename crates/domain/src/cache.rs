//! Named cache regions.
//!
//! An external cache manager keys stored UI assets and data by these names.
//! The set is closed: adding a region means adding a variant here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheName {
    Avatars,
    CountryFlags,
    MapPreview,
    UrlPreview,
    Statistics,
    AchievementImages,
    Achievements,
    Mods,
    Leaderboard,
    Maps,
    ThemeImages,
    ModThumbnail,
    CoopMaps,
    AvailableAvatars,
    News,
    RatingHistory,
    FeaturedMods,
    FeaturedModFiles,
    CoopLeaderboard,
    Clan,
    PlayerAchievements,
}

impl CacheName {
    pub const ALL: [CacheName; 21] = [
        Self::Avatars,
        Self::CountryFlags,
        Self::MapPreview,
        Self::UrlPreview,
        Self::Statistics,
        Self::AchievementImages,
        Self::Achievements,
        Self::Mods,
        Self::Leaderboard,
        Self::Maps,
        Self::ThemeImages,
        Self::ModThumbnail,
        Self::CoopMaps,
        Self::AvailableAvatars,
        Self::News,
        Self::RatingHistory,
        Self::FeaturedMods,
        Self::FeaturedModFiles,
        Self::CoopLeaderboard,
        Self::Clan,
        Self::PlayerAchievements,
    ];

    /// The configuration key of this region.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatars => "avatars",
            Self::CountryFlags => "countryFlags",
            Self::MapPreview => "mapPreview",
            Self::UrlPreview => "urlPreview",
            Self::Statistics => "statistics",
            Self::AchievementImages => "achievementImages",
            Self::Achievements => "achievements",
            Self::Mods => "mods",
            Self::Leaderboard => "leaderboard",
            Self::Maps => "maps",
            Self::ThemeImages => "themeImages",
            Self::ModThumbnail => "modThumbnail",
            Self::CoopMaps => "coopMaps",
            Self::AvailableAvatars => "availableAvatars",
            Self::News => "news",
            Self::RatingHistory => "ratingHistory",
            Self::FeaturedMods => "featuredMods",
            Self::FeaturedModFiles => "featuredModFiles",
            Self::CoopLeaderboard => "coopLeaderboard",
            Self::Clan => "clan",
            Self::PlayerAchievements => "playerAchievements",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown cache region: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_region_round_trips_through_its_key() {
        for name in CacheName::ALL {
            assert_eq!(name.as_str().parse::<CacheName>(), Ok(name));
        }
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = CacheName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(keys.len(), CacheName::ALL.len());
    }

    #[test]
    fn serde_uses_the_configuration_key() {
        let json = serde_json::to_string(&CacheName::PlayerAchievements).unwrap();
        assert_eq!(json, "\"playerAchievements\"");
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            "thumbnails".parse::<CacheName>(),
            Err(DomainError::Parse(_))
        ));
    }
}
