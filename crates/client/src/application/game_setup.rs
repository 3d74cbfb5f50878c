//! Create-game form state.
//!
//! Holds what the create-game dialog edits: map search and selection,
//! featured mod, title, password and the allowed rating range. Rendering is
//! up to the UI; this type only enforces the rules and produces the
//! [`NewGameInfo`] sent with `LobbyService::host_game`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use lobby_domain::{DomainError, FeaturedMod, MapSummary, NewGameInfo, DEFAULT_FEATURED_MOD};

/// Choices remembered between create-game dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePreferences {
    pub last_game_title: Option<String>,
    pub last_map: Option<String>,
    pub last_game_type: Option<String>,
}

/// Keys the map search box forwards to the map list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    Up,
    Down,
}

/// A two-thumb rating slider bound to two text fields.
///
/// The slider thumbs never cross. Moving a thumb rewrites its text field
/// only while the thumbs are apart; editing a text field moves its thumb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRange {
    min: i32,
    max: i32,
    low: i32,
    high: i32,
    min_text: String,
    max_text: String,
}

impl RatingRange {
    pub fn new(min: i32, max: i32, selected_min: i32, selected_max: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let high = selected_max.clamp(min, max);
        let low = selected_min.clamp(min, high);
        Self {
            min,
            max,
            low,
            high,
            min_text: low.to_string(),
            max_text: high.to_string(),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn low(&self) -> i32 {
        self.low
    }

    pub fn high(&self) -> i32 {
        self.high
    }

    pub fn min_text(&self) -> &str {
        &self.min_text
    }

    pub fn max_text(&self) -> &str {
        &self.max_text
    }

    pub fn set_low(&mut self, value: i32) {
        self.low = value.clamp(self.min, self.high);
        if self.low < self.high {
            self.min_text = self.low.to_string();
        }
    }

    pub fn set_high(&mut self, value: i32) {
        self.high = value.clamp(self.low, self.max);
        if self.high > self.low {
            self.max_text = self.high.to_string();
        }
    }

    pub fn set_min_text(&mut self, text: &str) -> Result<(), DomainError> {
        let value = parse_rating(text)?;
        self.min_text = text.to_string();
        self.set_low(value);
        Ok(())
    }

    pub fn set_max_text(&mut self, text: &str) -> Result<(), DomainError> {
        let value = parse_rating(text)?;
        self.max_text = text.to_string();
        self.set_high(value);
        Ok(())
    }
}

fn parse_rating(text: &str) -> Result<i32, DomainError> {
    text.trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("'{}' is not a rating", text)))
}

/// State of the create-game dialog.
#[derive(Debug, Clone)]
pub struct CreateGameForm {
    maps: Vec<MapSummary>,
    filter: String,
    /// Indices into `maps` that match `filter`, in list order.
    visible: Vec<usize>,
    /// Index into `visible`.
    selected: Option<usize>,
    featured_mods: Vec<FeaturedMod>,
    selected_mod: Option<usize>,
    title: String,
    password: String,
    rating: RatingRange,
    preferences: GamePreferences,
}

impl CreateGameForm {
    /// A form over the locally installed `maps`, restored from `preferences`.
    pub fn new(maps: Vec<MapSummary>, rating: RatingRange, preferences: GamePreferences) -> Self {
        let visible = (0..maps.len()).collect();
        let mut form = Self {
            maps,
            filter: String::new(),
            visible,
            selected: None,
            featured_mods: Vec::new(),
            selected_mod: None,
            title: preferences.last_game_title.clone().unwrap_or_default(),
            password: String::new(),
            rating,
            preferences,
        };
        if let Some(last_map) = form.preferences.last_map.clone() {
            form.select_map_by_name(&last_map);
        }
        form
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.preferences.last_game_title = Some(self.title.clone());
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn rating(&self) -> &RatingRange {
        &self.rating
    }

    pub fn rating_mut(&mut self) -> &mut RatingRange {
        &mut self.rating
    }

    /// Preferences reflecting the current title and map.
    pub fn preferences(&self) -> &GamePreferences {
        &self.preferences
    }

    // -------------------------------------------------------------------------
    // Maps
    // -------------------------------------------------------------------------

    pub fn map_filter(&self) -> &str {
        &self.filter
    }

    /// Show maps whose name contains `filter`, ignoring case, and select the
    /// first match.
    pub fn set_map_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        let needle = filter.to_lowercase();
        self.visible = self
            .maps
            .iter()
            .enumerate()
            .filter(|(_, map)| needle.is_empty() || map.name.to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect();

        if self.visible.is_empty() {
            self.selected = None;
        } else {
            self.select_map(0);
        }
    }

    pub fn visible_maps(&self) -> Vec<&MapSummary> {
        self.visible.iter().map(|&index| &self.maps[index]).collect()
    }

    pub fn selected_map_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_map(&self) -> Option<&MapSummary> {
        self.selected
            .and_then(|position| self.visible.get(position))
            .map(|&index| &self.maps[index])
    }

    /// Select the visible map at `position`. Returns false if out of range.
    pub fn select_map(&mut self, position: usize) -> bool {
        let Some(&index) = self.visible.get(position) else {
            return false;
        };
        self.selected = Some(position);
        self.preferences.last_map = Some(self.maps[index].name.clone());
        true
    }

    pub fn select_map_by_name(&mut self, name: &str) -> bool {
        let position = self
            .visible
            .iter()
            .position(|&index| self.maps[index].name == name);
        match position {
            Some(position) => self.select_map(position),
            None => false,
        }
    }

    /// Move the selection within the visible maps; stops at either end.
    pub fn navigate(&mut self, key: NavigationKey) {
        match key {
            NavigationKey::Down => {
                let next = self.selected.map_or(0, |position| position + 1);
                if next < self.visible.len() {
                    self.select_map(next);
                }
            }
            NavigationKey::Up => {
                if let Some(position) = self.selected {
                    if position > 0 {
                        self.select_map(position - 1);
                    }
                }
            }
        }
    }

    pub fn select_random_map<R: Rng>(&mut self, rng: &mut R) -> Option<&MapSummary> {
        if self.visible.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..self.visible.len());
        self.select_map(position);
        self.selected_map()
    }

    // -------------------------------------------------------------------------
    // Featured mods
    // -------------------------------------------------------------------------

    /// Offer another featured mod and reselect the remembered one.
    pub fn add_featured_mod(&mut self, featured_mod: FeaturedMod) {
        self.featured_mods.push(featured_mod);
        let wanted = self
            .preferences
            .last_game_type
            .clone()
            .unwrap_or_else(|| DEFAULT_FEATURED_MOD.to_string());
        self.select_featured_mod(&wanted);
    }

    pub fn featured_mods(&self) -> &[FeaturedMod] {
        &self.featured_mods
    }

    pub fn selected_featured_mod(&self) -> Option<&FeaturedMod> {
        self.selected_mod.and_then(|index| self.featured_mods.get(index))
    }

    pub fn select_featured_mod(&mut self, technical_name: &str) -> bool {
        match self
            .featured_mods
            .iter()
            .position(|m| m.technical_name == technical_name)
        {
            Some(index) => {
                self.selected_mod = Some(index);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Submit
    // -------------------------------------------------------------------------

    pub fn build_new_game(&self) -> Result<NewGameInfo, DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Game title cannot be empty"));
        }
        let map = self
            .selected_map()
            .ok_or_else(|| DomainError::validation("No map selected"))?;
        let featured_mod = self
            .selected_featured_mod()
            .ok_or_else(|| DomainError::validation("No featured mod selected"))?;

        Ok(NewGameInfo {
            title: self.title.clone(),
            password: Some(self.password.clone()).filter(|password| !password.is_empty()),
            featured_mod: featured_mod.technical_name.clone(),
            map_name: map.name.clone(),
            min_rating: Some(self.rating.low()),
            max_rating: Some(self.rating.high()),
        })
    }
}
