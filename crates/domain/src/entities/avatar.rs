use serde::{Deserialize, Serialize};
use url::Url;

use crate::AvatarId;

/// An avatar a player can wear in the lobby.
///
/// `id` is absent for avatars that were never assigned by the server, such as
/// a placeholder shown while the list is loading. Those cannot be selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: Option<AvatarId>,
    pub url: Url,
    pub description: String,
}

impl Avatar {
    pub fn new(id: impl Into<Option<AvatarId>>, url: Url, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url,
            description: description.into(),
        }
    }
}
