//! Lobby server messages.
//!
//! The lobby server speaks JSON objects tagged by `command`. Most client
//! messages are fire-and-forget; the ones that expect an answer name the
//! `command` of the reply via [`ClientMessage::expected_reply`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Client Messages (Client → Lobby server)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Avatar management
    Avatar {
        action: AvatarAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_id: Option<i32>,
    },
    /// Open a new custom game
    GameHost {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(rename = "mod")]
        featured_mod: String,
        mapname: String,
        visibility: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating_min: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating_max: Option<i32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarAction {
    ListAvatar,
    Select,
}

impl ClientMessage {
    /// The `command` of the server message answering this one, if any.
    pub fn expected_reply(&self) -> Option<&'static str> {
        match self {
            Self::Avatar {
                action: AvatarAction::ListAvatar,
                ..
            } => Some(ServerMessage::AVATAR),
            Self::Avatar {
                action: AvatarAction::Select,
                ..
            } => None,
            Self::GameHost { .. } => Some(ServerMessage::GAME_LAUNCH),
        }
    }
}

// =============================================================================
// Server Messages (Lobby server → Client)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Avatars the current player may wear
    Avatar {
        #[serde(default)]
        avatarlist: Vec<AvatarData>,
    },
    /// The server accepted a host request; the game process can be started
    GameLaunch(GameLaunchData),
    /// Informational or error notice
    Notice { style: String, text: String },
    /// Commands this client does not handle.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub const AVATAR: &'static str = "avatar";
    pub const GAME_LAUNCH: &'static str = "game_launch";
    pub const NOTICE: &'static str = "notice";

    /// The `command` tag of this message, `None` for unknown commands.
    pub fn command(&self) -> Option<&'static str> {
        match self {
            Self::Avatar { .. } => Some(Self::AVATAR),
            Self::GameLaunch(_) => Some(Self::GAME_LAUNCH),
            Self::Notice { .. } => Some(Self::NOTICE),
            Self::Unknown => None,
        }
    }

    /// True for notices the server sends when it rejects a request.
    pub fn is_error_notice(&self) -> bool {
        matches!(self, Self::Notice { style, .. } if style == "error")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarData {
    #[serde(default)]
    pub id: Option<i32>,
    pub url: String,
    #[serde(default)]
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLaunchData {
    pub uid: i32,
    #[serde(rename = "mod")]
    pub featured_mod: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_avatar_is_tagged_by_command() {
        let message = ClientMessage::Avatar {
            action: AvatarAction::Select,
            avatar_id: Some(1),
        };

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({ "command": "avatar", "action": "select", "avatar_id": 1 })
        );
        assert_eq!(message.expected_reply(), None);
    }

    #[test]
    fn game_host_uses_mod_key() {
        let message = ClientMessage::GameHost {
            title: "1v1".to_string(),
            password: None,
            featured_mod: "faf".to_string(),
            mapname: "setons".to_string(),
            visibility: "public".to_string(),
            rating_min: Some(800),
            rating_max: None,
        };

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["command"], "game_host");
        assert_eq!(value["mod"], "faf");
        assert!(value.get("password").is_none());
        assert_eq!(message.expected_reply(), Some("game_launch"));
    }

    #[test]
    fn parses_game_launch() {
        let message: ServerMessage = serde_json::from_value(json!({
            "command": "game_launch", "uid": 99, "mod": "faf", "args": ["/numgames", "3"]
        }))
        .unwrap();

        assert_eq!(message.command(), Some("game_launch"));
        assert_eq!(
            message,
            ServerMessage::GameLaunch(GameLaunchData {
                uid: 99,
                featured_mod: "faf".to_string(),
                args: vec!["/numgames".to_string(), "3".to_string()],
            })
        );
    }

    #[test]
    fn unknown_commands_do_not_fail_parsing() {
        let message: ServerMessage =
            serde_json::from_value(json!({ "command": "social", "friends": [] })).unwrap();
        assert_eq!(message, ServerMessage::Unknown);
        assert_eq!(message.command(), None);
    }

    #[test]
    fn keep_alive_replies_are_not_handled() {
        let message: ServerMessage =
            serde_json::from_value(json!({ "command": "pong" })).unwrap();
        assert_eq!(message, ServerMessage::Unknown);
        assert!(serde_json::from_value::<ClientMessage>(json!({ "command": "ping" })).is_err());
    }

    #[test]
    fn detects_error_notices() {
        let message: ServerMessage = serde_json::from_value(json!({
            "command": "notice", "style": "error", "text": "Map not found"
        }))
        .unwrap();
        assert!(message.is_error_notice());
    }
}
