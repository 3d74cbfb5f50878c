//! Waiters for lobby server replies.
//!
//! The lobby server does not echo request ids. A reply is matched to the
//! oldest waiter registered for its `command`. A waiter whose request timed
//! out stays queued so its late reply is consumed by it and not by the next
//! request.

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

use lobby_shared::ServerMessage;

use crate::application::ServiceError;

pub type Reply = Result<ServerMessage, ServiceError>;

/// Identifies one registered waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterId(u64);

/// What became of a message handed to [`PendingReplies::resolve`].
#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// A live request received it.
    Delivered,
    /// It answered a request that was given up on; dropped.
    Abandoned(ServerMessage),
    /// No request was waiting for it.
    Unsolicited(ServerMessage),
}

struct Waiter {
    id: WaiterId,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
pub struct PendingReplies {
    next_id: u64,
    waiters: HashMap<&'static str, VecDeque<Waiter>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the next message tagged `command`.
    pub fn register(&mut self, command: &'static str) -> (WaiterId, oneshot::Receiver<Reply>) {
        let id = WaiterId(self.next_id);
        self.next_id += 1;
        let (reply, rx) = oneshot::channel();
        self.waiters
            .entry(command)
            .or_default()
            .push_back(Waiter { id, reply });
        (id, rx)
    }

    /// Remove a waiter whose request never reached the server.
    pub fn forget(&mut self, command: &'static str, id: WaiterId) {
        if let Some(queue) = self.waiters.get_mut(command) {
            queue.retain(|waiter| waiter.id != id);
        }
    }

    /// Hand `message` to the oldest waiter for its command.
    pub fn resolve(&mut self, message: ServerMessage) -> Resolution {
        let Some(command) = message.command() else {
            return Resolution::Unsolicited(message);
        };
        let Some(waiter) = self
            .waiters
            .get_mut(command)
            .and_then(|queue| queue.pop_front())
        else {
            return Resolution::Unsolicited(message);
        };

        match waiter.reply.send(Ok(message)) {
            Ok(()) => Resolution::Delivered,
            Err(Ok(returned)) => Resolution::Abandoned(returned),
            Err(Err(_)) => Resolution::Delivered,
        }
    }

    /// Fail every waiter with `error`. Returns how many were still waiting.
    pub fn fail_all(&mut self, error: ServiceError) -> usize {
        let mut failed = 0;
        for (_, queue) in self.waiters.drain() {
            for waiter in queue {
                if waiter.reply.send(Err(error.clone())).is_ok() {
                    failed += 1;
                }
            }
        }
        failed
    }

    /// Number of waiters whose receiver is still alive.
    pub fn len(&self) -> usize {
        self.waiters
            .values()
            .flatten()
            .filter(|waiter| !waiter.reply.is_closed())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::TransportError;
    use lobby_shared::AvatarData;

    fn avatars(tooltip: &str) -> ServerMessage {
        ServerMessage::Avatar {
            avatarlist: vec![AvatarData {
                id: Some(1),
                url: "http://example.com/a.png".to_string(),
                tooltip: tooltip.to_string(),
            }],
        }
    }

    #[test]
    fn replies_go_to_waiters_in_registration_order() {
        let mut pending = PendingReplies::new();
        let (_, mut first) = pending.register(ServerMessage::AVATAR);
        let (_, mut second) = pending.register(ServerMessage::AVATAR);

        assert_eq!(pending.resolve(avatars("first")), Resolution::Delivered);

        assert_eq!(first.try_recv().unwrap().unwrap(), avatars("first"));
        assert!(second.try_recv().is_err());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn late_reply_to_abandoned_request_is_dropped() {
        let mut pending = PendingReplies::new();
        let (_, timed_out) = pending.register(ServerMessage::AVATAR);
        let (_, mut live) = pending.register(ServerMessage::AVATAR);
        drop(timed_out);

        let resolution = pending.resolve(avatars("stale"));

        assert_eq!(resolution, Resolution::Abandoned(avatars("stale")));
        assert!(live.try_recv().is_err());
        assert_eq!(pending.len(), 1);

        assert_eq!(pending.resolve(avatars("fresh")), Resolution::Delivered);
        assert_eq!(live.try_recv().unwrap().unwrap(), avatars("fresh"));
    }

    #[test]
    fn forgotten_waiter_does_not_consume_replies() {
        let mut pending = PendingReplies::new();
        let (undelivered, _) = pending.register(ServerMessage::AVATAR);
        let (_, mut live) = pending.register(ServerMessage::AVATAR);

        pending.forget(ServerMessage::AVATAR, undelivered);

        assert_eq!(pending.resolve(avatars("fresh")), Resolution::Delivered);
        assert_eq!(live.try_recv().unwrap().unwrap(), avatars("fresh"));
    }

    #[test]
    fn unmatched_message_is_given_back() {
        let mut pending = PendingReplies::new();
        let _waiter = pending.register(ServerMessage::GAME_LAUNCH);

        assert_eq!(
            pending.resolve(avatars("none")),
            Resolution::Unsolicited(avatars("none"))
        );
        assert_eq!(
            pending.resolve(ServerMessage::Unknown),
            Resolution::Unsolicited(ServerMessage::Unknown)
        );
    }

    #[test]
    fn fail_all_reaches_every_command() {
        let mut pending = PendingReplies::new();
        let (_, mut avatar_list) = pending.register(ServerMessage::AVATAR);
        let (_, mut launch) = pending.register(ServerMessage::GAME_LAUNCH);

        let failed = pending.fail_all(TransportError::NotConnected.into());

        assert_eq!(failed, 2);
        assert!(avatar_list.try_recv().unwrap().is_err());
        assert!(launch.try_recv().unwrap().is_err());
        assert!(pending.is_empty());
    }
}
