//! Port traits: the seams between the facade and the remote collaborators.

pub mod outbound;
