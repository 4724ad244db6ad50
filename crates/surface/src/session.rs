use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::invite;

/// Serialized in-progress state, opaque to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot(pub String);

impl SessionSnapshot {
    pub fn new(blob: impl Into<String>) -> Self {
        SessionSnapshot(blob.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reference to a shared session, usually delivered through a deep link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteRef(pub String);

impl InviteRef {
    pub fn new(reference: impl Into<String>) -> Self {
        InviteRef(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conversation id encoded in the link, when it is a well-formed invite URL.
    pub fn conversation_id(&self) -> Option<u64> {
        invite::decode_invite_url(&self.0)
    }
}

/// Which source of initial state the engine should start from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UsePersisted(SessionSnapshot),
    UseInvite(InviteRef),
    UseNeither,
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::UsePersisted(_) => "persisted",
            Decision::UseInvite(_) => "invite",
            Decision::UseNeither => "neither",
        }
    }

    /// The single command that seeds the engine, if any.
    pub fn into_command(self) -> Option<Command> {
        match self {
            Decision::UsePersisted(snapshot) => Some(Command::SetSessionState(snapshot)),
            Decision::UseInvite(invite) => Some(Command::SetInviteReference(invite)),
            Decision::UseNeither => None,
        }
    }
}

/// Picks between a persisted snapshot and an invitation on (re)start.
///
/// A recreation redelivers the invite that was already folded into the
/// snapshot, so an invite equal to `previous_invite` is stale and the
/// snapshot wins. Any other invite is fresh and replaces the snapshot.
/// Only reference equality is available to tell the two apart.
pub fn resolve(
    persisted: Option<SessionSnapshot>,
    current_invite: Option<InviteRef>,
    previous_invite: Option<&InviteRef>,
) -> Decision {
    let decision = match current_invite {
        Some(invite) if previous_invite != Some(&invite) => Decision::UseInvite(invite),
        _ => match persisted {
            Some(snapshot) => Decision::UsePersisted(snapshot),
            None => Decision::UseNeither,
        },
    };
    tracing::info!(decision = decision.kind(), "resolved startup session state");
    decision
}
