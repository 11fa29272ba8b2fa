//! Game Events
//!
//! Named events the host dispatches to rules outside the per-frame tick.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::entities::BulletId;

/// Event name for [`GameEvent::PlayerMoved`].
pub const PLAYER_MOVED: &str = "PlayerMoved";
/// Event name for [`GameEvent::BulletFired`].
pub const BULLET_FIRED: &str = "BulletFired";
/// Event name for [`GameEvent::BulletHitWall`].
pub const BULLET_HIT_WALL: &str = "BulletHitWall";

/// An event dispatched to every active rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Movement signaled out-of-band from the tick snapshot.
    PlayerMoved,

    /// A bullet was created.
    BulletFired {
        /// The new bullet.
        bullet: BulletId,
    },

    /// A bullet reached an arena wall.
    BulletHitWall {
        /// The bullet that hit.
        bullet: BulletId,
    },

    /// Host-defined event with an optional payload.
    Custom {
        /// Event name.
        name: String,
        /// Optional payload.
        data: Option<Value>,
    },
}

impl GameEvent {
    /// Event name as rules and logs see it.
    pub fn name(&self) -> &str {
        match self {
            GameEvent::PlayerMoved => PLAYER_MOVED,
            GameEvent::BulletFired { .. } => BULLET_FIRED,
            GameEvent::BulletHitWall { .. } => BULLET_HIT_WALL,
            GameEvent::Custom { name, .. } => name,
        }
    }

    /// Host-defined event.
    pub fn custom(name: impl Into<String>, data: Option<Value>) -> Self {
        GameEvent::Custom {
            name: name.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(GameEvent::PlayerMoved.name(), "PlayerMoved");
        assert_eq!(GameEvent::BulletHitWall { bullet: BulletId(0) }.name(), "BulletHitWall");
        assert_eq!(GameEvent::custom("ShrineLit", None).name(), "ShrineLit");
    }
}
