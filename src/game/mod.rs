//! Host Collaborator
//!
//! Everything the rule engine consumes from the surrounding game loop.
//!
//! ## Module Structure
//!
//! - `entities`: Player, enemy and bullet snapshot
//! - `events`: Game events dispatched to rules
//! - `session`: Headless session loop and control surface

pub mod entities;
pub mod events;
pub mod session;

// Re-export key types
pub use entities::{Bullet, BulletId, Enemy, EnemyId, Entities, Player};
pub use events::GameEvent;
pub use session::{FrameInput, Outcome, Session, SessionConfig};
