//! Entity Snapshot
//!
//! Player, enemies and bullets as the host simulation owns them for the
//! duration of a frame. Rules read and mutate this state directly.
//! Enemies and bullets are addressed by stable ids, never by position.

use serde::{Deserialize, Serialize};

use crate::spec::game_spec::{EnemyTemplate, PlayerSpec, WeaponSpec};

// =============================================================================
// IDS
// =============================================================================

/// Stable bullet identifier, unique within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BulletId(pub u32);

/// Stable enemy identifier, unique within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

// =============================================================================
// PLAYER
// =============================================================================

/// The player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x (px/s).
    pub vx: f64,
    /// Velocity y (px/s).
    pub vy: f64,
    /// Hit points. Fractional; may go below zero.
    pub hp: f64,
    /// Movement speed (px/s).
    pub speed: f64,
    /// Weapon stats.
    pub weapon: WeaponSpec,
    /// Whether the player moved this frame.
    pub is_moving: bool,
    /// Game time of the last shot.
    pub last_fired_ms: f64,
}

impl Player {
    /// Configure a player from its template at a position.
    pub fn from_spec(spec: &PlayerSpec, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hp: spec.hp,
            speed: spec.speed,
            weapon: spec.weapon.clone(),
            is_moving: false,
            last_fired_ms: 0.0,
        }
    }

    /// Hit points exhausted.
    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    /// Weapon cooldown elapsed at `now_ms`.
    pub fn can_fire(&self, now_ms: f64) -> bool {
        if self.weapon.fire_rate <= 0.0 {
            return false;
        }
        now_ms - self.last_fired_ms > 1000.0 / self.weapon.fire_rate
    }

    /// Set velocity and derive the moving flag from it.
    pub fn set_velocity(&mut self, vx: f64, vy: f64) {
        self.vx = vx;
        self.vy = vy;
        self.is_moving = vx != 0.0 || vy != 0.0;
    }

    /// Stop all motion.
    pub fn halt(&mut self) {
        self.set_velocity(0.0, 0.0);
    }
}

// =============================================================================
// ENEMY
// =============================================================================

/// An enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable id.
    pub id: EnemyId,
    /// Template id, reported in kill telemetry.
    pub template_id: String,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Hit points.
    pub hp: f64,
    /// Movement speed (px/s).
    pub speed: f64,
    /// Game time of the last contact damage dealt.
    pub last_contact_ms: Option<f64>,
}

impl Enemy {
    /// Configure an enemy from its template at a position.
    pub fn from_template(id: EnemyId, template: &EnemyTemplate, x: f64, y: f64) -> Self {
        Self {
            id,
            template_id: template.id.clone(),
            x,
            y,
            hp: template.hp,
            speed: template.speed,
            last_contact_ms: None,
        }
    }

    /// Contact damage allowed at `now_ms` given a per-enemy cooldown.
    pub fn can_damage(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_contact_ms {
            Some(last) => now_ms - last > cooldown_ms,
            None => true,
        }
    }
}

// =============================================================================
// BULLET
// =============================================================================

/// A projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Stable id.
    pub id: BulletId,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x (px/s).
    pub vx: f64,
    /// Velocity y (px/s).
    pub vy: f64,
    /// Damage on hit.
    pub damage: f64,
    /// Remaining wall reflections before destruction.
    pub bounces_remaining: u32,
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything rules may touch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    /// The player.
    pub player: Player,
    /// Live enemies in spawn order.
    pub enemies: Vec<Enemy>,
    /// Live bullets in fire order.
    pub bullets: Vec<Bullet>,
    next_enemy_id: u32,
    next_bullet_id: u32,
}

impl Entities {
    /// Snapshot with a player and nothing else.
    pub fn new(player: Player) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            next_enemy_id: 0,
            next_bullet_id: 0,
        }
    }

    /// Add an enemy built from `template`.
    pub fn spawn_enemy(&mut self, template: &EnemyTemplate, x: f64, y: f64) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::from_template(id, template, x, y));
        id
    }

    /// Add a bullet with no bounce budget.
    pub fn spawn_bullet(&mut self, x: f64, y: f64, vx: f64, vy: f64, damage: f64) -> BulletId {
        let id = BulletId(self.next_bullet_id);
        self.next_bullet_id += 1;
        self.bullets.push(Bullet {
            id,
            x,
            y,
            vx,
            vy,
            damage,
            bounces_remaining: 0,
        });
        id
    }

    /// Look up a live bullet.
    pub fn bullet(&self, id: BulletId) -> Option<&Bullet> {
        self.bullets.iter().find(|b| b.id == id)
    }

    /// Look up a live bullet mutably.
    pub fn bullet_mut(&mut self, id: BulletId) -> Option<&mut Bullet> {
        self.bullets.iter_mut().find(|b| b.id == id)
    }

    /// Destroy a bullet. Returns it if it was live.
    pub fn remove_bullet(&mut self, id: BulletId) -> Option<Bullet> {
        let idx = self.bullets.iter().position(|b| b.id == id)?;
        Some(self.bullets.remove(idx))
    }

    /// Look up a live enemy.
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Look up a live enemy mutably.
    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Destroy an enemy. Returns it if it was live.
    pub fn remove_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    /// Closest enemy to the player, first in spawn order on ties.
    pub fn nearest_enemy(&self) -> Option<&Enemy> {
        let (px, py) = (self.player.x, self.player.y);
        let mut best: Option<(&Enemy, f64)> = None;
        for enemy in &self.enemies {
            let dist_sq = (enemy.x - px).powi(2) + (enemy.y - py).powi(2);
            match best {
                Some((_, d)) if d <= dist_sq => {}
                _ => best = Some((enemy, dist_sq)),
            }
        }
        best.map(|(e, _)| e)
    }

    /// Compact binary encoding of the full numeric state.
    pub fn snapshot_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::GameSpec;

    fn entities() -> Entities {
        let spec = GameSpec::default();
        Entities::new(Player::from_spec(&spec.player, 480.0, 270.0))
    }

    #[test]
    fn test_ids_are_stable_across_removal() {
        let mut ents = entities();
        let a = ents.spawn_bullet(0.0, 0.0, 1.0, 0.0, 8.0);
        let b = ents.spawn_bullet(0.0, 0.0, 1.0, 0.0, 8.0);
        let c = ents.spawn_bullet(0.0, 0.0, 1.0, 0.0, 8.0);

        assert!(ents.remove_bullet(b).is_some());
        assert!(ents.remove_bullet(b).is_none());
        assert_eq!(ents.bullet(a).unwrap().id, a);
        assert_eq!(ents.bullet(c).unwrap().id, c);

        let d = ents.spawn_bullet(0.0, 0.0, 1.0, 0.0, 8.0);
        assert_eq!(d, BulletId(3));
    }

    #[test]
    fn test_nearest_enemy() {
        let spec = GameSpec::default();
        let template = &spec.enemies.templates[0];
        let mut ents = entities();
        assert!(ents.nearest_enemy().is_none());

        ents.spawn_enemy(template, 52.0, 52.0);
        let near = ents.spawn_enemy(template, 400.0, 270.0);
        ents.spawn_enemy(template, 560.0, 270.0);

        assert_eq!(ents.nearest_enemy().unwrap().id, near);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut ents = entities();
        // 5 shots per second -> 200 ms between shots
        assert!(!ents.player.can_fire(200.0));
        assert!(ents.player.can_fire(200.5));
        ents.player.last_fired_ms = 300.0;
        assert!(!ents.player.can_fire(450.0));
    }

    #[test]
    fn test_velocity_drives_moving_flag() {
        let mut ents = entities();
        ents.player.set_velocity(220.0, 0.0);
        assert!(ents.player.is_moving);
        ents.player.halt();
        assert!(!ents.player.is_moving);
    }

    #[test]
    fn test_enemy_contact_cooldown() {
        let spec = GameSpec::default();
        let mut ents = entities();
        let id = ents.spawn_enemy(&spec.enemies.templates[0], 0.0, 0.0);
        let enemy = ents.enemy_mut(id).unwrap();
        assert!(enemy.can_damage(0.0, 1000.0));
        enemy.last_contact_ms = Some(100.0);
        assert!(!enemy.can_damage(1100.0, 1000.0));
        assert!(enemy.can_damage(1100.5, 1000.0));
    }

    #[test]
    fn test_snapshot_bytes_track_state() {
        let mut a = entities();
        let b = entities();
        assert_eq!(a.snapshot_bytes().unwrap(), b.snapshot_bytes().unwrap());
        a.player.hp -= 0.25;
        assert_ne!(a.snapshot_bytes().unwrap(), b.snapshot_bytes().unwrap());
    }
}
