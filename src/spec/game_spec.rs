//! Session configuration document.
//!
//! Field order here is the canonical serialization order used by the spec
//! hash, so reordering fields changes every hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::rules::bullet_bounce;
use crate::rules::idle_damage;

/// Loosely-typed parameter bag as it appears in the document.
///
/// Typed parameters are produced from it by catalog-driven validation.
pub type ParamBag = BTreeMap<String, Value>;

/// Immutable per-session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSpec {
    /// Document version.
    pub version: String,
    /// RNG seed for the session.
    pub seed: u64,
    /// Presentation metadata.
    pub meta: MetaSpec,
    /// Arena bounds.
    pub arena: ArenaSpec,
    /// Player template.
    pub player: PlayerSpec,
    /// Enemy spawn policy and templates.
    pub enemies: EnemiesSpec,
    /// Rule declarations, in dispatch order.
    pub rules: Vec<RuleDecl>,
    /// How the session is won.
    pub win_condition: WinCondition,
}

/// Presentation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaSpec {
    /// Display title.
    pub title: String,
    /// Free-form difficulty label.
    pub difficulty_target: String,
    /// Nominal session length.
    pub session_seconds: u32,
}

/// Arena bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaSpec {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Whether solid walls enclose the arena.
    pub walls: bool,
}

/// Player template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    /// Starting hit points.
    pub hp: f64,
    /// Movement speed (px/s).
    pub speed: f64,
    /// Weapon stats.
    pub weapon: WeaponSpec,
}

/// Weapon stats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSpec {
    /// Weapon kind label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Shots per second.
    pub fire_rate: f64,
    /// Damage per bullet.
    pub damage: f64,
    /// Bullet speed (px/s).
    pub bullet_speed: f64,
}

/// Enemy spawn policy and templates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemiesSpec {
    /// Spawn cadence.
    pub spawn: SpawnSpec,
    /// Enemy templates; waves use the first one.
    pub templates: Vec<EnemyTemplate>,
}

/// Spawn cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnSpec {
    /// Spawn pattern label.
    pub pattern: String,
    /// Seconds between waves.
    pub every_seconds: f64,
    /// Enemies per wave.
    pub count: u32,
}

/// Enemy template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Template id, reported in kill telemetry.
    pub id: String,
    /// Starting hit points.
    pub hp: f64,
    /// Movement speed (px/s).
    pub speed: f64,
    /// Behavior label.
    pub behavior: String,
}

/// One `{type, params}` rule declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDecl {
    /// Registered rule type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw parameters.
    #[serde(default)]
    pub params: ParamBag,
}

impl RuleDecl {
    /// Build a declaration from a JSON object of params.
    ///
    /// Non-object `params` yields an empty bag.
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map.into_iter().collect(),
            _ => ParamBag::new(),
        };
        Self {
            kind: kind.into(),
            params,
        }
    }
}

/// Win condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinCondition {
    /// Condition kind; only `SurviveTime` is evaluated.
    #[serde(rename = "type")]
    pub kind: String,
    /// Condition parameters.
    pub params: WinParams,
}

/// Win condition parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinParams {
    /// Seconds to survive.
    pub seconds: f64,
}

/// Win condition kind evaluated by the session.
pub const SURVIVE_TIME: &str = "SurviveTime";

impl Default for GameSpec {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            seed: 88421,
            meta: MetaSpec {
                title: "One Room, Many Fates".to_string(),
                difficulty_target: "medium".to_string(),
                session_seconds: 120,
            },
            arena: ArenaSpec {
                width: 960.0,
                height: 540.0,
                walls: true,
            },
            player: PlayerSpec {
                hp: 100.0,
                speed: 220.0,
                weapon: WeaponSpec {
                    kind: "pistol".to_string(),
                    fire_rate: 5.0,
                    damage: 8.0,
                    bullet_speed: 520.0,
                },
            },
            enemies: EnemiesSpec {
                spawn: SpawnSpec {
                    pattern: "waves".to_string(),
                    every_seconds: 8.0,
                    count: 4,
                },
                templates: vec![EnemyTemplate {
                    id: "chaser".to_string(),
                    hp: 22.0,
                    speed: 135.0,
                    behavior: "ChasePlayer".to_string(),
                }],
            },
            rules: vec![
                RuleDecl::new(idle_damage::KIND, json!({ "dps": 1.4, "idleGraceMs": 700 })),
                RuleDecl::new(bullet_bounce::KIND, json!({ "maxBounces": 2 })),
            ],
            win_condition: WinCondition {
                kind: SURVIVE_TIME.to_string(),
                params: WinParams { seconds: 90.0 },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_shape() {
        let value = serde_json::to_value(GameSpec::default()).unwrap();
        assert_eq!(value["seed"], 88421);
        assert_eq!(value["meta"]["difficultyTarget"], "medium");
        assert_eq!(value["player"]["weapon"]["fireRate"], 5.0);
        assert_eq!(value["enemies"]["spawn"]["everySeconds"], 8.0);
        assert_eq!(value["rules"][0]["type"], "NoIdleDamage");
        assert_eq!(value["rules"][1]["params"]["maxBounces"], 2);
        assert_eq!(value["winCondition"]["params"]["seconds"], 90.0);
    }

    #[test]
    fn test_document_roundtrip() {
        let spec = GameSpec::default();
        let text = serde_json::to_string(&spec).unwrap();
        let back: GameSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn test_rule_decl_params_default_empty() {
        let decl: RuleDecl = serde_json::from_str(r#"{"type":"BulletBounce"}"#).unwrap();
        assert!(decl.params.is_empty());
        assert!(RuleDecl::new("X", Value::Null).params.is_empty());
    }
}
