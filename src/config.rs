/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// Physics tuning lives here as one immutable struct handed to the
/// physics step, not as free constants scattered through the code, so
/// tests can run alternate tunings.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub physics: PhysicsConfig,
    pub policy: PolicyConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    /// Fixed simulation timestep, nominal 60 steps/second.
    pub tick_rate_ms: u64,
}

/// Physics tuning. Units: pixels and ticks, with `dt` scaled so that
/// 1.0 equals one nominal 60 Hz tick.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub tile_size: f32,
    pub gravity: f32,
    pub max_speed_x: f32,
    pub accel_x: f32,
    pub friction: f32,
    pub jump_vy: f32,
}

#[derive(Clone, Debug)]
pub struct PolicyConfig {
    /// Cadence of decision requests, decoupled from the physics tick.
    pub decision_interval_ms: u64,
    /// How long a decided action keeps its jump flag; after that only
    /// the direction keeps applying.
    pub hold_ms: u64,
    /// Bound on a single decision call before the fallback is substituted.
    pub timeout_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    policy: TomlPolicy,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_max_speed_x")]
    max_speed_x: f32,
    #[serde(default = "default_accel_x")]
    accel_x: f32,
    #[serde(default = "default_friction")]
    friction: f32,
    #[serde(default = "default_jump_vy")]
    jump_vy: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPolicy {
    #[serde(default = "default_decision_interval")]
    decision_interval_ms: u64,
    #[serde(default = "default_hold")]
    hold_ms: u64,
    #[serde(default = "default_timeout")]
    timeout_ms: u64,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }

fn default_tile_size() -> f32 { 32.0 }
fn default_gravity() -> f32 { 0.5 }
fn default_max_speed_x() -> f32 { 4.5 }
fn default_accel_x() -> f32 { 0.8 }
fn default_friction() -> f32 { 0.85 }
fn default_jump_vy() -> f32 { -11.0 }

fn default_decision_interval() -> u64 { 200 }
fn default_hold() -> u64 { 120 }
fn default_timeout() -> u64 { 1000 }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tile_size: default_tile_size(),
            gravity: default_gravity(),
            max_speed_x: default_max_speed_x(),
            accel_x: default_accel_x(),
            friction: default_friction(),
            jump_vy: default_jump_vy(),
        }
    }
}

impl Default for TomlPolicy {
    fn default() -> Self {
        TomlPolicy {
            decision_interval_ms: default_decision_interval(),
            hold_ms: default_hold(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default()).physics
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        Self::from_toml(load_toml(&candidate_dirs()))
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            speed: SpeedConfig { tick_rate_ms: t.speed.tick_rate_ms },
            physics: PhysicsConfig {
                tile_size: t.physics.tile_size,
                gravity: t.physics.gravity,
                max_speed_x: t.physics.max_speed_x,
                accel_x: t.physics.accel_x,
                friction: t.physics.friction,
                jump_vy: t.physics.jump_vy,
            },
            policy: PolicyConfig {
                decision_interval_ms: t.policy.decision_interval_ms,
                hold_ms: t.policy.hold_ms,
                timeout_ms: t.policy.timeout_ms,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.physics.tile_size, 32.0);
        assert_eq!(cfg.physics.jump_vy, -11.0);
        assert_eq!(cfg.policy.hold_ms, 120);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let t: TomlConfig = toml::from_str("[physics]\ngravity = 0.7\n").unwrap();
        let cfg = GameConfig::from_toml(t);
        assert_eq!(cfg.physics.gravity, 0.7);
        assert_eq!(cfg.physics.friction, 0.85);
        assert_eq!(cfg.policy.decision_interval_ms, 200);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(toml::from_str::<TomlConfig>("physics = 3").is_err());
    }
}
