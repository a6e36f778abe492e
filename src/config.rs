/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, unreadable or invalid;
/// missing keys fall back individually.

use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::ConfigError;

// ── Public Config Structs ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    pub seed: u64,
    pub tuning: Tuning,
}

/// Everything the simulation reads while stepping.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub player_step_speed: u32,
    pub player_step_times: u32,
    pub enemy_step_speed: u32,
    pub enemy_step_times: u32,
    pub hole_ticks: u32,
    pub beam_step: u32,
    pub beam_wait: u32,
    pub hole_wait: u32,    // ticks an enemy stays stuck in a hole
    pub reborn_wait: u32,  // ticks a respawned enemy stands still
    pub carry_max: u32,    // ticks before carried gold is dropped for sure
    pub drop_chance: f64,  // per eligible tick, before carry_max
    pub idle_fidget: u32,
    pub climb_memory: i32, // ticks an enemy keeps climbing out of its hole
    pub pan_x: i32,
    pub pan_y: i32,
    pub zoom_steps: u32,
    pub showcase: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        GameConfig::default().tuning
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_step_speed")]
    player_step_speed: u32,
    #[serde(default = "default_step_times")]
    player_step_times: u32,
    #[serde(default = "default_step_speed")]
    enemy_step_speed: u32,
    #[serde(default = "default_step_times")]
    enemy_step_times: u32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_hole_ticks")]
    hole_ticks: u32,
    #[serde(default = "default_beam_step")]
    beam_step: u32,
    #[serde(default = "default_beam_wait")]
    beam_wait: u32,
    #[serde(default = "default_hole_wait")]
    hole_wait: u32,
    #[serde(default = "default_reborn_wait")]
    reborn_wait: u32,
    #[serde(default = "default_carry_max")]
    carry_max: u32,
    #[serde(default = "default_drop_chance")]
    drop_chance: f64,
    #[serde(default = "default_idle_fidget")]
    idle_fidget: u32,
    #[serde(default = "default_climb_memory")]
    climb_memory: i32,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default = "default_pan_x")]
    pan_x: i32,
    #[serde(default = "default_pan_y")]
    pan_y: i32,
    #[serde(default = "default_zoom_steps")]
    zoom_steps: u32,
    #[serde(default = "default_showcase")]
    showcase: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_seed")]
    seed: u64,
}

// ── Defaults ──

/// Upper bound for step speeds and periods read from the file.
const MAX_STEP: u32 = 64;

fn default_tick_rate() -> u64 { 16 }
fn default_step_speed() -> u32 { 6 }
fn default_step_times() -> u32 { 5 }
fn default_hole_ticks() -> u32 { 180 }
fn default_beam_step() -> u32 { 15 }
fn default_beam_wait() -> u32 { 1 }
fn default_hole_wait() -> u32 { 50 }
fn default_reborn_wait() -> u32 { 10 }
fn default_carry_max() -> u32 { 28 }
fn default_drop_chance() -> f64 { 0.1 }
fn default_idle_fidget() -> u32 { 20 }
fn default_climb_memory() -> i32 { 24 }  // three half-tiles
fn default_pan_x() -> i32 { 4 }
fn default_pan_y() -> i32 { 3 }
fn default_zoom_steps() -> u32 { 50 }
fn default_showcase() -> bool { true }
fn default_seed() -> u64 { 0x5eed }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_step_speed: default_step_speed(),
            player_step_times: default_step_times(),
            enemy_step_speed: default_step_speed(),
            enemy_step_times: default_step_times(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            hole_ticks: default_hole_ticks(),
            beam_step: default_beam_step(),
            beam_wait: default_beam_wait(),
            hole_wait: default_hole_wait(),
            reborn_wait: default_reborn_wait(),
            carry_max: default_carry_max(),
            drop_chance: default_drop_chance(),
            idle_fidget: default_idle_fidget(),
            climb_memory: default_climb_memory(),
        }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            pan_x: default_pan_x(),
            pan_y: default_pan_y(),
            zoom_steps: default_zoom_steps(),
            showcase: default_showcase(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: default_seed() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing or broken files fall back to defaults with a warning.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match GameConfig::from_file(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!("{e}; using default settings");
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GameConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(cfg))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let TomlConfig { speed, rules, camera, general } = cfg;
        GameConfig {
            tick_rate_ms: speed.tick_rate_ms.max(1),
            seed: general.seed,
            tuning: Tuning {
                player_step_speed: speed.player_step_speed.clamp(1, MAX_STEP),
                player_step_times: speed.player_step_times.clamp(1, MAX_STEP),
                enemy_step_speed: speed.enemy_step_speed.clamp(1, MAX_STEP),
                enemy_step_times: speed.enemy_step_times.clamp(1, MAX_STEP),
                hole_ticks: rules.hole_ticks.max(1),
                beam_step: rules.beam_step.max(1),
                beam_wait: rules.beam_wait.clamp(1, rules.beam_step.max(1)),
                hole_wait: rules.hole_wait,
                reborn_wait: rules.reborn_wait,
                carry_max: rules.carry_max.max(1),
                drop_chance: if rules.drop_chance.is_finite() { rules.drop_chance.clamp(0.0, 1.0) } else { 0.0 },
                idle_fidget: rules.idle_fidget.max(1),
                climb_memory: rules.climb_memory.max(1),
                pan_x: camera.pan_x.max(1),
                pan_y: camera.pan_y.max(1),
                zoom_steps: camera.zoom_steps,
                showcase: camera.showcase,
            },
        }
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
