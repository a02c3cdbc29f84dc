//! Game tuning and ledger network settings
//!
//! Persisted in LocalStorage on the web; natively an optional JSON file named
//! by `SKYWARD_SETTINGS` overrides the defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Physics and playfield tuning (all rates are per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub jump_speed: f32,
    pub pipe_gap: f32,
    pub pipe_width: f32,
    pub pipe_speed: f32,
    pub pipe_interval: u32,
    pub first_pipe_delay: u32,
    pub ground_height: f32,
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub bird_start_x: f32,
    pub bird_start_y: f32,
    pub gap_edge_clearance: f32,
    pub bird_anim_ticks: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
            pipe_gap: PIPE_GAP,
            pipe_width: PIPE_WIDTH,
            pipe_speed: PIPE_SPEED,
            pipe_interval: PIPE_INTERVAL,
            first_pipe_delay: FIRST_PIPE_DELAY,
            ground_height: GROUND_HEIGHT,
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            bird_start_x: BIRD_START_X,
            bird_start_y: BIRD_START_Y,
            gap_edge_clearance: GAP_EDGE_CLEARANCE,
            bird_anim_ticks: BIRD_ANIM_TICKS,
        }
    }
}

impl Tuning {
    /// Y coordinate of the top of the ground strip
    #[inline]
    pub fn ground_line(&self) -> f32 {
        self.playfield_height - self.ground_height
    }

    #[inline]
    pub fn bird_start(&self) -> Vec2 {
        Vec2::new(self.bird_start_x, self.bird_start_y)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipe_interval == 0 {
            return Err(ConfigError::Invalid("pipe_interval must be positive".into()));
        }
        if self.first_pipe_delay == 0 {
            return Err(ConfigError::Invalid("first_pipe_delay must be positive".into()));
        }
        if self.pipe_gap <= 0.0 || self.pipe_width <= 0.0 {
            return Err(ConfigError::Invalid("pipe_gap and pipe_width must be positive".into()));
        }
        if self.pipe_speed <= 0.0 {
            return Err(ConfigError::Invalid("pipe_speed must be positive".into()));
        }
        if self.gravity <= 0.0 {
            return Err(ConfigError::Invalid("gravity must pull downward (positive)".into()));
        }
        if self.jump_speed >= 0.0 {
            return Err(ConfigError::Invalid("jump_speed must point upward (negative)".into()));
        }
        if self.ground_line() <= self.bird_start_y {
            return Err(ConfigError::Invalid(format!(
                "bird starts at y={} but the ground is at y={}",
                self.bird_start_y,
                self.ground_line()
            )));
        }
        Ok(())
    }
}

/// Remote score ledger network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub contract_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Westend Asset Hub".to_string(),
            rpc_url: "https://westend-asset-hub-eth-rpc.polkadot.io".to_string(),
            chain_id: 420_420_421,
            explorer_url: "https://blockscout-asset-hub.parity-chains-scw.parity.io".to_string(),
            contract_address: "0x350108263CAf6D6b3fa9c557A12dda510FA64A15".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Explorer page for a transaction
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// Explorer page for a player address
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }

    /// Chain id in the hex form wallets expect
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    /// Ledger network for the native host's online mode (defaults when
    /// absent). The browser host has no wallet and always plays offline.
    pub network: Option<NetworkConfig>,
    /// Fixed RNG seed (a time-based seed is used when absent)
    pub rng_seed: Option<u64>,
}

impl Settings {
    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "skyward_settings";

    /// Native settings file override
    #[allow(dead_code)]
    const ENV_PATH: &'static str = "SKYWARD_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the file named by `SKYWARD_SETTINGS`, if any
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            return Self::default();
        };
        match Self::load_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
