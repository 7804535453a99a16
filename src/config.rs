use crate::input::Handedness;
use crate::skeleton::DEFAULT_JOINT_SCALE;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "xrinput_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// "left", "right" or "none"; anything else is logged and treated as none
    pub hand: String,
    /// Derive the controller position from the head pose (3DoF controllers)
    pub simulate_3dof: bool,
    /// Vector from head to elbow
    pub eyes_to_elbow: Vec3,
    /// Vector from elbow to hand
    pub elbow_hand: Vec3,
    /// Joint marker scale when the host reports no radius
    pub joint_scale: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            hand: String::new(),
            simulate_3dof: false,
            eyes_to_elbow: Vec3::new(0.1, -0.4, 0.15),
            elbow_hand: Vec3::new(0.0, 0.0, 0.25),
            joint_scale: DEFAULT_JOINT_SCALE,
        }
    }
}

impl ControllerConfig {
    pub fn for_hand(hand: Handedness) -> Self {
        Self {
            hand: hand.to_string().to_lowercase(),
            ..Default::default()
        }
    }

    /// Resolve the configured hand. Bad values never abort setup, the device
    /// just stays unbound.
    pub fn handedness(&self) -> Handedness {
        if self.hand.trim().is_empty() {
            return Handedness::None;
        }
        match self.hand.parse() {
            Ok(hand) => hand,
            Err(e) => {
                log::error!("{}", e);
                Handedness::None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XrInputConfig {
    pub left: ControllerConfig,
    pub right: ControllerConfig,
}

impl Default for XrInputConfig {
    fn default() -> Self {
        Self {
            left: ControllerConfig::for_hand(Handedness::Left),
            right: ControllerConfig::for_hand(Handedness::Right),
        }
    }
}

impl XrInputConfig {
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        log::error!("Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    log::error!("Failed to read config file: {}", e);
                }
            }
        }
        None
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILENAME)
    }
}
