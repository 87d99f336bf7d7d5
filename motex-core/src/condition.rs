use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an input device can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCapability {
    /// Pointer moved on a surface apart from the display (mouse, trackpad).
    IndirectPointer,
    /// Finger lands directly on the display.
    DirectTouch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mouse,
    Trackpad,
    Touchscreen,
}

impl DeviceType {
    pub fn capabilities(&self) -> &'static [DeviceCapability] {
        match self {
            DeviceType::Mouse | DeviceType::Trackpad => &[DeviceCapability::IndirectPointer],
            DeviceType::Touchscreen => &[DeviceCapability::DirectTouch],
        }
    }

    pub fn supports(&self, capability: DeviceCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mouse => "mouse",
            DeviceType::Trackpad => "trackpad",
            DeviceType::Touchscreen => "touchscreen",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mouse" => Ok(DeviceType::Mouse),
            "trackpad" => Ok(DeviceType::Trackpad),
            "touchscreen" | "touch" => Ok(DeviceType::Touchscreen),
            other => Err(CoreError::UnknownDevice(other.to_string())),
        }
    }
}

/// A named visuomotor mapping variant. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub mirror_transform: bool,
    pub decoupled_mapping: bool,
    pub requires_capability: Option<DeviceCapability>,
}

impl Condition {
    /// Names accepted in configuration, in their canonical spelling.
    pub const SUPPORTED: [&'static str; 4] = ["regular", "mirror", "decoupled", "decoupledMirror"];

    pub fn regular() -> Self {
        Self::build("regular", false, false)
    }

    pub fn mirror() -> Self {
        Self::build("mirror", true, false)
    }

    pub fn decoupled() -> Self {
        Self::build("decoupled", false, true)
    }

    pub fn decoupled_mirror() -> Self {
        Self::build("decoupledMirror", true, true)
    }

    fn build(name: &str, mirror_transform: bool, decoupled_mapping: bool) -> Self {
        Self {
            name: name.to_string(),
            mirror_transform,
            decoupled_mapping,
            requires_capability: decoupled_mapping.then_some(DeviceCapability::DirectTouch),
        }
    }

    /// Movement-mode label used in exports.
    pub fn movement_mode(&self) -> &'static str {
        if self.mirror_transform { "mirror" } else { "normal" }
    }

    pub fn is_available_on(&self, device: DeviceType) -> bool {
        self.requires_capability
            .is_none_or(|capability| device.supports(capability))
    }
}

impl FromStr for Condition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Condition::regular()),
            "mirror" => Ok(Condition::mirror()),
            "decoupled" => Ok(Condition::decoupled()),
            "decoupledmirror" => Ok(Condition::decoupled_mirror()),
            _ => Err(CoreError::UnknownCondition(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
