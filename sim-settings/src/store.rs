// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    Error, Result,
    document::{SIM_MODE_KEY, SettingsDocument},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sim_rpc_client::DEFAULT_RPC_PORT;
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Oldest settings format that is read without a warning.
pub const MIN_SETTINGS_VERSION: f64 = 1.2;
pub const DEFAULT_LOCAL_HOST_IP: &str = "127.0.0.1";
pub const DEFAULT_CLOCK_SPEED: f64 = 1.0;

/// Receives the settings text fetched from the simulation server.
///
/// `initialize_settings` is always called before `load`. `load` is handed a supplier it can call
/// to find out the simulation mode.
pub trait SettingsStore {
    fn initialize_settings(&mut self, text: &str) -> Result<()>;
    fn load(&mut self, sim_mode: &dyn Fn() -> Result<String>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimMode {
    Multirotor,
    Car,
    ComputerVision,
}

impl SimMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimMode::Multirotor => "Multirotor",
            SimMode::Car => "Car",
            SimMode::ComputerVision => "ComputerVision",
        }
    }

    /// Vehicle type, and name, of the vehicle created when the settings list none.
    pub fn default_vehicle_type(&self) -> &'static str {
        match self {
            SimMode::Multirotor => "SimpleFlight",
            SimMode::Car => "PhysXCar",
            SimMode::ComputerVision => "ComputerVision",
        }
    }

    pub fn default_clock_type(&self) -> &'static str {
        match self {
            SimMode::Multirotor => "SteppableClock",
            SimMode::Car | SimMode::ComputerVision => "ScalableClock",
        }
    }
}

impl fmt::Display for SimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SimMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(Error::SimModeNotSpecified),
            "Multirotor" => Ok(SimMode::Multirotor),
            "Car" => Ok(SimMode::Car),
            "ComputerVision" => Ok(SimMode::ComputerVision),
            other => Err(Error::UnknownSimMode(other.to_string())),
        }
    }
}

fn default_auto_create() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleSetting {
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,
}

impl VehicleSetting {
    pub fn new(vehicle_type: impl Into<String>) -> Self {
        Self {
            vehicle_type: vehicle_type.into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            auto_create: true,
        }
    }
}

/// Simulator settings parsed from the server's settings text.
///
/// Fields hold their defaults until [`SettingsStore::load`] succeeds. A failed `load` leaves them
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    document: Option<SettingsDocument>,
    pub settings_version: Option<f64>,
    pub sim_mode: Option<SimMode>,
    pub clock_type: String,
    pub clock_speed: f64,
    pub api_server_port: u16,
    pub local_host_ip: String,
    pub vehicles: BTreeMap<String, VehicleSetting>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            document: None,
            settings_version: None,
            sim_mode: None,
            clock_type: String::new(),
            clock_speed: DEFAULT_CLOCK_SPEED,
            api_server_port: DEFAULT_RPC_PORT,
            local_host_ip: DEFAULT_LOCAL_HOST_IP.to_string(),
            vehicles: BTreeMap::new(),
        }
    }
}

impl SimSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.sim_mode.is_some()
    }

    /// The document handed to `initialize_settings`, if any.
    pub fn document(&self) -> Option<&SettingsDocument> {
        self.document.as_ref()
    }
}

impl SettingsStore for SimSettings {
    fn initialize_settings(&mut self, text: &str) -> Result<()> {
        self.document = Some(SettingsDocument::parse(text)?);
        Ok(())
    }

    fn load(&mut self, sim_mode: &dyn Fn() -> Result<String>) -> Result<()> {
        let document = self.document.as_ref().ok_or(Error::SettingsNotInitialized)?;

        let settings_version = match VersionCheck::of(document) {
            VersionCheck::Missing => {
                warn!("SettingsVersion is missing, the settings may be in an older format");
                None
            }
            VersionCheck::NotANumber(value) => {
                warn!("SettingsVersion should be a number, found {value}; treating it as missing");
                None
            }
            VersionCheck::Outdated(version) => {
                warn!(
                    "SettingsVersion {version} is older than {MIN_SETTINGS_VERSION}, some settings may be ignored"
                );
                Some(version)
            }
            VersionCheck::Current(version) => Some(version),
        };

        let mut mode_name = document.get_string(SIM_MODE_KEY, "");
        if mode_name.is_empty() {
            mode_name = sim_mode()?;
        }
        let mode = SimMode::from_str(&mode_name)?;

        let mut clock_type = document.get_string("ClockType", "");
        if clock_type.is_empty() {
            clock_type = mode.default_clock_type().to_string();
        }
        let clock_speed = document.get_f64("ClockSpeed", DEFAULT_CLOCK_SPEED);
        let api_server_port = read_port(document)?;
        let local_host_ip = document.get_string("LocalHostIp", DEFAULT_LOCAL_HOST_IP);
        let vehicles = read_vehicles(document, mode)?;

        debug!(
            "Loaded settings: mode {mode}, clock {clock_type} x{clock_speed}, {} vehicle(s)",
            vehicles.len()
        );
        self.settings_version = settings_version;
        self.sim_mode = Some(mode);
        self.clock_type = clock_type;
        self.clock_speed = clock_speed;
        self.api_server_port = api_server_port;
        self.local_host_ip = local_host_ip;
        self.vehicles = vehicles;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum VersionCheck {
    Missing,
    NotANumber(Value),
    Outdated(f64),
    Current(f64),
}

impl VersionCheck {
    fn of(document: &SettingsDocument) -> Self {
        match document.value("SettingsVersion") {
            None => VersionCheck::Missing,
            Some(value) => match value.as_f64() {
                None => VersionCheck::NotANumber(value.clone()),
                Some(version) if version < MIN_SETTINGS_VERSION => VersionCheck::Outdated(version),
                Some(version) => VersionCheck::Current(version),
            },
        }
    }
}

fn read_port(document: &SettingsDocument) -> Result<u16> {
    let Some(value) = document.value("ApiServerPort") else {
        return Ok(DEFAULT_RPC_PORT);
    };
    value
        .as_u64()
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| Error::InvalidSetting {
            key: "ApiServerPort".to_string(),
            reason: format!("expected a port number, found {value}"),
        })
}

fn read_vehicles(
    document: &SettingsDocument,
    mode: SimMode,
) -> Result<BTreeMap<String, VehicleSetting>> {
    let mut vehicles = BTreeMap::new();
    let entries = match document.value("Vehicles") {
        None => {
            let vehicle_type = mode.default_vehicle_type();
            vehicles.insert(vehicle_type.to_string(), VehicleSetting::new(vehicle_type));
            return Ok(vehicles);
        }
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(Error::InvalidSetting {
                key: "Vehicles".to_string(),
                reason: format!("expected an object, found {other}"),
            });
        }
    };

    for (name, entry) in entries {
        let mut vehicle: VehicleSetting =
            serde_json::from_value(entry.clone()).map_err(|err| Error::InvalidSetting {
                key: format!("Vehicles.{name}"),
                reason: err.to_string(),
            })?;
        if vehicle.vehicle_type.is_empty() {
            vehicle.vehicle_type = mode.default_vehicle_type().to_string();
        }
        vehicles.insert(name.clone(), vehicle);
    }
    Ok(vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    fn no_supplier() -> crate::Result<String> {
        Ok(String::new())
    }

    #[test]
    fn test_load_requires_initialized_settings() {
        let mut settings = SimSettings::new();
        assert!(matches!(
            settings.load(&no_supplier),
            Err(Error::SettingsNotInitialized)
        ));
        assert!(!settings.is_loaded());
    }

    #[test]
    fn test_multirotor_defaults() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings(r#"{"SettingsVersion":1.2,"SimMode":"Multirotor"}"#)?;
        settings.load(&no_supplier)?;

        assert_eq!(settings.sim_mode, Some(SimMode::Multirotor));
        assert_eq!(settings.settings_version, Some(1.2));
        assert_eq!(settings.clock_type, "SteppableClock");
        assert_eq!(settings.api_server_port, DEFAULT_RPC_PORT);
        assert_eq!(settings.local_host_ip, "127.0.0.1");
        assert_eq!(
            settings.vehicles.get("SimpleFlight"),
            Some(&VehicleSetting::new("SimpleFlight"))
        );
        Ok(())
    }

    #[test]
    fn test_supplier_is_used_when_the_document_has_no_mode() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings(r#"{"SettingsVersion":1.2}"#)?;
        settings.load(&|| Ok("Car".to_string()))?;

        assert_eq!(settings.sim_mode, Some(SimMode::Car));
        assert_eq!(settings.clock_type, "ScalableClock");
        assert!(settings.vehicles.contains_key("PhysXCar"));
        Ok(())
    }

    #[test]
    fn test_missing_or_unknown_mode_is_rejected() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings("{}")?;
        assert!(matches!(
            settings.load(&no_supplier),
            Err(Error::SimModeNotSpecified)
        ));

        settings.initialize_settings(r#"{"SimMode":"Boat"}"#)?;
        match settings.load(&no_supplier) {
            Err(Error::UnknownSimMode(mode)) => assert_eq!(mode, "Boat"),
            other => panic!("expected UnknownSimMode, got {other:?}"),
        }
        assert!(!settings.is_loaded());
        Ok(())
    }

    #[test]
    fn test_supplier_errors_propagate() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings("{}")?;
        let result = settings.load(&|| Err(Error::SettingsNotInitialized));
        assert!(matches!(result, Err(Error::SettingsNotInitialized)));
        Ok(())
    }

    #[test]
    fn test_vehicles_are_read_with_mode_defaults() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings(
            r#"{
                "SettingsVersion": 1.2,
                "SimMode": "Multirotor",
                "ClockSpeed": 4,
                "ApiServerPort": 41500,
                "Vehicles": {
                    "Drone1": { "VehicleType": "PX4Multirotor", "X": 2, "Z": -1.5, "AutoCreate": false },
                    "Drone2": { "Yaw": 90 }
                }
            }"#,
        )?;
        settings.load(&no_supplier)?;

        assert_eq!(settings.clock_speed, 4.0);
        assert_eq!(settings.api_server_port, 41500);
        assert_eq!(settings.vehicles.len(), 2);

        let drone1 = &settings.vehicles["Drone1"];
        assert_eq!(drone1.vehicle_type, "PX4Multirotor");
        assert_eq!((drone1.x, drone1.y, drone1.z), (2.0, 0.0, -1.5));
        assert!(!drone1.auto_create);

        let drone2 = &settings.vehicles["Drone2"];
        assert_eq!(drone2.vehicle_type, "SimpleFlight");
        assert_eq!(drone2.yaw, 90.0);
        assert!(drone2.auto_create);
        Ok(())
    }

    #[test]
    fn test_invalid_values_leave_the_store_untouched() -> Result<()> {
        let mut settings = SimSettings::new();
        settings.initialize_settings(r#"{"SimMode":"Car","Vehicles":{"Car1":{"X":"far"}}}"#)?;
        match settings.load(&no_supplier) {
            Err(Error::InvalidSetting { key, .. }) => assert_eq!(key, "Vehicles.Car1"),
            other => panic!("expected InvalidSetting, got {other:?}"),
        }

        settings.initialize_settings(r#"{"SimMode":"Car","ApiServerPort":70000}"#)?;
        assert!(matches!(
            settings.load(&no_supplier),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(!settings.is_loaded());
        assert!(settings.vehicles.is_empty());
        Ok(())
    }

    #[test]
    fn test_settings_version_of_the_wrong_type_is_not_reported_missing() -> Result<()> {
        let version_of = |text: &str| -> Result<VersionCheck> {
            Ok(VersionCheck::of(&SettingsDocument::parse(text)?))
        };

        assert_eq!(version_of("{}")?, VersionCheck::Missing);
        assert_eq!(
            version_of(r#"{"SettingsVersion":"1.2"}"#)?,
            VersionCheck::NotANumber(Value::String("1.2".to_string()))
        );
        assert_eq!(
            version_of(r#"{"SettingsVersion":1.0}"#)?,
            VersionCheck::Outdated(1.0)
        );
        assert_eq!(
            version_of(r#"{"SettingsVersion":1.2}"#)?,
            VersionCheck::Current(1.2)
        );

        let mut settings = SimSettings::new();
        settings.initialize_settings(r#"{"SettingsVersion":"1.2","SimMode":"Car"}"#)?;
        settings.load(&no_supplier)?;
        assert_eq!(settings.settings_version, None);
        assert!(settings.is_loaded());
        Ok(())
    }

    #[test]
    fn test_non_object_text_is_rejected() {
        let mut settings = SimSettings::new();
        assert!(matches!(
            settings.initialize_settings("[1, 2]"),
            Err(Error::NotAnObject)
        ));
        assert!(matches!(
            settings.initialize_settings("not json"),
            Err(Error::InvalidJson(_))
        ));
        assert!(settings.document().is_none());
    }
}
