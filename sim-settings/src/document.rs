// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{Error, Result};
use serde_json::{Map, Value};

pub const SIM_MODE_KEY: &str = "SimMode";

/// A parsed settings document. The top level is always a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    root: Map<String, Value>,
}

impl SettingsDocument {
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(Error::NotAnObject),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// The string at `key`, or `default` when absent or not a string.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.root
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.root
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.root
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// The nested object at `key`, if there is one.
    pub fn child(&self, key: &str) -> Option<SettingsDocument> {
        match self.root.get(key) {
            Some(Value::Object(map)) => Some(Self { root: map.clone() }),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }
}

/// Reads `SimMode` out of a settings text.
///
/// Returns an empty string when the field is missing or is not a string. Text that is not JSON
/// is an error.
pub fn extract_sim_mode(text: &str) -> Result<String> {
    let document = SettingsDocument::parse(text)?;
    Ok(document.get_string(SIM_MODE_KEY, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sim_mode() {
        assert_eq!(
            extract_sim_mode(r#"{"SimMode":"Multirotor"}"#).unwrap(),
            "Multirotor"
        );
        assert_eq!(extract_sim_mode("{}").unwrap(), "");
        assert_eq!(extract_sim_mode(r#"{"SimMode":3}"#).unwrap(), "");
        assert_eq!(
            extract_sim_mode(r#"{"SimMode":"Car","Vehicles":{}}"#).unwrap(),
            "Car"
        );
    }

    #[test]
    fn test_extract_sim_mode_rejects_malformed_text() {
        assert!(matches!(
            extract_sim_mode(r#"{"SimMode":"#),
            Err(Error::InvalidJson(_))
        ));
        assert!(matches!(extract_sim_mode(""), Err(Error::InvalidJson(_))));
        assert!(matches!(
            extract_sim_mode(r#"["Multirotor"]"#),
            Err(Error::NotAnObject)
        ));
    }

    #[test]
    fn test_typed_getters_fall_back_to_defaults() {
        let document = SettingsDocument::parse(
            r#"{"ClockSpeed":2.5,"RecordUIVisible":false,"Name":"drone","Port":"x"}"#,
        )
        .unwrap();

        assert_eq!(document.get_f64("ClockSpeed", 1.0), 2.5);
        assert_eq!(document.get_f64("Port", 1.0), 1.0);
        assert!(!document.get_bool("RecordUIVisible", true));
        assert!(document.get_bool("Missing", true));
        assert_eq!(document.get_string("Name", ""), "drone");
        assert_eq!(document.get_string("ClockSpeed", "none"), "none");
    }

    #[test]
    fn test_child_returns_nested_objects_only() {
        let document =
            SettingsDocument::parse(r#"{"Vehicles":{"Drone1":{"X":1}},"SimMode":"Car"}"#).unwrap();

        let vehicles = document.child("Vehicles").expect("Vehicles is an object");
        assert_eq!(vehicles.keys().collect::<Vec<_>>(), vec!["Drone1"]);
        assert_eq!(
            vehicles.child("Drone1").map(|drone| drone.get_f64("X", 0.0)),
            Some(1.0)
        );
        assert!(document.child("SimMode").is_none());
        assert!(document.child("Missing").is_none());
        assert!(document.contains("SimMode"));
    }
}
