//! Android system properties, behind a trait so lookups can be faked.

use std::collections::HashMap;
use std::process::Command;

use log::{debug, warn};

use crate::isa::InstructionSet;

pub trait SystemProperties {
    /// Value of `key`, or `default` when the property is unset or empty
    fn get(&self, key: &str, default: &str) -> String;
}

/// Reads properties through the `getprop` tool of a running device
#[derive(Debug, Clone)]
pub struct Getprop {
    binary: String,
}

impl Getprop {
    pub fn new() -> Getprop {
        Getprop::with_binary("getprop")
    }

    pub fn with_binary(binary: impl Into<String>) -> Getprop {
        Getprop {
            binary: binary.into(),
        }
    }
}

impl Default for Getprop {
    fn default() -> Self {
        Getprop::new()
    }
}

impl SystemProperties for Getprop {
    fn get(&self, key: &str, default: &str) -> String {
        let output = match Command::new(&self.binary).arg(key).output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!("{} {} exited with {}", self.binary, key, output.status);
                return default.to_owned();
            }
            Err(err) => {
                warn!("failed to run {}: {}", self.binary, err);
                return default.to_owned();
            }
        };

        let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        debug!("{key} = {value:?}");

        if value.is_empty() {
            default.to_owned()
        } else {
            value
        }
    }
}

/// Fixed set of properties
#[derive(Debug, Clone, Default)]
pub struct StaticProperties {
    values: HashMap<String, String>,
}

impl StaticProperties {
    pub fn new() -> StaticProperties {
        StaticProperties::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        StaticProperties {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl SystemProperties for StaticProperties {
    fn get(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => default.to_owned(),
        }
    }
}

/// `dalvik.vm.isa.<isa>.variant`, the CPU variant dex2oat tunes for
pub fn isa_variant(properties: &dyn SystemProperties, isa: InstructionSet) -> String {
    properties.get(&format!("dalvik.vm.isa.{isa}.variant"), isa.as_str())
}

/// `dalvik.vm.isa.<isa>.features`, the optional CPU features dex2oat may use
pub fn isa_features(properties: &dyn SystemProperties, isa: InstructionSet) -> String {
    properties.get(&format!("dalvik.vm.isa.{isa}.features"), "default")
}
