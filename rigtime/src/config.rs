use crate::Error;
use std::collections::BTreeMap;

/// A single typed configuration value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum SettingValue {
    Bool(bool),
    Float(f32),
    Text(String),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat `name -> value` configuration, consumed once when a component is set up.
///
/// Parsing files is the host's job; this only maps names to typed values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "json")]
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let values: BTreeMap<String, SettingValue> =
            serde_json::from_str(input).map_err(|e| Error::JsonParse {
                message: e.to_string(),
            })?;
        Ok(Self { values })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, Error> {
        match self.values.get(key) {
            None => Ok(None),
            Some(SettingValue::Bool(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::SettingType {
                key: key.to_string(),
                expected: "bool",
            }),
        }
    }

    pub fn get_f32(&self, key: &str) -> Result<Option<f32>, Error> {
        match self.values.get(key) {
            None => Ok(None),
            Some(SettingValue::Float(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::SettingType {
                key: key.to_string(),
                expected: "float",
            }),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, Error> {
        match self.values.get(key) {
            None => Ok(None),
            Some(SettingValue::Text(v)) => Ok(Some(v.as_str())),
            Some(_) => Err(Error::SettingType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (key, value) in iter {
            settings.insert(key, value);
        }
        settings
    }
}
