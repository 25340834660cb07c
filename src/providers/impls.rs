// Standard library
use std::collections::BTreeMap;
use std::time::Duration;

// Current module imports
use super::constants::DEFAULT_PROFILES;
use super::errors::ProfileValidationError;
use super::types::{ProviderProfile, ProviderTable};

impl ProviderProfile {
    pub fn new(capacity: u32, refill_interval_ms: u64) -> Self {
        Self {
            capacity,
            refill_interval_ms,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn validate(&self, name: &str) -> Result<(), ProfileValidationError> {
        if name.trim().is_empty() {
            return Err(ProfileValidationError::MissingName);
        }

        if self.capacity == 0 {
            return Err(ProfileValidationError::InvalidCapacity(name.to_string()));
        }

        if self.refill_interval_ms == 0 {
            return Err(ProfileValidationError::InvalidRefillInterval(
                name.to_string(),
            ));
        }

        if self.timeout_ms == Some(0) {
            return Err(ProfileValidationError::InvalidTimeout(name.to_string()));
        }

        Ok(())
    }

    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }

    /// Queue timeout of this provider, or `default` when the profile has none.
    pub fn timeout(&self, default: Duration) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or(default)
    }
}

impl ProviderTable {
    /// The built-in profiles for the AI providers the studio talks to.
    pub fn defaults() -> Self {
        let profiles = DEFAULT_PROFILES
            .iter()
            .map(|(name, capacity, refill_interval_ms, timeout_ms)| {
                (
                    name.to_string(),
                    ProviderProfile {
                        capacity: *capacity,
                        refill_interval_ms: *refill_interval_ms,
                        timeout_ms: *timeout_ms,
                    },
                )
            })
            .collect();

        Self { profiles }
    }

    /// Defaults overlaid with configured profiles. A configured key replaces
    /// the built-in profile of the same name entirely.
    pub fn merged(overrides: &BTreeMap<String, ProviderProfile>) -> Self {
        let mut table = Self::defaults();
        for (name, profile) in overrides {
            table.profiles.insert(name.clone(), *profile);
        }
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: ProviderProfile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn get(&self, name: &str) -> Option<&ProviderProfile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        for (name, profile) in &self.profiles {
            profile.validate(name)?;
        }
        Ok(())
    }
}

impl FromIterator<(String, ProviderProfile)> for ProviderTable {
    fn from_iter<I: IntoIterator<Item = (String, ProviderProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_ai_provider() {
        let table = ProviderTable::defaults();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(
            names,
            vec!["ai_validate", "anthropic", "gemini", "mistral", "openai"]
        );
        assert!(table.validate().is_ok());
    }

    #[test]
    fn merged_replaces_and_extends_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("gemini".to_string(), ProviderProfile::new(2, 500));
        overrides.insert("groq".to_string(), ProviderProfile::new(30, 2_000));

        let table = ProviderTable::merged(&overrides);
        assert_eq!(table.get("gemini"), Some(&ProviderProfile::new(2, 500)));
        assert_eq!(table.get("groq").map(|p| p.capacity), Some(30));
        assert_eq!(table.get("openai").map(|p| p.capacity), Some(60));
    }

    #[test]
    fn validate_rejects_zero_values() {
        assert_eq!(
            ProviderProfile::new(0, 1_000).validate("openai"),
            Err(ProfileValidationError::InvalidCapacity("openai".into()))
        );
        assert_eq!(
            ProviderProfile::new(1, 0).validate("openai"),
            Err(ProfileValidationError::InvalidRefillInterval("openai".into()))
        );
        assert_eq!(
            ProviderProfile::new(1, 1).with_timeout_ms(0).validate("openai"),
            Err(ProfileValidationError::InvalidTimeout("openai".into()))
        );
        assert_eq!(
            ProviderProfile::new(1, 1).validate(" "),
            Err(ProfileValidationError::MissingName)
        );
    }

    #[test]
    fn timeout_falls_back_to_default() {
        let default = Duration::from_secs(30);
        assert_eq!(ProviderProfile::new(1, 1).timeout(default), default);
        assert_eq!(
            ProviderProfile::new(1, 1).with_timeout_ms(250).timeout(default),
            Duration::from_millis(250)
        );
    }
}
