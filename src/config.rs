//! Per-device configuration consumed by the table engine.
//!
//! Backends own a [`HostConfig`]; the engine only reads the device identity
//! (for walk cache keys), the SNMPv3 context rules and the character set.

use serde::{Deserialize, Serialize};

/// SNMPv3 contexts to walk for one section, or for all sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRule {
    /// Section (check plugin) this rule applies to; `None` matches all.
    #[serde(default)]
    pub section: Option<String>,
    /// Context names, walked in this order.
    pub contexts: Vec<String>,
}

/// Device configuration.
///
/// ```
/// use snmp_table::HostConfig;
///
/// let json = r#"{
///     "hostname": "switch01",
///     "character_encoding": "latin1",
///     "snmpv3_contexts": [{"section": "if", "contexts": ["vlan-10", "vlan-20"]}]
/// }"#;
/// let config: HostConfig = serde_json::from_str(json).unwrap();
///
/// assert_eq!(config.contexts_for(Some("if")), vec![Some("vlan-10"), Some("vlan-20")]);
/// assert_eq!(config.contexts_for(Some("uptime")), vec![None]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Device identity; keys the walk cache.
    pub hostname: String,
    /// Source charset label for string columns (e.g. `"utf-8"`, `"latin1"`,
    /// `"cp1252"`). `None` tries UTF-8 and falls back to ISO-8859-1.
    #[serde(default)]
    pub character_encoding: Option<String>,
    /// Ordered context rules; the first matching rule wins.
    #[serde(default)]
    pub snmpv3_contexts: Vec<ContextRule>,
}

impl HostConfig {
    /// Configuration with defaults for everything but the identity.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Set the character set label.
    pub fn character_encoding(mut self, label: impl Into<String>) -> Self {
        self.character_encoding = Some(label.into());
        self
    }

    /// Append a context rule.
    pub fn context_rule(
        mut self,
        section: Option<&str>,
        contexts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.snmpv3_contexts.push(ContextRule {
            section: section.map(str::to_string),
            contexts: contexts.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Contexts to query for `section`, in order.
    ///
    /// `None` stands for the default (empty) context. A matching rule with no
    /// contexts yields an empty list, so nothing is walked.
    pub fn contexts_for(&self, section: Option<&str>) -> Vec<Option<&str>> {
        let Some(section) = section else {
            return vec![None];
        };
        self.snmpv3_contexts
            .iter()
            .find(|rule| rule.section.as_deref().is_none_or(|s| s == section))
            .map(|rule| rule.contexts.iter().map(|c| Some(c.as_str())).collect())
            .unwrap_or_else(|| vec![None])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rules_means_default_context() {
        let config = HostConfig::new("host");
        assert_eq!(config.contexts_for(Some("if")), vec![None]);
        assert_eq!(config.contexts_for(None), vec![None]);
    }

    #[test]
    fn first_matching_rule_wins() {
        let config = HostConfig::new("host")
            .context_rule(Some("if"), ["a"])
            .context_rule(None, ["b", "c"])
            .context_rule(Some("if"), ["never"]);

        assert_eq!(config.contexts_for(Some("if")), vec![Some("a")]);
        assert_eq!(config.contexts_for(Some("mem")), vec![Some("b"), Some("c")]);
    }

    #[test]
    fn rule_without_contexts_walks_nothing() {
        let config = HostConfig::new("host").context_rule(Some("if"), Vec::<String>::new());
        assert!(config.contexts_for(Some("if")).is_empty());
    }

    #[test]
    fn missing_section_ignores_rules() {
        let config = HostConfig::new("host").context_rule(None, ["a"]);
        assert_eq!(config.contexts_for(None), vec![None]);
    }

    #[test]
    fn deserialize_minimal() {
        let config: HostConfig = serde_json::from_str(r#"{"hostname": "h"}"#).unwrap();
        assert_eq!(config, HostConfig::new("h"));
    }
}
