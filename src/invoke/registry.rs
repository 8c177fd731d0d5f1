//! Name-based resolution of invocation targets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::TargetConfig;
use crate::invoke::{HelloWorld, HttpTarget, Invoke, InvokeError, TargetRef};

/// Targets addressable by name.
#[derive(Clone, Default)]
pub struct Registry {
    targets: HashMap<String, Arc<dyn Invoke>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the builtin placeholder operation.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(HelloWorld::NAME, HelloWorld);
        registry
    }

    /// Builtins plus every target named in configuration.
    pub fn from_config<'a, I>(targets: I, client: reqwest::Client) -> Result<Self, InvokeError>
    where
        I: IntoIterator<Item = (&'a String, &'a TargetConfig)>,
    {
        let mut registry = Self::with_builtins();
        for (name, target) in targets {
            match target {
                TargetConfig::Builtin => {
                    if !registry.contains(name) {
                        return Err(InvokeError::Invalid(format!("no builtin target named '{}'", name)));
                    }
                }
                TargetConfig::Http { url, timeout_secs } => {
                    let url = Url::parse(url)
                        .map_err(|e| InvokeError::Invalid(format!("target '{}': {}", name, e)))?;
                    let timeout = timeout_secs.map(Duration::from_secs);
                    registry.register(name.clone(), HttpTarget::new(client.clone(), url, timeout));
                }
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, target: impl Invoke + 'static) {
        self.targets.insert(name.into(), Arc::new(target));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Invoke for Registry {
    async fn invoke(&self, target: &TargetRef, payload: &Value) -> Result<Value, InvokeError> {
        let resolved = self
            .targets
            .get(target.as_str())
            .ok_or_else(|| InvokeError::Invalid(format!("unknown target '{}'", target)))?;
        resolved.invoke(target, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_unknown_target_is_invalid() {
        let registry = Registry::with_builtins();
        let err = registry.invoke(&TargetRef::new("Nope"), &Value::Null).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Nope"));
    }

    #[tokio::test]
    async fn test_builtin_resolves() {
        let registry = Registry::with_builtins();
        let out = registry.invoke(&TargetRef::new("HelloWorld"), &Value::Null).await.unwrap();
        assert_eq!(out["body"], "Hello, world!");
    }

    #[test]
    fn test_from_config() {
        let mut targets = BTreeMap::new();
        targets.insert("HelloWorld".to_string(), TargetConfig::Builtin);
        targets.insert(
            "Ledger".to_string(),
            TargetConfig::Http { url: "http://127.0.0.1:9/ledger".to_string(), timeout_secs: Some(3) },
        );

        let registry = Registry::from_config(&targets, reqwest::Client::new()).unwrap();
        assert_eq!(registry.names(), vec!["HelloWorld", "Ledger"]);
    }

    #[test]
    fn test_unknown_builtin_rejected() {
        let mut targets = BTreeMap::new();
        targets.insert("Mystery".to_string(), TargetConfig::Builtin);
        assert!(Registry::from_config(&targets, reqwest::Client::new()).is_err());
    }
}
