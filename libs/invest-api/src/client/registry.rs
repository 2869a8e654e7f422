use std::collections::HashMap;

use super::{InvestApiClient, configure};
use crate::error::{InvestApiError, InvestApiResult};
use crate::settings::InvestApiSettings;

/// Name of the default (unnamed) client
pub const DEFAULT_CLIENT_NAME: &str = "";

/// Named Invest API clients owned by the embedding application
///
/// A failed registration leaves the registry unchanged.
///
/// # Example
/// ```ignore
/// let mut registry = ClientRegistry::new();
/// registry.add_client(|s| s.access_token = Some(live_token), false)?;
/// registry.add_named_client("sandbox", |s| {
///     s.access_token = Some(sandbox_token);
///     s.sandbox = true;
/// }, false)?;
///
/// let sandbox = registry.get("sandbox").cloned();
/// ```
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, InvestApiClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default client
    pub fn add_client<F>(&mut self, configure_settings: F, web_client: bool) -> InvestApiResult<&InvestApiClient>
    where
        F: FnOnce(&mut InvestApiSettings),
    {
        self.add_named_client(DEFAULT_CLIENT_NAME, configure_settings, web_client)
    }

    /// Register a client under `name`
    pub fn add_named_client<F>(
        &mut self,
        name: &str,
        configure_settings: F,
        web_client: bool,
    ) -> InvestApiResult<&InvestApiClient>
    where
        F: FnOnce(&mut InvestApiSettings),
    {
        if self.clients.contains_key(name) {
            return Err(InvestApiError::DuplicateClient(name.to_string()));
        }

        let client = configure(name, configure_settings, web_client)?;
        Ok(self.clients.entry(name.to_string()).or_insert(client))
    }

    pub fn get(&self, name: &str) -> Option<&InvestApiClient> {
        self.clients.get(name)
    }

    pub fn default_client(&self) -> Option<&InvestApiClient> {
        self.get(DEFAULT_CLIENT_NAME)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ApiEndpoint;

    #[tokio::test]
    async fn test_default_client() {
        let mut registry = ClientRegistry::new();
        registry
            .add_client(|s| s.access_token = Some("t.live".into()), false)
            .unwrap();

        let client = registry.default_client().unwrap();
        assert_eq!(client.name(), DEFAULT_CLIENT_NAME);
        assert_eq!(client.endpoint(), ApiEndpoint::Production);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_two_named_clients_are_independent() {
        let mut registry = ClientRegistry::new();
        registry
            .add_named_client(
                "live",
                |s| {
                    s.access_token = Some("t.live".into());
                    s.app_name = Some("live-robot".into());
                },
                false,
            )
            .unwrap();
        registry
            .add_named_client(
                "sandbox",
                |s| {
                    s.access_token = Some("t.sandbox".into());
                    s.sandbox = true;
                },
                false,
            )
            .unwrap();

        let live = registry.get("live").unwrap();
        let sandbox = registry.get("sandbox").unwrap();

        assert_eq!(live.endpoint(), ApiEndpoint::Production);
        assert_eq!(live.app_name(), "live-robot");
        assert_eq!(sandbox.endpoint(), ApiEndpoint::Sandbox);
        assert_eq!(sandbox.app_name(), crate::settings::DEFAULT_APP_NAME);
        assert_eq!(registry.names(), vec!["live", "sandbox"]);
        assert!(registry.default_client().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let mut registry = ClientRegistry::new();
        registry
            .add_named_client("main", |s| s.access_token = Some("t.one".into()), false)
            .unwrap();

        let mut called = false;
        let err = registry
            .add_named_client(
                "main",
                |s| {
                    called = true;
                    s.access_token = Some("t.two".into());
                },
                false,
            )
            .unwrap_err();

        assert!(matches!(err, InvestApiError::DuplicateClient(ref name) if name == "main"));
        assert!(!called);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_token_leaves_registry_empty() {
        let mut registry = ClientRegistry::new();

        let err = registry
            .add_client(|s| s.access_token = Some(String::new()), false)
            .unwrap_err();

        assert!(matches!(err, InvestApiError::Configuration(_)));
        assert!(registry.is_empty());
        assert!(registry.default_client().is_none());
    }
}
