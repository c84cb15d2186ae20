use std::collections::HashMap;

use url::Url;

use super::error::GatewayError;
use crate::config::UpstreamConfig;

/// Static `service -> upstream` table, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: HashMap<String, Option<Url>>,
}

impl RouteTable {
    pub fn from_config(upstreams: &[UpstreamConfig]) -> Self {
        let entries = upstreams
            .iter()
            .map(|u| (u.service.clone(), u.base_url.clone()))
            .collect();
        Self { entries }
    }

    pub fn with_route(mut self, service: &str, base_url: Option<Url>) -> Self {
        self.entries.insert(service.to_string(), base_url);
        self
    }

    pub fn resolve(&self, service: &str) -> Result<&Url, GatewayError> {
        match self.entries.get(service) {
            Some(Some(url)) => Ok(url),
            Some(None) => Err(GatewayError::ServiceUnavailable(service.to_string())),
            None => Err(GatewayError::UnknownService(service.to_string())),
        }
    }

    pub fn services(&self) -> impl Iterator<Item = (&str, Option<&Url>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

/// `base` + `/` + `rest`, collapsing the slashes at the seam.
pub fn upstream_url(base: &Url, rest: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        rest.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn resolves_known_unconfigured_and_unknown() {
        let table = RouteTable::default()
            .with_route("account", Some(url("http://account:8001")))
            .with_route("report", None);

        assert_eq!(table.resolve("account").unwrap().host_str(), Some("account"));
        assert!(matches!(
            table.resolve("report"),
            Err(GatewayError::ServiceUnavailable(_))
        ));
        assert!(matches!(
            table.resolve("billing"),
            Err(GatewayError::UnknownService(_))
        ));
    }

    #[test]
    fn from_config_keeps_every_service() {
        let table = RouteTable::from_config(&[
            UpstreamConfig { service: "account".into(), base_url: None },
            UpstreamConfig { service: "chatbot".into(), base_url: Some(url("http://bot:8003")) },
        ]);
        let mut names: Vec<_> = table.services().map(|(n, _)| n).collect();
        names.sort();
        assert_eq!(names, vec!["account", "chatbot"]);
    }

    #[test]
    fn joins_base_and_remainder() {
        assert_eq!(upstream_url(&url("http://account:8001"), "signup"), "http://account:8001/signup");
        assert_eq!(upstream_url(&url("http://account:8001/"), "/signup"), "http://account:8001/signup");
        assert_eq!(upstream_url(&url("http://svc/v1/"), "a/b"), "http://svc/v1/a/b");
        assert_eq!(upstream_url(&url("http://bot:8003"), ""), "http://bot:8003/");
    }
}
