/*  ldap-auth: LDAP credential verification
 *  Copyright (C) 2024 The ldap-auth developers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use crate::error::ConfigurationError;
use crate::inject::attribute_filter;
use ldap_auth_business::classify::ErrorClassifier;
use ldap_auth_business::flash::FlashConfig;
use ldap_auth_business::resolve::Resolver;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_SEARCH_ATTRIBUTE: &str = "userPrincipalName";

const ALL_ATTRIBUTES: &str = "*";

type HostProvider = dyn Fn() -> String + Send + Sync;

#[derive(Clone)]
pub enum Host {
    Fixed(String),
    /// Asked once when the configuration is built
    Provided(Arc<HostProvider>),
}

impl Debug for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(host) => f.debug_tuple("Fixed").field(host).finish(),
            Self::Provided(_) => f.write_str("Provided"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub network_timeout: Option<Duration>,
    pub operation_timeout: Option<Duration>,
    pub starttls: bool,
    pub no_tls_verify: bool,
}

impl ConnectionOptions {
    pub fn network_timeout(&self) -> Duration {
        self.network_timeout.unwrap_or(DEFAULT_NETWORK_TIMEOUT)
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
            .unwrap_or_else(|| self.network_timeout())
    }
}

/// Everything needed to verify credentials against one directory. Built
/// once and shared read-only between verifiers.
#[derive(Debug)]
pub struct DirectoryConfig {
    pub(crate) urls: Vec<Url>,
    pub(crate) domain: Option<String>,
    pub(crate) alternate_domains: Vec<String>,
    pub(crate) bind_dn: Option<Resolver>,
    pub(crate) base_dn: Resolver,
    pub(crate) search: Resolver,
    pub(crate) search_attributes: Vec<String>,
    pub(crate) options: ConnectionOptions,
    pub(crate) classifier: ErrorClassifier,
    pub(crate) log_errors: bool,
}

impl DirectoryConfig {
    pub fn builder() -> DirectoryConfigBuilder {
        DirectoryConfigBuilder::default()
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn alternate_domains(&self) -> &[String] {
        &self.alternate_domains
    }

    pub fn search_attributes(&self) -> &[String] {
        &self.search_attributes
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn log_errors(&self) -> bool {
        self.log_errors
    }
}

#[derive(Default)]
pub struct DirectoryConfigBuilder {
    host: Option<Host>,
    port: Option<u16>,
    domain: Option<String>,
    alternate_domains: Vec<String>,
    bind_dn: Option<Resolver>,
    base_dn: Option<Resolver>,
    search: Option<Resolver>,
    search_attributes: Vec<String>,
    options: ConnectionOptions,
    errors: Vec<(String, String)>,
    flash: FlashConfig,
    log_errors: bool,
}

impl DirectoryConfigBuilder {
    /// One or more space separated servers, with or without `ldap://` or
    /// `ldaps://` scheme
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(Host::Fixed(host.to_owned()));
        self
    }

    pub fn host_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.host = Some(Host::Provided(Arc::new(provider)));
        self
    }

    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain.filter(|v| !v.is_empty());
        self
    }

    pub fn alternate_domains(mut self, domains: Vec<String>) -> Self {
        self.alternate_domains = domains.into_iter().filter(|v| !v.is_empty()).collect();
        self
    }

    pub fn bind_dn(mut self, bind_dn: Resolver) -> Self {
        self.bind_dn = Some(bind_dn);
        self
    }

    pub fn base_dn(mut self, base_dn: Resolver) -> Self {
        self.base_dn = Some(base_dn);
        self
    }

    pub fn search(mut self, search: Resolver) -> Self {
        self.search = Some(search);
        self
    }

    pub fn search_attributes(mut self, attributes: Vec<String>) -> Self {
        self.search_attributes = attributes;
        self
    }

    pub fn options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn errors(mut self, errors: Vec<(String, String)>) -> Self {
        self.errors = errors;
        self
    }

    pub fn flash(mut self, flash: FlashConfig) -> Self {
        self.flash = flash;
        self
    }

    pub fn log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    pub fn build(self) -> Result<DirectoryConfig, ConfigurationError> {
        let host = match self.host.ok_or(ConfigurationError::MissingHost)? {
            Host::Fixed(host) => host,
            Host::Provided(provider) => provider(),
        };
        let urls = parse_urls(&host, self.port)?;
        let base_dn = self.base_dn.ok_or(ConfigurationError::MissingBaseDn)?;
        let search = match self.search {
            Some(v) => v,
            None => attribute_filter(DEFAULT_SEARCH_ATTRIBUTE)
                .map_err(|e| ConfigurationError::InvalidTemplate("search filter", e))?,
        };
        let search_attributes = if self.search_attributes.is_empty() {
            vec![ALL_ATTRIBUTES.to_string()]
        } else {
            self.search_attributes
        };

        Ok(DirectoryConfig {
            urls,
            domain: self.domain,
            alternate_domains: self.alternate_domains,
            bind_dn: self.bind_dn,
            base_dn,
            search,
            search_attributes,
            options: self.options,
            classifier: ErrorClassifier::new(self.errors, self.flash),
            log_errors: self.log_errors,
        })
    }
}

fn parse_urls(host: &str, port: Option<u16>) -> Result<Vec<Url>, ConfigurationError> {
    let urls = host
        .split_whitespace()
        .map(|host| parse_url(host, port))
        .collect::<Result<Vec<_>, _>>()?;
    if urls.is_empty() {
        return Err(ConfigurationError::MissingHost);
    }
    Ok(urls)
}

fn parse_url(host: &str, port: Option<u16>) -> Result<Url, ConfigurationError> {
    let invalid = |e: String| ConfigurationError::InvalidHost(host.to_owned(), e);
    let mut url = if host.contains("://") {
        Url::parse(host)
    } else {
        Url::parse(&format!("ldap://{host}"))
    }
    .map_err(|e| invalid(e.to_string()))?;

    if !["ldap", "ldaps", "ldapi"].contains(&url.scheme()) {
        return Err(invalid(format!("unknown scheme {}", url.scheme())));
    }
    if port.is_some() && url.set_port(port).is_err() {
        return Err(invalid("cannot carry a port".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_auth_business::resolve::Constant;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn builder() -> DirectoryConfigBuilder {
        DirectoryConfig::builder().base_dn(Constant("dc=example,dc=org".to_string()).into())
    }

    #[test]
    fn missing_host_is_rejected() {
        let actual = builder().build();

        assert_eq!(ConfigurationError::MissingHost, actual.unwrap_err());
    }

    #[test]
    fn blank_host_is_rejected() {
        let actual = builder().host("  ").build();

        assert_eq!(ConfigurationError::MissingHost, actual.unwrap_err());
    }

    #[test]
    fn missing_base_dn_is_rejected() {
        let actual = DirectoryConfig::builder().host("localhost").build();

        assert_eq!(ConfigurationError::MissingBaseDn, actual.unwrap_err());
    }

    #[rstest]
    #[case("localhost", None, vec!["ldap://localhost"])]
    #[case("localhost", Some(1389), vec!["ldap://localhost:1389"])]
    #[case("ldaps://dc1.example.org", None, vec!["ldaps://dc1.example.org"])]
    #[case(
        "ldap://dc1.example.org ldap://dc2.example.org:3389",
        Some(389),
        vec!["ldap://dc1.example.org:389", "ldap://dc2.example.org:389"]
    )]
    fn hosts_become_urls(
        #[case] host: &str,
        #[case] port: Option<u16>,
        #[case] expected: Vec<&str>,
    ) {
        let actual = builder().host(host).port(port).build().unwrap();

        assert_eq!(
            expected,
            actual
                .urls()
                .iter()
                .map(|v| v.as_str().trim_end_matches('/'))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let actual = builder().host("http://localhost").build();

        assert!(matches!(
            actual.unwrap_err(),
            ConfigurationError::InvalidHost(_, _)
        ));
    }

    #[test]
    fn host_provider_is_asked() {
        let actual = builder()
            .host_provider(|| "ldap://provided.example.org".to_string())
            .build()
            .unwrap();

        assert_eq!(Some("provided.example.org"), actual.urls()[0].host_str());
    }

    #[test]
    fn default_requests_all_attributes() {
        let actual = builder().host("localhost").build().unwrap();

        assert_eq!(vec!["*".to_string()], actual.search_attributes());
    }

    #[test]
    fn default_network_timeout_applies() {
        let actual = builder().host("localhost").build().unwrap();

        assert_eq!(DEFAULT_NETWORK_TIMEOUT, actual.options().network_timeout());
        assert_eq!(DEFAULT_NETWORK_TIMEOUT, actual.options().operation_timeout());
    }

    #[test]
    fn empty_domains_are_ignored() {
        let actual = builder()
            .host("localhost")
            .domain(Some(String::new()))
            .alternate_domains(vec![String::new(), "corp.example.org".to_string()])
            .build()
            .unwrap();

        assert_eq!(None, actual.domain());
        assert_eq!(vec!["corp.example.org".to_string()], actual.alternate_domains());
    }
}
