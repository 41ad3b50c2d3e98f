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

use crate::config::{Config, Ldap};
use actix_web::cookie::SameSite;
use ldap_auth_business::resolve::{ResolveError, Resolver};
use ldap_auth_business::verifier::CredentialVerifier;
use ldap_auth_ldap::config::{ConnectionOptions, DirectoryConfig};
use ldap_auth_ldap::error::ConfigurationError;
use ldap_auth_ldap::inject::{dn_template, filter_template, per_call_verifier};
use std::sync::Arc;

pub struct Constructor<'a> {
    config: &'a Config,

    verifier: Arc<dyn CredentialVerifier>,
}

impl<'a> Constructor<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ConfigurationError> {
        let directory = Arc::new(build_directory_config(&config.ldap)?);
        Ok(Self {
            config,
            verifier: per_call_verifier(directory),
        })
    }
}

pub fn build_directory_config(config: &Ldap) -> Result<DirectoryConfig, ConfigurationError> {
    let mut builder = DirectoryConfig::builder()
        .host(&config.host)
        .port(config.port)
        .domain(config.domain.clone())
        .alternate_domains(config.alternate_domains.clone())
        .search_attributes(config.search_attributes.clone())
        .options(ConnectionOptions::try_from(&config.options)?)
        .errors(config.errors.clone())
        .flash(config.flash.clone())
        .log_errors(config.log_errors);

    if let Some(bind_dn) = &config.bind_dn {
        builder = builder.bind_dn(template("bind dn", bind_dn, dn_template)?);
    }
    if let Some(base_dn) = &config.base_dn {
        builder = builder.base_dn(template("base dn", base_dn, dn_template)?);
    }
    if let Some(search) = &config.search {
        builder = builder.search(template("search filter", search, filter_template)?);
    }
    builder.build()
}

fn template(
    name: &'static str,
    source: &str,
    constructor: fn(&str) -> Result<Resolver, ResolveError>,
) -> Result<Resolver, ConfigurationError> {
    constructor(source).map_err(|e| ConfigurationError::InvalidTemplate(name, e))
}

impl<'a> ldap_auth_web::Constructor for Constructor<'a> {
    fn verifier(&self) -> Arc<dyn CredentialVerifier> {
        self.verifier.clone()
    }

    fn bind(&self) -> String {
        self.config.web.bind.clone()
    }

    fn workers(&self) -> Option<usize> {
        self.config.web.workers
    }

    fn web_path(&self) -> String {
        self.config.web.path.clone()
    }

    fn secure_cookies(&self) -> bool {
        self.config.web.secure_cookies
    }

    fn session_timeout(&self) -> i64 {
        self.config.web.session_timeout_in_seconds
    }

    fn session_same_site_policy(&self) -> SameSite {
        self.config.web.session_same_site_policy.into()
    }

    fn public_domain(&self) -> Option<String> {
        self.config.web.public_domain.clone()
    }

    fn secret_key(&self) -> String {
        self.config.web.secret_key.clone()
    }
}
