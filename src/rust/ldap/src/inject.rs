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

use crate::config::DirectoryConfig;
use crate::connect::{Connect, Connector};
use crate::verifier::{LdapVerifier, PerCallVerifier};
use ldap_auth_business::resolve::{Escape, ResolveError, Resolver, Template};
use ldap_auth_business::verifier::{ConnectionError, CredentialVerifier};
use std::sync::Arc;

pub fn connector(config: &DirectoryConfig) -> Arc<dyn Connect> {
    Arc::new(Connector::from(config))
}

pub async fn open_verifier(
    config: Arc<DirectoryConfig>,
) -> Result<Arc<dyn CredentialVerifier>, ConnectionError> {
    let connector = connector(&config);
    Ok(Arc::new(LdapVerifier::open(config, connector).await?))
}

pub fn per_call_verifier(config: Arc<DirectoryConfig>) -> Arc<dyn CredentialVerifier> {
    let connector = connector(&config);
    Arc::new(PerCallVerifier::new(config, connector))
}

/// Template for bind or base DNs
pub fn dn_template(source: &str) -> Result<Resolver, ResolveError> {
    template(source, escape_dn)
}

/// Template for search filters
pub fn filter_template(source: &str) -> Result<Resolver, ResolveError> {
    template(source, escape_filter)
}

/// Filter matching the identity against a single attribute
pub fn attribute_filter(attribute: &str) -> Result<Resolver, ResolveError> {
    filter_template(&format!("({attribute}={{{{ user }}}})"))
}

fn template(source: &str, escape: Escape) -> Result<Resolver, ResolveError> {
    Ok(Template::new(source, escape)?.into())
}

fn escape_dn(value: &str) -> String {
    ldap3::dn_escape(value).into_owned()
}

fn escape_filter(value: &str) -> String {
    ldap3::ldap_escape(value).into_owned()
}
