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
use crate::directory::DirectoryConnection;
use crate::error::LdapError;
use ldap_auth_business::attributes::DirectoryAttributes;
use ldap_auth_business::credentials::{qualify, Credentials};
use ldap_auth_business::flash::FlashSink;
use ldap_auth_business::resolve::Resolve;
use ldap_auth_business::verifier::AuthFailure;
use log::{debug, warn};

enum Lookup {
    Found(DirectoryAttributes),
    Missing,
    SearchFailed,
}

/// Try the normalised username first and each alternate domain after
/// that, stopping at the first identity the directory accepts.
pub async fn authenticate(
    config: &DirectoryConfig,
    connection: &mut dyn DirectoryConnection,
    credentials: &Credentials,
    flash: &dyn FlashSink,
) -> Result<DirectoryAttributes, AuthFailure> {
    if !credentials.is_complete() {
        debug!("username or password missing");
        return Err(AuthFailure::MissingCredentials);
    }

    let domain = config.domain.as_deref();
    let identity = credentials.normalise(domain);
    let mut search_failed = false;
    match find_user(config, connection, &identity, domain, credentials, flash).await {
        Lookup::Found(attributes) => return Ok(attributes),
        Lookup::SearchFailed => search_failed = true,
        Lookup::Missing => {}
    }

    if !credentials.has_domain() {
        for alternate_domain in &config.alternate_domains {
            let identity = qualify(&credentials.username, alternate_domain);
            debug!("retrying as '{}'", identity);
            match find_user(config, connection, &identity, domain, credentials, flash).await {
                Lookup::Found(attributes) => return Ok(attributes),
                Lookup::SearchFailed => search_failed = true,
                Lookup::Missing => {}
            }
        }
    }

    if search_failed {
        Err(AuthFailure::SearchFailed)
    } else {
        Err(AuthFailure::NotFound)
    }
}

async fn find_user(
    config: &DirectoryConfig,
    connection: &mut dyn DirectoryConnection,
    identity: &str,
    domain: Option<&str>,
    credentials: &Credentials,
    flash: &dyn FlashSink,
) -> Lookup {
    let error = match bind_and_search(config, connection, identity, domain, credentials).await {
        Ok(Some(attributes)) => {
            debug!("'{}' resolved to '{}'", identity, attributes.dn);
            return Lookup::Found(attributes);
        }
        Ok(None) => {
            debug!("no entry found for '{}'", identity);
            return Lookup::Missing;
        }
        Err(e) => e,
    };

    let diagnostic = connection.diagnostic_message();
    if let LdapError::ResolveError(e) = &error {
        warn!("failed to construct directory query for '{}': {}", identity, e);
    } else if config.log_errors {
        warn!(
            "authenticating '{}' failed: {}. Diagnostic: {}",
            identity,
            error,
            diagnostic.as_deref().unwrap_or_default()
        );
    } else {
        debug!("authenticating '{}' failed", identity);
    }
    config.classifier.report(diagnostic.as_deref(), flash);

    if error.is_search_error() {
        Lookup::SearchFailed
    } else {
        Lookup::Missing
    }
}

async fn bind_and_search(
    config: &DirectoryConfig,
    connection: &mut dyn DirectoryConnection,
    identity: &str,
    domain: Option<&str>,
    credentials: &Credentials,
) -> Result<Option<DirectoryAttributes>, LdapError> {
    let bind_dn = match &config.bind_dn {
        Some(bind_dn) => bind_dn.resolve(identity, domain)?,
        None => identity.to_owned(),
    };
    connection.bind(&bind_dn, &credentials.password).await?;

    let base_dn = config.base_dn.resolve(identity, domain)?;
    let filter = config.search.resolve(identity, domain)?;
    debug!("searching in {} for {}", base_dn, filter);
    connection
        .search(&base_dn, &filter, &config.search_attributes)
        .await
}
