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
use crate::directory::{DirectoryConnection, Ldap3Directory};
use async_trait::async_trait;
use ldap3::{drive, LdapConnAsync, LdapConnSettings};
use ldap_auth_business::verifier::ConnectionError;
use log::{debug, warn};
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, ConnectionError>;
}

pub struct Connector {
    pub(crate) urls: Vec<Url>,
    pub(crate) connect_timeout: Duration,
    pub(crate) operation_timeout: Duration,
    pub(crate) starttls: bool,
    pub(crate) no_tls_verify: bool,
}

impl From<&DirectoryConfig> for Connector {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            urls: config.urls.clone(),
            connect_timeout: config.options.network_timeout(),
            operation_timeout: config.options.operation_timeout(),
            starttls: config.options.starttls,
            no_tls_verify: config.options.no_tls_verify,
        }
    }
}

#[async_trait]
impl Connect for Connector {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, ConnectionError> {
        for url in &self.urls {
            let settings = LdapConnSettings::new()
                .set_conn_timeout(self.connect_timeout)
                .set_starttls(self.starttls)
                .set_no_tls_verify(self.no_tls_verify);
            debug!("connecting to {}", &url);
            match LdapConnAsync::from_url_with_settings(settings, url).await {
                Err(e) => {
                    warn!("ldap connection to '{}' failed: {}", url, e);
                }
                Ok((conn, ldap)) => {
                    drive!(conn);
                    debug!("connected to {}", &url);
                    return Ok(Box::new(Ldap3Directory::new(
                        ldap,
                        self.operation_timeout,
                    )));
                }
            }
        }
        warn!("failed to connect to any backend");
        Err(ConnectionError::Unreachable)
    }
}
