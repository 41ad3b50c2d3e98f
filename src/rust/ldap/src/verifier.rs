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

use crate::authenticate::authenticate;
use crate::config::DirectoryConfig;
use crate::connect::Connect;
use crate::directory::DirectoryConnection;
use async_trait::async_trait;
use ldap_auth_business::attributes::DirectoryAttributes;
use ldap_auth_business::credentials::Credentials;
use ldap_auth_business::flash::FlashSink;
use ldap_auth_business::verifier::{AuthFailure, ConnectionError, CredentialVerifier};
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

enum ConnectionState {
    Unconnected,
    Connected(Box<dyn DirectoryConnection>),
    Closed,
}

/// Verifies credentials over one long-lived directory connection.
///
/// Calls are serialised: the connection stays locked from bind until the
/// search has returned, so the bound identity of one login never leaks
/// into another.
pub struct LdapVerifier {
    config: Arc<DirectoryConfig>,
    connector: Arc<dyn Connect>,
    state: Mutex<ConnectionState>,
}

impl LdapVerifier {
    pub fn new(config: Arc<DirectoryConfig>, connector: Arc<dyn Connect>) -> Self {
        Self {
            config,
            connector,
            state: Mutex::new(ConnectionState::Unconnected),
        }
    }

    /// [new](Self::new) followed by [connect](Self::connect)
    pub async fn open(
        config: Arc<DirectoryConfig>,
        connector: Arc<dyn Connect>,
    ) -> Result<Self, ConnectionError> {
        let result = Self::new(config, connector);
        result.connect().await?;
        Ok(result)
    }

    pub async fn connect(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.lock().await;
        match *state {
            ConnectionState::Unconnected => {}
            ConnectionState::Connected(_) => {
                debug!("already connected");
                return Ok(());
            }
            ConnectionState::Closed => return Err(ConnectionError::Closed),
        }
        let connection = self.connector.connect().await?;
        *state = ConnectionState::Connected(connection);
        Ok(())
    }
}

#[async_trait]
impl CredentialVerifier for LdapVerifier {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        flash: &dyn FlashSink,
    ) -> Result<DirectoryAttributes, AuthFailure> {
        let mut state = self.state.lock().await;
        match &mut *state {
            ConnectionState::Unconnected => Err(ConnectionError::NotConnected.into()),
            ConnectionState::Closed => Err(ConnectionError::Closed.into()),
            ConnectionState::Connected(connection) => {
                authenticate(&self.config, connection.as_mut(), credentials, flash).await
            }
        }
    }

    async fn close(&self) {
        let state = std::mem::replace(&mut *self.state.lock().await, ConnectionState::Closed);
        if let ConnectionState::Connected(mut connection) = state {
            match connection.unbind().await {
                Ok(()) => debug!("unbound from directory"),
                Err(e) if self.config.log_errors => warn!("failed to unbind: {}", e),
                Err(e) => debug!("failed to unbind: {}", e),
            }
        }
    }
}

/// Opens a fresh [LdapVerifier] for every call, so concurrent logins never
/// share a connection.
pub struct PerCallVerifier {
    config: Arc<DirectoryConfig>,
    connector: Arc<dyn Connect>,
}

impl PerCallVerifier {
    pub fn new(config: Arc<DirectoryConfig>, connector: Arc<dyn Connect>) -> Self {
        Self { config, connector }
    }
}

#[async_trait]
impl CredentialVerifier for PerCallVerifier {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        flash: &dyn FlashSink,
    ) -> Result<DirectoryAttributes, AuthFailure> {
        if !credentials.is_complete() {
            debug!("username or password missing");
            return Err(AuthFailure::MissingCredentials);
        }

        let verifier = LdapVerifier::open(self.config.clone(), self.connector.clone()).await?;
        let result = verifier.authenticate(credentials, flash).await;
        verifier.close().await;
        result
    }

    /// Connections never outlive a call
    async fn close(&self) {}
}
