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

use crate::attributes::DirectoryAttributes;
use crate::credentials::Credentials;
use crate::flash::FlashSink;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    #[error("not connected to the directory")]
    NotConnected,
    #[error("directory connection is closed")]
    Closed,
    #[error("no directory server reachable")]
    Unreachable,
}

/// Why a login did not produce a user record. Every variant means "not
/// authenticated" to the caller.
#[derive(Error, Debug, Clone)]
pub enum AuthFailure {
    #[error("username or password missing")]
    MissingCredentials,
    #[error("username or password wrong")]
    NotFound,
    #[error("directory search failed")]
    SearchFailed,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Check `credentials` against the directory and return the attributes
    /// of the matching entry. Diagnostics of failed binds are classified and
    /// handed to `flash`.
    async fn authenticate(
        &self,
        credentials: &Credentials,
        flash: &dyn FlashSink,
    ) -> Result<DirectoryAttributes, AuthFailure>;

    /// Release the directory connection. Never fails and may be called
    /// repeatedly.
    async fn close(&self);
}
