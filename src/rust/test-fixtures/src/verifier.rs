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

use async_trait::async_trait;
use ldap_auth_business::attributes::DirectoryAttributes;
use ldap_auth_business::credentials::Credentials;
use ldap_auth_business::flash::{FlashConfig, FlashSink};
use ldap_auth_business::verifier::{AuthFailure, ConnectionError, CredentialVerifier};

pub const USER: &str = "jdoe";
pub const PASSWORD: &str = "secret";
pub const REJECTION: &str = "Your account is locked";

/// Accepts exactly [USER] with [PASSWORD] and flashes [REJECTION] for
/// every other complete login
#[derive(Default)]
pub struct FakeVerifier {
    unreachable: bool,
}

impl FakeVerifier {
    pub fn unreachable() -> Self {
        Self { unreachable: true }
    }
}

#[async_trait]
impl CredentialVerifier for FakeVerifier {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        flash: &dyn FlashSink,
    ) -> Result<DirectoryAttributes, AuthFailure> {
        if !credentials.is_complete() {
            return Err(AuthFailure::MissingCredentials);
        }
        if self.unreachable {
            return Err(ConnectionError::Unreachable.into());
        }
        if credentials.username == USER && credentials.password == PASSWORD {
            return Ok(user());
        }
        let config = FlashConfig::default();
        flash.write(&config.key, vec![config.message(REJECTION)]);
        Err(AuthFailure::NotFound)
    }

    async fn close(&self) {}
}

pub fn user() -> DirectoryAttributes {
    DirectoryAttributes::new(
        format!("cn={USER},ou=users,dc=example,dc=org"),
        vec![
            ("uid".to_string(), vec![USER.to_string()]),
            ("sn".to_string(), vec!["Doe".to_string()]),
        ],
        Vec::new(),
    )
}
