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

use crate::error::LdapError;
use async_trait::async_trait;
use ldap3::{Ldap, Scope, SearchEntry, SearchResult};
use ldap_auth_business::attributes::DirectoryAttributes;
use log::debug;
use std::time::Duration;

const SUCCESS: u32 = 0;
const INVALID_CREDENTIALS: u32 = 49;

/// An established connection to a directory server.
///
/// Binding changes the identity of the whole connection, so callers must
/// not interleave operations of different logins on one connection.
#[async_trait]
pub trait DirectoryConnection: Send {
    async fn bind(&mut self, bind_dn: &str, password: &str) -> Result<(), LdapError>;

    /// Subtree search returning the first matching entry, if any
    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Option<DirectoryAttributes>, LdapError>;

    /// The extended diagnostic message the server sent with the result of
    /// the last operation
    fn diagnostic_message(&self) -> Option<String>;

    async fn unbind(&mut self) -> Result<(), LdapError>;
}

pub struct Ldap3Directory {
    ldap: Ldap,
    operation_timeout: Duration,
    diagnostic_message: Option<String>,
}

impl Ldap3Directory {
    pub(crate) fn new(ldap: Ldap, operation_timeout: Duration) -> Self {
        Self {
            ldap,
            operation_timeout,
            diagnostic_message: None,
        }
    }

    fn remember(&mut self, text: &str) {
        self.diagnostic_message = if text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        };
    }

    fn remember_error(&mut self, error: &ldap3::LdapError) {
        match error {
            ldap3::LdapError::LdapResult { result } => self.remember(&result.text),
            _ => self.diagnostic_message = None,
        }
    }
}

#[async_trait]
impl DirectoryConnection for Ldap3Directory {
    async fn bind(&mut self, bind_dn: &str, password: &str) -> Result<(), LdapError> {
        debug!("binding to LDAP as '{}'", bind_dn);
        let result = match self
            .ldap
            .with_timeout(self.operation_timeout)
            .simple_bind(bind_dn, password)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                self.remember_error(&e);
                return Err(LdapError::BindErrorWithContext(e));
            }
        };
        self.remember(&result.text);
        match result.rc {
            SUCCESS => Ok(()),
            INVALID_CREDENTIALS => {
                debug!("wrong username or password");
                Err(LdapError::InvalidCredentials)
            }
            rc => Err(LdapError::UnexpectedBindResult {
                rc,
                text: result.text,
            }),
        }
    }

    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Option<DirectoryAttributes>, LdapError> {
        let SearchResult(entries, result) = match self
            .ldap
            .with_timeout(self.operation_timeout)
            .search(base_dn, Scope::Subtree, filter, attributes)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                self.remember_error(&e);
                return Err(LdapError::SearchErrorWithContext(e));
            }
        };
        self.remember(&result.text);
        if result.rc != SUCCESS {
            return Err(LdapError::UnexpectedSearchResult {
                rc: result.rc,
                text: result.text,
            });
        }

        Ok(entries.into_iter().next().map(|entry| {
            let entry = SearchEntry::construct(entry);
            DirectoryAttributes::new(entry.dn, entry.attrs, entry.bin_attrs)
        }))
    }

    fn diagnostic_message(&self) -> Option<String> {
        self.diagnostic_message.clone()
    }

    async fn unbind(&mut self) -> Result<(), LdapError> {
        self.ldap
            .with_timeout(self.operation_timeout)
            .unbind()
            .await
            .map_err(LdapError::UnbindErrorWithContext)
    }
}
