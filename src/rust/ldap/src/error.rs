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

use ldap_auth_business::resolve::ResolveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LdapError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unexpected LDAP result code while binding: {rc}. {text}")]
    UnexpectedBindResult { rc: u32, text: String },
    #[error("bind error: {0}")]
    BindErrorWithContext(ldap3::LdapError),
    #[error("unexpected LDAP result code while searching: {rc}. {text}")]
    UnexpectedSearchResult { rc: u32, text: String },
    #[error("search error: {0}")]
    SearchErrorWithContext(ldap3::LdapError),
    #[error("unbind error: {0}")]
    UnbindErrorWithContext(ldap3::LdapError),
    #[error(transparent)]
    ResolveError(#[from] ResolveError),
}

impl LdapError {
    /// Whether the error happened after the bind had already succeeded
    pub fn is_search_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedSearchResult { .. } | Self::SearchErrorWithContext(_)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("LDAP server not specified")]
    MissingHost,
    #[error("invalid LDAP server '{0}': {1}")]
    InvalidHost(String, String),
    #[error("base dn not specified")]
    MissingBaseDn,
    #[error("invalid {0}: {1}")]
    InvalidTemplate(&'static str, ResolveError),
    #[error("unsupported option {0}")]
    UnsupportedOption(String),
}
