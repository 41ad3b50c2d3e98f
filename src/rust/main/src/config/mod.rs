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

pub mod parser;

use actix_web::cookie::SameSite;
use ldap_auth_business::flash::FlashConfig;
use ldap_auth_business::serde::{deserialise_empty_as_none, deserialise_ordered_map};
use ldap_auth_ldap::config::ConnectionOptions;
use ldap_auth_ldap::error::ConfigurationError;
use serde_derive::Deserialize;
use std::time::Duration;

const LDAP_PROTOCOL_VERSION: u8 = 3;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub ldap: Ldap,

    pub web: Web,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Ldap {
    /// One or more space separated servers
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    pub domain: Option<String>,

    #[serde(default)]
    #[serde(rename = "alternate domains")]
    pub alternate_domains: Vec<String>,

    #[serde(default)]
    #[serde(rename = "bind dn")]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    pub bind_dn: Option<String>,

    #[serde(default)]
    #[serde(rename = "base dn")]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    pub base_dn: Option<String>,

    #[serde(default)]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    pub search: Option<String>,

    #[serde(default)]
    #[serde(rename = "search attributes")]
    pub search_attributes: Vec<String>,

    #[serde(default)]
    pub options: Options,

    /// Substring of the server's diagnostic message to the message shown
    /// to the user
    #[serde(default)]
    #[serde(deserialize_with = "deserialise_ordered_map")]
    pub errors: Vec<(String, String)>,

    #[serde(default)]
    pub flash: FlashConfig,

    #[serde(default)]
    #[serde(rename = "log errors")]
    pub log_errors: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Options {
    #[serde(default)]
    #[serde(rename = "network timeout in seconds")]
    pub network_timeout_in_seconds: Option<u64>,

    #[serde(default)]
    #[serde(rename = "operation timeout in seconds")]
    pub operation_timeout_in_seconds: Option<u64>,

    #[serde(default)]
    pub starttls: bool,

    #[serde(default = "default_tls_verification")]
    #[serde(rename = "tls verification")]
    pub tls_verification: bool,

    #[serde(default)]
    #[serde(rename = "protocol version")]
    pub protocol_version: Option<u8>,

    #[serde(default)]
    pub referrals: Option<bool>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            network_timeout_in_seconds: None,
            operation_timeout_in_seconds: None,
            starttls: false,
            tls_verification: default_tls_verification(),
            protocol_version: None,
            referrals: None,
        }
    }
}

fn default_tls_verification() -> bool {
    true
}

impl TryFrom<&Options> for ConnectionOptions {
    type Error = ConfigurationError;

    fn try_from(value: &Options) -> Result<Self, Self::Error> {
        match value.protocol_version {
            None | Some(LDAP_PROTOCOL_VERSION) => {}
            Some(v) => {
                return Err(ConfigurationError::UnsupportedOption(format!(
                    "protocol version {v}"
                )))
            }
        }
        if value.referrals == Some(true) {
            return Err(ConfigurationError::UnsupportedOption(
                "referrals".to_string(),
            ));
        }
        Ok(Self {
            network_timeout: value.network_timeout_in_seconds.map(Duration::from_secs),
            operation_timeout: value.operation_timeout_in_seconds.map(Duration::from_secs),
            starttls: value.starttls,
            no_tls_verify: !value.tls_verification,
        })
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Web {
    pub bind: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default)]
    #[serde(rename = "public domain")]
    pub public_domain: Option<String>,

    #[serde(default)]
    #[serde(rename = "secure cookies")]
    pub secure_cookies: bool,

    #[serde(default = "default_session_timeout")]
    #[serde(rename = "session timeout in seconds")]
    pub session_timeout_in_seconds: i64,

    #[serde(default)]
    #[serde(rename = "session same site policy")]
    pub session_same_site_policy: SameSitePolicy,

    #[serde(rename = "secret key")]
    pub secret_key: String,
}

fn default_path() -> String {
    "".to_string()
}

fn default_session_timeout() -> i64 {
    3600
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SameSitePolicy {
    #[serde(rename = "strict")]
    Strict,
    #[default]
    #[serde(rename = "lax")]
    Lax,
    #[serde(rename = "none")]
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(value: SameSitePolicy) -> Self {
        match value {
            SameSitePolicy::Strict => Self::Strict,
            SameSitePolicy::Lax => Self::Lax,
            SameSitePolicy::None => Self::None,
        }
    }
}
