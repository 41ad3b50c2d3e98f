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

use serde_derive::Deserialize;
use std::fmt::{Debug, Formatter};

pub const DOMAIN_SEPARATOR: char = '@';

/// Username and password as typed into the login form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Whether the user typed a domain-qualified name like `jdoe@example.com`
    pub fn has_domain(&self) -> bool {
        has_domain(&self.username)
    }

    /// The identity to bind with when `domain` is the configured fixed
    /// domain. Qualified usernames are kept as they are.
    pub fn normalise(&self, domain: Option<&str>) -> String {
        match domain {
            Some(domain) if !domain.is_empty() && !self.has_domain() => {
                qualify(&self.username, domain)
            }
            _ => self.username.clone(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn has_domain(username: &str) -> bool {
    username.contains(DOMAIN_SEPARATOR)
}

pub fn qualify(username: &str, domain: &str) -> String {
    format!("{username}{DOMAIN_SEPARATOR}{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", "password", false)]
    #[case("user", "", false)]
    #[case("", "", false)]
    #[case("user", "password", true)]
    fn completeness_requires_both_fields(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(expected, Credentials::new(username, password).is_complete());
    }

    #[test]
    fn bare_username_gets_domain_appended() {
        let uut = Credentials::new("jdoe", "secret");

        assert_eq!("jdoe@example.com", uut.normalise(Some("example.com")));
    }

    #[test]
    fn qualified_username_is_kept() {
        let uut = Credentials::new("jdoe@other.org", "secret");

        assert_eq!("jdoe@other.org", uut.normalise(Some("example.com")));
    }

    #[test]
    fn missing_domain_keeps_username() {
        let uut = Credentials::new("jdoe", "secret");

        assert_eq!("jdoe", uut.normalise(None));
        assert_eq!("jdoe", uut.normalise(Some("")));
    }

    #[test]
    fn password_is_not_printed() {
        let uut = Credentials::new("jdoe", "hunter2");

        assert!(!format!("{uut:?}").contains("hunter2"));
    }
}
