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

use crate::serde::serialise_binary_values;
use serde_derive::Serialize;
use std::collections::BTreeMap;

/// The attributes of the directory entry a successful login resolved to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryAttributes {
    pub dn: String,

    pub attributes: BTreeMap<String, Vec<String>>,

    #[serde(rename = "binary attributes")]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(serialize_with = "serialise_binary_values")]
    pub binary_attributes: BTreeMap<String, Vec<Vec<u8>>>,
}

impl DirectoryAttributes {
    pub fn new<A, B>(dn: String, attributes: A, binary_attributes: B) -> Self
    where
        A: IntoIterator<Item = (String, Vec<String>)>,
        B: IntoIterator<Item = (String, Vec<Vec<u8>>)>,
    {
        Self {
            dn,
            attributes: attributes.into_iter().collect(),
            binary_attributes: binary_attributes.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// First value of `name`, the common case for single-valued attributes
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.binary_attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn binary_values_are_base64_encoded() {
        let uut = DirectoryAttributes::new(
            "cn=user01,ou=users,dc=example,dc=org".to_string(),
            vec![("cn".to_string(), vec!["user01".to_string()])],
            vec![("objectGUID".to_string(), vec![vec![0u8, 1, 2, 255]])],
        );

        let actual = serde_json::to_value(&uut).unwrap();

        assert_eq!(
            json!({
                "dn": "cn=user01,ou=users,dc=example,dc=org",
                "attributes": { "cn": ["user01"] },
                "binary attributes": { "objectGUID": ["AAEC/w=="] },
            }),
            actual
        );
    }

    #[test]
    fn entry_without_attributes_is_empty() {
        let uut = DirectoryAttributes::new(
            "cn=user01".to_string(),
            Vec::<(String, Vec<String>)>::new(),
            Vec::<(String, Vec<Vec<u8>>)>::new(),
        );

        assert!(uut.is_empty());
        assert_eq!(None, uut.first("cn"));
    }
}
