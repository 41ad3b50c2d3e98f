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

use crate::config::Config;
use crate::util::read_file;

use std::process::exit;

use log::{debug, error, trace};

const EXIT_CODE: i32 = 1;

pub fn parse_config(path: &str) -> Config {
    let raw_config = match read_file(path) {
        Err(e) => {
            error!("Failed to read file {}: {}", path, e);
            exit(EXIT_CODE);
        }
        Ok(content) => content,
    };
    match parse_raw_config(&raw_config) {
        Err(e) => {
            error!("Could not parse config: ");
            error!("{:#?}", e);
            trace!("Error in configuration file");
            exit(EXIT_CODE);
        }
        Ok(config) => {
            debug!("configuration read from {}", path);
            config
        }
    }
}

pub fn parse_raw_config(raw_config: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(raw_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_configuration_is_valid() {
        let raw_config = read_file(
            env!("CARGO_MANIFEST_DIR").to_string() + "/../../../dev/config.yml",
        )
        .unwrap();

        let actual = parse_raw_config(&raw_config).unwrap();

        assert_eq!("localhost:8088", actual.web.bind);
        assert_eq!(Some("example.org".to_string()), actual.ldap.domain);
        assert_eq!(
            "Your account is locked",
            actual.ldap.errors[0].1
        );
    }

    #[test]
    fn missing_web_section_is_rejected() {
        let actual = parse_raw_config(
            r#"
ldap:
  host: ldap://localhost
"#,
        );

        assert!(actual.is_err());
    }
}
