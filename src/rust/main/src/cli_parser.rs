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

use clap::Arg;
use clap::ArgAction::Count;
use clap::ArgMatches;
use clap::Command;

pub const FLAG_CONFIG: &str = "config";
pub const FLAG_CONFIG_DEFAULT: &str = "/etc/ldap-auth/config.yml";

pub const FLAG_LOG_CONFIG: &str = "log";
pub const FLAG_LOG_DEFAULT: &str = "/etc/ldap-auth/log4rs.yml";

pub const FLAG_VERBOSE: &str = "verbose";
pub const FLAG_USERNAME: &str = "username";
pub const FLAG_PASSWORD: &str = "password";

pub fn parse_arguments() -> ArgMatches {
    let app = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(config_argument())
        .arg(
            Arg::new(FLAG_LOG_CONFIG)
                .short('l')
                .long(FLAG_LOG_CONFIG)
                .value_name("PATH")
                .help("The log4rs logging configuration")
                .num_args(1)
                .default_value(FLAG_LOG_DEFAULT),
        );
    app.get_matches()
}

pub fn parse_check_arguments() -> ArgMatches {
    let app = Command::new("ldap-auth-check")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check a login against the configured directory and print its attributes")
        .arg(
            Arg::new(FLAG_VERBOSE)
                .short('v')
                .long(FLAG_VERBOSE)
                .help("Output information while running")
                .action(Count),
        )
        .arg(
            Arg::new(FLAG_USERNAME)
                .short('u')
                .long(FLAG_USERNAME)
                .help("Name of the user")
                .value_name("STRING")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(FLAG_PASSWORD)
                .short('p')
                .long(FLAG_PASSWORD)
                .help("Password of the user")
                .value_name("STRING")
                .num_args(1)
                .required(true),
        )
        .arg(config_argument());
    app.get_matches()
}

fn config_argument() -> Arg {
    Arg::new(FLAG_CONFIG)
        .short('c')
        .long(FLAG_CONFIG)
        .value_name("PATH")
        .help("The config file to run with")
        .num_args(1)
        .default_value(FLAG_CONFIG_DEFAULT)
}
