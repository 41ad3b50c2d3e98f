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

use ldap_auth_business::credentials::Credentials;
use ldap_auth_business::flash::FlashBuffer;
use ldap_auth_business::verifier::CredentialVerifier;
use ldap_auth_ldap::inject::open_verifier;
use ldap_auth_main::cli_parser::{
    parse_check_arguments, FLAG_CONFIG, FLAG_CONFIG_DEFAULT, FLAG_PASSWORD, FLAG_USERNAME,
    FLAG_VERBOSE,
};
use ldap_auth_main::config::parser::parse_config;
use ldap_auth_main::constructor::build_directory_config;
use ldap_auth_main::logging::initialise_from_verbosity;
use log::debug;
use log::error;
use std::process::exit;
use std::sync::Arc;

const EXIT_CODE: i32 = 1;

fn main() {
    let args = parse_check_arguments();
    initialise_from_verbosity(args.get_count(FLAG_VERBOSE));

    debug!("Starting up");

    let config_path = args
        .get_one::<String>(FLAG_CONFIG)
        .map(String::as_str)
        .unwrap_or(FLAG_CONFIG_DEFAULT);
    debug!("Config is at {}", config_path);

    debug!("Parsing config");
    let config = parse_config(config_path);
    let directory = match build_directory_config(&config.ldap) {
        Err(e) => {
            error!("{}", e);
            exit(EXIT_CODE);
        }
        Ok(v) => Arc::new(v),
    };

    let credentials = Credentials::new(
        args.get_one::<String>(FLAG_USERNAME)
            .map(String::as_str)
            .unwrap_or_default(),
        args.get_one::<String>(FLAG_PASSWORD)
            .map(String::as_str)
            .unwrap_or_default(),
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Err(e) => {
            error!("failed to start tokio runtime: {}", e);
            exit(EXIT_CODE);
        }
        Ok(v) => v,
    };

    let flash = FlashBuffer::default();
    let result = runtime.block_on(async {
        let verifier = open_verifier(directory).await?;
        let result = verifier.authenticate(&credentials, &flash).await;
        verifier.close().await;
        result
    });

    for (key, messages) in flash.take() {
        for message in messages {
            error!("{}: {}", key, message.message);
        }
    }

    match result {
        Err(e) => {
            error!("Login failed: {}", e);
            exit(EXIT_CODE);
        }
        Ok(attributes) => match serde_yaml::to_string(&attributes) {
            Err(e) => {
                error!("Could not dump attributes: {}", e);
                exit(EXIT_CODE);
            }
            Ok(attributes) => {
                println!("{}", attributes);
            }
        },
    }
}
