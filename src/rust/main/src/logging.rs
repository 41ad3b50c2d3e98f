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

use log::LevelFilter;
use log::{debug, warn};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::Appender;
use log4rs::config::Config;
use log4rs::config::Root;
use log4rs::encode::pattern::PatternEncoder;

const CONSOLE_PATTERN: &str = "{d} {h({level})} {t} {m}{n}";

/// Configure logging from a log4rs file. Without a usable file, log at
/// info level to the console.
pub fn initialise(config_file: &str) {
    match log4rs::init_file(config_file, Default::default()) {
        Ok(()) => debug!("logging configured from {}", config_file),
        Err(e) => {
            if initialise_console(CONSOLE_PATTERN, LevelFilter::Info) {
                warn!("could not read log configuration {}: {}", config_file, e);
            } else {
                eprintln!("could not configure logging: {}", e);
            }
        }
    }
}

pub fn initialise_from_verbosity(verbosity_level: u8) {
    let level = match verbosity_level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if !initialise_console("{level} {m}{n}", level) {
        eprintln!("could not configure logging");
    }
}

fn initialise_console(pattern: &str, level: LevelFilter) -> bool {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level));

    match config {
        Err(e) => {
            eprintln!("invalid logging configuration: {}", e);
            false
        }
        Ok(config) => log4rs::init_config(config).is_ok(),
    }
}
