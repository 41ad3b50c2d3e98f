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

use actix_session::{Session, SessionInsertError};
use ldap_auth_business::flash::FlashMessage;
use log::debug;
use std::collections::BTreeMap;

const FLASH_PREFIX: &str = "Flash";

pub fn flash_key(key: &str) -> String {
    format!("{FLASH_PREFIX}.{key}")
}

/// Store buffered flash messages in the session, replacing older messages
/// under the same key
pub fn store_flash(
    session: &Session,
    messages: BTreeMap<String, Vec<FlashMessage>>,
) -> Result<(), SessionInsertError> {
    for (key, messages) in messages {
        debug!("storing {} flash messages under '{}'", messages.len(), key);
        session.insert(flash_key(&key), messages)?;
    }
    Ok(())
}

/// Remove and return the flash messages under `key`
pub fn take_flash(session: &Session, key: &str) -> Vec<FlashMessage> {
    match session.remove_as::<Vec<FlashMessage>>(&flash_key(key)) {
        None => Vec::new(),
        Some(Ok(v)) => v,
        Some(Err(raw)) => {
            debug!("dropping unreadable flash messages: {}", raw);
            Vec::new()
        }
    }
}
