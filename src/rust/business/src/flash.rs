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

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A notification to be shown to the user on the next rendered page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub message: String,

    pub key: String,

    pub element: String,

    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// Where and how flash messages are displayed
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FlashConfig {
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default = "default_element")]
    pub element: String,

    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            element: default_element(),
            params: BTreeMap::default(),
        }
    }
}

fn default_key() -> String {
    "flash".to_string()
}

fn default_element() -> String {
    "Flash/error".to_string()
}

impl FlashConfig {
    pub fn message(&self, message: &str) -> FlashMessage {
        FlashMessage {
            message: message.to_owned(),
            key: self.key.clone(),
            element: self.element.clone(),
            params: self.params.clone(),
        }
    }
}

/// Persists flash messages for the next response. Writing replaces
/// whatever was stored under the same key before.
pub trait FlashSink: Send + Sync {
    fn write(&self, key: &str, messages: Vec<FlashMessage>);
}

/// Keeps flash messages in memory until the caller decides where they go
#[derive(Default)]
pub struct FlashBuffer {
    messages: Mutex<BTreeMap<String, Vec<FlashMessage>>>,
}

impl FlashBuffer {
    pub fn take(&self) -> BTreeMap<String, Vec<FlashMessage>> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl FlashSink for FlashBuffer {
    fn write(&self, key: &str, messages: Vec<FlashMessage>) {
        let mut stored = match self.messages.lock() {
            Ok(v) => v,
            Err(poisoned) => poisoned.into_inner(),
        };
        stored.insert(key.to_owned(), messages);
    }
}
