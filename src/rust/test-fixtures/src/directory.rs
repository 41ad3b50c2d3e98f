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

use async_trait::async_trait;
use ldap_auth_business::attributes::DirectoryAttributes;
use ldap_auth_business::verifier::ConnectionError;
use ldap_auth_ldap::connect::Connect;
use ldap_auth_ldap::directory::DirectoryConnection;
use ldap_auth_ldap::error::LdapError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub const SEARCH_FAILED: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCall {
    pub base_dn: String,
    pub filter: String,
    pub attributes: Vec<String>,
}

#[derive(Default)]
struct DirectoryState {
    accounts: BTreeMap<String, String>,
    entries: BTreeMap<String, DirectoryAttributes>,
    rejection: Option<String>,
    search_failure: Option<String>,
    failing_unbind: bool,
    yielding: bool,
    operations: Vec<String>,
    binds: Vec<String>,
    searches: Vec<SearchCall>,
    unbinds: usize,
}

/// In-memory directory. Clones share their accounts, entries and the
/// record of calls, but each clone keeps its own diagnostic message like a
/// separate connection would.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<DirectoryState>>,
    diagnostic_message: Option<String>,
}

impl FakeDirectory {
    pub fn with_account(self, bind_dn: &str, password: &str) -> Self {
        self.state()
            .accounts
            .insert(bind_dn.to_owned(), password.to_owned());
        self
    }

    /// `entry` is returned for searches with exactly this `filter`
    pub fn with_entry(self, filter: &str, entry: DirectoryAttributes) -> Self {
        self.state().entries.insert(filter.to_owned(), entry);
        self
    }

    /// Diagnostic message sent along with every rejected bind
    pub fn rejecting_with(self, diagnostic: &str) -> Self {
        self.state().rejection = Some(diagnostic.to_owned());
        self
    }

    pub fn failing_search(self, diagnostic: &str) -> Self {
        self.state().search_failure = Some(diagnostic.to_owned());
        self
    }

    pub fn failing_unbind(self) -> Self {
        self.state().failing_unbind = true;
        self
    }

    /// Hand control back to the runtime in the middle of every bind and
    /// search, giving concurrent callers a chance to slip in
    pub fn yielding(self) -> Self {
        self.state().yielding = true;
        self
    }

    /// Binds and searches of all clones in the order they were issued
    pub fn operations(&self) -> Vec<String> {
        self.state().operations.clone()
    }

    pub fn binds(&self) -> Vec<String> {
        self.state().binds.clone()
    }

    pub fn searches(&self) -> Vec<SearchCall> {
        self.state().searches.clone()
    }

    pub fn unbinds(&self) -> usize {
        self.state().unbinds
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl DirectoryConnection for FakeDirectory {
    async fn bind(&mut self, bind_dn: &str, password: &str) -> Result<(), LdapError> {
        let yielding = {
            let mut state = self.state();
            state.binds.push(bind_dn.to_owned());
            state.operations.push(format!("bind {bind_dn}"));
            state.yielding
        };
        if yielding {
            tokio::task::yield_now().await;
        }

        let state = self.state.lock().unwrap();
        if state.accounts.get(bind_dn).map(String::as_str) == Some(password) {
            self.diagnostic_message = None;
            Ok(())
        } else {
            self.diagnostic_message = state.rejection.clone();
            Err(LdapError::InvalidCredentials)
        }
    }

    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Option<DirectoryAttributes>, LdapError> {
        let yielding = {
            let mut state = self.state();
            state.searches.push(SearchCall {
                base_dn: base_dn.to_owned(),
                filter: filter.to_owned(),
                attributes: attributes.to_vec(),
            });
            state.operations.push(format!("search {filter}"));
            state.yielding
        };
        if yielding {
            tokio::task::yield_now().await;
        }

        let state = self.state.lock().unwrap();
        if let Some(diagnostic) = state.search_failure.clone() {
            self.diagnostic_message = Some(diagnostic.clone());
            return Err(LdapError::UnexpectedSearchResult {
                rc: SEARCH_FAILED,
                text: diagnostic,
            });
        }
        self.diagnostic_message = None;
        Ok(state.entries.get(filter).cloned())
    }

    fn diagnostic_message(&self) -> Option<String> {
        self.diagnostic_message.clone()
    }

    async fn unbind(&mut self) -> Result<(), LdapError> {
        let mut state = self.state.lock().unwrap();
        state.unbinds += 1;
        if state.failing_unbind {
            Err(LdapError::UnbindErrorWithContext(ldap3::LdapError::EndOfStream))
        } else {
            Ok(())
        }
    }
}

/// Hands out connections to `directory`, or fails like an unreachable
/// server when there is none
#[derive(Default)]
pub struct FakeConnector {
    directory: Option<FakeDirectory>,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub fn new(directory: FakeDirectory) -> Self {
        Self {
            directory: Some(directory),
            connects: AtomicUsize::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connect for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, ConnectionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.directory {
            Some(directory) => Ok(Box::new(directory.clone())),
            None => Err(ConnectionError::Unreachable),
        }
    }
}

pub fn entry(dn: &str, attributes: Vec<(&str, Vec<&str>)>) -> DirectoryAttributes {
    DirectoryAttributes::new(
        dn.to_owned(),
        attributes.into_iter().map(|(name, values)| {
            (
                name.to_owned(),
                values.into_iter().map(str::to_owned).collect(),
            )
        }),
        Vec::<(String, Vec<Vec<u8>>)>::new(),
    )
}
