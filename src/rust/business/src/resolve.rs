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

use enum_dispatch::enum_dispatch;
use std::error::Error as StdError;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tera::{Context, Tera};
use thiserror::Error;

const TEMPLATE_NAME: &str = "resolver";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("failed to render: {0}")]
    RenderError(String),
}

/// Derives a directory value like a bind DN, a search base or a search
/// filter from the identity being authenticated and its domain.
#[enum_dispatch]
pub trait Resolve {
    fn resolve(&self, identity: &str, domain: Option<&str>) -> Result<String, ResolveError>;
}

#[enum_dispatch(Resolve)]
#[derive(Clone, Debug)]
pub enum Resolver {
    Constant,
    Template,
    Computed,
}

/// Ignores its input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constant(pub String);

impl Resolve for Constant {
    fn resolve(&self, _: &str, _: Option<&str>) -> Result<String, ResolveError> {
        Ok(self.0.clone())
    }
}

pub type Escape = fn(&str) -> String;

pub fn verbatim(value: &str) -> String {
    value.to_owned()
}

/// A tera template with `user` and `domain` in scope, e.g.
/// `cn={{ user }},ou=users,dc=example,dc=org`. Both values pass through
/// `escape` before they are substituted.
#[derive(Clone)]
pub struct Template {
    source: String,
    tera: Tera,
    escape: Escape,
}

impl Template {
    pub fn new(source: &str, escape: Escape) -> Result<Self, ResolveError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| ResolveError::InvalidTemplate(render_tera_error(&e)))?;
        Ok(Self {
            source: source.to_owned(),
            tera,
            escape,
        })
    }
}

impl Debug for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Template").field(&self.source).finish()
    }
}

impl Resolve for Template {
    fn resolve(&self, identity: &str, domain: Option<&str>) -> Result<String, ResolveError> {
        let mut context = Context::new();
        context.insert("user", &(self.escape)(identity));
        context.insert("domain", &(self.escape)(domain.unwrap_or_default()));
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| ResolveError::RenderError(render_tera_error(&e)))
    }
}

type ResolveFn = dyn Fn(&str, Option<&str>) -> String + Send + Sync;

/// Delegates to a function. Its result is used as is, so the function is
/// responsible for any escaping.
#[derive(Clone)]
pub struct Computed(Arc<ResolveFn>);

impl Computed {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }
}

impl Debug for Computed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Computed")
    }
}

impl Resolve for Computed {
    fn resolve(&self, identity: &str, domain: Option<&str>) -> Result<String, ResolveError> {
        Ok((self.0)(identity, domain))
    }
}

fn render_tera_error(error: &tera::Error) -> String {
    let mut result = format!("{}", error);
    let mut source = error.source();
    while let Some(error) = source {
        result += &format!(": {}", error);
        source = error.source();
    }
    result
}
