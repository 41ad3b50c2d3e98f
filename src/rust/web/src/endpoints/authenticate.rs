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

use super::{server_error, ErrorResponse};
use crate::session::store_flash;
use actix_session::Session;
use actix_web::web::{Data, Form, Json};
use actix_web::{Either, HttpResponse};
use ldap_auth_business::credentials::Credentials;
use ldap_auth_business::flash::FlashBuffer;
use ldap_auth_business::serde::deserialise_empty_as_none;
use ldap_auth_business::verifier::{AuthFailure, CredentialVerifier};
use log::{debug, error, warn};
use serde_derive::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct Request {
    #[serde(default)]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    username: Option<String>,

    #[serde(default)]
    #[serde(deserialize_with = "deserialise_empty_as_none")]
    password: Option<String>,
}

impl From<Request> for Credentials {
    fn from(value: Request) -> Self {
        Self {
            username: value.username.unwrap_or_default(),
            password: value.password.unwrap_or_default(),
        }
    }
}

pub async fn post(
    request: Either<Form<Request>, Json<Request>>,
    session: Session,
    verifier: Data<Arc<dyn CredentialVerifier>>,
) -> HttpResponse {
    let credentials: Credentials = match request {
        Either::Left(Form(request)) => request.into(),
        Either::Right(Json(request)) => request.into(),
    };

    let flash = FlashBuffer::default();
    let result = verifier.authenticate(&credentials, &flash).await;
    if let Err(e) = store_flash(&session, flash.take()) {
        error!("failed to store flash messages: {}", e);
        return server_error();
    }

    match result {
        Ok(attributes) => {
            debug!("'{}' authenticated as '{}'", credentials.username, attributes.dn);
            HttpResponse::Ok().json(attributes)
        }
        Err(AuthFailure::Connection(e)) => {
            warn!("directory unavailable: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "directory unavailable",
            })
        }
        Err(e) => {
            debug!("login of '{}' failed: {}", credentials.username, e);
            HttpResponse::Unauthorized().json(ErrorResponse {
                error: "not authenticated",
            })
        }
    }
}
