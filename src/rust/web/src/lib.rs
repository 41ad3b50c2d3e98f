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

pub mod endpoints;
pub mod session;

use actix_session::config::CookieContentSecurity;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::Server;
use actix_web::http::KeepAlive;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::get;
use actix_web::web::post;
use actix_web::web::route as all;
use actix_web::web::scope;
use actix_web::web::to;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use ldap_auth_business::verifier::CredentialVerifier;
use log::error;
use log::warn;
use std::sync::Arc;
use Error::LoggedBeforeError;

pub trait Constructor {
    fn verifier(&self) -> Arc<dyn CredentialVerifier>;
    fn bind(&self) -> String;
    fn workers(&self) -> Option<usize>;
    fn web_path(&self) -> String;
    fn secure_cookies(&self) -> bool;
    fn session_timeout(&self) -> i64;
    fn session_same_site_policy(&self) -> SameSite;
    fn public_domain(&self) -> Option<String>;
    fn secret_key(&self) -> String;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error: See above")]
    LoggedBeforeError,

    #[error("IO error")]
    StdIoError(#[from] std::io::Error),
}

pub fn build(constructor: &impl Constructor) -> Result<Server, Error> {
    let bind = constructor.bind();
    let workers = constructor.workers();
    let verifier = constructor.verifier();

    let web_path = constructor.web_path();
    let secure_cookies = constructor.secure_cookies();
    let session_timeout = constructor.session_timeout();
    let session_same_site_policy = constructor.session_same_site_policy();
    let public_domain = constructor.public_domain();
    let secret_key = match Key::try_from(constructor.secret_key().as_bytes()) {
        Err(e) => {
            error!("secret key is unusable: {}", e);
            return Err(LoggedBeforeError);
        }
        Ok(v) => v,
    };

    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(verifier.clone()))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_domain(public_domain.clone())
                    .cookie_name("session".to_string())
                    .cookie_path(web_path.clone())
                    .cookie_secure(secure_cookies)
                    .cookie_http_only(true)
                    .cookie_same_site(session_same_site_policy)
                    .session_lifecycle(
                        PersistentSession::default()
                            .session_ttl(Duration::seconds(session_timeout)),
                    )
                    .cookie_content_security(CookieContentSecurity::Private)
                    .build(),
            )
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .wrap(DefaultHeaders::new().add(("Pragma", "no-cache")))
            .service(
                scope(&web_path)
                    .route("/authenticate", post().to(endpoints::authenticate::post))
                    .route("/authenticate", all().to(endpoints::method_not_allowed))
                    .route("/flash/{key}", get().to(endpoints::flash::get))
                    .route("/flash/{key}", all().to(endpoints::method_not_allowed)),
            )
            .default_service(to(endpoints::not_found))
    })
    .disable_signals()
    .keep_alive(KeepAlive::Timeout(core::time::Duration::from_secs(60)))
    .shutdown_timeout(30);

    let mut server = match server.bind(&bind) {
        Err(e) => {
            warn!("Failed to create server: {}", e);
            return Err(e.into());
        }
        Ok(v) => v,
    };

    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    Ok(server.run())
}
