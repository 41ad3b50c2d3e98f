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
use crate::constructor::Constructor;
use crate::terminate::terminator;

use actix_web::dev::ServerHandle;

use log::error;

use ldap_auth_ldap::error::ConfigurationError;
use tokio::sync::oneshot;
use tokio::sync::oneshot::Receiver;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error: See above")]
    LoggedBeforeError,

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
}

pub fn run(config: Config) -> Result<(), Error> {
    let constructor = Constructor::new(&config)?;
    let actor_system = actix_rt::System::with_tokio_rt(|| {
        match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .thread_name(env!("CARGO_PKG_NAME"))
            .build()
        {
            Ok(v) => v,
            Err(e) => {
                error!("failed to start tokio runtime: {}", e);
                std::process::exit(1);
            }
        }
    });
    actor_system.block_on(async move {
        let (pass_server, receive_server) = oneshot::channel();
        tokio::spawn(runtime_primitives(receive_server));

        let srv = match ldap_auth_web::build(&constructor) {
            Err(e) => {
                error!("Startup failed: {}", e);
                return Err(Error::LoggedBeforeError);
            }
            Ok(srv) => srv,
        };
        if pass_server.send(srv.handle()).is_err() {
            error!("Failed to create server");
            return Err(Error::LoggedBeforeError);
        }
        srv.await.map_err(Error::from)
    })
}

async fn runtime_primitives(receive_server: Receiver<ServerHandle>) {
    let server = match receive_server.await {
        Err(e) => {
            error!("failed to receive server: {}", e);
            return;
        }
        Ok(server) => server,
    };

    if let Err(e) = terminator(server).await {
        error!("signal handling failed: {}", e);
    }
}
