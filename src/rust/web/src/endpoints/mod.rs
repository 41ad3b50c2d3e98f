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

pub mod authenticate;
pub mod flash;

use actix_web::HttpResponse;
use serde_derive::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().body("method not allowed")
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("not found")
}

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "server error",
    })
}
