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
use ldap_auth_business::flash::{FlashBuffer, FlashConfig};
use ldap_auth_business::resolve::{Computed, Constant};
use ldap_auth_business::verifier::{AuthFailure, ConnectionError, CredentialVerifier};
use ldap_auth_ldap::config::{DirectoryConfig, DirectoryConfigBuilder};
use ldap_auth_ldap::inject::dn_template;
use ldap_auth_ldap::verifier::{LdapVerifier, PerCallVerifier};
use ldap_auth_test_fixtures::directory::{entry, FakeConnector, FakeDirectory, SearchCall};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::sync::Arc;

const PASSWORD: &str = "secret";
const BASE_DN: &str = "ou=users,dc=example,dc=org";
const LOCKED: &str = "80090308: LdapErr: DSID-0C09044E, comment: AcceptSecurityContext error, data 775, v2580";

#[fixture]
fn builder() -> DirectoryConfigBuilder {
    DirectoryConfig::builder()
        .host("localhost")
        .domain(Some("example.org".to_string()))
        .base_dn(Constant(BASE_DN.to_string()).into())
}

#[fixture]
fn jdoe() -> FakeDirectory {
    FakeDirectory::default()
        .with_account("jdoe@example.org", PASSWORD)
        .with_entry(
            "(userPrincipalName=jdoe@example.org)",
            entry(
                "cn=jdoe,ou=users,dc=example,dc=org",
                vec![
                    ("cn", vec!["jdoe"]),
                    ("mail", vec!["jdoe@example.org", "john.doe@example.org"]),
                ],
            ),
        )
}

async fn open(builder: DirectoryConfigBuilder, directory: &FakeDirectory) -> LdapVerifier {
    LdapVerifier::open(
        Arc::new(builder.build().unwrap()),
        Arc::new(FakeConnector::new(directory.clone())),
    )
    .await
    .unwrap()
}

#[rstest]
#[case("", PASSWORD)]
#[case("jdoe", "")]
#[case("", "")]
#[test_log::test(tokio::test)]
async fn incomplete_credentials_skip_the_directory(
    builder: DirectoryConfigBuilder,
    jdoe: FakeDirectory,
    #[case] username: &str,
    #[case] password: &str,
) {
    let connector = Arc::new(FakeConnector::new(jdoe.clone()));
    let uut = PerCallVerifier::new(Arc::new(builder.build().unwrap()), connector.clone());

    let actual = uut
        .authenticate(&Credentials::new(username, password), &FlashBuffer::default())
        .await;

    assert!(matches!(actual, Err(AuthFailure::MissingCredentials)));
    assert_eq!(0, connector.connects());
    assert!(jdoe.binds().is_empty());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn bare_username_is_qualified_with_domain(
    builder: DirectoryConfigBuilder,
    jdoe: FakeDirectory,
) {
    let uut = open(builder, &jdoe).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert!(actual.is_ok());
    assert_eq!(vec!["jdoe@example.org".to_string()], jdoe.binds());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn found_entry_is_returned_exactly(builder: DirectoryConfigBuilder, jdoe: FakeDirectory) {
    let uut = open(builder, &jdoe).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await
        .unwrap();

    assert_eq!(
        entry(
            "cn=jdoe,ou=users,dc=example,dc=org",
            vec![
                ("cn", vec!["jdoe"]),
                ("mail", vec!["jdoe@example.org", "john.doe@example.org"]),
            ],
        ),
        actual
    );
    assert_eq!(
        vec![SearchCall {
            base_dn: BASE_DN.to_string(),
            filter: "(userPrincipalName=jdoe@example.org)".to_string(),
            attributes: vec!["*".to_string()],
        }],
        jdoe.searches()
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn entry_without_attributes_is_a_match(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default()
        .with_account("jdoe@example.org", PASSWORD)
        .with_entry(
            "(userPrincipalName=jdoe@example.org)",
            entry("cn=jdoe,ou=users,dc=example,dc=org", vec![]),
        );
    let uut = open(builder, &directory).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await
        .unwrap();

    assert!(actual.is_empty());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn empty_search_result_is_not_found(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().with_account("jdoe@example.org", PASSWORD);
    let uut = open(builder, &directory).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert!(matches!(actual, Err(AuthFailure::NotFound)));
}

#[rstest]
#[test_log::test(tokio::test)]
async fn alternate_domains_are_tried_in_order(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default()
        .with_account("jdoe@legacy.example.org", PASSWORD)
        .with_entry(
            "(userPrincipalName=jdoe@legacy.example.org)",
            entry("cn=jdoe,ou=legacy,dc=example,dc=org", vec![("cn", vec!["jdoe"])]),
        );
    let builder = builder.alternate_domains(vec![
        "corp.example.org".to_string(),
        "legacy.example.org".to_string(),
        "unused.example.org".to_string(),
    ]);
    let uut = open(builder, &directory).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await
        .unwrap();

    assert_eq!("cn=jdoe,ou=legacy,dc=example,dc=org", actual.dn);
    assert_eq!(
        vec![
            "jdoe@example.org".to_string(),
            "jdoe@corp.example.org".to_string(),
            "jdoe@legacy.example.org".to_string(),
        ],
        directory.binds()
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn exhausted_alternate_domains_are_not_found(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default();
    let builder = builder.alternate_domains(vec![
        "corp.example.org".to_string(),
        "legacy.example.org".to_string(),
    ]);
    let uut = open(builder, &directory).await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert!(matches!(actual, Err(AuthFailure::NotFound)));
    assert_eq!(3, directory.binds().len());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn qualified_username_skips_alternate_domains(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default();
    let builder = builder.alternate_domains(vec!["corp.example.org".to_string()]);
    let uut = open(builder, &directory).await;

    let actual = uut
        .authenticate(
            &Credentials::new("jdoe@other.org", PASSWORD),
            &FlashBuffer::default(),
        )
        .await;

    assert!(matches!(actual, Err(AuthFailure::NotFound)));
    assert_eq!(vec!["jdoe@other.org".to_string()], directory.binds());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn resolvers_see_fixed_domain_on_every_attempt(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().with_account("jdoe@corp.example.org", PASSWORD);
    let builder = builder
        .alternate_domains(vec!["corp.example.org".to_string()])
        .base_dn(
            Computed::new(|_, domain| format!("domain={}", domain.unwrap_or_default())).into(),
        );
    let uut = open(builder, &directory).await;

    let _ = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert_eq!(
        vec![
            "jdoe@example.org".to_string(),
            "jdoe@corp.example.org".to_string(),
        ],
        directory.binds()
    );
    assert_eq!(
        vec!["domain=example.org".to_string()],
        directory
            .searches()
            .into_iter()
            .map(|search| search.base_dn)
            .collect::<Vec<_>>()
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn bind_dn_template_escapes_identity(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default();
    let builder = builder
        .domain(None)
        .bind_dn(dn_template("cn={{ user }},ou=users,dc=example,dc=org").unwrap());
    let uut = open(builder, &directory).await;

    let _ = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert_eq!(
        vec!["cn=jdoe,ou=users,dc=example,dc=org".to_string()],
        directory.binds()
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn matching_diagnostic_is_flashed(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().rejecting_with(LOCKED);
    let builder = builder.errors(vec![
        ("data 775".to_string(), "Your account is locked".to_string()),
        ("data 532".to_string(), "Your password has expired".to_string()),
        ("AcceptSecurityContext".to_string(), "Login rejected".to_string()),
    ]);
    let uut = open(builder, &directory).await;
    let flash = FlashBuffer::default();

    let actual = uut
        .authenticate(&Credentials::new("jdoe", "wrong"), &flash)
        .await;

    assert!(matches!(actual, Err(AuthFailure::NotFound)));
    let config = FlashConfig::default();
    assert_eq!(
        vec![
            config.message("Your account is locked"),
            config.message("Login rejected"),
        ],
        flash.take()["flash"]
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn unmatched_diagnostic_is_not_flashed(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().rejecting_with("52e: invalid credentials");
    let builder = builder.errors(vec![(
        "data 775".to_string(),
        "Your account is locked".to_string(),
    )]);
    let uut = open(builder, &directory).await;
    let flash = FlashBuffer::default();

    let _ = uut
        .authenticate(&Credentials::new("jdoe", "wrong"), &flash)
        .await;

    assert!(flash.take().is_empty());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn flash_routing_is_configurable(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().rejecting_with(LOCKED);
    let flash_config = FlashConfig {
        key: "auth".to_string(),
        element: "Flash/warning".to_string(),
        ..FlashConfig::default()
    };
    let builder = builder
        .errors(vec![(
            "data 775".to_string(),
            "Your account is locked".to_string(),
        )])
        .flash(flash_config.clone());
    let uut = open(builder, &directory).await;
    let flash = FlashBuffer::default();

    let _ = uut
        .authenticate(&Credentials::new("jdoe", "wrong"), &flash)
        .await;

    assert_eq!(
        vec![flash_config.message("Your account is locked")],
        flash.take()["auth"]
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn failing_search_is_reported(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default()
        .with_account("jdoe@example.org", PASSWORD)
        .failing_search("size limit exceeded");
    let builder = builder.errors(vec![(
        "size limit".to_string(),
        "Directory is busy".to_string(),
    )]);
    let uut = open(builder, &directory).await;
    let flash = FlashBuffer::default();

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &flash)
        .await;

    assert!(matches!(actual, Err(AuthFailure::SearchFailed)));
    assert_eq!(
        vec![FlashConfig::default().message("Directory is busy")],
        flash.take()["flash"]
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn concurrent_logins_do_not_interleave(builder: DirectoryConfigBuilder, jdoe: FakeDirectory) {
    let directory = jdoe.with_account("asmith@example.org", PASSWORD).yielding();
    let uut = open(builder, &directory).await;
    let jdoe = Credentials::new("jdoe", PASSWORD);
    let asmith = Credentials::new("asmith", PASSWORD);
    let flash = FlashBuffer::default();

    let (first, second) = tokio::join!(
        uut.authenticate(&jdoe, &flash),
        uut.authenticate(&asmith, &flash)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(AuthFailure::NotFound)));
    assert_eq!(
        vec![
            "bind jdoe@example.org".to_string(),
            "search (userPrincipalName=jdoe@example.org)".to_string(),
            "bind asmith@example.org".to_string(),
            "search (userPrincipalName=asmith@example.org)".to_string(),
        ],
        directory.operations()
    );
}

#[rstest]
#[test_log::test(tokio::test)]
async fn unconnected_verifier_refuses(builder: DirectoryConfigBuilder, jdoe: FakeDirectory) {
    let uut = LdapVerifier::new(
        Arc::new(builder.build().unwrap()),
        Arc::new(FakeConnector::new(jdoe)),
    );

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert!(matches!(
        actual,
        Err(AuthFailure::Connection(ConnectionError::NotConnected))
    ));
}

#[rstest]
#[test_log::test(tokio::test)]
async fn closed_verifier_refuses(builder: DirectoryConfigBuilder, jdoe: FakeDirectory) {
    let uut = open(builder, &jdoe).await;
    uut.close().await;

    let actual = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;

    assert!(matches!(
        actual,
        Err(AuthFailure::Connection(ConnectionError::Closed))
    ));
    assert!(matches!(uut.connect().await, Err(ConnectionError::Closed)));
}

#[rstest]
#[test_log::test(tokio::test)]
async fn unreachable_directory_is_reported(builder: DirectoryConfigBuilder) {
    let actual = LdapVerifier::open(
        Arc::new(builder.build().unwrap()),
        Arc::new(FakeConnector::unreachable()),
    )
    .await;

    assert!(matches!(actual.err(), Some(ConnectionError::Unreachable)));
}

#[rstest]
#[test_log::test(tokio::test)]
async fn closing_twice_unbinds_once(builder: DirectoryConfigBuilder, jdoe: FakeDirectory) {
    let uut = open(builder, &jdoe).await;

    uut.close().await;
    uut.close().await;

    assert_eq!(1, jdoe.unbinds());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn closing_unconnected_verifier_is_harmless(
    builder: DirectoryConfigBuilder,
    jdoe: FakeDirectory,
) {
    let connector = Arc::new(FakeConnector::new(jdoe.clone()));
    let uut = LdapVerifier::new(Arc::new(builder.build().unwrap()), connector.clone());

    uut.close().await;
    uut.close().await;

    assert_eq!(0, connector.connects());
    assert_eq!(0, jdoe.unbinds());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn failing_unbind_is_swallowed(builder: DirectoryConfigBuilder) {
    let directory = FakeDirectory::default().failing_unbind();
    let uut = open(builder.log_errors(true), &directory).await;

    uut.close().await;
    uut.close().await;

    assert_eq!(1, directory.unbinds());
}

#[rstest]
#[test_log::test(tokio::test)]
async fn per_call_verifier_closes_every_connection(
    builder: DirectoryConfigBuilder,
    jdoe: FakeDirectory,
) {
    let connector = Arc::new(FakeConnector::new(jdoe.clone()));
    let uut = PerCallVerifier::new(Arc::new(builder.build().unwrap()), connector.clone());

    let first = uut
        .authenticate(&Credentials::new("jdoe", PASSWORD), &FlashBuffer::default())
        .await;
    let second = uut
        .authenticate(&Credentials::new("jdoe", "wrong"), &FlashBuffer::default())
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AuthFailure::NotFound)));
    assert_eq!(2, connector.connects());
    assert_eq!(2, jdoe.unbinds());
}
