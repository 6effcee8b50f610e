// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # kinit realm backend
//!
//! Performs the initial ticket exchange by running the `kinit` program of
//! the installed Kerberos implementation. The password is written to the
//! program's stdin and never appears on its command line. The credential
//! cache is a private `MEMORY:` cache of the child process, so the obtained
//! ticket vanishes together with the process.

use std::ffi::OsString;
use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{Config, KinitFlavor, RealmSection};
use crate::principal::Realm;
use crate::realm::backend::RealmBackend;
use crate::realm::types::*;
use crate::realm::{RealmProviderError, profile};

/// Known `kinit` diagnostics (lowercase) and the failure they report.
/// Covers the MIT and Heimdal wording.
const KINIT_DIAGNOSTICS: &[(&str, KdcErrorCode)] = &[
    ("decrypt integrity check failed", KdcErrorCode::BadIntegrity),
    ("password incorrect", KdcErrorCode::PreauthFailed),
    ("preauthentication failed", KdcErrorCode::PreauthFailed),
    ("not found in kerberos database", KdcErrorCode::ClientPrincipalUnknown),
    (") unknown", KdcErrorCode::ClientPrincipalUnknown),
    ("clock skew too great", KdcErrorCode::ClockSkew),
    ("cannot contact any kdc", KdcErrorCode::KdcUnreachable),
    ("cannot find kdc", KdcErrorCode::KdcUnreachable),
    ("unable to reach any kdc", KdcErrorCode::KdcUnreachable),
    ("password has expired", KdcErrorCode::PasswordExpired),
    ("credentials have been revoked", KdcErrorCode::ClientRevoked),
    ("client's entry in database has expired", KdcErrorCode::ClientRevoked),
];

#[derive(Clone, Debug, Default)]
pub struct KinitBackend {
    config: Config,
}

#[async_trait]
impl RealmBackend for KinitBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Read `default_realm` from the Kerberos profile.
    #[tracing::instrument(level = "debug", skip(self))]
    async fn resolve_default_realm<'a>(
        &self,
        _primary: &'a str,
    ) -> Result<Realm, RealmProviderError> {
        profile::default_realm(&self.config.realm.krb5_config).await
    }

    /// Run `kinit` for the client principal of the request.
    #[tracing::instrument(level = "debug", skip(self, request, secret))]
    async fn request_initial_ticket(
        &self,
        request: &InitialTicketRequest,
        secret: SecretString,
    ) -> Result<CredentialMaterial, RealmProviderError> {
        let realm = &self.config.realm;
        let ccache = format!("MEMORY:krb5check-{}", Uuid::new_v4().simple());

        let mut cmd = Command::new(&realm.kinit_path);
        cmd.args(kinit_args(realm, request, &ccache))
            .env("KRB5CCNAME", &ccache)
            .env("KRB5_CONFIG", &realm.krb5_config)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            program = %realm.kinit_path.display(),
            client = %request.client,
            "starting the initial ticket exchange"
        );
        let mut child = cmd.spawn().map_err(|source| RealmProviderError::Spawn {
            program: realm.kinit_path.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // kinit may already have given up (unknown option, missing
            // profile); its diagnostics tell more than a broken pipe.
            if let Err(err) = write_secret(&mut stdin, &secret).await {
                debug!("kinit did not read the password: {err}");
            }
        }
        drop(secret);

        let output = timeout(realm.timeout(), child.wait_with_output())
            .await
            .map_err(|_| {
                warn!("kinit did not finish within {}s", realm.timeout);
                RealmProviderError::Timeout(realm.timeout())
            })??;

        if output.status.success() {
            Ok(CredentialMaterial::new(
                request.client.clone(),
                request.server.clone(),
                request.end_time,
            ))
        } else if output.stderr.iter().all(u8::is_ascii_whitespace) {
            Err(RealmProviderError::Kdc {
                code: KdcErrorCode::Generic,
                detail: format!("kinit failed with {}", output.status),
            })
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }
}

/// Command line of the `kinit` invocation.
fn kinit_args(realm: &RealmSection, request: &InitialTicketRequest, ccache: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if realm.kinit_flavor == KinitFlavor::Heimdal {
        args.push("--password-file=STDIN".into());
    }
    // No addresses; the ticket is never presented anywhere.
    args.push("-A".into());
    args.push("-l".into());
    args.push(format!("{}s", request.lifetime().num_seconds()).into());
    args.push("-c".into());
    args.push(ccache.into());
    args.push("-S".into());
    args.push(request.server.to_string().into());
    args.push(request.client.to_string().into());
    args
}

async fn write_secret(stdin: &mut ChildStdin, secret: &SecretString) -> io::Result<()> {
    stdin.write_all(secret.expose_secret().as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Classify the diagnostics `kinit` printed on failure.
fn classify_failure(stderr: &str) -> RealmProviderError {
    let detail = stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("kinit: ").unwrap_or(line))
        .unwrap_or_default()
        .to_string();
    let lowercase = stderr.to_lowercase();
    let code = KINIT_DIAGNOSTICS
        .iter()
        .find(|(needle, _)| lowercase.contains(needle))
        .map_or(KdcErrorCode::Generic, |(_, code)| *code);
    RealmProviderError::Kdc { code, detail }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::sync::OnceLock;

    use chrono::{TimeDelta, Utc};
    use tracing_test::traced_test;

    use super::*;
    use crate::principal::{PrincipalName, ServiceTarget};

    /// Fake kinit. The principal is the last argument, the password comes
    /// on stdin.
    const FAKE_KINIT: &str = r#"#!/bin/sh
for arg in "$@"; do principal="$arg"; done
IFS= read -r password
case "$principal" in
    alice@EXAMPLE.COM|alice/admin@EXAMPLE.COM)
        if [ "$password" = "correct-secret" ]; then
            echo "Password for $principal: "
            exit 0
        fi
        echo "kinit: Password incorrect while getting initial credentials" >&2
        ;;
    bob@EXAMPLE.COM)
        echo "kinit: Decrypt integrity check failed while getting initial credentials" >&2
        ;;
    skew@EXAMPLE.COM)
        echo "kinit: Clock skew too great while getting initial credentials" >&2
        ;;
    slow@EXAMPLE.COM)
        sleep 10
        ;;
    mute@EXAMPLE.COM)
        ;;
    *)
        echo "kinit: Client '$principal' not found in Kerberos database while getting initial credentials" >&2
        ;;
esac
exit 1
"#;

    /// Install the fake kinit once per test binary. Doing it once avoids
    /// executing a file another thread still holds open for writing.
    fn fake_kinit() -> &'static PathBuf {
        static KINIT: OnceLock<PathBuf> = OnceLock::new();
        KINIT.get_or_init(|| {
            let dir = tempfile::tempdir().unwrap().keep();
            let path = dir.join("kinit");
            std::fs::write(&path, FAKE_KINIT).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        })
    }

    fn backend(timeout: u64) -> KinitBackend {
        let mut config = Config::default();
        config.realm.kinit_path = fake_kinit().clone();
        config.realm.timeout = timeout;
        let mut backend = KinitBackend::default();
        backend.set_config(config);
        backend
    }

    fn request(name: &str) -> InitialTicketRequest {
        let realm = Realm::new("EXAMPLE.COM").unwrap();
        let now = Utc::now();
        InitialTicketRequest::builder()
            .client(PrincipalName::parse(name, 1024).unwrap().in_realm(realm.clone()))
            .server(ServiceTarget::ticket_granting(&realm))
            .start_time(now)
            .end_time(now + TimeDelta::minutes(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_kinit_args() {
        let req = request("alice/admin");
        let args = kinit_args(&RealmSection::default(), &req, "MEMORY:test");
        assert_eq!(
            vec![
                "-A",
                "-l",
                "300s",
                "-c",
                "MEMORY:test",
                "-S",
                "krbtgt/EXAMPLE.COM@EXAMPLE.COM",
                "alice/admin@EXAMPLE.COM"
            ],
            args
        );
    }

    #[test]
    fn test_kinit_args_heimdal() {
        let realm = RealmSection {
            kinit_flavor: KinitFlavor::Heimdal,
            ..Default::default()
        };
        let args = kinit_args(&realm, &request("alice"), "MEMORY:test");
        assert_eq!(Some(&OsString::from("--password-file=STDIN")), args.first());
        assert_eq!(Some(&OsString::from("alice@EXAMPLE.COM")), args.last());
    }

    #[test]
    fn test_classify_failure() {
        for (stderr, expected) in [
            (
                "kinit: Password incorrect while getting initial credentials\n",
                KdcErrorCode::PreauthFailed,
            ),
            (
                "kinit: krb5_get_init_creds: Preauthentication failed\n",
                KdcErrorCode::PreauthFailed,
            ),
            (
                "kinit: Decrypt integrity check failed while getting initial credentials",
                KdcErrorCode::BadIntegrity,
            ),
            (
                "kinit: Client 'ghost@EXAMPLE.COM' not found in Kerberos database while getting initial credentials",
                KdcErrorCode::ClientPrincipalUnknown,
            ),
            (
                "kinit: krb5_get_init_creds: Client (ghost@EXAMPLE.COM) unknown",
                KdcErrorCode::ClientPrincipalUnknown,
            ),
            (
                "kinit: Cannot contact any KDC for realm 'EXAMPLE.COM' while getting initial credentials",
                KdcErrorCode::KdcUnreachable,
            ),
            (
                "kinit: Clock skew too great while getting initial credentials",
                KdcErrorCode::ClockSkew,
            ),
            (
                "kinit: Client's credentials have been revoked while getting initial credentials",
                KdcErrorCode::ClientRevoked,
            ),
            (
                "kinit: Improper format of Kerberos configuration file while initializing Kerberos 5 library",
                KdcErrorCode::Generic,
            ),
        ] {
            match classify_failure(stderr) {
                RealmProviderError::Kdc { code, detail } => {
                    assert_eq!(expected, code, "{stderr}");
                    assert!(!detail.starts_with("kinit: "));
                }
                other => panic!("unexpected classification {other:?}"),
            }
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_request_initial_ticket() {
        let req = request("alice");
        let material = backend(10)
            .request_initial_ticket(&req, SecretString::from("correct-secret"))
            .await
            .unwrap();
        assert_eq!(&req.client, material.client());
        assert_eq!(&req.server, material.server());
        assert_eq!(req.end_time, material.expires_at());
        assert!(!logs_contain("correct-secret"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_request_initial_ticket_wrong_password() {
        match backend(10)
            .request_initial_ticket(&request("alice"), SecretString::from("wrong-secret"))
            .await
        {
            Err(RealmProviderError::Kdc {
                code: KdcErrorCode::PreauthFailed,
                ..
            }) => {}
            other => panic!("wrong password must be refused: {other:?}"),
        }
        assert!(!logs_contain("wrong-secret"));
    }

    #[tokio::test]
    async fn test_request_initial_ticket_failures() {
        for (name, expected) in [
            ("bob", KdcErrorCode::BadIntegrity),
            ("ghost", KdcErrorCode::ClientPrincipalUnknown),
            ("skew", KdcErrorCode::ClockSkew),
            ("mute", KdcErrorCode::Generic),
        ] {
            match backend(10)
                .request_initial_ticket(&request(name), SecretString::from("secret"))
                .await
            {
                Err(RealmProviderError::Kdc { code, .. }) => assert_eq!(expected, code, "{name}"),
                other => panic!("{name}: unexpected result {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_request_initial_ticket_timeout() {
        match backend(1)
            .request_initial_ticket(&request("slow"), SecretString::from("secret"))
            .await
        {
            Err(RealmProviderError::Timeout(timeout)) => assert_eq!(1, timeout.as_secs()),
            other => panic!("slow exchange must time out: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_initial_ticket_missing_program() {
        let mut config = Config::default();
        config.realm.kinit_path = PathBuf::from("/nonexistent/kinit");
        let mut backend = KinitBackend::default();
        backend.set_config(config);
        match backend
            .request_initial_ticket(&request("alice"), SecretString::from("secret"))
            .await
        {
            Err(RealmProviderError::Spawn { program, .. }) => {
                assert_eq!(PathBuf::from("/nonexistent/kinit"), program);
            }
            other => panic!("missing kinit must fail: {other:?}"),
        }
    }
}
