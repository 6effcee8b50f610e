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
//! End-to-end tests of the `krb5check` binary against a scripted kinit.
#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::OnceLock;

use tempfile::TempDir;

const FAKE_KINIT: &str = r#"#!/bin/sh
[ -n "$FAKE_KINIT_LOG" ] && echo "$@" >> "$FAKE_KINIT_LOG"
for arg in "$@"; do principal="$arg"; done
IFS= read -r password
case "$principal" in
    alice@EXAMPLE.COM|alice/admin@EXAMPLE.COM)
        [ "$password" = "correct-secret" ] && exit 0
        echo "kinit: Password incorrect while getting initial credentials" >&2
        ;;
    down@EXAMPLE.COM)
        echo "kinit: Cannot contact any KDC for realm 'EXAMPLE.COM' while getting initial credentials" >&2
        ;;
    *)
        echo "kinit: Client '$principal' not found in Kerberos database while getting initial credentials" >&2
        ;;
esac
exit 1
"#;

/// Install the fake kinit once per test binary.
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

struct Run {
    output: Output,
    invocations: Option<String>,
}

impl Run {
    fn code(&self) -> i32 {
        self.output.status.code().unwrap()
    }

    fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }
}

fn krb5check(args: &[&str], input: &str) -> Run {
    let workdir = TempDir::new().unwrap();
    let log = workdir.path().join("invocations");
    let mut child = Command::new(env!("CARGO_BIN_EXE_krb5check"))
        .args(args)
        .env("KRB5CHECK_CONFIG", Path::new("/nonexistent/krb5check.conf"))
        .env("KRB5CHECK__REALM__DEFAULT_REALM", "EXAMPLE.COM")
        .env("KRB5CHECK__REALM__KINIT_PATH", fake_kinit())
        .env("FAKE_KINIT_LOG", &log)
        .env_remove("KRB5CHECK__DEFAULT__DEBUG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    Run {
        output,
        invocations: std::fs::read_to_string(&log).ok(),
    }
}

const ALICE: &str = "ClientAuthname: alice\nClientPassword: correct-secret\n";

#[test]
fn test_authenticated() {
    let run = krb5check(&[], ALICE);
    assert_eq!(0, run.code(), "{}", run.stderr());
    assert_eq!("User:alice\n", run.stdout());
    let invocations = run.invocations.unwrap();
    assert!(invocations.contains("-S krbtgt/EXAMPLE.COM@EXAMPLE.COM alice@EXAMPLE.COM"));
    assert!(invocations.contains("-l 300s"));
    assert!(!invocations.contains("correct-secret"));
}

#[test]
fn test_authenticated_with_instance() {
    let run = krb5check(&["--instance=admin"], ALICE);
    assert_eq!(0, run.code(), "{}", run.stderr());
    assert_eq!("User:alice/admin\n", run.stdout());
}

#[test]
fn test_lines_in_any_order() {
    let run = krb5check(
        &[],
        "ClientPassword: correct-secret\r\nSomething: else\nClientAuthname: alice\r\n",
    );
    assert_eq!(0, run.code(), "{}", run.stderr());
    assert_eq!("User:alice\n", run.stdout());
}

#[test]
fn test_bad_password() {
    let run = krb5check(&[], "ClientAuthname: alice\nClientPassword: wrong-secret\n");
    assert_eq!(1, run.code());
    assert!(run.stdout().is_empty());
    assert!(run.stderr().contains("bad password"), "{}", run.stderr());
    assert!(!run.stderr().contains("wrong-secret"));
}

#[test]
fn test_unknown_user() {
    let run = krb5check(&[], "ClientAuthname: ghost\nClientPassword: secret\n");
    assert_eq!(2, run.code());
    assert!(run.stderr().contains("unknown user \"ghost\""), "{}", run.stderr());
}

#[test]
fn test_realm_unreachable() {
    let run = krb5check(&[], "ClientAuthname: down\nClientPassword: secret\n");
    assert_eq!(4, run.code());
    assert!(run.stderr().contains("Cannot contact any KDC"), "{}", run.stderr());
}

#[test]
fn test_foreign_realm_is_never_verified() {
    let run = krb5check(
        &[],
        "ClientAuthname: alice@OTHERREALM\nClientPassword: correct-secret\n",
    );
    assert_eq!(3, run.code());
    assert!(run.stdout().is_empty());
    assert!(run.invocations.is_none(), "kinit must not run");
}

#[test]
fn test_missing_password() {
    let run = krb5check(&[], "ClientAuthname: alice\n");
    assert_eq!(3, run.code());
    assert!(run.stderr().starts_with("Error: "), "{}", run.stderr());
    assert!(run.invocations.is_none());
}

#[test]
fn test_invalid_argument() {
    for args in [
        &["--instance", "admin"][..],
        &["--realm=EXAMPLE.COM"][..],
        &["--instance=a@b"][..],
        &["--"][..],
        &["--instance=admin", "--"][..],
    ] {
        let run = krb5check(args, ALICE);
        assert_eq!(3, run.code(), "{args:?}");
        assert!(run.invocations.is_none());
    }
}

#[test]
fn test_invalid_argument_after_large_input() {
    // Far more than a pipe buffer; the whole input is still consumed.
    let mut input = "X-Padding: ".to_string() + &"p".repeat(80) + "\n";
    input = input.repeat(4096);
    input.push_str(ALICE);
    let run = krb5check(&["--"], &input);
    assert_eq!(3, run.code());
    assert!(run.invocations.is_none());
}

#[test]
fn test_reported_identity_is_bounded() {
    let name = "u".repeat(900);
    let run = krb5check(
        &[],
        &format!("ClientAuthname: {name}\nClientPassword: secret\n"),
    );
    assert_eq!(2, run.code());
    let stderr = run.stderr();
    assert_eq!(1, stderr.lines().count(), "{stderr}");
    assert!(stderr.len() < 200, "{stderr}");
    assert!(stderr.contains(&"u".repeat(100)));
    assert!(!stderr.contains(&"u".repeat(101)));
}
