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
//! # krb5check
//!
//! Verify the password received through the `ClientAuthname: ` /
//! `ClientPassword: ` handshake on stdin against the Kerberos realm.
//!
//! On success `User:<name>[/<instance>]` is printed to stdout. Every failure
//! prints a single line to stderr. The exit status tells the failures apart:
//!
//! | status | meaning |
//! |--------|---------|
//! | 0      | authenticated |
//! | 1      | bad password |
//! | 2      | unknown user |
//! | 3      | configuration or input error, nothing was verified |
//! | 4      | the realm could not be asked |
use std::io;
use std::process::ExitCode;

use secrecy::SecretString;
use tracing::debug;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};

use krb5check::config::Config;
use krb5check::error::Krb5CheckError;
use krb5check::handshake::{HandshakeReader, parse_instance_argument};
use krb5check::realm::RealmProvider;
use krb5check::verifier::{VerificationOutcome, Verifier, diagnostic, reported_identity};

fn main() -> ExitCode {
    ExitCode::from(run().exit_code())
}

fn run() -> VerificationOutcome {
    let config = match Config::new(Config::path_from_env()) {
        Ok(config) => config,
        Err(err) => {
            let outcome = VerificationOutcome::ConfigurationError(diagnostic(format!("{err:#}")));
            report(None, &outcome);
            return outcome;
        }
    };

    init_logging(&config);

    let (identity, password, realm) = match prepare(&config) {
        Ok(prepared) => prepared,
        Err(err) => {
            let outcome = VerificationOutcome::ConfigurationError(diagnostic(&err));
            report(None, &outcome);
            return outcome;
        }
    };

    let outcome = verify(&config, realm, &identity, password);
    report(Some(&identity), &outcome);
    outcome
}

fn init_logging(config: &Config) {
    let filter = Targets::new().with_default(if config.default.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    });

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(log_layer).init();
}

/// Everything that can go wrong before the realm is asked.
fn prepare(config: &Config) -> Result<(String, SecretString, RealmProvider), Krb5CheckError> {
    // The input is consumed entirely before the arguments are looked at.
    let credentials =
        HandshakeReader::new(io::stdin().lock(), config.handshake.max_line_length)
            .read_credentials()?;
    let instance = parse_instance_argument(std::env::args_os().skip(1))?;
    let identity =
        credentials.identity_text(instance.as_ref(), config.verifier.max_principal_length)?;
    debug!(%identity, "received credentials");
    let realm = RealmProvider::new(config)?;
    Ok((identity, credentials.into_password(), realm))
}

fn verify(
    config: &Config,
    realm: RealmProvider,
    identity: &str,
    password: SecretString,
) -> VerificationOutcome {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            drop(password);
            return VerificationOutcome::ProtocolError(diagnostic(Krb5CheckError::from(err)));
        }
    };
    let verifier = Verifier::new(config, realm);
    runtime.block_on(verifier.verify(identity, password))
}

fn report(identity: Option<&str>, outcome: &VerificationOutcome) {
    let identity = identity.unwrap_or_default();
    if outcome.is_authenticated() {
        println!("User:{identity}");
        return;
    }
    let identity = reported_identity(identity);
    match outcome {
        VerificationOutcome::Authenticated => {}
        VerificationOutcome::BadSecret => {
            eprintln!("Failure validating password: bad password for \"{identity}\"")
        }
        VerificationOutcome::UnknownIdentity => {
            eprintln!("Failure validating password: unknown user \"{identity}\"")
        }
        VerificationOutcome::ProtocolError(detail) => eprintln!(
            "Failure validating password: error checking Kerberos password for \"{identity}\": {detail}"
        ),
        VerificationOutcome::ConfigurationError(detail) => eprintln!("Error: {detail}"),
    }
}
