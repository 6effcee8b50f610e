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

use std::fmt;

/// Upper bound (in characters) of a diagnostic carried by an outcome.
pub const MAX_DIAGNOSTIC_LENGTH: usize = 128;

/// Terminal result of a single verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The realm issued a ticket for the identity and the secret.
    Authenticated,
    /// The identity exists, the secret is wrong.
    BadSecret,
    /// The realm does not know the identity.
    UnknownIdentity,
    /// The realm could not be reached or answered unexpectedly.
    ProtocolError(String),
    /// Caller misuse or broken local setup. No verification was attempted.
    ConfigurationError(String),
}

impl VerificationOutcome {
    /// Process exit status reporting the outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Authenticated => 0,
            Self::BadSecret => 1,
            Self::UnknownIdentity => 2,
            Self::ConfigurationError(_) => 3,
            Self::ProtocolError(_) => 4,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::BadSecret => f.write_str("bad password"),
            Self::UnknownIdentity => f.write_str("unknown user"),
            Self::ProtocolError(detail) => write!(f, "protocol error: {detail}"),
            Self::ConfigurationError(detail) => write!(f, "configuration error: {detail}"),
        }
    }
}

/// Upper bound (in characters) of an identity echoed in a report.
pub const MAX_REPORTED_IDENTITY_LENGTH: usize = 100;

/// Render a bounded single line diagnostic.
///
/// Control characters are replaced with spaces and the text is cut after
/// [`MAX_DIAGNOSTIC_LENGTH`] characters.
pub fn diagnostic<D: fmt::Display>(value: D) -> String {
    single_line(value, MAX_DIAGNOSTIC_LENGTH)
}

/// Render the identity for a report, cut after
/// [`MAX_REPORTED_IDENTITY_LENGTH`] characters.
pub fn reported_identity(identity: &str) -> String {
    single_line(identity, MAX_REPORTED_IDENTITY_LENGTH)
}

fn single_line<D: fmt::Display>(value: D, max: usize) -> String {
    value
        .to_string()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(max)
        .collect::<String>()
        .trim_end()
        .to_string()
}
