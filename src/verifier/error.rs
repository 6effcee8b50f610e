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

use thiserror::Error;

use crate::error::BuilderError;
use crate::principal::IdentityError;
use crate::realm::{KdcErrorCode, RealmProviderError};
use crate::verifier::types::{VerificationOutcome, diagnostic};

#[derive(Error, Debug)]
pub enum VerifierError {
    /// Identity text is not a valid principal name.
    #[error(transparent)]
    Identity {
        #[from]
        source: IdentityError,
    },

    /// Realm provider error.
    #[error(transparent)]
    RealmProvider {
        /// The source of the error.
        #[from]
        source: RealmProviderError,
    },

    #[error("building the ticket request: {source}")]
    RequestBuilder {
        #[from]
        source: BuilderError,
    },

    /// The configured lifetime cannot be represented.
    #[error("invalid ticket lifetime {0}s")]
    InvalidLifetime(u64),
}

impl From<VerifierError> for VerificationOutcome {
    fn from(value: VerifierError) -> Self {
        match value {
            VerifierError::RealmProvider { source } => match source {
                RealmProviderError::Kdc { code, .. } => match code {
                    KdcErrorCode::BadIntegrity | KdcErrorCode::PreauthFailed => Self::BadSecret,
                    KdcErrorCode::ClientPrincipalUnknown => Self::UnknownIdentity,
                    KdcErrorCode::ClockSkew
                    | KdcErrorCode::KdcUnreachable
                    | KdcErrorCode::PasswordExpired
                    | KdcErrorCode::ClientRevoked
                    | KdcErrorCode::Generic => Self::ProtocolError(diagnostic(&source)),
                },
                RealmProviderError::UnsupportedDriver(_)
                | RealmProviderError::DefaultRealmUnknown(_)
                | RealmProviderError::Profile { .. }
                | RealmProviderError::InvalidRealm { .. } => {
                    Self::ConfigurationError(diagnostic(&source))
                }
                RealmProviderError::Spawn { .. }
                | RealmProviderError::Io { .. }
                | RealmProviderError::Timeout(_) => Self::ProtocolError(diagnostic(&source)),
            },
            VerifierError::Identity { .. }
            | VerifierError::RequestBuilder { .. }
            | VerifierError::InvalidLifetime(_) => Self::ConfigurationError(diagnostic(&value)),
        }
    }
}
