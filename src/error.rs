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
//! # Error
//!
//! Errors that end an invocation before the realm is asked. Failures of the
//! verification itself are classified by the verifier instead.
use thiserror::Error;

use crate::handshake::HandshakeError;
use crate::realm::RealmProviderError;

/// krb5check error.
#[derive(Debug, Error)]
pub enum Krb5CheckError {
    #[error(transparent)]
    Handshake {
        #[from]
        source: HandshakeError,
    },

    /// Realm provider error.
    #[error(transparent)]
    RealmProvider {
        /// The source of the error.
        #[from]
        source: RealmProviderError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },
}

/// Builder error.
///
/// Shared error type of the `derive_builder` generated builders.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// A required field has not been set.
    #[error("{0}")]
    UninitializedField(String),

    /// Custom validation error.
    #[error("{0}")]
    Validation(String),
}

impl From<derive_builder::UninitializedFieldError> for BuilderError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        Self::UninitializedField(value.to_string())
    }
}

impl From<String> for BuilderError {
    fn from(value: String) -> Self {
        Self::Validation(value)
    }
}
