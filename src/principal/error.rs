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
//! # Principal errors

use thiserror::Error;

/// Errors produced while constructing a principal from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Nothing to parse.
    #[error("identity is empty")]
    Empty,

    /// A name component is empty (i.e. `alice/`).
    #[error("{0} component of the identity is empty")]
    EmptyComponent(&'static str),

    /// Realm delimiter supplied by the caller. Cross-realm addressing is
    /// never accepted.
    #[error("identity must not contain the realm delimiter '@'")]
    RealmDelimiter,

    /// More than one instance component.
    #[error("identity must contain at most one instance component")]
    TooManyComponents,

    /// Character that would corrupt the principal parsing.
    #[error("identity contains an illegal character {0:?}")]
    IllegalCharacter(char),

    /// Composed identity exceeds the configured bound.
    #[error("identity is longer than {max} bytes")]
    TooLong {
        /// The configured bound.
        max: usize,
    },

    /// Realm is empty or malformed.
    #[error("invalid realm name {0:?}")]
    InvalidRealm(String),
}
