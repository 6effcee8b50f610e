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
//! # Handshake errors

use thiserror::Error;

/// Errors of the input handshake. All of them are detected before any
/// verification is attempted.
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// Reading the input stream failed.
    #[error("reading the handshake failed: {source}")]
    Io {
        /// The source of the error.
        #[from]
        source: std::io::Error,
    },

    /// Field missing (or empty) at the end of the input.
    #[error("{0} is missing")]
    MissingField(&'static str),

    /// Field value longer than the line buffer.
    #[error("{field} exceeds {max} bytes")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Line buffer size.
        max: usize,
    },

    /// Field value is not valid UTF-8.
    #[error("{0} is not valid UTF-8")]
    InvalidEncoding(&'static str),

    /// The user name addresses a realm explicitly.
    #[error("user name must not contain a realm")]
    RealmDelimiter,

    /// Unsupported command line argument.
    #[error("error parsing commandline options: {0}")]
    InvalidArgument(String),

    /// The composed `name/instance` is too long.
    #[error("user name with instance exceeds {max} bytes")]
    PrincipalTooLong {
        /// The configured bound.
        max: usize,
    },
}
