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
//! # Realm provider error

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::principal::IdentityError;
use crate::realm::types::KdcErrorCode;

#[derive(Error, Debug)]
pub enum RealmProviderError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// Neither the configuration nor the Kerberos profile names a realm.
    #[error("no default realm configured in {}", .0.display())]
    DefaultRealmUnknown(PathBuf),

    /// Kerberos profile cannot be read.
    #[error("reading Kerberos profile {}: {source}", path.display())]
    Profile {
        /// Profile location.
        path: PathBuf,
        /// The source of the error.
        source: std::io::Error,
    },

    /// Configured or resolved realm is malformed.
    #[error(transparent)]
    InvalidRealm {
        /// The source of the error.
        #[from]
        source: IdentityError,
    },

    /// The KDC (or the library talking to it) refused the request.
    #[error("{code}: {detail}")]
    Kdc {
        /// Classified failure.
        code: KdcErrorCode,
        /// Diagnostic message as reported by the exchange.
        detail: String,
    },

    /// The exchange program cannot be started.
    #[error("cannot execute {}: {source}", program.display())]
    Spawn {
        /// Program location.
        program: PathBuf,
        /// The source of the error.
        source: std::io::Error,
    },

    #[error("exchange with the realm failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The exchange did not finish in time.
    #[error("no response from the realm within {}s", .0.as_secs())]
    Timeout(Duration),
}
