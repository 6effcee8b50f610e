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
//! Kerberos V password verification for line oriented authentication
//! handshakes. A calling system (typically an authentication hook of a
//! network service) writes the credentials it received to the stdin of the
//! checker:
//!
//! ```text
//! ClientAuthname: alice
//! ClientPassword: correct-secret
//! ```
//!
//! The checker asks the KDC of the realm for a short lived, non renewable
//! initial ticket for `alice@REALM` addressed to `krbtgt/REALM@REALM`. Being
//! issued a ticket proves the password; the ticket itself is discarded.
//! An optional `--instance=<value>` argument turns the checked principal
//! into `alice/<value>@REALM`.
//!
//! The crate is structured the following way:
//!
//! - [`handshake`] reads the credentials from the input and the instance
//!   from the arguments.
//!
//! - [`principal`] is the principal model (names, instances, realms and the
//!   ticket-granting service target).
//!
//! - [`realm`] is the authentication context: realm resolution and the
//!   initial ticket exchange, behind the [`realm::RealmApi`] trait.
//!
//! - [`verifier`] drives the verification and classifies its result into a
//!   [`verifier::VerificationOutcome`], each with a distinct exit status.

pub mod config;
pub mod error;
pub mod handshake;
pub mod principal;
pub mod realm;
pub mod verifier;
