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

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use derive_builder::Builder;
use secrecy::SecretString;

use crate::error::BuilderError;
use crate::principal::{Principal, Realm, ServiceTarget};
use crate::realm::RealmProviderError;

/// Authentication context of the realm.
///
/// Everything that requires talking Kerberos is behind this trait: the
/// message encoding, key derivation and transport are owned by the
/// implementation.
#[async_trait]
pub trait RealmApi: Send + Sync {
    /// Resolve the realm the principal with the given primary name belongs
    /// to.
    async fn resolve_default_realm<'a>(
        &self,
        primary: &'a str,
    ) -> Result<Realm, RealmProviderError>;

    /// Request an initial ticket for the client of the request with the
    /// given secret.
    ///
    /// The secret is consumed: it is dropped as soon as the exchange does
    /// not need it anymore, whatever the result is.
    async fn request_initial_ticket(
        &self,
        request: &InitialTicketRequest,
        secret: SecretString,
    ) -> Result<CredentialMaterial, RealmProviderError>;
}

/// Initial ticket (AS) request.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(error = "BuilderError", validate = "Self::validate"))]
#[builder(setter(into))]
pub struct InitialTicketRequest {
    /// Principal the ticket is requested for.
    pub client: Principal,

    /// Service the ticket is issued for.
    pub server: ServiceTarget,

    /// Ticket start time.
    pub start_time: DateTime<Utc>,

    /// Ticket end time.
    pub end_time: DateTime<Utc>,

    /// Renewal deadline. Unset requests a non renewable ticket.
    #[builder(default)]
    pub renew_till: Option<DateTime<Utc>>,
}

impl InitialTicketRequest {
    pub fn builder() -> InitialTicketRequestBuilder {
        InitialTicketRequestBuilder::default()
    }

    /// Requested ticket lifetime.
    pub fn lifetime(&self) -> TimeDelta {
        self.end_time - self.start_time
    }
}

impl InitialTicketRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && end <= start
        {
            return Err("ticket end time must be after the start time".into());
        }
        if let (Some(Some(renew_till)), Some(end)) = (self.renew_till, self.end_time)
            && renew_till < end
        {
            return Err("ticket renewal deadline must not precede the end time".into());
        }
        Ok(())
    }
}

/// Result of a successful initial ticket exchange.
///
/// Carries no key material itself: the ticket and the session key stay
/// inside the exchange and are destroyed with it. Dropping the value is the
/// end of the credential lifecycle.
#[derive(Debug)]
pub struct CredentialMaterial {
    client: Principal,
    server: ServiceTarget,
    expires_at: DateTime<Utc>,
}

impl CredentialMaterial {
    pub fn new(client: Principal, server: ServiceTarget, expires_at: DateTime<Utc>) -> Self {
        Self {
            client,
            server,
            expires_at,
        }
    }

    pub fn client(&self) -> &Principal {
        &self.client
    }

    pub fn server(&self) -> &ServiceTarget {
        &self.server
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Failure codes of the initial ticket exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KdcErrorCode {
    /// `KRB5KRB_AP_ERR_BAD_INTEGRITY`: the reply could not be decrypted with
    /// the key derived from the password.
    BadIntegrity,
    /// `KRB5KDC_ERR_PREAUTH_FAILED`: the KDC rejected the pre-authentication
    /// data encrypted with the key derived from the password.
    PreauthFailed,
    /// `KRB5KDC_ERR_C_PRINCIPAL_UNKNOWN`.
    ClientPrincipalUnknown,
    /// `KRB5KRB_AP_ERR_SKEW`.
    ClockSkew,
    /// `KRB5_KDC_UNREACH`.
    KdcUnreachable,
    /// `KRB5KDC_ERR_KEY_EXP`.
    PasswordExpired,
    /// `KRB5KDC_ERR_CLIENT_REVOKED`.
    ClientRevoked,
    /// Anything else.
    Generic,
}

impl fmt::Display for KdcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BadIntegrity => "decrypt integrity check failed",
            Self::PreauthFailed => "preauthentication failed",
            Self::ClientPrincipalUnknown => "client not found in Kerberos database",
            Self::ClockSkew => "clock skew too great",
            Self::KdcUnreachable => "cannot contact any KDC",
            Self::PasswordExpired => "password has expired",
            Self::ClientRevoked => "client credentials have been revoked",
            Self::Generic => "initial ticket request failed",
        })
    }
}
