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
//! # Credential verifier
//!
//! Decides whether a secret is valid for an identity by asking the realm for
//! a short lived, non renewable initial ticket for the identity's principal
//! addressed to the ticket-granting service of the same realm. Whatever
//! happens, the result is one [`VerificationOutcome`]; raw errors never leave
//! the verifier.

use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use tracing::{debug, info};

pub mod error;
pub mod types;

use crate::config::Config;
use crate::principal::{PrincipalName, ServiceTarget};
use crate::realm::{CredentialMaterial, InitialTicketRequest, RealmApi};

pub use error::VerifierError;
pub use types::*;

/// Credential verifier bound to an initialized realm context.
#[derive(Clone, Debug)]
pub struct Verifier<R> {
    realm: R,
    ticket_lifetime: u64,
    max_principal_length: usize,
}

impl<R: RealmApi> Verifier<R> {
    pub fn new(config: &Config, realm: R) -> Self {
        Self {
            realm,
            ticket_lifetime: config.verifier.ticket_lifetime,
            max_principal_length: config.verifier.max_principal_length,
        }
    }

    /// Verify the secret of the identity (`primary[/instance]`).
    ///
    /// The secret is consumed and dropped before returning. The credential
    /// material of a successful exchange is dropped as well; only the
    /// outcome survives.
    #[tracing::instrument(level = "info", skip(self, secret))]
    pub async fn verify(&self, identity_text: &str, secret: SecretString) -> VerificationOutcome {
        let outcome = match self.request_ticket(identity_text, secret).await {
            Ok(material) => {
                debug!(expires_at = %material.expires_at(), "initial ticket issued");
                drop(material);
                VerificationOutcome::Authenticated
            }
            Err(err) => VerificationOutcome::from(err),
        };
        if outcome.is_authenticated() {
            info!("credentials verified");
        } else {
            info!("verification failed: {outcome}");
        }
        outcome
    }

    async fn request_ticket(
        &self,
        identity_text: &str,
        secret: SecretString,
    ) -> Result<CredentialMaterial, VerifierError> {
        let name = PrincipalName::parse(identity_text, self.max_principal_length)?;
        let realm = self.realm.resolve_default_realm(name.primary()).await?;
        let server = ServiceTarget::ticket_granting(&realm);
        let client = name.in_realm(realm);

        let lifetime = i64::try_from(self.ticket_lifetime)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(VerifierError::InvalidLifetime(self.ticket_lifetime))?;
        let start_time = Utc::now();
        let request = InitialTicketRequest::builder()
            .client(client)
            .server(server)
            .start_time(start_time)
            .end_time(start_time + lifetime)
            .build()?;

        debug!(client = %request.client, server = %request.server, "requesting initial ticket");
        Ok(self.realm.request_initial_ticket(&request, secret).await?)
    }
}
