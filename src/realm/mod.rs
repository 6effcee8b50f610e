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
//! # Realm provider
//!
//! The realm provider is the gateway to the Kerberos authentication context.
//! It answers two questions:
//!
//! ## Default realm
//!
//! Which realm a bare principal name belongs to. A realm configured in
//! `[realm] default_realm` wins, otherwise the backend consults the Kerberos
//! profile.
//!
//! ## Initial ticket exchange
//!
//! Whether the KDC of the realm issues an initial ticket for a client
//! principal and a password. The ticket itself is of no further interest and
//! is discarded by the backend.

use async_trait::async_trait;
use secrecy::SecretString;

pub mod backend;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod profile;
pub mod types;
#[cfg(test)]
pub use mock::MockRealmProvider;

use crate::config::Config;
use crate::principal::Realm;
use crate::realm::backend::{RealmBackend, kinit::KinitBackend};

pub use error::RealmProviderError;
pub use types::*;

#[derive(Clone, Debug)]
pub struct RealmProvider {
    backend_driver: Box<dyn RealmBackend>,
    default_realm: Option<Realm>,
}

impl RealmProvider {
    pub fn new(config: &Config) -> Result<Self, RealmProviderError> {
        let mut backend_driver: Box<dyn RealmBackend> = match config.realm.driver.as_str() {
            "kinit" => Box::new(KinitBackend::default()),
            _ => {
                return Err(RealmProviderError::UnsupportedDriver(
                    config.realm.driver.clone(),
                ));
            }
        };
        backend_driver.set_config(config.clone());
        let default_realm = config
            .realm
            .default_realm
            .as_deref()
            .map(Realm::new)
            .transpose()?;
        Ok(Self {
            backend_driver,
            default_realm,
        })
    }
}

#[async_trait]
impl RealmApi for RealmProvider {
    /// Resolve the realm of the principal
    #[tracing::instrument(level = "debug", skip(self))]
    async fn resolve_default_realm<'a>(
        &self,
        primary: &'a str,
    ) -> Result<Realm, RealmProviderError> {
        if let Some(realm) = &self.default_realm {
            return Ok(realm.clone());
        }
        self.backend_driver.resolve_default_realm(primary).await
    }

    /// Request the initial ticket
    #[tracing::instrument(level = "debug", skip(self, secret), fields(client = %request.client))]
    async fn request_initial_ticket(
        &self,
        request: &InitialTicketRequest,
        secret: SecretString,
    ) -> Result<CredentialMaterial, RealmProviderError> {
        self.backend_driver
            .request_initial_ticket(request, secret)
            .await
    }
}
