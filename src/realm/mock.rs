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

use async_trait::async_trait;
use mockall::mock;
use secrecy::SecretString;

use crate::config::Config;
use crate::principal::Realm;
use crate::realm::RealmApi;
use crate::realm::error::RealmProviderError;
use crate::realm::types::{CredentialMaterial, InitialTicketRequest};

mock! {
    pub RealmProvider {
        pub fn new(cfg: &Config) -> Result<Self, RealmProviderError>;
    }

    #[async_trait]
    impl RealmApi for RealmProvider {
        async fn resolve_default_realm<'a>(
            &self,
            primary: &'a str,
        ) -> Result<Realm, RealmProviderError>;

        async fn request_initial_ticket(
            &self,
            request: &InitialTicketRequest,
            secret: SecretString,
        ) -> Result<CredentialMaterial, RealmProviderError>;
    }

    impl Clone for RealmProvider {
        fn clone(&self) -> Self;
    }
}
