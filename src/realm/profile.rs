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
//! # Kerberos profile
//!
//! Minimal reader of the Kerberos profile (`krb5.conf`) able to answer the
//! only question the realm provider has: which realm is the default one.

use std::path::Path;

use tokio::fs;

use crate::principal::Realm;
use crate::realm::RealmProviderError;

/// Extract `default_realm` of the `[libdefaults]` section.
pub fn parse_default_realm(content: &str) -> Option<&str> {
    let mut in_libdefaults = false;
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[') {
            // `[libdefaults]*` marks the section final, the name is the same.
            in_libdefaults = section
                .split(']')
                .next()
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("libdefaults"));
            continue;
        }
        if !in_libdefaults {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && key.trim().eq_ignore_ascii_case("default_realm")
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Read the default realm from the profile at `path`.
pub async fn default_realm(path: &Path) -> Result<Realm, RealmProviderError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| RealmProviderError::Profile {
            path: path.to_path_buf(),
            source,
        })?;
    let realm = parse_default_realm(&content)
        .ok_or_else(|| RealmProviderError::DefaultRealmUnknown(path.to_path_buf()))?;
    Ok(Realm::new(realm)?)
}
