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

use crate::principal::{
    COMPONENT_SEPARATOR, IdentityError, REALM_DELIMITER, TGS_NAME, validate_component,
};

/// Caller supplied part of a principal: the primary name and an optional
/// instance. Never carries a realm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrincipalName {
    primary: String,
    instance: Option<String>,
}

impl PrincipalName {
    /// Parse the composed identity text (`primary[/instance]`).
    ///
    /// The text is rejected when it is empty, longer than `max_length`
    /// bytes, carries a realm delimiter or any component is malformed.
    pub fn parse(text: &str, max_length: usize) -> Result<Self, IdentityError> {
        if text.is_empty() {
            return Err(IdentityError::Empty);
        }
        if text.len() > max_length {
            return Err(IdentityError::TooLong { max: max_length });
        }
        // Checked upfront so that `alice/x@EVIL` is reported as cross-realm
        // addressing rather than as a malformed instance.
        if text.contains(REALM_DELIMITER) {
            return Err(IdentityError::RealmDelimiter);
        }
        let (primary, instance) = match text.split_once(COMPONENT_SEPARATOR) {
            Some((primary, instance)) => (primary, Some(instance)),
            None => (text, None),
        };
        validate_component("primary", primary)?;
        if let Some(instance) = instance {
            validate_component("instance", instance)?;
        }
        Ok(Self {
            primary: primary.into(),
            instance: instance.map(Into::into),
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Attach the resolved realm.
    pub fn in_realm(self, realm: Realm) -> Principal {
        Principal { name: self, realm }
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}{COMPONENT_SEPARATOR}{instance}", self.primary),
            None => f.write_str(&self.primary),
        }
    }
}

/// Validated instance component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance(String);

impl Instance {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, IdentityError> {
        let value = value.into();
        validate_component("instance", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Realm name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Realm(String);

impl Realm {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, IdentityError> {
        let value = value.into();
        if value.is_empty()
            || value.chars().any(|c| {
                c == COMPONENT_SEPARATOR
                    || c == REALM_DELIMITER
                    || c == '\\'
                    || c.is_whitespace()
                    || c.is_control()
            })
        {
            return Err(IdentityError::InvalidRealm(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified principal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    name: PrincipalName,
    realm: Realm,
}

impl Principal {
    pub fn name(&self) -> &PrincipalName {
        &self.name
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{REALM_DELIMITER}{}", self.name, self.realm)
    }
}

/// Service the initial ticket is requested for.
///
/// Only ever derived from an already resolved realm, so the caller has no
/// way to point the request to a different realm than the one the client
/// principal belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTarget(Principal);

impl ServiceTarget {
    /// The ticket-granting service of the realm (`krbtgt/REALM@REALM`).
    pub fn ticket_granting(realm: &Realm) -> Self {
        Self(Principal {
            name: PrincipalName {
                primary: TGS_NAME.into(),
                instance: Some(realm.as_str().into()),
            },
            realm: realm.clone(),
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
