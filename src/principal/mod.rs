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
//! # Principal
//!
//! A Kerberos principal is a structured name: a primary component, an
//! optional instance component and the realm the name lives in
//! (`primary[/instance]@REALM`). The realm is never taken from the caller,
//! it is resolved by the realm provider and attached afterwards, which is
//! why [`PrincipalName`] (caller supplied) and [`Principal`] (resolved) are
//! separate types.

pub mod error;
pub mod types;

pub use error::IdentityError;
pub use types::*;

/// Separator between the name components.
pub const COMPONENT_SEPARATOR: char = '/';

/// Separator between the name and the realm.
pub const REALM_DELIMITER: char = '@';

/// Primary name of the ticket-granting service.
pub const TGS_NAME: &str = "krbtgt";

/// Validate a single name component.
///
/// Components are rejected when empty or when they contain a character
/// that changes the meaning of the composed principal text: a separator,
/// the realm delimiter, the escape character, whitespace or a control
/// character.
pub(crate) fn validate_component(kind: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() {
        return Err(IdentityError::EmptyComponent(kind));
    }
    for c in value.chars() {
        match c {
            REALM_DELIMITER => return Err(IdentityError::RealmDelimiter),
            COMPONENT_SEPARATOR => return Err(IdentityError::TooManyComponents),
            '\\' => return Err(IdentityError::IllegalCharacter(c)),
            c if c.is_whitespace() || c.is_control() => {
                return Err(IdentityError::IllegalCharacter(c));
            }
            _ => {}
        }
    }
    Ok(())
}
