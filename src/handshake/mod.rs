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
//! # Handshake reader
//!
//! The calling service hands the credentials over as a small line oriented
//! protocol on stdin:
//!
//! ```text
//! ClientAuthname: alice
//! ClientPassword: secret
//! ```
//!
//! Other lines are ignored, the last occurrence of a field wins and the
//! values are cut at the first line terminator. The optional instance is
//! passed as the single `--instance=<value>` command line argument.

use std::ffi::OsString;
use std::io::{self, BufRead};

use clap::Parser;
use secrecy::zeroize::{Zeroize, Zeroizing};
use secrecy::{ExposeSecret, SecretString};
use tracing::trace;

pub mod error;

pub use error::HandshakeError;

use crate::principal::{COMPONENT_SEPARATOR, IdentityError, Instance, REALM_DELIMITER};

/// User name line marker.
pub const NAME_MARKER: &str = "ClientAuthname: ";

/// Password line marker.
pub const PASSWORD_MARKER: &str = "ClientPassword: ";

const NAME_FIELD: &str = "ClientAuthname";
const PASSWORD_FIELD: &str = "ClientPassword";

/// Credentials received through the handshake.
///
/// The password is only reachable through [`Credentials::into_password`],
/// which consumes the credentials.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compose the identity text (`username[/instance]`).
    ///
    /// Exceeding `max_length` is an error, the identity is never truncated.
    pub fn identity_text(
        &self,
        instance: Option<&Instance>,
        max_length: usize,
    ) -> Result<String, HandshakeError> {
        let length = self.username.len() + instance.map_or(0, |val| val.as_str().len() + 1);
        if length > max_length {
            return Err(HandshakeError::PrincipalTooLong { max: max_length });
        }
        Ok(match instance {
            Some(instance) => format!("{}{COMPONENT_SEPARATOR}{instance}", self.username),
            None => self.username.clone(),
        })
    }

    /// Hand the password over to the verification.
    pub fn into_password(self) -> SecretString {
        self.password
    }
}

enum Line {
    /// Complete line (possibly the last one without a terminator).
    Complete,
    /// Line longer than the buffer. Only the head of it has been kept.
    Oversized,
    /// End of the input.
    Eof,
}

/// Reader of the credentials handshake.
pub struct HandshakeReader<R> {
    reader: R,
    max_line_length: usize,
}

impl<R: BufRead> HandshakeReader<R> {
    pub fn new(reader: R, max_line_length: usize) -> Self {
        Self {
            reader,
            max_line_length,
        }
    }

    /// Read the whole input and return the received credentials.
    ///
    /// Fails when the user name or the password is missing or empty at the
    /// end of the input, when the user name contains a realm or when a
    /// field does not fit into the line buffer.
    pub fn read_credentials(mut self) -> Result<Credentials, HandshakeError> {
        let mut username: Option<String> = None;
        let mut password: Option<SecretString> = None;
        // Allocated once with the final capacity: the buffer is never
        // reallocated and is wiped after every line and on drop.
        let mut line = Zeroizing::new(Vec::with_capacity(self.max_line_length));

        loop {
            line.zeroize();
            match self.read_line(&mut line)? {
                Line::Eof => break,
                Line::Oversized => {
                    if let Some(field) = field_of(&line) {
                        return Err(HandshakeError::FieldTooLong {
                            field,
                            max: self.max_line_length,
                        });
                    }
                    trace!("ignoring oversized handshake line");
                }
                Line::Complete => {
                    let value = chomp(&line);
                    if let Some(name) = value.strip_prefix(NAME_MARKER.as_bytes()) {
                        username = Some(decode(NAME_FIELD, name.to_vec())?);
                    } else if let Some(pass) = value.strip_prefix(PASSWORD_MARKER.as_bytes()) {
                        // Replacing drops (and wipes) the previous value.
                        password = Some(SecretString::from(decode(PASSWORD_FIELD, pass.to_vec())?));
                    }
                }
            }
        }

        let username = username
            .filter(|val| !val.is_empty())
            .ok_or(HandshakeError::MissingField(NAME_FIELD))?;
        let password = password
            .filter(|val| !val.expose_secret().is_empty())
            .ok_or(HandshakeError::MissingField(PASSWORD_FIELD))?;
        if username.contains(REALM_DELIMITER) {
            return Err(HandshakeError::RealmDelimiter);
        }
        Ok(Credentials { username, password })
    }

    /// Read a single line into `line` without ever growing it beyond
    /// `max_line_length`. The rest of an oversized line is consumed and
    /// discarded.
    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<Line> {
        let mut oversized = false;
        let mut read_any = false;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(match (read_any, oversized) {
                    (false, _) => Line::Eof,
                    (true, true) => Line::Oversized,
                    (true, false) => Line::Complete,
                });
            }
            read_any = true;
            let (chunk, terminated) = match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (&available[..=pos], true),
                None => (available, false),
            };
            let room = self.max_line_length - line.len();
            if chunk.len() > room {
                oversized = true;
            }
            line.extend_from_slice(&chunk[..chunk.len().min(room)]);
            let consumed = chunk.len();
            self.reader.consume(consumed);
            if terminated {
                return Ok(if oversized {
                    Line::Oversized
                } else {
                    Line::Complete
                });
            }
        }
    }
}

/// Cut the line at the first CR or LF.
fn chomp(line: &[u8]) -> &[u8] {
    match line.iter().position(|b| *b == b'\r' || *b == b'\n') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn field_of(line: &[u8]) -> Option<&'static str> {
    if line.starts_with(NAME_MARKER.as_bytes()) {
        Some(NAME_FIELD)
    } else if line.starts_with(PASSWORD_MARKER.as_bytes()) {
        Some(PASSWORD_FIELD)
    } else {
        None
    }
}

fn decode(field: &'static str, value: Vec<u8>) -> Result<String, HandshakeError> {
    String::from_utf8(value).map_err(|err| {
        err.into_bytes().zeroize();
        HandshakeError::InvalidEncoding(field)
    })
}

/// The only accepted argument form.
const INSTANCE_ARGUMENT: &str = "--instance=";

/// Invocation arguments.
#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct InstanceArgs {
    /// Instance appended to the user name (`name/instance`).
    #[arg(long, require_equals = true, value_parser = parse_instance)]
    instance: Option<Instance>,
}

fn parse_instance(value: &str) -> Result<Instance, IdentityError> {
    Instance::new(value)
}

/// Parse the invocation arguments (without the program name).
///
/// Only a single `--instance=<value>` is accepted; empty arguments are
/// ignored. Anything else, including a bare `--`, is rejected before clap
/// sees it.
pub fn parse_instance_argument<I, T>(args: I) -> Result<Option<Instance>, HandshakeError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args
        .into_iter()
        .map(Into::into)
        .filter(|arg| !arg.is_empty())
        .collect();
    if args.len() > 1 {
        return Err(HandshakeError::InvalidArgument(format!(
            "expected at most one {INSTANCE_ARGUMENT}<value> argument, got {}",
            args.len()
        )));
    }
    if let Some(arg) = args.first()
        && !arg
            .to_str()
            .is_some_and(|val| val.starts_with(INSTANCE_ARGUMENT))
    {
        return Err(HandshakeError::InvalidArgument(format!(
            "unexpected argument '{}'",
            arg.to_string_lossy()
        )));
    }
    InstanceArgs::try_parse_from(args)
        .map(|parsed| parsed.instance)
        .map_err(|err| {
            let rendered = err.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            HandshakeError::InvalidArgument(message)
        })
}
