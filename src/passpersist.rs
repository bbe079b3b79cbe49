//! net-snmp `pass_persist` front end.
//!
//! snmpd starts the exposing process once and talks to it over a line
//! protocol on stdin/stdout:
//!
//! ```text
//! PING              -> PONG
//! get / <oid>       -> <oid> / <type> / <value>   or NONE
//! getnext / <oid>   -> <oid> / <type> / <value>   or NONE
//! set / <oid> / <type> <value> -> DONE or an error token
//! ```
//!
//! [`Session`] is a line-at-a-time state machine with no I/O of its own.
//! [`serve`] drives it over any `BufRead`/`Write` pair.

use std::io::{BufRead, Write};

use crate::error::{ErrorStatus, Result};
use crate::globals::MibRegistry;
use crate::oid::OidSequence;
use crate::value::Value;
use crate::varbind::VarBind;

/// What the session is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Command,
    GetOid,
    GetNextOid,
    SetOid,
    SetValue(OidSequence),
}

/// Token answering a failed `set`.
pub fn status_token(status: ErrorStatus) -> &'static str {
    match status {
        ErrorStatus::WrongType => "wrong-type",
        ErrorStatus::WrongLength => "wrong-length",
        ErrorStatus::WrongValue | ErrorStatus::BadValue => "wrong-value",
        ErrorStatus::NoSuchName
        | ErrorStatus::NotWritable
        | ErrorStatus::ReadOnly
        | ErrorStatus::NoAccess
        | ErrorStatus::NoCreation => "not-writable",
        _ => "inconsistent-value",
    }
}

/// One `pass_persist` conversation with snmpd.
pub struct Session<'r> {
    registry: &'r MibRegistry,
    pending: Pending,
}

impl<'r> Session<'r> {
    pub fn new(registry: &'r MibRegistry) -> Self {
        Self {
            registry,
            pending: Pending::Command,
        }
    }

    /// Feed one input line, without its terminator.
    ///
    /// Returns the reply once a command is complete. The reply ends with a
    /// newline and may span several lines.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        match std::mem::take(&mut self.pending) {
            Pending::Command => self.command(line),
            Pending::GetOid => Some(self.get(line, false)),
            Pending::GetNextOid => Some(self.get(line, true)),
            Pending::SetOid => match OidSequence::parse(line) {
                Ok(oid) => {
                    self.pending = Pending::SetValue(oid);
                    None
                }
                Err(e) => {
                    tracing::debug!(target: "mib_expose::passpersist", error = %e, "bad set oid");
                    // The value line still follows.
                    self.pending = Pending::SetValue(OidSequence::empty());
                    None
                }
            },
            Pending::SetValue(oid) => Some(self.set(&oid, line)),
        }
    }

    fn command(&mut self, line: &str) -> Option<String> {
        match line.trim() {
            "PING" => Some("PONG\n".to_string()),
            "get" => {
                self.pending = Pending::GetOid;
                None
            }
            "getnext" => {
                self.pending = Pending::GetNextOid;
                None
            }
            "set" => {
                self.pending = Pending::SetOid;
                None
            }
            "" => None,
            other => {
                tracing::warn!(target: "mib_expose::passpersist", command = other, "unknown command");
                None
            }
        }
    }

    fn get(&self, line: &str, next: bool) -> String {
        let Ok(oid) = OidSequence::parse(line) else {
            tracing::debug!(target: "mib_expose::passpersist", input = line, "bad get oid");
            return "NONE\n".to_string();
        };

        let found = if next {
            self.registry.get_next(&oid)
        } else {
            self.registry
                .get(&oid)
                .map(|value| VarBind::new(oid.clone(), value))
        };

        match found {
            Ok(vb) => format_varbind(&vb),
            Err(status) => {
                tracing::debug!(target: "mib_expose::passpersist", oid = %oid, next, status = %status, "no instance");
                "NONE\n".to_string()
            }
        }
    }

    fn set(&self, oid: &OidSequence, line: &str) -> String {
        if oid.is_empty() {
            return format!("{}\n", status_token(ErrorStatus::NoSuchName));
        }
        let value = match Value::parse_typed(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(target: "mib_expose::passpersist", oid = %oid, error = %e, "bad set value");
                return format!("{}\n", status_token(ErrorStatus::WrongType));
            }
        };

        match self.registry.set(oid, &value) {
            Ok(()) => "DONE\n".to_string(),
            Err(status) => format!("{}\n", status_token(status)),
        }
    }
}

fn format_varbind(vb: &VarBind) -> String {
    format!(
        ".{}\n{}\n{}\n",
        vb.oid,
        vb.value.type_word(),
        vb.value.format_text()
    )
}

/// Run a session until `input` is exhausted.
pub fn serve<R: BufRead, W: Write>(registry: &MibRegistry, input: R, mut output: W) -> Result<()> {
    let mut session = Session::new(registry);
    for line in input.lines() {
        if let Some(reply) = session.feed(&line?) {
            output.write_all(reply.as_bytes())?;
            output.flush()?;
        }
    }
    tracing::debug!(target: "mib_expose::passpersist", "input closed");
    Ok(())
}
