//! Common test fixtures: a small switch module attached to a bare registry.
//!
//! ```text
//! 1 sys      scalar  1.1 uptime (read-only) | 1.2 contact | 1.3 mtu (1518..9600)
//! 2 hidden   scalar  2.1 secret, pre-get always false
//! 3 ports    table   3.1.1.k key | 3.1.2.k admin (1..2) | 3.1.3.k speed (only while link is up)
//! 4 linkDown trap    port, up
//! 5 broken   scalar  5.1 level, every commit fails
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mib_expose::handler::{Expose, Handler, LeafOptions, RangeSpec};
use mib_expose::tree::{Scalar, ScalarAccess, Table, TableAccess, Trap};
use mib_expose::value::AsDisplayString;
use mib_expose::{MgmtError, MgmtResult, MibRegistry, OidElement, OidSequence, oid};
use parking_lot::Mutex;

// =============================================================================
// Data
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sys {
    pub uptime: u32,
    pub contact: String,
    pub mtu: u32,
}

impl Expose for Sys {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.capability(self.uptime, LeafOptions::new(OidElement::new(0, "uptime")));
        h.add_leaf(
            &mut AsDisplayString::new(&mut self.contact, 16),
            LeafOptions::new(OidElement::new(1, "contact")),
        );
        h.add_leaf(
            &mut self.mtu,
            LeafOptions::new(OidElement::new(2, "mtu")).range(RangeSpec::new(1518, 9600)),
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hidden {
    pub secret: i32,
}

impl Expose for Hidden {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(
            &mut self.secret,
            LeafOptions::new(OidElement::new(0, "secret")).pre_get(&|| false),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Port {
    pub admin: i32,
    pub speed: u32,
    pub link: bool,
}

impl Expose for Port {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(
            &mut self.admin,
            LeafOptions::new(OidElement::new(0, "admin")).range(RangeSpec::new(1, 2)),
        );
        let link = self.link;
        h.add_leaf(
            &mut self.speed,
            LeafOptions::new(OidElement::new(1, "speed"))
                .read_only()
                .pre_get(&|| link),
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkDown {
    pub port: u32,
    pub up: bool,
}

impl Expose for LinkDown {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(&mut self.port, LeafOptions::new(OidElement::new(0, "port")));
        h.add_leaf(&mut self.up, LeafOptions::new(OidElement::new(1, "up")));
    }
}

#[derive(Debug, Clone, Default)]
pub struct Level {
    pub level: u32,
}

impl Expose for Level {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(&mut self.level, LeafOptions::new(OidElement::new(0, "level")));
    }
}

// =============================================================================
// Shared state and access
// =============================================================================

#[derive(Debug)]
pub struct State {
    pub sys: Mutex<Sys>,
    pub ports: Mutex<BTreeMap<u32, Port>>,
    pub sys_commits: AtomicUsize,
    pub broken_commits: AtomicUsize,
}

impl State {
    pub fn new() -> Self {
        let mut ports = BTreeMap::new();
        ports.insert(1, Port { admin: 1, speed: 100, link: true });
        ports.insert(3, Port { admin: 2, speed: 1000, link: false });
        Self {
            sys: Mutex::new(Sys {
                uptime: 42,
                contact: "ops".into(),
                mtu: 1518,
            }),
            ports: Mutex::new(ports),
            sys_commits: AtomicUsize::new(0),
            broken_commits: AtomicUsize::new(0),
        }
    }
}

pub struct SysAccess(pub Arc<State>);

impl ScalarAccess for SysAccess {
    type Value = Sys;

    fn get(&self) -> MgmtResult<Sys> {
        Ok(self.0.sys.lock().clone())
    }

    fn set(&self, value: &Sys) -> MgmtResult<()> {
        self.0.sys_commits.fetch_add(1, Ordering::SeqCst);
        *self.0.sys.lock() = value.clone();
        Ok(())
    }

    fn writable(&self) -> bool {
        true
    }
}

pub struct HiddenAccess;

impl ScalarAccess for HiddenAccess {
    type Value = Hidden;

    fn get(&self) -> MgmtResult<Hidden> {
        Ok(Hidden { secret: 7 })
    }
}

pub struct PortAccess(pub Arc<State>);

impl TableAccess for PortAccess {
    type Key = u32;
    type Row = Port;

    fn get(&self, key: &u32) -> MgmtResult<Port> {
        self.0
            .ports
            .lock()
            .get(key)
            .cloned()
            .ok_or(MgmtError::new(3, 1))
    }

    fn next(&self, key: Option<&u32>) -> Option<u32> {
        let ports = self.0.ports.lock();
        match key {
            None => ports.keys().next().copied(),
            Some(k) => ports.range(k.checked_add(1)?..).next().map(|(k, _)| *k),
        }
    }

    fn set(&self, key: &u32, row: &Port) -> MgmtResult<()> {
        self.0.ports.lock().insert(*key, row.clone());
        Ok(())
    }

    fn writable(&self) -> bool {
        true
    }

    fn expose_key<H: Handler>(key: &mut u32, h: &mut H) {
        h.add_leaf(key, LeafOptions::new(OidElement::new(0, "portIndex")));
    }
}

pub struct BrokenAccess(pub Arc<State>);

impl ScalarAccess for BrokenAccess {
    type Value = Level;

    fn get(&self) -> MgmtResult<Level> {
        Ok(Level { level: 1 })
    }

    fn set(&self, _value: &Level) -> MgmtResult<()> {
        self.0.broken_commits.fetch_add(1, Ordering::SeqCst);
        Err(MgmtError::new(5, 9))
    }

    fn writable(&self) -> bool {
        true
    }
}

// =============================================================================
// Registry
// =============================================================================

pub struct Fixture {
    pub registry: MibRegistry,
    pub state: Arc<State>,
}

/// The fixture tree attached to `registry`.
pub fn attach(registry: &mut MibRegistry, state: &Arc<State>) {
    registry
        .attach_module(Scalar::new(OidElement::new(1, "sys"), SysAccess(state.clone())))
        .unwrap();
    registry
        .attach_module(Scalar::new(OidElement::new(2, "hidden"), HiddenAccess))
        .unwrap();
    registry
        .attach_module(Table::new(OidElement::new(3, "ports"), PortAccess(state.clone())))
        .unwrap();
    registry
        .attach_module(Trap::<LinkDown>::new(OidElement::new(4, "linkDown")))
        .unwrap();
    registry
        .attach_module(Scalar::new(OidElement::new(5, "broken"), BrokenAccess(state.clone())))
        .unwrap();
}

pub fn fixture() -> Fixture {
    let state = Arc::new(State::new());
    let mut registry = MibRegistry::bare();
    attach(&mut registry, &state);
    Fixture { registry, state }
}

// =============================================================================
// OIDs
// =============================================================================

pub fn uptime() -> OidSequence {
    oid!(1, 1)
}
pub fn contact() -> OidSequence {
    oid!(1, 2)
}
pub fn mtu() -> OidSequence {
    oid!(1, 3)
}
pub fn secret() -> OidSequence {
    oid!(2, 1)
}
pub fn port_index(port: u32) -> OidSequence {
    oid!(3, 1, 1, port)
}
pub fn port_admin(port: u32) -> OidSequence {
    oid!(3, 1, 2, port)
}
pub fn port_speed(port: u32) -> OidSequence {
    oid!(3, 1, 3, port)
}
pub fn level() -> OidSequence {
    oid!(5, 1)
}
