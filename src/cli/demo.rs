//! A small switch-like module served by the binaries.
//!
//! ```text
//! mibExposeDemo(1000)
//!   demoSystem(1)       scalar: uptime, contact, location
//!   demoPortTable(2)    table keyed by port number
//!   demoLinkChange(3)   trap
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{MgmtError, MgmtResult};
use crate::handler::{Expose, Handler, LeafOptions, RangeSpec};
use crate::mib_generator::MibGenerator;
use crate::oid::OidElement;
use crate::tree::{NamespaceNode, Scalar, ScalarAccess, Table, TableAccess, Trap};
use crate::value::{AsDisplayString, AsEnum, AsTimeTicks, SnmpEnum};

pub const DEMO_ELEMENT: OidElement = OidElement::new(1000, "mibExposeDemo");

/// Module id carried in the demo's management error codes.
const DEMO_MODULE_ID: u16 = 0x3e8;
const ERR_LOCK: MgmtError = MgmtError::new(DEMO_MODULE_ID, 1);
const ERR_NO_PORT: MgmtError = MgmtError::new(DEMO_MODULE_ID, 2);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub uptime: u32,
    pub contact: String,
    pub location: String,
}

impl Expose for SystemInfo {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.capability(
            AsTimeTicks(&mut self.uptime),
            LeafOptions::new(OidElement::new(0, "demoSysUptime")),
        );
        h.add_leaf(
            &mut AsDisplayString::new(&mut self.contact, 64),
            LeafOptions::new(OidElement::new(1, "demoSysContact"))
                .description("Contact person for this switch"),
        );
        h.add_leaf(
            &mut AsDisplayString::new(&mut self.location, 64),
            LeafOptions::new(OidElement::new(2, "demoSysLocation")),
        );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminState {
    #[default]
    Enabled,
    Disabled,
}

impl SnmpEnum for AdminState {
    fn to_int(self) -> i32 {
        match self {
            AdminState::Enabled => 1,
            AdminState::Disabled => 2,
        }
    }

    fn from_int(v: i32) -> Option<Self> {
        match v {
            1 => Some(AdminState::Enabled),
            2 => Some(AdminState::Disabled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortConf {
    pub admin: AdminState,
    pub mtu: u32,
    pub link_up: bool,
    /// Negotiated speed in Mbit/s, only meaningful while the link is up.
    pub speed: u32,
}

impl Default for PortConf {
    fn default() -> Self {
        Self {
            admin: AdminState::Enabled,
            mtu: 1518,
            link_up: false,
            speed: 0,
        }
    }
}

impl Expose for PortConf {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(
            &mut AsEnum(&mut self.admin),
            LeafOptions::new(OidElement::new(0, "demoPortAdmin")),
        );
        h.add_leaf(
            &mut self.mtu,
            LeafOptions::new(OidElement::new(1, "demoPortMtu")).range(RangeSpec::new(1518, 9600)),
        );
        h.capability(
            self.link_up,
            LeafOptions::new(OidElement::new(2, "demoPortLinkUp")),
        );
        let link_up = self.link_up;
        h.add_leaf(
            &mut self.speed,
            LeafOptions::new(OidElement::new(3, "demoPortSpeed"))
                .read_only()
                .pre_get(&|| link_up),
        );
    }
}

/// Link change notification payload.
#[derive(Debug, Clone, Default)]
pub struct LinkChange {
    pub port: u32,
    pub up: bool,
}

impl Expose for LinkChange {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(&mut self.port, LeafOptions::new(OidElement::new(0, "demoTrapPort")));
        h.add_leaf(&mut self.up, LeafOptions::new(OidElement::new(1, "demoTrapUp")));
    }
}

/// Data behind the demo module.
#[derive(Debug, Default)]
pub struct DemoState {
    pub system: Mutex<SystemInfo>,
    pub ports: Mutex<BTreeMap<u32, PortConf>>,
}

impl DemoState {
    /// State with ports `1..=ports`; odd ports have link.
    pub fn new(ports: u32) -> Self {
        let rows = (1..=ports)
            .map(|p| {
                let up = p % 2 == 1;
                let conf = PortConf {
                    link_up: up,
                    speed: if up { 1000 } else { 0 },
                    ..PortConf::default()
                };
                (p, conf)
            })
            .collect();
        Self {
            system: Mutex::new(SystemInfo {
                uptime: 0,
                contact: "noc@example.net".into(),
                location: "lab".into(),
            }),
            ports: Mutex::new(rows),
        }
    }
}

pub struct SystemAccess(pub Arc<DemoState>);

impl ScalarAccess for SystemAccess {
    type Value = SystemInfo;

    fn get(&self) -> MgmtResult<SystemInfo> {
        Ok(self.0.system.lock().map_err(|_| ERR_LOCK)?.clone())
    }

    fn set(&self, value: &SystemInfo) -> MgmtResult<()> {
        let mut system = self.0.system.lock().map_err(|_| ERR_LOCK)?;
        system.contact.clone_from(&value.contact);
        system.location.clone_from(&value.location);
        Ok(())
    }

    fn writable(&self) -> bool {
        true
    }
}

pub struct PortAccess(pub Arc<DemoState>);

impl TableAccess for PortAccess {
    type Key = u32;
    type Row = PortConf;

    fn get(&self, key: &u32) -> MgmtResult<PortConf> {
        let ports = self.0.ports.lock().map_err(|_| ERR_LOCK)?;
        ports.get(key).cloned().ok_or(ERR_NO_PORT)
    }

    fn next(&self, key: Option<&u32>) -> Option<u32> {
        let ports = self.0.ports.lock().ok()?;
        match key {
            None => ports.keys().next().copied(),
            Some(k) => ports
                .range(k.checked_add(1)?..)
                .next()
                .map(|(k, _)| *k),
        }
    }

    fn set(&self, key: &u32, row: &PortConf) -> MgmtResult<()> {
        let mut ports = self.0.ports.lock().map_err(|_| ERR_LOCK)?;
        let port = ports.get_mut(key).ok_or(ERR_NO_PORT)?;
        port.admin = row.admin;
        port.mtu = row.mtu;
        Ok(())
    }

    fn writable(&self) -> bool {
        true
    }

    fn expose_key<H: Handler>(key: &mut u32, h: &mut H) {
        h.add_leaf(key, LeafOptions::new(OidElement::new(0, "demoPortIndex")));
    }
}

/// Build the demo module over `state`.
pub fn module(state: Arc<DemoState>) -> NamespaceNode {
    NamespaceNode::new(DEMO_ELEMENT)
        .with(Scalar::new(
            OidElement::new(1, "demoSystem"),
            SystemAccess(state.clone()),
        ))
        .with(Table::new(
            OidElement::new(2, "demoPortTable"),
            PortAccess(state),
        ))
        .with(Trap::<LinkChange>::new(OidElement::new(3, "demoLinkChange")))
}

/// Module header for the demo's MIB text.
pub fn mib_generator() -> MibGenerator {
    MibGenerator::new("MIB-EXPOSE-DEMO-MIB")
        .headline("Demo switch system and port data")
        .organization("mib-expose")
        .contact("noc@example.net")
        .description("System information, port configuration and link notifications of a demo switch.")
        .revision("202610190000Z", "Initial version.")
}
