//! SMIv2 text for an attached module.
//!
//! [`MibGenerator`] describes one module of a [`MibRegistry`] as a MIB
//! file. Leaves are read with an [`InventoryWalker`], the same way the
//! registry indexes the tree, so the text names exactly the objects GET
//! and SET serve:
//!
//! - namespaces and scalar groups become `OBJECT IDENTIFIER`s
//! - tables become a `SEQUENCE OF` table, its entry and the entry type
//! - leaves become `OBJECT-TYPE`s
//! - traps become `NOTIFICATION-TYPE`s with their objects numbered below
//!
//! A conformance section with one group per structure and a single
//! compliance statement closes the module.
//!
//! ```rust
//! use mib_expose::MibRegistry;
//! use mib_expose::error::MgmtResult;
//! use mib_expose::handler::{Expose, Handler, LeafOptions};
//! use mib_expose::mib_generator::MibGenerator;
//! use mib_expose::oid::OidElement;
//! use mib_expose::tree::{NamespaceNode, Scalar, ScalarAccess};
//!
//! #[derive(Clone, Default)]
//! struct Fan {
//!     rpm: u32,
//! }
//!
//! impl Expose for Fan {
//!     fn expose<H: Handler>(&mut self, h: &mut H) {
//!         h.add_leaf(&mut self.rpm, LeafOptions::new(OidElement::new(0, "fanRpm")).read_only());
//!     }
//! }
//!
//! struct FanAccess;
//!
//! impl ScalarAccess for FanAccess {
//!     type Value = Fan;
//!
//!     fn get(&self) -> MgmtResult<Fan> {
//!         Ok(Fan { rpm: 3000 })
//!     }
//! }
//!
//! let mut registry = MibRegistry::default();
//! registry
//!     .attach_module(
//!         NamespaceNode::new(OidElement::new(40, "fanMib"))
//!             .with(Scalar::new(OidElement::new(1, "fanStatus"), FanAccess)),
//!     )
//!     .unwrap();
//!
//! let text = MibGenerator::new("FAN-MIB").generate(&registry, "fanMib").unwrap();
//! assert!(text.contains("fanMib MODULE-IDENTITY"));
//! assert!(text.contains("fanRpm OBJECT-TYPE"));
//! assert!(text.contains("::= { fanStatus 1 }"));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::globals::MibRegistry;
use crate::handler::{InventoryWalker, LeafInfo, MaxAccess, Status};
use crate::oid::OidSequence;
use crate::tag::AsnType;
use crate::tree::{NamespaceNode, Node, StructBase, StructKind};

/// Module the registry's modules root is imported from.
pub const DEFAULT_PARENT_MODULE: &str = "VTSS-SMI";

const LINE_WIDTH: usize = 70;

/// LAST-UPDATED of a module without revisions.
const EPOCH: &str = "197001010000Z";

/// One REVISION clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// `YYYYMMDDHHMMZ`
    pub date: String,
    pub description: String,
}

/// Builder for the module header, and the entry point of generation.
#[derive(Debug, Clone, Default)]
pub struct MibGenerator {
    definitions: String,
    headline: String,
    organization: String,
    contact: String,
    description: String,
    revisions: Vec<Revision>,
    parent: Option<(String, String)>,
    conformance_arc: Option<u32>,
}

impl MibGenerator {
    /// `definitions` is the name before `DEFINITIONS ::= BEGIN`, e.g.
    /// `VTSS-PORT-MIB`.
    pub fn new(definitions: impl Into<String>) -> Self {
        Self {
            definitions: definitions.into(),
            ..Self::default()
        }
    }

    /// One-line summary in the banner.
    pub fn headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a revision. Revisions are listed newest first; the first one
    /// added sets LAST-UPDATED.
    pub fn revision(mut self, date: impl Into<String>, description: impl Into<String>) -> Self {
        self.revisions.push(Revision {
            date: date.into(),
            description: description.into(),
        });
        self
    }

    /// Object the module identity is registered under, and the module that
    /// defines it. Defaults to the registry's modules root imported from
    /// [`DEFAULT_PARENT_MODULE`], or `enterprises` for a bare registry.
    pub fn parent(mut self, name: impl Into<String>, module: impl Into<String>) -> Self {
        self.parent = Some((name.into(), module.into()));
        self
    }

    /// Arc of the conformance subtree below the module. Defaults to one
    /// past the module's last child.
    pub fn conformance_arc(mut self, arc: u32) -> Self {
        self.conformance_arc = Some(arc);
        self
    }

    /// MIB text for the namespace module `module` attached to `registry`.
    pub fn generate(&self, registry: &MibRegistry, module: &str) -> Result<String> {
        let (oid, node) = registry.module(module)?;
        let Node::Namespace(ns) = node else {
            tracing::warn!(target: "mib_expose::mib_generator", module, "module is not a namespace");
            return Err(Error::UnknownModule {
                name: module.into(),
            });
        };

        let (parent, parent_module) = match &self.parent {
            Some((name, from)) => (name.clone(), from.clone()),
            None => match registry.modules_root_name() {
                Some(name) => (name.to_string(), DEFAULT_PARENT_MODULE.to_string()),
                None => ("enterprises".to_string(), "SNMPv2-SMI".to_string()),
            },
        };

        let mut objects = Objects::default();
        for child in ns.children() {
            objects.collect(child, ns.element().name, &oid);
        }
        let conformance_arc = self.conformance_arc.unwrap_or_else(|| {
            ns.children()
                .iter()
                .map(|c| c.element().numeric)
                .max()
                .map_or(1, |arc| arc.saturating_add(1))
        });

        tracing::debug!(
            target: "mib_expose::mib_generator",
            module,
            oid = %oid,
            definitions = objects.definitions.len(),
            groups = objects.groups.len(),
            "module described"
        );
        let text = MibText {
            generator: self,
            module: ns,
            parent: &parent,
            parent_module: &parent_module,
            conformance_arc,
            objects: &objects,
        };
        Ok(text.to_string())
    }
}

enum Definition {
    Identifier {
        name: &'static str,
        parent: &'static str,
        arc: u32,
    },
    Table {
        name: &'static str,
        parent: &'static str,
        arc: u32,
        index: Vec<&'static str>,
        columns: Vec<(&'static str, AsnType)>,
    },
    Object {
        leaf: LeafInfo,
        parent: String,
        access: MaxAccess,
    },
    Notification {
        name: &'static str,
        parent: &'static str,
        arc: u32,
        objects: Vec<&'static str>,
    },
}

enum Group {
    Objects {
        name: String,
        objects: Vec<&'static str>,
    },
    Notification {
        name: String,
        notification: &'static str,
    },
}

impl Group {
    fn name(&self) -> &str {
        match self {
            Group::Objects { name, .. } | Group::Notification { name, .. } => name,
        }
    }
}

/// Definitions of one module in output order.
#[derive(Default)]
struct Objects {
    definitions: Vec<Definition>,
    groups: Vec<Group>,
    /// Base types imported from SNMPv2-SMI.
    types: BTreeSet<&'static str>,
    notifications: bool,
}

impl Objects {
    fn collect(&mut self, node: &Node, parent: &'static str, parent_oid: &OidSequence) {
        let element = node.element();
        let oid = parent_oid.child(element.numeric);
        let leaf = match node {
            Node::Namespace(ns) => {
                self.definitions.push(Definition::Identifier {
                    name: element.name,
                    parent,
                    arc: element.numeric,
                });
                for child in ns.children() {
                    self.collect(child, element.name, &oid);
                }
                return;
            }
            Node::Leaf(leaf) => leaf,
        };

        let mut w = InventoryWalker::at(oid);
        leaf.inventory(&mut w);
        let leaves = w.into_leaves();
        self.types.extend(
            leaves
                .iter()
                .map(|l| l.syntax)
                .filter(|t| !is_builtin(*t))
                .map(AsnType::smi_name),
        );

        let (group, leaf_parent, access) = match leaf.kind() {
            StructKind::Scalar => {
                self.definitions.push(Definition::Identifier {
                    name: element.name,
                    parent,
                    arc: element.numeric,
                });
                self.object_group(element.name, &leaves);
                (element.name, element.name.to_string(), None)
            }
            StructKind::Table => {
                let index: Vec<_> = leaves.iter().filter(|l| l.index).map(|l| l.name).collect();
                if index.is_empty() {
                    tracing::warn!(target: "mib_expose::mib_generator", table = %element, "table without index columns");
                }
                self.definitions.push(Definition::Table {
                    name: element.name,
                    parent,
                    arc: element.numeric,
                    index,
                    columns: leaves.iter().map(|l| (l.name, l.syntax)).collect(),
                });
                self.object_group(element.name, &leaves);
                (element.name, entry_name(element.name), None)
            }
            StructKind::Trap => {
                self.notifications = true;
                self.definitions.push(Definition::Notification {
                    name: element.name,
                    parent,
                    arc: element.numeric,
                    objects: leaves.iter().map(|l| l.name).collect(),
                });
                self.groups.push(Group::Notification {
                    name: format!("{}InfoGroup", element.name),
                    notification: element.name,
                });
                (
                    element.name,
                    element.name.to_string(),
                    Some(MaxAccess::AccessibleForNotify),
                )
            }
        };

        tracing::trace!(target: "mib_expose::mib_generator", structure = group, leaves = leaves.len(), "structure described");
        for leaf in leaves {
            self.definitions.push(Definition::Object {
                access: access.unwrap_or(leaf.access),
                parent: leaf_parent.clone(),
                leaf,
            });
        }
    }

    fn object_group(&mut self, name: &'static str, leaves: &[LeafInfo]) {
        let objects: Vec<_> = leaves
            .iter()
            .filter(|l| l.status != Status::Obsolete)
            .map(|l| l.name)
            .collect();
        if !objects.is_empty() {
            self.groups.push(Group::Objects {
                name: format!("{}InfoGroup", name),
                objects,
            });
        }
    }
}

/// Types every SMIv2 module knows without an import.
fn is_builtin(t: AsnType) -> bool {
    matches!(
        t,
        AsnType::OctetString | AsnType::Null | AsnType::ObjectIdentifier
    )
}

/// `portTable` -> `portEntry`
fn entry_name(table: &str) -> String {
    format!("{}Entry", table.strip_suffix("Table").unwrap_or(table))
}

/// `portTable` -> `PortEntry`
fn entry_type(table: &str) -> String {
    let entry = entry_name(table);
    let mut chars = entry.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => entry,
    }
}

/// SYNTAX clause with the leaf's range, as SIZE for octet strings.
fn syntax(leaf: &LeafInfo) -> String {
    let base = leaf.syntax.smi_name();
    match (&leaf.range, leaf.syntax) {
        (Some(range), AsnType::OctetString) => format!("{} (SIZE ({}))", base, range),
        (Some(range), AsnType::Integer | AsnType::Unsigned32 | AsnType::Gauge32) => {
            format!("{} ({})", base, range)
        }
        _ => base.to_string(),
    }
}

struct MibText<'a> {
    generator: &'a MibGenerator,
    module: &'a NamespaceNode,
    parent: &'a str,
    parent_module: &'a str,
    conformance_arc: u32,
    objects: &'a Objects,
}

impl fmt::Display for MibText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.generator;
        let stars = "*".repeat(LINE_WIDTH - 3);
        writeln!(f, "-- {}", stars)?;
        writeln!(f, "-- {}:  {}", g.definitions, g.headline)?;
        writeln!(f, "-- {}", stars)?;
        writeln!(f)?;
        writeln!(f, "{} DEFINITIONS ::= BEGIN", g.definitions)?;
        writeln!(f)?;

        self.write_imports(f)?;
        self.write_identity(f)?;
        for definition in &self.objects.definitions {
            write_definition(f, definition)?;
        }
        self.write_conformance(f)?;
        writeln!(f, "END")
    }
}

impl MibText<'_> {
    fn write_imports(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut smi = vec!["MODULE-IDENTITY", "OBJECT-TYPE"];
        if self.objects.notifications {
            smi.push("NOTIFICATION-TYPE");
        }
        smi.extend(self.objects.types.iter().copied());

        let mut imports = vec![
            (
                vec!["NOTIFICATION-GROUP", "MODULE-COMPLIANCE", "OBJECT-GROUP"],
                "SNMPv2-CONF",
            ),
            (smi, "SNMPv2-SMI"),
        ];
        match imports.iter_mut().find(|(_, from)| *from == self.parent_module) {
            Some((items, _)) => items.push(self.parent),
            None => imports.push((vec![self.parent], self.parent_module)),
        }

        writeln!(f, "IMPORTS")?;
        let last = imports.len() - 1;
        for (i, (items, from)) in imports.iter().enumerate() {
            f.write_str("    ")?;
            write_wrapped(f, items, 4, 4)?;
            writeln!(f)?;
            writeln!(f, "        FROM {}{}", from, if i == last { ";" } else { "" })?;
        }
        writeln!(f)
    }

    fn write_identity(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.generator;
        let last_updated = g.revisions.first().map_or(EPOCH, |r| r.date.as_str());

        writeln!(f, "{} MODULE-IDENTITY", self.module.element().name)?;
        writeln!(f, "    LAST-UPDATED \"{}\"", last_updated)?;
        writeln!(f, "    ORGANIZATION")?;
        write_text(f, &g.organization)?;
        writeln!(f, "    CONTACT-INFO")?;
        write_text(f, &g.contact)?;
        writeln!(f, "    DESCRIPTION")?;
        write_text(f, &g.description)?;
        for revision in &g.revisions {
            writeln!(f, "    REVISION    \"{}\"", revision.date)?;
            writeln!(f, "    DESCRIPTION")?;
            write_text(f, &revision.description)?;
        }
        writeln!(
            f,
            "    ::= {{ {} {} }}\n",
            self.parent,
            self.module.element().numeric
        )
    }

    fn write_conformance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.module.element().name;
        writeln!(f, "{}Conformance OBJECT IDENTIFIER", name)?;
        writeln!(f, "    ::= {{ {} {} }}\n", name, self.conformance_arc)?;
        writeln!(f, "{}Compliances OBJECT IDENTIFIER", name)?;
        writeln!(f, "    ::= {{ {}Conformance 1 }}\n", name)?;
        writeln!(f, "{}Groups OBJECT IDENTIFIER", name)?;
        writeln!(f, "    ::= {{ {}Conformance 2 }}\n", name)?;

        for (arc, group) in (1..).zip(&self.objects.groups) {
            match group {
                Group::Objects { name: group, objects } => {
                    writeln!(f, "{} OBJECT-GROUP", group)?;
                    write_braced(f, "    OBJECTS    ", objects)?;
                    writeln!(f, "    STATUS      current")?;
                    writeln!(f, "    DESCRIPTION")?;
                    write_text(f, "A collection of objects.")?;
                }
                Group::Notification {
                    name: group,
                    notification,
                } => {
                    writeln!(f, "{} NOTIFICATION-GROUP", group)?;
                    write_braced(f, "    NOTIFICATIONS", &[notification])?;
                    writeln!(f, "    STATUS      current")?;
                    writeln!(f, "    DESCRIPTION")?;
                    write_text(f, "Information group containing a trap.")?;
                }
            }
            writeln!(f, "    ::= {{ {}Groups {} }}\n", name, arc)?;
        }

        writeln!(f, "{}Compliance MODULE-COMPLIANCE", name)?;
        writeln!(f, "    STATUS      current")?;
        writeln!(f, "    DESCRIPTION")?;
        write_text(f, "The compliance statement for the implementation.")?;
        writeln!(f)?;
        writeln!(f, "    MODULE      -- this module")?;
        let groups: Vec<_> = self.objects.groups.iter().map(Group::name).collect();
        if !groups.is_empty() {
            writeln!(f)?;
            write_braced(f, "    MANDATORY-GROUPS", &groups)?;
        }
        writeln!(f, "\n    ::= {{ {}Compliances 1 }}\n", name)
    }
}

fn write_definition(f: &mut fmt::Formatter<'_>, definition: &Definition) -> fmt::Result {
    match definition {
        Definition::Identifier { name, parent, arc } => {
            writeln!(f, "{} OBJECT IDENTIFIER", name)?;
            writeln!(f, "    ::= {{ {} {} }}\n", parent, arc)
        }
        Definition::Table {
            name,
            parent,
            arc,
            index,
            columns,
        } => {
            let entry = entry_name(name);
            let entry_type = entry_type(name);

            writeln!(f, "{} OBJECT-TYPE", name)?;
            writeln!(f, "    SYNTAX      SEQUENCE OF {}", entry_type)?;
            writeln!(f, "    MAX-ACCESS  not-accessible")?;
            writeln!(f, "    STATUS      current")?;
            writeln!(f, "    DESCRIPTION")?;
            write_text(f, &format!("Table of {} rows.", entry))?;
            writeln!(f, "    ::= {{ {} {} }}\n", parent, arc)?;

            writeln!(f, "{} OBJECT-TYPE", entry)?;
            writeln!(f, "    SYNTAX      {}", entry_type)?;
            writeln!(f, "    MAX-ACCESS  not-accessible")?;
            writeln!(f, "    STATUS      current")?;
            writeln!(f, "    DESCRIPTION")?;
            write_text(f, &format!("One row of {}.", name))?;
            if !index.is_empty() {
                write_braced(f, "    INDEX      ", index)?;
            }
            writeln!(f, "    ::= {{ {} 1 }}\n", name)?;

            writeln!(f, "{} ::= SEQUENCE {{", entry_type)?;
            let width = columns.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
            for (i, (column, syntax)) in columns.iter().enumerate() {
                let sep = if i + 1 < columns.len() { "," } else { "" };
                writeln!(
                    f,
                    "    {:width$}  {}{}",
                    column,
                    syntax.smi_name(),
                    sep,
                    width = width
                )?;
            }
            writeln!(f, "}}\n")
        }
        Definition::Object {
            leaf,
            parent,
            access,
        } => {
            writeln!(f, "{} OBJECT-TYPE", leaf.name)?;
            writeln!(f, "    SYNTAX      {}", syntax(leaf))?;
            writeln!(f, "    MAX-ACCESS  {}", access)?;
            writeln!(f, "    STATUS      {}", leaf.status)?;
            writeln!(f, "    DESCRIPTION")?;
            write_text(f, leaf.description)?;
            let arc = leaf.oid.arcs().last().copied().unwrap_or_default();
            writeln!(f, "    ::= {{ {} {} }}\n", parent, arc)
        }
        Definition::Notification {
            name,
            parent,
            arc,
            objects,
        } => {
            writeln!(f, "{} NOTIFICATION-TYPE", name)?;
            if !objects.is_empty() {
                write_braced(f, "    OBJECTS    ", objects)?;
            }
            writeln!(f, "    STATUS      current")?;
            writeln!(f, "    DESCRIPTION")?;
            write_text(f, &format!("Notification {}.", name))?;
            writeln!(f, "    ::= {{ {} {} }}\n", parent, arc)
        }
    }
}

/// Comma separated `items` wrapped at [`LINE_WIDTH`]. The first item starts
/// at `column`, continuation lines at `indent`.
fn write_wrapped<S: AsRef<str>>(
    f: &mut fmt::Formatter<'_>,
    items: &[S],
    column: usize,
    indent: usize,
) -> fmt::Result {
    let mut width = column;
    for (i, item) in items.iter().enumerate() {
        let item = item.as_ref();
        if i > 0 {
            if width + 2 + item.len() > LINE_WIDTH {
                write!(f, ",\n{:indent$}", "", indent = indent)?;
                width = indent;
            } else {
                f.write_str(", ")?;
                width += 2;
            }
        }
        f.write_str(item)?;
        width += item.len();
    }
    Ok(())
}

/// `header { a, b, ... }` with continuation lines aligned after the brace.
fn write_braced<S: AsRef<str>>(f: &mut fmt::Formatter<'_>, header: &str, items: &[S]) -> fmt::Result {
    write!(f, "{} {{ ", header)?;
    let column = header.len() + 3;
    write_wrapped(f, items, column, column)?;
    writeln!(f, " }}")
}

/// Quoted text at description indent, word-wrapped. SMI strings cannot hold
/// a double quote; those become single quotes.
fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    const INDENT: usize = 9;
    f.write_str("        \"")?;
    let mut width = INDENT;
    for (i, word) in text.split_whitespace().enumerate() {
        let word = word.replace('"', "'");
        if i > 0 {
            if width + 1 + word.len() > LINE_WIDTH {
                write!(f, "\n{:width$}", "", width = INDENT)?;
                width = INDENT;
            } else {
                f.write_str(" ")?;
                width += 1;
            }
        }
        f.write_str(&word)?;
        width += word.len();
    }
    writeln!(f, "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MgmtResult;
    use crate::handler::{Expose, Handler, LeafOptions, RangeSpec};
    use crate::oid::OidElement;
    use crate::tree::{Scalar, ScalarAccess, Table, TableAccess, Trap};
    use crate::value::AsDisplayString;

    #[derive(Clone, Default)]
    struct Unit {
        name: String,
        temp: i32,
        old: u32,
    }

    impl Expose for Unit {
        fn expose<H: Handler>(&mut self, h: &mut H) {
            h.add_leaf(
                &mut AsDisplayString::new(&mut self.name, 32),
                LeafOptions::new(OidElement::new(0, "unitName"))
                    .description("Name of the \"unit\"")
                    .range(RangeSpec::new(0, 32)),
            );
            h.add_leaf(
                &mut self.temp,
                LeafOptions::new(OidElement::new(1, "unitTemp"))
                    .read_only()
                    .range(RangeSpec::new(-40, 125)),
            );
            h.add_leaf(
                &mut self.old,
                LeafOptions::new(OidElement::new(2, "unitOld")).status(Status::Obsolete),
            );
        }
    }

    struct UnitAccess;

    impl ScalarAccess for UnitAccess {
        type Value = Unit;

        fn get(&self) -> MgmtResult<Unit> {
            Ok(Unit::default())
        }
    }

    #[derive(Clone, Default)]
    struct Slot {
        power: u32,
    }

    impl Expose for Slot {
        fn expose<H: Handler>(&mut self, h: &mut H) {
            h.add_leaf(&mut self.power, LeafOptions::new(OidElement::new(0, "slotPower")));
        }
    }

    struct Slots;

    impl TableAccess for Slots {
        type Key = u32;
        type Row = Slot;

        fn get(&self, _key: &u32) -> MgmtResult<Slot> {
            Ok(Slot::default())
        }

        fn next(&self, _key: Option<&u32>) -> Option<u32> {
            None
        }

        fn writable(&self) -> bool {
            true
        }

        fn expose_key<H: Handler>(key: &mut u32, h: &mut H) {
            h.add_leaf(key, LeafOptions::new(OidElement::new(0, "slotIndex")));
        }
    }

    #[derive(Default)]
    struct Overheat {
        temp: i32,
    }

    impl Expose for Overheat {
        fn expose<H: Handler>(&mut self, h: &mut H) {
            h.add_leaf(&mut self.temp, LeafOptions::new(OidElement::new(0, "overheatTemp")));
        }
    }

    fn registry() -> MibRegistry {
        let mut r = MibRegistry::default();
        r.attach_module(
            NamespaceNode::new(OidElement::new(9, "chassisMib"))
                .with(
                    NamespaceNode::new(OidElement::new(1, "chassisObjects"))
                        .with(Scalar::new(OidElement::new(1, "chassisUnit"), UnitAccess))
                        .with(Table::new(OidElement::new(2, "chassisSlotTable"), Slots)),
                )
                .with(Trap::<Overheat>::new(OidElement::new(2, "chassisOverheat"))),
        )
        .unwrap();
        r
    }

    fn generate() -> String {
        MibGenerator::new("CHASSIS-MIB")
            .headline("Chassis units and slots")
            .organization("Example Networks")
            .contact("noc@example.net")
            .description("Chassis management.")
            .revision("202610190000Z", "Initial version.")
            .generate(&registry(), "chassisMib")
            .unwrap()
    }

    // ========================================================================
    // Module header
    // ========================================================================

    #[test]
    fn test_header_and_identity() {
        let text = generate();
        assert!(text.starts_with("-- ****"));
        assert!(text.contains("-- CHASSIS-MIB:  Chassis units and slots\n"));
        assert!(text.contains("CHASSIS-MIB DEFINITIONS ::= BEGIN\n"));
        assert!(text.contains("chassisMib MODULE-IDENTITY\n    LAST-UPDATED \"202610190000Z\"\n"));
        assert!(text.contains("    REVISION    \"202610190000Z\"\n"));
        assert!(text.contains("    ::= { vtssSwitchMgmt 9 }\n"));
        assert!(text.trim_end().ends_with("END"));
    }

    #[test]
    fn test_imports_used_types_only() {
        let text = generate();
        let imports = &text[text.find("IMPORTS").unwrap()..text.find(";").unwrap()];
        assert!(imports.contains("NOTIFICATION-TYPE"));
        assert!(imports.contains("Integer32"));
        assert!(imports.contains("Unsigned32"));
        assert!(!imports.contains("Counter64"));
        assert!(!imports.contains("OCTET STRING"));
        assert!(imports.contains("vtssSwitchMgmt\n        FROM VTSS-SMI"));
    }

    #[test]
    fn test_bare_registry_parent() {
        let mut r = MibRegistry::bare();
        r.attach_module(
            NamespaceNode::new(OidElement::new(3, "tinyMib"))
                .with(Scalar::new(OidElement::new(1, "tinyUnit"), UnitAccess)),
        )
        .unwrap();
        let text = MibGenerator::new("TINY-MIB").generate(&r, "tinyMib").unwrap();
        assert!(text.contains("    ::= { enterprises 3 }\n"));
        assert!(text.contains(&format!("LAST-UPDATED \"{}\"", EPOCH)));
        assert!(!text.contains("NOTIFICATION-TYPE,"));
        assert!(text.contains("enterprises\n        FROM SNMPv2-SMI;"));
        assert!(text.contains("tinyMibConformance OBJECT IDENTIFIER\n    ::= { tinyMib 2 }"));
    }

    #[test]
    fn test_unknown_or_leaf_module() {
        let mut r = MibRegistry::bare();
        r.attach_module(Scalar::new(OidElement::new(1, "bareUnit"), UnitAccess))
            .unwrap();
        let generator = MibGenerator::new("X-MIB");
        assert!(matches!(
            generator.generate(&r, "missing"),
            Err(Error::UnknownModule { .. })
        ));
        assert!(matches!(
            generator.generate(&r, "bareUnit"),
            Err(Error::UnknownModule { .. })
        ));
    }

    // ========================================================================
    // Objects
    // ========================================================================

    #[test]
    fn test_scalar_group() {
        let text = generate();
        assert!(text.contains("chassisObjects OBJECT IDENTIFIER\n    ::= { chassisMib 1 }\n"));
        assert!(text.contains("chassisUnit OBJECT IDENTIFIER\n    ::= { chassisObjects 1 }\n"));
        assert!(text.contains(
            "unitName OBJECT-TYPE\n    SYNTAX      OCTET STRING (SIZE (0..32))\n    MAX-ACCESS  read-only\n"
        ));
        // quotes inside descriptions are replaced
        assert!(text.contains("        \"Name of the 'unit'\"\n    ::= { chassisUnit 1 }\n"));
        assert!(text.contains("SYNTAX      Integer32 (-40..125)\n"));
        assert!(text.contains("unitOld OBJECT-TYPE\n    SYNTAX      Unsigned32\n    MAX-ACCESS  read-only\n    STATUS      obsolete\n"));
    }

    #[test]
    fn test_table() {
        let text = generate();
        assert!(text.contains(
            "chassisSlotTable OBJECT-TYPE\n    SYNTAX      SEQUENCE OF ChassisSlotEntry\n    MAX-ACCESS  not-accessible\n"
        ));
        assert!(text.contains("    INDEX       { slotIndex }\n    ::= { chassisSlotTable 1 }\n"));
        assert!(text.contains(
            "ChassisSlotEntry ::= SEQUENCE {\n    slotIndex  Unsigned32,\n    slotPower  Unsigned32\n}\n"
        ));
        assert!(text.contains("slotIndex OBJECT-TYPE\n    SYNTAX      Unsigned32\n    MAX-ACCESS  read-only\n"));
        assert!(text.contains("::= { chassisSlotEntry 1 }"));
        assert!(text.contains("slotPower OBJECT-TYPE\n    SYNTAX      Unsigned32\n    MAX-ACCESS  read-write\n"));
        assert!(text.contains("::= { chassisSlotEntry 2 }"));
    }

    #[test]
    fn test_notification() {
        let text = generate();
        assert!(text.contains(
            "chassisOverheat NOTIFICATION-TYPE\n    OBJECTS     { overheatTemp }\n    STATUS      current\n"
        ));
        assert!(text.contains("    ::= { chassisMib 2 }\n"));
        assert!(text.contains(
            "overheatTemp OBJECT-TYPE\n    SYNTAX      Integer32\n    MAX-ACCESS  accessible-for-notify\n"
        ));
        assert!(text.contains("::= { chassisOverheat 1 }"));
    }

    #[test]
    fn test_objects_follow_registry_numbering() {
        let r = registry();
        let text = generate();
        // every leaf the registry serves is named in the text
        for leaf in r.inventory().leaves() {
            assert!(text.contains(&format!("{} OBJECT-TYPE", leaf.name)), "{}", leaf.name);
        }
    }

    // ========================================================================
    // Conformance
    // ========================================================================

    #[test]
    fn test_conformance() {
        let text = generate();
        assert!(text.contains("chassisMibConformance OBJECT IDENTIFIER\n    ::= { chassisMib 3 }\n"));
        // obsolete leaves stay out of groups
        assert!(text.contains(
            "chassisUnitInfoGroup OBJECT-GROUP\n    OBJECTS     { unitName, unitTemp }\n"
        ));
        assert!(text.contains("    ::= { chassisMibGroups 1 }\n"));
        assert!(text.contains("chassisSlotTableInfoGroup OBJECT-GROUP"));
        assert!(text.contains("    ::= { chassisMibGroups 2 }\n"));
        assert!(text.contains(
            "chassisOverheatInfoGroup NOTIFICATION-GROUP\n    NOTIFICATIONS { chassisOverheat }\n"
        ));
        assert!(text.contains("    ::= { chassisMibGroups 3 }\n"));
        assert!(text.contains("MODULE-COMPLIANCE"));
        assert!(text.contains("chassisUnitInfoGroup, chassisSlotTableInfoGroup"));
    }

    #[test]
    fn test_conformance_arc_override() {
        let text = MibGenerator::new("CHASSIS-MIB")
            .conformance_arc(20)
            .generate(&registry(), "chassisMib")
            .unwrap();
        assert!(text.contains("chassisMibConformance OBJECT IDENTIFIER\n    ::= { chassisMib 20 }\n"));
    }

    // ========================================================================
    // Text layout
    // ========================================================================

    struct Braced(&'static [&'static str]);

    impl fmt::Display for Braced {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_braced(f, "    OBJECTS    ", self.0)
        }
    }

    struct Text(&'static str);

    impl fmt::Display for Text {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_text(f, self.0)
        }
    }

    #[test]
    fn test_long_lists_wrap() {
        let items = &[
            "alphaObjectName",
            "betaObjectName",
            "gammaObjectName",
            "deltaObjectName",
            "epsilonObjectName",
        ];
        let text = Braced(items).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= LINE_WIDTH));
        assert!(lines[1].starts_with(&" ".repeat(18)));
        assert!(text.ends_with(" }\n"));
        let joined: String = text.split_whitespace().collect();
        assert!(joined.contains("alphaObjectName,betaObjectName"));
    }

    #[test]
    fn test_text_wraps_words() {
        let text = Text(
            "A rather long description that keeps going well past the line width of a MIB file",
        )
        .to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("        \"A rather"));
        assert!(lines[1].starts_with("         "));
        assert!(lines[1].ends_with("file\""));
        assert_eq!(Text("").to_string(), "        \"\"\n");
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(entry_name("portTable"), "portEntry");
        assert_eq!(entry_type("portTable"), "PortEntry");
        assert_eq!(entry_name("ports"), "portsEntry");
    }
}
