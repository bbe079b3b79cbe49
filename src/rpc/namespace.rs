//! Dotted method name routing.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{FunctionExporter, PrivilegeChecker, Request, access_denied, error_response};

enum Entry {
    Namespace(RpcNamespace),
    Function(Box<dyn FunctionExporter>),
}

/// A level of the method name tree.
///
/// Method `a.b.c` is found by descending into namespace `a`, then `b`, and
/// calling function `c`. Unknown segments answer exactly as a denied call.
#[derive(Default)]
pub struct RpcNamespace {
    children: BTreeMap<String, Entry>,
}

impl RpcNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child namespace. A name already in use keeps its first entry.
    pub fn namespace(mut self, name: impl Into<String>, ns: RpcNamespace) -> Self {
        self.insert(name.into(), Entry::Namespace(ns));
        self
    }

    /// Add a function under its own name.
    pub fn function(mut self, f: impl FunctionExporter + 'static) -> Self {
        let name = f.name().to_string();
        self.insert(name, Entry::Function(Box::new(f)));
        self
    }

    fn insert(&mut self, name: String, entry: Entry) {
        if self.children.contains_key(&name) {
            tracing::warn!(target: "mib_expose::rpc", name = %name, "duplicate method name ignored");
            return;
        }
        self.children.insert(name, entry);
    }

    /// Fully qualified names of all registered functions, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect("", &mut out);
        out
    }

    fn collect(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, entry) in &self.children {
            let full = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match entry {
                Entry::Namespace(ns) => ns.collect(&full, out),
                Entry::Function(_) => out.push(full),
            }
        }
    }

    /// Route a parsed request and produce its response.
    pub fn dispatch(&self, req: &Request, checker: &dyn PrivilegeChecker) -> Value {
        tracing::trace!(target: "mib_expose::rpc", method = %req.method, "dispatch");
        self.route(&req.method, req, checker)
    }

    fn route(&self, method: &str, req: &Request, checker: &dyn PrivilegeChecker) -> Value {
        let (head, rest) = method.split_once('.').unwrap_or((method, ""));
        match self.children.get(head) {
            Some(Entry::Namespace(ns)) => ns.route(rest, req, checker),
            Some(Entry::Function(f)) => f.handle(req, rest, checker),
            None => {
                tracing::debug!(target: "mib_expose::rpc", method = %req.method, "no such method");
                access_denied(&req.id)
            }
        }
    }

    /// Parse `text` and dispatch it. Unparsable requests get an error
    /// envelope with a null id.
    pub fn handle_text(&self, text: &str, checker: &dyn PrivilegeChecker) -> Value {
        match Request::parse(text) {
            Ok(req) => self.dispatch(&req, checker),
            Err(code) => error_response(&Value::Null, code, None),
        }
    }
}
