use crate::{Result, Row, Value};

use std::{fmt, sync::Arc};

/// Lifecycle points at which the base save primitive runs hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeSave,
    AfterSave,
    BeforeCreate,
    AfterCreate,
}

type HookFn = dyn Fn(&mut Row) -> Result<()> + Send + Sync;

/// Lifecycle hooks of a model, run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: Vec<(HookKind, Arc<HookFn>)>,
}

/// An instance method extension. Receives the instance's attribute values and
/// the call arguments.
#[derive(Clone)]
pub struct Method(Arc<dyn Fn(&Row, &[Value]) -> Result<Value> + Send + Sync>);

/// A static (model-level) method extension.
#[derive(Clone)]
pub struct StaticMethod(Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>);

impl Hooks {
    pub fn add<F>(&mut self, kind: HookKind, f: F)
    where
        F: Fn(&mut Row) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.push((kind, Arc::new(f)));
    }

    /// Runs every hook registered for `kind`, stopping at the first failure.
    pub fn run(&self, kind: HookKind, row: &mut Row) -> Result<()> {
        for (_, hook) in self.hooks.iter().filter(|(k, _)| *k == kind) {
            hook(row)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|(kind, _)| kind))
            .finish()
    }
}

impl Method {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Row, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, row: &Row, args: &[Value]) -> Result<Value> {
        (self.0)(row, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

impl StaticMethod {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.0)(args)
    }
}

impl fmt::Debug for StaticMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticMethod(..)")
    }
}
