//! Name-keyed algorithm registry shared by the emissivity and LST families

use crate::types::{LstError, LstResult};
use std::collections::BTreeMap;

/// An algorithm that can be invoked uniformly through a [`Runner`]
pub trait Algorithm<I: ?Sized> {
    type Output;

    /// Run the algorithm on its inputs
    fn run(&self, input: &I) -> LstResult<Self::Output>;
}

/// Constructor of a registered algorithm
pub type Factory<T> = fn() -> Box<T>;

/// Lookup table from algorithm name to factory.
///
/// `T` is the family's trait object, e.g. `dyn EmissivityAlgorithm`.
pub struct Runner<T: ?Sized> {
    family: &'static str,
    algorithms: BTreeMap<&'static str, Factory<T>>,
}

impl<T: ?Sized> Runner<T> {
    /// Create an empty registry for an algorithm family
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            algorithms: BTreeMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous entry
    pub fn with(mut self, name: &'static str, factory: Factory<T>) -> Self {
        self.register(name, factory);
        self
    }

    pub fn register(&mut self, name: &'static str, factory: Factory<T>) {
        if self.algorithms.insert(name, factory).is_some() {
            log::warn!("Replacing {} algorithm '{}'", self.family, name);
        }
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.algorithms.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    /// Instantiate the algorithm registered under `name`
    pub fn resolve(&self, name: &str) -> LstResult<Box<T>> {
        match self.algorithms.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(LstError::UnknownAlgorithm {
                family: self.family,
                name: name.to_string(),
                available: self.names().iter().map(|n| n.to_string()).collect(),
            }),
        }
    }

    /// Look up `name`, instantiate it and run it on `input`
    pub fn invoke<I>(&self, name: &str, input: &I) -> LstResult<<T as Algorithm<I>>::Output>
    where
        I: ?Sized,
        T: Algorithm<I>,
    {
        let algorithm = self.resolve(name)?;
        log::debug!("Invoking {} algorithm '{}'", self.family, name);
        algorithm.run(input)
    }
}

impl<T: ?Sized> std::fmt::Debug for Runner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("family", &self.family)
            .field("algorithms", &self.names())
            .finish()
    }
}
