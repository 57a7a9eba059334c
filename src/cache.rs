// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cache of loaded terminfo entries, keyed by every terminal name

use std::{
    collections::HashMap,
    ffi::OsStr,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use tracing::debug;

use crate::{
    decode::Terminfo,
    locate::{self, LoadError},
};

/// Shared, immutable terminfo entries by terminal name
///
/// An entry is published under all of its names at once. Published entries
/// are never modified, a reload replaces them.
#[derive(Debug, Default)]
pub struct Cache {
    entries: RwLock<HashMap<String, Arc<Terminfo>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache
    pub fn global() -> &'static Self {
        static GLOBAL: LazyLock<Cache> = LazyLock::new(Cache::new);
        &GLOBAL
    }

    /// Entry cached under the name
    pub fn get(&self, name: &str) -> Option<Arc<Terminfo>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned()
    }

    /// Publish the entry under all of its names
    pub fn insert(&self, terminfo: Terminfo) -> Arc<Terminfo> {
        let terminfo = Arc::new(terminfo);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for name in &terminfo.names {
            entries.insert(name.clone(), Arc::clone(&terminfo));
        }
        terminfo
    }

    /// Cached entry for the terminal, loaded from disk if not cached yet
    pub fn load(&self, term_name: &str) -> Result<Arc<Terminfo>, LoadError> {
        if let Some(terminfo) = self.get(term_name) {
            return Ok(terminfo);
        }
        let terminfo = locate::load(OsStr::new(term_name))?;
        debug!(term_name, aliases = terminfo.names.len(), "caching terminfo entry");
        Ok(self.insert(terminfo))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
