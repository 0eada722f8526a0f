// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Name-keyed attribute registry for one scope

use super::store::{AttributeValue, ExtraData, SingleDataExtraData, ValueType};
use crate::error::{MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity family an attribute is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Mesh,
    Vertex,
    Triangle,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Mesh => "mesh",
            Scope::Vertex => "vertex",
            Scope::Triangle => "triangle",
        }
    }

    pub fn all() -> [Scope; 3] {
        [Scope::Mesh, Scope::Vertex, Scope::Triangle]
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute stores of one scope, in insertion order
#[derive(Debug)]
pub struct ExtraDataContainer {
    scope: Scope,
    entries: Vec<(String, Box<dyn ExtraData>)>,
}

impl Clone for ExtraDataContainer {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope,
            entries: self
                .entries
                .iter()
                .map(|(name, store)| (name.clone(), store.clone_box()))
                .collect(),
        }
    }
}

impl ExtraDataContainer {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            entries: Vec::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Stores with their names, in attachment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn ExtraData)> + '_ {
        self.entries
            .iter()
            .map(|(name, store)| (name.as_str(), store.as_ref()))
    }

    /// Type-erased view of a store
    pub fn get_erased(&self, name: &str) -> MeshResult<&dyn ExtraData> {
        self.position(name)
            .map(|i| self.entries[i].1.as_ref())
            .ok_or_else(|| self.not_found(name))
    }

    /// Typed view of a store, checking the stored value type first
    pub fn get<T: AttributeValue>(&self, name: &str) -> MeshResult<&SingleDataExtraData<T>> {
        let store = self.get_erased(name)?;
        self.check_type::<T>(name, store.value_type())?;
        store
            .as_any()
            .downcast_ref::<SingleDataExtraData<T>>()
            .ok_or_else(|| self.mismatch::<T>(name, store.value_type()))
    }

    pub(crate) fn get_mut<T: AttributeValue>(
        &mut self,
        name: &str,
    ) -> MeshResult<&mut SingleDataExtraData<T>> {
        let index = self.position(name).ok_or_else(|| self.not_found(name))?;
        let stored = self.entries[index].1.value_type();
        self.check_type::<T>(name, stored)?;
        let scope = self.scope;
        self.entries[index]
            .1
            .as_any_mut()
            .downcast_mut::<SingleDataExtraData<T>>()
            .ok_or_else(|| type_mismatch::<T>(scope, name, stored))
    }

    pub(crate) fn insert<T: AttributeValue>(
        &mut self,
        name: &str,
        store: SingleDataExtraData<T>,
    ) -> MeshResult<()> {
        if self.contains(name) {
            return Err(MeshError::DuplicateName {
                scope: self.scope,
                name: name.to_string(),
            });
        }
        self.entries.push((name.to_string(), Box::new(store)));
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) -> MeshResult<Box<dyn ExtraData>> {
        let index = self.position(name).ok_or_else(|| self.not_found(name))?;
        Ok(self.entries.remove(index).1)
    }

    pub(crate) fn resize_all(&mut self, slots: usize) {
        for (_, store) in &mut self.entries {
            store.resize_to(slots);
        }
    }

    pub(crate) fn remove_slot_all(&mut self, slot: usize) {
        for (_, store) in &mut self.entries {
            store.remove_at(slot);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn check_type<T: 'static>(&self, name: &str, stored: ValueType) -> MeshResult<()> {
        if stored == ValueType::of::<T>() {
            Ok(())
        } else {
            Err(self.mismatch::<T>(name, stored))
        }
    }

    fn mismatch<T: 'static>(&self, name: &str, stored: ValueType) -> MeshError {
        type_mismatch::<T>(self.scope, name, stored)
    }

    fn not_found(&self, name: &str) -> MeshError {
        MeshError::NotFound {
            scope: self.scope,
            name: name.to_string(),
        }
    }
}

fn type_mismatch<T: 'static>(scope: Scope, name: &str, stored: ValueType) -> MeshError {
    MeshError::TypeMismatch {
        scope,
        name: name.to_string(),
        stored: stored.name(),
        requested: std::any::type_name::<T>(),
    }
}
