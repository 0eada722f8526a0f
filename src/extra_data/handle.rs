// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Typed handles and write views over attribute stores

use super::container::Scope;
use super::store::{AttributeValue, SingleDataExtraData};
use crate::error::{MeshError, MeshResult};
use crate::geometry::{Mesh, MeshId};
use std::marker::PhantomData;
use std::ops::Deref;

/// Typed reference to an attached attribute, returned by [`Mesh::attach`]
#[derive(Debug)]
pub struct AttributeHandle<T> {
    mesh: MeshId,
    scope: Scope,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for AttributeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            mesh: self.mesh,
            scope: self.scope,
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: AttributeValue> AttributeHandle<T> {
    pub(crate) fn new(mesh: MeshId, scope: Scope, name: &str) -> Self {
        Self {
            mesh,
            scope,
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    /// Read view of the store in `mesh`
    pub fn get<'m>(&self, mesh: &'m Mesh) -> MeshResult<&'m SingleDataExtraData<T>> {
        self.check(mesh)?;
        mesh.attribute::<T>(self.scope, &self.name)
    }

    /// Write view of the store in `mesh`
    pub fn get_mut<'m>(&self, mesh: &'m mut Mesh) -> MeshResult<AttributeMut<'m, T>> {
        self.check(mesh)?;
        mesh.attribute_mut::<T>(self.scope, &self.name)
    }

    fn check(&self, mesh: &Mesh) -> MeshResult<()> {
        if mesh.id() == self.mesh {
            Ok(())
        } else {
            Err(MeshError::ForeignHandle)
        }
    }
}

/// Per-slot write access to a store
///
/// Values can be replaced but the store can never be resized through this view.
#[derive(Debug)]
pub struct AttributeMut<'a, T> {
    scope: Scope,
    store: &'a mut SingleDataExtraData<T>,
}

impl<'a, T: AttributeValue> AttributeMut<'a, T> {
    pub(crate) fn new(scope: Scope, store: &'a mut SingleDataExtraData<T>) -> Self {
        Self { scope, store }
    }

    /// Replace the value of a live slot
    pub fn set(&mut self, slot: impl Into<usize>, value: T) -> MeshResult<()> {
        let slot = slot.into();
        if self.store.set(slot, value) {
            Ok(())
        } else {
            Err(MeshError::InvalidIndex {
                scope: self.scope,
                index: slot,
            })
        }
    }

    pub fn get_mut(&mut self, slot: impl Into<usize>) -> Option<&mut T> {
        self.store.get_mut(slot.into())
    }

    /// Assign `value` to every live slot
    pub fn fill(&mut self, value: T) {
        let slots: Vec<usize> = self.store.iter().map(|(slot, _)| slot).collect();
        for slot in slots {
            self.store.set(slot, value.clone());
        }
    }
}

impl<'a, T> Deref for AttributeMut<'a, T> {
    type Target = SingleDataExtraData<T>;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}
