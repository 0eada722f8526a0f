// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Type-erased attribute stores

use std::any::{Any, TypeId};
use std::fmt;

/// Values that can live in an attribute store
pub trait AttributeValue: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> AttributeValue for T {}

/// Runtime tag identifying the value type of a store
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Capability set shared by every attribute store
///
/// A store holds one slot per index its owning scope has ever issued. Slots of
/// retired entities hold no value, so `len()` always equals the live entity count.
/// Only the owning [`Mesh`](crate::geometry::Mesh) resizes stores; callers see them
/// through shared references.
pub trait ExtraData: fmt::Debug + Send + Sync {
    /// Number of live values
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, including retired ones
    fn slot_count(&self) -> usize;

    fn is_live(&self, slot: usize) -> bool;

    /// Grow or shrink to `slots`, filling new slots with the store default
    fn resize_to(&mut self, slots: usize);

    /// Retire a slot
    fn remove_at(&mut self, slot: usize);

    fn value_type(&self) -> ValueType;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_box(&self) -> Box<dyn ExtraData>;
}

/// Store holding one `T` per owning entity
#[derive(Debug, Clone)]
pub struct SingleDataExtraData<T> {
    slots: Vec<Option<T>>,
    default: T,
    live: usize,
}

impl<T: AttributeValue> SingleDataExtraData<T> {
    /// Build a store with one slot per entry of `liveness`, live slots set to `default`
    pub(crate) fn from_liveness<I>(liveness: I, default: T) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let slots: Vec<Option<T>> = liveness
            .into_iter()
            .map(|alive| alive.then(|| default.clone()))
            .collect();
        let live = slots.iter().filter(|slot| slot.is_some()).count();
        Self {
            slots,
            default,
            live,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Value of a live slot
    pub fn get(&self, slot: impl Into<usize>) -> Option<&T> {
        self.slots.get(slot.into()).and_then(Option::as_ref)
    }

    /// Value new slots are initialized with
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Live slots with their values, in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.as_ref().map(|v| (slot, v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().flatten()
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Overwrite a live slot; false when the slot is retired or out of range
    pub(crate) fn set(&mut self, slot: usize, value: T) -> bool {
        match self.get_mut(slot) {
            Some(current) => {
                *current = value;
                true
            }
            None => false,
        }
    }
}

impl<T: AttributeValue> ExtraData for SingleDataExtraData<T> {
    fn len(&self) -> usize {
        self.live
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn is_live(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    fn resize_to(&mut self, slots: usize) {
        if slots < self.slots.len() {
            self.slots.truncate(slots);
            self.live = self.slots.iter().filter(|slot| slot.is_some()).count();
            return;
        }
        let added = slots - self.slots.len();
        let default = &self.default;
        self.slots
            .extend(std::iter::repeat_with(|| Some(default.clone())).take(added));
        self.live += added;
    }

    fn remove_at(&mut self, slot: usize) {
        if let Some(value) = self.slots.get_mut(slot) {
            if value.take().is_some() {
                self.live -= 1;
            }
        }
    }

    fn value_type(&self) -> ValueType {
        ValueType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn ExtraData> {
        Box::new(self.clone())
    }
}
