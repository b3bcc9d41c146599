use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// Structure for storing elements of type `Value`, the structure can only be indexed by structures
/// of type `Key`.
///
/// Almost all features of this structure require that `Key` implements the [StorageKey] trait.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct KeyedVec<Key, Value> {
    /// [PhantomData] to ensure that the [KeyedVec] is bound to the structure
    key: PhantomData<Key>,
    /// Storage of the elements of type `Value`
    elements: Vec<Value>,
}

impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        Self {
            key: PhantomData,
            elements: self.elements.clone(),
        }
    }
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        Self {
            key: PhantomData,
            elements: Vec::default(),
        }
    }
}

impl<Key, Value> KeyedVec<Key, Value> {
    pub const fn new() -> Self {
        Self {
            key: PhantomData,
            elements: Vec::new(),
        }
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a new value to the vector.
    ///
    /// Returns the key for the inserted value.
    pub fn push(&mut self, value: Value) -> Key {
        self.elements.push(value);

        Key::create_from_index(self.elements.len() - 1)
    }

    /// Returns the value stored for `key`, if `key` lies within the vector.
    pub fn get(&self, key: Key) -> Option<&Value> {
        self.elements.get(key.index())
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut Value> {
        self.elements.get_mut(key.index())
    }

    /// Iterate over the values in the vector.
    pub fn iter(&self) -> impl Iterator<Item = &'_ Value> {
        self.elements.iter()
    }

    /// Iterate over the key-value pairs of the vector.
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (Key, &'_ Value)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, value)| (Key::create_from_index(index), value))
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> Index<&Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: &Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, index: Key) -> &mut Self::Output {
        &mut self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> FromIterator<Value> for KeyedVec<Key, Value> {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self {
            key: PhantomData,
            elements: iter.into_iter().collect(),
        }
    }
}

impl StorageKey for usize {
    fn index(&self) -> usize {
        *self
    }

    fn create_from_index(index: usize) -> Self {
        index
    }
}

/// A simple trait which requires that the structures implementing this trait can generate an index.
pub trait StorageKey {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

/// Declares a copyable handle type which indexes a [`KeyedVec`].
///
/// The handle displays as its prefix followed by its index, e.g. `Class 3`.
#[macro_export]
#[doc(hidden)]
macro_rules! storage_key {
    ($(#[$documentation:meta])* $name:ident, $prefix:literal) => {
        $(#[$documentation])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            id: u32,
        }

        impl $crate::containers::StorageKey for $name {
            fn index(&self) -> usize {
                self.id as usize
            }

            fn create_from_index(index: usize) -> Self {
                Self { id: index as u32 }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", $prefix, self.id)
            }
        }
    };
}
