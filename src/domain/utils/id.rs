use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Numeric identifier tagged with the kind of entity it refers to.
///
/// Node ids come straight from the trace files and channel ids are 0-based
/// channel indices, so both are small bounded integers.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<T> {
    pub id: u16,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub const fn new(id: u16) -> Self {
        Id { id, _marker: PhantomData }
    }

    pub fn index(&self) -> usize {
        self.id as usize
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {}", display_name, self.id)
    }
}

impl<T> From<u16> for Id<T> {
    fn from(id: u16) -> Self {
        Id::new(id)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct NodeTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ChannelTag;

pub type NodeId = Id<NodeTag>;
pub type ChannelId = Id<ChannelTag>;
