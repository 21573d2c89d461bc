macro_rules! impl_id {
    ($name:ident, $tp:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name($tp);

        impl $name {
            /// Create a new id.
            #[inline]
            pub const fn new(index: $tp) -> Self {
                $name(index)
            }

            /// Get the id as usize, suitable for indexing.
            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Get the raw id.
            #[inline]
            pub fn id(&self) -> $tp {
                self.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$tp> for $name {
            fn from(index: $tp) -> Self {
                $name::new(index)
            }
        }
    };
}

/// Base type of [`StateID`].
pub(crate) type StateIDBase = u32;
impl_id!(
    StateID,
    StateIDBase,
    "The ID of a DFA state. States keep their id through minimization, state 0 is the start state."
);

/// Base type of [`NodeID`].
pub(crate) type NodeIDBase = u32;
impl_id!(
    NodeID,
    NodeIDBase,
    "The ID of a node in the arena of an expression tree."
);

/// Base type of [`PositionID`].
pub(crate) type PositionIDBase = u32;
impl_id!(
    PositionID,
    PositionIDBase,
    "The ID of a position (leaf) in an expression tree. Ids follow creation order."
);

impl_id!(
    ContextID,
    usize,
    "The ID of a lexer context. It is the index of the context in the lexer."
);
