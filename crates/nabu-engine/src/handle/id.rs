use core::fmt;

/// Untyped `{index, generation}` reference into a `HandleTable`.
///
/// Equality compares both fields. The canonical null handle is
/// `{u32::MAX, u32::MAX}`; it never validates against any table.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Reserved generation bit marking a freed slot.
    pub const TOMBSTONE_BIT: u32 = 1 << 31;

    /// Bits available for live generation values.
    pub const GENERATION_MASK: u32 = !Self::TOMBSTONE_BIT;

    pub const NULL: Handle = Handle {
        index: u32::MAX,
        generation: u32::MAX,
    };

    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns `false` only for the null handle.
    ///
    /// This says nothing about liveness; use `HandleTable::owns` for that.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        !(self.index == Self::NULL.index && self.generation == Self::NULL.generation)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({}v{})", self.index, self.generation)
        } else {
            f.write_str("Handle(null)")
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}v{}", self.index, self.generation)
        } else {
            f.write_str("null")
        }
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $name(Handle);

        impl $name {
            pub const NULL: $name = $name(Handle::NULL);

            #[inline]
            pub const fn from_raw(handle: Handle) -> Self {
                Self(handle)
            }

            #[inline]
            pub const fn raw(&self) -> Handle {
                self.0
            }

            #[inline]
            pub const fn is_valid(&self) -> bool {
                self.0.is_valid()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_handle!(
    /// Handle to a GPU texture owned by the render thread.
    TextureHandle
);

typed_handle!(
    /// Handle to a GPU mesh (vertex + index buffers) owned by the render thread.
    MeshHandle
);
