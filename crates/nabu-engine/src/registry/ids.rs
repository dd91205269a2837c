use core::fmt;

/// Key type accepted by `SystemRegistry`.
pub trait RegistryKey: Copy + Eq + core::hash::Hash + fmt::Display {}

macro_rules! logical_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(pub u64);

        impl $name {
            /// Sentinel meaning "no id".
            pub const NULL: $name = $name(u64::MAX);

            #[inline]
            pub const fn is_null(&self) -> bool {
                self.0 == u64::MAX
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    write!(f, concat!($prefix, ":null"))
                } else {
                    write!(f, concat!($prefix, ":{}"), self.0)
                }
            }
        }

        impl RegistryKey for $name {}
    };
}

logical_id!(
    /// Window identifier supplied by the windowing layer.
    WindowId,
    "window"
);

logical_id!(
    /// Scene identifier supplied by the scene layer.
    SceneId,
    "scene"
);

logical_id!(
    /// Camera identifier, scoped to a scene.
    CameraId,
    "camera"
);
