use crate::render::BackendError;

/// Pixel layout of texture uploads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, sRGB encoded.
    #[default]
    Rgba8Srgb,
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// Single 8-bit channel (masks, glyph coverage).
    R8Unorm,
}

impl TextureFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::Rgba8Srgb | TextureFormat::Rgba8Unorm => 4,
            TextureFormat::R8Unorm => 1,
        }
    }
}

/// Texture creation parameters.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct TextureDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureDesc {
    pub fn new(label: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
        }
    }

    /// Tightly packed row size in bytes, `None` if it does not fit a `u32`.
    #[inline]
    pub fn bytes_per_row(&self) -> Option<u32> {
        self.width.checked_mul(self.format.bytes_per_pixel())
    }

    /// Expected upload size in bytes, `None` on overflow.
    #[inline]
    pub fn byte_len(&self) -> Option<usize> {
        (self.bytes_per_row()? as usize).checked_mul(self.height as usize)
    }

    /// Checks that `pixels` matches the described dimensions.
    pub fn check(&self, pixels: &[u8]) -> Result<(), BackendError> {
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::invalid("texture", format!(
                "{}: zero extent {}x{}",
                self.label, self.width, self.height
            )));
        }
        let Some(expected) = self.byte_len() else {
            return Err(BackendError::invalid("texture", format!(
                "{}: {}x{} {:?} is too large to address",
                self.label, self.width, self.height, self.format
            )));
        };
        if pixels.len() != expected {
            return Err(BackendError::invalid("texture", format!(
                "{}: expected {expected} bytes for {}x{} {:?}, got {}",
                self.label,
                self.width,
                self.height,
                self.format,
                pixels.len()
            )));
        }
        Ok(())
    }
}

/// Mesh creation parameters.
///
/// Vertices are opaque bytes with a fixed stride; indices are `u32`.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct MeshDesc {
    pub label: String,
    pub vertex_stride: u32,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl MeshDesc {
    /// Describes a mesh of `vertex_count` vertices of type `V`.
    pub fn of<V>(label: impl Into<String>, vertex_count: usize, index_count: usize) -> Self {
        Self {
            label: label.into(),
            vertex_stride: std::mem::size_of::<V>() as u32,
            vertex_count: vertex_count as u32,
            index_count: index_count as u32,
        }
    }

    /// Checks the payload against the description, including index bounds.
    pub fn check(&self, vertices: &[u8], indices: &[u32]) -> Result<(), BackendError> {
        if self.vertex_stride == 0 || self.vertex_count == 0 {
            return Err(BackendError::invalid("mesh", format!("{}: empty vertex layout", self.label)));
        }
        let expected = (self.vertex_stride as usize).checked_mul(self.vertex_count as usize);
        if expected != Some(vertices.len()) {
            return Err(BackendError::invalid("mesh", format!(
                "{}: expected {} x {} vertex bytes, got {}",
                self.label,
                self.vertex_count,
                self.vertex_stride,
                vertices.len()
            )));
        }
        if indices.len() != self.index_count as usize {
            return Err(BackendError::invalid("mesh", format!(
                "{}: expected {} indices, got {}",
                self.label,
                self.index_count,
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i >= self.vertex_count) {
            return Err(BackendError::invalid("mesh", format!(
                "{}: index {bad} out of range for {} vertices",
                self.label, self.vertex_count
            )));
        }
        Ok(())
    }
}
