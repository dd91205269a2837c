use crate::render::Acquired;
use crate::window::Extent;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let srgb = caps.formats.iter().copied().find(|f| {
            matches!(
                f,
                wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
            )
        });
        if srgb.is_some() {
            return srgb;
        }
    }

    caps.formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Records `size` and configures the surface unless it is zero-sized; wgpu
/// rejects 0x0 configurations.
pub(crate) fn configure(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: Extent,
) {
    if size.is_zero() {
        return;
    }
    config.width = size.width;
    config.height = size.height;
    surface.configure(device, config);
}

/// Maps an acquire failure to what the render pass should do this tick.
///
/// Lost and outdated surfaces are reconfigured on the spot; out-of-memory is
/// the only fatal case.
pub(crate) fn recover<F>(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: Extent,
    err: wgpu::SurfaceError,
) -> Result<Acquired<F>, wgpu::SurfaceError> {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            configure(surface, device, config, size);
            Ok(Acquired::Reconfigured)
        }
        wgpu::SurfaceError::OutOfMemory => Err(err),
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Ok(Acquired::Skipped),
    }
}
