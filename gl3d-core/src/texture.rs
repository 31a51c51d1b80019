/// 2D RGBA textures.
use crate::error::TextureError;
use crate::gpu::{GpuContext, MAX_TEXTURE_UNIT};

#[derive(Debug, Clone, PartialEq)]
pub struct Texture2d<T> {
    handle: T,
    width: u32,
    height: u32,
}

impl<T> Texture2d<T> {
    /// Creates a texture from tightly packed RGBA8 pixels with linear
    /// filtering.
    pub fn upload_rgba<C: GpuContext<Texture = T>>(
        ctx: &C,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let handle = ctx.create_texture().ok_or(TextureError::CreationFailed)?;
        ctx.bind_texture(Some(&handle));
        ctx.tex_linear_filtering();
        ctx.tex_image_rgba(width, height, pixels);
        log::debug!("Uploaded {}x{} texture", width, height);

        Ok(Self {
            handle,
            width,
            height,
        })
    }

    pub fn handle(&self) -> &T {
        &self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Makes this texture current on texture `unit` (0..=31).
    pub fn bind<C: GpuContext<Texture = T>>(&self, ctx: &C, unit: u32) -> Result<(), TextureError> {
        if unit > MAX_TEXTURE_UNIT {
            return Err(TextureError::UnitOutOfRange(unit));
        }
        ctx.active_texture(unit);
        ctx.bind_texture(Some(&self.handle));
        Ok(())
    }

    pub fn delete<C: GpuContext<Texture = T>>(self, ctx: &C) {
        ctx.delete_texture(&self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::headless::GpuCall;
    use crate::gpu::HeadlessContext;

    #[test]
    fn test_upload_and_bind() {
        let ctx = HeadlessContext::new();
        let texture = Texture2d::upload_rgba(&ctx, 2, 2, &[255; 16]).unwrap();
        assert_eq!(texture.size(), (2, 2));

        ctx.clear_calls();
        texture.bind(&ctx, 31).unwrap();
        assert_eq!(
            ctx.calls(),
            vec![
                GpuCall::ActiveTexture(31),
                GpuCall::BindTexture(Some(*texture.handle()))
            ]
        );
    }

    #[test]
    fn test_unit_out_of_range() {
        let ctx = HeadlessContext::new();
        let texture = Texture2d::upload_rgba(&ctx, 1, 1, &[0, 0, 0, 255]).unwrap();
        assert_eq!(texture.bind(&ctx, 32), Err(TextureError::UnitOutOfRange(32)));
    }

    #[test]
    fn test_size_mismatch() {
        let ctx = HeadlessContext::new();
        assert_eq!(
            Texture2d::upload_rgba(&ctx, 2, 2, &[0; 12]),
            Err(TextureError::SizeMismatch {
                expected: 16,
                actual: 12
            })
        );
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn test_creation_failure() {
        let ctx = HeadlessContext::new();
        ctx.set_exhausted(true);
        assert_eq!(
            Texture2d::upload_rgba(&ctx, 1, 1, &[0; 4]),
            Err(TextureError::CreationFailed)
        );
    }
}
