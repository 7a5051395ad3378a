//! Pan, zoom and sphere-map navigation.
//!
//! Offsets are the target-space position of the image's top-left corner.

use crate::config::ViewConfig;

/// One pointer manipulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manipulation {
    /// Pointer position in target pixels.
    pub position: (f32, f32),
    /// Translation since the last step.
    pub translation: (f32, f32),
    /// Relative scale since the last step, 1.0 for none.
    pub scale: f32,
}

impl Manipulation {
    /// Pure translation.
    pub fn pan(dx: f32, dy: f32) -> Self {
        Self { position: (0.0, 0.0), translation: (dx, dy), scale: 1.0 }
    }

    /// Zoom about a pointer position.
    pub fn zoom_at(x: f32, y: f32, scale: f32) -> Self {
        Self { position: (x, y), translation: (0.0, 0.0), scale }
    }
}

/// View transform of the current image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Image scale.
    pub zoom: f32,
    /// Top-left of the image in target pixels.
    pub offset: (f32, f32),
    /// Render target size.
    pub target_size: (u32, u32),
    /// Image size in pixels.
    pub image_size: (u32, u32),
    /// Sphere projection center, normalized.
    pub sphere_center: [f32; 2],
    /// Sphere radius relative to the smaller target side.
    pub sphere_zoom: f32,
    /// Smallest standard-mode zoom, the letterbox zoom of the last fit.
    pub min_zoom: f32,
    sphere_pointer: (f32, f32),
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: (0.0, 0.0),
            target_size: (0, 0),
            image_size: (0, 0),
            sphere_center: [0.0, 0.5],
            sphere_zoom: 1.0,
            min_zoom: 1.0,
            sphere_pointer: (0.0, 0.0),
        }
    }
}

impl ViewState {
    /// Letterboxes and centers the image. Returns false when either size is
    /// empty, leaving the view untouched.
    pub fn fit(&mut self, image_size: (u32, u32), config: &ViewConfig) -> bool {
        let (tw, th) = (self.target_size.0 as f32, self.target_size.1 as f32);
        let (iw, ih) = (image_size.0 as f32, image_size.1 as f32);
        if tw == 0.0 || th == 0.0 || iw == 0.0 || ih == 0.0 {
            return false;
        }
        self.image_size = image_size;
        self.zoom = config.max_zoom.min((tw / iw).min(th / ih));
        self.min_zoom = self.zoom;
        self.offset = ((tw - iw * self.zoom) * 0.5, (th - ih * self.zoom) * 0.5);

        self.sphere_zoom = self.zoom.clamp(config.min_sphere_zoom, config.max_zoom);
        self.sphere_pointer = (0.0, th * 0.5);
        self.sphere_center = [0.0, 0.5];
        true
    }

    /// Output size of the sphere projection.
    pub fn scene_size(&self) -> [f32; 2] {
        [self.image_size.0 as f32 * self.zoom, self.image_size.1 as f32 * self.zoom]
    }

    /// Applies a manipulation step.
    ///
    /// Sphere mode moves the projection and leaves pan/zoom untouched.
    pub fn manipulate(&mut self, m: &Manipulation, sphere_mode: bool, config: &ViewConfig) {
        let scale = if m.scale.is_finite() && m.scale > 0.0 { m.scale } else { 1.0 };
        if sphere_mode {
            self.sphere_pointer.0 += m.translation.0;
            self.sphere_pointer.1 += m.translation.1;
            let (tw, th) = (self.target_size.0.max(1) as f32, self.target_size.1.max(1) as f32);
            self.sphere_center = [self.sphere_pointer.0 / tw, self.sphere_pointer.1 / th];
            self.sphere_zoom = (self.sphere_zoom * scale).clamp(config.min_sphere_zoom, config.max_zoom);
            return;
        }

        self.offset.0 += m.translation.0;
        self.offset.1 += m.translation.1;

        // keep the image point under the pointer fixed
        let (px, py) = m.position;
        let anchor = ((self.offset.0 - px) / self.zoom, (self.offset.1 - py) / self.zoom);
        self.zoom = (self.zoom * scale).clamp(self.min_zoom.min(config.max_zoom), config.max_zoom);
        self.offset = (anchor.0 * self.zoom + px, anchor.1 * self.zoom + py);

        let span = |target: u32, image: u32| target as f32 - image as f32 * self.zoom;
        self.offset.0 = clamp_between(self.offset.0, span(self.target_size.0, self.image_size.0), 0.0);
        self.offset.1 = clamp_between(self.offset.1, span(self.target_size.1, self.image_size.1), 0.0);
    }

    /// Target pixel to image pixel, `None` outside the image.
    pub fn target_to_image(&self, x: f32, y: f32) -> Option<(u32, u32)> {
        let ix = (x - self.offset.0) / self.zoom;
        let iy = (y - self.offset.1) / self.zoom;
        if ix < 0.0 || iy < 0.0 || ix >= self.image_size.0 as f32 || iy >= self.image_size.1 as f32 {
            return None;
        }
        Some((ix as u32, iy as u32))
    }
}

/// Clamps into the range spanned by `a` and `b` in either order.
fn clamp_between(v: f32, a: f32, b: f32) -> f32 {
    v.clamp(a.min(b), a.max(b))
}
