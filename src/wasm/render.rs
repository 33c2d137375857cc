use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use crate::error::{MotionError, Result};
use crate::surface::{Bounds, MoundPath, Paint, Surface};

/// A 2D canvas stretched over its container element. Drawing happens in CSS
/// pixels; the backing store is scaled by the device pixel ratio.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    bounds: Bounds,
    scale: f64,
}

impl Canvas2dSurface {
    /// Appends a fresh canvas to `container`.
    pub fn attach(document: &Document, container: &Element) -> Result<Self> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| MotionError::Missing("canvas element".into()))?
            .dyn_into()
            .map_err(|_| MotionError::Missing("canvas element".into()))?;
        let _ = canvas.set_attribute(
            "style",
            "position:absolute;inset:0;width:100%;height:100%;pointer-events:none",
        );
        container
            .append_child(&canvas)
            .map_err(|_| MotionError::Missing("overlay container".into()))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(MotionError::Missing("2d rendering context".into()))?;
        let bounds = Bounds::new(canvas.width() as f64, canvas.height() as f64);
        Ok(Self { canvas, ctx, bounds, scale: 1.0 })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Sizes the backing store for `bounds` CSS pixels at `scale` device
    /// pixels each. Does nothing if neither changed.
    pub fn fit(&mut self, bounds: Bounds, scale: f64) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        if bounds == self.bounds && scale == self.scale {
            return;
        }
        self.bounds = bounds;
        self.scale = scale;
        // Resizing the backing store also resets the transform.
        self.canvas.set_width((bounds.width * scale).round() as u32);
        self.canvas.set_height((bounds.height * scale).round() as u32);
        let _ = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
    }

    pub fn detach(&self) {
        self.canvas.remove();
    }

    fn apply(&self, paint: &Paint) {
        let color = paint.color.css();
        self.ctx.set_global_alpha(paint.alpha);
        self.ctx.set_fill_style_str(&color);
        self.ctx.set_shadow_blur(paint.glow * self.scale);
        if paint.glow > 0.0 {
            self.ctx.set_shadow_color(&color);
        }
    }
}

impl Surface for Canvas2dSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        let Bounds { width, height } = self.bounds();
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, paint: &Paint) {
        self.apply(paint);
        self.ctx.begin_path();
        if self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn fill_mound(&mut self, center_x: f64, half_width: f64, height: f64, paint: &Paint) {
        let MoundPath { start, control, end } = MoundPath::new(center_x, half_width, height, self.bounds.height);
        self.apply(paint);
        self.ctx.begin_path();
        self.ctx.move_to(start.0, start.1);
        self.ctx.quadratic_curve_to(control.0, control.1, end.0, end.1);
        self.ctx.close_path();
        self.ctx.fill();
    }
}
