//! 2D canvas implementation of the drawing surface contract.

use std::f64::consts::TAU;

use cosmos_motion_core::render::{DrawSurface, Rgba, SurfaceSize};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Canvas-backed [`DrawSurface`].
pub struct CanvasSurface {
    /// Canvas element
    canvas: HtmlCanvasElement,
    /// 2D rendering context
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap an existing canvas element.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("No 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the viewport (CSS pixels).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }

    /// Get the canvas element
    pub fn canvas(&self) -> HtmlCanvasElement {
        self.canvas.clone()
    }
}

impl DrawSurface for CanvasSurface {
    type Error = JsValue;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self) -> Result<(), JsValue> {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU)?;
        self.ctx.set_fill_style(&color.to_css().into());
        self.ctx.fill();
        Ok(())
    }

    fn stroke_gradient_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        from_color: Rgba,
        to_color: Rgba,
    ) -> Result<(), JsValue> {
        let gradient = self.ctx.create_linear_gradient(from.0, from.1, to.0, to.1);
        gradient.add_color_stop(0.0, &from_color.to_css())?;
        gradient.add_color_stop(1.0, &to_color.to_css())?;

        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.set_stroke_style(&gradient);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
        Ok(())
    }

    fn set_glow(&mut self, blur: f64, color: Rgba) -> Result<(), JsValue> {
        self.ctx.set_shadow_blur(blur.max(0.0));
        self.ctx.set_shadow_color(&color.to_css());
        Ok(())
    }
}
