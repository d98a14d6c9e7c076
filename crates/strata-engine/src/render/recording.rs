//! Backend that records calls instead of drawing.
//!
//! Used by tests and by tools that want to inspect what a frame submits.

use anyhow::bail;

use crate::coords::{Rect, Viewport};
use crate::paint::Color;

use super::{Backend, Canvas, DepthTest, ShaderDesc, ShaderId, WriteMask};

/// One recorded backend call.
///
/// Draws capture the hold state and depth offset that were active when they
/// were issued.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    DrawImage {
        image: String,
        dst: Rect,
        held: bool,
        depth: Option<f32>,
    },
    FillRect {
        rect: Rect,
        color: Color,
        held: bool,
        depth: Option<f32>,
    },
    HoldDrawing(bool),
    CreateShader(ShaderDesc),
    UseShader(Option<ShaderId>),
    DepthTest(DepthTest),
    WriteMask(WriteMask),
    ClearDepth(f32),
    DepthOffset(Option<f32>),
}

#[derive(Debug)]
pub struct RecordingBackend {
    screen: Viewport,
    calls: Vec<BackendCall>,

    held: bool,
    depth: Option<f32>,
    fail_shaders: bool,
    next_shader: u32,

    /// Draw calls a batching backend would issue.
    draw_calls: usize,
    /// Image of the open held batch.
    batch_image: Option<String>,
}

impl RecordingBackend {
    pub fn new(screen: Viewport) -> Self {
        Self {
            screen,
            calls: Vec::new(),
            held: false,
            depth: None,
            fail_shaders: false,
            next_shader: 0,
            draw_calls: 0,
            batch_image: None,
        }
    }

    /// Makes every `create_shader` call fail.
    pub fn failing_shaders(mut self) -> Self {
        self.fail_shaders = true;
        self
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Images drawn, in submission order.
    pub fn drawn_images(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawImage { image, .. } => Some(image.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.draw_calls = 0;
    }

    fn count_draw(&mut self, image: Option<&str>) {
        if self.held && image.is_some() && self.batch_image.as_deref() == image {
            return;
        }
        self.draw_calls += 1;
        self.batch_image = if self.held { image.map(str::to_owned) } else { None };
    }
}

impl Canvas for RecordingBackend {
    fn screen_size(&self) -> Viewport {
        self.screen
    }

    fn draw_image(&mut self, image: &str, _src: Rect, dst: Rect, _tint: Color) {
        self.count_draw(Some(image));
        self.calls.push(BackendCall::DrawImage {
            image: image.to_owned(),
            dst,
            held: self.held,
            depth: self.depth,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.count_draw(None);
        self.calls.push(BackendCall::FillRect {
            rect,
            color,
            held: self.held,
            depth: self.depth,
        });
    }
}

impl Backend for RecordingBackend {
    fn hold_drawing(&mut self, hold: bool) {
        self.held = hold;
        self.batch_image = None;
        self.calls.push(BackendCall::HoldDrawing(hold));
    }

    fn is_drawing_held(&self) -> bool {
        self.held
    }

    fn create_shader(&mut self, desc: ShaderDesc) -> anyhow::Result<ShaderId> {
        self.calls.push(BackendCall::CreateShader(desc));
        if self.fail_shaders {
            bail!("shaders disabled on this backend");
        }
        let id = ShaderId(self.next_shader);
        self.next_shader += 1;
        Ok(id)
    }

    fn use_shader(&mut self, shader: Option<ShaderId>) {
        self.calls.push(BackendCall::UseShader(shader));
    }

    fn set_depth_test(&mut self, test: DepthTest) {
        self.calls.push(BackendCall::DepthTest(test));
    }

    fn set_write_mask(&mut self, mask: WriteMask) {
        self.calls.push(BackendCall::WriteMask(mask));
    }

    fn clear_depth(&mut self, value: f32) {
        self.calls.push(BackendCall::ClearDepth(value));
    }

    fn set_depth_offset(&mut self, z: Option<f32>) {
        self.depth = z;
        self.calls.push(BackendCall::DepthOffset(z));
    }
}
