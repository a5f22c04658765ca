//! Ordered quad batches.
//!
//! Fills and texture copies must composite in the order they were issued, so
//! the list keeps one batch per pipeline switch. Consecutive fills share a
//! single instanced draw; every texture copy needs its own bind group.

use std::ops::Range;

use render_protocol::{Rgba8, ScreenRect};

use crate::QuadInstanceGpu;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawBatch<B> {
    Solid { instances: Range<u32> },
    Textured { instance: u32, bind_group: B },
}

#[derive(Debug)]
pub struct DrawList<B> {
    instances: Vec<QuadInstanceGpu>,
    batches: Vec<DrawBatch<B>>,
}

impl<B> Default for DrawList<B> {
    fn default() -> Self {
        Self {
            instances: Vec::new(),
            batches: Vec::new(),
        }
    }
}

impl<B> DrawList<B> {
    pub fn instances(&self) -> &[QuadInstanceGpu] {
        &self.instances
    }

    pub fn batches(&self) -> &[DrawBatch<B>] {
        &self.batches
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.batches.clear();
    }

    pub fn push_solid(&mut self, rect: ScreenRect, color: Rgba8) {
        let index = self.push_instance(rect, color);
        if let Some(DrawBatch::Solid { instances }) = self.batches.last_mut() {
            if instances.end == index {
                instances.end += 1;
                return;
            }
        }
        self.batches.push(DrawBatch::Solid {
            instances: index..index + 1,
        });
    }

    pub fn push_textured(&mut self, rect: ScreenRect, bind_group: B) {
        let instance = self.push_instance(rect, Rgba8::WHITE);
        self.batches.push(DrawBatch::Textured {
            instance,
            bind_group,
        });
    }

    fn push_instance(&mut self, rect: ScreenRect, color: Rgba8) -> u32 {
        let index = u32::try_from(self.instances.len()).expect("quad instance count exceeds u32");
        self.instances.push(QuadInstanceGpu {
            rect: [
                rect.x as f32,
                rect.y as f32,
                rect.width as f32,
                rect.height as f32,
            ],
            color: color.to_unorm(),
        });
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32) -> ScreenRect {
        ScreenRect {
            x,
            y: 0,
            width: 16,
            height: 16,
        }
    }

    #[test]
    fn consecutive_fills_share_one_batch() {
        let mut list = DrawList::<&str>::default();
        list.push_solid(rect(0), Rgba8::BLACK);
        list.push_solid(rect(16), Rgba8::WHITE);
        list.push_textured(rect(32), "tile-2");
        list.push_solid(rect(48), Rgba8::BLACK);

        assert_eq!(
            list.batches(),
            &[
                DrawBatch::Solid { instances: 0..2 },
                DrawBatch::Textured {
                    instance: 2,
                    bind_group: "tile-2"
                },
                DrawBatch::Solid { instances: 3..4 },
            ]
        );
        assert_eq!(list.instances()[1].rect, [16.0, 0.0, 16.0, 16.0]);
        assert_eq!(list.instances()[1].color, [1.0; 4]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut list = DrawList::<()>::default();
        list.push_textured(rect(0), ());
        list.clear();
        assert!(list.is_empty());
        assert!(list.instances().is_empty());
    }
}
