//! Paint commands produced by the renderers and consumed by the rasterizer

use crate::layout::DotTrack;
use crate::rendering::layout::Rect;
use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPass {
    Outline,
    Fill,
}

/// Raster asset an image command refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRef {
    Sprite,
    Glyph(DotTrack),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// One stamp of a text string; `y` is the top of the line.
    Text {
        x: i32,
        y: i32,
        px: u32,
        color: Color,
        text: String,
        pass: TextPass,
    },
    /// Paste `source` resized to `rect`, composited with its own alpha.
    Image { source: ImageRef, rect: Rect },
}

/// Ordered list of paint commands for one render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<PaintCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: PaintCommand) {
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Image commands that paste `source`, in draw order
    pub fn images(&self, source: ImageRef) -> impl Iterator<Item = &Rect> {
        self.commands.iter().filter_map(move |c| match c {
            PaintCommand::Image { source: s, rect } if *s == source => Some(rect),
            _ => None,
        })
    }

    /// Text stamps of a given pass, in draw order
    pub fn text_stamps(&self, pass: TextPass) -> impl Iterator<Item = &PaintCommand> {
        self.commands
            .iter()
            .filter(move |c| matches!(c, PaintCommand::Text { pass: p, .. } if *p == pass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_list_filters_by_kind() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::Text {
            x: 0,
            y: 0,
            px: 10,
            color: Color::BLACK,
            text: "A".into(),
            pass: TextPass::Fill,
        });
        list.push(PaintCommand::Image {
            source: ImageRef::Glyph(DotTrack::Armor),
            rect: Rect { x: 1, y: 2, width: 3, height: 3 },
        });
        assert_eq!(list.len(), 2);
        assert_eq!(list.images(ImageRef::Glyph(DotTrack::Armor)).count(), 1);
        assert_eq!(list.images(ImageRef::Sprite).count(), 0);
        assert_eq!(list.text_stamps(TextPass::Fill).count(), 1);
        assert_eq!(list.text_stamps(TextPass::Outline).count(), 0);
    }
}
