//! Outlined text labels
//!
//! The outline is a dense stamp: the string is drawn once in the outline color
//! at every offset of a `(2*ow+1)` square around the anchor (except the
//! center), then once in the fill color on top.

use crate::layout::TextField;
use crate::rendering::layout::{scale_len, scale_point};
use crate::rendering::paint::{DisplayList, PaintCommand, TextPass};

/// Offsets of the outline stamps for a scaled outline width
pub fn outline_offsets(ow: i32) -> impl Iterator<Item = (i32, i32)> {
    (-ow..=ow).flat_map(move |dx| (-ow..=ow).map(move |dy| (dx, dy))).filter(|&o| o != (0, 0))
}

/// Emit the outline and fill stamps for `field` at `scale`. Returns the number
/// of stamps pushed.
pub fn draw_text(list: &mut DisplayList, field: &TextField, scale: f32) -> usize {
    let text = field.text();
    if text.is_empty() {
        return 0;
    }

    let (x, y) = scale_point(field.position, scale);
    let px = scale_len(field.font_size, scale).max(1);
    let mut stamps = 0;

    if let Some(outline) = field.outline.filter(|_| field.outline_width > 0) {
        let ow = scale_len(field.outline_width, scale).max(1) as i32;
        for (dx, dy) in outline_offsets(ow) {
            list.push(PaintCommand::Text {
                x: x + dx,
                y: y + dy,
                px,
                color: outline,
                text: text.to_string(),
                pass: TextPass::Outline,
            });
            stamps += 1;
        }
    }

    list.push(PaintCommand::Text {
        x,
        y,
        px,
        color: field.fill,
        text: text.to_string(),
        pass: TextPass::Fill,
    });
    stamps + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, TextKey};

    fn name_field(text: &str) -> TextField {
        let mut cfg = LayoutConfig::template();
        cfg.set_text(TextKey::Name, text);
        cfg.text(TextKey::Name).clone()
    }

    #[test]
    fn outline_stamp_count_is_square_minus_center() {
        for ow in 1..=6 {
            assert_eq!(outline_offsets(ow).count(), ((2 * ow + 1) * (2 * ow + 1) - 1) as usize);
            assert!(outline_offsets(ow).all(|o| o != (0, 0)));
        }
    }

    #[test]
    fn fill_is_drawn_last_after_all_outline_stamps() {
        let field = name_field("atlas");
        let mut list = DisplayList::new();
        let stamps = draw_text(&mut list, &field, 1.0);
        // outline width 6 at full scale
        assert_eq!(stamps, 13 * 13);
        assert_eq!(list.text_stamps(TextPass::Outline).count(), 168);
        match list.commands().last() {
            Some(PaintCommand::Text { pass, x, y, text, .. }) => {
                assert_eq!(*pass, TextPass::Fill);
                assert_eq!((*x, *y), (80, 145));
                assert_eq!(text, "ATLAS");
            }
            other => panic!("unexpected last command: {:?}", other),
        }
    }

    #[test]
    fn preview_outline_never_vanishes() {
        let mut field = name_field("atlas");
        field.outline_width = 1;
        let mut list = DisplayList::new();
        // 1 * 0.3 rounds to 0 but the outline stays at least one pixel.
        draw_text(&mut list, &field, 0.3);
        assert_eq!(list.text_stamps(TextPass::Outline).count(), 8);
    }

    #[test]
    fn no_outline_color_or_zero_width_means_fill_only() {
        let mut field = name_field("atlas");
        field.outline = None;
        let mut list = DisplayList::new();
        assert_eq!(draw_text(&mut list, &field, 1.0), 1);

        let mut field = name_field("atlas");
        field.outline_width = 0;
        let mut list = DisplayList::new();
        assert_eq!(draw_text(&mut list, &field, 1.0), 1);
    }

    #[test]
    fn empty_text_draws_nothing() {
        let field = name_field("");
        let mut list = DisplayList::new();
        assert_eq!(draw_text(&mut list, &field, 1.0), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn font_size_scales_and_stays_positive() {
        let mut field = name_field("x");
        field.font_size = 1;
        let mut list = DisplayList::new();
        draw_text(&mut list, &field, 0.3);
        match list.commands().last() {
            Some(PaintCommand::Text { px, .. }) => assert_eq!(*px, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
