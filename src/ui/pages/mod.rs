use eframe::egui::{self, Align, Layout, Rect, RichText, UiBuilder, vec2};

use crate::anim::transition::ElementVisual;
use crate::ui::navigation::Page;
use crate::ui::theme::{FONT_SMALL, FONT_TITLE, PALETTE, SPACING_LG, SPACING_XS};

pub mod home;
pub mod settings;
pub mod versions;

/// Lay a page out in `rect`, shifted and faded by its transition visual.
pub fn show_page(
    ui: &mut egui::Ui,
    page: Page,
    rect: Rect,
    visual: &ElementVisual,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let (dx, dy) = visual.offset();
    let mut content = ui.new_child(
        UiBuilder::new()
            .id_salt(("page", page.index()))
            .max_rect(rect.translate(vec2(dx, dy)).shrink(SPACING_LG))
            .layout(Layout::top_down(Align::Min)),
    );
    content.multiply_opacity(visual.opacity.get());
    content.set_clip_rect(rect);
    add_contents(&mut content);
}

fn header(ui: &mut egui::Ui, title: &str, subtitle: &str) {
    ui.label(RichText::new(title).size(FONT_TITLE).strong().color(PALETTE.text_primary));
    ui.add_space(SPACING_XS);
    ui.label(RichText::new(subtitle).size(FONT_SMALL).color(PALETTE.text_secondary));
    ui.add_space(SPACING_LG);
}
