use eframe::egui::{self, Color32, CornerRadius, Stroke, Visuals, epaint::Shadow};

pub const RADIUS_SMALL: f32 = 4.0;
pub const RADIUS_MEDIUM: f32 = 8.0;
pub const RADIUS_LARGE: f32 = 12.0;

pub const SPACING_XS: f32 = 4.0;
pub const SPACING_SM: f32 = 8.0;
pub const SPACING_MD: f32 = 12.0;
pub const SPACING_LG: f32 = 16.0;
pub const SPACING_XL: f32 = 24.0;

pub const FONT_SMALL: f32 = 12.0;
pub const FONT_BODY: f32 = 14.0;
pub const FONT_MEDIUM: f32 = 16.0;
pub const FONT_LARGE: f32 = 20.0;
pub const FONT_TITLE: f32 = 24.0;

pub const NAV_RAIL_WIDTH: f32 = 200.0;
pub const NAV_ITEM_HEIGHT: f32 = 40.0;
pub const TITLE_BAR_HEIGHT: f32 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub bg_dark: Color32,
    pub bg_medium: Color32,
    pub bg_light: Color32,
    pub surface: Color32,
    pub surface_hover: Color32,
    pub surface_active: Color32,
    pub surface_selected: Color32,
    pub accent: Color32,
    pub accent_hover: Color32,
    pub accent_pressed: Color32,
    pub accent_bright: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_disabled: Color32,
    pub text_on_accent: Color32,
    pub border_subtle: Color32,
    pub border_medium: Color32,
    pub close_hover: Color32,
}

impl ThemePalette {
    const fn flarial() -> Self {
        Self {
            bg_dark: Color32::from_rgb(13, 13, 13),
            bg_medium: Color32::from_rgb(18, 18, 18),
            bg_light: Color32::from_rgb(24, 24, 24),
            surface: Color32::from_rgb(30, 30, 30),
            surface_hover: Color32::from_rgb(40, 40, 40),
            surface_active: Color32::from_rgb(50, 50, 50),
            surface_selected: Color32::from_rgb(45, 45, 45),
            accent: Color32::from_rgb(255, 36, 56),
            accent_hover: Color32::from_rgb(255, 60, 80),
            accent_pressed: Color32::from_rgb(200, 28, 44),
            accent_bright: Color32::from_rgb(255, 100, 120),
            text_primary: white_alpha(222),
            text_secondary: white_alpha(153),
            text_disabled: white_alpha(97),
            text_on_accent: Color32::WHITE,
            border_subtle: Color32::from_rgb(51, 51, 51),
            border_medium: Color32::from_rgb(68, 68, 68),
            close_hover: Color32::from_rgb(232, 17, 35),
        }
    }
}

pub const PALETTE: ThemePalette = ThemePalette::flarial();

const fn white_alpha(alpha: u8) -> Color32 {
    Color32::from_rgba_premultiplied(alpha, alpha, alpha, alpha)
}

/// Same hue at a new alpha, in premultiplied space.
pub fn tint(color: Color32, alpha: u8) -> Color32 {
    color.gamma_multiply(f32::from(alpha) / 255.0)
}

/// Scale a color's alpha by an animated opacity in `[0, 1]`.
pub fn fade(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub fn apply_theme(ctx: &egui::Context) {
    let colors = PALETTE;
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(colors.text_primary);
    visuals.panel_fill = colors.bg_dark;
    visuals.window_fill = colors.bg_medium;
    visuals.extreme_bg_color = colors.bg_dark;
    visuals.faint_bg_color = colors.bg_light;
    visuals.widgets.noninteractive.bg_fill = colors.surface;
    visuals.widgets.inactive.bg_fill = colors.surface;
    visuals.widgets.hovered.bg_fill = colors.surface_hover;
    visuals.widgets.active.bg_fill = colors.surface_active;
    visuals.widgets.noninteractive.corner_radius = CornerRadius::same(RADIUS_MEDIUM as u8);
    visuals.widgets.inactive.corner_radius = CornerRadius::same(RADIUS_MEDIUM as u8);
    visuals.widgets.hovered.corner_radius = CornerRadius::same(RADIUS_MEDIUM as u8);
    visuals.widgets.active.corner_radius = CornerRadius::same(RADIUS_MEDIUM as u8);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, colors.border_subtle);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, colors.border_subtle);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, colors.border_medium);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, colors.accent);
    visuals.selection.bg_fill = tint(colors.accent, 120);
    visuals.selection.stroke = Stroke::new(1.0, colors.accent);
    visuals.window_corner_radius = CornerRadius::same(RADIUS_LARGE as u8);
    visuals.window_stroke = Stroke::new(1.0, colors.border_subtle);
    visuals.window_shadow = Shadow::NONE;
    visuals.popup_shadow = Shadow::NONE;
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(SPACING_SM, SPACING_SM);
    style.spacing.button_padding = egui::vec2(SPACING_LG, SPACING_SM);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_colors_are_translucent_white() {
        assert_eq!(PALETTE.text_primary.a(), 222);
        assert_eq!(PALETTE.text_secondary.r(), 153);
        assert!(PALETTE.text_disabled.a() < PALETTE.text_secondary.a());
    }

    #[test]
    fn fade_clamps_opacity() {
        assert_eq!(fade(PALETTE.accent, 1.5), PALETTE.accent);
        assert_eq!(fade(PALETTE.accent, -1.0), Color32::TRANSPARENT);
    }
}
