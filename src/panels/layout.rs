use glam::Vec3;

use crate::config::LayoutSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Panels stacked vertically in front of the character.
    Mobile,
    /// Panels in a row above the head.
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    pub position: Vec3,
    pub scale: f32,
}

#[must_use]
pub fn layout_mode(width: f32, settings: &LayoutSettings) -> LayoutMode {
    if width < settings.mobile_breakpoint {
        LayoutMode::Mobile
    } else {
        LayoutMode::Desktop
    }
}

/// `base · min(1, width / reference_width)`.
#[must_use]
pub fn panel_scale(width: f32, settings: &LayoutSettings) -> f32 {
    let base = match layout_mode(width, settings) {
        LayoutMode::Mobile => settings.mobile_scale,
        LayoutMode::Desktop => settings.desktop_scale,
    };
    base * (width / settings.reference_width).min(1.0)
}

/// Places `count` panels around `head` for a viewport `width` pixels wide.
#[must_use]
pub fn compute_layout(
    count: usize,
    head: Vec3,
    width: f32,
    settings: &LayoutSettings,
) -> (LayoutMode, Vec<PanelPlacement>) {
    let mode = layout_mode(width, settings);
    let scale = panel_scale(width, settings);
    let center = (count as f32 - 1.0) / 2.0;

    let placements = (0..count)
        .map(|i| {
            let slot = i as f32 - center;
            let position = match mode {
                LayoutMode::Mobile => {
                    let offset = slot * settings.mobile_spacing * scale;
                    Vec3::new(
                        0.0,
                        head.y + settings.mobile_lift - offset,
                        head.z + settings.mobile_forward,
                    )
                }
                LayoutMode::Desktop => {
                    let spread = (width / settings.reference_width).min(settings.desktop_spacing_cap);
                    let offset = slot * settings.desktop_spacing * spread;
                    Vec3::new(head.x + offset, head.y + settings.desktop_lift, head.z)
                }
            };
            PanelPlacement { position, scale }
        })
        .collect();

    (mode, placements)
}

/// Position of the `index`-th dropdown child under a parent placed at
/// `parent` with scale `scale`: stacked downward, nudged towards the viewer.
#[must_use]
pub fn dropdown_position(parent: Vec3, scale: f32, index: usize, settings: &LayoutSettings) -> Vec3 {
    parent
        + Vec3::new(
            0.0,
            -((index + 1) as f32) * settings.dropdown_spacing * scale,
            settings.dropdown_forward,
        )
}
