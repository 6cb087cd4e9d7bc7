//! Panel Interaction Layer
//!
//! Owns the billboards laid out around the character's head and the
//! dropdown state machine:
//!
//! ```text
//!          activate menu panel P            activate P again / miss /
//!   Closed ───────────────────────▶ Open(P) ─── child activated ───▶ Closed
//!                                    │  ▲
//!                                    └──┘ activate other menu panel Q
//!                                         (close P, open Q)
//! ```
//!
//! Pointer input arrives as pick rays; the layer never touches the camera.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use crate::app::input::{CursorIcon, Viewport};
use crate::config::{LayoutSettings, MenuItem, PanelConfig, PanelTarget};
use crate::panels::layout::{LayoutMode, compute_layout, dropdown_position};
use crate::panels::panel::{Billboard, DropdownPanel, Panel, PanelHit};
use crate::panels::texture_cache::LabelTextureCache;
use crate::scene::Ray;

/// Side effect requested by an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    OpenUrl(String),
}

#[derive(Debug, Clone)]
struct OpenDropdown {
    parent: usize,
    items: Vec<DropdownPanel>,
}

pub struct PanelLayer {
    settings: LayoutSettings,
    panels: Vec<Panel>,
    dropdown: Option<OpenDropdown>,
    actions: BTreeMap<String, String>,
    textures: LabelTextureCache,

    head_anchor: Vec3,
    viewport: Viewport,
    mode: LayoutMode,
    camera_position: Option<Vec3>,
    cursor: CursorIcon,
}

impl PanelLayer {
    /// Creates one billboard per configured panel and lays them out for
    /// `viewport` around `head_anchor`.
    pub fn new(
        configs: &[PanelConfig],
        actions: BTreeMap<String, String>,
        settings: LayoutSettings,
        head_anchor: Vec3,
        viewport: Viewport,
    ) -> Self {
        let mut textures = LabelTextureCache::new();
        let size = Vec2::new(settings.panel_width, settings.panel_height);
        let panels = configs
            .iter()
            .map(|config| Panel {
                label: config.label.clone(),
                target: config.target.clone(),
                billboard: Billboard::new(textures.get_or_create(&config.label), size),
            })
            .collect();

        let mut layer = Self {
            settings,
            panels,
            dropdown: None,
            actions,
            textures,
            head_anchor,
            viewport,
            mode: LayoutMode::Desktop,
            camera_position: None,
            cursor: CursorIcon::Default,
        };
        layer.apply_layout();
        log::info!("Created {} panels ({:?} layout)", layer.panels.len(), layer.mode);
        layer
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Re-runs the layout for a new viewport size. The panel set, their
    /// targets and an open dropdown all survive.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let previous = self.mode;
        self.apply_layout();
        if previous != self.mode {
            log::debug!("Panel layout switched from {:?} to {:?}", previous, self.mode);
        }
    }

    fn apply_layout(&mut self) {
        let (mode, placements) = compute_layout(
            self.panels.len(),
            self.head_anchor,
            self.viewport.width,
            &self.settings,
        );
        self.mode = mode;
        for (panel, placement) in self.panels.iter_mut().zip(placements) {
            panel.billboard.place(placement.position, placement.scale);
        }
        self.place_dropdown();
        if let Some(camera) = self.camera_position {
            self.update_orientation(camera);
        }
    }

    fn place_dropdown(&mut self) {
        let Some(open) = &mut self.dropdown else {
            return;
        };
        let Some(parent) = self.panels.get(open.parent) else {
            return;
        };
        let (origin, scale) = (parent.billboard.position(), parent.billboard.scale());
        for (index, item) in open.items.iter_mut().enumerate() {
            let position = dropdown_position(origin, scale, index, &self.settings);
            item.billboard.place(position, scale);
        }
    }

    /// Turns every visible panel and dropdown child towards the camera.
    pub fn update_orientation(&mut self, camera_position: Vec3) {
        self.camera_position = Some(camera_position);
        let billboards = self
            .panels
            .iter_mut()
            .map(|p| &mut p.billboard)
            .chain(self.dropdown.iter_mut().flat_map(|d| d.items.iter_mut().map(|i| &mut i.billboard)));
        for billboard in billboards {
            if billboard.visible {
                billboard.face(camera_position);
            }
        }
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// Nearest visible panel or open dropdown child along `ray`.
    #[must_use]
    pub fn pick(&self, ray: &Ray) -> Option<PanelHit> {
        let panels = self
            .panels
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.billboard.intersect(ray).map(|d| (PanelHit::Panel(i), d)));
        let children = self
            .dropdown_items()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.billboard.intersect(ray).map(|d| (PanelHit::Dropdown(i), d)));

        panels
            .chain(children)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(hit, _)| hit)
    }

    /// Updates the cursor for a pointer ray. Nothing else changes.
    pub fn hover(&mut self, ray: &Ray) -> CursorIcon {
        self.cursor = if self.pick(ray).is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        self.cursor
    }

    /// Click / touch-end along `ray`.
    pub fn activate(&mut self, ray: &Ray) -> Option<PanelCommand> {
        match self.pick(ray) {
            None => {
                if self.close_dropdown() {
                    log::debug!("Pointer missed; dropdown closed");
                }
                None
            }
            Some(PanelHit::Panel(index)) => self.activate_panel(index),
            Some(PanelHit::Dropdown(index)) => self.activate_child(index),
        }
    }

    fn activate_panel(&mut self, index: usize) -> Option<PanelCommand> {
        let panel = self.panels.get(index)?;
        match &panel.target {
            PanelTarget::Url(url) => {
                let command = PanelCommand::OpenUrl(url.clone());
                log::info!("Opening link for '{}'", panel.label);
                self.close_dropdown();
                Some(command)
            }
            PanelTarget::Menu(items) => {
                let items = items.clone();
                let was_open = self.active_dropdown() == Some(index);
                self.close_dropdown();
                if !was_open {
                    self.open_dropdown(index, &items);
                }
                None
            }
        }
    }

    fn activate_child(&mut self, index: usize) -> Option<PanelCommand> {
        let item = self.dropdown_items().get(index)?;
        let (label, action) = (item.label.clone(), item.action.clone());
        let command = match self.actions.get(&action) {
            Some(url) => {
                log::info!("Running dropdown action '{action}' from '{label}'");
                Some(PanelCommand::OpenUrl(url.clone()))
            }
            None => {
                log::warn!("Unknown dropdown action '{action}' on '{label}'");
                None
            }
        };
        self.close_dropdown();
        command
    }

    fn open_dropdown(&mut self, parent: usize, items: &[MenuItem]) {
        let size = Vec2::new(self.settings.panel_width, self.settings.panel_height);
        let children = items
            .iter()
            .map(|item| DropdownPanel {
                label: item.label.clone(),
                action: item.action.clone(),
                parent,
                billboard: Billboard::new(self.textures.get_or_create(&item.label), size),
            })
            .collect();
        self.dropdown = Some(OpenDropdown {
            parent,
            items: children,
        });
        self.place_dropdown();
        if let Some(camera) = self.camera_position {
            self.update_orientation(camera);
        }
        log::debug!("Opened dropdown with {} items", items.len());
    }

    /// Closes the open dropdown, if any. Returns whether one was open.
    pub fn close_dropdown(&mut self) -> bool {
        self.dropdown.take().is_some()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Index of the panel whose dropdown is open.
    #[must_use]
    pub fn active_dropdown(&self) -> Option<usize> {
        self.dropdown.as_ref().map(|d| d.parent)
    }

    #[must_use]
    pub fn dropdown_items(&self) -> &[DropdownPanel] {
        self.dropdown
            .as_ref()
            .map(|d| d.items.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    #[must_use]
    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    #[must_use]
    pub fn head_anchor(&self) -> Vec3 {
        self.head_anchor
    }

    #[must_use]
    pub fn textures(&self) -> &LabelTextureCache {
        &self.textures
    }

    pub fn set_visible(&mut self, visible: bool) {
        for panel in &mut self.panels {
            panel.billboard.visible = visible;
        }
        if !visible {
            self.close_dropdown();
        }
    }
}
