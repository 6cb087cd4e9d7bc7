pub mod layer;
pub mod layout;
pub mod panel;
pub mod texture_cache;

pub use layer::{PanelCommand, PanelLayer};
pub use layout::{LayoutMode, PanelPlacement, compute_layout, dropdown_position, layout_mode, panel_scale};
pub use panel::{Billboard, DropdownPanel, Panel, PanelHit};
pub use texture_cache::{LabelStyle, LabelTexture, LabelTextureCache};
