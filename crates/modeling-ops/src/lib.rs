//! Shape generation and styling: everything between a validated
//! configuration and the tool solids the composition engine combines.

pub mod artwork;
pub mod boolean;
pub mod border;
pub mod extrude;
pub mod mounts;
pub mod plate;
pub mod style;
pub mod text;
pub mod types;

pub use artwork::{artwork_feature, artwork_label};
pub use boolean::{execute_boolean, BooleanKind};
pub use border::border_features;
pub use extrude::execute_extrude;
pub use mounts::{mount_cutters, mount_positions, stand_features, stand_floor, MountSurface};
pub use plate::plate_outline;
pub use style::styled_feature;
pub use text::{fitted_size, layout_text, layout_text_partial, text_area, text_label, LaidOutLine, TextLayout};
pub use types::*;
