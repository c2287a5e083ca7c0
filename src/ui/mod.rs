// UI module - Slint windows and their controllers
//
// This module contains:
// - ProjectPicker: template/recent-project chooser shown when startup
//   resolves no session
// - StudioController: the main editor window, wired to state and services

pub mod picker;
pub mod studio;

pub use picker::{PickerChoice, ProjectPicker};
pub use studio::StudioController;

// Include the generated Slint code. Both windows and their item structs
// become items of this module.
slint::include_modules!();
