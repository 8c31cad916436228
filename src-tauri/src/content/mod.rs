//! The embedded content surface and the user stylesheet injected into it.
//!
//! - `controller`: injection state machine, navigation policy, file pickers
//! - `stylesheet`: reads `custom.css` from the configured directory
//! - `scripts`: injection, removal and link bridge scripts
//! - `navigation`: trusted-domain policy and link activation decoding
//! - `surface`: collaborator traits and their Tauri implementations

pub mod controller;
pub mod navigation;
pub mod scripts;
pub mod stylesheet;
pub mod surface;

#[cfg(test)]
mod tests;

pub use controller::{handle_navigation_hook, ContentController, InjectionState, SharedContent};
pub use stylesheet::{StylesheetError, StylesheetLoader, STYLESHEET_FILE_NAME};
pub use surface::{
    ContentSurface, DialogFilePicker, ExternalOpener, FilePicker, SystemOpener, WebviewSurface,
};
