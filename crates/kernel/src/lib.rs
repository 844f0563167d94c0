//! Settings, module contract, and lifecycle registry shared by the
//! bookstore crates.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use settings::Settings;
