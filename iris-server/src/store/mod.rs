//! Record store implementations
//!
//! Both stores implement [`iris_core::PaletteRecordStore`]; the server picks
//! one from `DATABASE_URL` at startup.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryPaletteStore;
pub use sqlite::SqlitePaletteStore;
