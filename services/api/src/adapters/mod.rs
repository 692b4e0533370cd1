pub mod db;
pub mod memory;
pub mod translator;

pub use db::DbAdapter;
pub use memory::InMemoryStore;
pub use translator::ChatTranslator;
