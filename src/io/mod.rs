pub mod store_io;

pub use store_io::{StoreError, load_store, save_store};
