pub mod alert;
pub mod page;
pub mod product;

// Re-exports for convenience
pub use alert::*;
pub use page::*;
pub use product::*;
