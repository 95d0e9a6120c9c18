pub mod prune_table;

pub use prune_table::PruneTable;
