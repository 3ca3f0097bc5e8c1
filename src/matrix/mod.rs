// Matrix data structures and operations

pub mod algebra;
pub mod assembly;
pub mod config;
pub mod local;
pub mod pattern;
pub mod reference;
pub mod row;
pub mod table;
pub mod variable_size;

pub use assembly::AssemblySummary;
pub use config::{MatrixConfig, PruneStage, SystemParameters};
pub use local::{LocalBlockSource, LocalMatrices};
pub use pattern::PatternMatrix;
pub use reference::reference_amult_sym_b;
pub use row::{InsertMode, RowKind, SparseRow};
pub use table::IndexTable;
pub use variable_size::{MatrixState, VariableSizeMatrix};
