pub mod dense;
pub mod sparse;
pub mod vector;

pub use sparse::SparseMatrix;
