mod cost_matrix;
mod cost_matrix_builder;

pub use cost_matrix::{CostMatrix, CostMatrixError};
pub use cost_matrix_builder::{CostMatrixBuilder, CostMatrixBuilderParams, MatrixBuildReport};

use roundtrip_providers::location::Location;

use crate::define_index_newtype;

define_index_newtype!(LocationIdx; Location, String);
