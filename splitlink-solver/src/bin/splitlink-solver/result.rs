use splitlink_core::LayerTreeError;
use splitlink_solver::parsers::instance::InstanceError;
use thiserror::Error;

pub(crate) type SolverResult<T> = Result<T, SolverError>;

#[derive(Error, Debug)]
pub(crate) enum SolverError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The instance was invalid, more details: {0}")]
    InvalidInstance(#[from] InstanceError),
    #[error("Failed to build the layer tree, more details: {0}")]
    LayerTree(#[from] LayerTreeError),
}
