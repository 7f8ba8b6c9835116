// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during building geometry generation
///
/// None of these are fatal to a rebuild: builders catch them and degrade to
/// a coarser shape or to empty geometry for the affected element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Clip failure: {0}")]
    ClipFailure(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Straight skeleton failed: {0}")]
    SkeletonFailure(String),

    #[error("Invalid wall: {0}")]
    InvalidWall(String),
}
