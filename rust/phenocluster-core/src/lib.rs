// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

pub mod error;
pub mod uri;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
pub use uri::ObservationUri;

/// Attribute holding the primary measurement value of an observation.
pub const VALUE: &str = "Value";
/// Attribute holding the optional secondary value of an observation.
pub const SECOND_VALUE: &str = "SecondValue";
