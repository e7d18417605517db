// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! Observation identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// The URI identifying one observation.
///
/// The clustering code never looks inside it; it is parsed once so that a
/// malformed identifier fails the request up front instead of producing a
/// result row nobody can join back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObservationUri(Url);

impl ObservationUri {
    #[track_caller]
    pub fn parse(s: &str) -> Result<Self> {
        match Url::parse(s.trim()) {
            Ok(url) => Ok(Self(url)),
            Err(e) => Err(Error::malformed_identifier(format!(
                "'{}' is not a valid observation URI: {}",
                s, e
            ))
            .with_cause(e)),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for ObservationUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ObservationUri {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObservationUri {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ObservationUri> for String {
    fn from(uri: ObservationUri) -> Self {
        uri.0.into()
    }
}

impl From<Url> for ObservationUri {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for ObservationUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
