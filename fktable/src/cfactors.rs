//! Provides [`CFactors`], multiplicative per-datapoint corrections applied when loading a table.
//!
//! A c-factor file starts with a header enclosed by two lines beginning with
//! [`DELIN_KEY`](super::header::DELIN_KEY), followed by one value per datapoint, separated by
//! whitespace or newlines.

use super::error::{Error, Result};
use super::fk_table;
use super::header::DELIN_KEY;
use std::io::BufRead;
use std::path::Path;

/// Correction factors read from a c-factor file.
#[derive(Clone, Debug, PartialEq)]
pub struct CFactors {
    description: String,
    values: Vec<f64>,
}

impl CFactors {
    /// Reads c-factors from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if reading fails, if the header isn't closed or if a value can not
    /// be parsed.
    pub fn read(reader: impl BufRead) -> Result<Self> {
        let mut delimiters = 0;
        let mut description = Vec::new();
        let mut values = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|err| Error::File(format!("failed to read c-factors: {err}")))?;

            if delimiters < 2 {
                if line.trim_start().starts_with(DELIN_KEY) {
                    delimiters += 1;
                } else if delimiters == 1 {
                    description.push(line);
                }

                continue;
            }

            for token in line.split_whitespace() {
                values.push(token.parse().map_err(|_| {
                    Error::File(format!("could not parse c-factor `{token}`"))
                })?);
            }
        }

        if delimiters < 2 {
            return Err(Error::File(
                "c-factor header is not closed by a second delimiter line".to_owned(),
            ));
        }

        Ok(Self {
            description: description.join("\n"),
            values,
        })
    }

    /// Reads c-factors from the file at `path`, which is decompressed if its name ends in `.gz`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file can not be opened, and otherwise the errors of
    /// [`CFactors::read`].
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::read(fk_table::open(path).map_err(|err| {
            Error::File(format!("cannot open c-factor file `{}`: {err}", path.display()))
        })?)
    }

    /// Returns the text between the two delimiter lines.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the values of the correction factors.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Multiplies each element of `cfactors` with the corresponding value of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if there are fewer values than elements in `cfactors`.
    pub fn apply(&self, cfactors: &mut [f64]) -> Result<()> {
        if self.values.len() < cfactors.len() {
            return Err(Error::File(format!(
                "expected {} c-factors, found {}",
                cfactors.len(),
                self.values.len()
            )));
        }

        if self.values.len() > cfactors.len() {
            tracing::warn!(
                "ignoring {} surplus c-factors",
                self.values.len() - cfactors.len()
            );
        }

        for (cfactor, value) in cfactors.iter_mut().zip(&self.values) {
            *cfactor *= value;
        }

        Ok(())
    }
}
