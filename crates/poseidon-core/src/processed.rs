//! Decomposed series bundle

use crate::error::{Error, Result};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};

/// Original series split into a tidal/trend component and a residual
///
/// The only constructor computes the residual, so
/// `residual[i] == original[i] - detrended[i]` holds for every index and all
/// three series share timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedData {
    original: TimeSeries,
    detrended: TimeSeries,
    residual: TimeSeries,
}

impl ProcessedData {
    /// Build the bundle from the raw series and the tide remover's output
    pub fn new(original: TimeSeries, detrended: TimeSeries) -> Result<Self> {
        if !original.is_aligned_with(&detrended) {
            return Err(Error::misaligned("detrended series"));
        }
        let residual_values = original
            .samples()
            .iter()
            .zip(detrended.samples())
            .map(|(o, d)| o.value - d.value)
            .collect();
        let residual = original.with_values(residual_values)?;
        Ok(Self {
            original,
            detrended,
            residual,
        })
    }

    pub fn original(&self) -> &TimeSeries {
        &self.original
    }

    pub fn detrended(&self) -> &TimeSeries {
        &self.detrended
    }

    pub fn residual(&self) -> &TimeSeries {
        &self.residual
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

// Deserialization goes through `new` so the residual identity cannot be broken
// by an edited export.
#[derive(Deserialize)]
struct ProcessedDataRepr {
    original: TimeSeries,
    detrended: TimeSeries,
    residual: TimeSeries,
}

impl<'de> Deserialize<'de> for ProcessedData {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = ProcessedDataRepr::deserialize(deserializer)?;
        let data =
            ProcessedData::new(repr.original, repr.detrended).map_err(serde::de::Error::custom)?;
        if data.residual != repr.residual {
            return Err(serde::de::Error::custom(
                "residual does not equal original minus detrended",
            ));
        }
        Ok(data)
    }
}
