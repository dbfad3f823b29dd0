//! Image calculator: combine two datasets and write the result somewhere useful.
//!
//! A run has two stages:
//! 1. [`combine`] the two inputs into a transient `f64` image.
//! 2. [`materialize`] that image into its destination, chosen by
//!    [`Destination::select`] from the user's settings:
//!
//! ```text
//! want_doubles  new_window   destination
//! ------------  ----------   -------------------------------------------
//! true          any          new f64 dataset
//! false         false        input1, overwritten in place (then update())
//! false         true         new dataset with input1's sample kind
//! ```
//!
//! Mismatched input shapes are expected at this boundary (the user picked two
//! unrelated images). They cancel the run instead of failing it; the reason is
//! available through [`Cancelable`].

use serde::{Deserialize, Serialize};

use crate::combine::{combine, copy_into};
use crate::dataset::{Dataset, DatasetService};
use crate::error::{PlaneviewError, Result};
use crate::image::Image;
use crate::ops::BinaryOp;

/// Name given to datasets created by the calculator.
pub const RESULT_NAME: &str = "Result of operation";

/// User-facing calculator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    /// Operation applied between the two inputs.
    pub operation: BinaryOp,
    /// Write into a new dataset instead of replacing input1.
    #[serde(default = "CalculatorSettings::default_new_window")]
    pub new_window: bool,
    /// Produce a 64-bit floating point result.
    #[serde(default)]
    pub want_doubles: bool,
}

impl CalculatorSettings {
    pub fn new(operation: BinaryOp) -> Self {
        Self {
            operation,
            new_window: true,
            want_doubles: false,
        }
    }

    /// Parse settings from JSON, e.g. `{"operation": "Multiply", "want_doubles": true}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn default_new_window() -> bool {
        true
    }
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self::new(BinaryOp::Add)
    }
}

/// Where a combined result ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Overwrite input1's samples, narrowing to its sample kind.
    ReplaceInput,
    /// Allocate a new dataset with this sample layout.
    NewDataset {
        bits_per_pixel: u32,
        signed: bool,
        floating: bool,
    },
}

impl Destination {
    /// Pick the destination for `settings`. A floating point request always
    /// allocates, even when in-place replacement was also requested.
    pub fn select(settings: &CalculatorSettings, input1: &Dataset) -> Self {
        if settings.want_doubles {
            Self::NewDataset {
                bits_per_pixel: 64,
                signed: true,
                floating: true,
            }
        } else if !settings.new_window {
            Self::ReplaceInput
        } else {
            Self::NewDataset {
                bits_per_pixel: input1.bits_per_pixel(),
                signed: input1.is_signed(),
                floating: !input1.is_integer(),
            }
        }
    }
}

/// Outcome of [`materialize`].
#[derive(Debug)]
pub enum Materialized {
    /// input1 now holds the result; no dataset was allocated.
    Replaced,
    /// The result lives in this freshly created dataset.
    Created(Dataset),
}

/// Write `result` into `destination`.
///
/// New datasets share input1's dimensions and axis labels and are named
/// [`RESULT_NAME`]. Both branches call [`Dataset::update`] on whatever they wrote.
pub fn materialize(
    result: &Image,
    destination: Destination,
    input1: &mut Dataset,
    service: &dyn DatasetService,
) -> Result<Materialized> {
    match destination {
        Destination::ReplaceInput => {
            copy_into(input1.image_mut(), result)?;
            input1.update();
            Ok(Materialized::Replaced)
        }
        Destination::NewDataset {
            bits_per_pixel,
            signed,
            floating,
        } => {
            let mut output = service.create(
                result.dims(),
                RESULT_NAME,
                input1.axes(),
                bits_per_pixel,
                signed,
                floating,
            )?;
            copy_into(output.image_mut(), result)?;
            output.update();
            Ok(Materialized::Created(output))
        }
    }
}

/// A run that can stop early with a reason instead of failing hard.
pub trait Cancelable {
    fn is_canceled(&self) -> bool;

    /// Why the last run stopped, if it did.
    fn cancel_reason(&self) -> Option<&str>;
}

/// Combines two datasets according to [`CalculatorSettings`].
#[derive(Debug, Clone, Default)]
pub struct ImageCalculator {
    settings: CalculatorSettings,
    cancel_reason: Option<String>,
}

impl ImageCalculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self {
            settings,
            cancel_reason: None,
        }
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    pub fn operation(&self) -> BinaryOp {
        self.settings.operation
    }

    pub fn set_operation(&mut self, operation: BinaryOp) {
        self.settings.operation = operation;
    }

    /// Select the operation by display name.
    pub fn set_operation_name(&mut self, name: &str) -> Result<()> {
        self.settings.operation = BinaryOp::lookup(name)?;
        Ok(())
    }

    pub fn is_new_window(&self) -> bool {
        self.settings.new_window
    }

    pub fn set_new_window(&mut self, new_window: bool) {
        self.settings.new_window = new_window;
    }

    pub fn is_double_output(&self) -> bool {
        self.settings.want_doubles
    }

    pub fn set_double_output(&mut self, want_doubles: bool) {
        self.settings.want_doubles = want_doubles;
    }

    /// Combine `input1` with `input2` and materialize the result.
    ///
    /// Returns the created dataset, or `None` if input1 was replaced in place
    /// or the run was canceled (check [`Cancelable::is_canceled`]).
    pub fn run(
        &mut self,
        input1: &mut Dataset,
        input2: &Dataset,
        service: &dyn DatasetService,
    ) -> Result<Option<Dataset>> {
        self.cancel_reason = None;

        let result = match combine(input1.image(), input2.image(), self.settings.operation) {
            Ok(image) => image,
            Err(err @ PlaneviewError::ShapeMismatch { .. }) => {
                tracing::warn!(
                    "image calculator canceled ({} on {:?} and {:?}): {err}",
                    self.settings.operation,
                    input1.name(),
                    input2.name()
                );
                self.cancel_reason = Some(err.to_string());
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let destination = Destination::select(&self.settings, input1);
        tracing::debug!("materializing {} result into {destination:?}", self.settings.operation);
        match materialize(&result, destination, input1, service)? {
            Materialized::Replaced => Ok(None),
            Materialized::Created(output) => Ok(Some(output)),
        }
    }
}

impl Cancelable for ImageCalculator {
    fn is_canceled(&self) -> bool {
        self.cancel_reason.is_some()
    }

    fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }
}
