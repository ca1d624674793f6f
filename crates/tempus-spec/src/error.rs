use thiserror::Error;

use crate::spec::odometer::ConversionError;
use crate::spec::parse::ParseError;

/// Errors raised while turning specification text into odometer input.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Core(#[from] tempus_core::error::CoreError),
}

pub type SpecResult<T> = std::result::Result<T, SpecError>;
