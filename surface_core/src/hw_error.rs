//! Maps `Box<dyn Error>` from trait boundaries to typed `SurfaceError`.
//!
//! The traits in `surface_traits` use `Box<dyn Error + Send + Sync>` so any
//! driver can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `surface_hardware::HwError`.

use crate::error::SurfaceError;

/// Map a trait-boundary error to a typed `SurfaceError`.
///
/// Known hardware error types are downcast first; anything else becomes a
/// generic `Hardware` error carrying the driver's message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SurfaceError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<surface_hardware::error::HwError>() {
            return SurfaceError::HardwareFault(hw.to_string());
        }
    }

    SurfaceError::Hardware(e.to_string())
}
