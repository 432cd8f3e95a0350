//! Report generation port.

use std::path::Path;

use crate::domain::error::AlphaTrackError;
use crate::domain::review::PeriodReview;

/// Port for writing period review reports.
pub trait ReportPort {
    fn write(&self, review: &PeriodReview, output_path: &Path) -> Result<(), AlphaTrackError>;
}
