//! Typst period review reports.
//!
//! Reads a Typst template (the built-in default or a custom file from
//! `[report] template_path`), resolves every `{{PLACEHOLDER}}` marker from a
//! [`PeriodReview`] and writes the final `.typ` file. Compiling it to PDF is
//! left to the `typst` CLI.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::AlphaTrackError;
use crate::domain::review::PeriodReview;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

/// Resolve all placeholders in `template` for the given review.
pub fn resolve(template: &str, review: &PeriodReview) -> String {
    let mut output = template.to_string();

    output = output.replace("{{TITLE}}", &review.title());
    output = output.replace(
        "{{GENERATED_ON}}",
        &review.generated_on.format("%Y-%m-%d").to_string(),
    );
    output = output.replace("{{TRADE_TABLE}}", &tables::render_trade_table(&review.trades));
    output = output.replace(
        "{{TOTALS}}",
        &tables::render_totals(review.total_commission, review.net_pl),
    );

    let svg = chart_svg::generate_equity_svg(&review.equity_curve);
    let chart = if svg.is_empty() {
        "_No equity data._".to_string()
    } else {
        format!(
            "#image(bytes(\"{}\"), format: \"svg\", width: 100%)",
            svg.replace('\\', "\\\\").replace('"', "\\\"")
        )
    };
    output = output.replace("{{EQUITY_CHART}}", &chart);

    output = output.replace(
        "{{JOURNAL_SUMMARY}}",
        &tables::render_journal_summary(review.period, review.journal.as_deref()),
    );

    output
}

pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new(template_path: Option<PathBuf>) -> Self {
        Self { template_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self::new(
            config
                .get_non_empty("report", "template_path")
                .map(PathBuf::from),
        )
    }

    fn load_template(&self) -> Result<String, AlphaTrackError> {
        match &self.template_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                AlphaTrackError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read template {}: {}", path.display(), e),
                ))
            }),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(&self, review: &PeriodReview, output_path: &Path) -> Result<(), AlphaTrackError> {
        let template = self.load_template()?;
        let content = resolve(&template, review);
        fs::write(output_path, content)?;
        tracing::info!(
            period = %review.period,
            trades = review.trades.len(),
            path = %output_path.display(),
            "review report written"
        );
        Ok(())
    }
}
