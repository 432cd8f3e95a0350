//! Built-in Typst markup for period reviews.
//!
//! A custom template may use any subset of the placeholders below; each is
//! replaced by [`super::resolve`].
//!
//! - `{{TITLE}}`
//! - `{{GENERATED_ON}}`
//! - `{{TRADE_TABLE}}`
//! - `{{TOTALS}}`
//! - `{{EQUITY_CHART}}`
//! - `{{JOURNAL_SUMMARY}}`

const DEFAULT_TEMPLATE: &str = r##"#set document(title: "{{TITLE}}")
#set page(paper: "a4", margin: (x: 1.8cm, y: 2cm), numbering: "1")
#set text(size: 10pt)
#show table.cell.where(y: 0): set text(weight: "bold", fill: white)
#set table(
  fill: (_, y) => if y == 0 { rgb("#6366f1") },
  stroke: 0.5pt + luma(180),
)

= {{TITLE}}

Generated on: {{GENERATED_ON}}

{{TRADE_TABLE}}

{{TOTALS}}

== Equity Curve

{{EQUITY_CHART}}

{{JOURNAL_SUMMARY}}
"##;

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_carries_every_placeholder() {
        for placeholder in [
            "{{TITLE}}",
            "{{GENERATED_ON}}",
            "{{TRADE_TABLE}}",
            "{{TOTALS}}",
            "{{EQUITY_CHART}}",
            "{{JOURNAL_SUMMARY}}",
        ] {
            assert!(template().contains(placeholder), "missing {placeholder}");
        }
    }
}
