//! Text rendering of catalogs and assessments for terminal output
//!
//! Every renderer has a plain form; the `_styled` variants add ANSI colour
//! through `owo_colors` when asked to.

use crate::assessment::{APP_TITLE, DISCLAIMER};
use crate::catalog::FeatureCatalog;
use crate::models::{Assessment, AssessmentOutcome};
use owo_colors::OwoColorize;
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

/// Text progress bar for a probability in [0, 1]
pub fn progress_bar(probability: f64) -> String {
    let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Advisory text, bright red and bold when styled
pub fn advisory_line(message: &str, styled: bool) -> String {
    if styled {
        format!("{}  {}", "!".bright_red().bold(), message.bright_red().bold())
    } else {
        format!("!!! {}", message)
    }
}

/// Numbered option marker, cyan when styled
pub fn option_marker(number: usize, styled: bool) -> String {
    let marker = format!("[{}]", number);
    if styled {
        marker.cyan().to_string()
    } else {
        marker
    }
}

fn disclaimer_line(styled: bool) -> String {
    if styled {
        DISCLAIMER.dimmed().to_string()
    } else {
        DISCLAIMER.to_string()
    }
}

fn title_line(styled: bool) -> String {
    if styled {
        APP_TITLE.bold().to_string()
    } else {
        APP_TITLE.to_string()
    }
}

pub fn render_assessment(assessment: &Assessment) -> String {
    render_assessment_styled(assessment, false)
}

pub fn render_assessment_styled(assessment: &Assessment, styled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title_line(styled));
    let _ = writeln!(out);

    match &assessment.outcome {
        AssessmentOutcome::AwaitingInput { message } => {
            let _ = writeln!(out, "{}", message);
        }
        AssessmentOutcome::Scored {
            probabilities,
            advisory,
        } => {
            let _ = writeln!(out, "Diagnosis probabilities:");
            for p in probabilities {
                let _ = writeln!(
                    out,
                    "  {} {}: {:.2}",
                    progress_bar(p.probability),
                    p.label,
                    p.probability
                );
            }

            if let Some(advisory) = advisory {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", advisory_line(&advisory.message, styled));
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", disclaimer_line(styled));
    out
}

pub fn render_catalog(catalog: &FeatureCatalog) -> String {
    render_catalog_styled(catalog, false)
}

pub fn render_catalog_styled(catalog: &FeatureCatalog, styled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title_line(styled));
    let _ = writeln!(out);

    for category in catalog.categories() {
        if styled {
            let _ = writeln!(out, "{}:", category.name.bright_white().bold());
        } else {
            let _ = writeln!(out, "{}:", category.name);
        }
        for symptom in &category.symptoms {
            let _ = writeln!(out, "  - {}", symptom);
        }
    }

    out
}
