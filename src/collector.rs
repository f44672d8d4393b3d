//! Interactive input collector
//!
//! Walks a user through categories, symptoms in those categories and one
//! severity per chosen symptom, then hands back a `SymptomSelection`.
//! Generic over reader/writer so the flow can be driven from tests.

use crate::catalog::FeatureCatalog;
use crate::display::option_marker;
use crate::error::Result;
use crate::models::{Severity, SymptomSelection};
use std::io::{BufRead, Write};

/// Parse a comma-separated list of 1-based option numbers
///
/// Blank input selects nothing. Duplicates collapse, order is kept.
pub fn parse_choices(input: &str, n_options: usize) -> std::result::Result<Vec<usize>, String> {
    let mut picked = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let num: usize = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        if num == 0 || num > n_options {
            return Err(format!("please enter numbers between 1 and {}", n_options));
        }
        if !picked.contains(&(num - 1)) {
            picked.push(num - 1);
        }
    }

    Ok(picked)
}

pub struct InputCollector<'a, R, W> {
    catalog: &'a FeatureCatalog,
    input: R,
    output: W,
    /// ANSI colour for option markers
    styled: bool,
}

impl<'a, R: BufRead, W: Write> InputCollector<'a, R, W> {
    pub fn new(catalog: &'a FeatureCatalog, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
            styled: false,
        }
    }

    pub fn with_style(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// None on end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_multi(&mut self, prompt: &str, options: &[String]) -> Result<Vec<usize>> {
        writeln!(self.output, "{}", prompt)?;
        writeln!(self.output, "  (Enter numbers separated by commas, e.g., 1,3)")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {} {}", option_marker(i + 1, self.styled), option)?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(Vec::new());
            };

            match parse_choices(&line, options.len()) {
                Ok(picked) => return Ok(picked),
                Err(msg) => writeln!(self.output, "  ! {}", msg)?,
            }
        }
    }

    fn ask_severity(&mut self, symptom: &str) -> Result<Option<Severity>> {
        let options = Severity::SELECTABLE;
        let labels: Vec<&str> = options.iter().map(|s| s.label()).collect();
        writeln!(self.output, "Severity of {} ({}):", symptom, labels.join("/"))?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.output, "  {} {}", option_marker(i + 1, self.styled), label)?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            if let Ok(num) = line.parse::<usize>() {
                if (1..=options.len()).contains(&num) {
                    return Ok(Some(options[num - 1]));
                }
            }
            if let Ok(severity) = line.parse::<Severity>() {
                if severity != Severity::None {
                    return Ok(Some(severity));
                }
            }

            writeln!(
                self.output,
                "  ! Please enter a number between 1 and {}",
                options.len()
            )?;
        }
    }

    /// Run the full prompt flow
    pub fn collect(&mut self) -> Result<SymptomSelection> {
        let category_names: Vec<String> = self
            .catalog
            .categories()
            .iter()
            .map(|c| c.name.clone())
            .collect();

        let picked = self.ask_multi("Select symptom categories:", &category_names)?;
        let categories: Vec<String> = picked.iter().map(|&i| category_names[i].clone()).collect();

        let mut selection = SymptomSelection::new().with_categories(categories.clone());
        if categories.is_empty() {
            return Ok(selection);
        }

        let offered = self.catalog.symptoms_in(&categories)?;
        let picked = self.ask_multi("Select symptoms:", &offered)?;

        for i in picked {
            let symptom = offered[i].clone();
            match self.ask_severity(&symptom)? {
                Some(severity) => selection = selection.with_symptom(symptom, severity),
                None => break,
            }
        }

        Ok(selection)
    }
}
