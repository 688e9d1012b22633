//! waypoint search command

use clap::Args;
use console::style;
use waypoint_adapter::RecordDto;
use waypoint_domain::{Criteria, Record};

use crate::wiring::App;

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Free text matched against name, description and location
    pub text: Option<String>,

    /// Field filter, repeatable (id, name, description, location)
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

impl SearchCommand {
    pub fn criteria(&self) -> Criteria {
        let base = match &self.text {
            Some(text) => Criteria::text(text.as_str()),
            None if self.fields.is_empty() => Criteria::default(),
            None => Criteria::fields(),
        };
        self.fields
            .iter()
            .fold(base, |criteria, (key, value)| criteria.with_field(key.as_str(), value.as_str()))
    }

    /// Never fails on upstream trouble; an outage prints as "no records"
    pub fn run(&self, app: &App, json: bool) -> anyhow::Result<()> {
        let criteria = self.criteria();
        let records = app.controller.search(&criteria);

        if json {
            let dtos: Vec<RecordDto> = records.iter().map(RecordDto::from).collect();
            println!("{}", serde_json::to_string_pretty(&dtos)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("{} for {}", style("No records").yellow(), criteria);
            return Ok(());
        }
        for record in &records {
            print_record(record);
        }
        println!();
        println!("{}", style(format!("{} record(s)", records.len())).dim());
        Ok(())
    }
}

pub(crate) fn print_record(record: &Record) {
    println!(
        "{}  {}",
        style(record.id()).cyan().bold(),
        style(record.name()).bold()
    );
    if let Some(location) = record.location() {
        println!("    location: {}", location);
    }
    if !record.description().is_empty() {
        println!("    {}", record.description());
    }
    for image in record.images() {
        println!("    {} {}", style("image").dim(), image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(text: Option<&str>, fields: &[(&str, &str)]) -> SearchCommand {
        SearchCommand {
            text: text.map(str::to_string),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("location = Rome"),
            Ok(("location".to_string(), "Rome".to_string()))
        );
        assert!(parse_field("Rome").is_err());
        assert!(parse_field("=Rome").is_err());
    }

    #[test]
    fn test_text_only_criteria() {
        assert_eq!(command(Some("rome"), &[]).criteria(), Criteria::text("rome"));
        assert_eq!(command(None, &[]).criteria(), Criteria::default());
    }

    #[test]
    fn test_fields_criteria() {
        let criteria = command(None, &[("location", "Rome"), ("name", "forum")]).criteria();
        assert_eq!(
            criteria,
            Criteria::fields()
                .with_field("location", "Rome")
                .with_field("name", "forum")
        );
    }

    #[test]
    fn test_text_and_fields_combine() {
        let criteria = command(Some("ruins"), &[("location", "Rome")]).criteria();
        assert_eq!(
            criteria.pairs(),
            &[
                ("text".to_string(), "ruins".to_string()),
                ("location".to_string(), "Rome".to_string())
            ]
        );
    }
}
