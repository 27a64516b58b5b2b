//! New-customer lookup loop
//!
//! The loop asks whether a new entry follows, collects the four attributes,
//! and validates them as a whole. Any invalid attribute discards the entire
//! entry and the loop asks for a new entry again; it never reprompts a
//! single field. Answering "no" ends the loop.

use anyhow::Result;

use crate::pipeline::{Classifier, CustomerQuery, LookupOutcome, RawEntry, SegmentError};

/// Attribute asked for during an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Country,
    Source,
    Sex,
    Age,
}

impl Field {
    pub fn prompt(&self) -> &'static str {
        match self {
            Field::Country => "Enter Country Code",
            Field::Source => "Enter Source",
            Field::Sex => "Enter Sex",
            Field::Age => "Enter Age",
        }
    }
}

/// Source of interactive answers
pub trait Prompter {
    /// Ask whether another entry follows
    fn confirm_new_entry(&mut self) -> Result<bool>;

    /// Ask for one attribute; `hint` lists the accepted values
    fn ask(&mut self, field: Field, hint: &str) -> Result<String>;

    /// Report that the current entry was discarded
    fn reject(&mut self, error: &SegmentError);
}

/// Drives a [`Prompter`] against a [`Classifier`]
pub struct LookupSession<'a, P: Prompter> {
    classifier: Classifier<'a>,
    prompter: P,
}

impl<'a, P: Prompter> LookupSession<'a, P> {
    pub fn new(classifier: Classifier<'a>, prompter: P) -> Self {
        Self {
            classifier,
            prompter,
        }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    fn hint(&self, field: Field) -> String {
        match field {
            Field::Country => format!(
                "Country Codes: {}",
                self.classifier.table().countries().join(" | ")
            ),
            Field::Source => "Source: android | ios".to_string(),
            Field::Sex => "Sex: male | female".to_string(),
            Field::Age => format!(
                "Age: a number between 0 and {}",
                self.classifier.table().age_buckets().ceiling()
            ),
        }
    }

    fn collect_entry(&mut self) -> Result<RawEntry> {
        let mut entry = RawEntry::default();
        for field in [Field::Country, Field::Source, Field::Sex, Field::Age] {
            let hint = self.hint(field);
            let answer = self.prompter.ask(field, &hint)?;
            match field {
                Field::Country => entry.country = answer,
                Field::Source => entry.source = answer,
                Field::Sex => entry.sex = answer,
                Field::Age => entry.age = answer,
            }
        }
        Ok(entry)
    }

    /// Prompt until a valid entry is given (`Some`) or the user declines (`None`)
    pub fn next_query(&mut self) -> Result<Option<CustomerQuery>> {
        while self.prompter.confirm_new_entry()? {
            let entry = self.collect_entry()?;
            match self.classifier.parse_entry(&entry) {
                Ok(query) => return Ok(Some(query)),
                Err(e) => self.prompter.reject(&e),
            }
        }
        Ok(None)
    }

    /// Classify entries until the user declines, handing each outcome to `report`
    pub fn run(&mut self, mut report: impl FnMut(&LookupOutcome)) -> Result<Vec<LookupOutcome>> {
        let mut outcomes = Vec::new();
        while let Some(query) = self.next_query()? {
            match self.classifier.classify(&query) {
                Ok(outcome) => {
                    report(&outcome);
                    outcomes.push(outcome);
                }
                Err(e) => self.prompter.reject(&e),
            }
        }
        Ok(outcomes)
    }
}
