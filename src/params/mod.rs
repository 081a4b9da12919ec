// Module: Params
// Placeholder interpolation for journey documents: record values, environment
// variables, and date tokens anchored to an injected reference date.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static INTERPOLATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_+.:-]+)\}").expect("valid interpolation regex")
});

/// Date format used by calendar aria-labels, e.g. `Mon Sep 07 2026`.
pub const ARIA_DATE_FORMAT: &str = "%a %b %d %Y";

/// Values substituted into `${token}` placeholders of a journey document.
///
/// Three token families:
/// - plain tokens resolve from the seeded record (typically one spreadsheet
///   row, e.g. `${from_city}`),
/// - `ENV_NAME` resolves from the process environment,
/// - `date` / `date+N` resolve from the reference date (plus N days),
///   formatted as a calendar aria-label.
///
/// The reference date is always injected by the caller, never read from the
/// clock, so a parameterized journey resolves to the same selector strings
/// on any day it is run.
#[derive(Debug, Default, Clone)]
pub struct ParamContext {
    values: HashMap<String, Value>,
    reference_date: Option<NaiveDate>,
}

impl ParamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the context from a data-provider record (column name → value).
    pub fn from_record(record: &HashMap<String, Value>) -> Self {
        Self {
            values: record.clone(),
            reference_date: None,
        }
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Interpolates every `${token}` placeholder inside a string.
    pub fn interpolate(&self, input: &str) -> Result<String> {
        let mut result = String::new();
        let mut last_index = 0;

        for capture in INTERPOLATION_RE.captures_iter(input) {
            let matched = capture.get(0).expect("capture 0 always present");
            result.push_str(&input[last_index..matched.start()]);
            let token = capture.get(1).expect("group 1 always present").as_str();
            result.push_str(&self.resolve_token(token)?);
            last_index = matched.end();
        }

        result.push_str(&input[last_index..]);
        Ok(result)
    }

    fn resolve_token(&self, token: &str) -> Result<String> {
        if let Some(rest) = token.strip_prefix("ENV_") {
            return std::env::var(rest)
                .map_err(|_| anyhow!("Missing environment variable '{}'.", rest));
        }
        if token == "date" {
            return Ok(self.offset_date(0)?.format(ARIA_DATE_FORMAT).to_string());
        }
        if let Some(offset) = token.strip_prefix("date+") {
            let days: u64 = offset
                .parse()
                .map_err(|_| anyhow!("Invalid date offset in token '{}'.", token))?;
            return Ok(self.offset_date(days)?.format(ARIA_DATE_FORMAT).to_string());
        }
        match self.values.get(token) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(primitive) => Ok(primitive.to_string()),
            None => Err(anyhow!("Missing context variable '{}'.", token)),
        }
    }

    fn offset_date(&self, days: u64) -> Result<NaiveDate> {
        let base = self
            .reference_date
            .ok_or_else(|| anyhow!("Date token used without a reference date."))?;
        base.checked_add_days(Days::new(days))
            .ok_or_else(|| anyhow!("Date offset +{} days overflows.", days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert("from_city".to_string(), json!("Bengaluru"));
        map.insert("to_city".to_string(), json!("GOI"));
        map.insert("passengers".to_string(), json!(2));
        map
    }

    #[test]
    fn interpolates_record_values() {
        let ctx = ParamContext::from_record(&record());
        let out = ctx.interpolate("fly ${from_city} to ${to_city}").unwrap();
        assert_eq!(out, "fly Bengaluru to GOI");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let ctx = ParamContext::from_record(&record());
        assert_eq!(ctx.interpolate("${passengers} pax").unwrap(), "2 pax");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let ctx = ParamContext::new();
        let err = ctx.interpolate("${nope}").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn strings_without_placeholders_pass_through() {
        let ctx = ParamContext::new();
        assert_eq!(ctx.interpolate("#results").unwrap(), "#results");
    }

    #[test]
    fn date_tokens_use_the_injected_reference_date() {
        // 2026-08-30 is a Sunday; the original offsets were +7 and +14.
        let base = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let ctx = ParamContext::new().with_reference_date(base);

        assert_eq!(ctx.interpolate("${date}").unwrap(), "Sun Aug 30 2026");
        assert_eq!(
            ctx.interpolate("//div[@aria-label='${date+7}']").unwrap(),
            "//div[@aria-label='Sun Sep 06 2026']"
        );
        assert_eq!(ctx.interpolate("${date+14}").unwrap(), "Sun Sep 13 2026");
    }

    #[test]
    fn date_tokens_are_deterministic() {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let ctx = ParamContext::new().with_reference_date(base);
        let first = ctx.interpolate("${date+7}").unwrap();
        let second = ctx.interpolate("${date+7}").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn date_token_without_reference_date_is_an_error() {
        let ctx = ParamContext::new();
        let err = ctx.interpolate("${date+7}").unwrap_err();
        assert!(err.to_string().contains("reference date"));
    }

    #[test]
    fn bad_date_offset_is_an_error() {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let ctx = ParamContext::new().with_reference_date(base);
        assert!(ctx.interpolate("${date+x}").unwrap_err().to_string().contains("date+x"));
    }

    #[test]
    fn env_tokens_resolve_from_the_environment() {
        std::env::set_var("JOURNEY_TEST_TOKEN", "hello");
        let ctx = ParamContext::new();
        assert_eq!(ctx.interpolate("${ENV_JOURNEY_TEST_TOKEN}").unwrap(), "hello");
        std::env::remove_var("JOURNEY_TEST_TOKEN");
    }
}
