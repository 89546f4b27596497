//! Input descriptors and the parsing of posted values into JSON.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value, json};
use validator::ValidateUrl;

use crate::render::format::title_case;

/// `datetime-local` input format.
const INPUT_DATETIME: &str = "%Y-%m-%dT%H:%M";
/// Format sent to the backend.
const API_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Boolean,
    Select,
    Integer,
    Number,
    DateTimeRange,
    Markdown,
    Geolocation,
    Url,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: Vec<Choice>,
    pub help_text: Option<String>,
    pub placeholder: Option<String>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            title: None,
            kind,
            required: false,
            default: None,
            choices: Vec::new(),
            help_text: None,
            placeholder: None,
            max_length: None,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| title_case(&self.name))
    }

    /// Names of the HTML inputs this field posts.
    pub fn input_names(&self) -> Vec<String> {
        match self.kind {
            FieldType::DateTimeRange => vec![self.sub_input("start"), self.sub_input("end")],
            FieldType::Geolocation => vec![self.sub_input("lat"), self.sub_input("lng")],
            _ => vec![self.name.clone()],
        }
    }

    pub fn sub_input(&self, part: &str) -> String {
        format!("{}.{part}", self.name)
    }

    /// Turns the posted inputs into the JSON value sent to the backend.
    ///
    /// Blank input becomes `null`; the required check happens later against
    /// the merged value.
    pub fn parse(&self, posted: &[(String, String)]) -> Result<Value, String> {
        let input = |name: &str| {
            posted
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        };

        match self.kind {
            FieldType::Boolean => Ok(Value::Bool(matches!(
                input(&self.name),
                Some("on" | "true" | "1")
            ))),
            FieldType::Text | FieldType::Markdown => match input(&self.name) {
                None => Ok(Value::Null),
                Some(text) => {
                    if let Some(max_length) = self.max_length
                        && text.chars().count() > max_length
                    {
                        return Err(format!("At most {max_length} characters."));
                    }
                    Ok(Value::String(text.to_string()))
                }
            },
            FieldType::Url => match input(&self.name) {
                None => Ok(Value::Null),
                Some(url) if url.validate_url() => Ok(Value::String(url.to_string())),
                Some(_) => Err("Enter a valid URL.".to_string()),
            },
            FieldType::Integer => match input(&self.name) {
                None => Ok(Value::Null),
                Some(raw) => {
                    let number = raw
                        .parse::<i64>()
                        .map_err(|_| "Enter a whole number.".to_string())?;
                    self.check_bounds(number as f64)?;
                    Ok(Value::from(number))
                }
            },
            FieldType::Number => match input(&self.name) {
                None => Ok(Value::Null),
                Some(raw) => {
                    let number = raw
                        .parse::<f64>()
                        .ok()
                        .filter(|number| number.is_finite())
                        .ok_or_else(|| "Enter a number.".to_string())?;
                    self.check_bounds(number)?;
                    Ok(Value::from(number))
                }
            },
            FieldType::Select => match input(&self.name) {
                None => Ok(Value::Null),
                Some(raw) => self
                    .choices
                    .iter()
                    .find(|choice| value_text(&choice.value) == raw)
                    .map(|choice| choice.value.clone())
                    .ok_or_else(|| "Select one of the available options.".to_string()),
            },
            FieldType::DateTimeRange => {
                let start = input(&self.sub_input("start"));
                let end = input(&self.sub_input("end"));
                match (start, end) {
                    (None, None) => Ok(Value::Null),
                    (Some(start), Some(end)) => {
                        let start = parse_datetime(start)?;
                        let end = parse_datetime(end)?;
                        if end < start {
                            return Err("The end must not be before the start.".to_string());
                        }
                        Ok(json!({
                            "start": start.format(API_DATETIME).to_string(),
                            "end": end.format(API_DATETIME).to_string(),
                        }))
                    }
                    _ => Err("Enter both a start and an end.".to_string()),
                }
            }
            FieldType::Geolocation => {
                let lat = input(&self.sub_input("lat"));
                let lng = input(&self.sub_input("lng"));
                match (lat, lng) {
                    (None, None) => Ok(Value::Null),
                    (Some(lat), Some(lng)) => {
                        let lat = parse_coordinate(lat, 90.0)?;
                        let lng = parse_coordinate(lng, 180.0)?;
                        Ok(json!({"lat": lat, "lng": lng}))
                    }
                    _ => Err("Enter both latitude and longitude.".to_string()),
                }
            }
        }
    }

    fn check_bounds(&self, number: f64) -> Result<(), String> {
        if let Some(min) = self.min
            && number < min
        {
            return Err(format!("Must be at least {min}."));
        }
        if let Some(max) = self.max
            && number > max
        {
            return Err(format!("Must be at most {max}."));
        }
        Ok(())
    }
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, INPUT_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, API_DATETIME))
        .map_err(|_| format!("`{raw}` is not a valid date and time."))
}

fn parse_coordinate(raw: &str, limit: f64) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.abs() <= limit)
        .ok_or_else(|| format!("Coordinates must be between -{limit} and {limit}."))
}

/// Value as it appears in a text input or an `<option value>`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `datetime-local` representation of a backend timestamp.
pub fn datetime_input(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|text| text.chars().take(16).collect())
        .unwrap_or_default()
}

/// Reads one part of an object value (`start`, `lat`, ...) as input text.
pub fn part_text(value: &Value, part: &str) -> String {
    value
        .as_object()
        .and_then(|object: &Map<String, Value>| object.get(part))
        .map(value_text)
        .unwrap_or_default()
}

/// JSON equality that treats `5` and `5.0` as the same number.
pub fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        _ => left == right,
    }
}
