//! Request body validation.
//!
//! Bodies arrive as `serde_json::Value` and are checked field by field so a
//! single 400 can report every problem at once, keyed by field name.

use serde_json::{Map, Value};

use crate::database::models::{KittenChanges, NewRating};
use crate::error::{ApiError, FieldErrors};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

pub const COLOR_MAX_LEN: usize = 50;
pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const SCORE_MAX: i64 = i16::MAX as i64;

pub fn max_length(n: usize) -> String {
    format!("Ensure this field has no more than {} characters.", n)
}

pub fn min_value(n: i64) -> String {
    format!("Ensure this value is greater than or equal to {}.", n)
}

pub fn max_value(n: i64) -> String {
    format!("Ensure this value is less than or equal to {}.", n)
}

pub fn does_not_exist(pk: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field-by-field reader over a JSON object body.
///
/// In partial mode absent fields are skipped instead of reported as required.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn of(body: &'a Value, partial: bool) -> Result<Self, ApiError> {
        match body {
            Value::Object(map) => Ok(Self {
                map,
                partial,
                errors: FieldErrors::new(),
            }),
            other => Err(ApiError::field(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected a dictionary, but got {}.", json_type(other)),
            )),
        }
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Non-null value of a field, recording required/null errors
    fn value(&mut self, field: &str) -> Option<&'a Value> {
        match self.map.get(field) {
            None => {
                if !self.partial {
                    self.reject(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.reject(field, NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn raw_string(&mut self, field: &str) -> Option<String> {
        match self.value(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.reject(field, NOT_A_STRING);
                None
            }
        }
    }

    /// Trimmed string, non-blank, at most `max_len` characters when given
    pub fn string(&mut self, field: &str, max_len: Option<usize>) -> Option<String> {
        let value = self.raw_string(field)?;
        let value = value.trim();
        if value.is_empty() {
            self.reject(field, NOT_BLANK);
            return None;
        }
        if let Some(max) = max_len {
            if value.chars().count() > max {
                self.reject(field, max_length(max));
                return None;
            }
        }
        Some(value.to_string())
    }

    /// Optional string: absent or null reads as empty, blank is allowed
    pub fn optional_string(&mut self, field: &str, max_len: usize) -> String {
        let value = match self.map.get(field) {
            None | Some(Value::Null) => return String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                self.reject(field, NOT_A_STRING);
                return String::new();
            }
        };
        if value.chars().count() > max_len {
            self.reject(field, max_length(max_len));
        }
        value
    }

    /// String kept exactly as sent, only checked for blankness
    pub fn secret(&mut self, field: &str) -> Option<String> {
        let value = self.raw_string(field)?;
        if value.trim().is_empty() {
            self.reject(field, NOT_BLANK);
            return None;
        }
        Some(value)
    }

    /// Integer within `min..=max`. Integral floats and numeric strings are accepted.
    pub fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let value = self.value(field)?;
        let Some(n) = coerce_integer(value) else {
            self.reject(field, NOT_AN_INTEGER);
            return None;
        };
        if n < min {
            self.reject(field, min_value(min));
            return None;
        }
        if n > max {
            self.reject(field, max_value(max));
            return None;
        }
        Some(n)
    }

    /// Primary key reference; existence is checked by the caller
    pub fn pk(&mut self, field: &str) -> Option<i64> {
        let value = self.value(field)?;
        let pk = match value {
            Value::Number(_) | Value::String(_) => coerce_integer(value),
            _ => None,
        };
        if pk.is_none() {
            self.reject(
                field,
                format!("Incorrect type. Expected pk value, received {}.", json_type(value)),
            );
        }
        pk
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.errors)))
        }
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            // "3.0" and "3." read as 3
            let digits = match s.split_once('.') {
                Some((whole, frac)) if frac.chars().all(|c| c == '0') => whole,
                Some(_) => return None,
                None => s,
            };
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Kitten write model `{breed_id, color, age, description}`; other keys are ignored.
///
/// With `partial` every field is optional (PATCH); otherwise all are required.
pub fn parse_kitten(body: &Value, partial: bool) -> Result<(KittenChanges, Fields<'_>), ApiError> {
    let mut fields = Fields::of(body, partial)?;
    let changes = KittenChanges {
        breed_id: fields.pk("breed_id"),
        color: fields.string("color", Some(COLOR_MAX_LEN)),
        age: fields
            .integer("age", 0, i32::MAX as i64)
            .and_then(|age| i32::try_from(age).ok()),
        description: fields.string("description", None),
    };
    Ok((changes, fields))
}

/// Rating fields as read from the body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingInput {
    pub kitten_id: Option<i64>,
    pub score: Option<i16>,
}

impl RatingInput {
    pub fn into_new(self) -> Option<NewRating> {
        Some(NewRating {
            kitten_id: self.kitten_id?,
            score: self.score?,
        })
    }
}

/// Rating write model `{kitten, score}`; the rater comes from the token
pub fn parse_rating(body: &Value) -> Result<(RatingInput, Fields<'_>), ApiError> {
    let mut fields = Fields::of(body, false)?;
    let input = RatingInput {
        kitten_id: fields.pk("kitten"),
        score: fields
            .integer("score", 0, SCORE_MAX)
            .and_then(|score| i16::try_from(score).ok()),
    };
    Ok((input, fields))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Registration fields as read from the body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: String,
}

impl RegistrationInput {
    pub fn into_registration(self) -> Option<Registration> {
        Some(Registration {
            username: self.username?,
            password: self.password?,
            email: self.email,
        })
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// `{username, password, email}`; uniqueness is checked against the store by the caller
pub fn parse_registration(body: &Value) -> Result<(RegistrationInput, Fields<'_>), ApiError> {
    let mut fields = Fields::of(body, false)?;

    let mut username = fields.string("username", Some(USERNAME_MAX_LEN));
    if username.as_deref().is_some_and(|name| !is_valid_username(name)) {
        fields.reject("username", INVALID_USERNAME);
        username = None;
    }

    let password = fields.secret("password");

    let email = fields.optional_string("email", EMAIL_MAX_LEN);
    if !email.is_empty() && !fields.has_error("email") && !is_valid_email(&email) {
        fields.reject("email", INVALID_EMAIL);
    }

    Ok((
        RegistrationInput {
            username,
            password,
            email,
        },
        fields,
    ))
}

/// `{username, password}` for the token endpoint
pub fn parse_credentials(body: &Value) -> Result<(String, String), ApiError> {
    let mut fields = Fields::of(body, false)?;
    let username = fields.string("username", None);
    let password = fields.secret("password");
    fields.finish()?;
    match (username, password) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(ApiError::validation_error("Invalid input", None)),
    }
}

/// `{refresh}` for the refresh endpoint
pub fn parse_refresh(body: &Value) -> Result<String, ApiError> {
    let mut fields = Fields::of(body, false)?;
    let refresh = fields.string("refresh", None);
    fields.finish()?;
    refresh.ok_or_else(|| ApiError::validation_error("Invalid input", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::ValidationError {
                field_errors: Some(errors),
                ..
            } => errors,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = Fields::of(&json!([1, 2]), false).err().unwrap();
        assert_eq!(
            field_errors(err)[NON_FIELD_ERRORS],
            "Invalid data. Expected a dictionary, but got array."
        );
    }

    #[test]
    fn full_kitten_requires_every_field() {
        let body = json!({});
        let (changes, fields) = parse_kitten(&body, false).unwrap();
        assert!(changes.is_empty());
        let errors = field_errors(fields.finish().unwrap_err());
        for field in ["breed_id", "color", "age", "description"] {
            assert_eq!(errors[field], REQUIRED);
        }
    }

    #[test]
    fn partial_kitten_skips_missing_fields() {
        let body = json!({"age": "4", "owner": "mallory"});
        let (changes, fields) = parse_kitten(&body, true).unwrap();
        fields.finish().unwrap();
        assert_eq!(
            changes,
            KittenChanges {
                age: Some(4),
                ..Default::default()
            }
        );
    }

    #[test]
    fn kitten_field_rules() {
        let body = json!({
            "breed_id": true,
            "color": "x".repeat(51),
            "age": -1,
            "description": "   "
        });
        let (_, fields) = parse_kitten(&body, false).unwrap();
        let errors = field_errors(fields.finish().unwrap_err());
        assert_eq!(errors["breed_id"], "Incorrect type. Expected pk value, received boolean.");
        assert_eq!(errors["color"], max_length(50));
        assert_eq!(errors["age"], min_value(0));
        assert_eq!(errors["description"], NOT_BLANK);
    }

    #[test]
    fn integers_accept_integral_floats_and_numeric_strings() {
        let body = json!({"a": 3.0, "b": " 7 ", "c": "2.00", "d": 2.5, "e": "two", "f": false});
        let mut fields = Fields::of(&body, false).unwrap();
        assert_eq!(fields.integer("a", 0, 10), Some(3));
        assert_eq!(fields.integer("b", 0, 10), Some(7));
        assert_eq!(fields.integer("c", 0, 10), Some(2));
        assert_eq!(fields.integer("d", 0, 10), None);
        assert_eq!(fields.integer("e", 0, 10), None);
        assert_eq!(fields.integer("f", 0, 10), None);
        let errors = field_errors(fields.finish().unwrap_err());
        assert_eq!(errors["d"], NOT_AN_INTEGER);
        assert_eq!(errors["f"], NOT_AN_INTEGER);
    }

    #[test]
    fn rating_score_bounds() {
        let body = json!({"kitten": 1, "score": 32768});
        let (rating, fields) = parse_rating(&body).unwrap();
        assert_eq!(rating.kitten_id, Some(1));
        assert!(rating.into_new().is_none());
        assert_eq!(field_errors(fields.finish().unwrap_err())["score"], max_value(32767));

        let body = json!({"kitten": "1", "score": 5});
        let (rating, fields) = parse_rating(&body).unwrap();
        fields.finish().unwrap();
        assert_eq!(rating.into_new(), Some(NewRating { kitten_id: 1, score: 5 }));
    }

    #[test]
    fn null_is_not_missing() {
        let body = json!({"kitten": null, "score": 1});
        let (_, fields) = parse_rating(&body).unwrap();
        assert_eq!(field_errors(fields.finish().unwrap_err())["kitten"], NOT_NULL);
    }

    #[test]
    fn registration_rules() {
        let body = json!({"username": "bad name!", "password": "", "email": "nope"});
        let (registration, fields) = parse_registration(&body).unwrap();
        assert!(registration.into_registration().is_none());
        let errors = field_errors(fields.finish().unwrap_err());
        assert_eq!(errors["username"], INVALID_USERNAME);
        assert_eq!(errors["password"], NOT_BLANK);
        assert_eq!(errors["email"], INVALID_EMAIL);
    }

    #[test]
    fn registration_email_is_optional() {
        let body = json!({"username": "alice.b+1@x", "password": " pass word "});
        let (registration, fields) = parse_registration(&body).unwrap();
        fields.finish().unwrap();
        assert_eq!(
            registration.into_registration(),
            Some(Registration {
                username: "alice.b+1@x".to_string(),
                password: " pass word ".to_string(),
                email: String::new(),
            })
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@example..com"));
    }

    #[test]
    fn credentials_and_refresh_are_required() {
        assert!(parse_credentials(&json!({"username": "a"})).is_err());
        assert_eq!(
            parse_credentials(&json!({"username": "a", "password": "p"})).unwrap(),
            ("a".to_string(), "p".to_string())
        );
        assert!(parse_refresh(&json!({})).is_err());
        assert_eq!(parse_refresh(&json!({"refresh": "tok"})).unwrap(), "tok");
    }
}
