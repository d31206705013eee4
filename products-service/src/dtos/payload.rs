//! Validation of raw product payloads.
//!
//! Bodies arrive as arbitrary JSON. Each recognized field is first coerced to
//! its target type, then checked against the same per-field rules in both
//! modes. Create requires `name`, `price` and `category` and fills defaults
//! for the rest; update only considers the fields that are present.

use crate::error::ProductError;
use crate::models::{NewProduct, ProductChanges};
use serde_json::{Map, Value};
use service_core::response::FieldErrors;
use validator::Validate;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_NUMBER: &str = "Not a valid number.";
const NOT_INTEGER: &str = "Not a valid integer.";
const NOT_FINITE: &str = "Special numeric values (nan or infinity) are not permitted.";
const UNKNOWN: &str = "Unknown field.";
const INVALID_INPUT: &str = "Invalid input type.";

const FIELDS: [&str; 5] = ["name", "description", "price", "category", "stock"];
const REQUIRED: [&str; 3] = ["name", "price", "category"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

#[derive(Debug, Default, Validate)]
struct ProductFields {
    #[validate(length(min = 1, max = 100, message = "Length must be between 1 and 100."))]
    name: Option<String>,
    #[validate(length(max = 500, message = "Longer than maximum length 500."))]
    description: Option<String>,
    #[validate(range(min = 0.0, message = "Must be greater than or equal to 0."))]
    price: Option<f64>,
    #[validate(length(min = 1, max = 50, message = "Length must be between 1 and 50."))]
    category: Option<String>,
    #[validate(range(min = 0, message = "Must be greater than or equal to 0."))]
    stock: Option<i64>,
}

/// Validates a create payload, applying `description = ""` and `stock = 0`
/// when those fields are absent.
pub fn validate_new_product(payload: &Value) -> Result<NewProduct, ProductError> {
    let fields = collect(payload, Mode::Create)?;
    match fields {
        ProductFields {
            name: Some(name),
            description,
            price: Some(price),
            category: Some(category),
            stock,
        } => Ok(NewProduct {
            name,
            description: description.unwrap_or_default(),
            price,
            category,
            stock: stock.unwrap_or(0),
        }),
        // collect() reports every missing required field
        _ => Err(ProductError::Internal(anyhow::anyhow!(
            "required product fields missing after validation"
        ))),
    }
}

/// Validates an update payload. Unrecognized keys are ignored; a payload
/// without any recognized field is rejected with
/// [`ProductError::NoFieldsToUpdate`].
pub fn validate_changes(payload: &Value) -> Result<ProductChanges, ProductError> {
    let fields = collect(payload, Mode::Update)?;
    let changes = ProductChanges {
        name: fields.name,
        description: fields.description,
        price: fields.price,
        category: fields.category,
        stock: fields.stock,
    };
    if changes.is_empty() {
        return Err(ProductError::NoFieldsToUpdate);
    }
    Ok(changes)
}

fn collect(payload: &Value, mode: Mode) -> Result<ProductFields, ProductError> {
    let object = match payload {
        Value::Object(object) => object,
        _ => {
            let mut errors = FieldErrors::default();
            errors.add("_schema", INVALID_INPUT);
            return Err(ProductError::Validation(errors));
        }
    };

    if mode == Mode::Update && !FIELDS.iter().any(|f| object.contains_key(*f)) {
        return Err(ProductError::NoFieldsToUpdate);
    }

    let mut errors = FieldErrors::default();
    let fields = ProductFields {
        name: coerce(object, "name", as_string, &mut errors),
        description: coerce(object, "description", as_string, &mut errors),
        price: coerce(object, "price", as_number, &mut errors),
        category: coerce(object, "category", as_string, &mut errors),
        stock: coerce(object, "stock", as_integer, &mut errors),
    };

    if mode == Mode::Create {
        for field in REQUIRED {
            if !object.contains_key(field) {
                errors.add(field, MISSING);
            }
        }
        for key in object.keys() {
            if !FIELDS.contains(&key.as_str()) {
                errors.add(key.as_str(), UNKNOWN);
            }
        }
    }

    if let Err(rule_errors) = fields.validate() {
        errors.merge(rule_errors.into());
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(ProductError::Validation(errors))
    }
}

fn coerce<T>(
    object: &Map<String, Value>,
    field: &str,
    convert: fn(&Value) -> Result<T, &'static str>,
    errors: &mut FieldErrors,
) -> Option<T> {
    match object.get(field)? {
        Value::Null => {
            errors.add(field, NULL);
            None
        }
        value => match convert(value) {
            Ok(v) => Some(v),
            Err(message) => {
                errors.add(field, message);
                None
            }
        },
    }
}

fn as_string(value: &Value) -> Result<String, &'static str> {
    value.as_str().map(str::to_string).ok_or(NOT_STRING)
}

fn as_number(value: &Value) -> Result<f64, &'static str> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or(NOT_NUMBER)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| NOT_NUMBER)?,
        _ => return Err(NOT_NUMBER),
    };
    if number.is_finite() {
        Ok(number)
    } else {
        Err(NOT_FINITE)
    }
}

fn as_integer(value: &Value) -> Result<i64, &'static str> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or(NOT_INTEGER),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| NOT_INTEGER),
        _ => Err(NOT_INTEGER),
    }
}
