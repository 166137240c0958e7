use super::ValueValidator;

#[derive(Clone, Debug)]
pub struct WebPathValidator { }

impl ValueValidator<String> for self::WebPathValidator {
    fn validate(&self, path: &String) -> Result<(), String> {
        if !path.starts_with('/') {
            Err(format!("path must start with / character: {path}"))
        } else {
            Ok(())
        }
    }
}

pub const WEB_PATH: &WebPathValidator = &WebPathValidator {};

#[derive(Clone, Debug)]
pub struct NonEmptyValidator { }

impl ValueValidator<String> for self::NonEmptyValidator {
    fn validate(&self, value: &String) -> Result<(), String> {
        if value.is_empty() {
            Err("value must not be empty".to_owned())
        } else {
            Ok(())
        }
    }
}

pub const NON_EMPTY: &NonEmptyValidator = &NonEmptyValidator {};
