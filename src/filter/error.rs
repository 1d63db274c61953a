use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
}

impl FilterError {
    /// Name of the request field the error refers to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FilterError::InvalidPage(_) => Some("page"),
            FilterError::InvalidLimit(_) => Some("limit"),
            FilterError::InvalidDate { field, .. } => Some(field),
            _ => None,
        }
    }
}
