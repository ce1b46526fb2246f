use thiserror::Error;

/// Error type for invalid coupling operations.
///
/// Every variant raised while wiring a model names the category, the component and the
/// offending variable or parameter so the caller can locate the problem without a debugger.
#[derive(Error, Debug)]
pub enum CouplingError {
    #[error("{0}")]
    Error(String),
    #[error("the {category} slot was given a {found} component")]
    TypeMismatch { category: String, found: String },
    #[error("{0}")]
    NotSupported(String),
    #[error("no data '{variable}' available in the dataset of {component} ({category})")]
    MissingData {
        variable: String,
        category: String,
        component: String,
    },
    #[error("{component} ({category}) is missing the parameter(s): {}", .missing.join(", "))]
    MissingParameter {
        category: String,
        component: String,
        missing: Vec<String>,
    },
    #[error(
        "units of '{variable}' for {component} ({category}) are not compatible: expected '{expected}', found '{found}'"
    )]
    UnitsIncompatible {
        variable: String,
        category: String,
        component: String,
        expected: String,
        found: String,
    },
    #[error("{component} ({category}): {reason}")]
    DomainIncompatible {
        category: String,
        component: String,
        reason: String,
    },
    #[error("the state '{state}' of {component} ({category}) was not initialised")]
    MissingState {
        state: String,
        category: String,
        component: String,
    },
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("no component was given for the {0} slot")]
    MissingComponent(String),
    #[error("more than one component was given for the {0} slot")]
    DuplicateComponent(String),
    #[error("{component} ({category}) did not return the outward '{transfer}'")]
    MissingTransfer {
        transfer: String,
        category: String,
        component: String,
    },
    #[error("'{0}' was requested but is not an input of the component")]
    MissingVariable(String),
    #[error("could not read settings: {0}")]
    Config(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, CouplingError>`.
pub type CouplingResult<T> = Result<T, CouplingError>;
