//! Error macros for cohortgrade

/// Macro for returning invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::GradeError::invalid_value($context, $value))
    };
}

/// Macro for returning invalid input errors tagged with the failing stage
#[macro_export]
macro_rules! bail_input {
    ($stage:expr, $reason:expr) => {
        return Err($crate::error::GradeError::invalid_input($stage, $reason))
    };
}
