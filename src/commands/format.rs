//! Shared output formatting helpers for commands

use cohortgrade_core::error::Result;
use serde_json::json;

/// Dispatch on output format when the json branch returns a Result and the
/// human/records branches print directly.
///
/// ```rust,ignore
/// output_by_format_result!(cli.format,
///     json => { print_json(&value) },
///     human => { println!("done"); },
///     records => { println!("H ..."); }
/// )
/// ```
macro_rules! output_by_format_result {
    ($format:expr, json => $json:expr, human => $human:block, records => $records:block) => {
        match $format {
            $crate::cli::OutputFormat::Json => $json,
            $crate::cli::OutputFormat::Human => {
                $human;
                Ok(())
            }
            $crate::cli::OutputFormat::Records => {
                $records;
                Ok(())
            }
        }
    };
}
pub(crate) use output_by_format_result;

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a JSON status message with optional fields
pub fn print_json_status(
    status: &str,
    message: Option<&str>,
    extra_fields: &[(&str, serde_json::Value)],
) -> Result<()> {
    let mut output = json!({ "status": status });

    if let Some(obj) = output.as_object_mut() {
        if let Some(msg) = message {
            obj.insert("message".to_string(), json!(msg));
        }
        for (key, value) in extra_fields {
            obj.insert(key.to_string(), value.clone());
        }
    }

    print_json(&output)
}
