use crate::error::AppError;
use crate::labeller::Label;

/// Renders a label for stdout: the bare label, or the label and its parts as
/// pretty JSON.
pub fn render_label(label: &Label, json_mode: bool) -> Result<String, AppError> {
    if json_mode {
        Ok(serde_json::to_string_pretty(label)?)
    } else {
        Ok(label.label.clone())
    }
}

pub fn print_output(label: &Label, json_mode: bool) -> Result<(), AppError> {
    println!("{}", render_label(label, json_mode)?);
    Ok(())
}
