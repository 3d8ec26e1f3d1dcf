use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let layout = &config.layout;

    if config.identifier_field.trim().is_empty() {
        errors.push("identifier_field: must not be empty".to_string());
    }

    if layout.base_marker.is_empty() {
        errors.push("layout.base_marker: must not be empty".to_string());
    }

    if layout.values_start_row <= layout.header_row {
        errors.push(format!(
            "layout.values_start_row: must be after header_row ({} <= {})",
            layout.values_start_row, layout.header_row
        ));
    }

    if layout.values_start_row <= layout.label_row {
        errors.push(format!(
            "layout.values_start_row: must be after label_row ({} <= {})",
            layout.values_start_row, layout.label_row
        ));
    }

    if layout.base_row == layout.header_row {
        errors.push(format!(
            "layout.base_row: must differ from header_row (both {})",
            layout.base_row
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
