// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a task or event ID is a positive integer
pub fn validate_id(id_str: &str, kind: &str) -> Result<i64, String> {
    id_str.parse::<i64>()
        .map_err(|_| format!("Invalid {} ID: '{}'. ID must be a number.", kind, id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid {} ID: {}. ID must be positive.", kind, id))
            }
        })
}

/// Validate project name format (alphanumeric, dots, underscores, hyphens)
pub fn validate_project_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Project name cannot be empty".to_string());
    }

    if name.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(format!("Invalid project name: '{}'. Project names can only contain letters, numbers, dots, underscores, and hyphens.", name))
    }
}
