use thiserror::Error;

/// Errors surfaced by the dashboard pipeline.
///
/// Cached load outcomes are handed out on every redraw, so the enum is
/// `Clone` and carries rendered messages rather than source errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Data source for '{dataset}' not found: {location}")]
    DataSourceNotFound { dataset: String, location: String },

    #[error("Column '{column}' not found in {dataset}")]
    SchemaMismatch { dataset: String, column: String },

    #[error("Failed to parse {dataset}: {message}")]
    Parse { dataset: String, message: String },

    #[error("Unsupported file extension for {dataset}: .{extension}")]
    UnsupportedFormat { dataset: String, extension: String },

    #[error("Failed to fetch {dataset} from {url}: {message}")]
    Fetch {
        dataset: String,
        url: String,
        message: String,
    },
}

impl DashboardError {
    pub fn schema_mismatch(dataset: &str, column: &str) -> Self {
        DashboardError::SchemaMismatch {
            dataset: dataset.to_string(),
            column: column.to_string(),
        }
    }

    /// Dataset name the error refers to.
    pub fn dataset(&self) -> &str {
        match self {
            DashboardError::DataSourceNotFound { dataset, .. }
            | DashboardError::SchemaMismatch { dataset, .. }
            | DashboardError::Parse { dataset, .. }
            | DashboardError::UnsupportedFormat { dataset, .. }
            | DashboardError::Fetch { dataset, .. } => dataset,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_column_and_dataset() {
        let err = DashboardError::schema_mismatch("food_listings", "Food_Type");
        let msg = err.to_string();
        assert!(msg.contains("Food_Type"));
        assert!(msg.contains("food_listings"));
        assert_eq!(err.dataset(), "food_listings");
    }
}
