// Utility functions
pub mod error;
pub mod path_template;
