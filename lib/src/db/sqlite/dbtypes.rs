pub const SCHEMA_FILES: [&str; 1] = ["00-init.sql"];

/// Database files are named `<db_name>.<DB_FILE_EXTENSION>`.
pub const DB_FILE_EXTENSION: &str = "sqlite";

pub mod table {
    pub const CONFIGS: &str = "tbl_config";
    pub const LOGS: &str = "tbl_log";
}
