// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

fn default_file_name() -> String {
    "students.jsonl".to_string()
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileStoreConfig {
    /// Directory holding the collection file. Created on init if missing.
    pub data_dir: String,
    /// One JSON document per line.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}
