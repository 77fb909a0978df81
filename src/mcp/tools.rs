//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use super::handlers::{DatasetQueryHandler, DownloadDatasetHandler};
use crate::models::{License, PropertyType, SortBy, SortDirection, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::sources::DatasetSource;

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "dataset_query")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with the dataset tools backed by `source`
    pub fn new(source: Arc<dyn DatasetSource>, download_dir: PathBuf) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Tool {
            name: "dataset_query".to_string(),
            description: DATASET_QUERY_DESCRIPTION.to_string(),
            input_schema: dataset_query_schema(),
            handler: Arc::new(DatasetQueryHandler {
                source: source.clone(),
            }),
        });

        registry.register(Tool {
            name: "download_dataset".to_string(),
            description: format!(
                "Download a ColabFit dataset archive into {}. Format \"parquet\" is the dataset \
                 after ingestion into the database and is saved as <dataset_id>.tar.gz; \
                 \"original\" is the raw source data and is saved as <dataset_id>.tar.xz. \
                 Returns success, downloaded_file and bytes, or success=false with an error.",
                download_dir.display()
            ),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "dataset_id": {
                        "type": "string",
                        "description": "ColabFit dataset ID, following the pattern DS_123456abcdef_0"
                    },
                    "format": {
                        "type": "string",
                        "description": "'parquet' for the ingested dataset, 'original' for the raw data files",
                        "default": "parquet"
                    }
                }
            }),
            handler: Arc::new(DownloadDatasetHandler {
                source,
                download_dir,
            }),
        });

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}

const DATASET_QUERY_DESCRIPTION: &str = "Query the ColabFit materials and chemical database for \
    datasets. All filters are optional. Results are paginated locally: the response contains \
    success, results (the dataset records on the requested page), result_length, page, \
    page_size and total_pages. On failure success is false and results holds the error.";

fn string_list(description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description
    })
}

fn enum_list(description: &str, names: Vec<&'static str>) -> Value {
    serde_json::json!({
        "type": "array",
        "items": { "type": "string", "enum": names },
        "description": description
    })
}

fn integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "minimum": 0,
        "description": description
    })
}

fn sort_by_description() -> String {
    let fields: Vec<String> = SortBy::ALL
        .iter()
        .map(|field| format!("{} ({})", field.as_str(), field.meaning()))
        .collect();
    format!("Field to sort datasets by: {}", fields.join(", "))
}

fn dataset_query_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Dataset name" },
            "authors": { "type": "string", "description": "Dataset authors" },
            "description": { "type": "string", "description": "Dataset description" },
            "elements": string_list("Chemical elements present in the dataset, e.g. ['C', 'H']"),
            "exact_elements": {
                "type": "boolean",
                "description": "If true only datasets containing exactly these elements match; \
                                otherwise datasets containing these and other elements also match",
                "default": false
            },
            "doi": { "type": "string", "description": "Dataset DOI" },
            "min_co": integer("Minimum number of configurations in a dataset"),
            "max_co": integer("Maximum number of configurations in a dataset"),
            "min_elements": integer("Minimum number of distinct elements in a dataset"),
            "max_elements": integer("Maximum number of distinct elements in a dataset"),
            "min_atoms": integer("Minimum number of atoms in a dataset"),
            "max_atoms": integer("Maximum number of atoms in a dataset"),
            "property_types": enum_list("Property types present in the dataset", PropertyType::names()),
            "license": enum_list("Licenses the dataset was released under", License::names()),
            "equilibrium": {
                "type": "boolean",
                "description": "Restrict to datasets containing only equilibrium structures \
                                (false: non-equilibrium structures from relaxation or MD trajectories)"
            },
            "given_sort_by": {
                "type": "string",
                "enum": SortBy::names(),
                "description": sort_by_description()
            },
            "given_sort_direction": {
                "type": "string",
                "enum": SortDirection::names(),
                "description": "Order results by given_sort_by in descending or ascending order",
                "default": SortDirection::default().as_str()
            },
            "software": string_list("Software used to compute the data, e.g. Gaussian, VASP"),
            "methods_text_filter": string_list("Computational methods, e.g. DFT-PBE, CCSD"),
            "page": {
                "type": "integer",
                "minimum": 1,
                "description": "Page number to return",
                "default": DEFAULT_PAGE
            },
            "page_size": {
                "type": "integer",
                "minimum": 1,
                "description": "Number of results per page",
                "default": DEFAULT_PAGE_SIZE
            }
        }
    })
}
