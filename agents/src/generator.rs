//! Project emission. The default generator writes a FastAPI skeleton with one
//! handler per declared route, an event topic table and a smoke test.

use crate::error::AgentError;
use crate::error::AgentResult;
use crate::spec_parser::ConfigMap;
use crate::spec_parser::ConfigScalar;
use crate::spec_parser::OperationTable;
use crate::spec_parser::RouteTable;
use crate::spec_parser::read_operation_listing;
use crate::spec_parser::read_path_listing;
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

const PACKAGE_DIR: &str = "generated_api";

/// Feature switches read from the `features` section of the run configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    /// Wire tracing and metrics instrumentation into the emitted app.
    pub observability: bool,
}

impl Features {
    /// Only boolean values switch a feature on; anything else leaves the default.
    pub fn from_map(map: &ConfigMap) -> Self {
        Self {
            observability: map
                .get("observability")
                .and_then(ConfigScalar::as_bool)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub openapi: PathBuf,
    pub asyncio: PathBuf,
    pub output_dir: PathBuf,
    pub features: Features,
}

/// Emits a project for a request and reports where its root is. The root must
/// contain a runnable test suite.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<PathBuf>;
}

/// Source templates used by [`FastApiGenerator`]. Placeholders are written as
/// `{name}` and substituted verbatim.
#[derive(Debug, Clone)]
pub struct FastApiTemplates {
    pub main: String,
    pub route: String,
    pub observability: String,
    pub events: String,
    pub smoke_test: String,
}

impl Default for FastApiTemplates {
    fn default() -> Self {
        Self {
            main: r#"from fastapi import FastAPI

app = FastAPI()
{observability}
{routes}

if __name__ == "__main__":
    import uvicorn
    uvicorn.run(app, host="0.0.0.0", port=8000)
"#
            .to_string(),

            route: r#"
@app.{method}("{path}")
async def {func_name}():
    return {"message": "not implemented"}
"#
            .to_string(),

            observability: r#"
from opentelemetry.instrumentation.fastapi import FastAPIInstrumentor
from prometheus_fastapi_instrumentator import Instrumentator

FastAPIInstrumentor().instrument_app(app)
Instrumentator().instrument(app).expose(app)
"#
            .to_string(),

            events: r#""""Event topics declared by the operation listing."""

TOPICS = {
{topics}}
"#
            .to_string(),

            smoke_test: r#"from fastapi.testclient import TestClient
from generated_api.main import app

client = TestClient(app)


def test_root():
    response = client.get("{first_path}")
    assert response.status_code == 200
"#
            .to_string(),
        }
    }
}

impl FastApiTemplates {
    pub fn render_main(&self, routes: &RouteTable, features: Features) -> String {
        let handlers = routes
            .iter()
            .flat_map(|(path, methods)| {
                methods.iter().map(move |method| {
                    self.route
                        .replace("{method}", method)
                        .replace("{path}", path)
                        .replace("{func_name}", &handler_name(method, path))
                })
            })
            .collect::<Vec<_>>()
            .join("\n");
        let observability = if features.observability {
            self.observability.as_str()
        } else {
            ""
        };
        self.main
            .replace("{observability}", observability)
            .replace("{routes}", &handlers)
    }

    pub fn render_events(&self, operations: &OperationTable) -> String {
        let topics: String = operations
            .iter()
            .map(|(operation, topic)| {
                format!("    {}: {},\n", python_string(operation), python_string(topic))
            })
            .collect();
        self.events.replace("{topics}", &topics)
    }

    pub fn render_smoke_test(&self, routes: &RouteTable) -> String {
        let first_path = routes.keys().next().map_or("/", String::as_str);
        self.smoke_test.replace("{first_path}", first_path)
    }
}

/// Python identifier for the handler of `method` on `path`.
pub fn handler_name(method: &str, path: &str) -> String {
    let name: String = format!("{method}_{path}")
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    name.trim_matches('_').to_string()
}

fn python_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, Default)]
pub struct FastApiGenerator {
    templates: FastApiTemplates,
}

impl FastApiGenerator {
    pub fn new(templates: FastApiTemplates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &FastApiTemplates {
        &self.templates
    }

    fn write(path: &Path, contents: &str) -> AgentResult<()> {
        fs::write(path, contents).map_err(|err| AgentError::io(path, err))
    }

    fn create_dir(path: &Path) -> AgentResult<()> {
        fs::create_dir_all(path).map_err(|err| AgentError::io(path, err))
    }
}

impl CodeGenerator for FastApiGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<PathBuf> {
        let routes = read_path_listing(&request.openapi)?;
        let operations = read_operation_listing(&request.asyncio)?;

        let package = request.output_dir.join(PACKAGE_DIR);
        let tests_dir = package.join("tests");
        Self::create_dir(&tests_dir)?;

        Self::write(&package.join("__init__.py"), "")?;
        Self::write(
            &package.join("main.py"),
            &self.templates.render_main(&routes, request.features),
        )?;
        Self::write(
            &package.join("events.py"),
            &self.templates.render_events(&operations),
        )?;
        Self::write(
            &tests_dir.join("test_app.py"),
            &self.templates.render_smoke_test(&routes),
        )?;

        tracing::info!(
            project = %package.display(),
            routes = routes.len(),
            operations = operations.len(),
            observability = request.features.observability,
            "generated project"
        );
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_parser::parse_operation_listing;
    use crate::spec_parser::parse_path_listing;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn handler_names_are_identifiers() {
        assert_eq!(handler_name("get", "/items"), "get__items");
        assert_eq!(handler_name("delete", "/items/{id}/"), "delete__items_id");
        assert_eq!(handler_name("get", "/items-list/v1.2"), "get__items_list_v1_2");
    }

    #[test]
    fn renders_one_handler_per_method() {
        let routes = parse_path_listing("/items:\n  get:\n  post:\n");
        let main = FastApiTemplates::default().render_main(&routes, Features::default());
        assert!(main.contains("@app.get(\"/items\")\nasync def get__items():"));
        assert!(main.contains("@app.post(\"/items\")\nasync def post__items():"));
        assert!(!main.contains("Instrumentator"));
    }

    #[test]
    fn observability_flag_adds_instrumentation() {
        let routes = parse_path_listing("/health:\n  get:\n");
        let features = Features { observability: true };
        let main = FastApiTemplates::default().render_main(&routes, features);
        assert!(main.contains("FastAPIInstrumentor().instrument_app(app)"));
        assert!(main.contains("Instrumentator().instrument(app).expose(app)"));
    }

    #[test]
    fn features_ignore_non_boolean_values() {
        let mut map = ConfigMap::new();
        map.insert(
            "observability".to_string(),
            ConfigScalar::Text("yes".to_string()),
        );
        assert_eq!(Features::from_map(&map), Features::default());
        map.insert("observability".to_string(), ConfigScalar::Bool(true));
        assert!(Features::from_map(&map).observability);
    }

    #[test]
    fn renders_topic_table() {
        let operations = parse_operation_listing("signup:\n  topic: users.\"new\"\n");
        let events = FastApiTemplates::default().render_events(&operations);
        assert!(events.contains("    \"signup\": \"users.\\\"new\\\"\",\n"));
    }

    #[test]
    fn smoke_test_targets_first_path_or_root() {
        let templates = FastApiTemplates::default();
        let routes = parse_path_listing("/b:\n  get:\n/a:\n  get:\n");
        assert!(templates.render_smoke_test(&routes).contains("client.get(\"/b\")"));
        assert!(templates
            .render_smoke_test(&RouteTable::new())
            .contains("client.get(\"/\")"));
    }

    #[test]
    fn writes_project_layout() {
        let dir = tempdir().unwrap();
        let openapi = dir.path().join("api.spec");
        let asyncio = dir.path().join("events.spec");
        fs::write(&openapi, "/items:\n  get:\n").unwrap();
        fs::write(&asyncio, "created:\n  topic: items.created\n").unwrap();

        let request = GenerationRequest {
            openapi,
            asyncio,
            output_dir: dir.path().join("out"),
            features: Features::default(),
        };
        let root = FastApiGenerator::default().generate(&request).unwrap();

        assert_eq!(root, dir.path().join("out").join("generated_api"));
        for file in ["__init__.py", "main.py", "events.py", "tests/test_app.py"] {
            assert!(root.join(file).is_file(), "missing {file}");
        }
        let events = fs::read_to_string(root.join("events.py")).unwrap();
        assert!(events.contains("\"created\": \"items.created\""));
    }

    #[test]
    fn missing_listing_is_an_error() {
        let dir = tempdir().unwrap();
        let request = GenerationRequest {
            openapi: dir.path().join("absent.spec"),
            asyncio: dir.path().join("absent-too.spec"),
            output_dir: dir.path().join("out"),
            features: Features::default(),
        };
        let err = FastApiGenerator::default().generate(&request).unwrap_err();
        assert!(err.downcast_ref::<AgentError>().is_some());
    }
}
