//! Everything that leaves the project model as text.
//!
//! - `project_file`: the JSON project document, plus atomic save and load
//! - `script`: the VapourSynth script for the external engine
//! - `timecodes`: timecodes v1 for variable frame rate output
//!
//! The project model itself never touches the filesystem; this module is
//! the only place that does.

mod project_file;
mod schema;
mod script;
mod timecodes;

pub use project_file::{from_json, load_project, save_project, to_json};
pub use schema::PROJECT_FORMAT_VERSION;
pub use script::ScriptGenerator;
pub use timecodes::timecodes_v1;
