mod envman;

pub use envman::EnvmanExporter;
