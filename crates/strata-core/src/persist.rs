use crate::ir::Module;
use crate::Result;
use std::fs;
use std::path::Path;

pub fn save_module(module: &Module, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(module)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_module(path: impl AsRef<Path>) -> Result<Module> {
    let json = fs::read_to_string(path)?;
    module_from_json(&json)
}

pub fn module_from_json(json: &str) -> Result<Module> {
    Ok(serde_json::from_str(json)?)
}

pub fn module_to_json(module: &Module) -> Result<String> {
    Ok(serde_json::to_string_pretty(module)?)
}
