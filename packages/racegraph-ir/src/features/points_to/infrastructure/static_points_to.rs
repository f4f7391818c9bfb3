//! Table-backed points-to provider
//!
//! Holds precomputed results: value → objects, function pointer → functions,
//! and optional object names. Used for fixtures and for results exported by
//! an external pointer analysis as JSON.
//!
//! ```json
//! {
//!   "objects": ["counter", "lock"],
//!   "values": [{"value": 0, "objects": [0]}, {"value": 1, "objects": [1]}],
//!   "functions": [{"value": 2, "targets": ["worker"]}]
//! }
//! ```

use crate::features::points_to::domain::AbstractObject;
use crate::features::points_to::ports::PointsToProvider;
use crate::shared::models::{ModelError, ValueId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValueEntry {
    value: ValueId,
    objects: Vec<AbstractObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionEntry {
    value: ValueId,
    targets: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct PointsToTable {
    #[serde(default)]
    objects: Vec<String>,
    #[serde(default)]
    values: Vec<ValueEntry>,
    #[serde(default)]
    functions: Vec<FunctionEntry>,
}

#[derive(Debug, Default, Clone)]
pub struct StaticPointsTo {
    names: Vec<String>,
    points_to: FxHashMap<ValueId, Vec<AbstractObject>>,
    functions: FxHashMap<ValueId, Vec<String>>,
}

impl StaticPointsTo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a named object
    pub fn object(&mut self, name: impl Into<String>) -> AbstractObject {
        let object = AbstractObject(self.names.len() as u64);
        self.names.push(name.into());
        object
    }

    /// Add `objects` to the points-to set of `value`, keeping insertion order
    pub fn bind(&mut self, value: ValueId, objects: impl IntoIterator<Item = AbstractObject>) -> &mut Self {
        let set = self.points_to.entry(value).or_default();
        for object in objects {
            if !set.contains(&object) {
                set.push(object);
            }
        }
        self
    }

    /// Record that function pointer `value` may target `function`
    pub fn bind_function(&mut self, value: ValueId, function: impl Into<String>) -> &mut Self {
        let function = function.into();
        let targets = self.functions.entry(value).or_default();
        if !targets.contains(&function) {
            targets.push(function);
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let table: PointsToTable = serde_json::from_str(json)?;
        let mut pts = Self {
            names: table.objects,
            ..Self::default()
        };
        for entry in table.values {
            pts.bind(entry.value, entry.objects);
        }
        for entry in table.functions {
            for target in entry.targets {
                pts.bind_function(entry.value, target);
            }
        }
        Ok(pts)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        let mut values: Vec<_> = self
            .points_to
            .iter()
            .map(|(&value, objects)| ValueEntry {
                value,
                objects: objects.clone(),
            })
            .collect();
        values.sort_by_key(|entry| entry.value);
        let mut functions: Vec<_> = self
            .functions
            .iter()
            .map(|(&value, targets)| FunctionEntry {
                value,
                targets: targets.clone(),
            })
            .collect();
        functions.sort_by_key(|entry| entry.value);

        let table = PointsToTable {
            objects: self.names.clone(),
            values,
            functions,
        };
        Ok(serde_json::to_string_pretty(&table)?)
    }
}

impl PointsToProvider for StaticPointsTo {
    fn points_to(&self, value: ValueId) -> Vec<AbstractObject> {
        self.points_to.get(&value).cloned().unwrap_or_default()
    }

    fn function_targets(&self, value: ValueId) -> Vec<String> {
        self.functions.get(&value).cloned().unwrap_or_default()
    }

    fn describe(&self, object: AbstractObject) -> Option<String> {
        self.names.get(object.0 as usize).cloned()
    }
}
