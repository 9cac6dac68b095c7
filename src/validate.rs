//! Pre-render dataset validation.
//!
//! Three independent checks: geometries resolve an identifier, regions
//! have data entries, data keys have metadata records. Each check stops
//! at its first finding, so a report carries at most one diagnostic per
//! check, but a failed check never hides the others.

use crate::data::{DataMap, Metadata};
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Forwards every diagnostic to the `log` facade.
    pub fn log(&self) {
        for diagnostic in &self.diagnostics {
            match diagnostic.severity {
                Severity::Error => log::error!("{}", diagnostic.message),
                Severity::Warning => log::warn!("{}", diagnostic.message),
            }
        }
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.diagnostics.push(Diagnostic { severity, message });
    }
}

/// Runs every check against the dataset. The metadata check only runs
/// when metadata was supplied.
pub fn run(
    topology: &Topology,
    data: &DataMap,
    metadata: Option<&Metadata>,
    id_path: &str,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_geometry_ids(topology, id_path, &mut report);
    check_data_keys(topology, data, id_path, &mut report);
    if let Some(metadata) = metadata {
        check_metadata_keys(data, metadata, &mut report);
    }
    report
}

/// Every geometry in every collection must resolve an identifier.
/// The number zero counts; an empty string does not.
fn check_geometry_ids(topology: &Topology, id_path: &str, report: &mut ValidationReport) -> bool {
    for (_, geometries) in topology.geometry_collections() {
        for geometry in geometries {
            if geometry.identifier(id_path).is_empty() {
                let properties =
                    serde_json::to_string(&geometry.properties).unwrap_or_default();
                report.push(
                    Severity::Error,
                    format!(
                        "geometry has no usable identifier at path {id_path:?}; properties: {properties}"
                    ),
                );
                return false;
            }
        }
    }
    true
}

/// Every region identifier should key an entry in the data map.
fn check_data_keys(
    topology: &Topology,
    data: &DataMap,
    id_path: &str,
    report: &mut ValidationReport,
) -> bool {
    for (_, geometries) in topology.geometry_collections() {
        for geometry in geometries {
            let key = geometry.identifier(id_path).canonical();
            if !data.contains_key(&key) {
                report.push(
                    Severity::Warning,
                    format!("no data entry for region {key:?}; it will render with value 0"),
                );
                return false;
            }
        }
    }
    true
}

/// Every data key should have a metadata record backing tooltips.
fn check_metadata_keys(data: &DataMap, metadata: &Metadata, report: &mut ValidationReport) -> bool {
    for key in data.keys() {
        if !metadata.contains_key(key) {
            report.push(
                Severity::Warning,
                format!("no metadata record for data key {key:?}"),
            );
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MetaItem, MetaValue};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn two_state_topology() -> Topology {
        serde_json::from_value(json!({
            "type": "Topology",
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]], "id": 11, "properties": { "name": "Rondônia" } },
                        { "type": "Polygon", "arcs": [[0]], "id": 12, "properties": { "name": "Acre" } }
                    ]
                }
            },
            "arcs": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap()
    }

    fn no_id_topology() -> Topology {
        serde_json::from_value(json!({
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Acre" } },
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Amapá" } }
                    ]
                }
            },
            "arcs": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap()
    }

    fn data(entries: &[(&str, f64)]) -> DataMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn metadata_for(keys: &[&str]) -> Metadata {
        keys.iter()
            .map(|k| {
                let mut item = MetaItem::new();
                item.insert("name".to_string(), MetaValue::from(*k));
                (k.to_string(), item)
            })
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn complete_dataset_is_clean() {
        let report = run(
            &two_state_topology(),
            &data(&[("11", 1.0), ("12", 2.0)]),
            Some(&metadata_for(&["11", "12"])),
            "id",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn missing_identifier_is_a_single_error() {
        let report = run(&no_id_topology(), &data(&[]), None, "id");
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("no usable identifier"));
        assert!(errors[0].message.contains("Acre"));
    }

    #[test]
    fn missing_data_key_is_a_single_warning() {
        let report = run(&two_state_topology(), &data(&[]), None, "id");
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("\"11\""));
        assert!(warnings[0].message.contains("render with value 0"));
    }

    #[test]
    fn missing_metadata_record_is_a_single_warning() {
        let report = run(
            &two_state_topology(),
            &data(&[("11", 1.0), ("12", 2.0)]),
            Some(&metadata_for(&["11"])),
            "id",
        );
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no metadata record"));
        assert!(warnings[0].message.contains("\"12\""));
    }

    #[test]
    fn one_failed_check_does_not_hide_the_others() {
        let report = run(&no_id_topology(), &data(&[("x", 1.0)]), Some(&metadata_for(&[])), "id");
        assert_eq!(report.errors().count(), 1);
        // Data check warns on the empty identifier, metadata check on "x".
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn zero_identifier_is_valid() {
        let topology: Topology = serde_json::from_value(json!({
            "objects": {
                "zones": {
                    "type": "GeometryCollection",
                    "geometries": [{ "type": "Polygon", "arcs": [[0]], "id": 0 }]
                }
            },
            "arcs": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap();
        let report = run(&topology, &data(&[("0", 9.0)]), None, "id");
        assert!(report.is_clean());
    }

    #[test]
    fn identifier_path_routes_through_properties() {
        let report = run(
            &two_state_topology(),
            &data(&[("Rondônia", 1.0), ("Acre", 2.0)]),
            None,
            "properties.name",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn without_metadata_the_metadata_check_is_skipped() {
        let report = run(&two_state_topology(), &data(&[("11", 1.0), ("12", 2.0)]), None, "id");
        assert!(report.is_clean());
    }
}
