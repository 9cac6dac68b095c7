//! TopoJSON document model and arc decoding.
//!
//! Arcs arrive either quantized (delta-encoded integers plus a transform)
//! or as plain positions. Decoding resolves every arc to absolute
//! lon/lat coordinates once; geometries then stitch rings out of the
//! shared arc table by index, with `!i` addressing arc `i` reversed.

use std::fmt;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::HeatmapError;
use crate::property::{self, PropertyValue};

/// A parsed TopoJSON document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(deserialize_with = "objects_in_document_order")]
    pub objects: Vec<NamedObject>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

/// One entry of the topology's `objects` map, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedObject {
    pub name: String,
    pub geometry: Geometry,
}

/// Quantization transform for delta-encoded arcs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// A TopoJSON geometry object together with its identifying fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    #[serde(flatten)]
    pub value: GeometryValue,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Value,
}

/// The shape-bearing part of a geometry object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryValue {
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    Point {
        #[serde(default)]
        coordinates: Vec<f64>,
    },
    MultiPoint {
        #[serde(default)]
        coordinates: Vec<Vec<f64>>,
    },
    LineString {
        #[serde(default)]
        arcs: Vec<i32>,
    },
    MultiLineString {
        #[serde(default)]
        arcs: Vec<Vec<i32>>,
    },
    Polygon {
        #[serde(default)]
        arcs: Vec<Vec<i32>>,
    },
    MultiPolygon {
        #[serde(default)]
        arcs: Vec<Vec<Vec<i32>>>,
    },
}

impl Topology {
    pub fn from_json(text: &str) -> Result<Self, HeatmapError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolves every arc to absolute coordinates, applying the
    /// quantization transform when one is present.
    pub fn decode_arcs(&self) -> Vec<Vec<Coord<f64>>> {
        self.arcs.iter().map(|arc| self.decode_arc(arc)).collect()
    }

    fn decode_arc(&self, arc: &[Vec<f64>]) -> Vec<Coord<f64>> {
        match &self.transform {
            Some(t) => {
                let mut x = 0.0;
                let mut y = 0.0;
                arc.iter()
                    .map(|position| {
                        x += position.first().copied().unwrap_or(0.0);
                        y += position.get(1).copied().unwrap_or(0.0);
                        Coord {
                            x: x * t.scale[0] + t.translate[0],
                            y: y * t.scale[1] + t.translate[1],
                        }
                    })
                    .collect()
            }
            None => arc
                .iter()
                .map(|position| Coord {
                    x: position.first().copied().unwrap_or(0.0),
                    y: position.get(1).copied().unwrap_or(0.0),
                })
                .collect(),
        }
    }

    /// The geometries rendered as regions: the first named object's
    /// collection members, or the first object itself when it is a bare
    /// geometry. `None` when the document has no objects at all.
    pub fn regions(&self) -> Option<&[Geometry]> {
        let first = self.objects.first()?;
        Some(match &first.geometry.value {
            GeometryValue::GeometryCollection { geometries } => geometries.as_slice(),
            _ => std::slice::from_ref(&first.geometry),
        })
    }

    /// Every named geometry collection in document order.
    pub fn geometry_collections(&self) -> impl Iterator<Item = (&str, &[Geometry])> {
        self.objects.iter().filter_map(|object| match &object.geometry.value {
            GeometryValue::GeometryCollection { geometries } => {
                Some((object.name.as_str(), geometries.as_slice()))
            }
            _ => None,
        })
    }
}

impl Geometry {
    /// Resolves the configured identifier path against this geometry.
    /// The first path segment picks the root: `id` or `properties`.
    pub fn identifier(&self, path: &str) -> PropertyValue {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let root = match head {
            "id" => self.id.as_ref(),
            "properties" => Some(&self.properties),
            _ => None,
        };
        match (root, rest) {
            (Some(value), Some(rest)) => property::resolve(value, rest),
            (Some(value), None) => PropertyValue::from_scalar(value),
            (None, _) => PropertyValue::Empty,
        }
    }

    /// Stitches this geometry's rings into areal shapes. Points and
    /// lines carry no fillable outline and decode to an empty set;
    /// nested collections contribute the shapes of their members.
    pub fn decode(&self, arcs: &[Vec<Coord<f64>>]) -> Result<MultiPolygon<f64>, HeatmapError> {
        match &self.value {
            GeometryValue::Polygon { arcs: rings } => {
                Ok(MultiPolygon(vec![decode_polygon(arcs, rings)?]))
            }
            GeometryValue::MultiPolygon { arcs: polygons } => {
                let mut shapes = Vec::with_capacity(polygons.len());
                for rings in polygons {
                    shapes.push(decode_polygon(arcs, rings)?);
                }
                Ok(MultiPolygon(shapes))
            }
            GeometryValue::GeometryCollection { geometries } => {
                let mut shapes = Vec::new();
                for member in geometries {
                    shapes.extend(member.decode(arcs)?.0);
                }
                Ok(MultiPolygon(shapes))
            }
            _ => Ok(MultiPolygon(Vec::new())),
        }
    }
}

fn decode_polygon(
    arcs: &[Vec<Coord<f64>>],
    rings: &[Vec<i32>],
) -> Result<Polygon<f64>, HeatmapError> {
    let mut iter = rings.iter();
    let exterior = match iter.next() {
        Some(indexes) => LineString::new(stitch_ring(arcs, indexes)?),
        None => LineString::new(Vec::new()),
    };
    let mut interiors = Vec::with_capacity(rings.len().saturating_sub(1));
    for indexes in iter {
        interiors.push(LineString::new(stitch_ring(arcs, indexes)?));
    }
    Ok(Polygon::new(exterior, interiors))
}

/// Joins a sequence of arc indexes into one ring. Consecutive arcs share
/// their join point, so the accumulated ring drops its last coordinate
/// before each new arc is appended.
fn stitch_ring(
    arcs: &[Vec<Coord<f64>>],
    indexes: &[i32],
) -> Result<Vec<Coord<f64>>, HeatmapError> {
    let mut ring: Vec<Coord<f64>> = Vec::new();
    for &index in indexes {
        let resolved = if index < 0 { !index } else { index } as usize;
        let arc = arcs.get(resolved).ok_or(HeatmapError::ArcIndex {
            index,
            count: arcs.len(),
        })?;
        if !ring.is_empty() {
            ring.pop();
        }
        if index < 0 {
            ring.extend(arc.iter().rev().copied());
        } else {
            ring.extend(arc.iter().copied());
        }
    }
    Ok(ring)
}

/// `serde_json` hands object members back sorted; the first named object
/// decides which geometries render, so document order must survive.
fn objects_in_document_order<'de, D>(deserializer: D) -> Result<Vec<NamedObject>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ObjectsVisitor;

    impl<'de> Visitor<'de> for ObjectsVisitor {
        type Value = Vec<NamedObject>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of named geometry objects")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut objects = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, geometry)) = map.next_entry::<String, Geometry>()? {
                objects.push(NamedObject { name, geometry });
            }
            Ok(objects)
        }
    }

    deserializer.deserialize_map(ObjectsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Topology {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn objects_keep_document_order() {
        let topo = parse(json!({
            "type": "Topology",
            "objects": {
                "zones": { "type": "GeometryCollection", "geometries": [] },
                "annotations": { "type": "GeometryCollection", "geometries": [] }
            },
            "arcs": []
        }));
        let names: Vec<&str> = topo.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["zones", "annotations"]);
    }

    #[test]
    fn decodes_quantized_arcs() {
        let topo = parse(json!({
            "transform": { "scale": [0.01, 0.01], "translate": [-50.0, -20.0] },
            "objects": {},
            "arcs": [[[0, 0], [1000, 0], [0, 1000]]]
        }));
        let arcs = topo.decode_arcs();
        assert_eq!(
            arcs[0],
            vec![
                Coord { x: -50.0, y: -20.0 },
                Coord { x: -40.0, y: -20.0 },
                Coord { x: -40.0, y: -10.0 },
            ]
        );
    }

    #[test]
    fn decodes_plain_arcs_verbatim() {
        let topo = parse(json!({
            "objects": {},
            "arcs": [[[3.5, 1.0], [4.0, 2.0]]]
        }));
        let arcs = topo.decode_arcs();
        assert_eq!(
            arcs[0],
            vec![Coord { x: 3.5, y: 1.0 }, Coord { x: 4.0, y: 2.0 }]
        );
    }

    #[test]
    fn negative_index_reverses_arc() {
        let arcs = vec![vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ]];
        let ring = stitch_ring(&arcs, &[-1]).unwrap();
        assert_eq!(
            ring,
            vec![
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn stitching_drops_duplicate_join_points() {
        let arcs = vec![
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }],
            vec![Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }],
        ];
        let ring = stitch_ring(&arcs, &[0, 1]).unwrap();
        assert_eq!(
            ring,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
            ]
        );
    }

    #[test]
    fn out_of_range_arc_index_errors() {
        let arcs = vec![vec![Coord { x: 0.0, y: 0.0 }]];
        let err = stitch_ring(&arcs, &[3]).unwrap_err();
        assert!(matches!(err, HeatmapError::ArcIndex { index: 3, count: 1 }));
    }

    #[test]
    fn quantized_and_plain_forms_decode_alike() {
        let quantized = parse(json!({
            "transform": { "scale": [0.001, 0.001], "translate": [0.0, 0.0] },
            "objects": {},
            "arcs": [[[0, 0], [10000, 0], [0, 10000], [-10000, 0], [0, -10000]]]
        }));
        let plain = parse(json!({
            "objects": {},
            "arcs": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
        }));
        assert_eq!(quantized.decode_arcs(), plain.decode_arcs());
    }

    #[test]
    fn regions_fall_back_to_bare_first_object() {
        let topo = parse(json!({
            "objects": {
                "country": { "type": "Polygon", "arcs": [[0]], "id": "BR" }
            },
            "arcs": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }));
        let regions = topo.regions().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].identifier("id").canonical(), "BR");
    }

    #[test]
    fn regions_use_first_collection_members() {
        let topo = parse(json!({
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]], "id": 11 },
                        { "type": "Polygon", "arcs": [[0]], "id": 12 }
                    ]
                },
                "capitals": { "type": "GeometryCollection", "geometries": [] }
            },
            "arcs": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }));
        let regions = topo.regions().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].identifier("id").canonical(), "12");
    }

    #[test]
    fn identifier_routes_on_first_segment() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "arcs": [],
            "id": 29,
            "properties": { "name": "Bahia", "ibge": { "code": "29" } }
        }))
        .unwrap();
        assert_eq!(geometry.identifier("id").canonical(), "29");
        assert_eq!(geometry.identifier("properties.name").canonical(), "Bahia");
        assert_eq!(geometry.identifier("properties.ibge.code").canonical(), "29");
        assert!(geometry.identifier("properties.missing").is_empty());
        assert!(geometry.identifier("type").is_empty());
    }

    #[test]
    fn missing_id_is_empty() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "arcs": []
        }))
        .unwrap();
        assert!(geometry.identifier("id").is_empty());
        assert!(geometry.identifier("properties.name").is_empty());
    }

    #[test]
    fn polygon_decodes_holes_as_interiors() {
        let topo = parse(json!({
            "objects": {},
            "arcs": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                [[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0], [1.0, 1.0]]
            ]
        }));
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "arcs": [[0], [1]]
        }))
        .unwrap();
        let shape = geometry.decode(&topo.decode_arcs()).unwrap();
        assert_eq!(shape.0.len(), 1);
        assert_eq!(shape.0[0].interiors().len(), 1);
    }

    #[test]
    fn point_geometry_decodes_to_no_shapes() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "Point",
            "coordinates": [-47.9, -15.8]
        }))
        .unwrap();
        let shape = geometry.decode(&[]).unwrap();
        assert!(shape.0.is_empty());
    }
}
