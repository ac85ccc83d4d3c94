//! Data model for ImageMagick's JSON image description.
//!
//! `convert <files...> json:-` prints an array of [`ImageResult`]s, one per
//! image (or frame). [`ImageDetails`] mirrors the fields ImageMagick emits and
//! adds a few derived queries on top: file size, embedded profile sizes and
//! grouped properties.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level record in the convert JSON output.
///
/// ImageMagick wraps every image description in an `"image"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    /// The description of one image
    pub image: ImageDetails,
}

impl ImageResult {
    /// Serialize this record to JSON.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        to_json_string(self, pretty)
    }
}

/// Detailed information on one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageDetails {
    /// e.g. "#00FF0000"
    pub alpha: String,
    pub background_color: String,
    pub base_depth: i64,
    /// Source filename without the directory
    pub base_name: String,
    pub base_type: String,
    pub border_color: String,
    pub channel_depth: BTreeMap<String, i64>,
    pub channel_statistics: BTreeMap<String, ChannelStatistics>,
    pub chromaticity: BTreeMap<String, PointFloat>,
    /// "DirectClass" or "PseudoClass"
    pub class: String,
    pub colormap: Vec<String>,
    pub colormap_entries: i64,
    pub colorspace: String,
    pub compose: String,
    pub compression: String,
    pub depth: i64,
    pub dispose: String,
    pub elapsed_time: String,
    pub endianess: String,
    /// Size of the source file with a unit suffix, e.g. "45720B"
    pub filesize: String,
    pub format: String,
    pub format_description: String,
    pub gamma: Option<f64>,
    pub geometry: Option<Geometry>,
    pub image_statistics: BTreeMap<String, ChannelStatistics>,
    pub intensity: String,
    pub interlace: String,
    pub iterations: i64,
    pub matte_color: String,
    pub mime_type: String,
    pub name: String,
    /// Emitted by ImageMagick as a quoted integer
    #[serde(with = "string_i64")]
    pub number_pixels: i64,
    pub orientation: String,
    pub page_geometry: Option<Geometry>,
    pub pixels: i64,
    pub pixels_per_second: String,
    pub print_size: Option<PointFloat>,
    /// Embedded profiles (8bim, exif, icc, iptc, xmp, ...) keyed by name.
    /// Each carries at least a numeric `"length"`.
    pub profiles: BTreeMap<String, Map<String, Value>>,
    /// Flat `"prefix:Tag" -> value` properties, see [`ImageDetails::properties_map`]
    pub properties: BTreeMap<String, String>,
    pub quality: i64,
    pub rendering_intent: String,
    pub resolution: Option<PointFloat>,
    pub scene: i64,
    pub scenes: i64,
    pub tainted: bool,
    pub transparent_color: String,
    #[serde(rename = "type")]
    pub image_type: String,
    pub units: String,
    pub user_time: String,
    pub version: String,
}

impl ImageDetails {
    /// Size of the image file in bytes, parsed from the `"1200B"`-style
    /// `filesize` field. Returns 0 when the field cannot be parsed.
    pub fn size(&self) -> i64 {
        self.filesize.trim_matches('B').parse().unwrap_or(0)
    }

    /// Fraction (0.0 to 1.0) of the total file size used by embedded profiles.
    pub fn profile_size_percent(&self) -> f64 {
        let profiles = self.profile_total_size();
        let total = profiles + self.size();
        if total == 0 {
            return 0.0;
        }
        profiles as f64 / total as f64
    }

    /// Sorted names of the embedded profiles, including zero-length ones.
    pub fn profile_names(&self) -> Vec<String> {
        // BTreeMap keys are already sorted.
        self.profiles.keys().cloned().collect()
    }

    /// Whether the image has a non-empty embedded profile with this name.
    ///
    /// Typical names are 8bim, exif, iptc, xmp, icc, app1 and app12.
    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles
            .get(name)
            .and_then(|props| props.get("length"))
            .and_then(profile_length)
            .is_some_and(|size| size > 0)
    }

    /// Embedded profile names mapped to their size in bytes.
    ///
    /// Lengths may arrive as integers or floats; floats are truncated.
    /// Profiles without a numeric length are left out.
    pub fn profile_sizes(&self) -> BTreeMap<String, i64> {
        self.profiles
            .iter()
            .filter_map(|(name, props)| {
                let size = props.get("length").and_then(profile_length)?;
                Some((name.clone(), size))
            })
            .collect()
    }

    /// Total byte size of all embedded profiles.
    pub fn profile_total_size(&self) -> i64 {
        self.profile_sizes().values().sum()
    }

    /// EXIF tags with the `exif:` prefix removed. Empty if there are none.
    pub fn exif_tags(&self) -> BTreeMap<String, String> {
        self.properties_map(&["exif"])
            .remove("exif")
            .unwrap_or_default()
    }

    /// Properties grouped by tag type.
    ///
    /// Each key is split on its first `:`; the first half becomes the group
    /// and the rest the tag name:
    ///
    /// ```text
    /// {
    ///     "icc":  { "description": "sRGB IEC61966-2.1", ... },
    ///     "exif": { "Software": "Adobe Photoshop CC 2017 (Macintosh)", ... },
    /// }
    /// ```
    ///
    /// Keys without a `:` (like `signature`) produce an empty group.
    /// A non-empty `tag_filter` keeps only the listed groups.
    pub fn properties_map(&self, tag_filter: &[&str]) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut props: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (name, value) in &self.properties {
            let (tag_type, tag) = match name.split_once(':') {
                Some((tag_type, tag)) => (tag_type, Some(tag)),
                None => (name.as_str(), None),
            };

            if !tag_filter.is_empty() && !tag_filter.contains(&tag_type) {
                continue;
            }

            let group = props.entry(tag_type.to_string()).or_default();
            if let Some(tag) = tag {
                group.insert(tag.to_string(), value.clone());
            }
        }
        props
    }

    /// Serialize these details to JSON.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        to_json_string(self, pretty)
    }
}

fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Extract a profile length from a dynamically typed JSON number.
fn profile_length(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| v as i64))
            .or_else(|| n.as_f64().map(|v| v.trunc() as i64)),
        _ => None,
    }
}

/// Per-channel color statistics.
///
/// Any value may be `None`: ImageMagick prints NaN for some of them, which
/// is sanitized to `null` before decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub kurtosis: Option<f64>,
    pub skewness: Option<f64>,
    pub entropy: Option<f64>,
}

/// An integer X, Y coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{X: {}, Y: {}}}", self.x, self.y)
    }
}

/// A floating point X, Y coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointFloat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: f64,
}

impl fmt::Display for PointFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{X: {}, Y: {}}}", self.x, self.y)
    }
}

/// Box dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: i64,
    pub height: i64,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Width: {}, Height: {}}}", self.width, self.height)
    }
}

/// Image geometry: an offset and a size, flattened in the JSON as
/// `{"width": .., "height": .., "x": .., "y": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(flatten)]
    pub offset: Point,
    #[serde(flatten)]
    pub dimensions: Dimensions,
}

impl Geometry {
    /// Total canvas size: the box dimensions plus the offset.
    pub fn canvas(&self) -> Dimensions {
        Dimensions {
            width: self.dimensions.width + self.offset.x,
            height: self.dimensions.height + self.offset.y,
        }
    }

    /// Offset of the box on the canvas.
    pub fn offset(&self) -> Point {
        self.offset
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.offset, self.dimensions)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integers that ImageMagick quotes, like `"numberPixels": "90000"`.
mod string_i64 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s.is_empty() => Ok(0),
            Value::String(s) => s.trim().parse().map_err(D::Error::custom),
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| D::Error::custom(format!("{n} is not an integer"))),
            Value::Null => Ok(0),
            other => Err(D::Error::custom(format!(
                "expected a quoted integer, got {other}"
            ))),
        }
    }
}
