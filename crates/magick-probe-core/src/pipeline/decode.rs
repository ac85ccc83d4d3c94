//! Decoding of convert's JSON output into [`ImageResult`]s.

use crate::error::DecodeError;
use crate::types::ImageResult;

use super::sanitize::sanitize;

/// Decode an already sanitized JSON array of image records.
///
/// An empty array is valid and yields no results; a single invocation may
/// describe any number of images (multi-frame files, several inputs).
pub fn decode(sanitized: &[u8]) -> Result<Vec<ImageResult>, DecodeError> {
    Ok(serde_json::from_slice(sanitized)?)
}

/// Sanitize and decode raw convert output in one step.
///
/// Use this for JSON captured from an earlier `convert <files> json:-` run.
pub fn details_from_json(raw: &[u8]) -> Result<Vec<ImageResult>, DecodeError> {
    decode(&sanitize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn fixture(name: &str) -> Vec<u8> {
        let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../tests/fixtures/json")
            .join(name);
        std::fs::read(&path).unwrap_or_else(|e| panic!("reading {path:?}: {e}"))
    }

    #[test]
    fn test_decode_sample_output() {
        let results = details_from_json(&fixture("bug72278.json")).unwrap();
        assert_eq!(results.len(), 1);

        let image = &results[0].image;
        assert_eq!(image.base_name, "bug72278.jpg");
        assert_eq!(image.format, "JPEG");
        assert_eq!(image.image_type, "Bilevel");
        assert_eq!(image.number_pixels, 90000);
        assert_eq!(image.size(), 45720);
        assert_eq!(image.quality, 79);
        assert_eq!(image.channel_depth["red"], 1);

        let geometry = image.geometry.unwrap();
        assert_eq!(
            geometry.to_string(),
            "{{X: 0, Y: 0} {Width: 300, Height: 300}}"
        );

        let red = &image.channel_statistics["Red"];
        assert_eq!(red.mean, Some(255.0));
        assert_eq!(red.entropy, None);

        assert_eq!(image.chromaticity["whitePrimary"].x, 0.3127);
        assert_eq!(image.gamma, Some(0.454545));
    }

    #[test]
    fn test_sample_output_derived_queries() {
        let results = details_from_json(&fixture("bug72278.json")).unwrap();
        let image = &results[0].image;

        assert_eq!(image.profile_names(), vec!["8bim", "exif", "icc", "iptc"]);
        assert_eq!(image.profile_total_size(), 28 + 1717 + 7261 + 16);
        assert_eq!(format!("{:.2}", image.profile_size_percent() * 100.0), "16.48");
        assert!(image.has_profile("iptc"));
        assert!(!image.has_profile("xmp"));

        let props = image.properties_map(&[]);
        let groups: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(
            groups,
            vec!["comment", "date", "exif", "icc", "jpeg", "signature"]
        );
        assert_eq!(props["icc"]["description"], "sRGB IEC61966-2.1");

        let exif = image.exif_tags();
        assert_eq!(exif["Software"], "Paint Shop Pro Photo 12.00");
        assert_eq!(exif["thumbnail:XResolution"], "787399/10000");
    }

    #[test]
    fn test_decode_preserves_record_order() {
        let results = details_from_json(&fixture("multi_frame.json")).unwrap();
        let scenes: Vec<i64> = results.iter().map(|r| r.image.scene).collect();
        assert_eq!(scenes, vec![0, 1, 2, 3]);

        let second = results[1].image.geometry.unwrap();
        assert_eq!(second.canvas().width, 48);
        assert_eq!(results[0].image.colormap.len(), 4);
    }

    #[test]
    fn test_decode_windows_nan_spellings() {
        let results = details_from_json(&fixture("windows_nan.json")).unwrap();
        let gray = &results[0].image.channel_statistics["Gray"];
        assert_eq!(gray.min, Some(128.0));
        assert_eq!(gray.kurtosis, None);
        assert_eq!(gray.skewness, None);
        assert_eq!(gray.entropy, None);
    }

    #[test]
    fn test_decode_empty_array() {
        let results = details_from_json(&fixture("empty.json")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_decode_malformed_output() {
        let err = details_from_json(&fixture("malformed.json")).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unable to decode ImageMagick JSON: "));
    }

    #[test]
    fn test_unsanitized_nan_fails_to_decode() {
        assert!(decode(&fixture("bug72278.json")).is_err());
    }
}
