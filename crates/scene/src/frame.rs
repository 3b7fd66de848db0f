use catalog::{country_code, flag_asset_path};
use foundation::RecordId;
use serde::Serialize;

use crate::filter::FilteredRecord;
use crate::selection::ActiveRegions;

/// Computed mark geometry, in inner plot pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Position and size attribute chosen for a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributePair {
    pub position: String,
    pub size: String,
}

impl AttributePair {
    pub fn new(position: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            size: size.into(),
        }
    }
}

/// One positioned mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub id: RecordId,
    pub country: String,
    pub year: String,
    pub region: String,
    /// Two-letter code; empty when the country is not in the lookup table.
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_path: Option<String>,
    /// Raw cell of the position attribute, as loaded.
    pub position_value: Option<String>,
    /// Raw cell of the size attribute, as loaded.
    pub size_value: Option<String>,
    #[serde(flatten)]
    pub placement: Placement,
}

/// Everything the renderer needs for one year/selection combination.
///
/// Frames are built from scratch on every invocation and never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub year: String,
    pub active_regions: Vec<String>,
    pub attributes: AttributePair,
    pub records: Vec<FrameRecord>,
}

impl Frame {
    /// Zips filtered records with their placements.
    ///
    /// `placements[i]` belongs to `records[i]`; extra entries on either side
    /// are ignored.
    pub fn assemble(
        year: &str,
        active: &ActiveRegions,
        attributes: &AttributePair,
        records: &[FilteredRecord<'_>],
        placements: &[Placement],
    ) -> Self {
        let records = records
            .iter()
            .zip(placements)
            .map(|(filtered, placement)| {
                let rec = filtered.record;
                let code = country_code(&rec.country);
                FrameRecord {
                    id: rec.id,
                    country: rec.country.clone(),
                    year: rec.year.clone(),
                    region: filtered.region.to_string(),
                    country_code: code.to_string(),
                    flag_path: flag_asset_path(code),
                    position_value: rec.raw(&attributes.position).map(str::to_string),
                    size_value: rec.raw(&attributes.size).map(str::to_string),
                    placement: *placement,
                }
            })
            .collect();

        Self {
            year: year.to_string(),
            active_regions: active.to_vec(),
            attributes: attributes.clone(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributePair, Frame, Placement};
    use crate::filter::FilteredRecord;
    use crate::selection::ActiveRegions;
    use catalog::IndicatorRecord;
    use foundation::RecordId;
    use pretty_assertions::assert_eq;

    #[test]
    fn assemble_annotates_records() {
        let norway = IndicatorRecord::new(RecordId(3), "Norway", "2000")
            .with_value("GDP", "50000")
            .with_value("Pop", "4000000");
        let atlantis = IndicatorRecord::new(RecordId(4), "Atlantis", "2000");
        let filtered = [
            FilteredRecord {
                record: &norway,
                region: "Europe",
            },
            FilteredRecord {
                record: &atlantis,
                region: "Europe",
            },
        ];
        let placements = [
            Placement {
                x: 1.0,
                y: 2.0,
                radius: 3.0,
            },
            Placement {
                x: 4.0,
                y: 5.0,
                radius: 6.0,
            },
        ];

        let frame = Frame::assemble(
            "2000",
            &ActiveRegions::from_regions(["Europe"]),
            &AttributePair::new("GDP", "Pop"),
            &filtered,
            &placements,
        );

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.active_regions, vec!["Europe"]);
        let first = &frame.records[0];
        assert_eq!(first.country_code, "NO");
        assert_eq!(first.flag_path.as_deref(), Some("/data/flags/no.png"));
        assert_eq!(first.position_value.as_deref(), Some("50000"));
        assert_eq!(first.size_value.as_deref(), Some("4000000"));
        assert_eq!(first.placement.radius, 3.0);

        let second = &frame.records[1];
        assert_eq!(second.country_code, "");
        assert_eq!(second.flag_path, None);
        assert_eq!(second.position_value, None);
    }
}
