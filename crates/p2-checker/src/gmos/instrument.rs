//! Static GMOS component
//!
//! Holds what does not vary per step: site, detector, declared custom
//! regions of interest and nod-and-shuffle parameters.

use serde::{Deserialize, Serialize};

use super::types::{BuiltinRoi, DetectorManufacturer, Site};

/// Telescope offset position in arcsec
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsetPos {
    /// p offset
    pub p: f64,
    /// q offset
    pub q: f64,
}

impl OffsetPos {
    /// Create an offset position
    #[inline]
    #[must_use]
    pub fn new(p: f64, q: f64) -> Self {
        Self { p, q }
    }

    /// Squared distance to `other`
    #[inline]
    #[must_use]
    pub fn square_distance(&self, other: &Self) -> f64 {
        let dp = self.p - other.p;
        let dq = self.q - other.q;
        dp * dp + dq * dq
    }
}

/// Nod-and-shuffle settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodAndShuffle {
    /// Whether nod and shuffle is in use
    pub enabled: bool,
    /// Number of nod cycles
    pub cycles: u32,
    /// Shuffle distance in detector rows
    pub detector_rows: u32,
    /// Nod positions, in order
    pub positions: Vec<OffsetPos>,
    /// Whether electronic offsetting is used
    pub electronic_offsetting: bool,
}

impl NodAndShuffle {
    /// Enabled nod and shuffle with `cycles` cycles and a `rows` shuffle
    #[must_use]
    pub fn enabled(cycles: u32, detector_rows: u32) -> Self {
        Self {
            enabled: true,
            cycles,
            detector_rows,
            ..Self::default()
        }
    }

    /// With one more nod position
    #[inline]
    #[must_use]
    pub fn with_position(mut self, p: f64, q: f64) -> Self {
        self.positions.push(OffsetPos::new(p, q));
        self
    }

    /// With electronic offsetting
    #[inline]
    #[must_use]
    pub fn with_electronic_offsetting(mut self, on: bool) -> Self {
        self.electronic_offsetting = on;
        self
    }

    /// Squared distances between consecutive nod positions
    pub fn square_nod_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.positions.windows(2).map(|pair| pair[0].square_distance(&pair[1]))
    }

    /// Total time charged for one observe of `exposure` seconds
    ///
    /// Each cycle exposes at every position and adds a fixed per-cycle
    /// overhead: 11 s with electronic offsetting, 25 s without.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn total_exposure(&self, exposure: f64) -> f64 {
        let cycles = f64::from(self.cycles);
        let overhead = if self.electronic_offsetting { 11.0 } else { 25.0 };
        exposure * cycles * self.positions.len() as f64 + overhead * cycles
    }
}

/// Detector region of interest, in unbinned 1-based pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoiDescription {
    /// First column
    pub x_start: i32,
    /// First row
    pub y_start: i32,
    /// Width in columns
    pub x_size: i32,
    /// Height in rows
    pub y_size: i32,
}

impl RoiDescription {
    /// Create a region
    #[inline]
    #[must_use]
    pub fn new(x_start: i32, y_start: i32, x_size: i32, y_size: i32) -> Self {
        Self {
            x_start,
            y_start,
            x_size,
            y_size,
        }
    }

    /// Whether the two regions share at least one row
    #[must_use]
    pub fn row_overlap(&self, other: &Self) -> bool {
        spans_overlap(self.y_start, self.y_size, other.y_start, other.y_size)
    }

    /// Whether the two regions share at least one pixel
    #[must_use]
    pub fn pixel_overlap(&self, other: &Self) -> bool {
        spans_overlap(self.x_start, self.x_size, other.x_start, other.x_size) && self.row_overlap(other)
    }

    /// Whether the region fits on `detector`
    #[must_use]
    pub fn validate(&self, detector: DetectorManufacturer) -> bool {
        let (width, height) = (detector.x_size(), detector.y_size());
        (1..=width).contains(&self.x_start)
            && (1..=height).contains(&self.y_start)
            && (1..=width - self.x_start + 1).contains(&self.x_size)
            && (1..=height - self.y_start + 1).contains(&self.y_size)
    }
}

fn spans_overlap(a_start: i32, a_size: i32, b_start: i32, b_size: i32) -> bool {
    let last = |start: i32, size: i32| i64::from(start) + i64::from(size) - 1;
    (a_start <= b_start && last(a_start, a_size) >= i64::from(b_start))
        || (b_start <= a_start && last(b_start, b_size) >= i64::from(a_start))
}

/// Static GMOS component of an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmosInstrument {
    /// GMOS-N or GMOS-S
    pub site: Site,
    /// Detector installed
    pub detector: DetectorManufacturer,
    /// Read-out region, unless a step overrides it
    #[serde(default)]
    pub builtin_roi: BuiltinRoi,
    /// Declared custom regions of interest
    #[serde(default)]
    pub custom_rois: Vec<RoiDescription>,
    /// Nod-and-shuffle settings
    #[serde(default)]
    pub nod_and_shuffle: NodAndShuffle,
}

impl GmosInstrument {
    /// Component at `site` with `detector`, full-frame read-out and no N&S
    #[must_use]
    pub fn new(site: Site, detector: DetectorManufacturer) -> Self {
        Self {
            site,
            detector,
            builtin_roi: BuiltinRoi::default(),
            custom_rois: Vec::new(),
            nod_and_shuffle: NodAndShuffle::default(),
        }
    }

    /// With read-out region
    #[inline]
    #[must_use]
    pub fn with_builtin_roi(mut self, roi: BuiltinRoi) -> Self {
        self.builtin_roi = roi;
        self
    }

    /// With one more custom region
    #[inline]
    #[must_use]
    pub fn with_custom_roi(mut self, roi: RoiDescription) -> Self {
        self.custom_rois.push(roi);
        self
    }

    /// With nod-and-shuffle settings
    #[inline]
    #[must_use]
    pub fn with_nod_and_shuffle(mut self, ns: NodAndShuffle) -> Self {
        self.nod_and_shuffle = ns;
        self
    }

    /// Whether any two custom regions share a row
    #[must_use]
    pub fn rois_overlap_rows(&self) -> bool {
        any_pair(&self.custom_rois, RoiDescription::row_overlap)
    }

    /// Whether any two custom regions share a pixel
    #[must_use]
    pub fn rois_overlap_pixels(&self) -> bool {
        any_pair(&self.custom_rois, RoiDescription::pixel_overlap)
    }

    /// Whether every custom region fits on the installed detector
    #[must_use]
    pub fn rois_valid(&self) -> bool {
        self.custom_rois.iter().all(|roi| roi.validate(self.detector))
    }
}

fn any_pair(rois: &[RoiDescription], overlap: fn(&RoiDescription, &RoiDescription) -> bool) -> bool {
    rois.iter()
        .enumerate()
        .any(|(i, a)| rois[i + 1..].iter().any(|b| overlap(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_and_pixel_overlap_differ() {
        // same rows, disjoint columns
        let left = RoiDescription::new(1, 100, 100, 50);
        let right = RoiDescription::new(500, 120, 100, 50);
        assert!(left.row_overlap(&right));
        assert!(!left.pixel_overlap(&right));

        let below = RoiDescription::new(1, 150, 100, 10);
        assert!(!left.row_overlap(&below));
        let touching = RoiDescription::new(1, 149, 100, 10);
        assert!(left.pixel_overlap(&touching));
    }

    #[test]
    fn oversized_regions_overlap_without_overflow() {
        let tall = RoiDescription::new(1, 10, 10, i32::MAX);
        let later = RoiDescription::new(1, 20, 10, 10);
        assert!(tall.row_overlap(&later));
        assert!(later.row_overlap(&tall));

        let wide = RoiDescription::new(i32::MAX, 1, i32::MAX, 5);
        assert!(wide.pixel_overlap(&wide));
        assert!(!tall.validate(DetectorManufacturer::E2V));
    }

    #[test]
    fn validate_against_detector() {
        let e2v = DetectorManufacturer::E2V;
        let ham = DetectorManufacturer::Hamamatsu;
        assert!(RoiDescription::new(1, 1, 6144, 4608).validate(e2v));
        assert!(!RoiDescription::new(1, 1, 6144, 4608).validate(ham));
        assert!(!RoiDescription::new(0, 1, 10, 10).validate(e2v));
        assert!(!RoiDescription::new(6144, 1, 2, 10).validate(e2v));
        assert!(!RoiDescription::new(1, 1, 0, 10).validate(e2v));
    }

    #[test]
    fn instrument_roi_checks() {
        let inst = GmosInstrument::new(Site::North, DetectorManufacturer::E2V)
            .with_custom_roi(RoiDescription::new(1, 1, 100, 100))
            .with_custom_roi(RoiDescription::new(200, 50, 100, 100));
        assert!(inst.rois_overlap_rows());
        assert!(!inst.rois_overlap_pixels());
        assert!(inst.rois_valid());
    }

    #[test]
    fn nod_and_shuffle_exposure() {
        let ns = NodAndShuffle::enabled(3, 1536)
            .with_position(0.0, 0.0)
            .with_position(0.0, 1.5);
        assert_eq!(ns.total_exposure(100.0), 100.0 * 3.0 * 2.0 + 25.0 * 3.0);
        let eo = ns.clone().with_electronic_offsetting(true);
        assert_eq!(eo.total_exposure(100.0), 600.0 + 33.0);
        assert_eq!(ns.square_nod_distances().collect::<Vec<_>>(), vec![2.25]);
    }

    #[test]
    fn defaults_from_json() {
        let inst: GmosInstrument =
            serde_json::from_str(r#"{"site": "SOUTH", "detector": "HAMAMATSU"}"#).unwrap();
        assert_eq!(inst, GmosInstrument::new(Site::South, DetectorManufacturer::Hamamatsu));
    }
}
