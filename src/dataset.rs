use crate::{loader::DataShapeError, mode::ModeKey};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

/// One row of an ETC table
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SensitivityRecord {
    pub configuration: String,
    /// wavelength [micron]
    pub wavelength: f64,
    pub sensitivity: f64,
    pub limiting_flux: f64,
    pub saturation_limit: f64,
}

/// Tabulated quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Sensitivity,
    LimitingFlux,
    SaturationLimit,
}
impl Quantity {
    pub fn value(&self, record: &SensitivityRecord) -> f64 {
        match self {
            Quantity::Sensitivity => record.sensitivity,
            Quantity::LimitingFlux => record.limiting_flux,
            Quantity::SaturationLimit => record.saturation_limit,
        }
    }
}
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Sensitivity => write!(f, "Sensitivity"),
            Quantity::LimitingFlux => write!(f, "Limiting flux"),
            Quantity::SaturationLimit => write!(f, "Saturation limit"),
        }
    }
}

/// Records sharing the same configuration label, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationGroup {
    label: String,
    records: Vec<SensitivityRecord>,
}
impl ConfigurationGroup {
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn records(&self) -> &[SensitivityRecord] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn wavelengths(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.wavelength).collect()
    }
    /// Returns the (wavelength,value) pairs of a quantity
    pub fn series(&self, quantity: Quantity) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .map(|r| (r.wavelength, quantity.value(r)))
            .collect()
    }
    fn wavelength_range(&self) -> (f64, f64) {
        (
            self.records.first().map_or(f64::NAN, |r| r.wavelength),
            self.records.last().map_or(f64::NAN, |r| r.wavelength),
        )
    }
}

/// ETC table of an observing mode and source type, grouped by configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModeDataset {
    name: String,
    key: Option<ModeKey>,
    path: PathBuf,
    groups: BTreeMap<String, ConfigurationGroup>,
}
impl ModeDataset {
    /// Groups the records by configuration label
    ///
    /// Records keep their file order within a group and the wavelengths of
    /// every group must be finite and strictly increasing.
    pub fn new<P: Into<PathBuf>>(
        name: String,
        key: Option<ModeKey>,
        path: P,
        records: Vec<SensitivityRecord>,
    ) -> Result<Self, DataShapeError> {
        let path = path.into();
        let mut groups: BTreeMap<String, ConfigurationGroup> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.configuration.clone())
                .or_insert_with(|| ConfigurationGroup {
                    label: record.configuration.clone(),
                    records: vec![],
                })
                .records
                .push(record);
        }
        for group in groups.values() {
            if let Some((index, record)) = group
                .records
                .iter()
                .enumerate()
                .find(|(_, r)| !r.wavelength.is_finite())
            {
                return Err(DataShapeError::NonFiniteWavelength {
                    path,
                    configuration: group.label.clone(),
                    index,
                    value: record.wavelength,
                });
            }
            if let Some((index, pair)) = group
                .records
                .windows(2)
                .enumerate()
                .find(|(_, pair)| !(pair[1].wavelength > pair[0].wavelength))
            {
                return Err(DataShapeError::NotIncreasing {
                    path,
                    configuration: group.label.clone(),
                    index: index + 1,
                    previous: pair[0].wavelength,
                    current: pair[1].wavelength,
                });
            }
        }
        Ok(Self {
            name,
            key,
            path,
            groups,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn key(&self) -> Option<ModeKey> {
        self.key
    }
    /// Path to the ETC table the dataset was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Iterates over the configuration groups sorted by label
    pub fn groups(&self) -> impl Iterator<Item = &ConfigurationGroup> {
        self.groups.values()
    }
    pub fn group(&self, label: &str) -> Option<&ConfigurationGroup> {
        self.groups.get(label)
    }
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }
    /// Total number of records
    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
    /// File stem of the chart and of the CSV table
    pub fn chart_stem(&self) -> String {
        match self.key {
            Some(key) => key.chart_stem(),
            None => self.name.clone(),
        }
    }
    pub fn title(&self) -> String {
        match self.key {
            Some(key) => format!("MIRI {}", key.to_pretty_string()),
            None => self.name.clone(),
        }
    }
    pub fn summary(&self) {
        let minmax = |x: &[f64]| {
            x.iter()
                .cloned()
                .filter(|x| x.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| {
                    (a.min(x), b.max(x))
                })
        };
        log::info!("SUMMARY: {} ({:?})", self.name, self.path);
        log::info!(" - # of records: {}", self.len());
        log::info!(" - # of configurations: {}", self.n_groups());
        log::info!(
            "    {:^16}: {:^5}  ({:^8}, {:^8})  ({:^12}, {:^12})",
            "CONFIGURATION",
            "#",
            "WL MIN",
            "WL MAX",
            "SNS MIN",
            "SNS MAX"
        );
        for group in self.groups() {
            let (wl_min, wl_max) = group.wavelength_range();
            let sns: Vec<f64> = group.records.iter().map(|r| r.sensitivity).collect();
            let (sns_min, sns_max) = minmax(&sns);
            log::info!(
                "  - {:16}: {:>5}  ({:>8.3}, {:>8.3})  ({:>12.3e}, {:>12.3e})",
                group.label,
                group.len(),
                wl_min,
                wl_max,
                sns_min,
                sns_max
            );
        }
    }
    /// Writes the table to a CSV file, one row per record
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_path(path)?;
        for record in self.groups().flat_map(|g| g.records.iter()) {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(configuration: &str, wavelength: f64, sensitivity: f64) -> SensitivityRecord {
        SensitivityRecord {
            configuration: configuration.to_string(),
            wavelength,
            sensitivity,
            limiting_flux: sensitivity * 10.,
            saturation_limit: sensitivity * 1e4,
        }
    }

    #[test]
    fn groups_are_sorted_by_label() {
        let records = vec![
            record("F770W", 7.7, 2.),
            record("F560W", 5.6, 1.),
            record("F770W", 7.8, 3.),
            record("F1000W", 10., 4.),
        ];
        let ds = ModeDataset::new("test".into(), None, "test.npz", records).unwrap();
        let labels: Vec<_> = ds.groups().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["F1000W", "F560W", "F770W"]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.group("F770W").unwrap().wavelengths(), vec![7.7, 7.8]);
    }

    #[test]
    fn decreasing_wavelengths_are_rejected() {
        let records = vec![
            record("1A", 5.0, 1.),
            record("1A", 5.2, 1.),
            record("1A", 5.1, 1.),
        ];
        match ModeDataset::new("test".into(), None, "test.npz", records) {
            Err(DataShapeError::NotIncreasing {
                configuration,
                index,
                ..
            }) => {
                assert_eq!(configuration, "1A");
                assert_eq!(index, 2);
            }
            other => panic!("expected NotIncreasing, got {:?}", other),
        }
    }

    #[test]
    fn repeated_wavelengths_are_rejected() {
        let records = vec![record("1A", 5.0, 1.), record("1A", 5.0, 2.)];
        assert!(ModeDataset::new("test".into(), None, "test.npz", records).is_err());
    }

    #[test]
    fn non_finite_wavelengths_are_rejected() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let records = vec![record("F560W", 5., 1.), record("F560W", value, 2.)];
            match ModeDataset::new("test".into(), None, "test.npz", records) {
                Err(DataShapeError::NonFiniteWavelength {
                    configuration,
                    index,
                    ..
                }) => {
                    assert_eq!(configuration, "F560W");
                    assert_eq!(index, 1);
                }
                other => panic!("expected NonFiniteWavelength, got {:?}", other),
            }
        }
    }

    #[test]
    fn interleaved_groups_only_need_increasing_within_group() {
        let records = vec![
            record("2A", 8.0, 1.),
            record("1A", 5.0, 1.),
            record("2A", 8.5, 1.),
            record("1A", 5.5, 1.),
        ];
        let ds = ModeDataset::new("test".into(), None, "test.npz", records).unwrap();
        assert_eq!(ds.n_groups(), 2);
    }

    #[test]
    fn csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let records = vec![record("F770W", 7.7, 2.), record("F560W", 5.6, 1.)];
        let ds = ModeDataset::new("test".into(), None, "test.npz", records).unwrap();
        ds.to_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "configuration,wavelength,sensitivity,limiting_flux,saturation_limit"
        );
        assert!(lines[1].starts_with("F560W,5.6,1.0,"));
        assert!(lines[2].starts_with("F770W,7.7,2.0,"));
    }
}
