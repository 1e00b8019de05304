use regex::Regex;
use std::{fmt, path::Path};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// MIRI observing mode
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    Imaging,
    Lrs,
    Mrs,
}
impl Mode {
    pub fn to_pretty_string(&self) -> String {
        match self {
            Mode::Imaging => "Imager".to_string(),
            Mode::Lrs => "Low Resolution Spectrometer".to_string(),
            Mode::Mrs => "Medium Resolution Spectrometer".to_string(),
        }
    }
    fn from_tag(tag: &str) -> Option<Self> {
        Mode::iter().find(|mode| mode.to_string() == tag)
    }
}
impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Imaging => write!(f, "imaging"),
            Mode::Lrs => write!(f, "lrs"),
            Mode::Mrs => write!(f, "mrs"),
        }
    }
}
/// Source flux distribution assumed by the ETC
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceType {
    Point,
    Extended,
}
impl SourceType {
    pub fn to_pretty_string(&self) -> String {
        match self {
            SourceType::Point => "point source".to_string(),
            SourceType::Extended => "extended source".to_string(),
        }
    }
}
impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Point => write!(f, "point"),
            SourceType::Extended => write!(f, "extended"),
        }
    }
}

/// Observing mode and source type combination of an ETC table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeKey {
    pub mode: Mode,
    pub source: SourceType,
}
impl ModeKey {
    pub fn new(mode: Mode, source: SourceType) -> Self {
        Self { mode, source }
    }
    /// The ETC tables shipped for the documentation
    ///
    /// The LRS is only tabulated for point sources.
    pub fn catalogue() -> Vec<ModeKey> {
        Mode::iter()
            .flat_map(|mode| SourceType::iter().map(move |source| ModeKey::new(mode, source)))
            .filter(|key| !(key.mode == Mode::Lrs && key.source == SourceType::Extended))
            .collect()
    }
    /// Glob pattern of the ETC table file name
    pub fn file_pattern(&self) -> String {
        match self.source {
            SourceType::Point => format!("miri_{}_sensitivity.npz", self.mode),
            SourceType::Extended => format!("miri_{}_sensitivity_extended*.npz", self.mode),
        }
    }
    /// Recovers the key from an ETC table file name
    pub fn from_file_name<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let re = Regex::new(r"^miri_(\w+?)_sensitivity(_extended[^.]*)?\.npz$").ok()?;
        let capts = re.captures(name)?;
        let mode = Mode::from_tag(capts.get(1)?.as_str())?;
        let source = if capts.get(2).is_some() {
            SourceType::Extended
        } else {
            SourceType::Point
        };
        Some(ModeKey::new(mode, source))
    }
    /// Chart file stem: `<mode>_<source>_sensitivity`
    pub fn chart_stem(&self) -> String {
        format!("{}_{}_sensitivity", self.mode, self.source)
    }
    pub fn to_pretty_string(&self) -> String {
        format!(
            "{} - {}",
            self.mode.to_pretty_string(),
            self.source.to_pretty_string()
        )
    }
}
impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mode, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_five_tables() {
        let keys: Vec<String> = ModeKey::catalogue()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "imaging/point",
                "imaging/extended",
                "lrs/point",
                "mrs/point",
                "mrs/extended"
            ]
        );
    }

    #[test]
    fn key_from_file_name() {
        assert_eq!(
            ModeKey::from_file_name("data/miri_imaging_sensitivity.npz"),
            Some(ModeKey::new(Mode::Imaging, SourceType::Point))
        );
        assert_eq!(
            ModeKey::from_file_name("miri_mrs_sensitivity_extended_v2.npz"),
            Some(ModeKey::new(Mode::Mrs, SourceType::Extended))
        );
        assert_eq!(ModeKey::from_file_name("miri_coronagraph_sensitivity.npz"), None);
        assert_eq!(ModeKey::from_file_name("table.npz"), None);
    }

    #[test]
    fn file_patterns() {
        let key = ModeKey::new(Mode::Lrs, SourceType::Point);
        assert_eq!(key.file_pattern(), "miri_lrs_sensitivity.npz");
        assert_eq!(key.chart_stem(), "lrs_point_sensitivity");
        let key = ModeKey::new(Mode::Mrs, SourceType::Extended);
        assert_eq!(key.file_pattern(), "miri_mrs_sensitivity_extended*.npz");
    }
}
