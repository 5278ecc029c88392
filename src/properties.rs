use std::{collections::HashMap, fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use serde::Serialize;

use crate::{archiver::FILE_EXTENSION, Error, Result};

#[derive(Clone, Copy, Default, Eq, PartialEq, Serialize, Debug)]
pub enum StatsFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for StatsFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(StatsFormat::Text),
            "json" => Ok(StatsFormat::Json),
            other => Err(Error::Config(format!("unknown stats format {:?}", other))),
        }
    }
}

impl fmt::Display for StatsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

/// Runtime options of the archiver.
#[derive(Clone, Eq, PartialEq, Serialize, Debug)]
pub struct Properties {
    /// Appended to a source name when no archive name is given.
    pub extension: String,
    pub stats_format: StatsFormat,
    /// Replace an existing archive file instead of failing.
    pub overwrite: bool,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            extension: FILE_EXTENSION.to_owned(),
            stats_format: StatsFormat::default(),
            overwrite: false,
        }
    }
}

impl Properties {
    /// Reads a Java-style `.properties` file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let p = java_properties::read(BufReader::new(file))
            .map_err(|e| Error::Config(format!("failed parsing {}: {}", path.display(), e)))?;

        Properties::try_from(p)
    }
}

impl TryFrom<HashMap<String, String>> for Properties {
    type Error = Error;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = Properties::default();

        if let Some(extension) = value.get("extension") {
            let extension = extension.trim();
            if extension.len() < 2 || !extension.starts_with('.') || extension.contains('/') {
                return Err(Error::Config(format!("invalid extension {:?}", extension)));
            }
            props.extension = extension.to_owned();
        }
        if let Some(stats_format) = value.get("statsformat") {
            props.stats_format = stats_format.parse()?;
        }
        if let Some(overwrite) = value.get("overwrite") {
            props.overwrite = overwrite.trim().parse()
                .map_err(|_| Error::Config(format!("overwrite must be true or false, not {:?}", overwrite)))?;
        }

        Ok(props)
    }
}

impl From<Properties> for String {
    fn from(val: Properties) -> Self {
        let mut s = String::new();

        s.push_str("#Huffman archiver properties\n");
        s.push_str(&format!("extension={}\n", val.extension));
        s.push_str(&format!("statsformat={}\n", val.stats_format));
        s.push_str(&format!("overwrite={}\n", val.overwrite));

        s
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Cursor};

    use crate::Error;

    use super::{Properties, StatsFormat};

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect()
    }

    #[test]
    fn test_defaults() {
        let props = Properties::try_from(HashMap::new()).unwrap();

        assert_eq!(props, Properties::default());
        assert_eq!(props.extension, ".huff");
        assert_eq!(props.stats_format, StatsFormat::Text);
        assert!(!props.overwrite);
    }

    #[test]
    fn test_overrides() {
        let props = Properties::try_from(map(&[
            ("extension", ".hz"),
            ("statsformat", "JSON"),
            ("overwrite", "true"),
        ])).unwrap();

        assert_eq!(props.extension, ".hz");
        assert_eq!(props.stats_format, StatsFormat::Json);
        assert!(props.overwrite);
    }

    #[test]
    fn test_malformed_values() {
        for pairs in [
            [("extension", "huff")],
            [("extension", ".")],
            [("statsformat", "xml")],
            [("overwrite", "maybe")],
        ] {
            assert!(matches!(Properties::try_from(map(&pairs)), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_written_properties_read_back() {
        let props = Properties {
            extension: ".hz".into(),
            stats_format: StatsFormat::Json,
            overwrite: true,
        };

        let text: String = props.clone().into();
        let parsed = java_properties::read(Cursor::new(text)).unwrap();

        assert_eq!(Properties::try_from(parsed).unwrap(), props);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archiver.properties");
        std::fs::write(&path, "# comment\nstatsformat = json\n").unwrap();

        let props = Properties::load(&path).unwrap();
        assert_eq!(props.stats_format, StatsFormat::Json);
        assert_eq!(props.extension, ".huff");

        assert!(matches!(Properties::load(&dir.path().join("missing")), Err(Error::Io(_))));
    }
}
