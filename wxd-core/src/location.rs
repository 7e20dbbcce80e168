use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::error::{CoreError, Result};
use crate::geo::GeoPoint;

/// A registered location, persisted as `{"name": .., "lat": .., "lon": ..}`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Read access to the registered locations.
///
/// Snapshots are ordered by id so every consumer iterates them identically.
pub trait LocationStore {
    fn get_all(&self) -> Result<BTreeMap<String, Location>>;
}

impl LocationStore for BTreeMap<String, Location> {
    fn get_all(&self) -> Result<BTreeMap<String, Location>> {
        Ok(self.clone())
    }
}

/// Derive a location id from its display name: lower-cased, whitespace runs
/// replaced with `-`.
pub fn location_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Outcome of a CSV import: how many rows were added and per-line errors.
#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    pub added: usize,
    pub errors: Vec<String>,
}

/// Location store persisted as a single JSON object file.
#[derive(Debug, Clone)]
pub struct JsonLocationStore {
    path: PathBuf,
    locations: BTreeMap<String, Location>,
}

impl JsonLocationStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let locations = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, locations })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.locations)?;
        std::fs::write(&self.path, text)?;
        info!(
            "Saved {} location(s) to {}",
            self.locations.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Register a location, returning its id.
    pub fn add(&mut self, name: &str, lat: f64, lon: f64) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }
        GeoPoint::try_new(lat, lon)?;
        let id = location_id(name);
        if self.locations.contains_key(&id) {
            return Err(CoreError::DuplicateLocation(id));
        }
        self.locations.insert(
            id.clone(),
            Location {
                name: name.to_string(),
                lat,
                lon,
            },
        );
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> Result<Location> {
        self.locations
            .remove(id)
            .ok_or_else(|| CoreError::LocationNotFound(id.to_string()))
    }

    /// Import `name,lat,lon` rows. Header rows starting with `name` or `nombre`
    /// (any case) and `#`
    /// comments are skipped; ids already registered are skipped silently.
    /// Bad rows are reported but do not stop the import.
    pub fn import_csv(&mut self, csv_object: &str) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .from_reader(csv_object.as_bytes());
        for (index, row) in rdr.records().enumerate() {
            let record = row?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);
            if record.get(0).is_some_and(is_header) {
                continue;
            }
            if record.len() != 3 {
                report
                    .errors
                    .push(format!("line {line}: expected 3 values, got {}", record.len()));
                continue;
            }
            let name = &record[0];
            let (lat, lon) = match (record[1].parse::<f64>(), record[2].parse::<f64>()) {
                (Ok(lat), Ok(lon)) => (lat, lon),
                _ => {
                    report.errors.push(format!("line {line}: invalid coordinates"));
                    continue;
                }
            };
            match self.add(name, lat, lon) {
                Ok(_) => report.added += 1,
                Err(CoreError::DuplicateLocation(id)) => {
                    info!("Skipping already registered location {id}");
                }
                Err(e) => report.errors.push(format!("line {line}: {e}")),
            }
        }
        if !report.errors.is_empty() {
            warn!("CSV import finished with {} error(s)", report.errors.len());
        }
        Ok(report)
    }
}

fn is_header(first: &str) -> bool {
    let first = first.to_lowercase();
    first.starts_with("name") || first.starts_with("nombre")
}

impl LocationStore for JsonLocationStore {
    fn get_all(&self) -> Result<BTreeMap<String, Location>> {
        Ok(self.locations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonLocationStore {
        let path = std::env::temp_dir().join(format!(
            "wxd-core-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        JsonLocationStore::open(path).unwrap()
    }

    #[test]
    fn test_location_id_from_name() {
        assert_eq!(location_id("San Miguel  de Allende"), "san-miguel-de-allende");
        assert_eq!(location_id(" León "), "león");
    }

    #[test]
    fn test_add_validates_and_rejects_duplicates() {
        let mut store = temp_store("add");
        assert_eq!(store.add("Guanajuato", 21.019, -101.2574).unwrap(), "guanajuato");
        assert!(matches!(
            store.add("guanajuato", 21.0, -101.0),
            Err(CoreError::DuplicateLocation(_))
        ));
        assert!(matches!(
            store.add("Nowhere", 95.0, 0.0),
            Err(CoreError::InvalidCoordinates { .. })
        ));
        assert!(matches!(store.add("  ", 0.0, 0.0), Err(CoreError::EmptyName)));
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reopen() {
        let mut store = temp_store("save");
        store.add("Monterrey", 25.6866, -100.3161).unwrap();
        store.save().unwrap();
        let reopened = JsonLocationStore::open(store.path()).unwrap();
        let location = reopened.get("monterrey").unwrap();
        assert!((location.lat - 25.6866).abs() < f64::EPSILON);
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_import_csv_keeps_good_rows() {
        let mut store = temp_store("import");
        store.add("Celaya", 20.52, -100.81).unwrap();
        let csv_data = "\
name,lat,lon
# comment line
Irapuato,20.67,-101.35
Celaya,20.52,-100.81
Broken,abc,-100.0
Too,Many,Values,Here
Far North,91.0,0.0
";
        let report = store.import_csv(csv_data).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.errors.len(), 3);
        assert!(store.get("irapuato").is_some());
    }

    #[test]
    fn test_import_csv_skips_spanish_header() {
        let mut store = temp_store("import-nombre");
        let csv_data = "Nombre,Latitud,Longitud\nLeon,21.12,-101.68\n";
        let report = store.import_csv(csv_data).unwrap();
        assert_eq!(report.added, 1);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(store.get("leon").is_some());
    }

    #[test]
    fn test_remove_unknown_location() {
        let mut store = temp_store("remove");
        assert!(matches!(
            store.remove("missing"),
            Err(CoreError::LocationNotFound(_))
        ));
    }
}
