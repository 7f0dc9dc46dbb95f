//! Data module - dataset loading, key normalization, joining and filtering

mod loader;
mod normalizer;
mod processor;
mod records;

pub use loader::{parse_geojson, records_from_frame, DataLoader, LoaderError};
pub use normalizer::RegionCode;
pub use processor::{DataProcessor, ProcessorError, RecordFilter, TableRows};
pub use records::{ColumnMapping, CountUnit, JoinedRecord, RegionGeometry, StatRecord};
