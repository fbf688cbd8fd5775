pub mod catalog;
pub mod directory;
pub mod rxnorm;

pub use catalog::{allergen_report, AllergenCheck, AllergenStatus, CatalogError, MedicationCatalog};
pub use directory::RecordPatientDirectory;
pub use rxnorm::{RxNormClient, RxNormError};
