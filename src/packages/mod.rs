mod catalog;
mod probe;
mod resolver;

pub use catalog::{load_catalog, Catalog, Package, PackageCategory};
pub use probe::{CommandProbe, DryrunProbe, PackageProbe, ProbeError, PACKAGE_PLACEHOLDER};
pub use resolver::{InstallStatus, StatusResolver, StatusUpdate, DEFAULT_QUERY_TIMEOUT};
