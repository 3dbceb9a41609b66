/// Port for persisting the managed site list (the configuration file).
pub trait BlockSetStore: Send + Sync {
    fn save_sites(&self, sites: &[String]) -> Result<(), String>;
}
